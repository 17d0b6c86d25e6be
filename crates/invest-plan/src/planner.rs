//! Draft, detail and revise investment plans

use crate::catalog::{CategoryProcessor, StaticCatalog};
use crate::category::{AssetClass, DraftPlan};
use crate::error::{PlanError, Result};
use crate::profile::{CustomerProfile, NOT_PROVIDED};
use agent_llm::providers::{OpenAIConfig, OpenAIProvider};
use agent_llm::{CompletionRequest, LLMProvider, Message};
use agent_prompt::defaults::{ids, load_registry};
use agent_prompt::{PromptRegistry, unreplaced_placeholders};
use agent_utils::AppConfig;
use chrono::{Local, NaiveDate};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Recommendation produced for each category of a draft
pub type ProcessedCategories = BTreeMap<AssetClass, (Value, String)>;

/// Model settings for plan calls
#[derive(Debug, Clone, PartialEq)]
pub struct PlanSettings {
    pub model: String,
    pub max_tokens: usize,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for PlanSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            max_tokens: 2000,
            temperature: 0.0,
            timeout: Duration::from_secs(120),
        }
    }
}

pub struct InvestmentPlanner {
    provider: Arc<dyn LLMProvider>,
    prompts: Arc<PromptRegistry>,
    processor: Arc<dyn CategoryProcessor>,
    settings: PlanSettings,
}

impl InvestmentPlanner {
    pub fn new(provider: Arc<dyn LLMProvider>, prompts: Arc<PromptRegistry>) -> Self {
        Self {
            provider,
            prompts,
            processor: Arc::new(StaticCatalog),
            settings: PlanSettings::default(),
        }
    }

    /// Planner wired to OpenAI and the configured prompt directory
    pub fn from_app_config(app: &AppConfig) -> Result<Self> {
        let provider = OpenAIProvider::with_config(OpenAIConfig::from_app_config(app))?;
        let prompts = load_registry(app.prompt_dir.as_deref())?;
        Ok(Self::new(Arc::new(provider), Arc::new(prompts)).with_settings(PlanSettings {
            model: app.plan_model.clone(),
            timeout: app.capability_timeout,
            ..PlanSettings::default()
        }))
    }

    pub fn with_processor(mut self, processor: Arc<dyn CategoryProcessor>) -> Self {
        self.processor = processor;
        self
    }

    pub fn with_settings(mut self, settings: PlanSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &PlanSettings {
        &self.settings
    }

    /// Ask the model for an allocation across asset classes
    #[instrument(skip_all)]
    pub async fn draft_plan(&self, profile: &CustomerProfile) -> Result<DraftPlan> {
        let bindings = profile.bindings(today());
        let reply = self.call(ids::DRAFT_PLAN, Value::Object(bindings)).await?;
        let draft = DraftPlan::parse(&reply)?;
        info!(categories = draft.categories().len(), "Draft plan ready");
        debug!("Draft plan:\n{}", draft.raw());
        Ok(draft)
    }

    /// Run every category of the draft through the processor
    pub async fn process_categories(&self, draft: &DraftPlan) -> Result<ProcessedCategories> {
        let mut processed = BTreeMap::new();
        for category in draft.categories() {
            let recommendation = self.processor.process(category).await?;
            processed.insert(
                category.asset_class(),
                (category.criteria().screening(), recommendation),
            );
        }
        Ok(processed)
    }

    /// Turn the draft and per-category results into the final plan
    #[instrument(skip_all)]
    pub async fn detailed_plan(
        &self,
        draft: &DraftPlan,
        processed: &ProcessedCategories,
    ) -> Result<String> {
        self.call(ids::DETAILED_PLAN, Value::Object(detail_bindings(draft, processed)))
            .await
    }

    /// Draft, process each category, then detail
    pub async fn plan_investment(&self, profile: &CustomerProfile) -> Result<String> {
        let draft = self.draft_plan(profile).await?;
        let processed = self.process_categories(&draft).await?;
        self.detailed_plan(&draft, &processed).await
    }

    /// Revise `old_plan` with `change`; without both the old plan comes back untouched
    #[instrument(skip_all)]
    pub async fn update_plan(
        &self,
        profile: &CustomerProfile,
        old_plan: Option<&str>,
        change: Option<&str>,
    ) -> Result<Option<String>> {
        let (Some(plan), Some(change)) = (old_plan, change) else {
            warn!("Plan or change missing, returning the plan unchanged");
            return Ok(old_plan.map(ToString::to_string));
        };
        info!("Applying change: {}", change);

        let mut bindings = profile.bindings(today());
        bindings.insert("old_plan".into(), json!(plan));
        bindings.insert("new_requirement".into(), json!(change));
        self.call(ids::UPDATE_PLAN, Value::Object(bindings))
            .await
            .map(Some)
    }

    async fn call(&self, template: &str, bindings: Value) -> Result<String> {
        let prompt = self.prompts.render(template, &bindings)?;
        let leftover = unreplaced_placeholders(&prompt);
        if !leftover.is_empty() {
            warn!("{} left placeholders unreplaced: {:?}", template, leftover);
        }

        let request = CompletionRequest::builder(&self.settings.model)
            .add_message(Message::user(prompt))
            .max_tokens(self.settings.max_tokens)
            .temperature(self.settings.temperature)
            .build();
        let response = tokio::time::timeout(self.settings.timeout, self.provider.complete(request))
            .await
            .map_err(|_| PlanError::Timeout {
                template: template.to_string(),
                after: self.settings.timeout,
            })??;
        Ok(response.message.text().trim().to_string())
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn detail_bindings(draft: &DraftPlan, processed: &ProcessedCategories) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("draft_plan".into(), json!(draft.raw()));
    for class in AssetClass::ALL {
        let prefix = class.binding_prefix();
        let (criteria, detail) = match processed.get(&class) {
            Some((criteria, detail)) => (criteria.to_string(), detail.clone()),
            None => (NOT_PROVIDED.to_string(), NOT_PROVIDED.to_string()),
        };
        map.insert(format!("{prefix}_criteria"), json!(criteria));
        map.insert(format!("{prefix}_detail"), json!(detail));
    }
    map
}

//! Investment categories and the draft plan built from them

use crate::error::{PlanError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// The asset classes a plan can allocate to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AssetClass {
    Stocks,
    Etfs,
    StockIndices,
    UsBonds,
    Crypto,
}

impl AssetClass {
    pub const ALL: [AssetClass; 5] = [
        AssetClass::Stocks,
        AssetClass::Etfs,
        AssetClass::StockIndices,
        AssetClass::UsBonds,
        AssetClass::Crypto,
    ];

    /// Key used in the model's JSON
    pub fn display_name(self) -> &'static str {
        match self {
            AssetClass::Stocks => "Stocks",
            AssetClass::Etfs => "ETFs",
            AssetClass::StockIndices => "Stock Indices",
            AssetClass::UsBonds => "US Bonds",
            AssetClass::Crypto => "Crypto",
        }
    }

    /// Prefix of the `<prefix>_criteria` and `<prefix>_detail` bindings
    pub fn binding_prefix(self) -> &'static str {
        match self {
            AssetClass::Stocks => "stock",
            AssetClass::Etfs => "etf",
            AssetClass::StockIndices => "indices",
            AssetClass::UsBonds => "bonds",
            AssetClass::Crypto => "crypto",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.display_name() == name)
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Allocation and screening criteria for one category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Criteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocation_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Everything else the model asked to screen on
    #[serde(flatten)]
    pub filters: BTreeMap<String, Value>,
}

impl Criteria {
    /// The criteria handed to processors: allocation and filters, no reason
    pub fn screening(&self) -> Value {
        let mut map = Map::new();
        if let Some(pct) = self.allocation_pct {
            map.insert("allocation_pct".into(), Value::from(pct));
        }
        for (key, value) in &self.filters {
            map.insert(key.clone(), value.clone());
        }
        Value::Object(map)
    }
}

/// One category of a draft plan with its criteria
#[derive(Debug, Clone, PartialEq)]
pub enum InvestmentCategory {
    Stocks(Criteria),
    Etfs(Criteria),
    StockIndices(Criteria),
    UsBonds(Criteria),
    Crypto(Criteria),
}

impl InvestmentCategory {
    pub fn new(class: AssetClass, criteria: Criteria) -> Self {
        match class {
            AssetClass::Stocks => InvestmentCategory::Stocks(criteria),
            AssetClass::Etfs => InvestmentCategory::Etfs(criteria),
            AssetClass::StockIndices => InvestmentCategory::StockIndices(criteria),
            AssetClass::UsBonds => InvestmentCategory::UsBonds(criteria),
            AssetClass::Crypto => InvestmentCategory::Crypto(criteria),
        }
    }

    pub fn asset_class(&self) -> AssetClass {
        match self {
            InvestmentCategory::Stocks(_) => AssetClass::Stocks,
            InvestmentCategory::Etfs(_) => AssetClass::Etfs,
            InvestmentCategory::StockIndices(_) => AssetClass::StockIndices,
            InvestmentCategory::UsBonds(_) => AssetClass::UsBonds,
            InvestmentCategory::Crypto(_) => AssetClass::Crypto,
        }
    }

    pub fn criteria(&self) -> &Criteria {
        match self {
            InvestmentCategory::Stocks(c)
            | InvestmentCategory::Etfs(c)
            | InvestmentCategory::StockIndices(c)
            | InvestmentCategory::UsBonds(c)
            | InvestmentCategory::Crypto(c) => c,
        }
    }
}

/// Model-drafted allocation, in the order the model listed it
#[derive(Debug, Clone, PartialEq)]
pub struct DraftPlan {
    raw: String,
    categories: Vec<InvestmentCategory>,
}

/// Drop a surrounding Markdown code fence, with or without a `json` tag
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = body.strip_prefix("json").unwrap_or(body);
    body.strip_suffix("```").unwrap_or(body).trim()
}

impl DraftPlan {
    /// Parse the model's reply; unknown categories are skipped
    pub fn parse(reply: &str) -> Result<Self> {
        let raw = strip_code_fence(reply).to_string();
        let object: Map<String, Value> =
            serde_json::from_str(&raw).map_err(|e| PlanError::Decode {
                detail: e.to_string(),
                raw: raw.clone(),
            })?;

        let mut categories = Vec::new();
        for (name, value) in object {
            let Some(class) = AssetClass::from_name(&name) else {
                warn!("Skipping unknown investment category {:?}", name);
                continue;
            };
            let criteria: Criteria =
                serde_json::from_value(value).map_err(|e| PlanError::Decode {
                    detail: format!("{name}: {e}"),
                    raw: raw.clone(),
                })?;
            categories.push(InvestmentCategory::new(class, criteria));
        }

        Ok(Self { raw, categories })
    }

    /// The draft as the model wrote it, without fences
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn categories(&self) -> &[InvestmentCategory] {
        &self.categories
    }

    pub fn get(&self, class: AssetClass) -> Option<&InvestmentCategory> {
        self.categories.iter().find(|c| c.asset_class() == class)
    }
}

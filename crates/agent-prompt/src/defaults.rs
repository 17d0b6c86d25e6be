//! Built-in prompt templates
//!
//! Every template id the workspace renders has a default here, so the agent
//! works without a prompt directory. Files loaded with
//! [`FileLoader`](crate::FileLoader) replace these by id.

use crate::{JinjaTemplate, PromptRegistry, Result};

/// Template ids used across the workspace
pub mod ids {
    /// Natural language to hybrid query
    pub const PARSER_SUQL: &str = "parser_suql";
    /// Does this turn need the database?
    pub const IF_DB_CLASSIFICATION: &str = "if_db_classification";
    /// Answer grounded in query results
    pub const RESPONSE_WITH_RESULTS: &str = "investment_response_SQL";
    /// Answer when the query returned nothing
    pub const RESPONSE_NO_RESULTS: &str = "investment_response_no_results";
    /// Free-text question answering over documents
    pub const ANSWER_QA: &str = "answer_qa";
    /// First-pass investment plan (JSON)
    pub const DRAFT_PLAN: &str = "draft_investment_plan";
    /// Final investment plan from the draft and per-category results
    pub const DETAILED_PLAN: &str = "detailed_investment_plan";
    /// Revise an existing plan
    pub const UPDATE_PLAN: &str = "update_investment_plan";
}

const DIALOGUE_BLOCK: &str = r#"{% for turn in dlg %}
User: {{ turn.user_utterance }}
{% if turn.db_results %}
[Database returns "{{ turn.db_results }}"]
{% endif %}
{% if turn.agent_utterance %}
Agent: {{ turn.agent_utterance }}
{% endif %}
{% endfor %}"#;

const PARSER_SUQL: &str = r#"You are a semantic parser. Translate the user's latest request about stocks and ETFs into a single SUQL query.

SUQL is PostgreSQL extended with free-text functions:
- answer(column, 'question') asks a question about the free-text value of a column and returns text.
- summary(column) summarizes the value of a column.

Tables:
CREATE TABLE stocks (
    _id SERIAL PRIMARY KEY,
    ticker TEXT,
    5_day_avg_close TEXT, 5_day_volatility TEXT, 5_day_avg_volume TEXT, 5_day_return MONEY,
    10_day_avg_close TEXT, 10_day_volatility TEXT, 10_day_avg_volume TEXT, 10_day_return MONEY,
    1_month_avg_close TEXT, 1_month_volatility TEXT, 1_month_avg_volume TEXT, 1_month_return MONEY,
    6_month_avg_close TEXT, 6_month_volatility TEXT, 6_month_avg_volume TEXT, 6_month_return MONEY,
    1_year_avg_close TEXT, 1_year_volatility TEXT, 1_year_avg_volume TEXT, 1_year_return MONEY,
    rsi TEXT, macd TEXT, signal_line TEXT
);
CREATE TABLE etfs ( same columns as stocks );

Rules:
- Always select _id and ticker so results can be referred to later.
- When the user refers to an earlier result ("the second one"), use its _id from the dialogue.
- End the query with a semicolon.

User: Show me ETFs with 5 day return above 10.
Target: SELECT * FROM etfs WHERE 5_day_return > 10;
--
User: Which stocks have an RSI of 70?
Target: SELECT _id, ticker, rsi FROM stocks WHERE rsi = 70;
--
{% for turn in dlg[:-1] %}
User: {{ turn.user_utterance }}
{% if turn.user_target %}
Target: {{ turn.user_target }}
{% endif %}
{% if turn.results_for_ned %}
Results: {% for r in turn.results_for_ned %}{{ r.ticker }} (_id = {{ r._id }}){% if not loop.last %}, {% endif %}{% endfor %}

{% endif %}
{% if turn.agent_utterance %}
Agent: {{ turn.agent_utterance }}
{% endif %}
{% endfor %}
User: {{ query }}
Target: "#;

const IF_DB_CLASSIFICATION: &str = r#"You are an investment assistant with access to a database of US stocks and ETFs (tickers, returns, volatility, volume, RSI, MACD).
Decide whether answering the user's last message requires looking up the database. Answer "Yes" or "No".

"#;

const RESPONSE_WITH_RESULTS: &str = r#"You are a friendly investment advisory assistant. Today you help the user explore stocks and ETFs.
Base your answer only on what the database returned. Mention tickers and the figures that matter for the question.
If several results fit, list them briefly and offer to go deeper on one. Do not invent data.

"#;

const RESPONSE_NO_RESULTS: &str = r#"You are a friendly investment advisory assistant helping the user explore stocks and ETFs.
The database lookup for the user's last message returned no results.
Tell the user you could not find matching stocks or ETFs, and suggest how they could relax or rephrase the request.

"#;

const ANSWER_QA: &str = r#"Answer the question using only the data below. If the data does not contain the answer, say "no information".

Data:
{% for item in data %}
{{ item }}
{% endfor %}

Question: {{ question }}{{ type_prompt }}
Answer:"#;

const DRAFT_PLAN: &str = r#"Today is {{ day }}, {{ date }}. You are an investment planner.
Draft an investment allocation for this customer:
- Name: {{ customer_name }}
- Age: {{ age }}
- Income: {{ income }}
- Occupation: {{ occupation }}
- Budget (USD): {{ budget_usd }}
- Time horizon (weeks): {{ time_horizon_weeks }}
- Risk level: {{ risk_level }}
- Asset preference: {{ asset_preference }}
- Liquidity needs: {{ liquidity }}

Respond with JSON only. Keys are any of "Stocks", "ETFs", "Stock Indices", "US Bonds", "Crypto".
Each value is an object with "allocation_pct" (number), "reason" (string) and any screening criteria as string fields,
for example {"ETFs": {"allocation_pct": 40, "reason": "...", "min_1_year_return": "5", "max_volatility": "0.02"}}.
"#;

const DETAILED_PLAN: &str = r#"You are an investment planner. Turn the draft plan into a detailed plan the customer can act on.

Draft plan:
{{ draft_plan }}

Stocks criteria: {{ stock_criteria }}
Stocks candidates: {{ stock_detail }}

ETF criteria: {{ etf_criteria }}
ETF candidates: {{ etf_detail }}

Stock index criteria: {{ indices_criteria }}
Stock index candidates: {{ indices_detail }}

US bond criteria: {{ bonds_criteria }}
US bond candidates: {{ bonds_detail }}

Crypto criteria: {{ crypto_criteria }}
Crypto candidates: {{ crypto_detail }}

For each category explain the allocation, the chosen instruments and the main risks.
"#;

const UPDATE_PLAN: &str = r#"Today is {{ day }}, {{ date }}. You are an investment planner revising an existing plan.

Customer:
- Name: {{ customer_name }}
- Age: {{ age }}
- Income: {{ income }}
- Occupation: {{ occupation }}
- Budget (USD): {{ budget_usd }}
- Time horizon (weeks): {{ time_horizon_weeks }}
- Risk level: {{ risk_level }}
- Asset preference: {{ asset_preference }}
- Liquidity needs: {{ liquidity }}

Current plan:
{{ old_plan }}

Requested change:
{{ new_requirement }}

Rewrite the plan applying the change and keep everything else as it was.
"#;

/// Source of every built-in template, keyed by id
pub fn default_sources() -> Vec<(&'static str, String)> {
    let with_dialogue = |head: &str, tail: &str| format!("{head}{DIALOGUE_BLOCK}\n{tail}");

    vec![
        (ids::PARSER_SUQL, PARSER_SUQL.to_string()),
        (
            ids::IF_DB_CLASSIFICATION,
            with_dialogue(IF_DB_CLASSIFICATION, "Needs database (Yes/No):"),
        ),
        (
            ids::RESPONSE_WITH_RESULTS,
            with_dialogue(RESPONSE_WITH_RESULTS, "Agent:"),
        ),
        (
            ids::RESPONSE_NO_RESULTS,
            with_dialogue(RESPONSE_NO_RESULTS, "Agent:"),
        ),
        (ids::ANSWER_QA, ANSWER_QA.to_string()),
        (ids::DRAFT_PLAN, DRAFT_PLAN.to_string()),
        (ids::DETAILED_PLAN, DETAILED_PLAN.to_string()),
        (ids::UPDATE_PLAN, UPDATE_PLAN.to_string()),
    ]
}

/// Register every built-in template
pub fn register_defaults(registry: &PromptRegistry) -> Result<()> {
    for (id, source) in default_sources() {
        registry.register(JinjaTemplate::new(id, source)?);
    }
    Ok(())
}

/// Registry pre-populated with the built-in templates
pub fn default_registry() -> Result<PromptRegistry> {
    let registry = PromptRegistry::new();
    register_defaults(&registry)?;
    Ok(registry)
}

/// Built-in templates, overridden by `<id>.prompt` files in `prompt_dir`
#[cfg(feature = "file-loader")]
pub fn load_registry(prompt_dir: Option<&std::path::Path>) -> Result<PromptRegistry> {
    let registry = default_registry()?;
    if let Some(dir) = prompt_dir {
        let loaded = crate::FileLoader::new(dir).load_into(&registry)?;
        tracing::info!("Loaded {} prompt overrides from {}", loaded, dir.display());
    }
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_all_defaults_parse() {
        let registry = default_registry().unwrap();
        assert_eq!(registry.len(), 8);
        for (id, _) in default_sources() {
            assert!(registry.contains(id), "missing {id}");
        }
    }

    #[test]
    fn test_parser_prompt_renders_history() {
        let registry = default_registry().unwrap();
        let prompt = registry
            .render(
                ids::PARSER_SUQL,
                &json!({
                    "dlg": [
                        {
                            "user_utterance": "top etfs",
                            "agent_utterance": "I found QQQ.",
                            "user_target": "SELECT * FROM etfs;",
                            "results_for_ned": [{ "_id": 7, "ticker": "QQQ" }],
                            "db_results": null
                        },
                        { "user_utterance": "tell me more about it" }
                    ],
                    "query": "tell me more about it"
                }),
            )
            .unwrap();

        assert!(prompt.contains("Target: SELECT * FROM etfs;"));
        assert!(prompt.contains("QQQ (_id = 7)"));
        assert!(prompt.trim_end().ends_with("User: tell me more about it\nTarget:"));
    }

    #[test]
    fn test_response_prompt_includes_db_results() {
        let registry = default_registry().unwrap();
        let prompt = registry
            .render(
                ids::RESPONSE_WITH_RESULTS,
                &json!({
                    "dlg": [{
                        "user_utterance": "etfs above 10%",
                        "db_results": "[{\"ticker\": \"SOXL\"}]",
                        "agent_utterance": null
                    }]
                }),
            )
            .unwrap();

        assert!(prompt.contains("[Database returns \"[{\"ticker\": \"SOXL\"}]\"]"));
        assert!(prompt.trim_end().ends_with("Agent:"));
    }

    #[test]
    fn test_answer_qa_type_prompt() {
        let registry = default_registry().unwrap();
        let prompt = registry
            .render(
                ids::ANSWER_QA,
                &json!({
                    "data": ["doc one", "doc two"],
                    "question": "What is the price?",
                    "type_prompt": " Output the result as a numeric value."
                }),
            )
            .unwrap();

        assert!(prompt.contains("doc one\ndoc two"));
        assert!(prompt.contains("What is the price? Output the result as a numeric value."));
    }

    #[cfg(feature = "file-loader")]
    #[test]
    fn test_prompt_dir_overrides_builtin() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("answer_qa.prompt"), "Only {{ question }}").unwrap();

        let registry = load_registry(Some(dir.path())).unwrap();
        assert_eq!(registry.len(), 8);
        let out = registry
            .render(ids::ANSWER_QA, &json!({ "question": "why?" }))
            .unwrap();
        assert_eq!(out, "Only why?");
    }
}

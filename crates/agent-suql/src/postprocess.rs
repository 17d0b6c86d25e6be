//! Textual repair of generated queries
//!
//! The generated query is treated as opaque text. Each [`Rule`] is a pure
//! string rewrite and the rules run in a fixed order: quote escapes, default
//! limit, numeric casts, then text literals.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Fields stored as MONEY that need a cast before numeric comparison
pub const MONEY_FIELDS: &[&str] = &[
    "5_day_return",
    "10_day_return",
    "1_month_return",
    "6_month_return",
    "1_year_return",
];

/// Numeric-looking fields stored as TEXT
pub const TEXT_FIELDS: &[&str] = &[
    "5_day_avg_close",
    "5_day_volatility",
    "5_day_avg_volume",
    "10_day_avg_close",
    "10_day_volatility",
    "10_day_avg_volume",
    "1_month_avg_close",
    "1_month_volatility",
    "1_month_avg_volume",
    "6_month_avg_close",
    "6_month_volatility",
    "6_month_avg_volume",
    "1_year_avg_close",
    "1_year_volatility",
    "1_year_avg_volume",
    "rsi",
    "macd",
    "signal_line",
];

static LIMIT_CLAUSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\blimit\b").expect("limit pattern is valid"));

static TRAILING_TERMINATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r";\s*$").expect("terminator pattern is valid"));

/// A single rewrite step
#[derive(Debug, Clone)]
pub enum Rule {
    /// `\'` becomes `''`
    NormalizeQuoteEscapes,
    /// Add `LIMIT n` before the final terminator when the query has none
    DefaultLimit(u32),
    /// `field OP number` becomes `CAST(field AS NUMERIC) OP number`
    NumericCast(Vec<(String, Regex)>),
    /// `field = value` becomes `field = 'value'`
    QuoteTextLiterals(Vec<(String, Regex)>),
}

impl Rule {
    pub fn numeric_cast<'a>(fields: impl IntoIterator<Item = &'a str>) -> Self {
        Rule::NumericCast(compile(fields, r"(>=|<=|>|<|=)\s*([\d\.]+)"))
    }

    pub fn quote_text_literals<'a>(fields: impl IntoIterator<Item = &'a str>) -> Self {
        Rule::QuoteTextLiterals(compile(fields, r#"(=|!=)\s*([^'"\s;,)]+)"#))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Rule::NormalizeQuoteEscapes => "normalize_quote_escapes",
            Rule::DefaultLimit(_) => "default_limit",
            Rule::NumericCast(_) => "numeric_cast",
            Rule::QuoteTextLiterals(_) => "quote_text_literals",
        }
    }

    pub fn apply(&self, query: &str) -> String {
        match self {
            Rule::NormalizeQuoteEscapes => query.replace("\\'", "''"),
            Rule::DefaultLimit(limit) => {
                if LIMIT_CLAUSE.is_match(query) {
                    query.to_string()
                } else if TRAILING_TERMINATOR.is_match(query) {
                    TRAILING_TERMINATOR
                        .replace(query, format!(" LIMIT {limit};"))
                        .into_owned()
                } else {
                    format!("{} LIMIT {limit}", query.trim_end())
                }
            }
            Rule::NumericCast(patterns) => patterns.iter().fold(query.to_string(), |q, (_, re)| {
                re.replace_all(&q, "CAST(${1} AS NUMERIC) ${2} ${3}").into_owned()
            }),
            Rule::QuoteTextLiterals(patterns) => {
                patterns.iter().fold(query.to_string(), |q, (_, re)| {
                    re.replace_all(&q, "${1} ${2} '${3}'").into_owned()
                })
            }
        }
    }
}

fn compile<'a>(fields: impl IntoIterator<Item = &'a str>, tail: &str) -> Vec<(String, Regex)> {
    fields
        .into_iter()
        .map(|field| {
            let pattern = format!(r"\b({})\s*{tail}", regex::escape(field));
            let re = Regex::new(&pattern).expect("escaped field pattern is valid");
            (field.to_string(), re)
        })
        .collect()
}

/// Ordered list of rewrite rules
#[derive(Debug, Clone)]
pub struct QueryPostProcessor {
    rules: Vec<Rule>,
}

impl QueryPostProcessor {
    /// Processor for the stocks and ETFs schema
    pub fn new(row_limit: u32) -> Self {
        Self::with_rules(vec![
            Rule::NormalizeQuoteEscapes,
            Rule::DefaultLimit(row_limit),
            Rule::numeric_cast(MONEY_FIELDS.iter().copied()),
            Rule::quote_text_literals(TEXT_FIELDS.iter().copied()),
        ])
    }

    pub fn with_rules(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn process(&self, query: &str) -> String {
        self.rules.iter().fold(query.to_string(), |q, rule| {
            let rewritten = rule.apply(&q);
            if rewritten != q {
                debug!(rule = rule.name(), "Rewrote query: {}", rewritten);
            }
            rewritten
        })
    }
}

impl Default for QueryPostProcessor {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_ROW_LIMIT)
    }
}

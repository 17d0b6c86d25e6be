//! Turning raw result rows into model-ready JSON
//!
//! Rows are cleaned (hidden columns dropped, decimals converted to floats)
//! and cut to a prefix that fits the token budget. A separate identifier to
//! display-name index is built from the raw rows for disambiguation in later
//! turns.

use crate::executor::SqlValue;
use crate::tokens::TokenCounter;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

/// A cleaned result row
pub type ShapedRow = Map<String, Value>;

/// Identifier and display name of one result row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NedEntry {
    #[serde(rename = "_id")]
    pub id: Value,
    #[serde(rename = "ticker")]
    pub name: Value,
}

/// Output of [`ResponseShaper::shape`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapedResults {
    pub rows: Vec<ShapedRow>,
    pub ned: Vec<NedEntry>,
}

impl ShapedResults {
    /// Rows as pretty JSON, the form stored on the dialogue turn
    pub fn to_json(&self) -> String {
        pretty_json(&self.rows)
    }
}

/// Serialize with a four-space indent
pub fn pretty_json<T: Serialize + ?Sized>(value: &T) -> String {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    match value.serialize(&mut ser) {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        Err(_) => String::new(),
    }
}

fn to_json_value(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Bool(b) => Value::Bool(*b),
        SqlValue::Int(i) => Value::from(*i),
        SqlValue::Float(f) => float_value(*f),
        SqlValue::Decimal(d) => d.to_f64().map_or(Value::Null, float_value),
        SqlValue::Text(s) => Value::String(s.clone()),
    }
}

fn float_value(f: f64) -> Value {
    serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number)
}

pub struct ResponseShaper {
    counter: Arc<dyn TokenCounter>,
    budget: usize,
    hidden_fields: Vec<String>,
    id_field: String,
    name_field: String,
}

impl ResponseShaper {
    pub fn new(counter: Arc<dyn TokenCounter>, budget: usize) -> Self {
        Self {
            counter,
            budget,
            hidden_fields: vec!["_id".to_string(), "id".to_string()],
            id_field: "_id".to_string(),
            name_field: "ticker".to_string(),
        }
    }

    pub fn with_hidden_fields(mut self, fields: Vec<String>) -> Self {
        self.hidden_fields = fields;
        self
    }

    pub fn with_ned_fields(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.id_field = id.into();
        self.name_field = name.into();
        self
    }

    pub fn shape(&self, rows: &[Vec<SqlValue>], columns: &[String]) -> ShapedResults {
        let ned = self.extract_ned(rows, columns);
        let cleaned = rows.iter().map(|row| self.clean_row(row, columns)).collect();
        let rows = self.truncate(cleaned, self.budget);
        debug!(rows = rows.len(), ned = ned.len(), "Shaped results");
        ShapedResults { rows, ned }
    }

    /// Drop hidden columns and convert decimals to floats
    pub fn clean_row(&self, row: &[SqlValue], columns: &[String]) -> ShapedRow {
        columns
            .iter()
            .zip(row)
            .filter(|(column, _)| !self.hidden_fields.contains(*column))
            .map(|(column, value)| (column.clone(), to_json_value(value)))
            .collect()
    }

    /// Longest prefix whose serialized form stays within `budget` tokens
    ///
    /// Each row is checked together with every row already accepted, and the
    /// first row that would overflow ends the result.
    pub fn truncate(&self, rows: Vec<ShapedRow>, budget: usize) -> Vec<ShapedRow> {
        let mut kept: Vec<ShapedRow> = Vec::with_capacity(rows.len());
        for row in rows {
            kept.push(row);
            if self.counter.count(&pretty_json(&kept)) > budget {
                kept.pop();
                break;
            }
        }
        kept
    }

    /// Identifier and display name of every raw row that has both
    pub fn extract_ned(&self, rows: &[Vec<SqlValue>], columns: &[String]) -> Vec<NedEntry> {
        let id_idx = columns.iter().position(|c| *c == self.id_field);
        let name_idx = columns.iter().position(|c| *c == self.name_field);
        let (Some(id_idx), Some(name_idx)) = (id_idx, name_idx) else {
            return Vec::new();
        };

        rows.iter()
            .filter_map(|row| {
                let id = row.get(id_idx)?;
                let name = row.get(name_idx)?;
                Some(NedEntry {
                    id: to_json_value(id),
                    name: to_json_value(name),
                })
            })
            .collect()
    }
}

use crate::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::postgres::types::PgMoney;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgRow};
use sqlx::{Column, Row, TypeInfo};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

/// A single decoded column value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
}

impl SqlValue {
    /// The value written as a SQL literal
    pub fn to_sql_literal(&self) -> String {
        match self {
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Bool(b) => b.to_string().to_uppercase(),
            SqlValue::Int(i) => i.to_string(),
            SqlValue::Float(f) => f.to_string(),
            SqlValue::Decimal(d) => d.to_string(),
            SqlValue::Text(s) => quote_literal(s),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => Ok(()),
            SqlValue::Bool(b) => write!(f, "{b}"),
            SqlValue::Int(i) => write!(f, "{i}"),
            SqlValue::Float(x) => write!(f, "{x}"),
            SqlValue::Decimal(d) => write!(f, "{d}"),
            SqlValue::Text(s) => f.write_str(s),
        }
    }
}

/// Single-quoted SQL string literal
pub(crate) fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Rows returned by a query, with their column names
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SqlValue>>,
}

/// Executes plain SQL against a named database
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RelationalStore: Send + Sync {
    async fn query(&self, database: &str, sql: &str) -> Result<QueryResult>;
}

/// PostgreSQL store with one pool per database
pub struct PgStore {
    options: PgConnectOptions,
    max_connections: u32,
    pools: Mutex<HashMap<String, PgPool>>,
}

impl PgStore {
    /// Create a store from a connection URL; pools connect lazily
    pub fn new(database_url: &str) -> Result<Self> {
        let options = PgConnectOptions::from_str(database_url)?;
        Ok(Self {
            options,
            max_connections: 5,
            pools: Mutex::new(HashMap::new()),
        })
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    async fn pool(&self, database: &str) -> Result<PgPool> {
        let mut pools = self.pools.lock().await;
        if let Some(pool) = pools.get(database) {
            return Ok(pool.clone());
        }

        info!("Connecting to database {}", database);
        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .connect_with(self.options.clone().database(database))
            .await?;
        pools.insert(database.to_string(), pool.clone());
        Ok(pool)
    }
}

#[async_trait]
impl RelationalStore for PgStore {
    #[instrument(skip(self, sql))]
    async fn query(&self, database: &str, sql: &str) -> Result<QueryResult> {
        let pool = self.pool(database).await?;
        let rows = sqlx::query(sql).fetch_all(&pool).await?;

        let columns = rows
            .first()
            .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();

        let rows = rows
            .iter()
            .map(|row| (0..row.len()).map(|idx| decode_column(row, idx)).collect())
            .collect::<Result<Vec<Vec<SqlValue>>>>()?;

        debug!(rows = rows.len(), "Query returned");
        Ok(QueryResult { columns, rows })
    }
}

fn decode_column(row: &PgRow, idx: usize) -> Result<SqlValue> {
    let type_name = row.column(idx).type_info().name().to_ascii_uppercase();
    let value = match type_name.as_str() {
        "BOOL" => row.try_get::<Option<bool>, _>(idx)?.map(SqlValue::Bool),
        "INT2" => row
            .try_get::<Option<i16>, _>(idx)?
            .map(|v| SqlValue::Int(i64::from(v))),
        "INT4" => row
            .try_get::<Option<i32>, _>(idx)?
            .map(|v| SqlValue::Int(i64::from(v))),
        "INT8" => row.try_get::<Option<i64>, _>(idx)?.map(SqlValue::Int),
        "FLOAT4" => row
            .try_get::<Option<f32>, _>(idx)?
            .map(|v| SqlValue::Float(f64::from(v))),
        "FLOAT8" => row.try_get::<Option<f64>, _>(idx)?.map(SqlValue::Float),
        "NUMERIC" => row.try_get::<Option<Decimal>, _>(idx)?.map(SqlValue::Decimal),
        "MONEY" => row
            .try_get::<Option<PgMoney>, _>(idx)?
            .map(|m| SqlValue::Decimal(m.to_decimal(2))),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => {
            row.try_get::<Option<String>, _>(idx)?.map(SqlValue::Text)
        }
        other => {
            debug!("Column type {} not decoded, reading as text if possible", other);
            row.try_get::<Option<String>, _>(idx).ok().flatten().map(SqlValue::Text)
        }
    };
    Ok(value.unwrap_or(SqlValue::Null))
}

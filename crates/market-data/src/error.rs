//! Error types for market data processing

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarketDataError {
    /// Reading input or writing the summary failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Technical indicator could not be built
    #[error("Technical indicator error: {0}")]
    Indicator(String),
}

pub type Result<T> = std::result::Result<T, MarketDataError>;

impl MarketDataError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| MarketDataError::Io { path, source }
    }
}

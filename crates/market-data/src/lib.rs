//! Market data precomputation
//!
//! Reads daily bar files and writes one summary row per ticker with
//! average close, volatility, average volume and return over several
//! lookback windows, plus RSI, MACD and its signal line. The output
//! columns match the `stocks` and `etfs` tables the agent queries.

pub mod bars;
pub mod error;
pub mod metrics;
pub mod report;

pub use bars::{DailyBar, parse_bars, read_bars};
pub use error::{MarketDataError, Result};
pub use metrics::{MIN_ROWS, TickerSummary, WINDOWS, WindowMetrics, summarize};
pub use report::{SUMMARY_FILE, header, summarize_directory, to_csv, write_summary};

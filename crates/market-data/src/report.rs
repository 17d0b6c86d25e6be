//! Summary CSV output

use crate::bars::read_bars;
use crate::error::{MarketDataError, Result};
use crate::metrics::{TickerSummary, WINDOWS, summarize};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default output file name
pub const SUMMARY_FILE: &str = "summary_etf_data.csv";

/// Column names, matching the `stocks`/`etfs` table schema
pub fn header() -> Vec<String> {
    let mut columns = vec!["ticker".to_string()];
    for (prefix, _) in WINDOWS {
        for metric in ["avg_close", "volatility", "avg_volume", "return"] {
            columns.push(format!("{prefix}_{metric}"));
        }
    }
    columns.extend(["rsi", "macd", "signal_line"].map(String::from));
    columns
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Render summaries as CSV; absent values are empty cells
pub fn to_csv(summaries: &[TickerSummary]) -> String {
    let mut out = header().join(",");
    out.push('\n');
    for summary in summaries {
        let mut cells = vec![escape(&summary.ticker)];
        for window in &summary.windows {
            cells.extend([
                cell(window.avg_close),
                cell(window.volatility),
                cell(window.avg_volume),
                cell(window.return_pct),
            ]);
        }
        cells.extend([cell(summary.rsi), cell(summary.macd), cell(summary.signal_line)]);
        let _ = writeln!(out, "{}", cells.join(","));
    }
    out
}

/// Summarise every `*.txt` file in `dir`, in file name order
pub fn summarize_directory(dir: &Path) -> Result<Vec<TickerSummary>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(MarketDataError::io(dir))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "txt"))
        .collect();
    paths.sort();

    let mut summaries = Vec::new();
    for path in &paths {
        let bars = read_bars(path)?;
        match summarize(&bars)? {
            Some(summary) => summaries.push(summary),
            None => debug!("Skipping {}: only {} rows", path.display(), bars.len()),
        }
    }

    if summaries.is_empty() {
        warn!("No ticker in {} had enough history", dir.display());
    }
    info!("Summarised {} of {} files", summaries.len(), paths.len());
    Ok(summaries)
}

pub fn write_summary(summaries: &[TickerSummary], output: &Path) -> Result<()> {
    fs::write(output, to_csv(summaries)).map_err(MarketDataError::io(output))
}

//! Daily bar files

use crate::error::{MarketDataError, Result};
use chrono::NaiveDate;
use std::fs;
use std::path::Path;

/// One trading day for a ticker
#[derive(Debug, Clone, PartialEq)]
pub struct DailyBar {
    pub ticker: String,
    pub date: NaiveDate,
    pub close: f64,
    pub volume: f64,
}

/// Parse `TICKER,PER,DATE,TIME,OPEN,HIGH,LOW,CLOSE,VOL,OPENINT` rows
///
/// Rows whose date, close or volume do not parse are skipped, which also
/// drops the header. The result is sorted by date.
pub fn parse_bars(content: &str) -> Vec<DailyBar> {
    let mut bars: Vec<DailyBar> = content.lines().filter_map(parse_row).collect();
    bars.sort_by_key(|bar| bar.date);
    bars
}

fn parse_row(line: &str) -> Option<DailyBar> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let ticker = fields.first()?;
    let date = NaiveDate::parse_from_str(fields.get(2)?, "%Y%m%d").ok()?;
    let close = fields.get(7)?.parse::<f64>().ok()?;
    let volume = fields.get(8)?.parse::<f64>().ok()?;
    if !close.is_finite() || !volume.is_finite() {
        return None;
    }
    Some(DailyBar {
        ticker: (*ticker).to_string(),
        date,
        close,
        volume,
    })
}

pub fn read_bars(path: &Path) -> Result<Vec<DailyBar>> {
    let content = fs::read_to_string(path).map_err(MarketDataError::io(path))?;
    Ok(parse_bars(&content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_header_and_bad_rows() {
        let content = "\
<TICKER>,<PER>,<DATE>,<TIME>,<OPEN>,<HIGH>,<LOW>,<CLOSE>,<VOL>,<OPENINT>
QQQ.US,D,20240103,000000,400,405,399,402.5,1000,0
QQQ.US,D,20240102,000000,398,401,397,400.0,1200,0
QQQ.US,D,2024-01-04,000000,1,1,1,1,1,0
QQQ.US,D,20240105,000000,1,1,1,n/a,1,0
QQQ.US,D,20240108
";
        let bars = parse_bars(content);
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bars[0].close, 400.0);
        assert_eq!(bars[1].volume, 1000.0);
        assert_eq!(bars[1].ticker, "QQQ.US");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = read_bars(Path::new("/nonexistent/qqq.us.txt")).unwrap_err();
        assert!(matches!(err, MarketDataError::Io { .. }));
    }
}

//! Per-ticker summary metrics

use crate::bars::DailyBar;
use crate::error::{MarketDataError, Result};
use ta::Next;
use ta::indicators::{ExponentialMovingAverage, SimpleMovingAverage};

/// Fewest rows a ticker needs to be summarised
pub const MIN_ROWS: usize = 5;

/// Lookback windows in trading days, with their column prefix
pub const WINDOWS: [(&str, usize); 5] = [
    ("5_day", 5),
    ("10_day", 10),
    ("1_month", 21),
    ("6_month", 126),
    ("1_year", 252),
];

const RSI_PERIOD: usize = 14;
const MACD_FAST: usize = 12;
const MACD_SLOW: usize = 26;
const MACD_SIGNAL: usize = 9;

/// Metrics over one lookback window; all absent when history is shorter
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WindowMetrics {
    pub avg_close: Option<f64>,
    pub volatility: Option<f64>,
    pub avg_volume: Option<f64>,
    pub return_pct: Option<f64>,
}

/// One row of the summary file
#[derive(Debug, Clone, PartialEq)]
pub struct TickerSummary {
    pub ticker: String,
    /// In the order of [`WINDOWS`]
    pub windows: Vec<WindowMetrics>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub signal_line: Option<f64>,
}

fn indicator_error(e: ta::errors::TaError) -> MarketDataError {
    MarketDataError::Indicator(e.to_string())
}

/// Mean of the last `period` values, or of all of them when there are fewer
fn trailing_mean(values: &[f64], period: usize) -> Result<Option<f64>> {
    let mut sma = SimpleMovingAverage::new(period).map_err(indicator_error)?;
    Ok(values.iter().map(|&v| sma.next(v)).last())
}

/// Sample standard deviation (n - 1 denominator)
///
/// `ta::indicators::StandardDeviation` is the population deviation, which
/// divides by n; volatility columns hold the sample deviation.
fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let avg = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / (n - 1.0);
    Some(variance.sqrt())
}

fn tail<T>(values: &[T], n: usize) -> &[T] {
    &values[values.len().saturating_sub(n)..]
}

/// Day-over-day change; the first day has none
pub fn daily_returns(closes: &[f64]) -> Vec<Option<f64>> {
    std::iter::once(None)
        .chain(closes.windows(2).map(|pair| Some(pair[1] / pair[0] - 1.0)))
        .take(closes.len())
        .collect()
}

pub fn window_metrics(
    closes: &[f64],
    volumes: &[f64],
    returns: &[Option<f64>],
    window: usize,
) -> Result<WindowMetrics> {
    if closes.len() < window || window == 0 {
        return Ok(WindowMetrics::default());
    }
    let recent_returns: Vec<f64> = tail(returns, window).iter().flatten().copied().collect();
    let last = closes[closes.len() - 1];
    let base = closes[closes.len() - window];

    Ok(WindowMetrics {
        avg_close: trailing_mean(closes, window)?,
        volatility: sample_std(&recent_returns),
        avg_volume: trailing_mean(volumes, window)?,
        return_pct: Some((last / base - 1.0) * 100.0),
    })
}

/// RSI from simple rolling means of gains and losses over the last `period` days
pub fn rsi(closes: &[f64], period: usize) -> Result<Option<f64>> {
    let deltas: Vec<f64> = std::iter::once(0.0)
        .chain(closes.windows(2).map(|pair| pair[1] - pair[0]))
        .take(closes.len())
        .collect();
    let gains: Vec<f64> = deltas.iter().map(|d| d.max(0.0)).collect();
    let losses: Vec<f64> = deltas.iter().map(|d| (-d).max(0.0)).collect();

    let (Some(avg_gain), Some(avg_loss)) = (trailing_mean(&gains, period)?, trailing_mean(&losses, period)?)
    else {
        return Ok(None);
    };

    if avg_loss == 0.0 {
        // No losses: saturated when there were gains, undefined otherwise
        return Ok((avg_gain > 0.0).then_some(100.0));
    }
    Ok(Some(100.0 - 100.0 / (1.0 + avg_gain / avg_loss)))
}

fn ema(period: usize) -> Result<ExponentialMovingAverage> {
    ExponentialMovingAverage::new(period).map_err(indicator_error)
}

/// Latest MACD (EMA12 - EMA26) and its EMA9 signal line
pub fn macd(closes: &[f64]) -> Result<Option<(f64, f64)>> {
    let mut fast = ema(MACD_FAST)?;
    let mut slow = ema(MACD_SLOW)?;
    let mut signal = ema(MACD_SIGNAL)?;

    let mut latest = None;
    for &close in closes {
        let line = fast.next(close) - slow.next(close);
        latest = Some((line, signal.next(line)));
    }
    Ok(latest)
}

/// Summarise a ticker's sorted history; `None` below [`MIN_ROWS`]
pub fn summarize(bars: &[DailyBar]) -> Result<Option<TickerSummary>> {
    if bars.len() < MIN_ROWS {
        return Ok(None);
    }
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();
    let returns = daily_returns(&closes);

    let windows = WINDOWS
        .iter()
        .map(|&(_, window)| window_metrics(&closes, &volumes, &returns, window))
        .collect::<Result<Vec<_>>>()?;
    let macd = macd(&closes)?;

    Ok(Some(TickerSummary {
        ticker: bars[0].ticker.clone(),
        windows,
        rsi: rsi(&closes, RSI_PERIOD)?,
        macd: macd.map(|(line, _)| line),
        signal_line: macd.map(|(_, signal)| signal),
    }))
}

//! Historical series abstractions and the trend projection used by `predict`.

use super::error::RatesError;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use tracing::warn;

/// A `BASE/TARGET` pair such as `EUR/USD` or `BTC/USD`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub base: String,
    pub target: String,
}

impl CurrencyPair {
    pub fn new(base: &str, target: &str) -> Self {
        Self {
            base: base.trim().to_uppercase(),
            target: target.trim().to_uppercase(),
        }
    }
}

impl Display for CurrencyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.base, self.target)
    }
}

impl FromStr for CurrencyPair {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (base, target) = s
            .split_once('/')
            .ok_or_else(|| anyhow!("Invalid currency pair: {s}, expected BASE/TARGET"))?;
        let valid = |code: &str| !code.is_empty() && code.chars().all(|c| c.is_ascii_alphabetic());
        if !valid(base.trim()) || !valid(target.trim()) {
            return Err(anyhow!("Invalid currency pair: {s}, expected BASE/TARGET"));
        }
        Ok(CurrencyPair::new(base, target))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPoint {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

#[async_trait]
pub trait HistoryProvider: Send + Sync {
    /// Returns points in ascending time order.
    async fn fetch_series(&self, pair: &CurrencyPair) -> Result<Vec<HistoricalPoint>>;
}

/// Fetches a series, treating any provider failure as an empty series.
pub async fn fetch_historical_series(
    provider: &(dyn HistoryProvider + Send + Sync),
    pair: &CurrencyPair,
) -> Vec<HistoricalPoint> {
    match provider.fetch_series(pair).await {
        Ok(mut points) => {
            points.sort_by_key(|p| p.timestamp);
            points
        }
        Err(e) => {
            warn!(%pair, error = %e, "Historical data unavailable");
            Vec::new()
        }
    }
}

/// Summary figures for a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesSummary {
    pub first: HistoricalPoint,
    pub last: HistoricalPoint,
    pub min: f64,
    pub max: f64,
    pub change_pct: f64,
}

pub fn summarize(points: &[HistoricalPoint]) -> Option<SeriesSummary> {
    let first = *points.first()?;
    let last = *points.last()?;
    let min = points.iter().map(|p| p.close).fold(f64::INFINITY, f64::min);
    let max = points.iter().map(|p| p.close).fold(f64::NEG_INFINITY, f64::max);
    Some(SeriesSummary {
        first,
        last,
        min,
        max,
        change_pct: (last.close - first.close) / first.close * 100.0,
    })
}

/// Projects the close `days` ahead of the last point with an ordinary
/// least-squares line fitted over elapsed days.
pub fn project_trend(
    pair: &CurrencyPair,
    points: &[HistoricalPoint],
    days: u32,
) -> Result<f64, RatesError> {
    let last = points
        .last()
        .ok_or_else(|| RatesError::HistoricalDataUnavailable(pair.to_string()))?;
    if points.len() < 2 {
        return Ok(last.close);
    }

    let origin = points[0].timestamp;
    let xs: Vec<f64> = points
        .iter()
        .map(|p| (p.timestamp - origin).num_seconds() as f64 / 86_400.0)
        .collect();
    let n = points.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.close).sum::<f64>() / n;

    let (mut sxy, mut sxx) = (0.0, 0.0);
    for (x, p) in xs.iter().zip(points) {
        sxy += (x - mean_x) * (p.close - mean_y);
        sxx += (x - mean_x) * (x - mean_x);
    }
    if sxx == 0.0 {
        return Ok(mean_y);
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    let target_x = xs[xs.len() - 1] + f64::from(days);
    Ok(intercept + slope * target_x)
}

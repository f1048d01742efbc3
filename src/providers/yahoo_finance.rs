use super::util::http_client;
use crate::core::history::{CurrencyPair, HistoricalPoint, HistoryProvider};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

/// Daily closes over the last year from the Yahoo Finance chart API.
pub struct YahooHistoryProvider {
    base_url: String,
    crypto_symbols: Vec<String>,
    timeout: Duration,
}

impl YahooHistoryProvider {
    /// `crypto_symbols` lists the codes quoted as `BTC-USD` instead of `EURUSD=X`.
    pub fn new(base_url: &str, crypto_symbols: Vec<String>) -> Self {
        YahooHistoryProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            crypto_symbols: crypto_symbols.iter().map(|s| s.to_uppercase()).collect(),
            timeout: Duration::from_secs(5),
        }
    }

    /// Bounds the whole request, body included.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn ticker(&self, pair: &CurrencyPair) -> String {
        if self.crypto_symbols.contains(&pair.base) {
            format!("{}-{}", pair.base, pair.target)
        } else {
            format!("{}{}=X", pair.base, pair.target)
        }
    }
}

#[derive(Deserialize, Debug)]
struct YahooChartResponse {
    chart: ChartResult,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    result: Option<Vec<ChartItem>>,
}

#[derive(Deserialize, Debug)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Deserialize, Debug)]
struct Quote {
    close: Option<Vec<Option<f64>>>,
}

#[derive(Deserialize, Debug)]
struct ChartItem {
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

fn extract_points(item: &ChartItem) -> Vec<HistoricalPoint> {
    let (Some(timestamps), Some(closes)) = (
        item.timestamp.as_ref(),
        item.indicators
            .as_ref()
            .and_then(|inds| inds.quote.first())
            .and_then(|q| q.close.as_ref()),
    ) else {
        return Vec::new();
    };

    timestamps
        .iter()
        .zip(closes)
        .filter_map(|(ts, close)| {
            let close = close.filter(|c| c.is_finite() && *c > 0.0)?;
            let timestamp = Utc.timestamp_opt(*ts, 0).single()?;
            Some(HistoricalPoint { timestamp, close })
        })
        .collect()
}

impl YahooHistoryProvider {
    async fn fetch_body(&self, url: &str, ticker: &str) -> Result<String> {
        let client = http_client()?;
        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for ticker: {}", e, ticker))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for ticker: {}",
                response.status(),
                ticker
            ));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl HistoryProvider for YahooHistoryProvider {
    #[instrument(
        name = "YahooHistoryFetch",
        skip(self),
        fields(pair = %pair)
    )]
    async fn fetch_series(&self, pair: &CurrencyPair) -> Result<Vec<HistoricalPoint>> {
        let ticker = self.ticker(pair);
        let url = format!(
            "{}/v8/finance/chart/{}?interval=1d&range=1y",
            self.base_url, ticker
        );
        debug!("Requesting historical data from {}", url);

        let text = tokio::time::timeout(self.timeout, self.fetch_body(&url, &ticker))
            .await
            .map_err(|_| {
                anyhow!(
                    "Timed out after {:?} for ticker: {}",
                    self.timeout,
                    ticker
                )
            })??;
        let data: YahooChartResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", ticker, e))?;

        let item = data
            .chart
            .result
            .and_then(|items| items.into_iter().next())
            .ok_or_else(|| anyhow!("No historical data found for ticker: {}", ticker))?;

        Ok(extract_points(&item))
    }
}

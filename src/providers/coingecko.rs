use super::util::{http_client, with_retry};
use crate::core::aggregator::RateSource;
use crate::core::config::CryptoAsset;
use crate::core::rates::RateTable;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

/// Fiat quotes requested alongside the reference currency.
const VS_CURRENCIES: &[&str] = &["usd", "eur"];

/// Crypto spot prices from CoinGecko, denominated in the reference currency.
pub struct CoinGeckoProvider {
    base_url: String,
    assets: Vec<CryptoAsset>,
    reference_currency: String,
}

type SimplePriceResponse = HashMap<String, HashMap<String, f64>>;

impl CoinGeckoProvider {
    pub fn new(base_url: &str, assets: Vec<CryptoAsset>, reference_currency: &str) -> Self {
        CoinGeckoProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            assets,
            reference_currency: reference_currency.to_uppercase(),
        }
    }

    fn request_url(&self) -> String {
        let ids: Vec<&str> = self.assets.iter().map(|a| a.id.as_str()).collect();
        let reference = self.reference_currency.to_lowercase();
        let mut vs: Vec<&str> = VS_CURRENCIES.to_vec();
        if !vs.contains(&reference.as_str()) {
            vs.push(&reference);
        }
        format!(
            "{}/api/v3/simple/price?ids={}&vs_currencies={}",
            self.base_url,
            ids.join(","),
            vs.join(",")
        )
    }

    fn build_table(&self, prices: &SimplePriceResponse) -> Result<RateTable> {
        let reference = self.reference_currency.to_lowercase();
        let mut table = RateTable::anchored(&self.reference_currency);
        for asset in &self.assets {
            let Some(price) = prices.get(&asset.id).and_then(|quotes| quotes.get(&reference))
            else {
                warn!(asset = %asset.id, currency = %reference, "No price in response");
                continue;
            };
            if let Err(e) = table.insert(&asset.symbol, *price) {
                warn!(asset = %asset.id, error = %e, "Skipping invalid crypto price");
            }
        }
        if table.len() <= 1 {
            return Err(anyhow!(
                "No crypto prices found in {} for assets: {}",
                self.reference_currency,
                self.assets
                    .iter()
                    .map(|a| a.id.as_str())
                    .collect::<Vec<_>>()
                    .join(",")
            ));
        }
        Ok(table)
    }
}

#[async_trait]
impl RateSource for CoinGeckoProvider {
    fn name(&self) -> &str {
        "CoinGecko"
    }

    #[instrument(name = "CoinGeckoPriceFetch", skip(self))]
    async fn fetch_rates(&self) -> Result<RateTable> {
        if self.assets.is_empty() {
            return Err(anyhow!("No crypto assets configured"));
        }

        let url = self.request_url();
        debug!("Requesting crypto prices from {}", url);

        let client = http_client()?;
        let response = with_retry(|| client.get(&url).send(), 2, 500)
            .await
            .context("Request error for crypto prices")?;

        if !response.status().is_success() {
            return Err(anyhow!("HTTP error: {} for crypto prices", response.status()));
        }

        let text = response.text().await?;
        let prices: SimplePriceResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse crypto price response: {}", e))?;

        self.build_table(&prices)
    }
}

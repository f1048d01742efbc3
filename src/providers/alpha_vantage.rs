use super::util::{http_client, with_retry};
use crate::core::aggregator::RateSource;
use crate::core::config::AlphaVantageProviderConfig;
use crate::core::rates::RateTable;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Single-currency override from the keyed Alpha Vantage API.
///
/// Quotes are requested as reference -> quote currency, so the returned rate
/// is units of the quote currency per one unit of the reference, the same
/// unit every other table entry uses.
pub struct AlphaVantageProvider {
    base_url: String,
    api_key: String,
    reference_currency: String,
    quote_currency: String,
}

impl AlphaVantageProvider {
    pub fn new(
        base_url: &str,
        api_key: &str,
        reference_currency: &str,
        quote_currency: &str,
    ) -> Self {
        AlphaVantageProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            reference_currency: reference_currency.to_uppercase(),
            quote_currency: quote_currency.to_uppercase(),
        }
    }

    /// Builds the provider when the caller opted in and the key variable is
    /// set. Returns `None` otherwise.
    pub fn from_config(
        config: &AlphaVantageProviderConfig,
        opted_in: bool,
        reference_currency: &str,
    ) -> Option<Self> {
        if !opted_in {
            return None;
        }
        match std::env::var(&config.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Some(Self::new(
                &config.base_url,
                key.trim(),
                reference_currency,
                &config.quote_currency,
            )),
            _ => {
                debug!(
                    "{} is not set, keyed provider disabled",
                    config.api_key_env
                );
                None
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExchangeRateResponse {
    #[serde(rename = "Realtime Currency Exchange Rate")]
    realtime: Option<HashMap<String, String>>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

#[async_trait]
impl RateSource for AlphaVantageProvider {
    fn name(&self) -> &str {
        "Alpha Vantage"
    }

    #[instrument(
        name = "AlphaVantageRateFetch",
        skip(self),
        fields(from = %self.reference_currency, to = %self.quote_currency)
    )]
    async fn fetch_rates(&self) -> Result<RateTable> {
        let pair = format!("{}{}", self.reference_currency, self.quote_currency);
        let endpoint = format!(
            "{}/query?function=CURRENCY_EXCHANGE_RATE&from_currency={}&to_currency={}",
            self.base_url, self.reference_currency, self.quote_currency
        );
        debug!("Requesting keyed rate for {} from {}", pair, endpoint);

        let client = http_client()?;
        let url = format!("{}&apikey={}", endpoint, self.api_key);
        let response = with_retry(|| client.get(&url).send(), 1, 500)
            .await
            // Keep the key out of logged error chains
            .map_err(|e| match e.downcast::<reqwest::Error>() {
                Ok(e) => anyhow::Error::from(e.without_url()),
                Err(e) => e,
            })
            .with_context(|| format!("Request error for currency pair: {pair}"))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for currency pair: {}",
                response.status(),
                pair
            ));
        }

        let text = response.text().await?;
        let data: ExchangeRateResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", pair, e))?;

        if let Some(message) = data.error_message.or(data.note).or(data.information) {
            return Err(anyhow!("Alpha Vantage rejected {}: {}", pair, message));
        }

        let rate = data
            .realtime
            .as_ref()
            .and_then(|fields| fields.get("5. Exchange Rate"))
            .ok_or_else(|| anyhow!("No rate data found for currency pair: {}", pair))?
            .trim()
            .parse::<f64>()
            .with_context(|| format!("Invalid exchange rate for {pair}"))?;

        let mut table = RateTable::anchored(&self.reference_currency);
        table.insert(&self.quote_currency, rate)?;
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_mock_server(status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/query"))
            .and(query_param("function", "CURRENCY_EXCHANGE_RATE"))
            .and(query_param("from_currency", "EUR"))
            .and(query_param("to_currency", "USD"))
            .and(query_param("apikey", "demo"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[tokio::test]
    async fn test_successful_rate_fetch() {
        let body = r#"{
            "Realtime Currency Exchange Rate": {
                "1. From_Currency Code": "EUR",
                "2. From_Currency Name": "Euro",
                "3. To_Currency Code": "USD",
                "4. To_Currency Name": "United States Dollar",
                "5. Exchange Rate": "1.08530000",
                "6. Last Refreshed": "2024-05-17 10:15:01",
                "7. Time Zone": "UTC"
            }
        }"#;
        let mock_server = create_mock_server(200, body).await;
        let provider = AlphaVantageProvider::new(&mock_server.uri(), "demo", "EUR", "USD");

        let table = provider.fetch_rates().await.unwrap();
        assert_eq!(table.codes(), vec!["EUR", "USD"]);
        assert_eq!(table.reference(), "EUR");
        assert_eq!(table.get("USD"), Some(1.0853));
        // Same unit as the reference feed: 100 EUR buys 108.53 USD
        let usd = table.convert(100.0, "EUR", "USD").unwrap();
        assert!((usd - 108.53).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_rate_limit_note_is_error() {
        let body = r#"{"Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute."}"#;
        let mock_server = create_mock_server(200, body).await;
        let provider = AlphaVantageProvider::new(&mock_server.uri(), "demo", "EUR", "USD");

        let err = provider.fetch_rates().await.unwrap_err().to_string();
        assert!(err.starts_with("Alpha Vantage rejected EURUSD"));
    }

    #[tokio::test]
    async fn test_missing_rate_field() {
        let body = r#"{"Realtime Currency Exchange Rate": {"1. From_Currency Code": "EUR"}}"#;
        let mock_server = create_mock_server(200, body).await;
        let provider = AlphaVantageProvider::new(&mock_server.uri(), "demo", "EUR", "USD");

        assert_eq!(
            provider.fetch_rates().await.unwrap_err().to_string(),
            "No rate data found for currency pair: EURUSD"
        );
    }

    #[tokio::test]
    async fn test_zero_rate_is_rejected() {
        let body = r#"{"Realtime Currency Exchange Rate": {"5. Exchange Rate": "0.0000"}}"#;
        let mock_server = create_mock_server(200, body).await;
        let provider = AlphaVantageProvider::new(&mock_server.uri(), "demo", "EUR", "USD");

        assert!(provider.fetch_rates().await.is_err());
    }

    #[test]
    fn test_disabled_without_opt_in_or_key() {
        let config = AlphaVantageProviderConfig {
            api_key_env: "FXDASH_TEST_UNSET_AV_KEY".to_string(),
            ..AlphaVantageProviderConfig::default()
        };
        assert!(AlphaVantageProvider::from_config(&config, false, "EUR").is_none());
        assert!(AlphaVantageProvider::from_config(&config, true, "EUR").is_none());
    }
}

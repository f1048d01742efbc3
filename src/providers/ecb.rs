//! Reference rates from the European Central Bank daily feed.

use super::util::{http_client, with_retry};
use crate::core::aggregator::RateSource;
use crate::core::rates::{RateTable, REFERENCE_CURRENCY};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::{debug, instrument, warn};

const FEED_PATH: &str = "/stats/eurofxref/eurofxref-daily.xml";

pub struct EcbProvider {
    base_url: String,
}

impl EcbProvider {
    pub fn new(base_url: &str) -> Self {
        EcbProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

/// Extracts every `(currency, rate)` attribute pair from the feed.
///
/// Elements missing either attribute are ignored. The rate is returned as the
/// raw attribute text.
pub fn parse_rate_attributes(xml: &str) -> Result<Vec<(String, String)>> {
    let mut reader = Reader::from_str(xml);
    let mut pairs = Vec::new();

    loop {
        match reader.read_event().context("Malformed ECB feed")? {
            Event::Start(element) | Event::Empty(element) => {
                let mut currency = None;
                let mut rate = None;
                for attr in element.attributes() {
                    let attr = attr.context("Malformed attribute in ECB feed")?;
                    match attr.key.as_ref() {
                        b"currency" => currency = Some(attr.unescape_value()?.into_owned()),
                        b"rate" => rate = Some(attr.unescape_value()?.into_owned()),
                        _ => {}
                    }
                }
                if let (Some(currency), Some(rate)) = (currency, rate) {
                    pairs.push((currency, rate));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(pairs)
}

/// Builds a EUR-anchored table from the feed, skipping unusable entries.
pub fn parse_feed(xml: &str) -> Result<RateTable> {
    let mut table = RateTable::anchored(REFERENCE_CURRENCY);
    for (currency, rate) in parse_rate_attributes(xml)? {
        let parsed = match rate.trim().parse::<f64>() {
            Ok(value) => value,
            Err(e) => {
                warn!(%currency, %rate, error = %e, "Skipping unparseable ECB rate");
                continue;
            }
        };
        if let Err(e) = table.insert(&currency, parsed) {
            warn!(error = %e, "Skipping invalid ECB rate");
        }
    }
    Ok(table)
}

#[async_trait]
impl RateSource for EcbProvider {
    fn name(&self) -> &str {
        "ECB"
    }

    #[instrument(name = "EcbRatesFetch", skip(self))]
    async fn fetch_rates(&self) -> Result<RateTable> {
        let url = format!("{}{}", self.base_url, FEED_PATH);
        debug!("Requesting reference rates from {}", url);

        let client = http_client()?;
        let response = with_retry(|| client.get(&url).send(), 2, 300)
            .await
            .with_context(|| format!("Request error for ECB feed: {url}"))?;

        if !response.status().is_success() {
            return Err(anyhow!("HTTP error: {} for ECB feed", response.status()));
        }

        let body = response.text().await?;
        let table = parse_feed(&body)?;
        if table.len() <= 1 {
            return Err(anyhow!("ECB feed contained no rates"));
        }
        Ok(table)
    }
}

//! Fetches rates from every configured source and merges them into one table.
//!
//! Sources fail independently. A failing source is logged and left out of the
//! merge; only when every source fails is the aggregate empty.

use super::cache::TimedSlot;
use super::error::RatesError;
use super::rates::RateTable;
use anyhow::Result;
use async_trait::async_trait;
use std::fmt::Display;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Reference,
    KeyedProvider,
    Crypto,
}

impl Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SourceKind::Reference => "reference",
                SourceKind::KeyedProvider => "keyed",
                SourceKind::Crypto => "crypto",
            }
        )
    }
}

#[async_trait]
pub trait RateSource: Send + Sync {
    /// Human readable provider name, used in logs and the status view.
    fn name(&self) -> &str;

    async fn fetch_rates(&self) -> Result<RateTable>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum SourceOutcome {
    Fetched(RateTable),
    Unavailable { reason: String },
    Disabled,
}

impl SourceOutcome {
    pub fn table(&self) -> Option<&RateTable> {
        match self {
            SourceOutcome::Fetched(table) => Some(table),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceReport {
    pub kind: SourceKind,
    pub name: String,
    pub outcome: SourceOutcome,
}

/// The merged table together with how each source fared.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub table: RateTable,
    pub reports: Vec<SourceReport>,
}

impl Aggregate {
    /// Returns the table, or `EmptyAggregate` when no source produced data.
    pub fn usable_table(&self) -> Result<&RateTable, RatesError> {
        if self.table.is_empty() {
            Err(RatesError::EmptyAggregate)
        } else {
            Ok(&self.table)
        }
    }
}

/// Merges source tables in precedence order: reference feed, then the keyed
/// provider, then crypto. Later sources overwrite earlier ones on collision.
pub fn merge_sources(
    reference_currency: &str,
    reference: &SourceOutcome,
    keyed: &SourceOutcome,
    crypto: &SourceOutcome,
) -> RateTable {
    let mut merged = RateTable::new(reference_currency);
    for table in [reference, keyed, crypto]
        .into_iter()
        .filter_map(SourceOutcome::table)
    {
        if table.reference() != merged.reference() {
            warn!(
                expected = merged.reference(),
                found = table.reference(),
                "Skipping source anchored to a different reference currency"
            );
            continue;
        }
        merged.overlay(table);
    }
    if !merged.is_empty() {
        merged.anchor();
    }
    merged
}

pub struct RateAggregator {
    reference_currency: String,
    reference: Box<dyn RateSource>,
    keyed: Option<Box<dyn RateSource>>,
    crypto: Box<dyn RateSource>,
    timeout: Duration,
    cache: TimedSlot<Aggregate>,
    cache_enabled: bool,
}

impl RateAggregator {
    pub fn new(
        reference_currency: &str,
        reference: Box<dyn RateSource>,
        keyed: Option<Box<dyn RateSource>>,
        crypto: Box<dyn RateSource>,
    ) -> Self {
        Self {
            reference_currency: reference_currency.to_uppercase(),
            reference,
            keyed,
            crypto,
            timeout: Duration::from_secs(5),
            cache: TimedSlot::new(None),
            cache_enabled: false,
        }
    }

    /// Bounds each individual source fetch.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reuses the last non-empty aggregate for `ttl`. A zero TTL disables reuse.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache = TimedSlot::new(Some(ttl));
        self.cache_enabled = !ttl.is_zero();
        self
    }

    /// Fetches all sources concurrently and merges whatever succeeded.
    pub async fn refresh(&self) -> Aggregate {
        if self.cache_enabled {
            if let Some(cached) = self.cache.get().await {
                debug!("Reusing cached aggregate");
                return cached;
            }
        }

        let (reference, keyed, crypto) = futures::join!(
            self.fetch_source(SourceKind::Reference, Some(self.reference.as_ref())),
            self.fetch_source(SourceKind::KeyedProvider, self.keyed.as_deref()),
            self.fetch_source(SourceKind::Crypto, Some(self.crypto.as_ref())),
        );

        let table = merge_sources(
            &self.reference_currency,
            &reference.outcome,
            &keyed.outcome,
            &crypto.outcome,
        );
        info!(currencies = table.len(), "Aggregated exchange rates");

        let aggregate = Aggregate {
            table,
            reports: vec![reference, keyed, crypto],
        };
        if self.cache_enabled && !aggregate.table.is_empty() {
            self.cache.put(aggregate.clone()).await;
        }
        aggregate
    }

    async fn fetch_source(&self, kind: SourceKind, source: Option<&dyn RateSource>) -> SourceReport {
        let Some(source) = source else {
            debug!(%kind, "Source disabled");
            return SourceReport {
                kind,
                name: "-".to_string(),
                outcome: SourceOutcome::Disabled,
            };
        };

        let outcome = match tokio::time::timeout(self.timeout, source.fetch_rates()).await {
            Ok(Ok(table)) => {
                debug!(%kind, source = source.name(), count = table.len(), "Source fetched");
                SourceOutcome::Fetched(table)
            }
            Ok(Err(e)) => {
                warn!(%kind, source = source.name(), error = %e, "Source unavailable");
                SourceOutcome::Unavailable {
                    reason: format!("{e:#}"),
                }
            }
            Err(_) => {
                warn!(%kind, source = source.name(), timeout = ?self.timeout, "Source timed out");
                SourceOutcome::Unavailable {
                    reason: format!("timed out after {:?}", self.timeout),
                }
            }
        };

        SourceReport {
            kind,
            name: source.name().to_string(),
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn table(entries: &[(&str, f64)]) -> RateTable {
        let mut table = RateTable::new("EUR");
        for (code, rate) in entries {
            table.insert(code, *rate).unwrap();
        }
        table
    }

    fn unavailable() -> SourceOutcome {
        SourceOutcome::Unavailable {
            reason: "connection refused".to_string(),
        }
    }

    struct MockSource {
        result: Option<RateTable>,
        delay: Duration,
        calls: Arc<AtomicUsize>,
    }

    impl MockSource {
        fn ok(table: RateTable) -> Self {
            Self {
                result: Some(table),
                delay: Duration::ZERO,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn failing() -> Self {
            Self {
                result: None,
                delay: Duration::ZERO,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl RateSource for MockSource {
        fn name(&self) -> &str {
            "mock"
        }

        async fn fetch_rates(&self) -> Result<RateTable> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.result.clone().ok_or_else(|| anyhow!("mock failure"))
        }
    }

    #[test]
    fn test_keyed_provider_overrides_reference() {
        let reference = SourceOutcome::Fetched(table(&[("USD", 0.9), ("EUR", 1.0)]));
        let keyed = SourceOutcome::Fetched(table(&[("USD", 0.95)]));
        let merged = merge_sources("EUR", &reference, &keyed, &SourceOutcome::Disabled);
        assert_eq!(merged.get("USD"), Some(0.95));
        assert_eq!(merged.get("EUR"), Some(1.0));
    }

    #[test]
    fn test_crypto_is_additive() {
        let reference = SourceOutcome::Fetched(table(&[("EUR", 1.0), ("USD", 0.9)]));
        let crypto = SourceOutcome::Fetched(table(&[("BTC", 60000.0), ("ETH", 3000.0)]));
        let merged = merge_sources("EUR", &reference, &SourceOutcome::Disabled, &crypto);
        assert_eq!(merged.len(), 4);
        assert_eq!(merged.get("EUR"), Some(1.0));
        assert_eq!(merged.get("USD"), Some(0.9));
        assert_eq!(merged.get("BTC"), Some(60000.0));
        assert_eq!(merged.get("ETH"), Some(3000.0));
    }

    #[test]
    fn test_last_writer_wins_for_crypto_collisions() {
        let reference = SourceOutcome::Fetched(table(&[("EUR", 1.0), ("BTC", 1.0e-5)]));
        let crypto = SourceOutcome::Fetched(table(&[("BTC", 60000.0)]));
        let merged = merge_sources("EUR", &reference, &SourceOutcome::Disabled, &crypto);
        assert_eq!(merged.get("BTC"), Some(60000.0));
    }

    #[test]
    fn test_all_sources_failed_gives_empty_table() {
        let merged = merge_sources("EUR", &unavailable(), &SourceOutcome::Disabled, &unavailable());
        assert!(merged.is_empty());
        assert!(matches!(
            merged.convert(1.0, "EUR", "USD"),
            Err(RatesError::UnknownCurrencyCode(_))
        ));
    }

    #[test]
    fn test_crypto_failure_keeps_fiat() {
        let reference = SourceOutcome::Fetched(table(&[("EUR", 1.0), ("USD", 0.9), ("GBP", 0.85)]));
        let keyed = SourceOutcome::Fetched(table(&[("USD", 0.92)]));
        let merged = merge_sources("EUR", &reference, &keyed, &unavailable());
        assert_eq!(merged.codes(), vec!["EUR", "GBP", "USD"]);
        assert_eq!(merged.get("USD"), Some(0.92));
    }

    #[test]
    fn test_crypto_only_is_anchored() {
        let crypto = SourceOutcome::Fetched(table(&[("BTC", 60000.0)]));
        let merged = merge_sources("EUR", &unavailable(), &SourceOutcome::Disabled, &crypto);
        assert_eq!(merged.get("EUR"), Some(1.0));
        assert_eq!(merged.get("BTC"), Some(60000.0));
    }

    #[test]
    fn test_mismatched_reference_is_skipped() {
        let mut usd_based = RateTable::anchored("USD");
        usd_based.insert("JPY", 150.0).unwrap();
        let reference = SourceOutcome::Fetched(table(&[("EUR", 1.0), ("USD", 1.08)]));
        let merged = merge_sources(
            "EUR",
            &reference,
            &SourceOutcome::Fetched(usd_based),
            &SourceOutcome::Disabled,
        );
        assert!(!merged.contains("JPY"));
        assert_eq!(merged.get("USD"), Some(1.08));
    }

    #[tokio::test]
    async fn test_end_to_end_example() {
        let aggregator = RateAggregator::new(
            "EUR",
            Box::new(MockSource::ok(table(&[
                ("EUR", 1.0),
                ("USD", 0.9091),
                ("GBP", 0.8333),
            ]))),
            None,
            Box::new(MockSource::ok(table(&[("BTC", 60000.0), ("ETH", 3000.0)]))),
        );

        let aggregate = aggregator.refresh().await;
        let rates = aggregate.usable_table().unwrap();
        assert_eq!(rates.codes(), vec!["BTC", "ETH", "EUR", "GBP", "USD"]);
        assert_eq!(aggregate.reports[1].outcome, SourceOutcome::Disabled);

        let usd_eur = rates.convert(100.0, "USD", "EUR").unwrap();
        assert!((usd_eur - 110.0).abs() < 0.01);
        assert_eq!(
            rates.convert(1.0, "BTC", "USD").unwrap(),
            (1.0 / 60000.0) * 0.9091
        );
    }

    #[tokio::test]
    async fn test_total_failure_is_empty_aggregate() {
        let aggregator = RateAggregator::new(
            "EUR",
            Box::new(MockSource::failing()),
            Some(Box::new(MockSource::failing())),
            Box::new(MockSource::failing()),
        );

        let aggregate = aggregator.refresh().await;
        assert_eq!(aggregate.usable_table(), Err(RatesError::EmptyAggregate));
        assert!(
            aggregate
                .reports
                .iter()
                .all(|r| matches!(r.outcome, SourceOutcome::Unavailable { .. }))
        );
    }

    #[tokio::test]
    async fn test_slow_source_times_out() {
        let mut slow = MockSource::ok(table(&[("BTC", 60000.0)]));
        slow.delay = Duration::from_secs(5);

        let aggregator = RateAggregator::new(
            "EUR",
            Box::new(MockSource::ok(table(&[("EUR", 1.0), ("USD", 1.08)]))),
            None,
            Box::new(slow),
        )
        .with_timeout(Duration::from_millis(50));

        let aggregate = aggregator.refresh().await;
        assert_eq!(aggregate.table.codes(), vec!["EUR", "USD"]);
        match &aggregate.reports[2].outcome {
            SourceOutcome::Unavailable { reason } => assert!(reason.contains("timed out")),
            other => panic!("Expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_cached_aggregate_is_reused() {
        let reference = MockSource::ok(table(&[("EUR", 1.0), ("USD", 1.08)]));
        let calls = Arc::clone(&reference.calls);
        let aggregator = RateAggregator::new(
            "EUR",
            Box::new(reference),
            None,
            Box::new(MockSource::failing()),
        )
        .with_cache_ttl(Duration::from_secs(60));

        let first = aggregator.refresh().await;
        let second = aggregator.refresh().await;
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_aggregate_is_not_cached() {
        let reference = MockSource::failing();
        let calls = Arc::clone(&reference.calls);
        let aggregator = RateAggregator::new(
            "EUR",
            Box::new(reference),
            None,
            Box::new(MockSource::failing()),
        )
        .with_cache_ttl(Duration::from_secs(60));

        aggregator.refresh().await;
        aggregator.refresh().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}

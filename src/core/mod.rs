//! Core business logic: the rate table, aggregation and historical series.

pub mod aggregator;
pub mod cache;
pub mod config;
pub mod error;
pub mod history;
pub mod i18n;
pub mod log;
pub mod rates;

// Re-export main types for cleaner imports
pub use aggregator::{Aggregate, RateAggregator, RateSource, SourceKind, SourceOutcome};
pub use error::RatesError;
pub use history::{CurrencyPair, HistoricalPoint, HistoryProvider};
pub use i18n::Language;
pub use rates::{ConversionRequest, RateTable, REFERENCE_CURRENCY};

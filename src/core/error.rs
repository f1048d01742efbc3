//! Domain errors surfaced by the rate engine.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RatesError {
    #[error("Unknown currency code: {0}")]
    UnknownCurrencyCode(String),

    #[error("Invalid rate {rate} for currency {code}")]
    InvalidRate { code: String, rate: f64 },

    #[error("Invalid amount: {0}")]
    InvalidAmount(f64),

    #[error("No exchange rate data available from any source")]
    EmptyAggregate,

    #[error("No historical data available for {0}")]
    HistoricalDataUnavailable(String),
}

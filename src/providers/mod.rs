pub mod alpha_vantage;
pub mod coingecko;
pub mod ecb;
pub mod util;
pub mod yahoo_finance;

use crate::core::aggregator::{RateAggregator, RateSource};
use crate::core::config::AppConfig;
use crate::core::rates::REFERENCE_CURRENCY;
use alpha_vantage::AlphaVantageProvider;
use coingecko::CoinGeckoProvider;
use ecb::EcbProvider;
use yahoo_finance::YahooHistoryProvider;

/// Wires the three rate sources from config. The keyed source is only added
/// when `use_keyed` is set, by config or by the caller, and its key is present.
pub fn build_aggregator(config: &AppConfig, use_keyed: bool) -> RateAggregator {
    let providers = &config.providers;
    let reference = EcbProvider::new(&providers.ecb.base_url);
    let keyed = AlphaVantageProvider::from_config(
        &providers.alpha_vantage,
        use_keyed || providers.alpha_vantage.enabled,
        REFERENCE_CURRENCY,
    )
    .map(|p| Box::new(p) as Box<dyn RateSource>);
    let crypto = CoinGeckoProvider::new(
        &providers.coingecko.base_url,
        providers.coingecko.assets.clone(),
        REFERENCE_CURRENCY,
    );

    RateAggregator::new(REFERENCE_CURRENCY, Box::new(reference), keyed, Box::new(crypto))
        .with_timeout(config.fetch_timeout())
        .with_cache_ttl(config.cache_ttl())
}

pub fn build_history_provider(config: &AppConfig) -> YahooHistoryProvider {
    let crypto_symbols = config
        .providers
        .coingecko
        .assets
        .iter()
        .map(|a| a.symbol.clone())
        .collect();
    YahooHistoryProvider::new(&config.providers.yahoo.base_url, crypto_symbols)
        .with_timeout(config.fetch_timeout())
}

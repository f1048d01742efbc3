use super::i18n::Language;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct EcbProviderConfig {
    pub base_url: String,
}

impl Default for EcbProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.ecb.europa.eu".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AlphaVantageProviderConfig {
    pub base_url: String,
    /// Opt-in; the source also needs the key variable to be set.
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Currency quoted against the reference, e.g. `USD` for EUR -> USD.
    #[serde(default = "default_keyed_currency")]
    pub quote_currency: String,
}

fn default_api_key_env() -> String {
    "ALPHA_VANTAGE_API_KEY".to_string()
}

fn default_keyed_currency() -> String {
    "USD".to_string()
}

impl Default for AlphaVantageProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.alphavantage.co".to_string(),
            enabled: false,
            api_key_env: default_api_key_env(),
            quote_currency: default_keyed_currency(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CryptoAsset {
    /// CoinGecko asset id, e.g. `bitcoin`.
    pub id: String,
    /// Code used in the rate table, e.g. `BTC`.
    pub symbol: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CoinGeckoProviderConfig {
    pub base_url: String,
    #[serde(default = "default_crypto_assets")]
    pub assets: Vec<CryptoAsset>,
}

fn default_crypto_assets() -> Vec<CryptoAsset> {
    [("bitcoin", "BTC"), ("ethereum", "ETH")]
        .into_iter()
        .map(|(id, symbol)| CryptoAsset {
            id: id.to_string(),
            symbol: symbol.to_string(),
        })
        .collect()
}

impl Default for CoinGeckoProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.coingecko.com".to_string(),
            assets: default_crypto_assets(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct YahooProviderConfig {
    pub base_url: String,
}

impl Default for YahooProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub ecb: EcbProviderConfig,
    #[serde(default)]
    pub alpha_vantage: AlphaVantageProviderConfig,
    #[serde(default)]
    pub coingecko: CoinGeckoProviderConfig,
    #[serde(default)]
    pub yahoo: YahooProviderConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub language: Language,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

fn default_fetch_timeout_secs() -> u64 {
    5
}

fn default_cache_ttl_secs() -> u64 {
    300
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            language: Language::default(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            cache_ttl_secs: default_cache_ttl_secs(),
            providers: ProvidersConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, falling back to built-in
    /// defaults when no file has been set up.
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "fxdash", "fxdash")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Per-request bound for every remote fetch. Zero would fail every
    /// source at once, so it falls back to the default.
    pub fn fetch_timeout(&self) -> Duration {
        if self.fetch_timeout_secs == 0 {
            warn!(
                "fetch_timeout_secs must be positive, using {}",
                default_fetch_timeout_secs()
            );
            return Duration::from_secs(default_fetch_timeout_secs());
        }
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

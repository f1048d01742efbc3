pub mod cli;
pub mod core;
pub mod providers;

use crate::cli::DisplayContext;
use crate::core::config::AppConfig;
use crate::core::history::CurrencyPair;
use crate::core::i18n::Language;
use crate::core::rates::ConversionRequest;
use anyhow::Result;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Rates,
    Convert(ConversionRequest),
    History(CurrencyPair),
    Alerts,
    Predict { pair: CurrencyPair, days: u32 },
    Shell,
}

/// Per-run settings from the command line.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub config_path: Option<String>,
    /// Overrides the configured language.
    pub language: Option<Language>,
    /// Opts in to the keyed provider for this run.
    pub keyed: bool,
}

pub async fn run_command(command: AppCommand, options: &RunOptions) -> Result<()> {
    info!("fxdash starting...");

    let config = match options.config_path.as_deref() {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let use_keyed = options.keyed || config.providers.alpha_vantage.enabled;
    let ctx = DisplayContext::new(options.language.unwrap_or(config.language), use_keyed);

    match command {
        AppCommand::Rates => {
            let aggregator = providers::build_aggregator(&config, options.keyed);
            cli::rates::run(&aggregator, &ctx).await
        }
        AppCommand::Convert(request) => {
            let aggregator = providers::build_aggregator(&config, options.keyed);
            cli::convert::run(&aggregator, &request, &ctx).await
        }
        AppCommand::History(pair) => {
            let provider = providers::build_history_provider(&config);
            cli::history::run(&provider, &pair, &ctx).await
        }
        AppCommand::Alerts => {
            cli::alerts::run(&ctx);
            Ok(())
        }
        AppCommand::Predict { pair, days } => {
            let provider = providers::build_history_provider(&config);
            cli::predict::run(&provider, &pair, days, &ctx).await
        }
        AppCommand::Shell => {
            let aggregator = providers::build_aggregator(&config, options.keyed);
            cli::shell::run(&aggregator, &ctx).await
        }
    }
}

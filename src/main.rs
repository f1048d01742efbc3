use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxdash::core::history::CurrencyPair;
use fxdash::core::i18n::Language;
use fxdash::core::log::init_logging;
use fxdash::core::rates::ConversionRequest;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Display language (en, el)
    #[arg(short, long, global = true)]
    lang: Option<Language>,

    /// Also query the keyed Alpha Vantage provider (needs ALPHA_VANTAGE_API_KEY)
    #[arg(short, long, global = true)]
    keyed: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display the merged rate table and source status
    Rates,
    /// Convert an amount between two currencies
    Convert {
        amount: f64,
        from: String,
        to: String,
    },
    /// Display the one year history of a currency pair
    History {
        #[arg(default_value = "EUR/USD")]
        pair: CurrencyPair,
    },
    /// Rate alerts (not available yet)
    Alerts,
    /// Project a rate a number of days ahead from its one year trend
    Predict {
        #[arg(short, long, default_value_t = 7, value_parser = clap::value_parser!(u32).range(1..=30))]
        days: u32,
        #[arg(short, long, default_value = "EUR/USD")]
        pair: CurrencyPair,
    },
    /// Convert interactively, one `AMOUNT FROM TO` per line
    Shell,
}

impl From<Commands> for fxdash::AppCommand {
    fn from(cmd: Commands) -> fxdash::AppCommand {
        match cmd {
            Commands::Rates => fxdash::AppCommand::Rates,
            Commands::Convert { amount, from, to } => {
                fxdash::AppCommand::Convert(ConversionRequest::new(amount, &from, &to))
            }
            Commands::History { pair } => fxdash::AppCommand::History(pair),
            Commands::Alerts => fxdash::AppCommand::Alerts,
            Commands::Predict { days, pair } => fxdash::AppCommand::Predict { pair, days },
            Commands::Shell => fxdash::AppCommand::Shell,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let options = fxdash::RunOptions {
        config_path: cli.config_path,
        language: cli.lang,
        keyed: cli.keyed,
    };

    let result = match cli.command {
        Some(Commands::Setup) => fxdash::cli::setup::setup(),
        Some(cmd) => fxdash::run_command(cmd.into(), &options).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

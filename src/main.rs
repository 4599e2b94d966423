use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use kursy::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for kursy::AppCommand {
    fn from(cmd: Commands) -> kursy::AppCommand {
        match cmd {
            Commands::Rates => kursy::AppCommand::Rates,
            Commands::Crypto => kursy::AppCommand::Crypto,
            Commands::Convert { amount, from, to } => {
                kursy::AppCommand::Convert { amount, from, to }
            }
            Commands::History { remove, clear } => kursy::AppCommand::History { remove, clear },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display official fiat rates and the top-rates strip
    Rates,
    /// Display top crypto assets priced in USD
    Crypto,
    /// Convert an amount between two currencies
    Convert {
        /// Amount in the base currency (comma or dot decimals accepted)
        amount: String,
        /// Base currency code, e.g. USD or BTC
        from: String,
        /// Quote currency code, e.g. BYN
        to: String,
    },
    /// Show recent conversions
    History {
        /// Remove the record at this position
        #[arg(long)]
        remove: Option<usize>,
        /// Delete all records
        #[arg(long)]
        clear: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => kursy::run_command(cmd.into(), cli.config_path.as_deref()).await,
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

fn setup() -> anyhow::Result<()> {
    use anyhow::Context;

    let path = kursy::core::config::AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let default_config = r#"---
providers:
  nbrb:
    base_url: "https://api.nbrb.by"
  coingecko:
    base_url: "https://api.coingecko.com"
  goldapi:
    base_url: "https://www.goldapi.io"
    api_key: ""

currencies:
  wanted_fiat: [USD, EUR, RUB, GBP, JPY, CHF, CNY, PLN, KZT, TRY]
  top_fiat: [USD, EUR, RUB]

crypto_count: 10
"#;

    std::fs::write(&path, default_config)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}

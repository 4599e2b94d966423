pub mod cli;
pub mod core;
pub mod providers;
pub mod service;
pub mod store;

use crate::core::config::AppConfig;
use anyhow::Result;
use tracing::debug;

pub enum AppCommand {
    Rates,
    Crypto,
    Convert {
        amount: String,
        from: String,
        to: String,
    },
    History {
        remove: Option<usize>,
        clear: bool,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::Rates => cli::rates::run(&config).await,
        AppCommand::Crypto => cli::crypto::run(&config).await,
        AppCommand::Convert { amount, from, to } => {
            cli::convert::run(&config, &amount, &from, &to).await
        }
        AppCommand::History { remove, clear } => cli::history::run(&config, remove, clear),
    }
}

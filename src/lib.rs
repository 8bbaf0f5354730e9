pub mod cli;
pub mod core;
pub mod providers;
pub mod rate_provider;

pub use rate_provider::{FetchOutcome, RateProvider};

use crate::core::config::AppConfig;
use crate::core::{CurrencyCode, RateTableProvider};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    /// Fetch and print the table for one base currency.
    Rates {
        code: Option<String>,
        only: Vec<String>,
    },
    /// Start with `code` (or the configured currency), then follow base
    /// currency codes from stdin.
    Watch { code: Option<String> },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("xrates starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let provider: Arc<dyn RateTableProvider> = Arc::new(
        providers::CurrencyApiProvider::from_config(&config.provider)?,
    );

    match command {
        AppCommand::Rates { code, only } => {
            let base = config.base_currency(code.as_deref());
            let only: Vec<CurrencyCode> = only.into_iter().map(CurrencyCode::from).collect();
            cli::rates::run(provider, base, &only).await
        }
        AppCommand::Watch { code } => {
            let initial = config.base_currency(code.as_deref());
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let mut stdout = std::io::stdout();
            cli::watch::run(provider, Some(initial), stdin, &mut stdout).await
        }
    }
}

use super::ui;
use crate::core::{CurrencyCode, RateTableProvider};
use crate::rate_provider::{FetchOutcome, RateProvider};
use anyhow::{Context, Result, anyhow};
use std::sync::Arc;

/// Fetches the table for `base` once and prints it.
pub async fn run(
    provider: Arc<dyn RateTableProvider>,
    base: CurrencyCode,
    only: &[CurrencyCode],
) -> Result<()> {
    let rates = RateProvider::new(provider);

    let pb = ui::new_spinner(format!("Fetching rates for {}...", base.as_str().to_uppercase()));
    let outcome = match rates.request(base.clone()) {
        Some(handle) => handle.await.context("Rate fetch task failed")?,
        None => FetchOutcome::Stale,
    };
    pb.finish_and_clear();

    match (outcome, rates.current()) {
        (FetchOutcome::Failed(e), _) => Err(anyhow!(e)),
        (_, Some(snapshot)) => {
            println!("{}", ui::render_snapshot(&snapshot, only));
            Ok(())
        }
        (_, None) => Err(anyhow!("No rates available for {}", base)),
    }
}

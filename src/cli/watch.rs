use super::ui;
use crate::core::{CurrencyCode, RateSnapshot, RateTableProvider};
use crate::rate_provider::{FetchOutcome, RateProvider};
use anyhow::{Context, Result};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// Reads base currency codes line by line from `input` and prints the rate
/// table every time a new one is published. Ends at end of input, after the
/// last requested fetch has resolved.
pub async fn run<R, W>(
    provider: Arc<dyn RateTableProvider>,
    initial: Option<CurrencyCode>,
    input: R,
    out: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let rates = RateProvider::new(provider);
    let mut updates = rates.subscribe();
    let mut lines = input.lines();
    let mut pending: Option<JoinHandle<FetchOutcome>> = None;

    if let Some(code) = initial {
        pending = rates.request(code);
    }

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read currency code")? else {
                    break;
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if let Some(handle) = rates.request(line) {
                    pending = Some(handle);
                } else {
                    debug!("{} is already the requested currency", line);
                }
            }
            changed = updates.changed() => {
                changed.context("Rate updates stopped")?;
                print_update(&mut updates, out)?;
            }
        }
    }

    if let Some(handle) = pending {
        if let FetchOutcome::Failed(e) = handle.await.context("Rate fetch task failed")? {
            writeln!(out, "{}", ui::style_text(&e.to_string(), ui::StyleType::Error))?;
        }
    }
    if updates.has_changed().unwrap_or(false) {
        print_update(&mut updates, out)?;
    }
    Ok(())
}

fn print_update<W: Write>(
    updates: &mut watch::Receiver<Option<RateSnapshot>>,
    out: &mut W,
) -> Result<()> {
    let snapshot = updates.borrow_and_update().clone();
    if let Some(snapshot) = snapshot {
        writeln!(out, "{}\n", ui::render_snapshot(&snapshot, &[]))?;
    }
    Ok(())
}

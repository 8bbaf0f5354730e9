//! Keeps the rate table for the most recently requested base currency.
//!
//! Every change of the requested code issues exactly one fetch. Each fetch is
//! tagged with a sequence number when it is issued, and its result is only
//! published if no newer request has been made in the meantime. Older
//! responses still resolve, they are just discarded.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::core::{CurrencyCode, FetchError, RateSnapshot, RateTable, RateTableProvider};

/// What happened to a single fetch once it resolved.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The snapshot was published.
    Applied,
    /// A newer request was issued, or the provider was dropped, before this
    /// one resolved.
    Stale,
    /// The fetch failed; the published snapshot was left untouched.
    Failed(FetchError),
}

impl FetchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, FetchOutcome::Applied)
    }
}

#[derive(Debug, Default)]
struct RequestState {
    sequence: u64,
    requested: Option<CurrencyCode>,
}

pub struct RateProvider {
    provider: Arc<dyn RateTableProvider>,
    state: Arc<Mutex<RequestState>>,
    published: Arc<watch::Sender<Option<RateSnapshot>>>,
}

impl RateProvider {
    pub fn new(provider: Arc<dyn RateTableProvider>) -> Self {
        let (published, _) = watch::channel(None);
        RateProvider {
            provider,
            state: Arc::new(Mutex::new(RequestState::default())),
            published: Arc::new(published),
        }
    }

    /// Observe published snapshots. `None` until the first successful fetch.
    pub fn subscribe(&self) -> watch::Receiver<Option<RateSnapshot>> {
        self.published.subscribe()
    }

    /// Sets the requested base currency.
    ///
    /// Returns `None` without touching the network when `code` is already the
    /// requested one. Otherwise spawns the fetch on the current tokio runtime
    /// and returns its handle. The previous snapshot stays published until
    /// the new one arrives.
    pub fn request(&self, code: impl Into<CurrencyCode>) -> Option<JoinHandle<FetchOutcome>> {
        let code = code.into();
        let sequence = {
            let mut state = lock(&self.state);
            if state.requested.as_ref() == Some(&code) {
                debug!("Rates for {} already requested, skipping fetch", code);
                return None;
            }
            state.sequence += 1;
            state.requested = Some(code.clone());
            state.sequence
        };
        debug!(%code, sequence, "Issuing rate fetch");

        let provider = Arc::clone(&self.provider);
        let state = Arc::clone(&self.state);
        // In-flight fetches must not keep the channel open after drop.
        let published = Arc::downgrade(&self.published);

        Some(tokio::spawn(async move {
            let result = provider.fetch_rates(&code).await;

            // Held across the publish so a newer request cannot slip in
            // between the sequence check and the send.
            let state = lock(&state);
            let live = Weak::upgrade(&published).filter(|_| state.sequence == sequence);
            match (result, live) {
                (Ok(snapshot), Some(published)) => {
                    debug!(%code, sequence, rates = snapshot.rates.len(), "Publishing rates");
                    published.send_replace(Some(snapshot));
                    FetchOutcome::Applied
                }
                (Ok(_), None) => {
                    debug!(
                        %code,
                        sequence,
                        latest = state.sequence,
                        "Discarding stale rates"
                    );
                    FetchOutcome::Stale
                }
                (Err(e), _) => {
                    warn!(error = %e, "Failed to fetch rates for {}", code);
                    FetchOutcome::Failed(e)
                }
            }
        }))
    }

    /// Forgets the requested code and clears the published snapshot. Fetches
    /// still in flight resolve as stale.
    pub fn reset(&self) {
        let mut state = lock(&self.state);
        state.sequence += 1;
        state.requested = None;
        self.published.send_replace(None);
    }

    pub fn requested(&self) -> Option<CurrencyCode> {
        lock(&self.state).requested.clone()
    }

    pub fn current(&self) -> Option<RateSnapshot> {
        self.published.borrow().clone()
    }

    /// The published table, or an empty one if nothing has been published.
    pub fn rates(&self) -> RateTable {
        self.published
            .borrow()
            .as_ref()
            .map(|snapshot| snapshot.rates.clone())
            .unwrap_or_default()
    }
}

impl Drop for RateProvider {
    fn drop(&mut self) {
        // Fetches still in flight resolve as stale.
        lock(&self.state).sequence += 1;
    }
}

fn lock(state: &Mutex<RequestState>) -> MutexGuard<'_, RequestState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

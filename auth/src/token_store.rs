//! Shared token cache with periodic expiry sweeping
//!
//! One store is created per suite run and handed to every component that reads or
//! writes tokens. Expiry is enforced only by the background sweep: `get` never checks
//! expiry, so a logically expired record stays visible for up to one sweep interval.

use crate::token::TokenRecord;
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Default period between expiry sweeps
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

type TokenMap = FxHashMap<String, TokenRecord>;

/// Identity-keyed token cache
#[derive(Debug)]
pub struct TokenStore {
    tokens: Arc<RwLock<TokenMap>>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
    sweep_interval: Duration,
}

impl TokenStore {
    /// Create a store sweeping every [`DEFAULT_SWEEP_INTERVAL`]
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime
    #[must_use]
    pub fn new() -> Self {
        Self::with_sweep_interval(DEFAULT_SWEEP_INTERVAL)
    }

    /// Create a store with a custom sweep period
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime
    #[must_use]
    pub fn with_sweep_interval(sweep_interval: Duration) -> Self {
        let tokens = Arc::new(RwLock::new(TokenMap::default()));
        let sweeper = spawn_sweeper(Arc::downgrade(&tokens), sweep_interval);

        Self {
            tokens,
            sweeper: Mutex::new(Some(sweeper)),
            sweep_interval,
        }
    }

    /// Insert or overwrite the record for `identity`
    pub fn set(&self, identity: &str, record: TokenRecord) {
        self.tokens.write().insert(identity.to_string(), record);
    }

    /// Current record for `identity`
    #[must_use]
    pub fn get(&self, identity: &str) -> Option<TokenRecord> {
        self.tokens.read().get(identity).cloned()
    }

    /// Remove the record for `identity`, returning whether one existed
    pub fn clear(&self, identity: &str) -> bool {
        self.tokens.write().remove(identity).is_some()
    }

    /// Remove every record
    pub fn clear_all(&self) {
        self.tokens.write().clear();
    }

    /// Number of cached records
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.read().is_empty()
    }

    /// Identities that currently hold a record
    #[must_use]
    pub fn identities(&self) -> Vec<String> {
        self.tokens.read().keys().cloned().collect()
    }

    /// Period of the background sweep
    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    /// Whether the background sweep is still running
    #[must_use]
    pub fn is_sweeping(&self) -> bool {
        self.sweeper
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Evict every record past its expiry right now
    pub fn sweep_expired(&self) -> usize {
        self.sweep_expired_at(Utc::now())
    }

    /// Evict every record past its expiry at `now`, returning how many were removed
    pub fn sweep_expired_at(&self, now: DateTime<Utc>) -> usize {
        sweep(&self.tokens, now)
    }

    /// Stop the background sweep and drop every record
    pub fn destroy(&self) {
        if let Some(handle) = self.sweeper.lock().take() {
            handle.abort();
            debug!("Token sweep stopped");
        }
        self.clear_all();
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TokenStore {
    fn drop(&mut self) {
        if let Some(handle) = self.sweeper.get_mut().take() {
            handle.abort();
        }
    }
}

fn sweep(tokens: &RwLock<TokenMap>, now: DateTime<Utc>) -> usize {
    let mut tokens = tokens.write();
    let before = tokens.len();
    tokens.retain(|identity, record| {
        let expired = record.is_expired_at(now);
        if expired {
            info!("Token for user {} expired, evicting", identity);
        }
        !expired
    });
    before - tokens.len()
}

/// The task holds only a weak reference so it ends once the store is gone
fn spawn_sweeper(tokens: Weak<RwLock<TokenMap>>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let Some(tokens) = tokens.upgrade() else {
                break;
            };
            let evicted = sweep(&tokens, Utc::now());
            if evicted > 0 {
                debug!("Expiry sweep evicted {} token(s)", evicted);
            }
        }
    })
}

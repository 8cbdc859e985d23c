//! Batch login of a whole roster before the suite starts
//!
//! Users are logged in `max_concurrent` at a time. Batches run one after another and a
//! batch is finished only when every login in it has succeeded or used up its retries.
//! The first user (in roster order) that exhausts its retries fails the whole run and
//! later batches are not attempted.

use crate::error::{AuthError, AuthenticationFailure};
use crate::login::LoginClient;
use crate::roster::Roster;
use crate::token::TokenRecord;
use crate::token_store::TokenStore;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Concurrency and retry tuning for a batch login
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginSettings {
    max_concurrent: usize,
    retry_attempts: u32,
    retry_delay: Duration,
}

impl LoginSettings {
    /// Validated settings
    ///
    /// # Errors
    /// Returns an error if `max_concurrent` is zero or `retry_attempts` is zero
    pub fn new(
        max_concurrent: usize,
        retry_attempts: u32,
        retry_delay: Duration,
    ) -> Result<Self, AuthError> {
        if max_concurrent == 0 {
            return Err(AuthError::InvalidSettings(
                "maxConcurrent must be greater than zero".to_string(),
            ));
        }
        if retry_attempts == 0 {
            return Err(AuthError::InvalidSettings(
                "retryAttempts must be at least one".to_string(),
            ));
        }

        Ok(Self {
            max_concurrent,
            retry_attempts,
            retry_delay,
        })
    }

    #[must_use]
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    #[must_use]
    pub fn retry_attempts(&self) -> u32 {
        self.retry_attempts
    }

    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }
}

/// Terminal outcome of one user's retry loop
#[derive(Debug)]
pub enum LoginOutcome {
    /// Login succeeded on attempt `attempts`
    Succeeded { record: TokenRecord, attempts: u32 },
    /// Every attempt failed; `failure` is from the last one
    Failed {
        failure: AuthenticationFailure,
        attempts: u32,
    },
}

/// Summary of a completed batch login
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginReport {
    /// Users holding a fresh token, in roster order
    pub logged_in: Vec<String>,
    /// Users skipped because they need no token
    pub skipped: Vec<String>,
    /// Number of batches processed
    pub batches: usize,
}

/// Logs a roster in and keeps the issued tokens in a shared [`TokenStore`]
pub struct LoginService {
    roster: Roster,
    settings: LoginSettings,
    client: Arc<dyn LoginClient>,
    store: Arc<TokenStore>,
    run_lock: Mutex<()>,
}

impl LoginService {
    pub fn new(
        roster: Roster,
        settings: LoginSettings,
        client: Arc<dyn LoginClient>,
        store: Arc<TokenStore>,
    ) -> Self {
        Self {
            roster,
            settings,
            client,
            store,
            run_lock: Mutex::new(()),
        }
    }

    /// Log in every roster user that needs a token.
    ///
    /// Overlapping calls on the same service run one after another.
    ///
    /// # Errors
    /// Returns [`AuthError::RetriesExhausted`] for the first user whose every attempt failed
    pub async fn login_all_users(&self) -> Result<LoginReport, AuthError> {
        let _run = self.run_lock.lock().await;

        info!("Starting parallel login process");
        info!("Max concurrent logins: {}", self.settings.max_concurrent);
        info!("Retry attempts: {}", self.settings.retry_attempts);
        info!("Retry delay: {:?}", self.settings.retry_delay);

        let mut report = LoginReport {
            skipped: self.roster.exempt().map(str::to_string).collect(),
            ..LoginReport::default()
        };
        let pending: Vec<(&str, &str)> = self
            .roster
            .requiring_login()
            .map(|(identity, record)| (identity, record.password.as_str()))
            .collect();

        info!("Total users to login: {}", pending.len());
        debug!("Users exempt from login: {:?}", report.skipped);

        for (index, batch) in pending.chunks(self.settings.max_concurrent).enumerate() {
            let batch_number = index + 1;
            let names: Vec<&str> = batch.iter().map(|(identity, _)| *identity).collect();
            info!("Processing batch {}: {:?}", batch_number, names);

            let outcomes = join_all(
                batch
                    .iter()
                    .map(|(identity, password)| self.retry_login(identity, password)),
            )
            .await;
            report.batches = batch_number;

            let mut first_failure = None;
            for ((identity, _), outcome) in batch.iter().zip(outcomes) {
                match outcome {
                    LoginOutcome::Succeeded { record, attempts } => {
                        debug!("User {} logged in after {} attempt(s)", identity, attempts);
                        self.store.set(identity, record);
                        report.logged_in.push((*identity).to_string());
                    }
                    LoginOutcome::Failed { failure, attempts } => {
                        if first_failure.is_none() {
                            first_failure = Some(AuthError::RetriesExhausted { attempts, failure });
                        }
                    }
                }
            }

            if let Some(err) = first_failure {
                error!("Batch {} failed: {}", batch_number, err);
                return Err(err);
            }
            info!("Batch {} completed", batch_number);
        }

        Ok(report)
    }

    /// Login with fixed-delay retries; only the last failure is reported
    async fn retry_login(&self, identity: &str, password: &str) -> LoginOutcome {
        let attempts = self.settings.retry_attempts;
        let mut attempt = 1;

        loop {
            debug!("Attempt {}/{} for user {}", attempt, attempts, identity);

            match self.client.login(identity, password).await {
                Ok(record) => {
                    return LoginOutcome::Succeeded {
                        record,
                        attempts: attempt,
                    };
                }
                Err(failure) if attempt >= attempts => {
                    error!("All retry attempts failed for user {}: {}", identity, failure);
                    return LoginOutcome::Failed {
                        failure,
                        attempts: attempt,
                    };
                }
                Err(failure) => {
                    warn!(
                        "Retrying login for {} in {:?} after: {}",
                        identity, self.settings.retry_delay, failure
                    );
                    tokio::time::sleep(self.settings.retry_delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Cached token for `identity`
    #[must_use]
    pub fn get_token(&self, identity: &str) -> Option<TokenRecord> {
        self.store.get(identity)
    }

    /// Drop the cached token for `identity`
    pub fn clear_token(&self, identity: &str) -> bool {
        self.store.clear(identity)
    }

    /// Drop every cached token
    pub fn clear_tokens(&self) {
        self.store.clear_all();
    }

    #[must_use]
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    #[must_use]
    pub fn settings(&self) -> LoginSettings {
        self.settings
    }

    /// The shared store this service writes to
    #[must_use]
    pub fn store(&self) -> &Arc<TokenStore> {
        &self.store
    }
}

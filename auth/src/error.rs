//! Error types for credential acquisition and suite configuration

use std::path::PathBuf;
use thiserror::Error;

/// Cause of a single failed login attempt
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoginFailure {
    /// Network error or non-success HTTP status
    #[error("transport failure: {0}")]
    Transport(String),

    /// Success status but the body could not be turned into a token record
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// A failed login attempt for one identity
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("login failed for user {identity}: {cause}")]
pub struct AuthenticationFailure {
    /// Identity whose login failed
    pub identity: String,
    /// What went wrong on the wire
    #[source]
    pub cause: LoginFailure,
}

impl AuthenticationFailure {
    /// Failure caused by the network or an HTTP error status
    pub fn transport(identity: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            cause: LoginFailure::Transport(message.into()),
        }
    }

    /// Failure caused by an unusable response body
    pub fn malformed(identity: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            cause: LoginFailure::MalformedResponse(message.into()),
        }
    }
}

/// Errors surfaced by the login service to its callers
#[derive(Debug, Error)]
pub enum AuthError {
    /// An identity failed every configured login attempt
    #[error("all {attempts} login attempts failed for user {}", .failure.identity)]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
        /// Failure of the final attempt
        #[source]
        failure: AuthenticationFailure,
    },

    /// Parallel login settings out of range
    #[error("invalid login settings: {0}")]
    InvalidSettings(String),

    /// HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

impl AuthError {
    /// Identity named by the error, if any
    #[must_use]
    pub fn identity(&self) -> Option<&str> {
        match self {
            Self::RetriesExhausted { failure, .. } => Some(&failure.identity),
            Self::InvalidSettings(_) | Self::HttpClient(_) => None,
        }
    }
}

/// Configuration loading and lookup errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for the expected shape
    #[error("failed to parse config {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    /// Selected environment is missing from the configuration
    #[error("environment {0} not found in configuration")]
    UnknownEnvironment(String),

    /// User key is missing from the selected environment
    #[error("user {user} not found in {environment} environment")]
    UnknownUser { user: String, environment: String },

    /// Actor type is missing from the configuration
    #[error("actor type {0} not found in configuration")]
    UnknownActor(String),

    /// Parallel login tuning block is out of range
    #[error(transparent)]
    Settings(#[from] AuthError),
}

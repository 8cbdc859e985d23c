//! Credential bootstrap for the math API end-to-end suite
//!
//! Logs every configured test user in before any scenario runs and keeps the issued
//! tokens in a shared, self-expiring cache.

#![deny(warnings)]
#![deny(clippy::all)]

pub mod config;
pub mod error;
pub mod login;
pub mod orchestrator;
pub mod roster;
pub mod summary;
pub mod token;
pub mod token_store;

pub use config::{SharedConfig, SuiteConfig, SuiteSettings};
pub use error::{AuthError, AuthenticationFailure, ConfigError, LoginFailure};
pub use login::{HttpLoginClient, LoginClient};
pub use orchestrator::{LoginOutcome, LoginReport, LoginService, LoginSettings};
pub use roster::{CredentialRecord, Roster};
pub use summary::{LoginSummary, TokenStatus};
pub use token::{SessionInfo, TokenRecord, UserInfo, parse_session_timestamp};
pub use token_store::TokenStore;

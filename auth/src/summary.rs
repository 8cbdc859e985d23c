//! Per-user login status table printed after the batch login

use crate::roster::Roster;
use crate::token_store::TokenStore;
use std::fmt;

const USERNAME_HEADER: &str = "Username";
const STATUS_HEADER: &str = "Token Status";
const MIN_STATUS_WIDTH: usize = 20;

/// Login status of one roster user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStatus {
    /// User is exempt from login
    NoTokenRequired,
    /// User holds a token; carries a short preview
    Issued(String),
    /// User should hold a token but does not
    LoginFailed,
}

impl fmt::Display for TokenStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoTokenRequired => f.write_str("no token required"),
            Self::Issued(preview) => f.write_str(preview),
            Self::LoginFailed => f.write_str("login failed"),
        }
    }
}

/// Status of every roster user, in roster order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSummary {
    rows: Vec<(String, TokenStatus)>,
}

impl LoginSummary {
    /// Snapshot the store for every user in `roster`
    #[must_use]
    pub fn collect(roster: &Roster, store: &TokenStore) -> Self {
        let rows = roster
            .iter()
            .map(|(identity, record)| {
                let status = if record.no_auth_required {
                    TokenStatus::NoTokenRequired
                } else if let Some(token) = store.get(identity) {
                    TokenStatus::Issued(token.token_preview())
                } else {
                    TokenStatus::LoginFailed
                };
                (identity.to_string(), status)
            })
            .collect();

        Self { rows }
    }

    #[must_use]
    pub fn rows(&self) -> &[(String, TokenStatus)] {
        &self.rows
    }

    /// Users that should hold a token but do not
    pub fn failed(&self) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .filter(|(_, status)| *status == TokenStatus::LoginFailed)
            .map(|(identity, _)| identity.as_str())
    }
}

impl fmt::Display for LoginSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let username_width = self
            .rows
            .iter()
            .map(|(identity, _)| identity.chars().count())
            .chain(std::iter::once(USERNAME_HEADER.len()))
            .max()
            .unwrap_or(USERNAME_HEADER.len());
        let status_width = STATUS_HEADER.len().max(MIN_STATUS_WIDTH);

        let header = format!(
            "{USERNAME_HEADER:<username_width$} | {STATUS_HEADER:<status_width$}"
        );
        let separator = "-".repeat(header.len());

        writeln!(f, "{separator}")?;
        writeln!(f, "{header}")?;
        writeln!(f, "{separator}")?;
        for (identity, status) in &self.rows {
            writeln!(
                f,
                "{:<username_width$} | {:<status_width$}",
                identity,
                status.to_string()
            )?;
        }
        write!(f, "{separator}")
    }
}

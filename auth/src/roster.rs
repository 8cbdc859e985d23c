//! Ordered roster of test users and their credentials

use indexmap::IndexMap;
use std::fmt;

/// Credentials for one roster entry
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    /// Login password
    pub password: String,
    /// User never logs in and never receives a token
    pub no_auth_required: bool,
}

impl CredentialRecord {
    /// Credentials for a user that logs in
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            no_auth_required: false,
        }
    }

    /// Credentials for a user that is exempt from login
    pub fn exempt() -> Self {
        Self {
            password: String::new(),
            no_auth_required: true,
        }
    }
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("password", &"<redacted>")
            .field("no_auth_required", &self.no_auth_required)
            .finish()
    }
}

/// Users keyed by identity, in configuration order.
///
/// Identities are unique; inserting an existing identity replaces its credentials in place.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    users: IndexMap<String, CredentialRecord>,
}

impl Roster {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    #[must_use]
    pub fn with_user(mut self, identity: impl Into<String>, record: CredentialRecord) -> Self {
        self.insert(identity, record);
        self
    }

    pub fn insert(&mut self, identity: impl Into<String>, record: CredentialRecord) {
        self.users.insert(identity.into(), record);
    }

    #[must_use]
    pub fn get(&self, identity: &str) -> Option<&CredentialRecord> {
        self.users.get(identity)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// All entries in roster order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CredentialRecord)> {
        self.users.iter().map(|(id, record)| (id.as_str(), record))
    }

    /// Entries that must log in, in roster order
    pub fn requiring_login(&self) -> impl Iterator<Item = (&str, &CredentialRecord)> {
        self.iter().filter(|(_, record)| !record.no_auth_required)
    }

    /// Identities exempt from login, in roster order
    pub fn exempt(&self) -> impl Iterator<Item = &str> {
        self.iter()
            .filter(|(_, record)| record.no_auth_required)
            .map(|(id, _)| id)
    }
}

impl<S: Into<String>> FromIterator<(S, CredentialRecord)> for Roster {
    fn from_iter<I: IntoIterator<Item = (S, CredentialRecord)>>(iter: I) -> Self {
        let mut roster = Self::new();
        for (identity, record) in iter {
            roster.insert(identity, record);
        }
        roster
    }
}

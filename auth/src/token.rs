//! Token records issued by the login service

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Zone-less layouts some login services emit; read as UTC
const NAIVE_TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Profile of the logged-in user as reported by the login service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserInfo {
    /// Stable user identifier
    pub user_guid: String,
    /// Login name
    pub username: String,
    /// Email address
    #[serde(default)]
    pub email: String,
    /// Role granted to the user
    #[serde(default)]
    pub role: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
}

/// Session metadata attached to an issued token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionInfo {
    /// Session identifier
    #[serde(rename = "id")]
    pub session_id: String,
    /// Lifetime of the token in seconds, counted from `created_at`
    pub expires_in: u64,
    /// When the session was created
    #[serde(deserialize_with = "deserialize_created_at")]
    pub created_at: DateTime<Utc>,
}

/// Parse a session timestamp: RFC 3339, or a naive date-time taken as UTC
#[must_use]
pub fn parse_session_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

fn deserialize_created_at<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_session_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unrecognised timestamp: {raw}")))
}

/// Result of a successful login
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenRecord {
    /// Bearer token
    pub token: String,
    /// User profile
    pub user_info: UserInfo,
    /// Session metadata
    pub session: SessionInfo,
    /// Opaque extra payload from the login service
    #[serde(default)]
    pub additional_data: Value,
}

impl TokenRecord {
    /// Logical expiry, `created_at + expires_in`.
    ///
    /// `None` when the sum overflows the representable range; such a record never expires.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let lifetime = i64::try_from(self.session.expires_in).ok()?;
        TimeDelta::try_seconds(lifetime)
            .and_then(|delta| self.session.created_at.checked_add_signed(delta))
    }

    /// Whether the record is past its logical expiry at `now`
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|expiry| now > expiry)
    }

    /// Whether the record is past its logical expiry right now
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Short, log-safe prefix of the token
    #[must_use]
    pub fn token_preview(&self) -> String {
        let prefix: String = self.token.chars().take(3).collect();
        format!("{prefix}...")
    }
}

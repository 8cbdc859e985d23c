//! Suite configuration: environments, user roster and parallel login tuning

use crate::error::ConfigError;
use crate::orchestrator::LoginSettings;
use crate::roster::{CredentialRecord, Roster};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Environment variable selecting the target environment
pub const TEST_ENV_VAR: &str = "TEST_ENV";

/// Environment used when none is selected
pub const DEFAULT_ENVIRONMENT: &str = "local";

/// Contents of `environment.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteConfig {
    /// Per-environment endpoints and users
    pub environments: IndexMap<String, EnvironmentConfig>,
    /// Permissions by actor type
    #[serde(default)]
    pub actor_types: IndexMap<String, ActorType>,
}

/// Endpoints and users of one environment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentConfig {
    /// Base URL of the system under test
    pub base_url: String,
    /// Base URL of the math API
    pub math_api_url: String,
    /// Base URL of the login service
    pub login_service_url: String,
    /// Roster, in file order
    pub users: IndexMap<String, UserConfig>,
}

/// One roster entry as written in the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    /// Display/login name; defaults to the roster key
    #[serde(default)]
    pub username: Option<String>,
    pub password: String,
    /// User needs no token
    #[serde(default)]
    pub no_token: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActorType {
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Contents of `shared-config.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedConfig {
    #[serde(default)]
    pub parallel_login: ParallelLoginConfig,
}

/// Parallel login tuning block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParallelLoginConfig {
    pub max_concurrent: usize,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
}

impl Default for ParallelLoginConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 5,
            retry_attempts: 3,
            retry_delay_ms: 1000,
        }
    }
}

impl ParallelLoginConfig {
    /// Validated login settings
    ///
    /// # Errors
    /// Returns an error if the block is out of range
    pub fn to_settings(&self) -> Result<LoginSettings, ConfigError> {
        Ok(LoginSettings::new(
            self.max_concurrent,
            self.retry_attempts,
            Duration::from_millis(self.retry_delay_ms),
        )?)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        origin: path.display().to_string(),
        source,
    })
}

impl SuiteConfig {
    /// Load from a JSON file
    ///
    /// # Errors
    /// Returns an error if the file is unreadable or malformed
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        read_json(path.as_ref())
    }

    /// Parse from a JSON string
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|source| ConfigError::Parse {
            origin: "<string>".to_string(),
            source,
        })
    }
}

impl SharedConfig {
    /// Load from a JSON file
    ///
    /// # Errors
    /// Returns an error if the file is unreadable or malformed
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        read_json(path.as_ref())
    }
}

/// Username and password of one actor
#[derive(Clone, PartialEq, Eq)]
pub struct ActorCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for ActorCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActorCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Configuration bound to the selected environment
#[derive(Debug, Clone)]
pub struct SuiteSettings {
    environment: String,
    config: SuiteConfig,
}

impl SuiteSettings {
    /// Bind `config` to `environment`
    ///
    /// # Errors
    /// Returns an error if the environment is not configured
    pub fn new(config: SuiteConfig, environment: impl Into<String>) -> Result<Self, ConfigError> {
        let environment = environment.into();
        if !config.environments.contains_key(&environment) {
            return Err(ConfigError::UnknownEnvironment(environment));
        }
        Ok(Self {
            environment,
            config,
        })
    }

    /// Environment name from an explicit choice, else `TEST_ENV`, else `local`
    #[must_use]
    pub fn resolve_environment(explicit: Option<String>) -> String {
        explicit
            .or_else(|| std::env::var(TEST_ENV_VAR).ok())
            .filter(|env| !env.is_empty())
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string())
    }

    #[must_use]
    pub fn environment(&self) -> &str {
        &self.environment
    }

    fn current(&self) -> &EnvironmentConfig {
        // Presence checked in `new`
        &self.config.environments[&self.environment]
    }

    /// Credentials for `user`
    ///
    /// # Errors
    /// Returns an error if the user is not in the current environment
    pub fn actor_credentials(&self, user: &str) -> Result<ActorCredentials, ConfigError> {
        let entry = self
            .current()
            .users
            .get(user)
            .ok_or_else(|| ConfigError::UnknownUser {
                user: user.to_string(),
                environment: self.environment.clone(),
            })?;

        Ok(ActorCredentials {
            username: entry.username.clone().unwrap_or_else(|| user.to_string()),
            password: entry.password.clone(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.current().base_url
    }

    #[must_use]
    pub fn math_api_url(&self) -> &str {
        &self.current().math_api_url
    }

    #[must_use]
    pub fn login_service_url(&self) -> &str {
        &self.current().login_service_url
    }

    /// Every configured user of the current environment, in file order
    #[must_use]
    pub fn all_users(&self) -> &IndexMap<String, UserConfig> {
        &self.current().users
    }

    /// Login roster of the current environment
    #[must_use]
    pub fn roster(&self) -> Roster {
        self.all_users()
            .iter()
            .map(|(identity, user)| {
                let record = if user.no_token {
                    CredentialRecord {
                        password: user.password.clone(),
                        no_auth_required: true,
                    }
                } else {
                    CredentialRecord::new(user.password.clone())
                };
                (identity.clone(), record)
            })
            .collect()
    }

    /// Permissions granted to `actor`
    ///
    /// # Errors
    /// Returns an error if the actor type is not configured
    pub fn actor_permissions(&self, actor: &str) -> Result<&[String], ConfigError> {
        self.config
            .actor_types
            .get(actor)
            .map(|actor_type| actor_type.permissions.as_slice())
            .ok_or_else(|| ConfigError::UnknownActor(actor.to_string()))
    }
}

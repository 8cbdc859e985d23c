//! Single-attempt login against the suite's login service

use crate::error::{AuthError, AuthenticationFailure};
use crate::token::{SessionInfo, TokenRecord, UserInfo};
use crate::token_store::TokenStore;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Path of the login endpoint relative to the login service URL
pub const LOGIN_PATH: &str = "/public/login";

/// Default transport timeout for one login call
pub const DEFAULT_LOGIN_TIMEOUT: Duration = Duration::from_secs(30);

/// One login attempt for one identity. Implementations never retry.
#[async_trait]
pub trait LoginClient: Send + Sync {
    /// Exchange credentials for a token record
    async fn login(&self, identity: &str, password: &str)
    -> Result<TokenRecord, AuthenticationFailure>;
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    pwd: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    aaaa_token: String,
    user_info: UserInfo,
    session: SessionInfo,
    #[serde(default)]
    additional_data: Value,
}

impl From<LoginResponse> for TokenRecord {
    fn from(response: LoginResponse) -> Self {
        Self {
            token: response.aaaa_token,
            user_info: response.user_info,
            session: response.session,
            additional_data: response.additional_data,
        }
    }
}

/// Login client speaking JSON over HTTP.
///
/// Successful logins are also written to the shared [`TokenStore`].
#[derive(Debug)]
pub struct HttpLoginClient {
    http_client: Client,
    login_url: String,
    store: Arc<TokenStore>,
}

impl HttpLoginClient {
    /// Client for `login_service_url` with the default timeout
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built
    pub fn new(login_service_url: &str, store: Arc<TokenStore>) -> Result<Self, AuthError> {
        Self::with_timeout(login_service_url, DEFAULT_LOGIN_TIMEOUT, store)
    }

    /// Client with an explicit transport timeout
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built
    pub fn with_timeout(
        login_service_url: &str,
        timeout: Duration,
        store: Arc<TokenStore>,
    ) -> Result<Self, AuthError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::HttpClient(e.to_string()))?;

        Ok(Self {
            http_client,
            login_url: format!("{}{}", login_service_url.trim_end_matches('/'), LOGIN_PATH),
            store,
        })
    }

    /// Full URL of the login endpoint
    #[must_use]
    pub fn login_url(&self) -> &str {
        &self.login_url
    }
}

#[async_trait]
impl LoginClient for HttpLoginClient {
    async fn login(
        &self,
        identity: &str,
        password: &str,
    ) -> Result<TokenRecord, AuthenticationFailure> {
        info!("Attempting login for user: {} at {}", identity, self.login_url);

        let response = self
            .http_client
            .post(&self.login_url)
            .json(&LoginRequest {
                username: identity,
                pwd: password,
            })
            .send()
            .await
            .map_err(|e| {
                warn!("Login request for user {} failed: {}", identity, e);
                AuthenticationFailure::transport(identity, e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Login failed for user {}: HTTP {}", identity, status);
            return Err(AuthenticationFailure::transport(
                identity,
                format!("HTTP {status} - {body}"),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AuthenticationFailure::transport(identity, e.to_string()))?;

        let parsed: LoginResponse = serde_json::from_str(&body).map_err(|e| {
            warn!("Unusable login response for user {}: {}", identity, e);
            AuthenticationFailure::malformed(identity, e.to_string())
        })?;

        if parsed.aaaa_token.is_empty() {
            return Err(AuthenticationFailure::malformed(identity, "empty token"));
        }

        let record = TokenRecord::from(parsed);
        debug!(
            "Login successful for user: {} (session {}, expires in {}s)",
            identity, record.session.session_id, record.session.expires_in
        );

        self.store.set(identity, record.clone());
        Ok(record)
    }
}

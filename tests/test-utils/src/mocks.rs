//! Mock login service for integration tests

use crate::fixtures::{login_response_body, login_response_body_with_session};
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockBuilder, MockServer, Request, ResponseTemplate};

/// Path served by the mock, matching the real login endpoint
pub const LOGIN_PATH: &str = "/public/login";

/// Login service backed by a wiremock server.
///
/// Responses are scripted per username; a username with no script gets a 404.
pub struct MockLoginServer {
    server: MockServer,
}

impl std::fmt::Debug for MockLoginServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockLoginServer")
            .field("uri", &self.server.uri())
            .finish()
    }
}

impl MockLoginServer {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URL to configure as the login service URL
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    fn login_for(username: &str) -> MockBuilder {
        Mock::given(method("POST"))
            .and(path(LOGIN_PATH))
            .and(body_partial_json(json!({ "username": username })))
    }

    /// Accept every login for `username` with an hour-long session
    pub async fn accept_user(&self, username: &str) {
        Self::login_for(username)
            .respond_with(ResponseTemplate::new(200).set_body_json(login_response_body(username)))
            .mount(&self.server)
            .await;
    }

    /// Accept every login for `username` after `delay`
    pub async fn accept_user_slowly(&self, username: &str, delay: Duration) {
        Self::login_for(username)
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(login_response_body(username))
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    /// Accept logins for `username` with explicit session timing
    pub async fn accept_user_with_session(
        &self,
        username: &str,
        expires_in: u64,
        created_at: DateTime<Utc>,
    ) {
        let body = login_response_body_with_session(username, expires_in, created_at);
        Self::login_for(username)
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Reject every login for `username` with `status`
    pub async fn reject_user(&self, username: &str, status: u16) {
        Self::login_for(username)
            .respond_with(ResponseTemplate::new(status).set_body_string("invalid credentials"))
            .mount(&self.server)
            .await;
    }

    /// Reject the first `times` logins for `username`; later logins fall through to
    /// whatever else is mounted for the user
    pub async fn reject_user_times(&self, username: &str, times: u64, status: u16) {
        Self::login_for(username)
            .respond_with(ResponseTemplate::new(status).set_body_string("temporarily unavailable"))
            .up_to_n_times(times)
            .with_priority(1)
            .mount(&self.server)
            .await;
    }

    /// Answer logins for `username` with a 200 carrying `body` verbatim
    pub async fn respond_raw(&self, username: &str, body: Value) {
        Self::login_for(username)
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Every login request received so far
    pub async fn login_requests(&self) -> Vec<Request> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|request| request.url.path() == LOGIN_PATH)
            .collect()
    }

    /// Number of login requests received for `username`
    pub async fn login_attempts(&self, username: &str) -> usize {
        self.login_requests()
            .await
            .iter()
            .filter(|request| {
                request
                    .body_json::<Value>()
                    .ok()
                    .and_then(|body| {
                        body.get("username")
                            .and_then(Value::as_str)
                            .map(|u| u == username)
                    })
                    .unwrap_or(false)
            })
            .count()
    }

    /// Number of login requests received for all users
    pub async fn total_login_attempts(&self) -> usize {
        self.login_requests().await.len()
    }
}

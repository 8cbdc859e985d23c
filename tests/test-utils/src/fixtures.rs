//! Test fixtures for login responses and suite configuration

use chrono::{DateTime, Utc};
use serde_json::{Value, json};

/// Token issued by the mock login service for `username`
pub fn token_for(username: &str) -> String {
    format!("tok-{username}-0123456789")
}

/// Login response body for `username`, valid for an hour from now
pub fn login_response_body(username: &str) -> Value {
    login_response_body_with_session(username, 3600, Utc::now())
}

/// Login response body with explicit session timing
pub fn login_response_body_with_session(
    username: &str,
    expires_in: u64,
    created_at: DateTime<Utc>,
) -> Value {
    json!({
        "aaaa_token": token_for(username),
        "user_info": {
            "user_guid": format!("guid-{username}"),
            "username": username,
            "email": format!("{username}@example.com"),
            "role": "tester",
            "description": format!("e2e actor {username}")
        },
        "session": {
            "id": format!("session-{username}"),
            "expires_in": expires_in,
            "created_at": created_at.to_rfc3339()
        },
        "additional_data": { "source": "mock-login" }
    })
}

/// One roster entry for [`environment_json`]
#[derive(Debug, Clone)]
pub struct UserFixture {
    pub identity: String,
    pub password: String,
    pub no_token: bool,
}

impl UserFixture {
    pub fn login(identity: &str) -> Self {
        Self {
            identity: identity.to_string(),
            password: format!("{identity}-pass"),
            no_token: false,
        }
    }

    pub fn no_token(identity: &str) -> Self {
        Self {
            identity: identity.to_string(),
            password: String::new(),
            no_token: true,
        }
    }
}

/// `environment.json` content with a single environment named `environment`
pub fn environment_json(
    environment: &str,
    login_service_url: &str,
    users: &[UserFixture],
) -> Value {
    let users: serde_json::Map<String, Value> = users
        .iter()
        .map(|user| {
            (
                user.identity.clone(),
                json!({ "password": user.password, "no_token": user.no_token }),
            )
        })
        .collect();

    let mut environments = serde_json::Map::new();
    environments.insert(
        environment.to_string(),
        json!({
            "baseUrl": "http://localhost:3000",
            "mathApiUrl": "http://localhost:3000/math",
            "loginServiceUrl": login_service_url,
            "users": users
        }),
    );

    json!({
        "environments": environments,
        "actorTypes": {}
    })
}

/// `shared-config.json` content
pub fn shared_config_json(
    max_concurrent: usize,
    retry_attempts: u32,
    retry_delay_ms: u64,
) -> Value {
    json!({
        "parallelLogin": {
            "maxConcurrent": max_concurrent,
            "retryAttempts": retry_attempts,
            "retryDelayMs": retry_delay_ms
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_environment_json_shape() {
        let config = environment_json(
            "local",
            "http://login",
            &[UserFixture::login("alice"), UserFixture::no_token("carol")],
        );
        let users = &config["environments"]["local"]["users"];
        assert_eq!(users["alice"]["password"], "alice-pass");
        assert_eq!(users["carol"]["no_token"], true);
    }
}

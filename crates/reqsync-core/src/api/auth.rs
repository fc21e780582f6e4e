//! Authentication endpoints
//!
//! Login and register are the only unauthenticated calls in the contract.
//! The token returned by login is an opaque bearer credential; the client
//! stores it verbatim and never inspects it.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ApiClient;
use crate::error::Result;

/// Current user profile as returned by `GET /auth/me`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    access_token: String,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

impl ApiClient {
    /// Exchange credentials for a bearer token
    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        debug!(email = %email, "logging in");

        let response = self
            .request(Method::POST, "/auth/login")
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return self.error_response(status, response).await;
        }

        let body: LoginResponse = response.json().await?;
        Ok(body.access_token)
    }

    /// Create a new account
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<()> {
        debug!(email = %email, "registering account");

        let response = self
            .request(Method::POST, "/auth/register")
            .json(&RegisterRequest {
                name,
                email,
                password,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return self.error_response(status, response).await;
        }

        Ok(())
    }

    /// Fetch the profile of the user the stored token belongs to
    ///
    /// A 401 here means the session is dead and the caller should send the
    /// user back through login before doing anything else.
    pub async fn me(&self) -> Result<User> {
        let response = self.request(Method::GET, "/auth/me").send().await?;

        let status = response.status();
        if !status.is_success() {
            return self.error_response(status, response).await;
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_deserializes_without_email() {
        let user: User = serde_json::from_str(r#"{"name": "Ana"}"#).unwrap();
        assert_eq!(user.name, "Ana");
        assert!(user.email.is_none());
    }

    #[test]
    fn test_login_request_wire_shape() {
        let body = serde_json::to_value(LoginRequest {
            email: "ana@example.com",
            password: "s3cret",
        })
        .unwrap();
        assert_eq!(body["email"], "ana@example.com");
        assert_eq!(body["password"], "s3cret");
    }

    #[test]
    fn test_login_response_parses_access_token() {
        let body: LoginResponse =
            serde_json::from_str(r#"{"access_token": "tok-abc", "token_type": "bearer"}"#).unwrap();
        assert_eq!(body.access_token, "tok-abc");
    }
}

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::json;

use super::{check, read_json, SupabaseClient};
use crate::backend::{AuthProvider, AuthSession, AuthUser, BackendError, Credentials};

/// GoTrue password sign-in, token refresh and user lookup.
#[derive(Clone)]
pub struct SupabaseAuth {
    client: SupabaseClient,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    user: AuthUser,
}

/// GoTrue has used both shapes for error bodies.
#[derive(Deserialize, Default)]
struct AuthErrorBody {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
}

impl SupabaseAuth {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    async fn token_grant(
        &self,
        grant_type: &str,
        body: serde_json::Value,
    ) -> Result<AuthSession, BackendError> {
        let resp = self
            .client
            .request(Method::POST, "/auth/v1/token", &Credentials::Anon)
            .query(&[("grant_type", grant_type)])
            .json(&body)
            .send()
            .await?;

        if matches!(resp.status(), StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED) {
            let text = resp.text().await.unwrap_or_default();
            let parsed: AuthErrorBody = serde_json::from_str(&text).unwrap_or_default();
            let message = parsed
                .error_description
                .or(parsed.msg)
                .unwrap_or_else(|| "Invalid login credentials".to_string());
            return Err(BackendError::Unauthorized(message));
        }

        let token: TokenResponse = read_json(resp).await?;
        Ok(AuthSession {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            user: token.user,
        })
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, BackendError> {
        self.token_grant(
            "password",
            json!({ "email": email, "password": password }),
        )
        .await
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<AuthUser>, BackendError> {
        let resp = self
            .client
            .request(
                Method::GET,
                "/auth/v1/user",
                &Credentials::User(access_token.to_string()),
            )
            .send()
            .await?;

        if matches!(resp.status(), StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Ok(None);
        }
        Ok(Some(read_json(resp).await?))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, BackendError> {
        self.token_grant("refresh_token", json!({ "refresh_token": refresh_token }))
            .await
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        let resp = self
            .client
            .request(
                Method::POST,
                "/auth/v1/logout",
                &Credentials::User(access_token.to_string()),
            )
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }
}

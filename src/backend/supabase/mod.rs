//! Client for the hosted backend: PostgREST tables, GoTrue auth and the
//! storage API, all under one project URL.

mod auth;
mod rest;

pub use auth::SupabaseAuth;
pub use rest::SupabaseContent;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use super::{BackendError, Credentials};

/// Shared HTTP client and project coordinates.
#[derive(Clone)]
pub struct SupabaseClient {
    base_url: String,
    anon_key: String,
    client: Client,
}

impl SupabaseClient {
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self, BackendError> {
        let client = Client::builder()
            .user_agent(concat!("portfolio-site/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// A request carrying the project key and the caller's bearer token
    /// (the anon key itself when nobody is signed in).
    pub(crate) fn request(
        &self,
        method: Method,
        path: &str,
        creds: &Credentials,
    ) -> RequestBuilder {
        let bearer = creds.access_token().unwrap_or(&self.anon_key);
        self.client
            .request(method, self.url(path))
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }
}

/// Turn a non-2xx response into `BackendError::Status`, keeping the body for the logs.
pub(crate) async fn check(resp: Response) -> Result<Response, BackendError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(match status {
        reqwest::StatusCode::UNAUTHORIZED => BackendError::Unauthorized(body),
        reqwest::StatusCode::FORBIDDEN => BackendError::Forbidden(body),
        _ => BackendError::Status { status, body },
    })
}

/// Read a JSON body after checking the status.
pub(crate) async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, BackendError> {
    let bytes = check(resp).await?.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Percent-encode each segment of an object path, keeping the separators.
pub(crate) fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let client = SupabaseClient::new("https://example.supabase.co/", "key").unwrap();
        assert_eq!(client.base_url(), "https://example.supabase.co");
        assert_eq!(
            client.url("/rest/v1/anime"),
            "https://example.supabase.co/rest/v1/anime"
        );
    }

    #[test]
    fn test_encode_path_keeps_separators() {
        assert_eq!(encode_path("food/1-miso salmon.jpg"), "food/1-miso%20salmon.jpg");
    }
}

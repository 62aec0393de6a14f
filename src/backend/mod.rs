mod local;
pub(crate) mod supabase;

pub use local::LocalBackend;
pub use supabase::{SupabaseAuth, SupabaseClient, SupabaseContent};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{
    AnimeFields, AnimeRow, Counter, NewPhoto, PhotoChanges, PhotoQuery, PhotoRow,
};
use crate::storage::DatabaseError;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Backend returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Storage error: {0}")]
    Storage(#[from] DatabaseError),
}

/// Who a backend call runs as. Admin writes carry the signed-in user's token
/// so row-level security sees the real user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Anon,
    User(String),
}

impl Credentials {
    pub fn access_token(&self) -> Option<&str> {
        match self {
            Credentials::Anon => None,
            Credentials::User(token) => Some(token),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Tokens issued by a successful sign-in or refresh. Stored in the cookie session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub user: AuthUser,
}

/// Table access on the hosted backend.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn list_anime(&self, creds: &Credentials) -> Result<Vec<AnimeRow>, BackendError>;
    async fn get_anime(
        &self,
        creds: &Credentials,
        id: &str,
    ) -> Result<Option<AnimeRow>, BackendError>;
    async fn insert_anime(
        &self,
        creds: &Credentials,
        fields: &AnimeFields,
    ) -> Result<AnimeRow, BackendError>;
    async fn update_anime(
        &self,
        creds: &Credentials,
        id: &str,
        fields: &AnimeFields,
    ) -> Result<Option<AnimeRow>, BackendError>;
    /// Write a counter column; `None` when no row matched.
    async fn set_anime_counter(
        &self,
        creds: &Credentials,
        id: &str,
        counter: Counter,
        value: i64,
    ) -> Result<Option<i64>, BackendError>;

    async fn list_photos(
        &self,
        creds: &Credentials,
        query: &PhotoQuery,
    ) -> Result<Vec<PhotoRow>, BackendError>;
    async fn get_photo(&self, creds: &Credentials, id: i64)
        -> Result<Option<PhotoRow>, BackendError>;
    async fn insert_photo(
        &self,
        creds: &Credentials,
        photo: &NewPhoto,
    ) -> Result<PhotoRow, BackendError>;
    async fn update_photo(
        &self,
        creds: &Credentials,
        id: i64,
        changes: &PhotoChanges,
    ) -> Result<Option<PhotoRow>, BackendError>;
    async fn set_photo_counter(
        &self,
        creds: &Credentials,
        id: i64,
        counter: Counter,
        value: i64,
    ) -> Result<Option<i64>, BackendError>;
    /// Server-side `increment_photo_likes(photo_id, delta)`.
    async fn increment_photo_likes(
        &self,
        creds: &Credentials,
        id: i64,
        delta: i64,
    ) -> Result<i64, BackendError>;
    /// Server-side `increment_photo_views(photo_ids)`.
    async fn increment_photo_views(
        &self,
        creds: &Credentials,
        ids: &[i64],
    ) -> Result<(), BackendError>;

    async fn is_admin(&self, creds: &Credentials, user_id: &str) -> Result<bool, BackendError>;
}

/// Session-based auth on the hosted backend.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, BackendError>;
    /// `None` when the token is expired or unknown.
    async fn get_user(&self, access_token: &str) -> Result<Option<AuthUser>, BackendError>;
    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, BackendError>;
    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError>;
}

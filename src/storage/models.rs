use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A local account stored in redb
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    /// base64 salt and PBKDF2 hash joined by `$`
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// An issued access or refresh token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRecord {
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

impl TokenRecord {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Access and refresh tokens handed out together
#[derive(Debug, Clone)]
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: String,
}

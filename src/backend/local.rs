use async_trait::async_trait;

use super::{AuthProvider, AuthSession, AuthUser, BackendError, ContentStore, Credentials};
use crate::models::{AnimeFields, AnimeRow, Counter, NewPhoto, PhotoChanges, PhotoQuery, PhotoRow};
use crate::storage::models::{IssuedTokens, UserRecord};
use crate::storage::Database;

/// Development backend over the local redb database.
///
/// Content writes from the admin screens require an admin's access token, the
/// same gate the hosted row-level security policies apply. Counters and reads
/// are open to anonymous callers.
#[derive(Clone)]
pub struct LocalBackend {
    db: Database,
}

impl LocalBackend {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Create (or reset) an account and add it to the admin allowlist.
    pub fn seed_admin(&self, email: &str, password: &str) -> Result<AuthUser, BackendError> {
        let user = self.db.upsert_user(email, password)?;
        self.db.grant_admin(&user.id)?;
        Ok(to_auth_user(&user))
    }

    fn require_admin(&self, creds: &Credentials) -> Result<(), BackendError> {
        let token = creds
            .access_token()
            .ok_or_else(|| BackendError::Unauthorized("sign-in required".to_string()))?;
        let user = self
            .db
            .user_for_access_token(token)?
            .ok_or_else(|| BackendError::Unauthorized("invalid or expired token".to_string()))?;
        if !self.db.is_admin(&user.id)? {
            return Err(BackendError::Forbidden(
                "row-level security denied the write".to_string(),
            ));
        }
        Ok(())
    }
}

fn to_auth_user(user: &UserRecord) -> AuthUser {
    AuthUser {
        id: user.id.clone(),
        email: Some(user.email.clone()),
    }
}

fn to_session(user: &UserRecord, tokens: IssuedTokens) -> AuthSession {
    AuthSession {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        user: to_auth_user(user),
    }
}

#[async_trait]
impl ContentStore for LocalBackend {
    async fn list_anime(&self, _creds: &Credentials) -> Result<Vec<AnimeRow>, BackendError> {
        Ok(self.db.list_anime()?)
    }

    async fn get_anime(
        &self,
        _creds: &Credentials,
        id: &str,
    ) -> Result<Option<AnimeRow>, BackendError> {
        Ok(self.db.get_anime(id)?)
    }

    async fn insert_anime(
        &self,
        creds: &Credentials,
        fields: &AnimeFields,
    ) -> Result<AnimeRow, BackendError> {
        self.require_admin(creds)?;
        Ok(self.db.insert_anime(fields)?)
    }

    async fn update_anime(
        &self,
        creds: &Credentials,
        id: &str,
        fields: &AnimeFields,
    ) -> Result<Option<AnimeRow>, BackendError> {
        self.require_admin(creds)?;
        Ok(self.db.update_anime(id, fields)?)
    }

    async fn set_anime_counter(
        &self,
        _creds: &Credentials,
        id: &str,
        counter: Counter,
        value: i64,
    ) -> Result<Option<i64>, BackendError> {
        Ok(self.db.set_anime_counter(id, counter, value)?)
    }

    async fn list_photos(
        &self,
        _creds: &Credentials,
        query: &PhotoQuery,
    ) -> Result<Vec<PhotoRow>, BackendError> {
        Ok(self.db.list_photos(query)?)
    }

    async fn get_photo(
        &self,
        _creds: &Credentials,
        id: i64,
    ) -> Result<Option<PhotoRow>, BackendError> {
        Ok(self.db.get_photo(id)?)
    }

    async fn insert_photo(
        &self,
        creds: &Credentials,
        photo: &NewPhoto,
    ) -> Result<PhotoRow, BackendError> {
        self.require_admin(creds)?;
        Ok(self.db.insert_photo(photo)?)
    }

    async fn update_photo(
        &self,
        creds: &Credentials,
        id: i64,
        changes: &PhotoChanges,
    ) -> Result<Option<PhotoRow>, BackendError> {
        self.require_admin(creds)?;
        Ok(self.db.update_photo(id, changes)?)
    }

    async fn set_photo_counter(
        &self,
        _creds: &Credentials,
        id: i64,
        counter: Counter,
        value: i64,
    ) -> Result<Option<i64>, BackendError> {
        Ok(self.db.set_photo_counter(id, counter, value)?)
    }

    async fn increment_photo_likes(
        &self,
        _creds: &Credentials,
        id: i64,
        delta: i64,
    ) -> Result<i64, BackendError> {
        self.db
            .increment_photo_likes(id, delta)?
            .ok_or_else(|| BackendError::NotFound(format!("photo {id}")))
    }

    async fn increment_photo_views(
        &self,
        _creds: &Credentials,
        ids: &[i64],
    ) -> Result<(), BackendError> {
        self.db.increment_photo_views(ids)?;
        Ok(())
    }

    async fn is_admin(&self, _creds: &Credentials, user_id: &str) -> Result<bool, BackendError> {
        Ok(self.db.is_admin(user_id)?)
    }
}

#[async_trait]
impl AuthProvider for LocalBackend {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, BackendError> {
        let user = self
            .db
            .verify_password(email, password)?
            .ok_or_else(|| BackendError::Unauthorized("Invalid login credentials".to_string()))?;
        let tokens = self.db.issue_tokens(&user.id)?;
        Ok(to_session(&user, tokens))
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<AuthUser>, BackendError> {
        Ok(self
            .db
            .user_for_access_token(access_token)?
            .as_ref()
            .map(to_auth_user))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, BackendError> {
        let (user, tokens) = self
            .db
            .rotate_refresh_token(refresh_token)?
            .ok_or_else(|| BackendError::Unauthorized("Invalid refresh token".to_string()))?;
        Ok(to_session(&user, tokens))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        self.db.revoke_tokens(access_token)?;
        Ok(())
    }
}

use std::num::NonZeroU32;

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use chrono::{Duration, Utc};
use redb::ReadableTable;
use ring::rand::{SecureRandom, SystemRandom};
use ring::{digest, pbkdf2};

use super::db::{Database, DatabaseError};
use super::models::{IssuedTokens, TokenRecord, UserRecord};
use super::tables::*;

const PBKDF2_ITERATIONS: NonZeroU32 = match NonZeroU32::new(100_000) {
    Some(n) => n,
    None => unreachable!(),
};
const SALT_LEN: usize = 16;
const TOKEN_LEN: usize = 32;

/// Lifetime of an access token before the session must be refreshed
pub const ACCESS_TOKEN_TTL_SECS: i64 = 3600;
pub const REFRESH_TOKEN_TTL_SECS: i64 = 30 * 24 * 3600;

impl Database {
    // ========================================================================
    // Account operations
    // ========================================================================

    /// Create the account, or reset its password when the email already exists
    pub fn upsert_user(&self, email: &str, password: &str) -> Result<UserRecord, DatabaseError> {
        let email_key = email.trim().to_lowercase();
        let password_hash = hash_password(password)?;

        let write_txn = self.begin_write()?;
        let user = {
            let mut emails = write_txn.open_table(USER_EMAILS)?;
            let existing_id = emails.get(email_key.as_str())?.map(|v| v.value().to_string());

            let mut users = write_txn.open_table(USERS)?;
            let existing: Option<UserRecord> = match existing_id {
                Some(ref id) => match users.get(id.as_str())? {
                    Some(data) => Some(rmp_serde::from_slice(data.value())?),
                    None => None,
                },
                None => None,
            };

            let user = match existing {
                Some(mut user) => {
                    user.password_hash = password_hash;
                    user
                }
                None => UserRecord {
                    id: uuid::Uuid::new_v4().to_string(),
                    email: email_key.clone(),
                    password_hash,
                    created_at: Utc::now(),
                },
            };

            let data = rmp_serde::to_vec_named(&user)?;
            users.insert(user.id.as_str(), data.as_slice())?;
            emails.insert(email_key.as_str(), user.id.as_str())?;
            user
        };
        write_txn.commit()?;
        Ok(user)
    }

    pub fn get_user(&self, id: &str) -> Result<Option<UserRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(USERS)?;

        match table.get(id)? {
            Some(data) => Ok(Some(rmp_serde::from_slice(data.value())?)),
            None => Ok(None),
        }
    }

    /// Look up an account by email and check its password
    pub fn verify_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<UserRecord>, DatabaseError> {
        let email_key = email.trim().to_lowercase();
        let read_txn = self.begin_read()?;
        let emails = read_txn.open_table(USER_EMAILS)?;
        let id = match emails.get(email_key.as_str())? {
            Some(data) => data.value().to_string(),
            None => return Ok(None),
        };

        let users = read_txn.open_table(USERS)?;
        let user: UserRecord = match users.get(id.as_str())? {
            Some(data) => rmp_serde::from_slice(data.value())?,
            None => return Ok(None),
        };

        if verify_hash(&user.password_hash, password) {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    // ========================================================================
    // Admin allowlist
    // ========================================================================

    pub fn grant_admin(&self, user_id: &str) -> Result<(), DatabaseError> {
        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(ADMINS)?;
            table.insert(user_id, Utc::now().timestamp())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn is_admin(&self, user_id: &str) -> Result<bool, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(ADMINS)?;
        Ok(table.get(user_id)?.is_some())
    }

    // ========================================================================
    // Tokens
    // ========================================================================

    /// Issue a fresh access/refresh token pair for a user
    pub fn issue_tokens(&self, user_id: &str) -> Result<IssuedTokens, DatabaseError> {
        let tokens = IssuedTokens {
            access_token: random_token()?,
            refresh_token: random_token()?,
        };
        let now = Utc::now();
        let access = TokenRecord {
            user_id: user_id.to_string(),
            expires_at: now + Duration::seconds(ACCESS_TOKEN_TTL_SECS),
        };
        let refresh = TokenRecord {
            user_id: user_id.to_string(),
            expires_at: now + Duration::seconds(REFRESH_TOKEN_TTL_SECS),
        };

        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(ACCESS_TOKENS)?;
            let data = rmp_serde::to_vec_named(&access)?;
            table.insert(tokens.access_token.as_str(), data.as_slice())?;

            let mut table = write_txn.open_table(REFRESH_TOKENS)?;
            let data = rmp_serde::to_vec_named(&refresh)?;
            table.insert(tokens.refresh_token.as_str(), data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(tokens)
    }

    /// Resolve an unexpired access token to its user
    pub fn user_for_access_token(&self, token: &str) -> Result<Option<UserRecord>, DatabaseError> {
        let record: Option<TokenRecord> = {
            let read_txn = self.begin_read()?;
            let table = read_txn.open_table(ACCESS_TOKENS)?;
            let result = match table.get(token)? {
                Some(data) => Some(rmp_serde::from_slice(data.value())?),
                None => None,
            };
            result
        };

        match record {
            Some(record) if !record.is_expired() => self.get_user(&record.user_id),
            _ => Ok(None),
        }
    }

    /// Consume a refresh token and issue a new pair. `None` when the token is
    /// unknown or expired.
    pub fn rotate_refresh_token(
        &self,
        token: &str,
    ) -> Result<Option<(UserRecord, IssuedTokens)>, DatabaseError> {
        let write_txn = self.begin_write()?;
        let record: Option<TokenRecord> = {
            let mut table = write_txn.open_table(REFRESH_TOKENS)?;
            let removed = table.remove(token)?;
            match removed {
                Some(data) => Some(rmp_serde::from_slice(data.value())?),
                None => None,
            }
        };
        write_txn.commit()?;

        let record = match record {
            Some(record) if !record.is_expired() => record,
            _ => return Ok(None),
        };
        let Some(user) = self.get_user(&record.user_id)? else {
            return Ok(None);
        };
        let tokens = self.issue_tokens(&user.id)?;
        Ok(Some((user, tokens)))
    }

    /// Revoke an access token together with every refresh token of its user
    pub fn revoke_tokens(&self, access_token: &str) -> Result<(), DatabaseError> {
        let write_txn = self.begin_write()?;
        {
            let mut access = write_txn.open_table(ACCESS_TOKENS)?;
            let removed: Option<TokenRecord> = match access.remove(access_token)? {
                Some(data) => Some(rmp_serde::from_slice(data.value())?),
                None => None,
            };

            if let Some(record) = removed {
                let mut refresh = write_txn.open_table(REFRESH_TOKENS)?;
                let mut stale = Vec::new();
                for result in refresh.iter()? {
                    let (key, value) = result?;
                    let entry: TokenRecord = rmp_serde::from_slice(value.value())?;
                    if entry.user_id == record.user_id {
                        stale.push(key.value().to_string());
                    }
                }
                for key in stale {
                    refresh.remove(key.as_str())?;
                }
            }
        }
        write_txn.commit()?;
        Ok(())
    }
}

fn random_bytes<const N: usize>() -> Result<[u8; N], DatabaseError> {
    let mut buf = [0u8; N];
    SystemRandom::new()
        .fill(&mut buf)
        .map_err(|_| DatabaseError::Crypto("system random source unavailable".to_string()))?;
    Ok(buf)
}

fn random_token() -> Result<String, DatabaseError> {
    Ok(URL_SAFE_NO_PAD.encode(random_bytes::<TOKEN_LEN>()?))
}

fn hash_password(password: &str) -> Result<String, DatabaseError> {
    let salt = random_bytes::<SALT_LEN>()?;
    let mut hash = [0u8; digest::SHA256_OUTPUT_LEN];
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        PBKDF2_ITERATIONS,
        &salt,
        password.as_bytes(),
        &mut hash,
    );
    Ok(format!("{}${}", STANDARD.encode(salt), STANDARD.encode(hash)))
}

fn verify_hash(stored: &str, password: &str) -> bool {
    let Some((salt_b64, hash_b64)) = stored.split_once('$') else {
        return false;
    };
    let (Ok(salt), Ok(hash)) = (STANDARD.decode(salt_b64), STANDARD.decode(hash_b64)) else {
        return false;
    };
    pbkdf2::verify(
        pbkdf2::PBKDF2_HMAC_SHA256,
        PBKDF2_ITERATIONS,
        &salt,
        password.as_bytes(),
        &hash,
    )
    .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_roundtrip() {
        let stored = hash_password("hunter2").unwrap();
        assert!(verify_hash(&stored, "hunter2"));
        assert!(!verify_hash(&stored, "hunter3"));
        assert!(!verify_hash("garbage", "hunter2"));
    }

    #[test]
    fn test_tokens_are_unique() {
        assert_ne!(random_token().unwrap(), random_token().unwrap());
    }
}

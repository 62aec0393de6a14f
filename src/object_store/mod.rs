mod local;
mod supabase;

pub use local::LocalStore;
pub use supabase::SupabaseStore;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::backend::Credentials;

/// URL prefix the storage API serves public buckets under.
pub const PUBLIC_OBJECT_PREFIX: &str = "/storage/v1/object/public";

#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Object not found: {0}")]
    NotFound(String),
    #[error("Object already exists: {0}")]
    AlreadyExists(String),
    #[error("Invalid object path: {0}")]
    InvalidPath(String),
    #[error("Backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Clone)]
pub struct PutOptions {
    pub content_type: String,
    /// Replace an existing object at the same path instead of failing
    pub upsert: bool,
    /// Seconds clients may cache the public object
    pub cache_control: Option<u32>,
}

impl PutOptions {
    pub fn new(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            upsert: false,
            cache_control: None,
        }
    }
}

/// Abstraction over bucketed object storage.
/// Objects are addressed by bucket plus a slash-separated path.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload an object; returns the stored path within the bucket.
    async fn put(
        &self,
        creds: &Credentials,
        bucket: &str,
        path: &str,
        data: Bytes,
        options: &PutOptions,
    ) -> Result<String, ObjectStoreError>;
    async fn get(&self, bucket: &str, path: &str) -> Result<Bytes, ObjectStoreError>;
    fn public_url(&self, bucket: &str, path: &str) -> String;
}

/// Build a displayable URL from a stored `image_path`.
/// Absolute URLs and site-relative paths pass through untouched.
pub fn media_public_url(base_url: &str, image_path: &str) -> String {
    if image_path.is_empty() {
        return String::new();
    }
    if image_path.starts_with("http://")
        || image_path.starts_with("https://")
        || image_path.starts_with('/')
    {
        return image_path.to_string();
    }
    format!(
        "{}{PUBLIC_OBJECT_PREFIX}/media/{image_path}",
        base_url.trim_end_matches('/')
    )
}

/// Reject empty paths and any `.` / `..` segment.
pub(crate) fn validate_path(path: &str) -> Result<(), ObjectStoreError> {
    let bad = path.is_empty()
        || path
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..");
    if bad {
        return Err(ObjectStoreError::InvalidPath(path.to_string()));
    }
    Ok(())
}

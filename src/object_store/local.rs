use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};

use super::{validate_path, ObjectStore, ObjectStoreError, PutOptions, PUBLIC_OBJECT_PREFIX};
use crate::backend::Credentials;

/// Local filesystem object store for development and testing.
/// Objects live at `<base>/<bucket>/<path>` and are served by the site itself.
pub struct LocalStore {
    base_path: PathBuf,
}

impl LocalStore {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self, std::io::Error> {
        let base_path = base_path.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    fn object_path(&self, bucket: &str, path: &str) -> Result<PathBuf, ObjectStoreError> {
        validate_path(bucket)?;
        validate_path(path)?;
        Ok(self.base_path.join(bucket).join(path))
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn put(
        &self,
        _creds: &Credentials,
        bucket: &str,
        path: &str,
        data: Bytes,
        options: &PutOptions,
    ) -> Result<String, ObjectStoreError> {
        let full = self.object_path(bucket, path)?;
        if !options.upsert && full.exists() {
            return Err(ObjectStoreError::AlreadyExists(format!("{bucket}/{path}")));
        }
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, &data).await?;
        Ok(path.to_string())
    }

    async fn get(&self, bucket: &str, path: &str) -> Result<Bytes, ObjectStoreError> {
        let full = self.object_path(bucket, path)?;
        if !full.is_file() {
            return Err(ObjectStoreError::NotFound(format!("{bucket}/{path}")));
        }
        let data = tokio::fs::read(&full).await?;
        Ok(Bytes::from(data))
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{PUBLIC_OBJECT_PREFIX}/{bucket}/{path}")
    }
}

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Method;
use serde::Deserialize;

use super::{validate_path, ObjectStore, ObjectStoreError, PutOptions, PUBLIC_OBJECT_PREFIX};
use crate::backend::supabase::encode_path;
use crate::backend::{Credentials, SupabaseClient};

/// Hosted storage API object store.
pub struct SupabaseStore {
    client: SupabaseClient,
}

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(rename = "Key")]
    key: Option<String>,
}

impl SupabaseStore {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for SupabaseStore {
    async fn put(
        &self,
        creds: &Credentials,
        bucket: &str,
        path: &str,
        data: Bytes,
        options: &PutOptions,
    ) -> Result<String, ObjectStoreError> {
        validate_path(path)?;
        let url_path = format!("/storage/v1/object/{bucket}/{}", encode_path(path));

        let mut req = self
            .client
            .request(Method::POST, &url_path, creds)
            .header("Content-Type", &options.content_type)
            .header("x-upsert", if options.upsert { "true" } else { "false" });
        if let Some(seconds) = options.cache_control {
            req = req.header("cache-control", format!("max-age={seconds}"));
        }

        let resp = req
            .body(data)
            .send()
            .await
            .map_err(|e| ObjectStoreError::Backend(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::CONFLICT {
            return Err(ObjectStoreError::AlreadyExists(format!("{bucket}/{path}")));
        }
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ObjectStoreError::Backend(format!(
                "storage upload failed ({status}): {body}"
            )));
        }

        // Key comes back as "<bucket>/<path>"
        let stored = resp
            .json::<UploadResponse>()
            .await
            .ok()
            .and_then(|r| r.key)
            .and_then(|key| key.strip_prefix(&format!("{bucket}/")).map(str::to_string))
            .unwrap_or_else(|| path.to_string());
        Ok(stored)
    }

    async fn get(&self, bucket: &str, path: &str) -> Result<Bytes, ObjectStoreError> {
        validate_path(path)?;
        let url_path = format!("{PUBLIC_OBJECT_PREFIX}/{bucket}/{}", encode_path(path));

        let resp = self
            .client
            .request(Method::GET, &url_path, &Credentials::Anon)
            .send()
            .await
            .map_err(|e| ObjectStoreError::Backend(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND
            || resp.status() == reqwest::StatusCode::BAD_REQUEST
        {
            return Err(ObjectStoreError::NotFound(format!("{bucket}/{path}")));
        }

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ObjectStoreError::Backend(format!(
                "storage download failed ({status}): {body}"
            )));
        }

        resp.bytes()
            .await
            .map_err(|e| ObjectStoreError::Backend(e.to_string()))
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}{PUBLIC_OBJECT_PREFIX}/{bucket}/{}",
            self.client.base_url(),
            encode_path(path)
        )
    }
}

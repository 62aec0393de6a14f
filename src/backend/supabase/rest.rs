use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

use super::{check, read_json, SupabaseClient};
use crate::backend::{BackendError, ContentStore, Credentials};
use crate::models::{
    AnimeFields, AnimeRow, Counter, NewPhoto, PhotoChanges, PhotoQuery, PhotoRow,
};

const ANIME_COLUMNS: &str = "id,title,status,total_seasons,seasons_watched,is_favorite,tags,notes,likes,views,sort_order,cover_url";
const PHOTO_COLUMNS: &str =
    "id,category,title,description,image_path,tags,likes,views,created_at";

/// PostgREST-backed table access.
#[derive(Clone)]
pub struct SupabaseContent {
    client: SupabaseClient,
}

#[derive(Deserialize)]
struct LikesRow {
    likes: Option<i64>,
}

#[derive(Deserialize)]
struct ViewsRow {
    views: Option<i64>,
}

#[derive(Deserialize)]
struct AdminRow {
    #[allow(dead_code)]
    user_id: String,
}

impl SupabaseContent {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    fn table(&self, method: Method, table: &str, creds: &Credentials) -> reqwest::RequestBuilder {
        self.client
            .request(method, &format!("/rest/v1/{table}"), creds)
    }

    /// PATCH one counter column and read it back.
    async fn write_counter(
        &self,
        creds: &Credentials,
        table: &str,
        id: &str,
        counter: Counter,
        value: i64,
    ) -> Result<Option<i64>, BackendError> {
        let resp = self
            .table(Method::PATCH, table, creds)
            .query(&[("id", format!("eq.{id}")), ("select", counter.column().to_string())])
            .header("Prefer", "return=representation")
            .json(&json!({ counter.column(): value }))
            .send()
            .await?;

        let updated = match counter {
            Counter::Likes => read_json::<Vec<LikesRow>>(resp)
                .await?
                .into_iter()
                .next()
                .map(|r| r.likes.unwrap_or(0)),
            Counter::Views => read_json::<Vec<ViewsRow>>(resp)
                .await?
                .into_iter()
                .next()
                .map(|r| r.views.unwrap_or(0)),
        };
        Ok(updated)
    }
}

#[async_trait]
impl ContentStore for SupabaseContent {
    async fn list_anime(&self, creds: &Credentials) -> Result<Vec<AnimeRow>, BackendError> {
        let resp = self
            .table(Method::GET, "anime", creds)
            .query(&[("select", ANIME_COLUMNS)])
            .send()
            .await?;
        read_json(resp).await
    }

    async fn get_anime(
        &self,
        creds: &Credentials,
        id: &str,
    ) -> Result<Option<AnimeRow>, BackendError> {
        let resp = self
            .table(Method::GET, "anime", creds)
            .query(&[
                ("select", ANIME_COLUMNS.to_string()),
                ("id", format!("eq.{id}")),
                ("limit", "1".to_string()),
            ])
            .send()
            .await?;
        let rows: Vec<AnimeRow> = read_json(resp).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_anime(
        &self,
        creds: &Credentials,
        fields: &AnimeFields,
    ) -> Result<AnimeRow, BackendError> {
        let resp = self
            .table(Method::POST, "anime", creds)
            .query(&[("select", ANIME_COLUMNS)])
            .header("Prefer", "return=representation")
            .json(fields)
            .send()
            .await?;
        let rows: Vec<AnimeRow> = read_json(resp).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| BackendError::NotFound("inserted anime row not returned".to_string()))
    }

    async fn update_anime(
        &self,
        creds: &Credentials,
        id: &str,
        fields: &AnimeFields,
    ) -> Result<Option<AnimeRow>, BackendError> {
        let resp = self
            .table(Method::PATCH, "anime", creds)
            .query(&[("select", ANIME_COLUMNS.to_string()), ("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(fields)
            .send()
            .await?;
        let rows: Vec<AnimeRow> = read_json(resp).await?;
        Ok(rows.into_iter().next())
    }

    async fn set_anime_counter(
        &self,
        creds: &Credentials,
        id: &str,
        counter: Counter,
        value: i64,
    ) -> Result<Option<i64>, BackendError> {
        self.write_counter(creds, "anime", id, counter, value).await
    }

    async fn list_photos(
        &self,
        creds: &Credentials,
        query: &PhotoQuery,
    ) -> Result<Vec<PhotoRow>, BackendError> {
        let mut params = vec![
            ("select", PHOTO_COLUMNS.to_string()),
            ("order", "created_at.desc".to_string()),
        ];
        if let Some(category) = query.category {
            params.push(("category", format!("eq.{category}")));
        }
        if let Some(limit) = query.limit {
            params.push(("limit", limit.to_string()));
        }

        let resp = self
            .table(Method::GET, "photos", creds)
            .query(&params)
            .send()
            .await?;
        read_json(resp).await
    }

    async fn get_photo(
        &self,
        creds: &Credentials,
        id: i64,
    ) -> Result<Option<PhotoRow>, BackendError> {
        let resp = self
            .table(Method::GET, "photos", creds)
            .query(&[
                ("select", PHOTO_COLUMNS.to_string()),
                ("id", format!("eq.{id}")),
                ("limit", "1".to_string()),
            ])
            .send()
            .await?;
        let rows: Vec<PhotoRow> = read_json(resp).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_photo(
        &self,
        creds: &Credentials,
        photo: &NewPhoto,
    ) -> Result<PhotoRow, BackendError> {
        let resp = self
            .table(Method::POST, "photos", creds)
            .query(&[("select", PHOTO_COLUMNS)])
            .header("Prefer", "return=representation")
            .json(photo)
            .send()
            .await?;
        let rows: Vec<PhotoRow> = read_json(resp).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| BackendError::NotFound("inserted photo row not returned".to_string()))
    }

    async fn update_photo(
        &self,
        creds: &Credentials,
        id: i64,
        changes: &PhotoChanges,
    ) -> Result<Option<PhotoRow>, BackendError> {
        let resp = self
            .table(Method::PATCH, "photos", creds)
            .query(&[("select", PHOTO_COLUMNS.to_string()), ("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(changes)
            .send()
            .await?;
        let rows: Vec<PhotoRow> = read_json(resp).await?;
        Ok(rows.into_iter().next())
    }

    async fn set_photo_counter(
        &self,
        creds: &Credentials,
        id: i64,
        counter: Counter,
        value: i64,
    ) -> Result<Option<i64>, BackendError> {
        self.write_counter(creds, "photos", &id.to_string(), counter, value)
            .await
    }

    async fn increment_photo_likes(
        &self,
        creds: &Credentials,
        id: i64,
        delta: i64,
    ) -> Result<i64, BackendError> {
        let resp = self
            .client
            .request(Method::POST, "/rest/v1/rpc/increment_photo_likes", creds)
            .json(&json!({ "photo_id": id, "delta": delta }))
            .send()
            .await?;

        // A null or empty result still means the increment ran; read the stored count back
        let bytes = check(resp).await?.bytes().await?;
        let likes: Option<i64> = if bytes.iter().all(u8::is_ascii_whitespace) {
            None
        } else {
            serde_json::from_slice(&bytes)?
        };
        match likes {
            Some(likes) => Ok(likes.max(0)),
            None => self
                .get_photo(creds, id)
                .await?
                .map(|row| row.likes.unwrap_or(0).max(0))
                .ok_or_else(|| BackendError::NotFound(format!("photo {id}"))),
        }
    }

    async fn increment_photo_views(
        &self,
        creds: &Credentials,
        ids: &[i64],
    ) -> Result<(), BackendError> {
        let resp = self
            .client
            .request(Method::POST, "/rest/v1/rpc/increment_photo_views", creds)
            .json(&json!({ "photo_ids": ids }))
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }

    async fn is_admin(&self, creds: &Credentials, user_id: &str) -> Result<bool, BackendError> {
        let resp = self
            .table(Method::GET, "admins", creds)
            .query(&[
                ("select", "user_id".to_string()),
                ("user_id", format!("eq.{user_id}")),
                ("limit", "1".to_string()),
            ])
            .send()
            .await?;
        let rows: Vec<AdminRow> = read_json(resp).await?;
        Ok(!rows.is_empty())
    }
}

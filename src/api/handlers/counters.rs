use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::error;

use crate::api::response::{ApiError, AppJson, JSend};
use crate::backend::{BackendError, Credentials};
use crate::models::{apply_delta, Counter};
use crate::AppState;

// ============================================================================
// Request / response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LikeRequest {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub delta: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct ViewRequest {
    #[serde(default)]
    pub id: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct BulkViewRequest {
    #[serde(default)]
    pub ids: Vec<Value>,
}

#[derive(Debug, Serialize)]
pub struct LikesResponse {
    pub likes: i64,
}

#[derive(Debug, Serialize)]
pub struct ViewsResponse {
    pub views: i64,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

// ============================================================================
// Payload helpers
// ============================================================================

/// Anime ids are uuid strings; anything empty counts as missing.
fn anime_id(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Photo ids arrive as numbers or numeric strings; zero counts as missing.
fn photo_id(value: &Value) -> Option<i64> {
    let id = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<f64>().ok().and_then(|f| {
            (f.is_finite() && f.fract() == 0.0).then_some(f as i64)
        }),
        _ => None,
    }?;
    (id != 0).then_some(id)
}

/// A like toggle moves the counter by exactly one.
fn like_delta(value: Option<&Value>) -> Option<i64> {
    match value?.as_f64()? {
        d if d == 1.0 => Some(1),
        d if d == -1.0 => Some(-1),
        _ => None,
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/anime/like
pub async fn anime_like(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<LikeRequest>,
) -> Result<Json<JSend<LikesResponse>>, ApiError> {
    let (Some(id), Some(delta)) = (anime_id(req.id.as_ref()), like_delta(req.delta.as_ref()))
    else {
        return Err(ApiError::bad_request("Invalid payload"));
    };
    let creds = Credentials::Anon;

    let row = match state.content.get_anime(&creds, &id).await {
        Ok(Some(row)) => row,
        Ok(None) => return Err(ApiError::not_found("Anime not found")),
        Err(e) => {
            error!(error = %e, anime_id = %id, "anime like: select failed");
            return Err(ApiError::not_found("Anime not found"));
        }
    };

    let likes = apply_delta(row.likes.unwrap_or(0), delta);
    match state
        .content
        .set_anime_counter(&creds, &id, Counter::Likes, likes)
        .await
    {
        Ok(Some(likes)) => Ok(JSend::success(LikesResponse {
            likes: likes.max(0),
        })),
        Ok(None) => {
            error!(anime_id = %id, "anime like: update matched no row");
            Err(ApiError::internal("Failed to update likes"))
        }
        Err(e) => {
            error!(error = %e, anime_id = %id, "anime like: update failed");
            Err(ApiError::internal("Failed to update likes"))
        }
    }
}

/// POST /api/anime/view
pub async fn anime_view(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<ViewRequest>,
) -> Result<Json<JSend<ViewsResponse>>, ApiError> {
    let id = anime_id(req.id.as_ref()).ok_or_else(|| ApiError::bad_request("Invalid payload"))?;
    let creds = Credentials::Anon;

    let row = match state.content.get_anime(&creds, &id).await {
        Ok(Some(row)) => row,
        Ok(None) => return Err(ApiError::not_found("Anime not found")),
        Err(e) => {
            error!(error = %e, anime_id = %id, "anime view: select failed");
            return Err(ApiError::not_found("Anime not found"));
        }
    };

    let views = row.views.unwrap_or(0).max(0).saturating_add(1);
    match state
        .content
        .set_anime_counter(&creds, &id, Counter::Views, views)
        .await
    {
        Ok(Some(views)) => Ok(JSend::success(ViewsResponse { views })),
        Ok(None) => Err(ApiError::internal("Failed to update views")),
        Err(e) => {
            error!(error = %e, anime_id = %id, "anime view: update failed");
            Err(ApiError::internal("Failed to update views"))
        }
    }
}

/// POST /api/photos/view
///
/// A photo row that does not exist counts from zero; the update then matches
/// nothing and the call still succeeds.
pub async fn photo_view(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<ViewRequest>,
) -> Result<Json<JSend<OkResponse>>, ApiError> {
    let id = req
        .id
        .as_ref()
        .and_then(photo_id)
        .ok_or_else(|| ApiError::bad_request("Missing photo id"))?;
    let creds = Credentials::Anon;

    let current = match state.content.get_photo(&creds, id).await {
        Ok(row) => row.and_then(|r| r.views).unwrap_or(0).max(0),
        Err(e) => {
            error!(error = %e, photo_id = id, "photo view: select failed");
            return Err(ApiError::internal("Failed to read views"));
        }
    };

    if let Err(e) = state
        .content
        .set_photo_counter(&creds, id, Counter::Views, current.saturating_add(1))
        .await
    {
        error!(error = %e, photo_id = id, "photo view: update failed");
        return Err(ApiError::internal("Failed to update views"));
    }

    Ok(JSend::success(OkResponse { ok: true }))
}

/// POST /api/photos/like
pub async fn photo_like(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<LikeRequest>,
) -> Result<Json<JSend<LikesResponse>>, ApiError> {
    let (Some(id), Some(delta)) = (
        req.id.as_ref().and_then(photo_id),
        like_delta(req.delta.as_ref()),
    ) else {
        return Err(ApiError::bad_request("Invalid payload"));
    };

    match state
        .content
        .increment_photo_likes(&Credentials::Anon, id, delta)
        .await
    {
        Ok(likes) => Ok(JSend::success(LikesResponse {
            likes: likes.max(0),
        })),
        Err(BackendError::NotFound(_)) => Err(ApiError::not_found("Photo not found")),
        Err(e) => {
            error!(error = %e, photo_id = id, "photo like: rpc failed");
            Err(ApiError::internal("Failed to update likes"))
        }
    }
}

/// POST /api/photos/views
///
/// Bulk tracker for a gallery page. Ids that are not whole numbers are dropped.
pub async fn photo_views(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<BulkViewRequest>,
) -> Result<Json<JSend<OkResponse>>, ApiError> {
    let ids: Vec<i64> = req.ids.iter().filter_map(photo_id).collect();
    if ids.is_empty() {
        return Ok(JSend::success(OkResponse { ok: true }));
    }

    if let Err(e) = state
        .content
        .increment_photo_views(&Credentials::Anon, &ids)
        .await
    {
        error!(error = %e, count = ids.len(), "photo views: rpc failed");
        return Err(ApiError::internal("Failed to update views"));
    }

    Ok(JSend::success(OkResponse { ok: true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_photo_id_parsing() {
        assert_eq!(photo_id(&json!(12)), Some(12));
        assert_eq!(photo_id(&json!("12")), Some(12));
        assert_eq!(photo_id(&json!(3.0)), Some(3));
        assert_eq!(photo_id(&json!(0)), None);
        assert_eq!(photo_id(&json!(1.5)), None);
        assert_eq!(photo_id(&json!("abc")), None);
        assert_eq!(photo_id(&json!(null)), None);
    }

    #[test]
    fn test_like_delta() {
        assert_eq!(like_delta(Some(&json!(1))), Some(1));
        assert_eq!(like_delta(Some(&json!(-1))), Some(-1));
        assert_eq!(like_delta(Some(&json!(2))), None);
        assert_eq!(like_delta(Some(&json!("1"))), None);
        assert_eq!(like_delta(None), None);
    }

    #[test]
    fn test_anime_id() {
        assert_eq!(anime_id(Some(&json!("abc"))), Some("abc".to_string()));
        assert_eq!(anime_id(Some(&json!("  "))), None);
        assert_eq!(anime_id(None), None);
    }
}

use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::api::response::PageError;
use crate::object_store::ObjectStoreError;
use crate::AppState;

const SITE_JS: &str = include_str!("../../../assets/site.js");
const SITE_CSS: &str = include_str!("../../../assets/site.css");
const PLACEHOLDER_SVG: &str = include_str!("../../../assets/placeholder.svg");

fn asset(body: &'static str, content_type: &'static str) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        body,
    )
        .into_response()
}

/// GET /assets/site.js
pub async fn site_js() -> Response {
    asset(SITE_JS, "text/javascript; charset=utf-8")
}

/// GET /assets/site.css
pub async fn site_css() -> Response {
    asset(SITE_CSS, "text/css; charset=utf-8")
}

/// GET /assets/placeholder.svg
pub async fn placeholder_svg() -> Response {
    asset(PLACEHOLDER_SVG, "image/svg+xml")
}

/// Serve a public bucket object.
/// Route: GET /storage/v1/object/public/*path, where path is `<bucket>/<object path>`
pub async fn serve_object(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Result<Response, PageError> {
    let (bucket, object) = path
        .split_once('/')
        .filter(|(bucket, object)| !bucket.is_empty() && !object.is_empty())
        .ok_or_else(|| PageError::not_found("Object not found"))?;

    let data = state
        .object_store
        .get(bucket, object)
        .await
        .map_err(|e| match e {
            ObjectStoreError::NotFound(_) | ObjectStoreError::InvalidPath(_) => {
                PageError::not_found("Object not found")
            }
            _ => PageError::internal(format!("Failed to retrieve object: {e}")),
        })?;

    let mut response = (StatusCode::OK, data).into_response();
    let headers = response.headers_mut();

    let mime = mime_guess::from_path(object).first_or_octet_stream();
    headers.insert(
        header::CONTENT_TYPE,
        mime.as_ref()
            .parse()
            .unwrap_or(HeaderValue::from_static("application/octet-stream")),
    );

    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=3600"),
    );

    Ok(response)
}

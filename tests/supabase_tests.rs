use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use portfolio_site::backend::{ContentStore, Credentials, SupabaseClient, SupabaseContent};

/// Serve `rpc` as the like RPC next to a `photos` table holding one row with 6 likes.
async fn mock_backend(rpc: fn() -> Response) -> SupabaseContent {
    let app = Router::new()
        .route(
            "/rest/v1/rpc/increment_photo_likes",
            post(move || async move { rpc() }),
        )
        .route(
            "/rest/v1/photos",
            get(|| async { Json(json!([{ "id": 4, "image_path": "food/4.jpg", "likes": 6 }])) }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = SupabaseClient::new(&format!("http://{addr}"), "anon-key").unwrap();
    SupabaseContent::new(client)
}

#[tokio::test]
async fn test_like_rpc_returns_new_count() {
    let content = mock_backend(|| Json(json!(7)).into_response()).await;

    let likes = content
        .increment_photo_likes(&Credentials::Anon, 4, 1)
        .await
        .unwrap();
    assert_eq!(likes, 7);
}

#[tokio::test]
async fn test_like_rpc_negative_count_is_clamped() {
    let content = mock_backend(|| Json(json!(-2)).into_response()).await;

    let likes = content
        .increment_photo_likes(&Credentials::Anon, 4, -1)
        .await
        .unwrap();
    assert_eq!(likes, 0);
}

#[tokio::test]
async fn test_like_rpc_null_reads_stored_count() {
    let content = mock_backend(|| Json(Value::Null).into_response()).await;

    let likes = content
        .increment_photo_likes(&Credentials::Anon, 4, 1)
        .await
        .unwrap();
    assert_eq!(likes, 6);
}

#[tokio::test]
async fn test_like_rpc_empty_body_reads_stored_count() {
    let content = mock_backend(|| StatusCode::NO_CONTENT.into_response()).await;

    let likes = content
        .increment_photo_likes(&Credentials::Anon, 4, 1)
        .await
        .unwrap();
    assert_eq!(likes, 6);
}

#[tokio::test]
async fn test_like_rpc_failure_is_an_error() {
    let content = mock_backend(|| {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "message": "boom" }))).into_response()
    })
    .await;

    let result = content.increment_photo_likes(&Credentials::Anon, 4, 1).await;
    assert!(result.is_err());
}

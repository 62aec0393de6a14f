use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use portfolio_site::api::create_router;
use portfolio_site::models::{AnimeFields, AnimeRow, PhotoQuery, PhotoRow};
use portfolio_site::storage::{Database, ACCESS_TOKENS, REFRESH_TOKENS};
use portfolio_site::testutil::{
    test_state, ADMIN_EMAIL, ADMIN_PASSWORD, VISITOR_EMAIL, VISITOR_PASSWORD,
};

const BOUNDARY: &str = "portfolio-test-boundary";

fn test_app() -> (tempfile::TempDir, Router, Database) {
    let dir = tempfile::tempdir().unwrap();
    let (state, db) = test_state(dir.path());
    (dir, create_router(state), db)
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn body_string(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::get(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_form(uri: &str, fields: &[(&str, &str)], cookie: Option<&str>) -> Request<Body> {
    let body = fields
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    let mut builder = Request::post(uri).header(
        header::CONTENT_TYPE,
        "application/x-www-form-urlencoded",
    );
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body)).unwrap()
}

fn post_multipart(uri: &str, cookie: &str, category: &str, files: &[(&str, &str)]) -> Request<Body> {
    let mut body: Vec<u8> = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"category\"\r\n\r\n{category}\r\n"
        )
        .as_bytes(),
    );
    for (name, data) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{name}\"\r\nContent-Type: image/jpeg\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::post(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(header::COOKIE, cookie)
        .body(Body::from(body))
        .unwrap()
}

fn post_cover(uri: &str, cookie: &str, file_name: &str, data: &str) -> Request<Body> {
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n{data}\r\n--{BOUNDARY}--\r\n"
    );
    Request::post(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(header::COOKIE, cookie)
        .body(Body::from(body))
        .unwrap()
}

/// Drop every token in one token table, as if they had all expired.
fn clear_tokens(db: &Database, table: redb::TableDefinition<'static, &'static str, &'static [u8]>) {
    let txn = db.begin_write().unwrap();
    {
        let mut tokens = txn.open_table(table).unwrap();
        tokens.retain(|_, _| false).unwrap();
    }
    txn.commit().unwrap();
}

/// `name=value` pair of the session cookie set by a response.
fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("id="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

async fn login(app: &Router, email: &str, password: &str, next: &str) -> Response {
    send(
        app,
        post_form(
            "/login",
            &[("email", email), ("password", password), ("next", next)],
            None,
        ),
    )
    .await
}

async fn admin_cookie(app: &Router) -> String {
    let response = login(app, ADMIN_EMAIL, ADMIN_PASSWORD, "/admin").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    session_cookie(&response).expect("login should set the session cookie")
}

fn seed_anime(db: &Database, id: &str, likes: Option<i64>) {
    db.put_anime(&AnimeRow {
        id: id.to_string(),
        title: format!("Anime {id}"),
        status: Some("watching".to_string()),
        likes,
        ..Default::default()
    })
    .unwrap();
}

fn seed_photo(db: &Database, id: i64, category: &str) {
    db.put_photo(&PhotoRow {
        id,
        category: Some(category.to_string()),
        title: Some(format!("Photo {id}")),
        image_path: format!("{category}/{id}.jpg"),
        likes: Some(0),
        views: Some(0),
        created_at: Some(Utc::now()),
        ..Default::default()
    })
    .unwrap();
}

// ============================================================================
// Pages and static content
// ============================================================================

#[tokio::test]
async fn test_health() {
    let (_dir, app, _db) = test_app();
    let response = send(&app, get("/_internal/health")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "success");
    assert_eq!(json["data"]["status"], "ok");
}

#[tokio::test]
async fn test_empty_galleries_show_placeholders() {
    let (_dir, app, _db) = test_app();

    let response = send(&app, get("/food")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("Shrimp Rice Bowl"));
    assert!(!html.contains("data-like="));

    let html = body_string(send(&app, get("/")).await).await;
    assert!(html.contains("2019 Civic Type R"));
}

#[tokio::test]
async fn test_gallery_renders_stored_photos_with_counters() {
    let (_dir, app, db) = test_app();
    seed_photo(&db, 5, "car");

    let html = body_string(send(&app, get("/cars")).await).await;
    assert!(html.contains("Photo 5"));
    assert!(html.contains(r#"data-like="photo" data-id="5""#));
    assert!(html.contains(r#"data-photo-views="5""#));
    assert!(html.contains("/storage/v1/object/public/media/car/5.jpg"));
    assert!(!html.contains("2019 Civic Type R"));
}

#[tokio::test]
async fn test_anime_page_lists_titles() {
    let (_dir, app, db) = test_app();
    seed_anime(&db, "abc", None);

    let response = send(&app, get("/anime")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("Anime abc"));
    assert!(html.contains("Currently watching"));
    assert!(html.contains(r#"data-anime-view="abc""#));
}

#[tokio::test]
async fn test_static_assets() {
    let (_dir, app, _db) = test_app();

    let response = send(&app, get("/assets/site.js")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.contains("javascript"));
    assert!(body_string(response).await.contains("/api/photos/like"));

    let response = send(&app, get("/assets/placeholder.svg")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_stored_object_is_404() {
    let (_dir, app, _db) = test_app();
    let response = send(&app, get("/storage/v1/object/public/media/food/nope.jpg")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Counters
// ============================================================================

#[tokio::test]
async fn test_anime_like_never_goes_negative() {
    let (_dir, app, db) = test_app();
    seed_anime(&db, "abc", None);

    let response = send(&app, post_json("/api/anime/like", json!({"id": "abc", "delta": 1}))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "success");
    assert_eq!(json["data"]["likes"], 1);

    for _ in 0..2 {
        let response =
            send(&app, post_json("/api/anime/like", json!({"id": "abc", "delta": -1}))).await;
        assert_eq!(body_json(response).await["data"]["likes"], 0);
    }
    assert_eq!(db.get_anime("abc").unwrap().unwrap().likes, Some(0));
}

#[tokio::test]
async fn test_anime_like_rejects_bad_payloads() {
    let (_dir, app, db) = test_app();
    seed_anime(&db, "abc", Some(3));

    for body in [
        json!({"id": "abc", "delta": 2}),
        json!({"id": "abc"}),
        json!({"delta": 1}),
        json!({"id": "", "delta": 1}),
    ] {
        let response = send(&app, post_json("/api/anime/like", body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["status"], "fail");
        assert_eq!(json["data"]["message"], "Invalid payload");
    }

    let response =
        send(&app, post_json("/api/anime/like", json!({"id": "missing", "delta": 1}))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["data"]["message"], "Anime not found");

    assert_eq!(db.get_anime("abc").unwrap().unwrap().likes, Some(3));
}

#[tokio::test]
async fn test_anime_view_saturates_at_max() {
    let (_dir, app, db) = test_app();
    db.put_anime(&AnimeRow {
        id: "maxed".to_string(),
        title: "Maxed".to_string(),
        views: Some(i64::MAX),
        ..Default::default()
    })
    .unwrap();

    let response = send(&app, post_json("/api/anime/view", json!({"id": "maxed"}))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["views"], i64::MAX);
}

#[tokio::test]
async fn test_malformed_json_is_a_fail_envelope() {
    let (_dir, app, _db) = test_app();
    let request = Request::post("/api/anime/like")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["status"], "fail");
}

#[tokio::test]
async fn test_anime_view_increments() {
    let (_dir, app, db) = test_app();
    seed_anime(&db, "abc", None);

    let response = send(&app, post_json("/api/anime/view", json!({"id": "abc"}))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["views"], 1);

    let response = send(&app, post_json("/api/anime/view", json!({"id": "abc"}))).await;
    assert_eq!(body_json(response).await["data"]["views"], 2);

    let response = send(&app, post_json("/api/anime/view", json!({}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["data"]["message"], "Invalid payload");

    let response = send(&app, post_json("/api/anime/view", json!({"id": "nope"}))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_photo_view_counts_from_zero() {
    let (_dir, app, db) = test_app();
    seed_photo(&db, 1, "food");

    let response = send(&app, post_json("/api/photos/view", json!({"id": "1"}))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["ok"], true);
    assert_eq!(db.get_photo(1).unwrap().unwrap().views, Some(1));

    // Unknown rows are not an error
    let response = send(&app, post_json("/api/photos/view", json!({"id": 77}))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, post_json("/api/photos/view", json!({"id": 0}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["data"]["message"], "Missing photo id");
}

#[tokio::test]
async fn test_photo_like_and_bulk_views() {
    let (_dir, app, db) = test_app();
    seed_photo(&db, 1, "food");
    seed_photo(&db, 2, "food");

    let response = send(&app, post_json("/api/photos/like", json!({"id": 1, "delta": 1}))).await;
    assert_eq!(body_json(response).await["data"]["likes"], 1);
    let response = send(&app, post_json("/api/photos/like", json!({"id": 2, "delta": -1}))).await;
    assert_eq!(body_json(response).await["data"]["likes"], 0);

    let response = send(&app, post_json("/api/photos/like", json!({"id": 9, "delta": 1}))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(
        &app,
        post_json("/api/photos/views", json!({"ids": [1, "2", "x", 99]})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(db.get_photo(1).unwrap().unwrap().views, Some(1));
    assert_eq!(db.get_photo(2).unwrap().unwrap().views, Some(1));

    let response = send(&app, post_json("/api/photos/views", json!({"ids": []}))).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ============================================================================
// Sign-in and the admin gate
// ============================================================================

#[tokio::test]
async fn test_admin_requires_session() {
    let (_dir, app, _db) = test_app();

    let response = send(&app, get("/admin/anime")).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/login?next=%2Fadmin%2Fanime");
}

#[tokio::test]
async fn test_login_form_keeps_safe_next() {
    let (_dir, app, _db) = test_app();

    let html = body_string(send(&app, get("/login?next=%2Fadmin%2Fphotos")).await).await;
    assert!(html.contains(r#"value="/admin/photos""#));

    let html = body_string(send(&app, get("/login?next=%2F%2Fevil.example.com")).await).await;
    assert!(!html.contains("evil.example.com"));
}

#[tokio::test]
async fn test_login_rejects_bad_password() {
    let (_dir, app, _db) = test_app();

    let response = login(&app, ADMIN_EMAIL, "wrong", "/admin").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(session_cookie(&response).is_none());
    let html = body_string(response).await;
    assert!(html.contains("Invalid login credentials"));
}

#[tokio::test]
async fn test_non_admin_is_sent_home() {
    let (_dir, app, _db) = test_app();

    let response = login(&app, VISITOR_EMAIL, VISITOR_PASSWORD, "/admin").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cookie = session_cookie(&response).unwrap();

    let response = send(&app, get_with_cookie("/admin", &cookie)).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_admin_login_follows_next_and_opens_dashboard() {
    let (_dir, app, _db) = test_app();

    let response = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD, "/admin/anime").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/anime");
    let cookie = session_cookie(&response).unwrap();

    let response = send(&app, get_with_cookie("/admin", &cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains(ADMIN_EMAIL));
}

#[tokio::test]
async fn test_login_ignores_offsite_next() {
    let (_dir, app, _db) = test_app();

    let response = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD, "//evil.example.com").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin");
}

#[tokio::test]
async fn test_expired_access_token_is_refreshed_by_the_gate() {
    let (_dir, app, db) = test_app();
    let cookie = admin_cookie(&app).await;

    clear_tokens(&db, ACCESS_TOKENS);
    let response = send(&app, get_with_cookie("/admin", &cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    // The refreshed pair was stored in the session
    let response = send(&app, get_with_cookie("/admin/library", &cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_failed_refresh_sends_admin_to_login() {
    let (_dir, app, db) = test_app();
    let cookie = admin_cookie(&app).await;

    clear_tokens(&db, ACCESS_TOKENS);
    clear_tokens(&db, REFRESH_TOKENS);
    let response = send(&app, get_with_cookie("/admin/anime", &cookie)).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/login?next=%2Fadmin%2Fanime");

    // The session was flushed
    let response = send(&app, get_with_cookie("/admin", &cookie)).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/login?next=%2Fadmin");
}

#[tokio::test]
async fn test_unknown_admin_path_is_gated() {
    let (_dir, app, _db) = test_app();

    let response = send(&app, get("/admin/nope")).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/login?next=%2Fadmin%2Fnope");

    let cookie = admin_cookie(&app).await;
    let response = send(&app, get_with_cookie("/admin/nope", &cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_logout_ends_session() {
    let (_dir, app, _db) = test_app();
    let cookie = admin_cookie(&app).await;

    let response = send(&app, post_form("/logout", &[], Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let response = send(&app, get_with_cookie("/admin", &cookie)).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert!(location(&response).starts_with("/login"));
}

// ============================================================================
// Admin screens
// ============================================================================

#[tokio::test]
async fn test_admin_adds_and_edits_anime() {
    let (_dir, app, db) = test_app();
    let cookie = admin_cookie(&app).await;
    seed_anime(&db, "first", None);
    db.update_anime("first", &AnimeFields::placeholder(4)).unwrap();

    let response = send(&app, post_form("/admin/anime/new", &[], Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).contains("notice=added"));

    let added = db
        .list_anime()
        .unwrap()
        .into_iter()
        .find(|row| row.id != "first")
        .expect("new anime row");
    assert_eq!(added.title, "New anime");
    assert_eq!(added.sort_order, Some(5));

    let uri = format!("/admin/anime/{}", added.id);
    let response = send(
        &app,
        post_form(
            &uri,
            &[
                ("title", "Vinland Saga"),
                ("status", "watched"),
                ("total_seasons", "2"),
                ("seasons_watched", "2"),
                ("is_favorite", "on"),
                ("tags", "historical, drama"),
                ("notes", "Season 2 is the good one"),
                ("sort_order", "1"),
                ("cover_url", ""),
            ],
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).contains("notice=saved"));

    let saved = db.get_anime(&added.id).unwrap().unwrap();
    assert_eq!(saved.title, "Vinland Saga");
    assert_eq!(saved.is_favorite, Some(true));
    assert_eq!(
        saved.tags,
        Some(vec!["historical".to_string(), "drama".to_string()])
    );

    let response = send(
        &app,
        post_form(&uri, &[("title", " "), ("status", "watched")], Some(&cookie)),
    )
    .await;
    assert!(location(&response).contains("notice=invalid-title"));
    assert_eq!(db.get_anime(&added.id).unwrap().unwrap().title, "Vinland Saga");

    let response = send(
        &app,
        get_with_cookie(&format!("/admin/anime?id={}", added.id), &cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("Vinland Saga"));
}

#[tokio::test]
async fn test_admin_saves_photo_fields() {
    let (_dir, app, db) = test_app();
    let cookie = admin_cookie(&app).await;
    seed_photo(&db, 3, "food");

    let response = send(
        &app,
        post_form(
            "/admin/photos/manage/3",
            &[
                ("category", "food"),
                ("title", "Katsu curry"),
                ("description", "  crispy  "),
                ("tags", "curry, , japanese"),
                ("likes", "-4"),
                ("views", "abc"),
            ],
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "/admin/photos/manage?category=food&saved=3#photo-3"
    );

    let row = db.get_photo(3).unwrap().unwrap();
    assert_eq!(row.title.as_deref(), Some("Katsu curry"));
    assert_eq!(row.description.as_deref(), Some("crispy"));
    assert_eq!(row.tag_list(), vec!["curry", "japanese"]);
    assert_eq!(row.likes, Some(0));
    assert_eq!(row.views, Some(0));

    let response = send(
        &app,
        get_with_cookie("/admin/photos/manage?category=food&saved=3", &cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("Katsu curry"));
}

#[tokio::test]
async fn test_admin_uploads_photos() {
    let (_dir, app, db) = test_app();
    let cookie = admin_cookie(&app).await;

    let response = send(
        &app,
        post_multipart(
            "/admin/photos",
            &cookie,
            "car",
            &[("GR Corolla.JPG", "fake jpeg"), ("rear.png", "fake png")],
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let rows = db
        .list_photos(&PhotoQuery::default())
        .unwrap();
    assert_eq!(rows.len(), 2);
    let corolla = rows
        .iter()
        .find(|row| row.title.as_deref() == Some("GR Corolla"))
        .expect("uploaded row");
    assert_eq!(corolla.category.as_deref(), Some("car"));
    assert!(corolla.image_path.starts_with("car/"));
    assert!(corolla.image_path.ends_with("-gr-corolla.jpg"));

    let response = send(
        &app,
        get(&format!(
            "/storage/v1/object/public/media/{}",
            corolla.image_path
        )),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "fake jpeg");
}

#[tokio::test]
async fn test_admin_upload_rejects_unknown_category() {
    let (_dir, app, _db) = test_app();
    let cookie = admin_cookie(&app).await;

    let response = send(
        &app,
        post_multipart("/admin/photos", &cookie, "boats", &[("a.jpg", "x")]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_add_anime_after_max_sort_order() {
    let (_dir, app, db) = test_app();
    let cookie = admin_cookie(&app).await;
    let last = db.insert_anime(&AnimeFields::placeholder(i32::MAX)).unwrap();

    let response = send(&app, post_form("/admin/anime/new", &[], Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).contains("notice=added"));

    let added = db
        .list_anime()
        .unwrap()
        .into_iter()
        .find(|row| row.id != last.id)
        .expect("new anime row");
    assert_eq!(added.sort_order, Some(i32::MAX));
}

#[tokio::test]
async fn test_admin_uploads_anime_cover() {
    let (_dir, app, db) = test_app();
    let cookie = admin_cookie(&app).await;
    seed_anime(&db, "c1", Some(2));

    let response = send(
        &app,
        post_cover("/admin/anime/c1/cover", &cookie, "p.PNG", "first cover"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/anime?id=c1&notice=cover");

    let row = db.get_anime("c1").unwrap().unwrap();
    let cover_url = "/storage/v1/object/public/anime-covers/c1/cover.png";
    assert_eq!(row.cover_url.as_deref(), Some(cover_url));
    assert_eq!(row.title, "Anime c1");
    assert_eq!(row.status.as_deref(), Some("watching"));
    assert_eq!(row.likes, Some(2));

    let response = send(&app, get(cover_url)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "first cover");

    // Re-uploading replaces the object in place
    let response = send(
        &app,
        post_cover("/admin/anime/c1/cover", &cookie, "p.png", "second cover"),
    )
    .await;
    assert_eq!(location(&response), "/admin/anime?id=c1&notice=cover");
    let response = send(&app, get(cover_url)).await;
    assert_eq!(body_string(response).await, "second cover");
}

#[tokio::test]
async fn test_cover_for_unknown_anime() {
    let (_dir, app, _db) = test_app();
    let cookie = admin_cookie(&app).await;

    let response = send(
        &app,
        post_cover("/admin/anime/ghost/cover", &cookie, "p.png", "x"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/anime?id=ghost&notice=not-found");
}

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{any, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};

use super::handlers;
use crate::object_store::PUBLIC_OBJECT_PREFIX;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let upload_limit = state.config.max_upload_size as usize;

    // Everything under /admin sits behind the allowlist gate
    let admin = Router::new()
        .route("/admin", get(handlers::dashboard))
        .route("/admin/anime", get(handlers::anime_editor))
        .route("/admin/anime/new", post(handlers::anime_create))
        .route("/admin/anime/:id", post(handlers::anime_save))
        .route(
            "/admin/anime/:id/cover",
            post(handlers::anime_cover).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/admin/photos",
            get(handlers::photo_uploader)
                .post(handlers::photo_upload)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/admin/photos/manage", get(handlers::photo_manager))
        .route("/admin/photos/manage/:id", post(handlers::photo_save))
        .route("/admin/library", get(handlers::photo_library))
        .route("/admin/*rest", any(handlers::admin_not_found))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            handlers::require_admin,
        ));

    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(state.config.server.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(
            state.config.server.session_ttl_hours,
        )));

    Router::new()
        // Pages
        .route("/", get(handlers::home))
        .route("/food", get(handlers::food))
        .route("/cars", get(handlers::cars))
        .route("/anime", get(handlers::anime))
        .route("/business", get(handlers::business))
        .route("/discuss", get(handlers::discuss))
        // Auth
        .route("/login", get(handlers::login_form).post(handlers::login))
        .route("/logout", post(handlers::logout))
        // Counters
        .route("/api/anime/like", post(handlers::anime_like))
        .route("/api/anime/view", post(handlers::anime_view))
        .route("/api/photos/like", post(handlers::photo_like))
        .route("/api/photos/view", post(handlers::photo_view))
        .route("/api/photos/views", post(handlers::photo_views))
        // Static content
        .route("/assets/site.js", get(handlers::site_js))
        .route("/assets/site.css", get(handlers::site_css))
        .route("/assets/placeholder.svg", get(handlers::placeholder_svg))
        .route(
            &format!("{PUBLIC_OBJECT_PREFIX}/*path"),
            get(handlers::serve_object),
        )
        // Internal
        .route("/_internal/health", get(handlers::health))
        .merge(admin)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

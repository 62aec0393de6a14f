use axum::extract::State;
use axum::response::Html;
use std::sync::Arc;
use tracing::{error, warn};

use crate::api::views::{self, Gallery, GalleryItem};
use crate::backend::Credentials;
use crate::models::{sort_anime, PhotoCategory, PhotoQuery, PUBLIC_DEFAULT_SORT};
use crate::AppState;

const HOME_PREVIEW_LIMIT: u32 = 3;
const GALLERY_LIMIT: u32 = 50;

impl Gallery {
    fn category(self) -> PhotoCategory {
        match self {
            Gallery::Food => PhotoCategory::Food,
            Gallery::Cars => PhotoCategory::Car,
        }
    }
}

/// Newest photos of a gallery, or its placeholders when the query fails or
/// comes back empty.
async fn load_gallery(state: &AppState, gallery: Gallery, limit: u32) -> Vec<GalleryItem> {
    let query = PhotoQuery::category(gallery.category()).limit(limit);
    match state.content.list_photos(&Credentials::Anon, &query).await {
        Ok(rows) if !rows.is_empty() => rows
            .iter()
            .map(|row| GalleryItem::from_photo(row, state.media_url(&row.image_path)))
            .collect(),
        Ok(_) => gallery.placeholders(),
        Err(e) => {
            warn!(error = %e, category = gallery.category().as_str(), "gallery: load failed, showing placeholders");
            gallery.placeholders()
        }
    }
}

/// GET /
pub async fn home(State(state): State<Arc<AppState>>) -> Html<String> {
    let (food, cars, anime) = tokio::join!(
        load_gallery(&state, Gallery::Food, HOME_PREVIEW_LIMIT),
        load_gallery(&state, Gallery::Cars, HOME_PREVIEW_LIMIT),
        state.content.list_anime(&Credentials::Anon),
    );

    let covers: Vec<(String, String)> = match anime {
        Ok(rows) => sort_anime(rows, PUBLIC_DEFAULT_SORT)
            .into_iter()
            .filter_map(|a| a.cover_url.map(|url| (url, a.title)))
            .take(3)
            .collect(),
        Err(e) => {
            warn!(error = %e, "home: anime preview load failed");
            Vec::new()
        }
    };

    Html(views::home_page(&state.config.site, &food, &cars, &covers))
}

/// GET /food
pub async fn food(State(state): State<Arc<AppState>>) -> Html<String> {
    let items = load_gallery(&state, Gallery::Food, GALLERY_LIMIT).await;
    Html(views::gallery_page(&state.config.site, Gallery::Food, &items))
}

/// GET /cars
pub async fn cars(State(state): State<Arc<AppState>>) -> Html<String> {
    let items = load_gallery(&state, Gallery::Cars, GALLERY_LIMIT).await;
    Html(views::gallery_page(&state.config.site, Gallery::Cars, &items))
}

/// GET /anime
pub async fn anime(State(state): State<Arc<AppState>>) -> Html<String> {
    let list = match state.content.list_anime(&Credentials::Anon).await {
        Ok(rows) => sort_anime(rows, PUBLIC_DEFAULT_SORT),
        Err(e) => {
            error!(error = %e, "anime: load failed");
            Vec::new()
        }
    };
    Html(views::anime_page(&state.config.site, &list))
}

/// GET /business
pub async fn business(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(views::business_page(&state.config.site))
}

/// GET /discuss
pub async fn discuss(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(views::discuss_page(&state.config.site))
}

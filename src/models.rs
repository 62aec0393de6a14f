//! Row shapes shared by every backend, plus the normalization applied on read.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status values offered by the admin editor.
pub const STATUS_OPTIONS: [&str; 5] = ["watching", "watched", "planned", "on-hold", "dropped"];

pub const DEFAULT_STATUS: &str = "planned";

/// Sort position for rows without one on the public anime page.
pub const PUBLIC_DEFAULT_SORT: i32 = 9999;

/// Sort position for rows without one in the admin editor.
pub const ADMIN_DEFAULT_SORT: i32 = 0;

// ============================================================================
// Anime
// ============================================================================

/// An `anime` row exactly as the backend returns it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimeRow {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub total_seasons: Option<i32>,
    #[serde(default)]
    pub seasons_watched: Option<i32>,
    #[serde(default)]
    pub is_favorite: Option<bool>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub likes: Option<i64>,
    #[serde(default)]
    pub views: Option<i64>,
    #[serde(default)]
    pub sort_order: Option<i32>,
    #[serde(default)]
    pub cover_url: Option<String>,
}

/// Writable anime columns, used for both inserts and full-row saves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimeFields {
    pub title: String,
    pub status: String,
    pub total_seasons: i32,
    pub seasons_watched: i32,
    pub is_favorite: bool,
    pub tags: Vec<String>,
    pub notes: Option<String>,
    pub sort_order: i32,
    pub cover_url: Option<String>,
}

impl AnimeFields {
    /// The row created by the admin "Add anime" button.
    pub fn placeholder(sort_order: i32) -> Self {
        Self {
            title: "New anime".to_string(),
            status: DEFAULT_STATUS.to_string(),
            total_seasons: 1,
            seasons_watched: 0,
            is_favorite: false,
            tags: Vec::new(),
            notes: Some(String::new()),
            sort_order,
            cover_url: None,
        }
    }
}

/// An anime entry with every null replaced by its display default.
#[derive(Debug, Clone, PartialEq)]
pub struct Anime {
    pub id: String,
    pub title: String,
    pub favorite: bool,
    pub status: String,
    pub total_seasons: i32,
    pub seasons_watched: i32,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub likes: i64,
    pub views: i64,
    pub sort_order: i32,
    pub cover_url: Option<String>,
}

/// Section of the public anime page an entry is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimeGroup {
    Watching,
    Watched,
    Planned,
    Other,
}

impl AnimeGroup {
    pub const ALL: [AnimeGroup; 4] = [
        AnimeGroup::Watching,
        AnimeGroup::Watched,
        AnimeGroup::Planned,
        AnimeGroup::Other,
    ];

    pub fn heading(self) -> &'static str {
        match self {
            AnimeGroup::Watching => "Currently watching",
            AnimeGroup::Watched => "Watched",
            AnimeGroup::Planned => "Planned",
            AnimeGroup::Other => "Other",
        }
    }
}

impl Anime {
    pub fn from_row(row: AnimeRow, default_sort: i32) -> Self {
        Self {
            id: row.id,
            title: row.title,
            favorite: row.is_favorite.unwrap_or(false),
            status: row.status.unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            total_seasons: row.total_seasons.unwrap_or(1),
            seasons_watched: row.seasons_watched.unwrap_or(0),
            notes: row.notes,
            tags: normalize_tags(row.tags),
            likes: row.likes.unwrap_or(0),
            views: row.views.unwrap_or(0),
            sort_order: row.sort_order.unwrap_or(default_sort),
            cover_url: row.cover_url,
        }
    }

    /// `"watching • 1 of 3 seasons"`, or just the status when there is no season count.
    pub fn status_line(&self) -> String {
        if self.total_seasons > 0 {
            let plural = if self.total_seasons == 1 { "" } else { "s" };
            format!(
                "{} • {} of {} season{}",
                self.status, self.seasons_watched, self.total_seasons, plural
            )
        } else {
            self.status.clone()
        }
    }

    pub fn group(&self) -> AnimeGroup {
        match self.status.as_str() {
            "watching" => AnimeGroup::Watching,
            "watched" => AnimeGroup::Watched,
            "planned" => AnimeGroup::Planned,
            _ => AnimeGroup::Other,
        }
    }

    pub fn to_fields(&self) -> AnimeFields {
        AnimeFields {
            title: self.title.clone(),
            status: self.status.clone(),
            total_seasons: self.total_seasons,
            seasons_watched: self.seasons_watched,
            is_favorite: self.favorite,
            tags: self.tags.clone(),
            notes: self.notes.clone(),
            sort_order: self.sort_order,
            cover_url: self.cover_url.clone(),
        }
    }
}

/// Normalize rows and order them by sort position, then title.
pub fn sort_anime(rows: Vec<AnimeRow>, default_sort: i32) -> Vec<Anime> {
    let mut list: Vec<Anime> = rows
        .into_iter()
        .map(|row| Anime::from_row(row, default_sort))
        .collect();
    list.sort_by(|a, b| {
        a.sort_order
            .cmp(&b.sort_order)
            .then_with(|| a.title.cmp(&b.title))
    });
    list
}

// ============================================================================
// Photos
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoCategory {
    Food,
    Car,
    Anime,
    Business,
}

impl PhotoCategory {
    pub const ALL: [PhotoCategory; 4] = [
        PhotoCategory::Food,
        PhotoCategory::Car,
        PhotoCategory::Anime,
        PhotoCategory::Business,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PhotoCategory::Food => "food",
            PhotoCategory::Car => "car",
            PhotoCategory::Anime => "anime",
            PhotoCategory::Business => "business",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PhotoCategory::Food => "Food",
            PhotoCategory::Car => "Cars",
            PhotoCategory::Anime => "Anime",
            PhotoCategory::Business => "Business / Projects",
        }
    }
}

impl fmt::Display for PhotoCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PhotoCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PhotoCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown photo category '{s}'"))
    }
}

/// A `photos` row exactly as the backend returns it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhotoRow {
    pub id: i64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub image_path: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub likes: Option<i64>,
    #[serde(default)]
    pub views: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl PhotoRow {
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => "Untitled photo",
        }
    }

    pub fn display_category(&self) -> &str {
        match self.category.as_deref() {
            Some(c) if !c.is_empty() => c,
            _ => "uncategorized",
        }
    }

    pub fn tag_list(&self) -> Vec<String> {
        self.tags.clone().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPhoto {
    pub category: PhotoCategory,
    pub title: String,
    pub description: String,
    pub image_path: String,
    pub tags: Vec<String>,
}

/// Columns saved by the photo manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub likes: i64,
    pub views: i64,
}

#[derive(Debug, Clone, Default)]
pub struct PhotoQuery {
    pub category: Option<PhotoCategory>,
    pub limit: Option<u32>,
}

impl PhotoQuery {
    pub fn category(category: PhotoCategory) -> Self {
        Self {
            category: Some(category),
            limit: None,
        }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

// ============================================================================
// Counters
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Likes,
    Views,
}

impl Counter {
    pub fn column(self) -> &'static str {
        match self {
            Counter::Likes => "likes",
            Counter::Views => "views",
        }
    }
}

/// Apply a like toggle without ever going below zero.
pub fn apply_delta(current: i64, delta: i64) -> i64 {
    current.saturating_add(delta).max(0)
}

// ============================================================================
// Tags
// ============================================================================

/// Split a comma-separated tag field, dropping blanks.
pub fn parse_tags(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn normalize_tags(tags: Option<Vec<String>>) -> Vec<String> {
    tags.unwrap_or_default()
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_row(id: &str, title: &str) -> AnimeRow {
        AnimeRow {
            id: id.to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_null_anime_fields_get_defaults() {
        let anime = Anime::from_row(bare_row("a1", "Frieren"), PUBLIC_DEFAULT_SORT);
        assert_eq!(anime.status, "planned");
        assert_eq!(anime.total_seasons, 1);
        assert_eq!(anime.seasons_watched, 0);
        assert!(!anime.favorite);
        assert!(anime.tags.is_empty());
        assert_eq!(anime.likes, 0);
        assert_eq!(anime.views, 0);
        assert_eq!(anime.sort_order, 9999);
        assert_eq!(anime.cover_url, None);

        let admin = Anime::from_row(bare_row("a1", "Frieren"), ADMIN_DEFAULT_SORT);
        assert_eq!(admin.sort_order, 0);
    }

    #[test]
    fn test_row_tags_are_trimmed() {
        let mut row = bare_row("a1", "Frieren");
        row.tags = Some(vec![" fantasy ".into(), "".into(), "  ".into(), "slow".into()]);
        let anime = Anime::from_row(row, 0);
        assert_eq!(anime.tags, vec!["fantasy", "slow"]);
    }

    #[test]
    fn test_null_row_deserializes() {
        let json = r#"{"id":"x","title":"T","status":null,"tags":null,"likes":null}"#;
        let row: AnimeRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.status, None);
        assert_eq!(row.tags, None);
        assert_eq!(row.views, None);
    }

    #[test]
    fn test_status_line() {
        let mut anime = Anime::from_row(bare_row("a", "A"), 0);
        anime.status = "watching".into();
        anime.seasons_watched = 1;
        anime.total_seasons = 3;
        assert_eq!(anime.status_line(), "watching • 1 of 3 seasons");

        anime.total_seasons = 1;
        assert_eq!(anime.status_line(), "watching • 1 of 1 season");

        anime.total_seasons = 0;
        assert_eq!(anime.status_line(), "watching");
    }

    #[test]
    fn test_sort_by_position_then_title() {
        let mut b = bare_row("b", "Bleach");
        b.sort_order = Some(2);
        let mut a = bare_row("a", "Akira");
        a.sort_order = Some(2);
        let mut c = bare_row("c", "Claymore");
        c.sort_order = Some(1);
        let unsorted = bare_row("d", "Dororo");

        let ids: Vec<String> = sort_anime(vec![unsorted, b, a, c], PUBLIC_DEFAULT_SORT)
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec!["c", "a", "b", "d"]);
    }

    #[test]
    fn test_groups() {
        let mut anime = Anime::from_row(bare_row("a", "A"), 0);
        assert_eq!(anime.group(), AnimeGroup::Planned);
        anime.status = "on-hold".into();
        assert_eq!(anime.group(), AnimeGroup::Other);
        anime.status = "watched".into();
        assert_eq!(anime.group(), AnimeGroup::Watched);
    }

    #[test]
    fn test_apply_delta_never_negative() {
        assert_eq!(apply_delta(0, -1), 0);
        assert_eq!(apply_delta(3, -1), 2);
        assert_eq!(apply_delta(3, 1), 4);
        assert_eq!(apply_delta(-5, 1), 0);
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!(parse_tags(" steak, comfort ,, "), vec!["steak", "comfort"]);
        assert!(parse_tags("").is_empty());
    }

    #[test]
    fn test_photo_display_defaults() {
        let row = PhotoRow {
            id: 1,
            image_path: "food/a.jpg".into(),
            title: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(row.display_title(), "Untitled photo");
        assert_eq!(row.display_category(), "uncategorized");
        assert!(row.tag_list().is_empty());
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("car".parse::<PhotoCategory>(), Ok(PhotoCategory::Car));
        assert!("cars".parse::<PhotoCategory>().is_err());
        assert_eq!(
            serde_json::to_string(&PhotoCategory::Business).unwrap(),
            "\"business\""
        );
    }
}

use axum::extract::{Multipart, Path, State};
use axum::response::{Html, Redirect};
use axum::{Extension, Form};
use bytes::Bytes;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::auth::AdminContext;
use crate::api::response::{AppQuery, PageError};
use crate::api::views::{self, Notice, RowNotice, UploadLogEntry, UploadOutcome};
use crate::models::{
    parse_tags, sort_anime, Anime, AnimeFields, NewPhoto, PhotoCategory, PhotoChanges, PhotoQuery,
    PhotoRow, ADMIN_DEFAULT_SORT, STATUS_OPTIONS,
};
use crate::object_store::PutOptions;
use crate::AppState;

/// Seconds browsers may cache an uploaded anime cover.
const COVER_CACHE_SECONDS: u32 = 3600;

// ============================================================================
// Request types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AnimeQuery {
    pub id: Option<String>,
    pub notice: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnimeForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub total_seasons: String,
    #[serde(default)]
    pub seasons_watched: String,
    /// Present only when the checkbox is ticked.
    pub is_favorite: Option<String>,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub sort_order: String,
    #[serde(default)]
    pub cover_url: String,
}

#[derive(Debug, Deserialize)]
pub struct ManageQuery {
    pub category: Option<String>,
    pub saved: Option<i64>,
    pub failed: Option<i64>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PhotoForm {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub likes: String,
    #[serde(default)]
    pub views: String,
}

// ============================================================================
// Form helpers
// ============================================================================

/// Numeric form input; anything unparsable becomes 0, negatives clamp to 0.
fn parse_count(raw: &str) -> i64 {
    raw.trim().parse::<i64>().unwrap_or(0).max(0)
}

fn parse_int(raw: &str, default: i32) -> i32 {
    raw.trim().parse::<i32>().unwrap_or(default)
}

fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl AnimeForm {
    fn into_fields(self) -> Result<AnimeFields, &'static str> {
        let title = non_blank(&self.title).ok_or("invalid-title")?;
        let status = self.status.trim().to_string();
        if !STATUS_OPTIONS.contains(&status.as_str()) {
            return Err("invalid-status");
        }
        Ok(AnimeFields {
            title,
            status,
            total_seasons: parse_int(&self.total_seasons, 1).max(0),
            seasons_watched: parse_int(&self.seasons_watched, 0).max(0),
            is_favorite: self.is_favorite.is_some(),
            tags: parse_tags(&self.tags),
            notes: Some(self.notes),
            sort_order: parse_int(&self.sort_order, ADMIN_DEFAULT_SORT),
            cover_url: non_blank(&self.cover_url),
        })
    }
}

fn anime_notice(code: &str) -> Notice {
    let (ok, message) = match code {
        "added" => (true, "Added a new anime."),
        "saved" => (true, "Changes saved."),
        "cover" => (true, "Cover uploaded and saved."),
        "add-failed" => (false, "Failed to add anime."),
        "save-failed" => (false, "Failed to save changes."),
        "not-found" => (false, "That anime no longer exists."),
        "invalid-title" => (false, "Title must not be empty."),
        "invalid-status" => (false, "Pick one of the listed statuses."),
        "cover-failed" => (false, "Failed to upload image."),
        "cover-url-failed" => (false, "Uploaded, but failed to save URL."),
        _ => (false, "Something went wrong."),
    };
    Notice {
        ok,
        message: message.to_string(),
    }
}

fn anime_redirect(id: &str, notice: &str) -> Redirect {
    Redirect::to(&format!(
        "/admin/anime?id={}&notice={notice}",
        urlencoding::encode(id)
    ))
}

/// Lower-case, whitespace to `-`, and only `[a-z0-9-]` kept.
fn slugify(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

/// Split a client file name into its base name and a safe extension
/// (`jpg` when there is none).
fn split_file_name(file_name: &str) -> (String, String) {
    let name = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name)
        .trim();
    let (base, ext) = match name.rsplit_once('.') {
        Some((base, ext)) if !base.is_empty() => (base, ext),
        _ => (name, ""),
    };
    let ext: String = ext
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    let ext = if ext.is_empty() { "jpg".to_string() } else { ext };
    (base.to_string(), ext)
}

/// Object path for a gallery upload: `<category>/<unix_ms>-<safe-base>.<ext>`.
pub fn upload_path(category: PhotoCategory, file_name: &str, unix_ms: i64) -> (String, String) {
    let (base, ext) = split_file_name(file_name);
    let path = format!("{}/{unix_ms}-{}.{ext}", category.as_str(), slugify(&base));
    (base, path)
}

/// Object path for an anime cover: `<id>/cover.<ext>`.
pub fn cover_path(anime_id: &str, file_name: &str) -> String {
    let (_, ext) = split_file_name(file_name);
    format!("{anime_id}/cover.{ext}")
}

fn content_type_for(declared: Option<String>, file_name: &str) -> String {
    declared
        .filter(|ct| ct != "application/octet-stream")
        .or_else(|| mime_guess::from_path(file_name).first().map(|m| m.to_string()))
        .unwrap_or_else(|| "application/octet-stream".to_string())
}

struct UploadedFile {
    file_name: String,
    content_type: String,
    data: Bytes,
}

async fn read_file_field(
    field: axum::extract::multipart::Field<'_>,
    max_size: u64,
) -> Result<Option<UploadedFile>, PageError> {
    let file_name = field.file_name().unwrap_or("").to_string();
    let declared = field.content_type().map(|s| s.to_string());
    let data = field
        .bytes()
        .await
        .map_err(|e| PageError::bad_request(format!("Failed to read file: {e}")))?;

    // Browsers send an empty part when no file was picked
    if file_name.is_empty() && data.is_empty() {
        return Ok(None);
    }
    if data.len() as u64 > max_size {
        return Err(PageError::payload_too_large(format!(
            "File exceeds maximum upload size of {max_size} bytes"
        )));
    }

    Ok(Some(UploadedFile {
        content_type: content_type_for(declared, &file_name),
        file_name,
        data,
    }))
}

async fn load_photos(
    state: &AppState,
    ctx: &AdminContext,
    query: &PhotoQuery,
) -> Result<Vec<(PhotoRow, String)>, String> {
    state
        .content
        .list_photos(&ctx.credentials, query)
        .await
        .map(|rows| {
            rows.into_iter()
                .map(|row| {
                    let url = state.media_url(&row.image_path);
                    (row, url)
                })
                .collect()
        })
        .map_err(|e| {
            error!(error = %e, "admin photos: load failed");
            e.to_string()
        })
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /admin
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AdminContext>,
) -> Html<String> {
    Html(views::admin_home(
        &state.config.site,
        ctx.user.email.as_deref(),
    ))
}

/// GET /admin/anime
pub async fn anime_editor(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AdminContext>,
    AppQuery(query): AppQuery<AnimeQuery>,
) -> Result<Html<String>, PageError> {
    let rows = state
        .content
        .list_anime(&ctx.credentials)
        .await
        .map_err(|e| {
            error!(error = %e, "admin anime: load failed");
            PageError::internal("Failed to load the anime list")
        })?;
    let list = sort_anime(rows, ADMIN_DEFAULT_SORT);

    let selected = match query.id.as_deref() {
        Some(id) => list.iter().position(|a| a.id == id).or(Some(0)),
        None => Some(0),
    }
    .filter(|_| !list.is_empty());

    let notice = query.notice.as_deref().map(anime_notice);
    Ok(Html(views::anime_editor(
        &state.config.site,
        &list,
        selected,
        notice.as_ref(),
    )))
}

/// POST /admin/anime/new
pub async fn anime_create(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AdminContext>,
) -> Redirect {
    let max_sort = match state.content.list_anime(&ctx.credentials).await {
        Ok(rows) => sort_anime(rows, ADMIN_DEFAULT_SORT)
            .iter()
            .map(|a| a.sort_order)
            .max()
            .unwrap_or(0),
        Err(e) => {
            error!(error = %e, "admin anime: load before insert failed");
            return Redirect::to("/admin/anime?notice=add-failed");
        }
    };

    match state
        .content
        .insert_anime(&ctx.credentials, &AnimeFields::placeholder(max_sort.saturating_add(1)))
        .await
    {
        Ok(row) => {
            info!(anime_id = %row.id, "admin anime: added");
            anime_redirect(&row.id, "added")
        }
        Err(e) => {
            error!(error = %e, "admin anime: insert failed");
            Redirect::to("/admin/anime?notice=add-failed")
        }
    }
}

/// POST /admin/anime/:id
pub async fn anime_save(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AdminContext>,
    Path(id): Path<String>,
    Form(form): Form<AnimeForm>,
) -> Redirect {
    let fields = match form.into_fields() {
        Ok(fields) => fields,
        Err(code) => return anime_redirect(&id, code),
    };

    match state
        .content
        .update_anime(&ctx.credentials, &id, &fields)
        .await
    {
        Ok(Some(_)) => {
            info!(anime_id = %id, "admin anime: saved");
            anime_redirect(&id, "saved")
        }
        Ok(None) => anime_redirect(&id, "not-found"),
        Err(e) => {
            error!(error = %e, anime_id = %id, "admin anime: save failed");
            anime_redirect(&id, "save-failed")
        }
    }
}

/// POST /admin/anime/:id/cover
pub async fn anime_cover(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AdminContext>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Redirect, PageError> {
    let mut upload: Option<UploadedFile> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| PageError::bad_request(format!("Invalid multipart data: {e}")))?
    {
        if field.name() == Some("file") {
            upload = read_file_field(field, state.config.max_upload_size).await?;
        }
    }
    let upload = upload.ok_or_else(|| PageError::bad_request("Pick an image to upload"))?;

    let row = match state.content.get_anime(&ctx.credentials, &id).await {
        Ok(Some(row)) => row,
        Ok(None) => return Ok(anime_redirect(&id, "not-found")),
        Err(e) => {
            error!(error = %e, anime_id = %id, "admin anime cover: load failed");
            return Ok(anime_redirect(&id, "cover-failed"));
        }
    };

    let bucket = &state.config.storage.covers_bucket;
    let path = cover_path(&id, &upload.file_name);
    let mut options = PutOptions::new(upload.content_type);
    options.upsert = true;
    options.cache_control = Some(COVER_CACHE_SECONDS);

    let stored = match state
        .object_store
        .put(&ctx.credentials, bucket, &path, upload.data, &options)
        .await
    {
        Ok(stored) => stored,
        Err(e) => {
            error!(error = %e, anime_id = %id, "admin anime cover: upload failed");
            return Ok(anime_redirect(&id, "cover-failed"));
        }
    };

    let mut fields = Anime::from_row(row, ADMIN_DEFAULT_SORT).to_fields();
    fields.cover_url = Some(state.object_store.public_url(bucket, &stored));

    match state
        .content
        .update_anime(&ctx.credentials, &id, &fields)
        .await
    {
        Ok(Some(_)) => {
            info!(anime_id = %id, path = %stored, "admin anime cover: saved");
            Ok(anime_redirect(&id, "cover"))
        }
        Ok(None) => Ok(anime_redirect(&id, "cover-url-failed")),
        Err(e) => {
            error!(error = %e, anime_id = %id, "admin anime cover: url update failed");
            Ok(anime_redirect(&id, "cover-url-failed"))
        }
    }
}

/// GET /admin/photos
pub async fn photo_uploader(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(views::photo_uploader(
        &state.config.site,
        PhotoCategory::Food,
        &state.config.storage.media_bucket,
        &[],
    ))
}

/// POST /admin/photos
///
/// Each file is uploaded, then recorded as a photo row. A failure on one file
/// is logged and the rest continue.
pub async fn photo_upload(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AdminContext>,
    mut multipart: Multipart,
) -> Result<Html<String>, PageError> {
    let mut category: Option<String> = None;
    let mut files: Vec<UploadedFile> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| PageError::bad_request(format!("Invalid multipart data: {e}")))?
    {
        match field.name().unwrap_or("") {
            "category" => {
                category = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| PageError::bad_request(format!("Invalid category: {e}")))?,
                );
            }
            "files" | "file" => {
                if let Some(file) = read_file_field(field, state.config.max_upload_size).await? {
                    files.push(file);
                }
            }
            _ => {}
        }
    }

    let category: PhotoCategory = category
        .as_deref()
        .unwrap_or("")
        .parse()
        .map_err(PageError::bad_request)?;
    if files.is_empty() {
        return Err(PageError::bad_request(
            "Pick at least one image file to upload.",
        ));
    }

    let bucket = &state.config.storage.media_bucket;
    let mut log = Vec::with_capacity(files.len());

    for file in files {
        let (title, path) = upload_path(
            category,
            &file.file_name,
            chrono::Utc::now().timestamp_millis(),
        );

        let options = PutOptions::new(file.content_type);
        let stored = match state
            .object_store
            .put(&ctx.credentials, bucket, &path, file.data, &options)
            .await
        {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, file = %file.file_name, "photo upload: storage upload failed");
                log.push(UploadLogEntry {
                    file_name: file.file_name,
                    path,
                    outcome: UploadOutcome::UploadFailed(e.to_string()),
                });
                continue;
            }
        };

        let photo = NewPhoto {
            category,
            title,
            description: String::new(),
            image_path: stored.clone(),
            tags: Vec::new(),
        };
        let outcome = match state.content.insert_photo(&ctx.credentials, &photo).await {
            Ok(row) => {
                info!(photo_id = row.id, path = %stored, "photo upload: saved");
                UploadOutcome::Saved
            }
            Err(e) => {
                warn!(error = %e, path = %stored, "photo upload: uploaded but insert failed");
                UploadOutcome::InsertFailed(e.to_string())
            }
        };
        log.push(UploadLogEntry {
            file_name: file.file_name,
            path: stored,
            outcome,
        });
    }

    Ok(Html(views::photo_uploader(
        &state.config.site,
        category,
        bucket,
        &log,
    )))
}

/// GET /admin/photos/manage
pub async fn photo_manager(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AdminContext>,
    AppQuery(query): AppQuery<ManageQuery>,
) -> Result<Html<String>, PageError> {
    let category = match query.category.as_deref() {
        None | Some("") => PhotoCategory::Food,
        Some(raw) => raw.parse().map_err(PageError::bad_request)?,
    };

    let (photos, load_error) =
        match load_photos(&state, &ctx, &PhotoQuery::category(category)).await {
            Ok(photos) => (photos, None),
            Err(e) => (Vec::new(), Some(e)),
        };

    let row_notice = match (query.saved, query.failed) {
        (Some(id), _) => Some(RowNotice {
            id,
            notice: Notice {
                ok: true,
                message: "Saved".to_string(),
            },
        }),
        (None, Some(id)) => Some(RowNotice {
            id,
            notice: Notice {
                ok: false,
                message: query
                    .message
                    .clone()
                    .unwrap_or_else(|| "Failed to save".to_string()),
            },
        }),
        (None, None) => None,
    };

    Ok(Html(views::photo_manager(
        &state.config.site,
        category,
        &photos,
        row_notice.as_ref(),
        load_error.as_deref(),
    )))
}

/// POST /admin/photos/manage/:id
pub async fn photo_save(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AdminContext>,
    Path(id): Path<i64>,
    Form(form): Form<PhotoForm>,
) -> Redirect {
    let category = form
        .category
        .parse::<PhotoCategory>()
        .unwrap_or(PhotoCategory::Food);
    let changes = PhotoChanges {
        title: non_blank(&form.title),
        description: Some(form.description.trim().to_string()),
        tags: parse_tags(&form.tags),
        likes: parse_count(&form.likes),
        views: parse_count(&form.views),
    };

    let back = format!("/admin/photos/manage?category={}", category.as_str());
    match state
        .content
        .update_photo(&ctx.credentials, id, &changes)
        .await
    {
        Ok(Some(_)) => {
            info!(photo_id = id, "photo manager: saved");
            Redirect::to(&format!("{back}&saved={id}#photo-{id}"))
        }
        Ok(None) => Redirect::to(&format!(
            "{back}&failed={id}&message={}",
            urlencoding::encode("Photo not found")
        )),
        Err(e) => {
            error!(error = %e, photo_id = id, "photo manager: save failed");
            Redirect::to(&format!(
                "{back}&failed={id}&message={}#photo-{id}",
                urlencoding::encode(&e.to_string())
            ))
        }
    }
}

/// Any other path under /admin, reached only past the gate.
pub async fn admin_not_found() -> PageError {
    PageError::not_found("Page not found")
}

/// GET /admin/library
pub async fn photo_library(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AdminContext>,
) -> Html<String> {
    let (photos, load_error) = match load_photos(&state, &ctx, &PhotoQuery::default()).await {
        Ok(photos) => (photos, None),
        Err(e) => (Vec::new(), Some(e)),
    };
    Html(views::photo_library(
        &state.config.site,
        &photos,
        load_error.as_deref(),
    ))
}

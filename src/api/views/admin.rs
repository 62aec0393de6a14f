use super::{attr, layout, tag_line, text, PageMeta};
use crate::config::SiteConfig;
use crate::models::{Anime, PhotoCategory, PhotoRow, STATUS_OPTIONS};

/// One-line flash message shown above an admin form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub ok: bool,
    pub message: String,
}

impl Notice {
    fn render(&self) -> String {
        let class = if self.ok { "notice ok" } else { "notice error" };
        format!("<p class=\"{class}\">{}</p>", text(&self.message))
    }
}

/// Result of one file in a bulk upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Saved,
    UploadFailed(String),
    InsertFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadLogEntry {
    pub file_name: String,
    pub path: String,
    pub outcome: UploadOutcome,
}

impl UploadLogEntry {
    pub fn line(&self) -> String {
        match &self.outcome {
            UploadOutcome::Saved => format!("✅ {} → {}: uploaded and saved", self.file_name, self.path),
            UploadOutcome::UploadFailed(e) => {
                format!("❌ {}: storage upload failed: {e}", self.file_name)
            }
            UploadOutcome::InsertFailed(e) => {
                format!("⚠️ {}: uploaded, but DB insert failed: {e}", self.file_name)
            }
        }
    }
}

fn admin_links(links: &[(&str, &str)]) -> String {
    let mut html = String::from("<div class=\"admin-actions\">");
    for (href, label) in links {
        html.push_str(&format!("<a class=\"button\" href=\"{href}\">{label}</a>"));
    }
    html.push_str("</div>");
    html
}

pub fn admin_home(site: &SiteConfig, email: Option<&str>) -> String {
    let signed_in = email
        .map(|e| format!("<p class=\"muted\">Signed in as {}.</p>", text(e)))
        .unwrap_or_default();
    let body = format!(
        r#"<header class="card"><h1>Admin</h1>
<p>Private area for managing site content.</p>
{signed_in}
{links}
<form method="post" action="/logout"><button type="submit" class="link">Sign out</button></form>
</header>"#,
        links = admin_links(&[
            ("/admin/photos", "Photo uploader"),
            ("/admin/photos/manage", "Manage photos"),
            ("/admin/library", "Photo library"),
            ("/admin/anime", "Anime admin"),
        ]),
    );
    layout(site, &PageMeta::titled("Admin"), &body)
}

/// `list` must be sorted; `selected` indexes into it.
pub fn anime_editor(
    site: &SiteConfig,
    list: &[Anime],
    selected: Option<usize>,
    notice: Option<&Notice>,
) -> String {
    let mut body = String::from(
        r#"<header class="card"><h1>Anime admin</h1>
<p>Manage the anime list here. The public page under <code>/anime</code> renders a nicer view of this data.</p>
</header>
<section class="card stack">"#,
    );
    if let Some(notice) = notice {
        body.push_str(&notice.render());
    }

    let current = selected.and_then(|idx| list.get(idx).map(|anime| (idx, anime)));

    body.push_str("<div class=\"toolbar\"><h2 class=\"section-title\">Anime list</h2>");
    if !list.is_empty() {
        body.push_str("<form method=\"get\" action=\"/admin/anime\" class=\"inline\"><label>Select title: <select name=\"id\" onchange=\"this.form.submit()\">");
        for (idx, anime) in list.iter().enumerate() {
            let star = if anime.favorite { "★ " } else { "" };
            let sel = if current.map(|(i, _)| i) == Some(idx) {
                " selected"
            } else {
                ""
            };
            body.push_str(&format!(
                "<option value=\"{}\"{sel}>{star}{}</option>",
                attr(&anime.id),
                text(&anime.title)
            ));
        }
        body.push_str("</select></label><noscript><button type=\"submit\">Go</button></noscript></form>");

        if let Some((idx, _)) = current {
            let prev = list[idx.saturating_sub(1)].id.as_str();
            let next = list[(idx + 1).min(list.len() - 1)].id.as_str();
            body.push_str(&format!(
                "<a class=\"button\" href=\"/admin/anime?id={}\">&larr;</a><a class=\"button\" href=\"/admin/anime?id={}\">&rarr;</a>",
                attr(&urlencoding::encode(prev)),
                attr(&urlencoding::encode(next)),
            ));
        }
    }
    body.push_str("<form method=\"post\" action=\"/admin/anime/new\" class=\"inline\"><button type=\"submit\" class=\"primary\">Add anime</button></form></div>");

    match current {
        None => body.push_str("<p class=\"muted\">No anime yet. Click \"Add anime\" to start.</p>"),
        Some((_, anime)) => body.push_str(&anime_form(anime)),
    }

    body.push_str("</section>");
    layout(site, &PageMeta::titled("Anime admin"), &body)
}

fn anime_form(anime: &Anime) -> String {
    let id = urlencoding::encode(&anime.id);
    let mut status_options = String::new();
    for status in STATUS_OPTIONS {
        let sel = if anime.status == status { " selected" } else { "" };
        status_options.push_str(&format!("<option value=\"{status}\"{sel}>{status}</option>"));
    }
    let checked = if anime.favorite { " checked" } else { "" };
    let preview = match &anime.cover_url {
        Some(url) => format!("<img src=\"{}\" alt=\"{}\">", attr(url), attr(&anime.title)),
        None => "<span class=\"muted\">No image</span>".to_string(),
    };

    format!(
        r#"<form method="post" action="/admin/anime/{id}" class="editor stack">
<div class="row">
<label class="check"><input type="checkbox" name="is_favorite" value="on"{checked}> Favorite</label>
<label class="grow">Title<input type="text" name="title" value="{title}" required></label>
<label>Status<select name="status">{status_options}</select></label>
<label>Seasons (watched / total)<span class="pair"><input type="number" name="seasons_watched" min="0" value="{watched}"> / <input type="number" name="total_seasons" min="1" value="{total}"></span></label>
</div>
<div class="row">
<label class="grow">Tags (comma-separated)<input type="text" name="tags" value="{tags}"></label>
<label class="grow">Notes<textarea name="notes" rows="2">{notes}</textarea></label>
</div>
<div class="row">
<label class="grow">Cover image URL<input type="text" name="cover_url" value="{cover}" placeholder="https://..."></label>
<label>Position<input type="number" name="sort_order" value="{sort}"></label>
</div>
<div class="row spread"><span class="muted">Position: {sort} · Likes: {likes} · Views: {views}</span><button type="submit" class="primary">Save changes</button></div>
</form>
<form method="post" action="/admin/anime/{id}/cover" enctype="multipart/form-data" class="row cover-upload">
<div class="cover-preview">{preview}</div>
<label class="grow">Upload cover image<input type="file" name="file" accept="image/*" required></label>
<button type="submit">Upload</button>
<p class="muted">JPEG/PNG is fine. Uploading saves the URL automatically.</p>
</form>"#,
        title = attr(&anime.title),
        watched = anime.seasons_watched,
        total = anime.total_seasons,
        tags = attr(&anime.tags.join(", ")),
        notes = text(anime.notes.as_deref().unwrap_or("")),
        cover = attr(anime.cover_url.as_deref().unwrap_or("")),
        sort = anime.sort_order,
        likes = anime.likes,
        views = anime.views,
    )
}

fn category_select(name: &str, selected: PhotoCategory, auto_submit: bool) -> String {
    let onchange = if auto_submit {
        " onchange=\"this.form.submit()\""
    } else {
        ""
    };
    let mut html = format!("<select name=\"{name}\"{onchange}>");
    for category in PhotoCategory::ALL {
        let sel = if category == selected { " selected" } else { "" };
        html.push_str(&format!(
            "<option value=\"{}\"{sel}>{}</option>",
            category.as_str(),
            category.label()
        ));
    }
    html.push_str("</select>");
    html
}

pub fn photo_uploader(
    site: &SiteConfig,
    category: PhotoCategory,
    media_bucket: &str,
    log: &[UploadLogEntry],
) -> String {
    let mut body = format!(
        r#"<header class="card"><h1>Photo uploader</h1>
<p>Bulk upload photos into the <code>photos</code> table and <code>{bucket}</code> storage bucket.</p>
<p class="muted">This saves the filename as the title and leaves tags empty.</p>
{links}
</header>
<section class="card stack">
<form method="post" action="/admin/photos" enctype="multipart/form-data" class="stack">
<label>Category {select}</label>
<label>Photos<input type="file" name="files" multiple accept="image/*" required></label>
<p class="muted">Tip: you can select many files at once with Ctrl/Shift-click in the file picker.</p>
<button type="submit" class="primary">Upload</button>
</form>"#,
        bucket = text(media_bucket),
        links = admin_links(&[
            ("/admin", "Admin home"),
            ("/admin/photos/manage", "Manage photos"),
        ]),
        select = category_select("category", category, false),
    );

    if !log.is_empty() {
        let failed = log
            .iter()
            .any(|entry| matches!(entry.outcome, UploadOutcome::UploadFailed(_)));
        let (class, status) = if failed {
            ("notice error", "Finished with errors")
        } else {
            ("notice ok", "Done")
        };
        body.push_str(&format!(
            "<div class=\"upload-log\"><h2>Upload log</h2><p class=\"{class}\">{status}</p><ul>"
        ));
        for entry in log {
            body.push_str(&format!("<li>{}</li>", text(&entry.line())));
        }
        body.push_str("</ul></div>");
    }

    body.push_str("</section>");
    layout(site, &PageMeta::titled("Photo uploader"), &body)
}

/// Per-row result of the last save, keyed by photo id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowNotice {
    pub id: i64,
    pub notice: Notice,
}

pub fn photo_manager(
    site: &SiteConfig,
    category: PhotoCategory,
    photos: &[(PhotoRow, String)],
    row_notice: Option<&RowNotice>,
    load_error: Option<&str>,
) -> String {
    let mut body = format!(
        r#"<header class="card"><h1>Manage photos</h1>
<p>Edit titles, descriptions, tags, likes, and views for your photos.</p>
{links}
<form method="get" action="/admin/photos/manage"><label>Category {select}</label><noscript><button type="submit">Show</button></noscript></form>
</header>
<section class="card stack">"#,
        links = admin_links(&[("/admin", "Admin home"), ("/admin/photos", "Photo uploader")]),
        select = category_select("category", category, true),
    );

    if let Some(error) = load_error {
        body.push_str(&Notice {
            ok: false,
            message: format!("Failed to load photos: {error}"),
        }
        .render());
    } else if photos.is_empty() {
        body.push_str("<p class=\"muted\">No photos found for this category yet.</p>");
    }

    for (photo, url) in photos {
        body.push_str(&format!(
            r#"<form method="post" action="/admin/photos/manage/{id}" class="photo-row" id="photo-{id}">
<div class="thumb"><img src="{url}" alt="{alt}" loading="lazy"></div>
<div class="stack grow">"#,
            id = photo.id,
            url = attr(url),
            alt = attr(photo.display_title()),
        ));
        if let Some(rn) = row_notice.filter(|rn| rn.id == photo.id) {
            body.push_str(&rn.notice.render());
        }
        body.push_str(&format!(
            r#"<input type="hidden" name="category" value="{category}">
<div class="row">
<label class="grow">Title<input type="text" name="title" value="{title}"></label>
<label>Likes<input type="number" name="likes" min="0" value="{likes}"></label>
<label>Views<input type="number" name="views" min="0" value="{views}"></label>
</div>
<label>Description<textarea name="description" rows="2">{description}</textarea></label>
<label>Tags (comma-separated)<input type="text" name="tags" value="{tags}"></label>
<div class="row spread"><span class="muted">{path}</span><button type="submit" class="primary">Save</button></div>
</div>
</form>"#,
            category = category.as_str(),
            title = attr(photo.title.as_deref().unwrap_or("")),
            likes = photo.likes.unwrap_or(0).max(0),
            views = photo.views.unwrap_or(0).max(0),
            description = text(photo.description.as_deref().unwrap_or("")),
            tags = attr(&photo.tag_list().join(", ")),
            path = text(&photo.image_path),
        ));
    }

    body.push_str("</section>");
    layout(site, &PageMeta::titled("Manage photos"), &body)
}

pub fn photo_library(
    site: &SiteConfig,
    photos: &[(PhotoRow, String)],
    load_error: Option<&str>,
) -> String {
    let mut body = String::from(
        r#"<header class="card"><h1>Photo library</h1><p>Every uploaded photo, newest first.</p></header>
<section class="card">"#,
    );

    if let Some(error) = load_error {
        body.push_str(&format!(
            "<p class=\"notice error\">Failed to load photos: {}</p>",
            text(error)
        ));
    } else if photos.is_empty() {
        body.push_str("<p class=\"muted\">No photos found yet.</p>");
    } else {
        body.push_str("<div class=\"library-grid\">");
        for (photo, url) in photos {
            let date = photo
                .created_at
                .map(|at| at.format("%Y-%m-%d").to_string())
                .unwrap_or_default();
            let description = photo
                .description
                .as_deref()
                .filter(|d| !d.is_empty())
                .map(|d| format!("<p class=\"subtitle\">{}</p>", text(d)))
                .unwrap_or_default();
            body.push_str(&format!(
                r#"<article class="library-item">
<div class="thumb contain"><img src="{url}" alt="{alt}" loading="lazy"></div>
<div class="meta"><span class="pill">{category}</span><span>{date}</span></div>
<h3>{title}</h3>
{description}
{tags}
</article>"#,
                url = attr(url),
                alt = attr(photo.display_title()),
                category = text(photo.display_category()),
                title = text(photo.display_title()),
                tags = tag_line(&photo.tag_list()),
            ));
        }
        body.push_str("</div>");
    }

    body.push_str("</section>");
    layout(site, &PageMeta::titled("Photo library"), &body)
}

use super::{attr, layout, tag_line, text, PageMeta, PLACEHOLDER_IMAGE};
use crate::config::SiteConfig;
use crate::models::{Anime, AnimeGroup, PhotoRow};

/// A displayed photo. Placeholder items have no id and get no counters.
#[derive(Debug, Clone)]
pub struct GalleryItem {
    pub id: Option<i64>,
    pub title: String,
    pub subtitle: Option<String>,
    pub image_url: String,
    pub tags: Vec<String>,
    pub likes: i64,
    pub views: i64,
}

impl GalleryItem {
    pub fn from_photo(row: &PhotoRow, image_url: String) -> Self {
        Self {
            id: Some(row.id),
            title: row.display_title().to_string(),
            subtitle: row.description.clone().filter(|d| !d.trim().is_empty()),
            image_url,
            tags: row.tag_list(),
            likes: row.likes.unwrap_or(0).max(0),
            views: row.views.unwrap_or(0).max(0),
        }
    }

    fn placeholder(title: &str, subtitle: &str, tags: &[&str]) -> Self {
        Self {
            id: None,
            title: title.to_string(),
            subtitle: Some(subtitle.to_string()),
            image_url: PLACEHOLDER_IMAGE.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            likes: 0,
            views: 0,
        }
    }
}

/// Which photo gallery a page shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gallery {
    Food,
    Cars,
}

impl Gallery {
    fn title(self) -> &'static str {
        match self {
            Gallery::Food => "Food",
            Gallery::Cars => "Cars",
        }
    }

    /// Shown when the backend query fails or returns nothing.
    pub fn placeholders(self) -> Vec<GalleryItem> {
        match self {
            Gallery::Food => vec![
                GalleryItem::placeholder(
                    "Miso Salmon & Broccoli",
                    "Saturday post-gym dinner, simple and clean.",
                    &["salmon", "broccoli", "dinner"],
                ),
                GalleryItem::placeholder(
                    "Steak, Potatoes & Greens",
                    "Learning the line between seared and burned.",
                    &["steak", "comfort", "weeknight"],
                ),
                GalleryItem::placeholder(
                    "Shrimp Rice Bowl",
                    "Shrimp, rice, and greens. Camera favorite.",
                    &["shrimp", "bowl", "meal prep"],
                ),
            ],
            Gallery::Cars => vec![
                GalleryItem::placeholder(
                    "2024 GR Corolla Circuit Edition",
                    "Blue Ice. Current daily and track toy.",
                    &["gr corolla", "circuit edition", "2024"],
                ),
                GalleryItem::placeholder(
                    "2019 Civic Type R",
                    "Black, turbo, and a very good time.",
                    &["civic type r", "2019"],
                ),
                GalleryItem::placeholder(
                    "1993 Civic Hatchback",
                    "Fully modified, white, and very loud.",
                    &["civic", "hatchback", "1993"],
                ),
            ],
        }
    }

    fn intro(self) -> &'static str {
        match self {
            Gallery::Food => {
                r#"<p>For the last few years, every time I cook something and the plate looks good, I take a picture. This page is a collage of those meals: post-gym dinners, weekend experiments, and whatever looked good enough to grab the camera.</p>
<p class="muted">Each dish gets tags and likes. Comments live in the global discussion, not under each photo.</p>"#
            }
            Gallery::Cars => {
                r#"<p>I like cars that make driving feel like a hobby, not a chore. This page starts with my current Blue Ice 2024 GR Corolla Circuit Edition, and eventually becomes a timeline of the cars I've owned and modified.</p>
<p class="muted">Same rules as the food page: each picture gets tags and likes.</p>"#
            }
        }
    }

    fn section(self) -> (&'static str, &'static str) {
        match self {
            Gallery::Food => (
                "Recent dishes",
                "Tags and likes per picture, comments in the global discussion.",
            ),
            Gallery::Cars => ("Garage", "A visual log of the cars I've owned or cared about."),
        }
    }
}

fn like_button(kind: &str, id: &str, likes: i64) -> String {
    format!(
        r#"<button type="button" class="like-btn" data-like="{kind}" data-id="{id}" data-likes="{likes}"><span class="heart" aria-hidden="true">&#9825;</span> <span class="count">{likes}</span></button>"#,
        id = attr(id),
    )
}

fn view_count(views: i64) -> String {
    format!(
        r#"<span class="views"><span aria-hidden="true">&#128065;</span> <span class="count">{views}</span></span>"#
    )
}

fn thumb(url: &str, alt: &str) -> String {
    format!(
        r#"<div class="thumb"><img src="{}" alt="{}" loading="lazy"></div>"#,
        attr(url),
        attr(alt)
    )
}

fn gallery_grid(items: &[GalleryItem]) -> String {
    if items.is_empty() {
        return "<p class=\"muted\">No photos yet. Once you upload some, they'll show up here.</p>"
            .to_string();
    }

    let mut html = String::from("<div class=\"gallery-grid\">");
    for item in items {
        html.push_str("<article class=\"tile\">");
        html.push_str(&thumb(&item.image_url, &item.title));
        html.push_str(&format!("<div class=\"tile-body\"><h3>{}</h3>", text(&item.title)));
        if let Some(subtitle) = &item.subtitle {
            html.push_str(&format!("<p class=\"subtitle\">{}</p>", text(subtitle)));
        }
        html.push_str("<div class=\"tile-foot\">");
        html.push_str(&tag_line(&item.tags));
        if let Some(id) = item.id {
            html.push_str("<span class=\"counters\">");
            html.push_str(&like_button("photo", &id.to_string(), item.likes));
            html.push_str(&view_count(item.views));
            html.push_str("</span>");
        }
        html.push_str("</div></div></article>");
    }
    html.push_str("</div>");
    html
}

/// Bulk view tracker; the script posts the ids once on load.
fn photo_view_tracker(items: &[GalleryItem]) -> String {
    let ids: Vec<String> = items
        .iter()
        .filter_map(|item| item.id)
        .map(|id| id.to_string())
        .collect();
    if ids.is_empty() {
        return String::new();
    }
    format!(
        r#"<div hidden data-photo-views="{}"></div>"#,
        attr(&ids.join(","))
    )
}

fn section_card(title: &str, description: &str, href: &str, badge: &str, inner: &str) -> String {
    format!(
        r#"<div class="card section-card">
<div class="card-head"><div><h2 class="section-title">{title}</h2><p class="section-subtitle">{description}</p></div><span class="badge">{badge}</span></div>
{inner}
<a class="explore" href="{href}">Explore &rarr;</a>
</div>"#,
        title = text(title),
        description = text(description),
        badge = text(badge),
        href = attr(href),
    )
}

fn preview_strip(images: &[(String, String)]) -> String {
    let mut html = String::from("<div class=\"preview-strip\">");
    for (url, alt) in images.iter().take(3) {
        html.push_str(&thumb(url, alt));
    }
    if images.len() == 1 {
        for _ in 0..2 {
            html.push_str("<div class=\"thumb empty\">More shots coming soon</div>");
        }
    }
    html.push_str("</div>");
    html
}

pub fn home_page(
    site: &SiteConfig,
    food: &[GalleryItem],
    cars: &[GalleryItem],
    anime_covers: &[(String, String)],
) -> String {
    let first_name = site.owner.split_whitespace().next().unwrap_or(&site.owner);
    let to_preview = |items: &[GalleryItem]| -> Vec<(String, String)> {
        items
            .iter()
            .take(3)
            .map(|item| (item.image_url.clone(), item.title.clone()))
            .collect()
    };

    let anime_preview = if anime_covers.is_empty() {
        (1..=3)
            .map(|n| (PLACEHOLDER_IMAGE.to_string(), format!("Anime preview {n}")))
            .collect()
    } else {
        anime_covers.to_vec()
    };

    let mut body = format!(
        r#"<section class="card intro">
<h1>Hi, I'm {name}.</h1>
<p>This site is my personal playground. It collects the things I care about and spend time on: the food I cook, the cars I drive, the anime I watch, and the businesses I'm building in the background.</p>
<p class="muted">Think of it as a living notebook: part photo gallery, part anime log, part dev log for projects like <strong class="accent">Kiori Solutions</strong>.</p>
</section>
<section class="section-grid">"#,
        name = text(first_name),
    );

    body.push_str(&section_card(
        "Food",
        "Collage of the meals I cook and plate, mostly post-gym and weekend experiments.",
        "/food",
        "Gallery",
        &preview_strip(&to_preview(food)),
    ));
    body.push_str(&section_card(
        "Cars",
        "My current GR Corolla and a timeline of the cars that came before it.",
        "/cars",
        "Garage",
        &preview_strip(&to_preview(cars)),
    ));
    body.push_str(&section_card(
        "Anime",
        "Watchlists, long-form shows, and the series I come back to over and over.",
        "/anime",
        "Lists",
        &format!(
            "{}<ul class=\"bullets\"><li>Currently watching &amp; seasonal shows.</li><li>Completed list &amp; rewatch candidates.</li><li>Special lists for long shounen and comfy shows.</li></ul>",
            preview_strip(&anime_preview)
        ),
    ));
    body.push_str("</section><section>");
    body.push_str(&section_card(
        "Projects",
        "Notes and updates on Kiori Solutions, KDP experiments, and other side projects.",
        "/business",
        "Work in progress",
        "<ul class=\"bullets\"><li>Kiori: inventory, costing, and clarity for food businesses.</li><li>KDP: journals, planners, and faith-based content.</li><li>Automations: n8n, Pinterest workflows, and other experiments.</li></ul>",
    ));
    body.push_str("</section>");

    layout(
        site,
        &PageMeta {
            title: None,
            noindex: false,
        },
        &body,
    )
}

pub fn gallery_page(site: &SiteConfig, gallery: Gallery, items: &[GalleryItem]) -> String {
    let (heading, subtitle) = gallery.section();
    let body = format!(
        r#"<header class="card"><h1>{title}</h1>{intro}</header>
<section class="gallery">
<div class="section-head"><h2 class="section-title">{heading}</h2><p class="section-subtitle">{subtitle}</p></div>
{grid}
{tracker}
</section>"#,
        title = gallery.title(),
        intro = gallery.intro(),
        grid = gallery_grid(items),
        tracker = photo_view_tracker(items),
    );
    layout(site, &PageMeta::titled(gallery.title()), &body)
}

fn anime_group_subtitle(group: AnimeGroup) -> &'static str {
    match group {
        AnimeGroup::Watching => "Shows I'm actively working through.",
        AnimeGroup::Planned => "On the radar, just not started yet.",
        AnimeGroup::Watched => "Finished shows.",
        AnimeGroup::Other => "On-hold, dropped, or anything that doesn't fit neatly above.",
    }
}

fn anime_tile(anime: &Anime) -> String {
    let cover = match &anime.cover_url {
        Some(url) => format!(
            r#"<div class="cover"><img src="{}" alt="{}" loading="lazy"></div>"#,
            attr(url),
            attr(&anime.title)
        ),
        None => "<div class=\"cover empty\">No image yet</div>".to_string(),
    };
    let star = if anime.favorite {
        "<span class=\"star\" aria-hidden=\"true\">&#9733;</span>"
    } else {
        ""
    };
    let tags = if anime.tags.is_empty() {
        String::new()
    } else {
        format!("<div>{}</div>", tag_line(&anime.tags))
    };
    let notes = match anime.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        Some(notes) => format!("<p class=\"notes\">{}</p>", text(notes)),
        None => String::new(),
    };

    format!(
        r#"<div class="anime-cell">
<article class="anime-tile">
{cover}
<div class="anime-body">
<div class="anime-title">{star}<h3>{title}</h3></div>
<p class="status">{status}</p>
{tags}{notes}
</div>
<div class="counters">{like}{views}</div>
</article>
<span hidden data-anime-view="{id}"></span>
</div>"#,
        title = text(&anime.title),
        status = text(&anime.status_line()),
        like = like_button("anime", &anime.id, anime.likes),
        views = view_count(anime.views),
        id = attr(&anime.id),
    )
}

/// `anime` must already be sorted.
pub fn anime_page(site: &SiteConfig, anime: &[Anime]) -> String {
    let mut body = String::from(
        r#"<header class="card"><h1>Anime</h1>
<p>Ongoing log of the anime I've watched, finished, or plan to watch. It started life as an Excel sheet and now lives here so I can keep it updated from anywhere.</p>
<p class="muted">Each title keeps track of whether it's a favorite, how many seasons I've watched, and a few quick tags. Likes and views are mostly for fun and future ideas.</p>
</header>"#,
    );

    for group in AnimeGroup::ALL {
        let rows: Vec<&Anime> = anime.iter().filter(|a| a.group() == group).collect();
        if rows.is_empty() {
            continue;
        }
        body.push_str(&format!(
            r#"<section class="anime-group"><div class="section-head"><h2 class="section-title">{}</h2><p class="section-subtitle">{}</p></div><div class="anime-grid">"#,
            group.heading(),
            anime_group_subtitle(group),
        ));
        for row in rows {
            body.push_str(&anime_tile(row));
        }
        body.push_str("</div></section>");
    }

    if anime.is_empty() {
        body.push_str(
            "<p class=\"muted\">No anime in the list yet. Add some under the admin page first.</p>",
        );
    }

    layout(site, &PageMeta::titled("Anime"), &body)
}

struct ThreadSummary {
    id: &'static str,
    title: &'static str,
    category: &'static str,
    comment_count: u32,
    created_at: &'static str,
}

const BUSINESS_THREADS: [ThreadSummary; 1] = [ThreadSummary {
    id: "biz-1",
    title: "Early thoughts on Kiori Solutions",
    category: "Business",
    comment_count: 3,
    created_at: "Sep 2025",
}];

fn thread_list(title: &str, threads: &[ThreadSummary]) -> String {
    let mut html = format!(
        r#"<div class="card threads"><div class="card-head"><h2 class="section-title">{}</h2><a href="/discuss">View all &rarr;</a></div><ul>"#,
        text(title)
    );
    if threads.is_empty() {
        html.push_str("<li class=\"muted\">No threads yet. Be the first to start a discussion.</li>");
    }
    for thread in threads {
        html.push_str(&format!(
            r#"<li><a href="/discuss/{id}">{title}</a><div class="thread-meta"><span class="pill">{category}</span><span>{count} comments</span><span>&bull;</span><span>{created}</span></div></li>"#,
            id = attr(thread.id),
            title = text(thread.title),
            category = thread.category,
            count = thread.comment_count,
            created = thread.created_at,
        ));
    }
    html.push_str("</ul></div>");
    html
}

pub fn business_page(site: &SiteConfig) -> String {
    let mut body = String::from(
        r#"<header class="card"><h1>Business</h1>
<p>This is where I keep a public log of the projects I'm building in the background: <strong class="accent">Kiori Solutions</strong> for food businesses, my KDP experiments, and whatever else I'm currently obsessed with.</p>
</header>
<section class="two-col">
<div class="card">
<h2 class="section-title">Kiori Solutions</h2>
<p>Kiori is a tool I'm building for food entrepreneurs: restaurants, food trucks, coffee shops, and anyone trying to keep costs and recipes under control without drowning in spreadsheets.</p>
<ul class="bullets"><li>Recipe and inventory tracking.</li><li>Costing and margin clarity per dish.</li><li>A clearer view of whether the numbers make sense.</li></ul>
<p class="muted">It's still in active development, but if you're curious:</p>
<a href="https://kiorisolutions.com" target="_blank" rel="noreferrer">Visit kiorisolutions.com &rarr;</a>
</div>
<div class="card">
<h2 class="section-title">KDP &amp; other experiments</h2>
<p>I also publish notebooks, journals, and other low/medium-content books through KDP. It's a mix of faith-based journals, simple planners, and experiments with more structured content.</p>
<p class="muted">Over time, I'll add links and notes here about what works, what doesn't, and what I'm trying next.</p>
</div>
</section>
<section>"#,
    );
    body.push_str(&thread_list("Business discussions", &BUSINESS_THREADS));
    body.push_str("</section>");
    layout(site, &PageMeta::titled("Business"), &body)
}

pub fn discuss_page(site: &SiteConfig) -> String {
    layout(
        site,
        &PageMeta {
            title: Some("Discuss"),
            noindex: true,
        },
        r#"<header class="card"><h1>Discuss</h1><p>This section is closed for now.</p></header>"#,
    )
}

pub fn login_page(site: &SiteConfig, next: &str, email: &str, error: Option<&str>) -> String {
    let error = error
        .map(|e| format!("<p class=\"error\">{}</p>", text(e)))
        .unwrap_or_default();
    let body = format!(
        r#"<section class="card narrow">
<h1>Sign in</h1>
<p class="muted">Admin access only. If you don't have an account, you won't be able to sign in.</p>
<form method="post" action="/login" class="stack">
<input type="hidden" name="next" value="{next}">
<label>Email<input type="email" name="email" value="{email}" autocomplete="email" required></label>
<label>Password<input type="password" name="password" autocomplete="current-password" required></label>
{error}
<button type="submit" class="primary">Sign in</button>
</form>
</section>"#,
        next = attr(next),
        email = attr(email),
    );
    layout(site, &PageMeta::titled("Login"), &body)
}

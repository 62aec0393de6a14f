//! Server-rendered HTML. Every interpolated value goes through [`text`] or
//! [`attr`]; markup is assembled with `format!` and `push_str`.

mod admin;
mod public;

pub use admin::*;
pub use public::*;

use std::borrow::Cow;

use axum::http::StatusCode;
use chrono::Datelike;

use crate::config::SiteConfig;

const NAV_ITEMS: [(&str, &str); 6] = [
    ("/", "Home"),
    ("/food", "Food"),
    ("/cars", "Cars"),
    ("/anime", "Anime"),
    ("/business", "Business"),
    ("/discuss", "Discuss"),
];

/// Fallback image for placeholder gallery items.
pub const PLACEHOLDER_IMAGE: &str = "/assets/placeholder.svg";

pub(crate) fn text(value: &str) -> Cow<'_, str> {
    html_escape::encode_text(value)
}

pub(crate) fn attr(value: &str) -> Cow<'_, str> {
    html_escape::encode_double_quoted_attribute(value)
}

/// Head metadata for one page.
pub struct PageMeta<'a> {
    /// Shown before the site title; `None` for the home page.
    pub title: Option<&'a str>,
    pub noindex: bool,
}

impl<'a> PageMeta<'a> {
    pub fn titled(title: &'a str) -> Self {
        Self {
            title: Some(title),
            noindex: false,
        }
    }
}

/// Wrap page content in the shared chrome: nav, main column, footer.
pub fn layout(site: &SiteConfig, meta: &PageMeta<'_>, body: &str) -> String {
    let title = match meta.title {
        Some(page) => format!("{} | {}", text(page), text(&site.title)),
        None => text(&site.title).into_owned(),
    };
    let robots = if meta.noindex {
        "\n<meta name=\"robots\" content=\"noindex, nofollow\">"
    } else {
        ""
    };

    let (brand, tld) = site
        .title
        .rsplit_once('.')
        .map(|(name, tld)| (name.to_string(), format!(".{tld}")))
        .unwrap_or_else(|| (site.title.clone(), String::new()));
    let initials: String = site
        .owner
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .collect();

    let mut nav = String::new();
    for (href, label) in NAV_ITEMS {
        nav.push_str(&format!("<li><a href=\"{href}\">{label}</a></li>"));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<meta name="description" content="{description}">{robots}
<link rel="stylesheet" href="/assets/site.css">
<script src="/assets/site.js" defer></script>
</head>
<body>
<header class="site-header">
<nav class="site-nav">
<a href="/" class="brand"><span class="brand-mark">{initials}</span><span class="brand-name">{brand}<span class="accent">{tld}</span></span></a>
<ul>{nav}</ul>
</nav>
</header>
<main class="site-main">
{body}
</main>
<footer class="site-footer">
<span>&copy; {year} {owner}</span>
<span class="muted">Personal playground</span>
</footer>
</body>
</html>
"#,
        description = attr(&format!(
            "{}'s personal site: food, cars, anime, and business experiments.",
            site.owner
        )),
        initials = text(&initials),
        brand = text(&brand),
        tld = text(&tld),
        year = chrono::Utc::now().year(),
        owner = text(&site.owner),
    )
}

/// Standalone page for [`crate::api::response::PageError`]. Rendered without
/// site config, so it carries its own minimal chrome.
pub fn error_page(status: StatusCode, message: &str) -> String {
    let reason = status.canonical_reason().unwrap_or("Error");
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{code} {reason}</title>
<link rel="stylesheet" href="/assets/site.css">
</head>
<body>
<main class="site-main">
<section class="card">
<h1>{code} {reason}</h1>
<p>{message}</p>
<p><a href="/">Back home &rarr;</a></p>
</section>
</main>
</body>
</html>
"#,
        code = status.as_u16(),
        message = text(message),
    )
}

/// Tags joined for display, or a muted placeholder.
pub(crate) fn tag_line(tags: &[String]) -> String {
    if tags.is_empty() {
        return "<span class=\"tags muted\">No tags yet</span>".to_string();
    }
    format!("<span class=\"tags\">{}</span>", text(&tags.join(" · ")))
}

mod admin;
mod auth;
mod counters;
mod internal;
mod pages;
mod static_files;

pub use admin::{
    admin_not_found, anime_cover, anime_create, anime_editor, anime_save, cover_path, dashboard,
    photo_library, photo_manager, photo_save, photo_upload, photo_uploader, upload_path,
};
pub use auth::{login, login_form, logout, require_admin, safe_next, AdminContext, AUTH_SESSION_KEY};
pub use counters::{anime_like, anime_view, photo_like, photo_view, photo_views};
pub use internal::health;
pub use pages::{anime, business, cars, discuss, food, home};
pub use static_files::{placeholder_svg, serve_object, site_css, site_js};

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;
use tracing::{error, info, warn};

use crate::api::response::{AppQuery, PageError};
use crate::api::views;
use crate::backend::{AuthSession, AuthUser, BackendError, Credentials};
use crate::AppState;

/// Session key the signed-in backend session is stored under.
pub const AUTH_SESSION_KEY: &str = "auth";

const DEFAULT_NEXT: &str = "/admin";

/// Inserted into request extensions by [`require_admin`].
#[derive(Debug, Clone)]
pub struct AdminContext {
    pub user: AuthUser,
    /// The admin's own token; writes made with it pass row-level security.
    pub credentials: Credentials,
}

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub next: Option<String>,
}

/// Only site-relative paths are followed after sign-in. Anything else,
/// including protocol-relative `//host` forms, falls back to `/admin`.
pub fn safe_next(next: Option<&str>) -> String {
    match next.map(str::trim) {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.starts_with("/\\")
                && !path.chars().any(char::is_control) =>
        {
            path.to_string()
        }
        _ => DEFAULT_NEXT.to_string(),
    }
}

fn login_redirect(path: &str) -> Response {
    Redirect::temporary(&format!("/login?next={}", urlencoding::encode(path))).into_response()
}

async fn stored_session(session: &Session) -> Option<AuthSession> {
    match session.get::<AuthSession>(AUTH_SESSION_KEY).await {
        Ok(auth) => auth,
        Err(e) => {
            warn!(error = %e, "session: failed to read auth state");
            None
        }
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Gate for every `/admin` route.
///
/// No session sends the visitor to `/login`. An expired access token is
/// refreshed once; if that fails the session is cleared. Signed-in users
/// missing from the admin allowlist, or any lookup failure, go back to `/`.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    let Some(mut auth) = stored_session(&session).await else {
        return login_redirect(&path);
    };

    let user = match state.auth.get_user(&auth.access_token).await {
        Ok(Some(user)) => user,
        Ok(None) => match state.auth.refresh(&auth.refresh_token).await {
            Ok(refreshed) => {
                if let Err(e) = session.insert(AUTH_SESSION_KEY, &refreshed).await {
                    warn!(error = %e, "admin gate: failed to store refreshed session");
                }
                auth = refreshed;
                auth.user.clone()
            }
            Err(e) => {
                info!(error = %e, "admin gate: session refresh failed");
                if let Err(e) = session.flush().await {
                    warn!(error = %e, "admin gate: failed to clear session");
                }
                return login_redirect(&path);
            }
        },
        Err(e) => {
            error!(error = %e, "admin gate: user lookup failed");
            return Redirect::temporary("/").into_response();
        }
    };

    let credentials = Credentials::User(auth.access_token.clone());
    match state.content.is_admin(&credentials, &user.id).await {
        Ok(true) => {}
        Ok(false) => {
            warn!(user_id = %user.id, "admin gate: user is not in the admin allowlist");
            return Redirect::temporary("/").into_response();
        }
        Err(e) => {
            error!(error = %e, user_id = %user.id, "admin gate: allowlist lookup failed");
            return Redirect::temporary("/").into_response();
        }
    }

    request
        .extensions_mut()
        .insert(AdminContext { user, credentials });
    next.run(request).await
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /login
pub async fn login_form(
    State(state): State<Arc<AppState>>,
    AppQuery(query): AppQuery<LoginQuery>,
) -> Html<String> {
    let next = safe_next(query.next.as_deref());
    Html(views::login_page(&state.config.site, &next, "", None))
}

/// POST /login
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, PageError> {
    let next = safe_next(form.next.as_deref());
    let email = form.email.trim();

    let auth = match state.auth.sign_in(email, &form.password).await {
        Ok(auth) => auth,
        Err(BackendError::Unauthorized(message)) => {
            info!(email = %email, "login: rejected credentials");
            let message = if message.is_empty() {
                "Invalid login credentials".to_string()
            } else {
                message
            };
            let html = views::login_page(&state.config.site, &next, email, Some(&message));
            return Ok((StatusCode::UNAUTHORIZED, Html(html)).into_response());
        }
        Err(e) => {
            error!(error = %e, "login: sign-in request failed");
            let html = views::login_page(
                &state.config.site,
                &next,
                email,
                Some("Sign-in is unavailable right now. Try again shortly."),
            );
            return Ok((StatusCode::BAD_GATEWAY, Html(html)).into_response());
        }
    };

    session
        .cycle_id()
        .await
        .map_err(|e| PageError::internal(format!("Failed to create session: {e}")))?;
    session
        .insert(AUTH_SESSION_KEY, &auth)
        .await
        .map_err(|e| PageError::internal(format!("Failed to create session: {e}")))?;

    info!(user_id = %auth.user.id, "login: signed in");
    Ok(Redirect::to(&next).into_response())
}

/// POST /logout
pub async fn logout(State(state): State<Arc<AppState>>, session: Session) -> Redirect {
    if let Some(auth) = stored_session(&session).await {
        if let Err(e) = state.auth.sign_out(&auth.access_token).await {
            warn!(error = %e, "logout: backend sign-out failed");
        }
    }
    if let Err(e) = session.flush().await {
        warn!(error = %e, "logout: failed to clear session");
    }
    Redirect::to("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(None), "/admin");
        assert_eq!(safe_next(Some("/admin/anime")), "/admin/anime");
        assert_eq!(safe_next(Some("/admin/photos/manage?category=car")), "/admin/photos/manage?category=car");
        assert_eq!(safe_next(Some("//evil.example.com")), "/admin");
        assert_eq!(safe_next(Some("/\\evil.example.com")), "/admin");
        assert_eq!(safe_next(Some("https://evil.example.com")), "/admin");
        assert_eq!(safe_next(Some("")), "/admin");
    }
}

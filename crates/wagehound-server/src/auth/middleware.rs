use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;

use crate::auth::session;
use crate::error::AppError;
use crate::routes::AppState;

pub const SESSION_COOKIE: &str = "wagehound-session";

/// Path prefixes that bypass the page gate: auth pages, the API (which
/// enforces auth per route), and static assets.
const PUBLIC_PREFIXES: &[&str] = &[
    "/login",
    "/signup",
    "/api/",
    "/health",
    "/static/",
    "/favicon.ico",
    "/manifest.json",
    "/icons/",
];

pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PREFIXES.iter().any(|p| path.starts_with(p))
}

/// API auth: resolves the session cookie to a user or answers 401.
pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or(AppError::Unauthorized)?;

    let (_session, user) = session::validate_session(&state.db, &token)?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Page gate: allow-listed paths pass through, anything else needs a
/// valid session or gets redirected to the login page.
pub async fn require_page_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    if is_public_path(request.uri().path()) {
        return next.run(request).await;
    }

    let token = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
    let validated = token.and_then(|t| session::validate_session(&state.db, &t).ok());

    match validated {
        Some((_session, user)) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        None => Redirect::to("/login").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_pages_and_api_are_public() {
        assert!(is_public_path("/login"));
        assert!(is_public_path("/signup"));
        assert!(is_public_path("/api/shifts"));
        assert!(is_public_path("/api/auth/login"));
        assert!(is_public_path("/health"));
    }

    #[test]
    fn static_assets_are_public() {
        assert!(is_public_path("/favicon.ico"));
        assert!(is_public_path("/manifest.json"));
        assert!(is_public_path("/icons/192.png"));
        assert!(is_public_path("/static/app.js"));
    }

    #[test]
    fn app_pages_are_gated() {
        assert!(!is_public_path("/"));
        assert!(!is_public_path("/dashboard"));
        assert!(!is_public_path("/calendar"));
        assert!(!is_public_path("/reports"));
        assert!(!is_public_path("/apifake"));
    }
}

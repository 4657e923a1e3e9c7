use axum::{extract::State, response::IntoResponse, Extension, Json};
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::{middleware::SESSION_COOKIE, session};
use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
}

/// Passwordless login: the email is the identity. Unknown emails get a
/// fresh account.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    if body.email.is_empty() || !body.email.contains('@') {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }

    let user = create_or_get_user(&state, &body.email)?;
    let sess = session::create_session(&state.db, &user.id)?;

    let cookie = build_session_cookie(sess.token, state.config.secure_cookies);
    Ok((jar.add(cookie), Json(user)))
}

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        session::delete_session(&state.db, cookie.value())?;
    }

    let removal = Cookie::build(SESSION_COOKIE)
        .path("/")
        .max_age(time::Duration::ZERO)
        .http_only(true)
        .build();

    Ok((jar.add(removal), Json(serde_json::json!({"ok": true}))))
}

pub async fn me(Extension(user): Extension<User>) -> Json<User> {
    Json(user)
}

fn create_or_get_user(state: &AppState, email: &str) -> AppResult<User> {
    let conn = state.db.get()?;

    let existing = conn.query_row(
        "SELECT id, email, created_at FROM users WHERE email = ?1",
        rusqlite::params![email],
        |row| {
            Ok(User {
                id: row.get(0)?,
                email: row.get(1)?,
                created_at: row.get(2)?,
            })
        },
    );

    match existing {
        Ok(user) => Ok(user),
        Err(rusqlite::Error::QueryReturnedNoRows) => {
            let id = Uuid::new_v4().to_string();
            let now = chrono::Utc::now()
                .format("%Y-%m-%dT%H:%M:%S%.3fZ")
                .to_string();
            conn.execute(
                "INSERT INTO users (id, email, created_at) VALUES (?1, ?2, ?3)",
                rusqlite::params![id, email, now],
            )?;
            Ok(User {
                id,
                email: email.to_string(),
                created_at: now,
            })
        }
        Err(e) => Err(AppError::Database(e)),
    }
}

fn build_session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .max_age(time::Duration::days(30))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{Session, User};

const SESSION_DURATION_DAYS: i64 = 30;

pub fn create_session(pool: &DbPool, user_id: &str) -> AppResult<Session> {
    let conn = pool.get()?;
    let id = Uuid::new_v4().to_string();
    let token = generate_token();
    let now = Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string();
    let expires_at = (Utc::now() + Duration::days(SESSION_DURATION_DAYS))
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string();

    conn.execute(
        "INSERT INTO sessions (id, user_id, token, expires_at, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![id, user_id, token, expires_at, now],
    )?;

    Ok(Session {
        id,
        user_id: user_id.to_string(),
        token,
        expires_at,
        created_at: now,
    })
}

/// Resolve a token to its session and owning user. Expired sessions are
/// deleted on read; there is no background sweep.
pub fn validate_session(pool: &DbPool, token: &str) -> AppResult<(Session, User)> {
    let conn = pool.get()?;

    let mut stmt = conn.prepare(
        "SELECT s.id, s.user_id, s.token, s.expires_at, s.created_at,
                u.id, u.email, u.created_at
         FROM sessions s
         JOIN users u ON u.id = s.user_id
         WHERE s.token = ?1",
    )?;

    let result = stmt.query_row(rusqlite::params![token], |row| {
        let session = Session {
            id: row.get(0)?,
            user_id: row.get(1)?,
            token: row.get(2)?,
            expires_at: row.get(3)?,
            created_at: row.get(4)?,
        };
        let user = User {
            id: row.get(5)?,
            email: row.get(6)?,
            created_at: row.get(7)?,
        };
        Ok((session, user))
    });

    match result {
        Ok((session, user)) => {
            let now = Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string();
            if session.expires_at <= now {
                conn.execute(
                    "DELETE FROM sessions WHERE id = ?1",
                    rusqlite::params![session.id],
                )?;
                return Err(AppError::Unauthorized);
            }
            Ok((session, user))
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(AppError::Unauthorized),
        Err(e) => Err(AppError::Database(e)),
    }
}

pub fn delete_session(pool: &DbPool, token: &str) -> AppResult<()> {
    let conn = pool.get()?;
    conn.execute("DELETE FROM sessions WHERE token = ?1", rusqlite::params![token])?;
    Ok(())
}

fn generate_token() -> String {
    use base64::Engine;
    let mut bytes = [0u8; 32];
    use rand::RngCore;
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    fn insert_user(pool: &DbPool, id: &str, email: &str) {
        let conn = pool.get().unwrap();
        conn.execute(
            "INSERT INTO users (id, email, created_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![id, email, "2024-01-01T00:00:00.000Z"],
        )
        .unwrap();
    }

    fn session_count(pool: &DbPool) -> i64 {
        let conn = pool.get().unwrap();
        conn.query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn created_session_validates() {
        let pool = create_test_pool();
        insert_user(&pool, "u1", "worker@example.com");

        let sess = create_session(&pool, "u1").unwrap();
        let (found, user) = validate_session(&pool, &sess.token).unwrap();
        assert_eq!(found.user_id, "u1");
        assert_eq!(user.email, "worker@example.com");
    }

    #[test]
    fn unknown_token_is_unauthorized() {
        let pool = create_test_pool();
        assert!(matches!(
            validate_session(&pool, "no-such-token"),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn expired_session_is_deleted_on_read() {
        let pool = create_test_pool();
        insert_user(&pool, "u1", "worker@example.com");

        let conn = pool.get().unwrap();
        conn.execute(
            "INSERT INTO sessions (id, user_id, token, expires_at, created_at)
             VALUES ('s1', 'u1', 'stale', '2020-01-01T00:00:00.000Z', '2019-12-01T00:00:00.000Z')",
            [],
        )
        .unwrap();
        drop(conn);

        assert_eq!(session_count(&pool), 1);
        assert!(matches!(
            validate_session(&pool, "stale"),
            Err(AppError::Unauthorized)
        ));
        assert_eq!(session_count(&pool), 0);
    }

    #[test]
    fn delete_session_removes_row() {
        let pool = create_test_pool();
        insert_user(&pool, "u1", "worker@example.com");

        let sess = create_session(&pool, "u1").unwrap();
        delete_session(&pool, &sess.token).unwrap();
        assert!(matches!(
            validate_session(&pool, &sess.token),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn tokens_are_unique_per_session() {
        let pool = create_test_pool();
        insert_user(&pool, "u1", "worker@example.com");

        let a = create_session(&pool, "u1").unwrap();
        let b = create_session(&pool, "u1").unwrap();
        assert_ne!(a.token, b.token);
    }
}

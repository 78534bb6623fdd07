use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

const INSERT_SESSION: &str =
    "INSERT INTO sessions (token_hash, user_id, expires_at) VALUES ($1, $2, $3)";

const FIND_SESSION_USER: &str = r#"
    SELECT user_id FROM sessions
    WHERE token_hash = $1 AND expires_at > NOW()
"#;

const DELETE_SESSION: &str = "DELETE FROM sessions WHERE token_hash = $1";

const DELETE_OTHER_SESSIONS: &str =
    "DELETE FROM sessions WHERE user_id = $1 AND token_hash <> $2";

const DELETE_EXPIRED_SESSIONS: &str = "DELETE FROM sessions WHERE expires_at <= $1";

/// Only the digest of a token is stored.
pub fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Issue a new session and return the raw bearer token.
pub async fn create_session(
    conn: &mut PgConnection,
    user_id: i64,
    ttl_hours: i64,
) -> Result<(String, DateTime<Utc>), sqlx::Error> {
    let token = Uuid::new_v4().simple().to_string();
    let expires_at = Utc::now() + Duration::hours(ttl_hours);
    sqlx::query(INSERT_SESSION)
        .bind(token_digest(&token))
        .bind(user_id)
        .bind(expires_at)
        .execute(conn)
        .await?;
    Ok((token, expires_at))
}

pub async fn find_session_user(pool: &PgPool, token: &str) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(FIND_SESSION_USER)
        .bind(token_digest(token))
        .fetch_optional(pool)
        .await
}

pub async fn delete_session(pool: &PgPool, token: &str) -> Result<(), sqlx::Error> {
    sqlx::query(DELETE_SESSION)
        .bind(token_digest(token))
        .execute(pool)
        .await?;
    Ok(())
}

/// Revoke every session of `user_id` except the one for `keep_token`.
pub async fn delete_other_sessions(
    conn: &mut PgConnection,
    user_id: i64,
    keep_token: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(DELETE_OTHER_SESSIONS)
        .bind(user_id)
        .bind(token_digest(keep_token))
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete_expired_sessions(
    pool: &PgPool,
    now: DateTime<Utc>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(DELETE_EXPIRED_SESSIONS)
        .bind(now)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_digest_is_stable_hex() {
        let digest = token_digest("abc");
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, token_digest("abc"));
        assert_ne!(digest, token_digest("abd"));
    }
}

use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

/// How long a bound session stays valid unless configured otherwise.
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// A new opaque session identifier.
pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// Server-side session records: an opaque session id bound to at most one user.
///
/// Records older than the store's time-to-live are treated as absent and removed by
/// `purge_expired`.
#[derive(Clone)]
pub struct SessionStore {
    pool: SqlitePool,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            ttl: Duration::hours(DEFAULT_SESSION_TTL_HOURS),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// The user bound to `session_id`, if any and not expired.
    pub async fn user_for(&self, session_id: &str) -> Result<Option<i64>, sqlx::Error> {
        let row = sqlx::query_as::<_, (Option<i64>, DateTime<Utc>)>(
            "SELECT user_id, created_at FROM sessions WHERE session_id = $1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match row {
            Some((user_id, created_at)) if created_at > Utc::now() - self.ttl => user_id,
            _ => None,
        })
    }

    /// Binds `session_id` to `user_id`, replacing any previous identity and restarting
    /// its lifetime.
    pub async fn bind(&self, session_id: &str, user_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO sessions (session_id, user_id, created_at) VALUES ($1, $2, $3)
             ON CONFLICT (session_id) DO UPDATE
             SET user_id = excluded.user_id, created_at = excluded.created_at",
        )
        .bind(session_id)
        .bind(user_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Forgets whatever is stored for `session_id`.
    pub async fn clear(&self, session_id: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM sessions WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Deletes every expired record, returning how many were removed.
    pub async fn purge_expired(&self) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE created_at <= $1")
            .bind(Utc::now() - self.ttl)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

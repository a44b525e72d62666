use anyhow::{Context, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{Session, User};
use crate::config::SessionSettings;

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: String,
    user_did: Option<String>,
    user_handle: Option<String>,
    created_at: i64,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        let user = match (row.user_did, row.user_handle) {
            (Some(did), Some(handle)) => Some(User { did, handle }),
            _ => None,
        };
        Session {
            id: row.id,
            user,
            created_at: row.created_at,
        }
    }
}

/// SQLite-backed session storage
///
/// Sessions older than `max_age_secs` are treated as absent on lookup even
/// before the pruner deletes them.
#[derive(Clone)]
pub struct SqliteSessionStore {
    pool: SqlitePool,
    max_age_secs: i64,
}

impl SqliteSessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            max_age_secs: SessionSettings::default().max_age_secs(),
        }
    }

    pub fn with_max_age(mut self, max_age_secs: i64) -> Self {
        self.max_age_secs = max_age_secs;
        self
    }

    /// Create a session, optionally bound to a user
    pub async fn create_session(&self, user: Option<User>) -> Result<Session> {
        let id = Uuid::new_v4().to_string();
        let created_at: i64 = sqlx::query_scalar(
            r#"INSERT INTO sessions (id, user_did, user_handle, created_at)
               VALUES (?, ?, ?, CAST(strftime('%s','now') AS INTEGER))
               RETURNING created_at"#,
        )
        .bind(&id)
        .bind(user.as_ref().map(|u| u.did.as_str()))
        .bind(user.as_ref().map(|u| u.handle.as_str()))
        .fetch_one(&self.pool)
        .await
        .context("failed to insert session")?;

        Ok(Session {
            id,
            user,
            created_at,
        })
    }

    pub async fn get_session(&self, session_id: &str) -> Result<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"SELECT id, user_did, user_handle, created_at FROM sessions
               WHERE id = ? AND created_at >= CAST(strftime('%s','now') AS INTEGER) - ?"#,
        )
        .bind(session_id)
        .bind(self.max_age_secs)
        .fetch_optional(&self.pool)
        .await
        .context("failed to load session")?;

        Ok(row.map(Session::from))
    }

    /// Delete a session (logout). Returns whether a session was removed.
    pub async fn delete_session(&self, session_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .context("failed to delete session")?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_sessions(&self) -> Result<Vec<Session>> {
        let rows = sqlx::query_as::<_, SessionRow>(
            "SELECT id, user_did, user_handle, created_at FROM sessions ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to list sessions")?;

        Ok(rows.into_iter().map(Session::from).collect())
    }

    /// Prune sessions older than `max_age_secs` seconds. Returns number of rows deleted.
    pub async fn prune_older_than(&self, max_age_secs: i64) -> Result<u64> {
        let result = sqlx::query(
            "DELETE FROM sessions WHERE created_at < CAST(strftime('%s','now') AS INTEGER) - ?",
        )
        .bind(max_age_secs)
        .execute(&self.pool)
        .await
        .context("failed to prune sessions")?;
        Ok(result.rows_affected())
    }
}

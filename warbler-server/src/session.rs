use crate::db::Database;
use crate::db::repositories::{format_timestamp, parse_timestamp};
use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use rusqlite::OptionalExtension;
use uuid::Uuid;

/// Number of days a login lasts unless configured otherwise
pub const DEFAULT_SESSION_TTL_DAYS: i64 = 30;

/// Database-backed session manager for browser logins
///
/// Each login gets a random UUID v4 token stored in the `sessions` table
/// together with the user id and an expiry time. Validation drops expired
/// rows on sight; `cleanup_expired_sessions` sweeps the rest.
#[derive(Clone)]
pub struct SessionManager {
    db: Database,
    ttl: Duration,
}

impl SessionManager {
    /// Create a new session manager with the default lifetime
    pub fn new(db: Database) -> Self {
        Self::with_ttl_days(db, DEFAULT_SESSION_TTL_DAYS)
    }

    pub fn with_ttl_days(db: Database, days: i64) -> Self {
        Self {
            db,
            ttl: Duration::days(days),
        }
    }

    /// Create a new session for a user and return its token
    pub fn create_session(&self, user_id: i64) -> Result<String> {
        let token = Uuid::new_v4().to_string();
        let created_at = Utc::now();
        let expires_at = created_at + self.ttl;

        let conn = self.db.connection()?;
        conn.execute(
            "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                token,
                user_id,
                format_timestamp(&created_at),
                format_timestamp(&expires_at),
            ],
        )
        .context("Failed to create session")?;

        tracing::info!("Created session for user #{}", user_id);
        Ok(token)
    }

    /// Validate a session token and return the associated user ID
    ///
    /// Unknown and expired tokens are errors; an expired token is deleted.
    pub fn validate_session(&self, token: &str) -> Result<i64> {
        let row = {
            let conn = self.db.connection()?;
            conn.query_row(
                "SELECT user_id, expires_at FROM sessions WHERE token = ?1",
                rusqlite::params![token],
                |row| Ok((row.get::<_, i64>(0)?, parse_timestamp(1, row.get(1)?)?)),
            )
            .optional()
            .context("Failed to look up session")?
        };

        let (user_id, expires_at) = match row {
            Some(row) => row,
            None => anyhow::bail!("Session not found"),
        };

        if Utc::now() > expires_at {
            self.delete_session(token)?;
            anyhow::bail!("Session has expired");
        }

        Ok(user_id)
    }

    /// Delete a session (logout)
    pub fn delete_session(&self, token: &str) -> Result<()> {
        let conn = self.db.connection()?;
        let rows_affected = conn
            .execute("DELETE FROM sessions WHERE token = ?1", rusqlite::params![token])
            .context("Failed to delete session")?;

        if rows_affected > 0 {
            tracing::info!("Deleted session");
        }

        Ok(())
    }

    /// Clean up expired sessions from the database
    ///
    /// Returns the number of sessions deleted.
    pub fn cleanup_expired_sessions(&self) -> Result<usize> {
        let conn = self.db.connection()?;
        let now = format_timestamp(&Utc::now());

        let rows_affected = conn
            .execute("DELETE FROM sessions WHERE expires_at < ?1", rusqlite::params![now])
            .context("Failed to cleanup expired sessions")?;

        if rows_affected > 0 {
            tracing::info!("Cleaned up {} expired sessions", rows_affected);
        }

        Ok(rows_affected)
    }
}

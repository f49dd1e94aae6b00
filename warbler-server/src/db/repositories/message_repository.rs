use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{OptionalExtension, Row};

use warbler_types::{Message, MAX_MESSAGE_LENGTH};

use super::{format_timestamp, parse_timestamp};
use crate::db::DbPool;

/// Selects a message with its author and whether the viewer (`?1`, may be NULL) liked it
const MESSAGE_SELECT: &str =
    "SELECT m.id, m.text, m.timestamp, m.user_id, u.username, u.image_url,
            EXISTS(SELECT 1 FROM likes l WHERE l.message_id = m.id AND l.user_id = ?1) AS liked
     FROM messages m
     JOIN users u ON m.user_id = u.id";

pub(crate) fn message_from_row(row: &Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        text: row.get(1)?,
        timestamp: parse_timestamp(2, row.get(2)?)?,
        user_id: row.get(3)?,
        author_username: row.get(4)?,
        author_image_url: row.get(5)?,
        liked: row.get(6)?,
    })
}

pub struct MessageRepository {
    pool: DbPool,
}

impl MessageRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a new message stamped with the current time
    pub fn create(&self, user_id: i64, text: &str) -> Result<Message> {
        let text = text.trim();
        anyhow::ensure!(!text.is_empty(), "Message text cannot be empty");
        anyhow::ensure!(
            text.chars().count() <= MAX_MESSAGE_LENGTH,
            "Message text exceeds {} characters",
            MAX_MESSAGE_LENGTH
        );

        let timestamp = Utc::now();
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO messages (text, timestamp, user_id) VALUES (?, ?, ?)",
            (text, format_timestamp(&timestamp), user_id),
        )
        .context("Failed to create message")?;
        let id = conn.last_insert_rowid();
        drop(conn);

        tracing::debug!("User #{} posted message #{}", user_id, id);
        self.get_by_id(id, None)?
            .ok_or_else(|| anyhow::anyhow!("Message {} missing after insert", id))
    }

    /// Get a single message by ID
    pub fn get_by_id(&self, message_id: i64, viewer_id: Option<i64>) -> Result<Option<Message>> {
        let conn = self.pool.get()?;
        let message = conn
            .query_row(
                &format!("{} WHERE m.id = ?2", MESSAGE_SELECT),
                (viewer_id, message_id),
                message_from_row,
            )
            .optional()?;
        Ok(message)
    }

    /// Messages written by a user, newest first
    pub fn get_by_user(&self, user_id: i64, viewer_id: Option<i64>) -> Result<Vec<Message>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE m.user_id = ?2 ORDER BY m.timestamp DESC, m.id DESC",
            MESSAGE_SELECT
        ))?;

        let messages = stmt
            .query_map((viewer_id, user_id), message_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(messages)
    }

    /// Home timeline: newest messages by the user and everyone they follow
    pub fn get_timeline(&self, user_id: i64, limit: i64) -> Result<Vec<Message>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE m.user_id = ?1
                OR m.user_id IN (SELECT user_being_followed_id FROM follows WHERE user_following_id = ?1)
             ORDER BY m.timestamp DESC, m.id DESC
             LIMIT ?2",
            MESSAGE_SELECT
        ))?;

        let messages = stmt
            .query_map((user_id, limit), message_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(messages)
    }

    /// Delete a message only if `owner_id` wrote it; returns rows removed
    pub fn delete_owned(&self, message_id: i64, owner_id: i64) -> Result<usize> {
        let conn = self.pool.get()?;
        let rows = conn
            .execute(
                "DELETE FROM messages WHERE id = ? AND user_id = ?",
                (message_id, owner_id),
            )
            .context("Failed to delete message")?;
        Ok(rows)
    }

    /// Number of messages written by a user
    pub fn count_by_user(&self, user_id: i64) -> Result<usize> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM messages WHERE user_id = ?",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

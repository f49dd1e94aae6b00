use anyhow::{Context, Result};

use warbler_types::Message;

use super::message_repository::message_from_row;
use crate::db::DbPool;

pub struct LikeRepository {
    pool: DbPool,
}

impl LikeRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Check if a user has liked a message
    pub fn is_liked(&self, user_id: i64, message_id: i64) -> Result<bool> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM likes WHERE user_id = ? AND message_id = ?",
            (user_id, message_id),
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Like the message if not liked yet, otherwise remove the like
    ///
    /// Returns whether the message is liked afterwards.
    pub fn toggle_like(&self, user_id: i64, message_id: i64) -> Result<bool> {
        let conn = self.pool.get()?;
        let removed = conn
            .execute(
                "DELETE FROM likes WHERE user_id = ? AND message_id = ?",
                (user_id, message_id),
            )
            .context("Failed to remove like")?;

        if removed > 0 {
            return Ok(false);
        }

        conn.execute(
            "INSERT INTO likes (user_id, message_id) VALUES (?, ?)",
            (user_id, message_id),
        )
        .context("Failed to like message")?;
        Ok(true)
    }

    /// Messages a user has liked, newest first
    pub fn get_liked_messages(&self, user_id: i64) -> Result<Vec<Message>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT m.id, m.text, m.timestamp, m.user_id, u.username, u.image_url, 1 AS liked
             FROM likes l
             JOIN messages m ON m.id = l.message_id
             JOIN users u ON u.id = m.user_id
             WHERE l.user_id = ?
             ORDER BY m.timestamp DESC, m.id DESC",
        )?;

        let messages = stmt
            .query_map([user_id], message_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(messages)
    }

    /// Number of messages a user has liked
    pub fn count_by_user(&self, user_id: i64) -> Result<usize> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM likes WHERE user_id = ?",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

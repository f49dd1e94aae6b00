use anyhow::{Context, Result};

use warbler_types::{Follow, User};

use super::user_repository::user_from_row;
use crate::db::DbPool;

pub struct FollowRepository {
    pool: DbPool,
}

impl FollowRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Check if `follower_id` follows `followed_id`
    pub fn is_following(&self, follower_id: i64, followed_id: i64) -> Result<bool> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM follows WHERE user_following_id = ? AND user_being_followed_id = ?",
            (follower_id, followed_id),
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Check if `user_id` is followed by `other_id`
    pub fn is_followed_by(&self, user_id: i64, other_id: i64) -> Result<bool> {
        self.is_following(other_id, user_id)
    }

    /// Add the edge `follower_id -> followed_id`; following twice is a no-op
    pub fn follow_user(&self, follower_id: i64, followed_id: i64) -> Result<Follow> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT OR IGNORE INTO follows (user_being_followed_id, user_following_id) VALUES (?, ?)",
            (followed_id, follower_id),
        )
        .context("Failed to follow user")?;

        Ok(Follow {
            user_being_followed_id: followed_id,
            user_following_id: follower_id,
        })
    }

    /// Remove the edge `follower_id -> followed_id`; returns rows removed
    pub fn unfollow_user(&self, follower_id: i64, followed_id: i64) -> Result<usize> {
        let conn = self.pool.get()?;
        let rows_affected = conn
            .execute(
                "DELETE FROM follows WHERE user_following_id = ? AND user_being_followed_id = ?",
                (follower_id, followed_id),
            )
            .context("Failed to unfollow user")?;
        Ok(rows_affected)
    }

    /// Users that this user follows
    pub fn get_following(&self, user_id: i64) -> Result<Vec<User>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT u.id, u.email, u.username, u.password, u.image_url, u.header_image_url, u.bio, u.location
             FROM follows f
             JOIN users u ON u.id = f.user_being_followed_id
             WHERE f.user_following_id = ?
             ORDER BY u.username",
        )?;

        let following = stmt
            .query_map([user_id], user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(following)
    }

    /// Users that follow this user
    pub fn get_followers(&self, user_id: i64) -> Result<Vec<User>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT u.id, u.email, u.username, u.password, u.image_url, u.header_image_url, u.bio, u.location
             FROM follows f
             JOIN users u ON u.id = f.user_following_id
             WHERE f.user_being_followed_id = ?
             ORDER BY u.username",
        )?;

        let followers = stmt
            .query_map([user_id], user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(followers)
    }

    /// Ids of the users this user follows, for marking follow buttons in lists
    pub fn get_following_ids(&self, user_id: i64) -> Result<Vec<i64>> {
        let conn = self.pool.get()?;
        let mut stmt =
            conn.prepare("SELECT user_being_followed_id FROM follows WHERE user_following_id = ?")?;

        let ids = stmt
            .query_map([user_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ids)
    }

    /// Get follower count
    pub fn get_follower_count(&self, user_id: i64) -> Result<usize> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM follows WHERE user_being_followed_id = ?",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Get following count
    pub fn get_following_count(&self, user_id: i64) -> Result<usize> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM follows WHERE user_following_id = ?",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

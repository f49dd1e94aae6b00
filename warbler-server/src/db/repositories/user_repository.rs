use anyhow::{Context, Result};
use rusqlite::{ErrorCode, OptionalExtension, Row};

use warbler_types::{NewUser, User, DEFAULT_HEADER_IMAGE_URL, DEFAULT_IMAGE_URL};

use crate::auth::{hash_password, verify_password};
use crate::db::DbPool;

const USER_COLUMNS: &str =
    "id, email, username, password, image_url, header_image_url, bio, location";

/// Errors from creating or editing an account that callers report back to the user
#[derive(Debug, thiserror::Error)]
pub enum SignupError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("Username already taken")]
    UsernameTaken,
    #[error("Email already taken")]
    EmailTaken,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl SignupError {
    /// Translate a failed INSERT/UPDATE on `users`, keeping unrelated errors as internal
    fn from_write(err: rusqlite::Error, action: &'static str) -> Self {
        if let rusqlite::Error::SqliteFailure(code, Some(msg)) = &err {
            if code.code == ErrorCode::ConstraintViolation {
                if msg.contains("users.username") {
                    return SignupError::UsernameTaken;
                }
                if msg.contains("users.email") {
                    return SignupError::EmailTaken;
                }
            }
        }
        SignupError::Internal(anyhow::Error::new(err).context(action))
    }
}

/// Profile fields a user may change about themselves
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub username: String,
    pub email: String,
    pub image_url: Option<String>,
    pub header_image_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
}

pub struct UserRepository {
    pool: DbPool,
}

pub(crate) fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        username: row.get(2)?,
        password: row.get(3)?,
        image_url: row.get(4)?,
        header_image_url: row.get(5)?,
        bio: row.get(6)?,
        location: row.get(7)?,
    })
}

/// Treats absent and blank form values alike
fn required<'a>(value: &'a Option<String>, field: &'static str) -> Result<&'a str, SignupError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(SignupError::MissingField(field)),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl UserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Sign up a new user: hash the password and insert the row
    ///
    /// Fails with `MissingField` when username, email or password is absent,
    /// and with `UsernameTaken` / `EmailTaken` when the write hits a unique
    /// constraint.
    pub fn signup(&self, new_user: &NewUser) -> Result<User, SignupError> {
        let username = required(&new_user.username, "username")?;
        let email = required(&new_user.email, "email")?;
        // Passwords are taken verbatim; surrounding spaces are significant
        let password = match new_user.password.as_deref() {
            Some(p) if !p.is_empty() => p,
            _ => return Err(SignupError::MissingField("password")),
        };
        let image_url = non_blank(new_user.image_url.as_deref()).unwrap_or(DEFAULT_IMAGE_URL);

        let hashed = hash_password(password)?;

        let conn = self.pool.get().context("Failed to get database connection")?;
        conn.execute(
            "INSERT INTO users (email, username, password, image_url, header_image_url)
             VALUES (?, ?, ?, ?, ?)",
            (email, username, &hashed, image_url, DEFAULT_HEADER_IMAGE_URL),
        )
        .map_err(|e| SignupError::from_write(e, "Failed to create user"))?;

        let user = User {
            id: conn.last_insert_rowid(),
            email: email.to_string(),
            username: username.to_string(),
            password: hashed,
            image_url: image_url.to_string(),
            header_image_url: DEFAULT_HEADER_IMAGE_URL.to_string(),
            bio: None,
            location: None,
        };

        tracing::info!("Created user {}", user);
        Ok(user)
    }

    /// Find a user whose username and password both match
    ///
    /// An unknown username and a wrong password both yield `None`.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>> {
        let user = match self.get_by_username(username)? {
            Some(user) => user,
            None => return Ok(None),
        };

        if verify_password(password, &user.password) {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Get user by ID
    pub fn get_by_id(&self, user_id: i64) -> Result<Option<User>> {
        let conn = self.pool.get()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS),
                [user_id],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    /// Get user by username
    pub fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.pool.get()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE username = ?", USER_COLUMNS),
                [username],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    /// List users, optionally filtered by a case-insensitive username substring
    ///
    /// The filter runs here rather than in SQL: `LIKE` treats `%` and `_` as
    /// wildcards and SQLite's `lower()` only folds ASCII.
    pub fn search(&self, query: Option<&str>) -> Result<Vec<User>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM users ORDER BY username",
            USER_COLUMNS
        ))?;
        let users = stmt
            .query_map([], user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let users = match non_blank(query) {
            Some(q) => {
                let needle = q.to_lowercase();
                users
                    .into_iter()
                    .filter(|u| u.username.to_lowercase().contains(&needle))
                    .collect()
            }
            None => users,
        };

        Ok(users)
    }

    /// Update the editable profile fields of a user
    ///
    /// Blank image fields fall back to the defaults, blank bio and location
    /// are stored as NULL.
    pub fn update_profile(&self, user_id: i64, update: &UserUpdate) -> Result<User, SignupError> {
        let username = non_blank(Some(update.username.as_str())).ok_or(SignupError::MissingField("username"))?;
        let email = non_blank(Some(update.email.as_str())).ok_or(SignupError::MissingField("email"))?;
        let image_url = non_blank(update.image_url.as_deref()).unwrap_or(DEFAULT_IMAGE_URL);
        let header_image_url =
            non_blank(update.header_image_url.as_deref()).unwrap_or(DEFAULT_HEADER_IMAGE_URL);
        let bio = non_blank(update.bio.as_deref());
        let location = non_blank(update.location.as_deref());

        let conn = self.pool.get().context("Failed to get database connection")?;
        let rows = conn
            .execute(
                "UPDATE users
                 SET username = ?, email = ?, image_url = ?, header_image_url = ?, bio = ?, location = ?
                 WHERE id = ?",
                (username, email, image_url, header_image_url, bio, location, user_id),
            )
            .map_err(|e| SignupError::from_write(e, "Failed to update user"))?;
        drop(conn);

        if rows == 0 {
            return Err(SignupError::Internal(anyhow::anyhow!("User {} not found", user_id)));
        }

        let user = self
            .get_by_id(user_id)?
            .ok_or_else(|| anyhow::anyhow!("User {} vanished during update", user_id))?;
        tracing::info!("Updated profile of {}", user);
        Ok(user)
    }

    /// Delete a user; messages, follows, likes and sessions go with it
    pub fn delete(&self, user_id: i64) -> Result<usize> {
        let conn = self.pool.get()?;
        let rows = conn
            .execute("DELETE FROM users WHERE id = ?", [user_id])
            .context("Failed to delete user")?;
        if rows > 0 {
            tracing::info!("Deleted user #{}", user_id);
        }
        Ok(rows)
    }
}

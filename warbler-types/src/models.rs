use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Image shown for users who never set a profile picture
pub const DEFAULT_IMAGE_URL: &str = "/static/images/default-pic.svg";

/// Banner shown on profiles without a custom header image
pub const DEFAULT_HEADER_IMAGE_URL: &str = "/static/images/warbler-hero.svg";

/// Maximum length of a message, in characters
pub const MAX_MESSAGE_LENGTH: usize = 140;

// Custom serde module for DateTime to ensure RFC3339 string format
mod datetime_format {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.to_rfc3339())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<DateTime<Utc>>().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    /// Argon2 PHC string, never the plain password
    #[serde(skip_serializing, default)]
    pub password: String,
    pub image_url: String,
    pub header_image_url: String,
    pub bio: Option<String>,
    pub location: Option<String>,
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<User #{}: {}, {}>", self.id, self.username, self.email)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub text: String,
    #[serde(with = "datetime_format")]
    pub timestamp: DateTime<Utc>,
    pub user_id: i64,
    /// Author's username (joined in by the repository)
    #[serde(default)]
    pub author_username: String,
    /// Author's profile picture (joined in by the repository)
    #[serde(default)]
    pub author_image_url: String,
    /// Whether the viewing user has liked this message
    #[serde(default)]
    pub liked: bool,
}

/// Directed follow edge: `user_following_id` follows `user_being_followed_id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Follow {
    pub user_being_followed_id: i64,
    pub user_following_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub user_id: i64,
    pub message_id: i64,
}

/// Profile counters shown in the user header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub messages: usize,
    pub following: usize,
    pub followers: usize,
    pub likes: usize,
}

// Form payloads. Every field is optional or defaulted so a missing field
// reaches validation instead of being rejected by the extractor.

/// Signup input. Required fields are optional here so that a missing value
/// is reported by signup itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageForm {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserEditForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub header_image_url: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: 7,
            email: "test@test.com".to_string(),
            username: "testuser".to_string(),
            password: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
            image_url: DEFAULT_IMAGE_URL.to_string(),
            header_image_url: DEFAULT_HEADER_IMAGE_URL.to_string(),
            bio: None,
            location: None,
        }
    }

    #[test]
    fn test_user_display() {
        assert_eq!(sample_user().to_string(), "<User #7: testuser, test@test.com>");
    }

    #[test]
    fn test_user_serialization_hides_password() {
        let json = serde_json::to_value(sample_user()).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["username"], "testuser");
    }

    #[test]
    fn test_message_timestamp_is_rfc3339() {
        let timestamp = "2023-10-10T23:52:00+00:00".parse::<DateTime<Utc>>().unwrap();
        let message = Message {
            id: 1,
            text: "text".to_string(),
            timestamp,
            user_id: 7,
            author_username: String::new(),
            author_image_url: String::new(),
            liked: false,
        };

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["timestamp"], "2023-10-10T23:52:00+00:00");

        let back: Message = serde_json::from_value(json).unwrap();
        assert_eq!(back, message);
    }

    #[test]
    fn test_new_user_allows_missing_fields() {
        let new_user: NewUser = serde_json::from_str(r#"{"email": "a@b.com"}"#).unwrap();
        assert!(new_user.username.is_none());
        assert_eq!(new_user.email.as_deref(), Some("a@b.com"));
    }
}

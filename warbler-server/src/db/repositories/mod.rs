mod user_repository;
mod message_repository;
mod follow_repository;
mod like_repository;

pub use user_repository::{SignupError, UserRepository, UserUpdate};
pub use message_repository::MessageRepository;
pub use follow_repository::FollowRepository;
pub use like_repository::LikeRepository;

/// Timestamp format shared by every TEXT time column, sortable as a string
pub(crate) fn format_timestamp(ts: &chrono::DateTime<chrono::Utc>) -> String {
    ts.to_rfc3339_opts(chrono::SecondsFormat::Micros, false)
}

/// Maps a TEXT time column back into a `DateTime<Utc>` inside a row mapper
pub(crate) fn parse_timestamp(
    idx: usize,
    value: String,
) -> rusqlite::Result<chrono::DateTime<chrono::Utc>> {
    value.parse::<chrono::DateTime<chrono::Utc>>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

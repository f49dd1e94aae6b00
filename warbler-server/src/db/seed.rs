use anyhow::{Context, Result};

use super::repositories::{FollowRepository, MessageRepository, UserRepository};
use super::Database;
use warbler_types::NewUser;

/// Password shared by every sample account
pub const SAMPLE_PASSWORD: &str = "password";

const SAMPLE_USERS: &[(&str, &str)] = &[
    ("alice", "alice@example.com"),
    ("bob", "bob@example.com"),
    ("charlie", "charlie@example.com"),
    ("dana", "dana@example.com"),
];

const SAMPLE_MESSAGES: &[(&str, &str)] = &[
    ("alice", "Just set up my Warbler account!"),
    ("alice", "Anyone else up early watching the birds?"),
    ("bob", "Coffee first, then code."),
    ("charlie", "140 characters is plenty if you think before you type."),
    ("dana", "Hello from the other side of the timeline."),
    ("bob", "Shipping on a Friday. Wish me luck."),
];

/// (follower, followed)
const SAMPLE_FOLLOWS: &[(&str, &str)] = &[
    ("alice", "bob"),
    ("alice", "charlie"),
    ("bob", "alice"),
    ("charlie", "dana"),
    ("dana", "alice"),
];

/// Insert sample users, messages and follows for local development
///
/// Users that already exist are left untouched, so running this twice does
/// not duplicate anything. Returns the number of users created.
pub fn seed_sample_data(db: &Database) -> Result<usize> {
    let users = UserRepository::new(db.pool.clone());
    let messages = MessageRepository::new(db.pool.clone());
    let follows = FollowRepository::new(db.pool.clone());

    let mut created = 0;
    let mut ids = Vec::with_capacity(SAMPLE_USERS.len());

    for (username, email) in SAMPLE_USERS {
        if let Some(existing) = users.get_by_username(username)? {
            ids.push((*username, existing.id, false));
            continue;
        }

        let user = users
            .signup(&NewUser {
                username: Some(username.to_string()),
                email: Some(email.to_string()),
                password: Some(SAMPLE_PASSWORD.to_string()),
                image_url: None,
            })
            .with_context(|| format!("Failed to create sample user {}", username))?;
        ids.push((*username, user.id, true));
        created += 1;
    }

    let id_of = |name: &str| ids.iter().find(|(n, _, _)| *n == name).map(|(_, id, _)| *id);
    let is_new = |name: &str| ids.iter().any(|(n, _, new)| *n == name && *new);

    for (author, text) in SAMPLE_MESSAGES {
        if !is_new(author) {
            continue;
        }
        if let Some(user_id) = id_of(author) {
            messages.create(user_id, text)?;
        }
    }

    for (follower, followed) in SAMPLE_FOLLOWS {
        if let (Some(follower_id), Some(followed_id)) = (id_of(follower), id_of(followed)) {
            follows.follow_user(follower_id, followed_id)?;
        }
    }

    tracing::info!("Seeded {} sample users", created);
    Ok(created)
}

use axum::{extract::State, response::Html, Extension};

use super::{page_context, render, users::user_stats, ViewResult};
use crate::db::repositories::MessageRepository;
use crate::flash::Flashes;
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// Messages shown on the home timeline
pub const TIMELINE_LIMIT: i64 = 100;

/// GET / - Landing page for visitors, timeline for logged-in users
pub async fn homepage(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Extension(flashes): Extension<Flashes>,
) -> ViewResult<Html<String>> {
    let mut ctx = page_context(&current, &flashes);

    let Some(user) = current.user.as_ref() else {
        return render(&state, "home_anon.html", &ctx);
    };

    let messages = MessageRepository::new(state.db.pool.clone()).get_timeline(user.id, TIMELINE_LIMIT)?;
    ctx.insert("messages", &messages);
    ctx.insert("stats", &user_stats(&state, user.id)?);

    render(&state, "home.html", &ctx)
}

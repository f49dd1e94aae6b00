use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::flash::flash_middleware;
use crate::middleware::current_user_middleware;
use crate::state::AppState;
use crate::views::{self, auth, home, messages, users};

/// Build the full application: pages, static files and the middleware stack
pub fn build_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.static_dir);

    Router::new()
        // Health check
        .route("/health", get(views::health_check))
        // Home
        .route("/", get(home::homepage))
        // Authentication
        .route("/signup", get(auth::signup_form).post(auth::signup))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", post(auth::logout))
        // Users
        .route("/users", get(users::list_users))
        .route("/users/profile", get(users::edit_profile_form).post(users::edit_profile))
        .route("/users/delete", post(users::delete_user))
        .route("/users/follow/:id", post(users::follow))
        .route("/users/stop-following/:id", post(users::stop_following))
        .route("/users/:id", get(users::show_user))
        .route("/users/:id/following", get(users::show_following))
        .route("/users/:id/followers", get(users::show_followers))
        .route("/users/:id/likes", get(users::show_likes))
        // Messages
        .route("/messages/new", get(messages::new_message_form).post(messages::create_message))
        .route("/messages/:id", get(messages::show_message))
        .route("/messages/:id/delete", post(messages::delete_message))
        .route("/messages/:id/like", post(messages::like_message))
        .nest_service("/static", static_files)
        .fallback(views::not_found)
        .layer(middleware::from_fn_with_state(state.clone(), current_user_middleware))
        .layer(middleware::from_fn(flash_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

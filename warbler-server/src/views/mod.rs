//! Server-rendered pages and the form handlers behind them.
//!
//! Every handler receives the [`CurrentUser`] and pending [`Flashes`]
//! inserted by the middleware stack. Guarded handlers bounce anonymous
//! visitors with [`ViewError::Unauthorized`] before touching the database.

pub mod auth;
pub mod error;
pub mod home;
pub mod messages;
pub mod users;

pub use error::{ViewError, ViewResult};

use axum::{
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use tera::Context;

use crate::flash::Flashes;
use crate::middleware::CurrentUser;
use crate::state::AppState;
use warbler_types::User;

pub const UNAUTHORIZED_MESSAGE: &str = "Access unauthorized.";

/// 302 Found pointing at `to`
pub fn redirect(to: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, to.to_string())]).into_response()
}

/// The logged-in user, or the error that turns the visitor away
pub fn require_user(current: &CurrentUser) -> ViewResult<&User> {
    current.user.as_ref().ok_or(ViewError::Unauthorized)
}

/// Base context shared by every page: the viewer and their notices
pub fn page_context(current: &CurrentUser, flashes: &Flashes) -> Context {
    let mut ctx = Context::new();
    ctx.insert("current_user", &current.user);
    ctx.insert("flashes", flashes);
    ctx
}

pub fn render(state: &AppState, template: &str, ctx: &Context) -> ViewResult<Html<String>> {
    Ok(Html(state.templates.render(template, ctx)?))
}

/// Fallback for unmatched routes
pub async fn not_found() -> ViewError {
    ViewError::NotFound("The page you requested does not exist.".to_string())
}

pub async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_is_found() {
        let response = redirect("/users/1");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/users/1");
    }

    #[test]
    fn test_require_user_refuses_anonymous() {
        let response = require_user(&CurrentUser::anonymous())
            .unwrap_err()
            .into_response();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/");
        let flashes = response.extensions().get::<Flashes>().unwrap();
        assert_eq!(flashes.0[0].message, UNAUTHORIZED_MESSAGE);
    }
}

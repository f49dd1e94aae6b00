use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};

use crate::db::repositories::UserRepository;
use crate::state::AppState;
use warbler_types::User;

/// Cookie holding the login session token
pub const SESSION_COOKIE: &str = "warbler_session";

/// Header alternative to the cookie for non-browser clients
pub const SESSION_HEADER: &str = "X-Session-Token";

/// The logged-in user for this request, if any
///
/// Inserted into every request by [`current_user_middleware`].
#[derive(Clone, Debug, Default)]
pub struct CurrentUser {
    pub user: Option<User>,
    pub token: Option<String>,
}

impl CurrentUser {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn id(&self) -> Option<i64> {
        self.user.as_ref().map(|u| u.id)
    }
}

/// Find a cookie by name across all `Cookie` headers
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

/// Session token from the header, falling back to the cookie
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| read_cookie(headers, SESSION_COOKIE))
        .filter(|token| !token.is_empty())
}

/// `Set-Cookie` value that stores a session token in the browser
pub fn session_cookie(token: &str, secure: bool) -> HeaderValue {
    let mut cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, token);
    if secure {
        cookie.push_str("; Secure");
    }
    // Tokens are UUIDs, always valid header characters
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static(""))
}

/// `Set-Cookie` value that removes the session cookie
pub fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_static("warbler_session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Middleware to resolve the session token into the current user
///
/// Missing, unknown and expired tokens all leave the request anonymous.
pub async fn current_user_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let current = match session_token(request.headers()) {
        Some(token) => match get_user_from_token(&state, &token) {
            Ok(Some(user)) => CurrentUser {
                user: Some(user),
                token: Some(token),
            },
            Ok(None) => CurrentUser::anonymous(),
            Err(e) => {
                tracing::debug!("Ignoring session token: {}", e);
                CurrentUser::anonymous()
            }
        },
        None => CurrentUser::anonymous(),
    };

    request.extensions_mut().insert(current);

    next.run(request).await
}

fn get_user_from_token(state: &AppState, token: &str) -> anyhow::Result<Option<User>> {
    match state.get_authenticated_user_id_from_token(token) {
        Some(user_id) => UserRepository::new(state.db.pool.clone()).get_by_id(user_id),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_cookie() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("a=1; warbler_session=abc"));
        headers.append(header::COOKIE, HeaderValue::from_static("warbler_flash=info:hi"));

        assert_eq!(read_cookie(&headers, "a").as_deref(), Some("1"));
        assert_eq!(read_cookie(&headers, SESSION_COOKIE).as_deref(), Some("abc"));
        assert_eq!(read_cookie(&headers, "warbler_flash").as_deref(), Some("info:hi"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_session_token_prefers_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("warbler_session=from-cookie"));
        assert_eq!(session_token(&headers).as_deref(), Some("from-cookie"));

        headers.insert(SESSION_HEADER, HeaderValue::from_static("from-header"));
        assert_eq!(session_token(&headers).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_empty_session_cookie_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("warbler_session="));
        assert_eq!(session_token(&headers), None);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("tok", true);
        let cookie = cookie.to_str().unwrap();
        assert!(cookie.starts_with("warbler_session=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.ends_with("; Secure"));

        assert!(!session_cookie("tok", false).to_str().unwrap().contains("Secure"));
    }

    #[test]
    fn test_anonymous_context() {
        let current = CurrentUser::anonymous();
        assert!(!current.is_authenticated());
        assert_eq!(current.id(), None);
    }
}

//! One-shot notices carried across a redirect in the `warbler_flash` cookie.
//!
//! Handlers attach [`Flashes`] to a redirect response; [`flash_middleware`]
//! turns them into the cookie. On the next request the middleware hands the
//! decoded notices to the handler as a request extension. Any response that
//! is not itself a redirect consumes them and clears the cookie.

use axum::{
    extract::Request,
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};
use serde::Serialize;

use crate::middleware::read_cookie;
use crate::views::redirect;
use warbler_types::FlashCategory;

pub const FLASH_COOKIE: &str = "warbler_flash";

/// Notices kept across redirects that never render; the oldest are dropped
pub const MAX_PENDING: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flash {
    pub category: FlashCategory,
    pub message: String,
}

impl Flash {
    pub fn new(category: FlashCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }
}

/// Notices pending display; a request extension on the way in, a response
/// extension on the way out
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Flashes(pub Vec<Flash>);

impl Flashes {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Redirect to `to`, showing `message` on whichever page renders next
pub fn redirect_with_flash(to: &str, category: FlashCategory, message: impl Into<String>) -> Response {
    let mut response = redirect(to);
    response
        .extensions_mut()
        .insert(Flashes(vec![Flash::new(category, message)]));
    response
}

/// Cookie value: `category:urlencoded-message` entries joined by commas
pub fn encode(flashes: &[Flash]) -> String {
    flashes
        .iter()
        .map(|f| format!("{}:{}", f.category.as_str(), urlencoding::encode(&f.message)))
        .collect::<Vec<_>>()
        .join(",")
}

/// Inverse of [`encode`]; malformed entries are skipped
pub fn decode(value: &str) -> Vec<Flash> {
    value
        .split(',')
        .filter_map(|entry| {
            let (category, message) = entry.split_once(':')?;
            let category = FlashCategory::parse(category)?;
            let message = urlencoding::decode(message).ok()?;
            Some(Flash::new(category, message.into_owned()))
        })
        .collect()
}

/// Notices still unseen after a redirect, newest last, at most [`MAX_PENDING`]
pub fn carry_over(incoming: Vec<Flash>, outgoing: Vec<Flash>) -> Vec<Flash> {
    let mut pending: Vec<Flash> = incoming.into_iter().chain(outgoing).collect();
    let excess = pending.len().saturating_sub(MAX_PENDING);
    pending.drain(..excess);
    pending
}

fn flash_cookie(value: &str, clear: bool) -> Option<HeaderValue> {
    let cookie = if clear {
        format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", FLASH_COOKIE)
    } else {
        format!("{}={}; Path=/; HttpOnly; SameSite=Lax", FLASH_COOKIE, value)
    };
    HeaderValue::from_str(&cookie).ok()
}

/// Middleware moving flash notices between responses and the next request
pub async fn flash_middleware(mut request: Request, next: Next) -> Response {
    let incoming = read_cookie(request.headers(), FLASH_COOKIE)
        .map(|value| decode(&value))
        .unwrap_or_default();
    request.extensions_mut().insert(Flashes(incoming.clone()));

    let mut response = next.run(request).await;

    let outgoing = response
        .extensions_mut()
        .remove::<Flashes>()
        .unwrap_or_default();

    let header_value = if response.status().is_redirection() {
        // Nothing was shown yet, so older notices ride along with the new ones
        let pending = carry_over(incoming, outgoing.0);
        if pending.is_empty() {
            None
        } else {
            flash_cookie(&encode(&pending), false)
        }
    } else if !incoming.is_empty() {
        flash_cookie("", true)
    } else {
        None
    };

    if let Some(value) = header_value {
        response.headers_mut().append(header::SET_COOKIE, value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode() {
        let flashes = vec![
            Flash::new(FlashCategory::Success, "Hello, test_user!"),
            Flash::new(FlashCategory::Danger, "Access unauthorized."),
        ];

        let encoded = encode(&flashes);
        assert!(!encoded.contains(' '));
        assert!(encoded.starts_with("success:"));
        assert_eq!(decode(&encoded), flashes);
    }

    #[test]
    fn test_decode_skips_garbage() {
        let decoded = decode("nonsense,danger:Access%20unauthorized.,bogus:hi");
        assert_eq!(
            decoded,
            vec![Flash::new(FlashCategory::Danger, "Access unauthorized.")]
        );
        assert!(decode("").is_empty());
    }

    #[test]
    fn test_redirect_with_flash() {
        let response = redirect_with_flash("/", FlashCategory::Danger, "Access unauthorized.");
        assert!(response.status().is_redirection());
        assert_eq!(response.headers()[header::LOCATION], "/");

        let flashes = response.extensions().get::<Flashes>().unwrap();
        assert_eq!(flashes.0[0].message, "Access unauthorized.");
    }

    #[test]
    fn test_carry_over_keeps_newest() {
        let incoming: Vec<Flash> = (0..MAX_PENDING)
            .map(|i| Flash::new(FlashCategory::Info, format!("old {}", i)))
            .collect();
        let outgoing = vec![Flash::new(FlashCategory::Danger, "Access unauthorized.")];

        let pending = carry_over(incoming, outgoing);
        assert_eq!(pending.len(), MAX_PENDING);
        assert_eq!(pending[0].message, "old 1");
        assert_eq!(pending.last().unwrap().message, "Access unauthorized.");

        let short = carry_over(vec![Flash::new(FlashCategory::Info, "a")], Vec::new());
        assert_eq!(short.len(), 1);
    }
}

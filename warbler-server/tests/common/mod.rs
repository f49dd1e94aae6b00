//! In-process test client driving the router with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::collections::BTreeMap;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use tower::ServiceExt;

use warbler_server::{
    build_router, db::Database, middleware::SESSION_COOKIE, templates::Templates, AppState,
};
use warbler_types::{NewUser, User};

pub const TEST_PASSWORD: &str = "testuser";

/// A fresh in-memory app plus a browser-like cookie jar
pub struct TestApp {
    pub state: AppState,
    pub router: Router,
    pub cookies: BTreeMap<String, String>,
}

/// What came back from a request, body already read
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

impl TestApp {
    pub fn new() -> Self {
        let db = Database::in_memory().expect("Failed to create test database");
        db.initialize().expect("Failed to initialize database");
        let templates = Templates::new().expect("Failed to compile templates");
        let state = AppState::new(db, templates);
        let router = build_router(state.clone());
        Self {
            state,
            router,
            cookies: BTreeMap::new(),
        }
    }

    pub fn db(&self) -> &Database {
        &self.state.db
    }

    pub fn signup(&self, username: &str, email: &str) -> User {
        warbler_server::db::repositories::UserRepository::new(self.db().pool.clone())
            .signup(&NewUser {
                username: Some(username.to_string()),
                email: Some(email.to_string()),
                password: Some(TEST_PASSWORD.to_string()),
                image_url: None,
            })
            .expect("Failed to create test user")
    }

    /// Act as `user` from now on
    pub fn login_as(&mut self, user: &User) {
        let token = self
            .state
            .session_manager
            .create_session(user.id)
            .expect("Failed to create session");
        self.cookies.insert(SESSION_COOKIE.to_string(), token);
    }

    pub fn logout(&mut self) {
        self.cookies.remove(SESSION_COOKIE);
    }

    fn cookie_header(&self) -> String {
        self.cookies
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn store_cookies(&mut self, response: &Response) {
        for value in response.headers().get_all(header::SET_COOKIE) {
            let Ok(value) = value.to_str() else { continue };
            let pair = value.split(';').next().unwrap_or_default();
            let Some((name, cookie)) = pair.split_once('=') else { continue };
            if cookie.is_empty() || value.contains("Max-Age=0") {
                self.cookies.remove(name);
            } else {
                self.cookies.insert(name.to_string(), cookie.to_string());
            }
        }
    }

    pub async fn send(&mut self, method: Method, uri: &str, form: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if !self.cookies.is_empty() {
            builder = builder.header(header::COOKIE, self.cookie_header());
        }
        let body = match form {
            Some(form) => {
                builder = builder.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
                Body::from(form.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        self.store_cookies(&response);

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        TestResponse {
            status,
            location,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&mut self, uri: &str, form: &str) -> TestResponse {
        self.send(Method::POST, uri, Some(form)).await
    }

    /// Keep issuing GETs while the server answers with a redirect
    pub async fn follow(&mut self, mut response: TestResponse) -> TestResponse {
        for _ in 0..10 {
            match response.location.take() {
                Some(location) if response.status.is_redirection() => {
                    response = self.get(&location).await;
                }
                _ => return response,
            }
        }
        panic!("Too many redirects");
    }

    pub async fn post_and_follow(&mut self, uri: &str, form: &str) -> TestResponse {
        let response = self.post(uri, form).await;
        self.follow(response).await
    }

    pub async fn get_and_follow(&mut self, uri: &str) -> TestResponse {
        let response = self.get(uri).await;
        self.follow(response).await
    }
}

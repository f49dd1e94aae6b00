mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use warbler_server::db::repositories::{LikeRepository, MessageRepository};

fn message_count(app: &TestApp) -> i64 {
    app.db().count_rows("messages").unwrap()
}

#[tokio::test]
async fn test_add_message() {
    let mut app = TestApp::new();
    let user = app.signup("testuser", "test@test.com");
    app.login_as(&user);

    let resp = app.post("/messages/new", "text=Hello").await;
    assert_eq!(resp.status, StatusCode::FOUND);
    assert_eq!(resp.location.as_deref(), Some(format!("/users/{}", user.id).as_str()));

    let messages = MessageRepository::new(app.db().pool.clone())
        .get_by_user(user.id, None)
        .unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].text, "Hello");
    assert_eq!(messages[0].user_id, user.id);
}

#[tokio::test]
async fn test_add_message_logged_out() {
    let mut app = TestApp::new();
    app.signup("testuser", "test@test.com");

    let resp = app.post_and_follow("/messages/new", "text=Hello").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(!resp.body.contains("Hello"));
    assert!(resp.body.contains("Access unauthorized."));
    assert_eq!(message_count(&app), 0);
}

#[tokio::test]
async fn test_add_message_without_body() {
    let mut app = TestApp::new();
    let user = app.signup("testuser", "test@test.com");

    let resp = app.send(Method::POST, "/messages/new", None).await;
    assert_eq!(resp.status, StatusCode::FOUND);
    assert_eq!(resp.location.as_deref(), Some("/"));
    let resp = app.follow(resp).await;
    assert!(resp.body.contains("Access unauthorized."));

    app.login_as(&user);
    let resp = app.send(Method::POST, "/messages/new", None).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(resp.body.contains("<h1>400</h1>"));
    assert_eq!(message_count(&app), 0);
}

#[tokio::test]
async fn test_delete_non_numeric_id() {
    let mut app = TestApp::new();
    let user = app.signup("testuser", "test@test.com");

    let resp = app.post("/messages/abc/delete", "").await;
    assert_eq!(resp.location.as_deref(), Some("/"));

    app.login_as(&user);
    let resp = app.post("/messages/abc/delete", "").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_add_invalid_message_rerenders_form() {
    let mut app = TestApp::new();
    let user = app.signup("testuser", "test@test.com");
    app.login_as(&user);

    let resp = app.post("/messages/new", "text=").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("This field is required."));

    let long = "a".repeat(141);
    let resp = app.post("/messages/new", &format!("text={}", long)).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Field cannot be longer than 140 characters."));

    assert_eq!(message_count(&app), 0);
}

#[tokio::test]
async fn test_new_message_form_requires_login() {
    let mut app = TestApp::new();
    let resp = app.get("/messages/new").await;
    assert_eq!(resp.status, StatusCode::FOUND);
    assert_eq!(resp.location.as_deref(), Some("/"));

    let user = app.signup("testuser", "test@test.com");
    app.login_as(&user);
    let resp = app.get("/messages/new").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Add my message!"));
}

#[tokio::test]
async fn test_show_message() {
    let mut app = TestApp::new();
    let user = app.signup("testuser", "test@test.com");
    let message = MessageRepository::new(app.db().pool.clone())
        .create(user.id, "Test message")
        .unwrap();

    let resp = app.get(&format!("/messages/{}", message.id)).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Test message"));
    assert!(resp.body.contains("@testuser"));

    let resp = app.get("/messages/99999").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_message_logged_in() {
    let mut app = TestApp::new();
    let user = app.signup("testuser", "test@test.com");
    let repo = MessageRepository::new(app.db().pool.clone());
    let message = repo.create(user.id, "Test message").unwrap();
    app.login_as(&user);

    let resp = app.post(&format!("/messages/{}/delete", message.id), "").await;
    assert_eq!(resp.status, StatusCode::FOUND);
    let resp = app.follow(resp).await;
    assert_eq!(resp.status, StatusCode::OK);

    assert!(repo.get_by_id(message.id, None).unwrap().is_none());
}

#[tokio::test]
async fn test_delete_message_logged_out() {
    let mut app = TestApp::new();
    let user = app.signup("testuser", "test@test.com");
    let repo = MessageRepository::new(app.db().pool.clone());
    let message = repo.create(user.id, "Test message").unwrap();

    let resp = app
        .post_and_follow(&format!("/messages/{}/delete", message.id), "")
        .await;
    assert_eq!(resp.status, StatusCode::OK);

    assert_eq!(repo.get_by_id(message.id, None).unwrap(), Some(message));
}

#[tokio::test]
async fn test_delete_someone_elses_message() {
    let mut app = TestApp::new();
    let owner = app.signup("testuser", "test@test.com");
    let other = app.signup("other", "other@test.com");
    let repo = MessageRepository::new(app.db().pool.clone());
    let message = repo.create(owner.id, "Test message").unwrap();
    app.login_as(&other);

    let resp = app.post(&format!("/messages/{}/delete", message.id), "").await;
    assert_eq!(resp.status, StatusCode::FOUND);
    assert_eq!(resp.location.as_deref(), Some("/"));

    let resp = app.follow(resp).await;
    assert!(resp.body.contains("Access unauthorized."));
    assert!(repo.get_by_id(message.id, None).unwrap().is_some());
}

#[tokio::test]
async fn test_like_toggle() {
    let mut app = TestApp::new();
    let author = app.signup("testuser", "test@test.com");
    let fan = app.signup("fan", "fan@test.com");
    let message = MessageRepository::new(app.db().pool.clone())
        .create(author.id, "Like me")
        .unwrap();
    let likes = LikeRepository::new(app.db().pool.clone());
    app.login_as(&fan);

    let resp = app.post(&format!("/messages/{}/like", message.id), "").await;
    assert_eq!(resp.status, StatusCode::FOUND);
    assert!(likes.is_liked(fan.id, message.id).unwrap());

    app.post(&format!("/messages/{}/like", message.id), "").await;
    assert!(!likes.is_liked(fan.id, message.id).unwrap());
}

#[tokio::test]
async fn test_cannot_like_own_message() {
    let mut app = TestApp::new();
    let author = app.signup("testuser", "test@test.com");
    let message = MessageRepository::new(app.db().pool.clone())
        .create(author.id, "Me, me, me")
        .unwrap();
    app.login_as(&author);

    let resp = app.post(&format!("/messages/{}/like", message.id), "").await;
    assert_eq!(resp.location.as_deref(), Some("/"));
    assert_eq!(app.db().count_rows("likes").unwrap(), 0);
}

#[tokio::test]
async fn test_timeline_shows_followed_messages() {
    let mut app = TestApp::new();
    let user = app.signup("testuser", "test@test.com");
    let followed = app.signup("followed", "followed@test.com");
    let stranger = app.signup("stranger", "stranger@test.com");
    let repo = MessageRepository::new(app.db().pool.clone());
    repo.create(followed.id, "From someone I follow").unwrap();
    repo.create(stranger.id, "From a stranger").unwrap();
    app.login_as(&user);

    app.post(&format!("/users/follow/{}", followed.id), "").await;

    let resp = app.get("/").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("From someone I follow"));
    assert!(!resp.body.contains("From a stranger"));
}

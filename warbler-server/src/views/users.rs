use axum::{
    extract::{
        rejection::{FormRejection, PathRejection},
        Path, Query, State,
    },
    http::header,
    response::{Html, IntoResponse, Response},
    Extension, Form,
};
use tera::Context;

use super::{page_context, redirect, render, require_user, ViewError, ViewResult};
use crate::db::repositories::{
    FollowRepository, LikeRepository, MessageRepository, SignupError, UserRepository, UserUpdate,
};
use crate::flash::{redirect_with_flash, Flashes};
use crate::middleware::{clear_session_cookie, CurrentUser};
use crate::state::AppState;
use crate::validation::{validate_user_edit, FormErrors};
use warbler_types::{FlashCategory, SearchQuery, User, UserEditForm, UserStats};

/// Counters for the profile header
pub(crate) fn user_stats(state: &AppState, user_id: i64) -> anyhow::Result<UserStats> {
    let pool = state.db.pool.clone();
    let follows = FollowRepository::new(pool.clone());
    Ok(UserStats {
        messages: MessageRepository::new(pool.clone()).count_by_user(user_id)?,
        following: follows.get_following_count(user_id)?,
        followers: follows.get_follower_count(user_id)?,
        likes: LikeRepository::new(pool).count_by_user(user_id)?,
    })
}

fn find_user(state: &AppState, user_id: i64) -> ViewResult<User> {
    UserRepository::new(state.db.pool.clone())
        .get_by_id(user_id)?
        .ok_or_else(|| ViewError::NotFound(format!("No user with id {}", user_id)))
}

/// Context for pages built on the profile layout
fn profile_context(
    state: &AppState,
    current: &CurrentUser,
    flashes: &Flashes,
    user: &User,
) -> ViewResult<Context> {
    let mut ctx = page_context(current, flashes);
    let is_following = match current.id() {
        Some(viewer) => FollowRepository::new(state.db.pool.clone()).is_following(viewer, user.id)?,
        None => false,
    };
    ctx.insert("user", user);
    ctx.insert("stats", &user_stats(state, user.id)?);
    ctx.insert("is_following", &is_following);
    Ok(ctx)
}

fn own_following_page(user_id: i64) -> String {
    format!("/users/{}/following", user_id)
}

/// GET /users?q= - Everyone, or those whose username contains `q`
pub async fn list_users(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Extension(flashes): Extension<Flashes>,
    Query(query): Query<SearchQuery>,
) -> ViewResult<Html<String>> {
    let users = UserRepository::new(state.db.pool.clone()).search(query.q.as_deref())?;

    let mut ctx = page_context(&current, &flashes);
    ctx.insert("users", &users);
    ctx.insert("q", &query.q);
    render(&state, "users/index.html", &ctx)
}

/// GET /users/:id - Profile with the user's messages
pub async fn show_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Extension(flashes): Extension<Flashes>,
    path: Result<Path<i64>, PathRejection>,
) -> ViewResult<Html<String>> {
    let Path(user_id) = path?;
    let user = find_user(&state, user_id)?;
    let messages = MessageRepository::new(state.db.pool.clone()).get_by_user(user.id, current.id())?;

    let mut ctx = profile_context(&state, &current, &flashes, &user)?;
    ctx.insert("messages", &messages);
    render(&state, "users/show.html", &ctx)
}

/// GET /users/:id/following
pub async fn show_following(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Extension(flashes): Extension<Flashes>,
    path: Result<Path<i64>, PathRejection>,
) -> ViewResult<Html<String>> {
    require_user(&current)?;
    let Path(user_id) = path?;
    let user = find_user(&state, user_id)?;
    let following = FollowRepository::new(state.db.pool.clone()).get_following(user.id)?;

    let mut ctx = profile_context(&state, &current, &flashes, &user)?;
    ctx.insert("users", &following);
    render(&state, "users/following.html", &ctx)
}

/// GET /users/:id/followers
pub async fn show_followers(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Extension(flashes): Extension<Flashes>,
    path: Result<Path<i64>, PathRejection>,
) -> ViewResult<Html<String>> {
    let viewer = require_user(&current)?;
    let Path(user_id) = path?;
    let user = find_user(&state, user_id)?;

    let follows = FollowRepository::new(state.db.pool.clone());
    let followers = follows.get_followers(user.id)?;
    let followed_ids = follows.get_following_ids(viewer.id)?;

    let mut ctx = profile_context(&state, &current, &flashes, &user)?;
    ctx.insert("users", &followers);
    ctx.insert("followed_ids", &followed_ids);
    render(&state, "users/followers.html", &ctx)
}

/// GET /users/:id/likes
pub async fn show_likes(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Extension(flashes): Extension<Flashes>,
    path: Result<Path<i64>, PathRejection>,
) -> ViewResult<Html<String>> {
    require_user(&current)?;
    let Path(user_id) = path?;
    let user = find_user(&state, user_id)?;
    let messages = LikeRepository::new(state.db.pool.clone()).get_liked_messages(user.id)?;

    let mut ctx = profile_context(&state, &current, &flashes, &user)?;
    ctx.insert("messages", &messages);
    render(&state, "users/likes.html", &ctx)
}

/// POST /users/follow/:id
pub async fn follow(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    path: Result<Path<i64>, PathRejection>,
) -> ViewResult<Response> {
    let viewer = require_user(&current)?;
    let Path(followed_id) = path?;

    if followed_id == viewer.id {
        return Ok(redirect_with_flash(
            &own_following_page(viewer.id),
            FlashCategory::Danger,
            "You cannot follow yourself.",
        ));
    }

    let followed = find_user(&state, followed_id)?;
    FollowRepository::new(state.db.pool.clone()).follow_user(viewer.id, followed.id)?;
    tracing::debug!("{} now follows {}", viewer, followed);

    Ok(redirect(&own_following_page(viewer.id)))
}

/// POST /users/stop-following/:id
pub async fn stop_following(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    path: Result<Path<i64>, PathRejection>,
) -> ViewResult<Response> {
    let viewer = require_user(&current)?;
    let Path(followed_id) = path?;

    let followed = find_user(&state, followed_id)?;
    FollowRepository::new(state.db.pool.clone()).unfollow_user(viewer.id, followed.id)?;

    Ok(redirect(&own_following_page(viewer.id)))
}

fn render_edit(
    state: &AppState,
    current: &CurrentUser,
    flashes: &Flashes,
    form: &UserEditForm,
    errors: &FormErrors,
    error: Option<String>,
) -> ViewResult<Response> {
    let mut ctx = page_context(current, flashes);
    let form = UserEditForm {
        password: String::new(),
        ..form.clone()
    };
    ctx.insert("form", &form);
    ctx.insert("errors", errors);
    ctx.insert("error", &error);
    Ok(render(state, "users/edit.html", &ctx)?.into_response())
}

/// GET /users/profile - Edit form prefilled with the current profile
pub async fn edit_profile_form(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Extension(flashes): Extension<Flashes>,
) -> ViewResult<Response> {
    let user = require_user(&current)?;

    let form = UserEditForm {
        username: user.username.clone(),
        email: user.email.clone(),
        image_url: user.image_url.clone(),
        header_image_url: user.header_image_url.clone(),
        bio: user.bio.clone().unwrap_or_default(),
        location: user.location.clone().unwrap_or_default(),
        password: String::new(),
    };
    render_edit(&state, &current, &flashes, &form, &FormErrors::new(), None)
}

/// POST /users/profile - Apply the edit once the password checks out
pub async fn edit_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Extension(flashes): Extension<Flashes>,
    form: Result<Form<UserEditForm>, FormRejection>,
) -> ViewResult<Response> {
    let user = require_user(&current)?;
    let Form(form) = form?;

    let errors = validate_user_edit(&form);
    if !errors.is_empty() {
        return render_edit(&state, &current, &flashes, &form, &errors, None);
    }

    let repo = UserRepository::new(state.db.pool.clone());
    if repo.authenticate(&user.username, &form.password)?.is_none() {
        return Ok(redirect_with_flash(
            "/",
            FlashCategory::Danger,
            "Wrong password, please try again.",
        ));
    }

    let update = UserUpdate {
        username: form.username.clone(),
        email: form.email.clone(),
        image_url: Some(form.image_url.clone()),
        header_image_url: Some(form.header_image_url.clone()),
        bio: Some(form.bio.clone()),
        location: Some(form.location.clone()),
    };

    match repo.update_profile(user.id, &update) {
        Ok(updated) => Ok(redirect(&format!("/users/{}", updated.id))),
        Err(e @ (SignupError::UsernameTaken | SignupError::EmailTaken)) => {
            render_edit(&state, &current, &flashes, &form, &errors, Some(e.to_string()))
        }
        Err(SignupError::MissingField(field)) => {
            let mut errors = errors;
            errors.add(field, "This field is required.");
            render_edit(&state, &current, &flashes, &form, &errors, None)
        }
        Err(SignupError::Internal(e)) => Err(e.into()),
    }
}

/// POST /users/delete - Remove the account and everything it owns
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ViewResult<Response> {
    let user = require_user(&current)?;

    // Sessions cascade with the user row
    UserRepository::new(state.db.pool.clone()).delete(user.id)?;

    let mut response = redirect("/signup");
    response
        .headers_mut()
        .append(header::SET_COOKIE, clear_session_cookie());
    Ok(response)
}

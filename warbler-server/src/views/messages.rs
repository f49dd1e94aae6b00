use axum::{
    extract::{
        rejection::{FormRejection, PathRejection},
        Path, State,
    },
    response::{Html, IntoResponse, Response},
    Extension, Form,
};

use super::{page_context, redirect, render, require_user, ViewError, ViewResult};
use crate::db::repositories::{LikeRepository, MessageRepository};
use crate::flash::Flashes;
use crate::middleware::CurrentUser;
use crate::state::AppState;
use crate::validation::{validate_message, FormErrors};
use warbler_types::{Message, MessageForm};

fn find_message(state: &AppState, message_id: i64, viewer: Option<i64>) -> ViewResult<Message> {
    MessageRepository::new(state.db.pool.clone())
        .get_by_id(message_id, viewer)?
        .ok_or_else(|| ViewError::NotFound(format!("No message with id {}", message_id)))
}

fn render_new(
    state: &AppState,
    current: &CurrentUser,
    flashes: &Flashes,
    form: &MessageForm,
    errors: &FormErrors,
) -> ViewResult<Response> {
    let mut ctx = page_context(current, flashes);
    ctx.insert("form", form);
    ctx.insert("errors", errors);
    Ok(render(state, "messages/new.html", &ctx)?.into_response())
}

/// GET /messages/new
pub async fn new_message_form(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Extension(flashes): Extension<Flashes>,
) -> ViewResult<Response> {
    require_user(&current)?;
    render_new(&state, &current, &flashes, &MessageForm::default(), &FormErrors::new())
}

/// POST /messages/new - Post a message, then show the author's profile
pub async fn create_message(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Extension(flashes): Extension<Flashes>,
    form: Result<Form<MessageForm>, FormRejection>,
) -> ViewResult<Response> {
    let user = require_user(&current)?;
    let Form(form) = form?;

    let errors = validate_message(&form);
    if !errors.is_empty() {
        return render_new(&state, &current, &flashes, &form, &errors);
    }

    MessageRepository::new(state.db.pool.clone()).create(user.id, &form.text)?;
    Ok(redirect(&format!("/users/{}", user.id)))
}

/// GET /messages/:id
pub async fn show_message(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Extension(flashes): Extension<Flashes>,
    path: Result<Path<i64>, PathRejection>,
) -> ViewResult<Html<String>> {
    let Path(message_id) = path?;
    let message = find_message(&state, message_id, current.id())?;

    let mut ctx = page_context(&current, &flashes);
    ctx.insert("message", &message);
    render(&state, "messages/show.html", &ctx)
}

/// POST /messages/:id/delete - Only the author may delete
pub async fn delete_message(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    path: Result<Path<i64>, PathRejection>,
) -> ViewResult<Response> {
    let user = require_user(&current)?;
    let Path(message_id) = path?;
    let message = find_message(&state, message_id, None)?;

    if message.user_id != user.id {
        tracing::warn!("{} tried to delete message #{}", user, message.id);
        return Err(ViewError::Unauthorized);
    }

    MessageRepository::new(state.db.pool.clone()).delete_owned(message.id, user.id)?;
    Ok(redirect(&format!("/users/{}", user.id)))
}

/// POST /messages/:id/like - Toggle a like on someone else's message
pub async fn like_message(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    path: Result<Path<i64>, PathRejection>,
) -> ViewResult<Response> {
    let user = require_user(&current)?;
    let Path(message_id) = path?;
    let message = find_message(&state, message_id, None)?;

    if message.user_id == user.id {
        return Err(ViewError::Unauthorized);
    }

    let liked = LikeRepository::new(state.db.pool.clone()).toggle_like(user.id, message.id)?;
    tracing::debug!("{} liked message #{}: {}", user, message.id, liked);

    Ok(redirect("/"))
}

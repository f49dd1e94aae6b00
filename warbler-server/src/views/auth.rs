use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Extension, Form,
};

use super::{page_context, redirect, render, require_user, ViewResult};
use crate::db::repositories::{SignupError, UserRepository};
use crate::flash::{redirect_with_flash, Flashes};
use crate::middleware::{clear_session_cookie, session_cookie, CurrentUser};
use crate::state::AppState;
use crate::validation::{validate_login, validate_signup, FormErrors};
use warbler_types::{FlashCategory, LoginForm, NewUser, User};

/// Start a session for `user` and attach its cookie to `response`
fn log_in(state: &AppState, user: &User, mut response: Response) -> ViewResult<Response> {
    let token = state.session_manager.create_session(user.id)?;
    response
        .headers_mut()
        .append(header::SET_COOKIE, session_cookie(&token, state.secure_cookies));
    Ok(response)
}

fn render_signup(
    state: &AppState,
    current: &CurrentUser,
    flashes: &Flashes,
    form: &NewUser,
    errors: &FormErrors,
    error: Option<String>,
) -> ViewResult<Response> {
    let mut ctx = page_context(current, flashes);
    // Never echo the password back
    let form = NewUser {
        password: None,
        ..form.clone()
    };
    ctx.insert("form", &form);
    ctx.insert("errors", errors);
    ctx.insert("error", &error);
    Ok(render(state, "users/signup.html", &ctx)?.into_response())
}

/// GET /signup
pub async fn signup_form(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Extension(flashes): Extension<Flashes>,
) -> ViewResult<Response> {
    render_signup(&state, &current, &flashes, &NewUser::default(), &FormErrors::new(), None)
}

/// POST /signup - Create the account and log it in
pub async fn signup(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Extension(flashes): Extension<Flashes>,
    Form(form): Form<NewUser>,
) -> ViewResult<Response> {
    let errors = validate_signup(&form);
    if !errors.is_empty() {
        return render_signup(&state, &current, &flashes, &form, &errors, None);
    }

    let repo = UserRepository::new(state.db.pool.clone());
    match repo.signup(&form) {
        Ok(user) => {
            tracing::info!("Signed up {}", user);
            log_in(&state, &user, redirect("/"))
        }
        Err(e @ (SignupError::UsernameTaken | SignupError::EmailTaken)) => {
            render_signup(&state, &current, &flashes, &form, &errors, Some(e.to_string()))
        }
        Err(SignupError::MissingField(field)) => {
            let mut errors = errors;
            errors.add(field, "This field is required.");
            render_signup(&state, &current, &flashes, &form, &errors, None)
        }
        Err(SignupError::Internal(e)) => Err(e.into()),
    }
}

fn render_login(
    state: &AppState,
    current: &CurrentUser,
    flashes: &Flashes,
    username: &str,
    errors: &FormErrors,
    error: Option<&str>,
) -> ViewResult<Response> {
    let mut ctx = page_context(current, flashes);
    ctx.insert("form", &serde_json::json!({ "username": username }));
    ctx.insert("errors", errors);
    ctx.insert("error", &error);
    Ok(render(state, "users/login.html", &ctx)?.into_response())
}

/// GET /login
pub async fn login_form(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Extension(flashes): Extension<Flashes>,
) -> ViewResult<Response> {
    render_login(&state, &current, &flashes, "", &FormErrors::new(), None)
}

/// POST /login - Check credentials and greet the user
pub async fn login(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Extension(flashes): Extension<Flashes>,
    Form(form): Form<LoginForm>,
) -> ViewResult<Response> {
    let errors = validate_login(&form);
    if !errors.is_empty() {
        return render_login(&state, &current, &flashes, &form.username, &errors, None);
    }

    let repo = UserRepository::new(state.db.pool.clone());
    match repo.authenticate(form.username.trim(), &form.password)? {
        Some(user) => {
            let greeting = format!("Hello, {}!", user.username);
            log_in(&state, &user, redirect_with_flash("/", FlashCategory::Success, greeting))
        }
        None => {
            tracing::debug!("Failed login for {}", form.username);
            render_login(
                &state,
                &current,
                &flashes,
                &form.username,
                &errors,
                Some("Invalid credentials."),
            )
        }
    }
}

/// POST /logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ViewResult<Response> {
    require_user(&current)?;

    if let Some(token) = current.token.as_deref() {
        state.session_manager.delete_session(token)?;
    }

    let mut response =
        redirect_with_flash("/login", FlashCategory::Success, "You have been logged out.");
    response
        .headers_mut()
        .append(header::SET_COOKIE, clear_session_cookie());
    Ok(response)
}

use axum::{
    extract::rejection::{FormRejection, PathRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use super::UNAUTHORIZED_MESSAGE;
use crate::flash::redirect_with_flash;
use warbler_types::FlashCategory;

pub type ViewResult<T> = Result<T, ViewError>;

#[derive(Debug)]
pub enum ViewError {
    /// Not logged in, or not allowed; sends the visitor home with a notice
    Unauthorized,
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ViewError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ViewError::Unauthorized => {
                return redirect_with_flash("/", FlashCategory::Danger, UNAUTHORIZED_MESSAGE);
            }
            ViewError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ViewError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ViewError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        let title = status.canonical_reason().unwrap_or("Error");
        let body = format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <title>{title} | Warbler</title>
  <link rel="stylesheet" href="/static/stylesheets/style.css">
</head>
<body>
<main class="container error-page">
  <h1>{code}</h1>
  <h2>{title}</h2>
  <p>{detail}</p>
  <a href="/" class="btn btn-primary">Back home</a>
</main>
</body>
</html>
"#,
            code = status.as_u16(),
            title = title,
            detail = tera::escape_html(&detail),
        );

        (status, Html(body)).into_response()
    }
}

impl From<anyhow::Error> for ViewError {
    fn from(err: anyhow::Error) -> Self {
        ViewError::Internal(format!("{:#}", err))
    }
}

impl From<rusqlite::Error> for ViewError {
    fn from(err: rusqlite::Error) -> Self {
        ViewError::Internal(err.to_string())
    }
}

impl From<FormRejection> for ViewError {
    fn from(err: FormRejection) -> Self {
        ViewError::BadRequest(err.body_text())
    }
}

/// Ids that do not parse name nothing that exists
impl From<PathRejection> for ViewError {
    fn from(err: PathRejection) -> Self {
        ViewError::NotFound(err.body_text())
    }
}

impl From<tera::Error> for ViewError {
    fn from(err: tera::Error) -> Self {
        // Template errors nest the useful part in their source chain
        ViewError::Internal(format!("{:#}", anyhow::Error::new(err)))
    }
}

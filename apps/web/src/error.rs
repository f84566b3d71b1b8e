//! # Web Error Type
//!
//! The error every handler can fail with, and how each one turns into a
//! response.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in PharmaShelf                            │
//! │                                                                         │
//! │  Handler                                                                │
//! │  Result<Response, WebError>                                             │
//! │         │                                                               │
//! │         ├── no session user ────── LoginRequired ──► 303 /login         │
//! │         │                                                               │
//! │         ├── not an admin ───────── Forbidden ──────► 303 safe default   │
//! │         │                                                               │
//! │         ├── unknown id ─────────── NotFound ───────► 404 page           │
//! │         │                                                               │
//! │         ├── unparsable body ────── Form ───────────► axum's 415 / 422   │
//! │         │   (only after the access check)                               │
//! │         │                                                               │
//! │         └── DbError / tera / ... ─ Database, ... ──► log + 500 page     │
//! │                                                                         │
//! │  Form errors never get here: they are an Action::Rejected outcome,      │
//! │  not a failure.                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::rejection::FormRejection;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use pharma_db::DbError;
use tracing::{error, warn};

use crate::render::{NOT_FOUND_PAGE, SERVER_ERROR_PAGE};

/// Web layer errors.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("Login required")]
    LoginRequired,

    #[error("Admin role required")]
    Forbidden { redirect_to: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Bad form body: {0}")]
    Form(#[from] FormRejection),

    #[error("Database error: {0}")]
    Database(DbError),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for handlers.
pub type WebResult<T> = Result<T, WebError>;

impl WebError {
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        WebError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn forbidden(redirect_to: impl Into<String>) -> Self {
        WebError::Forbidden {
            redirect_to: redirect_to.into(),
        }
    }
}

/// Unknown ids keep their meaning; everything else from the database is a
/// server error.
impl From<DbError> for WebError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => WebError::NotFound { entity, id },
            other => WebError::Database(other),
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            WebError::LoginRequired => Redirect::to("/login").into_response(),
            WebError::Forbidden { redirect_to } => Redirect::to(&redirect_to).into_response(),
            WebError::NotFound { entity, id } => {
                warn!(entity = %entity, id = %id, "Not found");
                (StatusCode::NOT_FOUND, Html(NOT_FOUND_PAGE)).into_response()
            }
            WebError::Form(rejection) => {
                warn!(error = %rejection, "Rejected form body");
                rejection.into_response()
            }
            other => {
                error!(error = %other, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, Html(SERVER_ERROR_PAGE)).into_response()
            }
        }
    }
}

//! Static pages, the health check and the 404 fallback.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use crate::action::Action;
use crate::context::RequestContext;
use crate::error::WebResult;
use crate::render::{Page, NOT_FOUND_PAGE};
use crate::state::AppState;

pub async fn about(ctx: RequestContext) -> WebResult<Response> {
    ctx.require_user()?;
    ctx.respond(Action::Render(Page::new("about.html"))).await
}

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Response {
    if state.db.health_check().await {
        "OK".into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "database unavailable").into_response()
    }
}

pub async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Html(NOT_FOUND_PAGE)).into_response()
}

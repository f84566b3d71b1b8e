//! Category list and creation.

use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::response::Response;
use axum::Form;
use pharma_core::forms::CategoryForm;
use pharma_core::validation::parse_category;
use tracing::info;

use crate::action::Action;
use crate::context::RequestContext;
use crate::error::WebResult;
use crate::render::Page;
use crate::state::AppState;

pub async fn list(State(state): State<AppState>, ctx: RequestContext) -> WebResult<Response> {
    ctx.require_user()?;

    let categories = state.db.categories().list_all().await?;
    ctx.respond(Action::Render(Page::new("categories.html").with("categories", &categories)))
        .await
}

/// Creates a category. Success is silent: the new row shows up in the list.
pub async fn add(
    State(state): State<AppState>,
    ctx: RequestContext,
    form: Result<Form<CategoryForm>, FormRejection>,
) -> WebResult<Response> {
    ctx.require_user()?;
    let Form(form) = form?;

    let input = match parse_category(&form) {
        Ok(input) => input,
        Err(errors) => return ctx.respond(Action::rejected("/categories", errors)).await,
    };

    let category = state.db.categories().create(&input).await?;
    info!(category_id = %category.id, "Category created");

    ctx.respond(Action::redirect("/categories")).await
}

/// `GET /categories/add` has no page of its own.
pub async fn back_to_list(ctx: RequestContext) -> WebResult<Response> {
    ctx.require_user()?;
    ctx.respond(Action::redirect("/categories")).await
}

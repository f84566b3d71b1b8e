//! User management. Admins only; anyone else goes to `/drugs`.

use axum::extract::rejection::FormRejection;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Form;
use pharma_core::forms::UserUpdateForm;
use pharma_core::validation::parse_user_update;
use tracing::info;

use crate::action::Action;
use crate::context::RequestContext;
use crate::error::WebResult;
use crate::render::Page;
use crate::state::AppState;

const NOT_ADMIN_REDIRECT: &str = "/drugs";

pub async fn list(State(state): State<AppState>, ctx: RequestContext) -> WebResult<Response> {
    ctx.require_admin(NOT_ADMIN_REDIRECT)?;

    let users = state.db.users().list_all().await?;
    ctx.respond(Action::Render(Page::new("user_management.html").with("users", &users)))
        .await
}

/// Sets another user's role and active flag. An unchecked `is_active` box
/// disables the account.
pub async fn update(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(user_id): Path<i64>,
    form: Result<Form<UserUpdateForm>, FormRejection>,
) -> WebResult<Response> {
    let admin = ctx.require_admin(NOT_ADMIN_REDIRECT)?;
    let Form(form) = form?;

    let update = match parse_user_update(&form) {
        Ok(update) => update,
        Err(errors) => return ctx.respond(Action::rejected("/users", errors)).await,
    };

    state
        .db
        .users()
        .update_from_admin(user_id, update.role, update.is_active)
        .await?;
    info!(
        user_id = %user_id,
        role = %update.role,
        is_active = update.is_active,
        admin_id = %admin.id,
        "User updated by admin"
    );

    ctx.respond(Action::success("/users", "User updated successfully.")).await
}

pub async fn back_to_list(ctx: RequestContext) -> WebResult<Response> {
    ctx.require_admin(NOT_ADMIN_REDIRECT)?;
    ctx.respond(Action::redirect("/users")).await
}

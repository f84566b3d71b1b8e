//! # Profile
//!
//! One page, two forms, told apart by `form_type`:
//!
//! ```text
//! form_type=profile   name                                  → update name
//! form_type=password  current / new / confirm password      → verify current
//!                                                            → store new hash
//! ```
//!
//! Both go back to `/profile` without a success message.

use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::response::Response;
use axum::Form;
use pharma_core::forms::ProfileForm;
use pharma_core::validation::{parse_password_change, validate_profile_update};
use pharma_db::password::{hash_password, verify_password};
use tracing::info;

use crate::action::Action;
use crate::context::RequestContext;
use crate::error::WebResult;
use crate::render::Page;
use crate::state::AppState;

pub async fn page(ctx: RequestContext) -> WebResult<Response> {
    ctx.require_user()?;
    ctx.respond(Action::Render(Page::new("profile.html"))).await
}

pub async fn update(
    State(state): State<AppState>,
    ctx: RequestContext,
    form: Result<Form<ProfileForm>, FormRejection>,
) -> WebResult<Response> {
    let user = ctx.require_user()?;
    let Form(form) = form?;

    match form.form_type.as_str() {
        "profile" => {
            let errors = validate_profile_update(&form);
            if !errors.is_empty() {
                return ctx.respond(Action::rejected("/profile", errors)).await;
            }

            state.db.users().update_name(user.id, &form.name).await?;
            info!(user_id = %user.id, "Profile name updated");
            ctx.respond(Action::redirect("/profile")).await
        }
        "password" => {
            let change = match parse_password_change(&form) {
                Ok(change) => change,
                Err(errors) => return ctx.respond(Action::rejected("/profile", errors)).await,
            };

            if !verify_password(&change.current_password, &user.password_hash) {
                return ctx
                    .respond(Action::failure("/profile", "Current password is incorrect."))
                    .await;
            }

            let password_hash = hash_password(&change.new_password)?;
            state.db.users().update_password(user.id, &password_hash).await?;
            info!(user_id = %user.id, "Password changed");
            ctx.respond(Action::redirect("/profile")).await
        }
        // Unknown form: show the page again.
        _ => ctx.respond(Action::Render(Page::new("profile.html"))).await,
    }
}

//! Alternative-drug suggestions, managed from a drug's details page.

use axum::extract::rejection::FormRejection;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Form;
use pharma_core::forms::AlternativeForm;
use pharma_core::validation::parse_alternative;
use tracing::info;

use crate::action::Action;
use crate::context::RequestContext;
use crate::error::WebResult;
use crate::state::AppState;

/// Adds a suggestion. The main drug comes from the form's `drug_id`; the
/// path id only decides where to go back to.
pub async fn add(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(drug_id): Path<i64>,
    form: Result<Form<AlternativeForm>, FormRejection>,
) -> WebResult<Response> {
    ctx.require_user()?;
    let Form(form) = form?;
    let back_to = format!("/drugs/{}", drug_id);

    let input = match parse_alternative(&form) {
        Ok(input) => input,
        Err(errors) => return ctx.respond(Action::rejected(back_to, errors)).await,
    };

    let alternative = state.db.alternatives().create(&input).await?;
    info!(
        alternative_id = %alternative.id,
        drug_id = %input.drug_id,
        alternative_drug_id = %input.alternative_drug_id,
        "Alternative added"
    );

    ctx.respond(Action::success(back_to, "Alternative added successfully.")).await
}

pub async fn remove(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path((drug_id, alt_id)): Path<(i64, i64)>,
) -> WebResult<Response> {
    ctx.require_user()?;

    state.db.alternatives().delete(alt_id).await?;
    info!(alternative_id = %alt_id, "Alternative removed");

    ctx.respond(Action::success(
        format!("/drugs/{}", drug_id),
        "Alternative removed successfully.",
    ))
    .await
}

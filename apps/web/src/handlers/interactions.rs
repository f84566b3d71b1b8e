//! # Interaction Handlers
//!
//! ```text
//! GET /interactions/check                       → empty form
//! GET /interactions/check?drug_a_id=&drug_b_id= → empty form (nothing checked)
//! GET /interactions/check?drug_a_id=4&drug_b_id=9
//!       → between(4, 9): rows stored as (4, 9), else rows stored as (9, 4)
//! ```

use axum::extract::rejection::FormRejection;
use axum::extract::{Query, State};
use axum::response::Response;
use axum::Form;
use pharma_core::forms::{InteractionForm, InteractionQuery};
use pharma_core::validation::parse_interaction;
use pharma_core::DrugInteraction;
use tracing::info;

use crate::action::Action;
use crate::context::RequestContext;
use crate::error::WebResult;
use crate::render::Page;
use crate::state::AppState;

pub async fn checker(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(query): Query<InteractionQuery>,
) -> WebResult<Response> {
    ctx.require_user()?;

    let all_drugs = state.db.drugs().list_all().await?;

    let pair = query.pair();
    let (selected, interactions): ((i64, i64), Vec<DrugInteraction>) = match pair {
        Some((a, b)) => ((a, b), state.db.interactions().between(a, b).await?),
        None => ((0, 0), Vec::new()),
    };

    let page = Page::new("interaction_checker.html")
        .with("all_drugs", &all_drugs)
        .with("selected_drug_a_id", &selected.0)
        .with("selected_drug_b_id", &selected.1)
        .with("interactions", &interactions)
        .with("has_checked", &pair.is_some());

    ctx.respond(Action::Render(page)).await
}

pub async fn add_page(State(state): State<AppState>, ctx: RequestContext) -> WebResult<Response> {
    ctx.require_user()?;

    let all_drugs = state.db.drugs().list_all().await?;
    ctx.respond(Action::Render(Page::new("add_interaction.html").with("all_drugs", &all_drugs)))
        .await
}

/// Records an interaction and returns to the checker. Success is silent.
pub async fn add(
    State(state): State<AppState>,
    ctx: RequestContext,
    form: Result<Form<InteractionForm>, FormRejection>,
) -> WebResult<Response> {
    ctx.require_user()?;
    let Form(form) = form?;

    let input = match parse_interaction(&form) {
        Ok(input) => input,
        Err(errors) => return ctx.respond(Action::rejected("/interactions/add", errors)).await,
    };

    let interaction = state.db.interactions().create(&input).await?;
    info!(
        interaction_id = %interaction.id,
        severity = %interaction.severity,
        "Interaction recorded"
    );

    ctx.respond(Action::redirect("/interactions/check")).await
}

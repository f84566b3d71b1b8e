//! # Drug Handlers
//!
//! Listing, details, create/edit (admins only) and stock updates.
//!
//! ## Drug List
//! ```text
//! GET /drugs?q=para&category_id=2&in_stock_only=on&page=3
//!       │
//!       ├── DrugFilter::from(&query)
//!       ├── count_filtered(filter) ──► Pagination::new(total, page)
//!       │                              (page clamped into 1..=total_pages)
//!       └── filtered(filter, 5, offset)
//! ```

use axum::extract::rejection::FormRejection;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::Form;
use pharma_core::forms::{DrugFilter, DrugForm, DrugListQuery, StockUpdateForm};
use pharma_core::pagination::parse_page;
use pharma_core::validation::{parse_drug, parse_stock_update};
use pharma_core::Pagination;
use tracing::info;

use crate::action::Action;
use crate::context::RequestContext;
use crate::error::{WebError, WebResult};
use crate::notify::{absolute_url, notify_out_of_stock};
use crate::render::Page;
use crate::state::AppState;

fn details_path(id: i64) -> String {
    format!("/drugs/{}", id)
}

pub async fn list(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(query): Query<DrugListQuery>,
) -> WebResult<Response> {
    ctx.require_user()?;

    let filter = DrugFilter::from(&query);
    let total = state.db.drugs().count_filtered(&filter).await?;
    let pagination = Pagination::new(total, parse_page(query.page.as_deref()));
    let drugs = state
        .db
        .drugs()
        .filtered(&filter, pagination.limit(), pagination.offset)
        .await?;
    let categories = state.db.categories().list_all().await?;

    let page = Page::new("drugs.html")
        .with("drugs", &drugs)
        .with("categories", &categories)
        .with("search_query", query.q.as_deref().unwrap_or(""))
        .with("selected_category_id", &filter.category_id.unwrap_or(0))
        .with("in_stock_only", &filter.in_stock_only)
        .with("pagination", &pagination)
        .with("page_numbers", &pagination.page_numbers());

    ctx.respond(Action::Render(page)).await
}

pub async fn add_page(State(state): State<AppState>, ctx: RequestContext) -> WebResult<Response> {
    ctx.require_admin("/drugs")?;

    let categories = state.db.categories().list_all().await?;
    ctx.respond(Action::Render(Page::new("add_drug.html").with("categories", &categories)))
        .await
}

pub async fn add(
    State(state): State<AppState>,
    ctx: RequestContext,
    form: Result<Form<DrugForm>, FormRejection>,
) -> WebResult<Response> {
    let user = ctx.require_admin("/drugs")?;
    let Form(form) = form?;

    let input = match parse_drug(&form) {
        Ok(input) => input,
        Err(errors) => return ctx.respond(Action::rejected("/drugs/add", errors)).await,
    };

    let drug = state.db.drugs().create(&input, user.id).await?;
    info!(drug_id = %drug.id, user_id = %user.id, "Drug created");

    ctx.respond(Action::success("/drugs", "Drug created successfully.")).await
}

pub async fn details(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> WebResult<Response> {
    ctx.require_user()?;

    let drug = state
        .db
        .drugs()
        .get_by_id(id)
        .await?
        .ok_or_else(|| WebError::not_found("Drug", id))?;
    let alternatives = state.db.alternatives().for_drug(id).await?;
    let all_drugs = state.db.drugs().list_all().await?;

    let page = Page::new("drug_details.html")
        .with("selected_drug", &drug)
        .with("alternatives", &alternatives)
        .with("all_drugs", &all_drugs);

    ctx.respond(Action::Render(page)).await
}

pub async fn edit_page(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> WebResult<Response> {
    ctx.require_admin(details_path(id))?;

    let drug = state
        .db
        .drugs()
        .get_by_id(id)
        .await?
        .ok_or_else(|| WebError::not_found("Drug", id))?;
    let categories = state.db.categories().list_all().await?;

    let page = Page::new("edit_drug.html")
        .with("selected_drug", &drug)
        .with("categories", &categories);

    ctx.respond(Action::Render(page)).await
}

pub async fn edit(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
    form: Result<Form<DrugForm>, FormRejection>,
) -> WebResult<Response> {
    ctx.require_admin(details_path(id))?;
    let Form(form) = form?;

    let input = match parse_drug(&form) {
        Ok(input) => input,
        Err(errors) => {
            return ctx
                .respond(Action::rejected(format!("/drugs/{}/edit", id), errors))
                .await
        }
    };

    state.db.drugs().update_details(id, &input).await?;
    info!(drug_id = %id, "Drug updated");

    ctx.respond(Action::success(details_path(id), "Drug updated successfully.")).await
}

/// `GET` on the POST-only drug sub-routes goes back to the details page.
pub async fn back_to_details(ctx: RequestContext, Path(id): Path<i64>) -> WebResult<Response> {
    ctx.require_user()?;
    ctx.respond(Action::redirect(details_path(id))).await
}

/// Sets the stock level. Reaching exactly zero triggers the out-of-stock
/// email; its outcome never affects this response.
pub async fn update_stock(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
    headers: HeaderMap,
    form: Result<Form<StockUpdateForm>, FormRejection>,
) -> WebResult<Response> {
    ctx.require_user()?;
    let Form(form) = form?;

    let quantity = match parse_stock_update(&form) {
        Ok(quantity) => quantity,
        Err(errors) => return ctx.respond(Action::rejected(details_path(id), errors)).await,
    };

    let drug = state.db.drugs().update_stock(id, quantity).await?;
    info!(drug_id = %id, stock_quantity = %quantity, "Stock updated");

    if quantity == 0 {
        let app_url = absolute_url(&state.config, &headers, "/drugs");
        notify_out_of_stock(&state, &drug, &app_url).await;
    }

    ctx.respond(Action::success(details_path(id), "Stock value was updated successfully."))
        .await
}

//! Dashboard handler. Gathers the counts from the repositories and leaves the
//! arithmetic to [`Dashboard::build`].

use axum::extract::State;
use axum::response::Response;
use pharma_core::dashboard::Dashboard;
use pharma_core::LOW_STOCK_THRESHOLD;

use crate::action::Action;
use crate::context::RequestContext;
use crate::error::WebResult;
use crate::render::Page;
use crate::state::AppState;

pub async fn dashboard(State(state): State<AppState>, ctx: RequestContext) -> WebResult<Response> {
    let user = ctx.require_user()?;

    let stock = state.db.drugs().stock_summary().await?;
    let total_interactions = state.db.interactions().count().await?;
    let low_stock = state.db.drugs().low_stock(LOW_STOCK_THRESHOLD).await?;
    let categories_stats = state.db.categories().drug_counts().await?;

    // Account numbers are for admins only.
    let users = if user.is_admin() {
        Some(state.db.users().role_breakdown().await?)
    } else {
        None
    };

    let dashboard = Dashboard::build(stock, total_interactions, low_stock, categories_stats, users);

    ctx.respond(Action::Render(
        Page::new("dashboard.html")
            .with("dashboard", &dashboard)
            .with("low_stock_threshold", &LOW_STOCK_THRESHOLD),
    ))
    .await
}

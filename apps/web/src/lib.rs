//! # PharmaShelf Web
//!
//! Server-rendered pharmacy inventory app on axum.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        PharmaShelf Web                                  │
//! │                                                                         │
//! │  Browser ──► Router ──► session_middleware ──► handler                  │
//! │                                                   │                     │
//! │                  ┌────────────────────────────────┼──────────────┐      │
//! │                  ▼                                ▼              ▼      │
//! │            pharma-core                       pharma-db        notify    │
//! │        (validate, paginate,               (repositories)   (SendGrid)   │
//! │         dashboard numbers)                                              │
//! │                  │                                │                     │
//! │                  └──────────────► Action ◄────────┘                     │
//! │                                     │                                   │
//! │                                     ▼                                   │
//! │                       ctx.respond(): tera page or 303                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Routes
//! See [`app`]. Every route except login, signup, logout and `/health`
//! requires a logged-in user.

pub mod action;
pub mod config;
pub mod context;
pub mod error;
pub mod handlers;
pub mod notify;
pub mod render;
pub mod state;

use axum::middleware;
use axum::routing::{any, get};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::context::session_middleware;
use crate::handlers::{
    alternatives, auth, categories, dashboard, drugs, interactions, pages, profile, users,
};
use crate::state::AppState;

/// Builds the application router.
///
/// | Path | Methods |
/// |------|---------|
/// | `/`, `/login` | GET, POST |
/// | `/signup` | GET, POST |
/// | `/logout` | any |
/// | `/dashboard` | GET |
/// | `/drugs` | GET |
/// | `/drugs/add` | GET, POST (admin) |
/// | `/drugs/{id}` | GET |
/// | `/drugs/{id}/edit` | GET, POST (admin) |
/// | `/drugs/{id}/stock/update` | POST |
/// | `/drugs/{id}/alternatives/add` | POST |
/// | `/drugs/{id}/alternatives/{alt_id}/remove` | any |
/// | `/categories` | GET |
/// | `/categories/add` | POST |
/// | `/interactions/check` | GET |
/// | `/interactions/add` | GET, POST |
/// | `/users` | GET (admin) |
/// | `/users/{id}/update` | POST (admin) |
/// | `/profile` | GET, POST |
/// | `/about` | GET |
/// | `/health` | GET |
pub fn app(state: AppState) -> Router {
    Router::new()
        // Accounts
        .route("/", get(auth::login_page).post(auth::login))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route("/logout", any(auth::logout))
        // Dashboard
        .route("/dashboard", get(dashboard::dashboard))
        // Drugs
        .route("/drugs", get(drugs::list))
        .route("/drugs/add", get(drugs::add_page).post(drugs::add))
        .route("/drugs/{id}", get(drugs::details))
        .route("/drugs/{id}/edit", get(drugs::edit_page).post(drugs::edit))
        .route(
            "/drugs/{id}/stock/update",
            get(drugs::back_to_details).post(drugs::update_stock),
        )
        .route(
            "/drugs/{id}/alternatives/add",
            get(drugs::back_to_details).post(alternatives::add),
        )
        .route(
            "/drugs/{id}/alternatives/{alt_id}/remove",
            any(alternatives::remove),
        )
        // Categories
        .route("/categories", get(categories::list))
        .route(
            "/categories/add",
            get(categories::back_to_list).post(categories::add),
        )
        // Interactions
        .route("/interactions/check", get(interactions::checker))
        .route(
            "/interactions/add",
            get(interactions::add_page).post(interactions::add),
        )
        // Users
        .route("/users", get(users::list))
        .route("/users/{id}/update", get(users::back_to_list).post(users::update))
        // Profile & static pages
        .route("/profile", get(profile::page).post(profile::update))
        .route("/about", get(pages::about))
        .route("/health", get(pages::health))
        .fallback(pages::not_found)
        .layer(middleware::from_fn_with_state(
            state.sessions.clone(),
            session_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

//! # Handlers Module
//!
//! One async function per route. Every handler follows the same shape:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Handler Shape                                        │
//! │                                                                         │
//! │  async fn handler(State(state), ctx: RequestContext, ..extractors)      │
//! │      -> WebResult<Response>                                             │
//! │                                                                         │
//! │  1. ctx.require_user()? / ctx.require_admin(fallback)?                  │
//! │  2. let Form(form) = form?    → unparsable body → 415 / 422             │
//! │  3. parse_*(&form)            → Err(errors) → Action::Rejected          │
//! │  4. state.db.<repo>().<op>()? → unknown id  → 404                       │
//! │  5. ctx.respond(Action::...)                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Form bodies are taken as `Result<Form<T>, FormRejection>` so the access
//! check in step 1 runs before a bad body can answer.
//!
//! ## Modules
//! - [`auth`] - login, signup, logout
//! - [`dashboard`] - summary page
//! - [`drugs`] - list, details, add/edit, stock updates
//! - [`alternatives`] - suggestions on the details page
//! - [`categories`] - list and create
//! - [`interactions`] - checker and create
//! - [`users`] - admin user management
//! - [`profile`] - own name and password
//! - [`pages`] - about, health, 404

pub mod alternatives;
pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod drugs;
pub mod interactions;
pub mod pages;
pub mod profile;
pub mod users;

//! # Account Handlers
//!
//! Login, signup and logout.
//!
//! ```text
//! GET  /login   ── logged in? ──► 303 /dashboard
//! POST /login   ── unknown email / wrong password ──► "Invalid email or password."
//!               ── disabled account ──► "Your account is disabled. ..."
//!               ── ok ──► session moved to a fresh id, 303 /dashboard
//! POST /signup  ── validate_registration ──► argon2 hash ──► create ──► login
//! ANY  /logout  ── session removed ──► 303 /login
//! ```

use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::response::Response;
use axum::Form;
use pharma_core::forms::{LoginForm, RegistrationForm};
use pharma_core::validation::parse_registration;
use pharma_core::FieldErrors;
use pharma_db::password::{hash_password, verify_password};
use pharma_db::DbError;
use tracing::info;

use crate::action::Action;
use crate::context::RequestContext;
use crate::error::WebResult;
use crate::render::Page;
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid email or password.";
const ACCOUNT_DISABLED: &str = "Your account is disabled. Please contact the administrator.";

pub async fn login_page(ctx: RequestContext) -> WebResult<Response> {
    if ctx.user.is_some() {
        return ctx.respond(Action::redirect("/dashboard")).await;
    }
    ctx.respond(Action::Render(Page::new("login.html"))).await
}

pub async fn login(
    State(state): State<AppState>,
    mut ctx: RequestContext,
    form: Result<Form<LoginForm>, FormRejection>,
) -> WebResult<Response> {
    if ctx.user.is_some() {
        return ctx.respond(Action::redirect("/dashboard")).await;
    }

    let Form(form) = form?;

    let user = match state.db.users().get_by_email(&form.email).await? {
        Some(user) if verify_password(&form.password, &user.password_hash) => user,
        _ => return ctx.respond(Action::failure("/login", INVALID_CREDENTIALS)).await,
    };

    if !user.is_active {
        return ctx.respond(Action::failure("/login", ACCOUNT_DISABLED)).await;
    }

    ctx.login(user.id).await;
    info!(user_id = %user.id, "User logged in");
    ctx.respond(Action::redirect("/dashboard")).await
}

pub async fn signup_page(ctx: RequestContext) -> WebResult<Response> {
    if ctx.user.is_some() {
        return ctx.respond(Action::redirect("/dashboard")).await;
    }
    ctx.respond(Action::Render(Page::new("signup.html"))).await
}

pub async fn signup(
    State(state): State<AppState>,
    mut ctx: RequestContext,
    form: Result<Form<RegistrationForm>, FormRejection>,
) -> WebResult<Response> {
    if ctx.user.is_some() {
        return ctx.respond(Action::redirect("/dashboard")).await;
    }

    let Form(form) = form?;

    let email_taken = state.db.users().email_exists(&form.email).await?;
    let registration = match parse_registration(&form, email_taken) {
        Ok(registration) => registration,
        Err(errors) => return ctx.respond(Action::rejected("/signup", errors)).await,
    };

    let password_hash = hash_password(&registration.password)?;
    let created = state
        .db
        .users()
        .create(&registration.name, &registration.email, &password_hash)
        .await;

    let user = match created {
        Ok(user) => user,
        // Registered by a concurrent request between the check and the insert.
        Err(DbError::UniqueViolation { .. }) => {
            let mut errors = FieldErrors::new();
            errors.add("email", "This email is already registered.");
            return ctx.respond(Action::rejected("/signup", errors)).await;
        }
        Err(e) => return Err(e.into()),
    };

    ctx.login(user.id).await;
    info!(user_id = %user.id, "User registered");
    ctx.respond(Action::redirect("/dashboard")).await
}

pub async fn logout(ctx: RequestContext) -> WebResult<Response> {
    ctx.logout().await;
    ctx.respond(Action::redirect("/login")).await
}

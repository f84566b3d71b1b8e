//! # Request Context
//!
//! Session handling for every request, and the per-request view of it that
//! handlers receive.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Session → Handler → Response                         │
//! │                                                                         │
//! │  Cookie: pharma_sid=<uuid>                                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  session_middleware                                                     │
//! │  ├── known id?   yes → reuse it                                         │
//! │  │               no  → fresh UUID v4 (stored on first write)            │
//! │  └── SessionId into request extensions                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  RequestContext (extractor)                                             │
//! │  ├── session_id                                                         │
//! │  └── user: Option<User>   (loaded from the db; a deleted user is        │
//! │                            cleared from the session)                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  handler → Action → ctx.respond(action)                                 │
//! │       │             (login moved the session → SessionRotated)          │
//! │       ▼                                                                 │
//! │  session_middleware                                                     │
//! │  ├── SessionRotated(new id)       → Set-Cookie with the new id          │
//! │  └── fresh id that got written to → Set-Cookie with that id             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Logging in always lands on a new session id, so an id planted in a
//! browser before login never becomes an authenticated one.

use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Redirect, Response};
use cookie::{Cookie, SameSite};
use pharma_core::User;
use tracing::warn;
use uuid::Uuid;

use crate::action::Action;
use crate::error::{WebError, WebResult};
use crate::render::Templates;
use crate::state::{AppState, SessionStore};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "pharma_sid";

/// Session id of the current request, set by [`session_middleware`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionId(pub Uuid);

/// Response extension: the request's session moved to this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionRotated(pub Uuid);

// =============================================================================
// Middleware
// =============================================================================

/// Attaches a session id to every request and issues the cookie for new
/// or rotated sessions.
///
/// A fresh id is only stored once something is written to it (a login or a
/// flash message). Stored sessions are bounded by the store's
/// [`SessionLimits`](crate::state::SessionLimits).
pub async fn session_middleware(
    State(sessions): State<SessionStore>,
    mut request: Request,
    next: Next,
) -> Response {
    let known = match session_id_from(request.headers()) {
        Some(id) if sessions.exists(id).await => Some(id),
        _ => None,
    };
    let id = known.unwrap_or_else(Uuid::new_v4);

    request.extensions_mut().insert(SessionId(id));
    let mut response = next.run(request).await;

    let rotated = response.extensions().get::<SessionRotated>().map(|r| r.0);
    let issue = if rotated.is_some() {
        rotated
    } else if known.is_none() && sessions.exists(id).await {
        Some(id)
    } else {
        None
    };

    if let Some(id) = issue {
        match HeaderValue::from_str(&session_cookie(id).to_string()) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => warn!(error = %e, "Failed to build session cookie"),
        }
    }

    response
}

/// Reads the session id from the `Cookie` header(s).
fn session_id_from(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
}

fn session_cookie(id: Uuid) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id.to_string()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}

// =============================================================================
// Extractor
// =============================================================================

/// Everything a handler knows about who is asking.
///
/// ## Usage
/// ```rust,ignore
/// async fn add_drug(State(state): State<AppState>, ctx: RequestContext) -> WebResult<Response> {
///     let user = ctx.require_admin("/drugs")?;
///     ...
///     ctx.respond(Action::success("/drugs", "Drug created successfully.")).await
/// }
/// ```
pub struct RequestContext {
    pub session_id: Uuid,

    /// The logged-in user, if any.
    pub user: Option<User>,

    sessions: SessionStore,
    templates: Arc<Templates>,
    rotated: bool,
}

impl FromRequestParts<AppState> for RequestContext {
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session_id = parts
            .extensions
            .get::<SessionId>()
            .map(|id| id.0)
            .ok_or_else(|| WebError::Internal("session middleware not installed".to_string()))?;

        let user = match state.sessions.user_id(session_id).await {
            Some(user_id) => {
                let user = state.db.users().get_by_id(user_id).await?;
                if user.is_none() {
                    warn!(user_id = %user_id, "Session user no longer exists, logging out");
                    state.sessions.remove(session_id).await;
                }
                user
            }
            None => None,
        };

        Ok(RequestContext {
            session_id,
            user,
            sessions: state.sessions.clone(),
            templates: state.templates.clone(),
            rotated: false,
        })
    }
}

impl RequestContext {
    /// The logged-in user, or a redirect to `/login`.
    pub fn require_user(&self) -> WebResult<&User> {
        self.user.as_ref().ok_or(WebError::LoginRequired)
    }

    /// The logged-in admin. Anyone else logged in is sent to `fallback`.
    pub fn require_admin(&self, fallback: impl Into<String>) -> WebResult<&User> {
        let user = self.require_user()?;
        if user.is_admin() {
            Ok(user)
        } else {
            Err(WebError::forbidden(fallback))
        }
    }

    /// Logs `user_id` in on a fresh session id. The response carries the
    /// new cookie.
    pub async fn login(&mut self, user_id: i64) {
        self.session_id = self.sessions.rotate(self.session_id, user_id).await;
        self.rotated = true;
    }

    pub async fn logout(&self) {
        self.sessions.remove(self.session_id).await;
    }

    /// Turns a handler's [`Action`] into the response.
    ///
    /// Rendering consumes the pending flash messages; redirects queue new ones.
    pub async fn respond(&self, action: Action) -> WebResult<Response> {
        let flashes = action.flashes();

        let mut response = match action {
            Action::Render(mut page) => {
                let pending = self.sessions.take_flashes(self.session_id).await;
                page.context.insert("current_user", &self.user);
                page.context.insert("flashes", &pending);

                let html = self.templates.render(page.template, &page.context)?;
                Html(html).into_response()
            }
            Action::Redirect { to, .. } | Action::Rejected { back_to: to, .. } => {
                if !flashes.is_empty() {
                    self.sessions.push_flashes(self.session_id, flashes).await;
                }
                Redirect::to(&to).into_response()
            }
        };

        if self.rotated {
            response.extensions_mut().insert(SessionRotated(self.session_id));
        }
        Ok(response)
    }
}

//! # State Module
//!
//! Shared state handed to every handler through axum's `State` extractor.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                         AppState (Clone)                        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │          │              │              │              │                 │
//! │          ▼              ▼              ▼              ▼                 │
//! │  ┌────────────┐ ┌──────────────┐ ┌────────────┐ ┌──────────────┐       │
//! │  │  Database  │ │ SessionStore │ │ Templates  │ │   mailer     │       │
//! │  │  (SQLite   │ │ Arc<RwLock<  │ │ Arc<Tera>  │ │ Option<Arc<  │       │
//! │  │   pool)    │ │  HashMap>>   │ │            │ │  dyn Mail..>>│       │
//! │  └────────────┘ └──────────────┘ └────────────┘ └──────────────┘       │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • Database: internal connection pool (thread-safe)                    │
//! │  • SessionStore: tokio RwLock around the session map                   │
//! │  • Templates, AppConfig: read-only after startup                       │
//! │  • mailer: `None` when no provider key is configured                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod session;

use std::sync::Arc;

use pharma_db::Database;

use crate::config::AppConfig;
use crate::notify::MailTransport;
use crate::render::Templates;

pub use session::{Flash, FlashLevel, SessionLimits, SessionStore};

/// Everything a request handler can reach.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub sessions: SessionStore,
    pub templates: Arc<Templates>,
    /// Out-of-stock mail transport; `None` disables notifications.
    pub mailer: Option<Arc<dyn MailTransport>>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        db: Database,
        templates: Templates,
        mailer: Option<Arc<dyn MailTransport>>,
        config: AppConfig,
    ) -> Self {
        AppState {
            db,
            sessions: SessionStore::with_limits(config.session_limits()),
            templates: Arc::new(templates),
            mailer,
            config: Arc::new(config),
        }
    }
}

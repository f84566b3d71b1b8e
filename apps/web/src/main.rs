//! # PharmaShelf Web Server
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Server Startup                                    │
//! │                                                                         │
//! │  1. .env + logging ──── dotenvy, tracing-subscriber (RUST_LOG)          │
//! │  2. AppConfig::load ─── PHARMA_* / SENDGRID_API_KEY / APP_BASE_URL      │
//! │  3. Database ────────── SQLite (WAL), migrations applied                │
//! │  4. Templates ───────── every embedded template parsed up front         │
//! │  5. Mailer ──────────── SendGrid only when an API key is configured     │
//! │  6. axum::serve ─────── until Ctrl+C / SIGTERM                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use pharma_db::{Database, DbConfig};
use pharma_web::config::AppConfig;
use pharma_web::notify::{MailTransport, SendGridTransport};
use pharma_web::render::Templates;
use pharma_web::state::AppState;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine; the environment may already be set.
    let dotenv = dotenvy::dotenv();
    init_tracing();
    if let Ok(path) = dotenv {
        info!(path = %path.display(), "Loaded environment file");
    }

    info!("Starting PharmaShelf web server...");

    // Load configuration
    let config = AppConfig::load()?;
    info!(
        addr = %config.bind_addr,
        db_path = %config.database_path.display(),
        mail_enabled = config.mail_enabled(),
        "Configuration loaded"
    );

    // Connect to database (migrations run on connect)
    if let Some(parent) = config.database_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let db = Database::new(
        DbConfig::new(config.database_path.clone()).max_connections(config.db_max_connections),
    )
    .await?;
    info!("Database connected and migrations applied");

    let templates = Templates::new()?;

    let mailer: Option<Arc<dyn MailTransport>> = match &config.sendgrid_api_key {
        Some(key) => Some(Arc::new(SendGridTransport::new(key.clone())?)),
        None => {
            warn!("SENDGRID_API_KEY not set, out-of-stock emails are disabled");
            None
        }
    };

    let bind_addr = config.bind_addr;
    let state = AppState::new(db.clone(), templates, mailer, config);
    let app = pharma_web::app(state);

    let listener = TcpListener::bind(bind_addr).await?;
    info!(addr = %bind_addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=pharma_db=trace` - Show trace for the database crate only
/// - Default: `info,pharma=debug,sqlx=warn`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,pharma=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}

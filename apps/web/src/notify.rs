//! # Out-of-Stock Notification
//!
//! Emails every admin when a stock update takes a drug to zero.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update → Notification                          │
//! │                                                                         │
//! │  POST /drugs/{id}/stock/update   stock_quantity=0                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  drugs().update_stock(id, 0)                                            │
//! │       │                                                                 │
//! │       ├── no mailer configured (SENDGRID_API_KEY unset) ──► done        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  users().admin_emails()                                                 │
//! │       ├── none ──────────────────────────────────────────► done         │
//! │       ▼                                                                 │
//! │  render emails/out_of_stock.html { drug, app_url }                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  MailTransport::send  (one message, every admin in `to`)                │
//! │       │                                                                 │
//! │       └── any error ──► tracing::error!, swallowed                      │
//! │                                                                         │
//! │  The stock update and its success message never depend on the mail.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use async_trait::async_trait;
use axum::http::header::HOST;
use axum::http::HeaderMap;
use pharma_core::Drug;
use reqwest::Client;
use serde::Serialize;
use tera::Context;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::state::AppState;

/// SendGrid v3 send endpoint.
pub const SENDGRID_API_URL: &str = "https://api.sendgrid.com/v3/mail/send";

/// Timeout for one provider request.
const SEND_TIMEOUT: Duration = Duration::from_secs(30);

// =============================================================================
// Message & Transport
// =============================================================================

/// A message ready to hand to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub plain_text: String,
    pub html: String,
}

/// Mail delivery errors.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Mail provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Mail provider returned {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Failed to render email: {0}")]
    Template(#[from] tera::Error),

    #[error("Failed to look up recipients: {0}")]
    Recipients(#[from] pharma_db::DbError),
}

/// Something that can deliver an [`OutboundEmail`].
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailError>;
}

/// Delivers mail through the SendGrid v3 HTTP API.
pub struct SendGridTransport {
    api_key: String,
    client: Client,
}

impl SendGridTransport {
    pub fn new(api_key: impl Into<String>) -> Result<Self, MailError> {
        let client = Client::builder().timeout(SEND_TIMEOUT).build()?;

        Ok(SendGridTransport {
            api_key: api_key.into(),
            client,
        })
    }
}

#[derive(Debug, Serialize)]
struct SendGridAddress<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct SendGridPersonalization<'a> {
    to: Vec<SendGridAddress<'a>>,
}

#[derive(Debug, Serialize)]
struct SendGridContent<'a> {
    #[serde(rename = "type")]
    content_type: &'static str,
    value: &'a str,
}

#[derive(Debug, Serialize)]
struct SendGridRequest<'a> {
    personalizations: Vec<SendGridPersonalization<'a>>,
    from: SendGridAddress<'a>,
    subject: &'a str,
    content: Vec<SendGridContent<'a>>,
}

impl<'a> From<&'a OutboundEmail> for SendGridRequest<'a> {
    fn from(email: &'a OutboundEmail) -> Self {
        SendGridRequest {
            personalizations: vec![SendGridPersonalization {
                to: email.to.iter().map(|e| SendGridAddress { email: e }).collect(),
            }],
            from: SendGridAddress { email: &email.from },
            subject: &email.subject,
            // SendGrid requires text/plain before text/html.
            content: vec![
                SendGridContent {
                    content_type: "text/plain",
                    value: &email.plain_text,
                },
                SendGridContent {
                    content_type: "text/html",
                    value: &email.html,
                },
            ],
        }
    }
}

#[async_trait]
impl MailTransport for SendGridTransport {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailError> {
        let response = self
            .client
            .post(SENDGRID_API_URL)
            .bearer_auth(&self.api_key)
            .json(&SendGridRequest::from(email))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

// =============================================================================
// Trigger
// =============================================================================

/// Sends the out-of-stock email for `drug` if mail is configured and there is
/// at least one admin address. Failures are logged, never returned.
pub async fn notify_out_of_stock(state: &AppState, drug: &Drug, app_url: &str) {
    let Some(mailer) = state.mailer.as_deref() else {
        return;
    };

    match send_out_of_stock(state, mailer, drug, app_url).await {
        Ok(0) => {}
        Ok(recipients) => {
            info!(drug_id = %drug.id, recipients = recipients, "Out-of-stock email sent")
        }
        Err(e) => error!(drug_id = %drug.id, error = %e, "Failed to send out-of-stock email"),
    }
}

/// Returns the number of recipients mailed.
async fn send_out_of_stock(
    state: &AppState,
    mailer: &dyn MailTransport,
    drug: &Drug,
    app_url: &str,
) -> Result<usize, MailError> {
    let admin_emails = state.db.users().admin_emails().await?;
    if admin_emails.is_empty() {
        return Ok(0);
    }

    let mut context = Context::new();
    context.insert("drug", drug);
    context.insert("app_url", app_url);
    let html = state.templates.render("emails/out_of_stock.html", &context)?;

    let email = out_of_stock_email(&state.config, drug, admin_emails, html);
    let recipients = email.to.len();
    mailer.send(&email).await?;

    Ok(recipients)
}

/// Builds the message. Subject and plain text name the drug.
pub fn out_of_stock_email(config: &AppConfig, drug: &Drug, to: Vec<String>, html: String) -> OutboundEmail {
    OutboundEmail {
        from: config.default_from_email.clone(),
        to,
        subject: format!("Drug out of stock: {}", drug.name),
        plain_text: format!("The following drug is now out of stock: {}", drug.name),
        html,
    }
}

/// Absolute URL for `path`.
///
/// `APP_BASE_URL` wins when configured. Otherwise the request's `Host` header
/// is used, with the scheme from `X-Forwarded-Proto` (default `http`), and
/// the listen address as a last resort.
pub fn absolute_url(config: &AppConfig, headers: &HeaderMap, path: &str) -> String {
    if let Some(base) = &config.app_base_url {
        return format!("{}{}", base, path);
    }

    let host = headers
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| config.bind_addr.to_string());

    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("http");

    format!("{}://{}{}", scheme, host, path)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn config(base: Option<&str>) -> AppConfig {
        AppConfig::from_lookup(|key| match key {
            "PHARMA_DB_PATH" => Some("test.db".to_string()),
            "APP_BASE_URL" => base.map(str::to_string),
            _ => None,
        })
        .unwrap()
    }

    fn drug(name: &str) -> Drug {
        let now = chrono::Utc::now();
        Drug {
            id: 3,
            name: name.to_string(),
            active_ingredient: "Ibuprofen".to_string(),
            dosage_form: "Tablet".to_string(),
            indications: "Pain and inflammation".to_string(),
            side_effects: String::new(),
            stock_quantity: 0,
            created_by_id: 1,
            category_id: 1,
            category_name: "Analgesics".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_absolute_url_from_host() {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("shelf.local:8000"));
        assert_eq!(absolute_url(&config(None), &headers, "/drugs"), "http://shelf.local:8000/drugs");

        headers.insert("x-forwarded-proto", HeaderValue::from_static("https, http"));
        assert_eq!(absolute_url(&config(None), &headers, "/drugs"), "https://shelf.local:8000/drugs");
    }

    #[test]
    fn test_absolute_url_prefers_base_url() {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("internal:8000"));

        let url = absolute_url(&config(Some("https://shelf.example.com/")), &headers, "/drugs");
        assert_eq!(url, "https://shelf.example.com/drugs");
    }

    #[test]
    fn test_absolute_url_without_host() {
        assert_eq!(absolute_url(&config(None), &HeaderMap::new(), "/drugs"), "http://127.0.0.1:8000/drugs");
    }

    #[test]
    fn test_out_of_stock_email() {
        let email = out_of_stock_email(
            &config(None),
            &drug("Ibuprofen 400mg"),
            vec!["a@example.com".to_string(), "b@example.com".to_string()],
            "<p>html</p>".to_string(),
        );

        assert_eq!(email.from, "no-reply@pharmashelf.local");
        assert_eq!(email.subject, "Drug out of stock: Ibuprofen 400mg");
        assert_eq!(email.plain_text, "The following drug is now out of stock: Ibuprofen 400mg");
        assert_eq!(email.to.len(), 2);
    }

    #[test]
    fn test_sendgrid_payload() {
        let email = out_of_stock_email(
            &config(None),
            &drug("Aspirin"),
            vec!["admin@example.com".to_string()],
            "<p>Aspirin</p>".to_string(),
        );

        let payload = serde_json::to_value(SendGridRequest::from(&email)).unwrap();
        assert_eq!(payload["personalizations"][0]["to"][0]["email"], "admin@example.com");
        assert_eq!(payload["from"]["email"], "no-reply@pharmashelf.local");
        assert_eq!(payload["subject"], "Drug out of stock: Aspirin");
        assert_eq!(payload["content"][0]["type"], "text/plain");
        assert_eq!(payload["content"][1]["type"], "text/html");
        assert_eq!(payload["content"][1]["value"], "<p>Aspirin</p>");
    }
}

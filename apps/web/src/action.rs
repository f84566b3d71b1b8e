//! # Handler Outcomes
//!
//! A handler decides *what* happens; [`RequestContext::respond`] decides how
//! that becomes an HTTP response.
//!
//! ```text
//! Action::Render(page)              → 200, page rendered with pending flashes
//! Action::Redirect { to, flash }    → flash queued (if any), 303 to `to`
//! Action::Rejected { back_to, .. }  → one error flash per field, 303 back
//! ```
//!
//! [`RequestContext::respond`]: crate::context::RequestContext::respond

use pharma_core::FieldErrors;

use crate::render::Page;
use crate::state::Flash;

/// What a handler wants to happen.
#[derive(Debug)]
pub enum Action {
    /// Render a page.
    Render(Page),

    /// Redirect, optionally leaving a message for the next page.
    Redirect { to: String, flash: Option<Flash> },

    /// A form failed validation. Nothing was written.
    Rejected { back_to: String, errors: FieldErrors },
}

impl Action {
    /// Plain redirect, no message.
    pub fn redirect(to: impl Into<String>) -> Self {
        Action::Redirect {
            to: to.into(),
            flash: None,
        }
    }

    /// Redirect with a success message.
    pub fn success(to: impl Into<String>, text: impl Into<String>) -> Self {
        Action::Redirect {
            to: to.into(),
            flash: Some(Flash::success(text)),
        }
    }

    /// Redirect with an error message that isn't tied to a form field.
    pub fn failure(to: impl Into<String>, text: impl Into<String>) -> Self {
        Action::Redirect {
            to: to.into(),
            flash: Some(Flash::error(text)),
        }
    }

    pub fn rejected(back_to: impl Into<String>, errors: FieldErrors) -> Self {
        Action::Rejected {
            back_to: back_to.into(),
            errors,
        }
    }

    /// Messages this outcome leaves for the next rendered page.
    pub fn flashes(&self) -> Vec<Flash> {
        match self {
            Action::Render(_) => Vec::new(),
            Action::Redirect { flash, .. } => flash.iter().cloned().collect(),
            Action::Rejected { errors, .. } => errors.messages().map(Flash::error).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::FlashLevel;

    #[test]
    fn test_rejected_flashes_follow_field_order() {
        let mut errors = FieldErrors::new();
        errors.add("name", "Drug name is required.");
        errors.add("stock_quantity", "Stock quantity must be a number.");

        let flashes = Action::rejected("/drugs/add", errors).flashes();
        assert_eq!(
            flashes,
            vec![
                Flash::error("Drug name is required."),
                Flash::error("Stock quantity must be a number."),
            ]
        );
    }

    #[test]
    fn test_redirect_flashes() {
        assert!(Action::redirect("/login").flashes().is_empty());

        let flashes = Action::success("/drugs", "Drug created successfully.").flashes();
        assert_eq!(flashes.len(), 1);
        assert_eq!(flashes[0].level, FlashLevel::Success);

        let flashes = Action::failure("/login", "Invalid email or password.").flashes();
        assert_eq!(flashes[0].level, FlashLevel::Error);
    }
}

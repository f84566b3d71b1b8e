//! # Templates
//!
//! Every page and the notification email are tera templates compiled into the
//! binary with `include_str!` and registered once at startup.
//!
//! ## Layout
//! ```text
//! base.html ─────────┬── login.html, signup.html
//!   nav (if user)    ├── dashboard.html
//!   flash messages   ├── drugs.html, add_drug.html, edit_drug.html,
//!   {% block %}      │   drug_details.html
//!                    ├── categories.html
//!                    ├── interaction_checker.html, add_interaction.html
//!                    └── user_management.html, profile.html, about.html
//!
//! emails/out_of_stock.html   (standalone, no layout)
//! static/404.html, static/500.html   (plain HTML, no tera)
//! ```
//!
//! Autoescaping is on for every `.html` template.

use serde::Serialize;
use tera::{Context, Tera};

/// `(name, source)` of every embedded template. `base.html` must load with
/// the pages that extend it, which `add_raw_templates` takes care of.
const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("login.html", include_str!("../templates/login.html")),
    ("signup.html", include_str!("../templates/signup.html")),
    ("dashboard.html", include_str!("../templates/dashboard.html")),
    ("drugs.html", include_str!("../templates/drugs.html")),
    ("add_drug.html", include_str!("../templates/add_drug.html")),
    ("edit_drug.html", include_str!("../templates/edit_drug.html")),
    ("drug_details.html", include_str!("../templates/drug_details.html")),
    ("categories.html", include_str!("../templates/categories.html")),
    (
        "interaction_checker.html",
        include_str!("../templates/interaction_checker.html"),
    ),
    ("add_interaction.html", include_str!("../templates/add_interaction.html")),
    ("user_management.html", include_str!("../templates/user_management.html")),
    ("profile.html", include_str!("../templates/profile.html")),
    ("about.html", include_str!("../templates/about.html")),
    (
        "emails/out_of_stock.html",
        include_str!("../templates/emails/out_of_stock.html"),
    ),
];

/// Error pages. Plain HTML so they render without a session or a template
/// context.
pub const NOT_FOUND_PAGE: &str = include_str!("../templates/static/404.html");
pub const SERVER_ERROR_PAGE: &str = include_str!("../templates/static/500.html");

/// The compiled template set.
#[derive(Debug)]
pub struct Templates {
    tera: Tera,
}

impl Templates {
    /// Parses every embedded template.
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.iter().copied())?;
        Ok(Templates { tera })
    }

    pub fn render(&self, name: &str, context: &Context) -> Result<String, tera::Error> {
        self.tera.render(name, context)
    }
}

/// A page to render: template name plus its context.
///
/// ## Usage
/// ```rust,ignore
/// let page = Page::new("drugs.html")
///     .with("drugs", &drugs)
///     .with("pagination", &pagination);
/// ctx.respond(Action::Render(page)).await
/// ```
#[derive(Debug, Clone)]
pub struct Page {
    pub template: &'static str,
    pub context: Context,
}

impl Page {
    pub fn new(template: &'static str) -> Self {
        Page {
            template,
            context: Context::new(),
        }
    }

    /// Adds one value to the template context.
    pub fn with<T: Serialize + ?Sized>(mut self, key: &str, value: &T) -> Self {
        self.context.insert(key, value);
        self
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_templates_parse() {
        let templates = Templates::new().unwrap();
        let names: Vec<&str> = templates.tera.get_template_names().collect();
        for (name, _) in TEMPLATES {
            assert!(names.contains(name), "missing {}", name);
        }
    }

    #[test]
    fn test_html_is_escaped() {
        let templates = Templates::new().unwrap();
        let page = Page::new("login.html")
            .with("current_user", &Option::<()>::None)
            .with("flashes", &vec![serde_json::json!({"level": "error", "text": "<b>x</b>"})]);

        let html = templates.render(page.template, &page.context).unwrap();
        assert!(html.contains("&lt;b&gt;x&lt;&#x2F;b&gt;"));
        assert!(!html.contains("<b>x</b>"));
    }
}

//! End-to-end tests: the full router over an in-memory database, driven one
//! request at a time with `tower::ServiceExt::oneshot`.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use pharma_core::forms::{NewCategory, NewDrug};
use pharma_core::{Category, Drug, Role, User};
use pharma_db::password::hash_password;
use pharma_db::{Database, DbConfig};
use pharma_web::config::AppConfig;
use pharma_web::notify::{MailError, MailTransport, OutboundEmail};
use pharma_web::render::Templates;
use pharma_web::state::{AppState, SessionStore};
use tower::ServiceExt;

const PASSWORD: &str = "correct-horse";

// =============================================================================
// Harness
// =============================================================================

#[derive(Default)]
struct RecordingTransport {
    sent: Mutex<Vec<OutboundEmail>>,
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

struct TestApp {
    db: Database,
    router: Router,
    sessions: SessionStore,
    mails: Arc<RecordingTransport>,
}

/// A browser: remembers the session cookie between requests.
#[derive(Default)]
struct Client {
    cookie: Option<String>,
}

async fn test_app(with_mailer: bool) -> TestApp {
    test_app_with(with_mailer, &[]).await
}

/// Like [`test_app`], with extra environment settings.
async fn test_app_with(with_mailer: bool, env: &[(&str, &str)]) -> TestApp {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let env: Vec<(String, String)> = env.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    let config = AppConfig::from_lookup(|key| match key {
        "PHARMA_DB_PATH" => Some(":memory:".to_string()),
        "APP_BASE_URL" => Some("http://pharma.test/".to_string()),
        "DEFAULT_FROM_EMAIL" => Some("shelf@pharma.test".to_string()),
        _ => env.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone()),
    })
    .unwrap();

    let mails = Arc::new(RecordingTransport::default());
    let mailer: Option<Arc<dyn MailTransport>> = if with_mailer {
        Some(mails.clone())
    } else {
        None
    };

    let state = AppState::new(db.clone(), Templates::new().unwrap(), mailer, config);
    TestApp {
        db,
        sessions: state.sessions.clone(),
        router: pharma_web::app(state),
        mails,
    }
}

impl TestApp {
    async fn user(&self, email: &str, role: Option<Role>) -> User {
        let hash = hash_password(PASSWORD).unwrap();
        let user = self.db.users().create("Test User", email, &hash).await.unwrap();
        match role {
            Some(role) => self.db.users().update_from_admin(user.id, role, true).await.unwrap(),
            None => user,
        }
    }

    async fn category(&self, name: &str) -> Category {
        self.db
            .categories()
            .create(&NewCategory {
                name: name.to_string(),
                description: String::new(),
            })
            .await
            .unwrap()
    }

    async fn drug(&self, owner: &User, name: &str, stock: i64, category: &Category) -> Drug {
        let input = NewDrug {
            name: name.to_string(),
            active_ingredient: format!("{} base", name),
            dosage_form: "Tablet".to_string(),
            indications: "Pain".to_string(),
            side_effects: String::new(),
            stock_quantity: stock,
            category_id: category.id,
        };
        self.db.drugs().create(&input, owner.id).await.unwrap()
    }

    fn sent_mails(&self) -> Vec<OutboundEmail> {
        self.mails.sent.lock().unwrap().clone()
    }
}

impl Client {
    async fn send(&mut self, app: &TestApp, request: Request<Body>) -> Response<Body> {
        let response = app.router.clone().oneshot(request).await.unwrap();

        if let Some(value) = response.headers().get(header::SET_COOKIE) {
            let pair = value.to_str().unwrap().split(';').next().unwrap().to_string();
            self.cookie = Some(pair);
        }
        response
    }

    async fn get(&mut self, app: &TestApp, uri: &str) -> Response<Body> {
        let mut builder = Request::get(uri).header(header::HOST, "localhost");
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(app, builder.body(Body::empty()).unwrap()).await
    }

    async fn post(&mut self, app: &TestApp, uri: &str, form: &str) -> Response<Body> {
        self.post_as(app, uri, "application/x-www-form-urlencoded", form).await
    }

    async fn post_as(&mut self, app: &TestApp, uri: &str, content_type: &str, body: &str) -> Response<Body> {
        let mut builder = Request::post(uri)
            .header(header::HOST, "localhost")
            .header(header::CONTENT_TYPE, content_type);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(app, builder.body(Body::from(body.to_string())).unwrap()).await
    }

    async fn login(&mut self, app: &TestApp, email: &str) {
        let response = self
            .post(app, "/login", &format!("email={}&password={}", email, PASSWORD))
            .await;
        assert_eq!(location(&response), "/dashboard");
    }
}

fn location(response: &Response<Body>) -> &str {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    response.headers()[header::LOCATION].to_str().unwrap()
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// =============================================================================
// Accounts
// =============================================================================

#[tokio::test]
async fn test_anonymous_is_sent_to_login() {
    let app = test_app(false).await;
    let mut client = Client::default();

    for uri in ["/dashboard", "/drugs", "/categories", "/profile", "/users"] {
        let response = client.get(&app, uri).await;
        assert_eq!(location(&response), "/login", "{}", uri);
    }
}

#[tokio::test]
async fn test_signup_logs_in() {
    let app = test_app(false).await;
    let mut client = Client::default();

    let response = client
        .post(
            &app,
            "/signup",
            "name=Amina&email=amina@pharma.test&password=longenough&confirm_password=longenough",
        )
        .await;
    assert_eq!(location(&response), "/dashboard");
    assert!(client.cookie.is_some());

    let response = client.get(&app, "/dashboard").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Dashboard"));
    assert!(html.contains("Amina"));

    let user = app.db.users().get_by_email("amina@pharma.test").await.unwrap().unwrap();
    assert_eq!(user.role, None);
}

#[tokio::test]
async fn test_signup_errors_are_flashed() {
    let app = test_app(false).await;
    app.user("taken@pharma.test", None).await;
    let mut client = Client::default();

    let response = client
        .post(
            &app,
            "/signup",
            "name=A&email=taken@pharma.test&password=short&confirm_password=other",
        )
        .await;
    assert_eq!(location(&response), "/signup");

    let html = body_text(client.get(&app, "/signup").await).await;
    assert!(html.contains("Name must be at least 2 characters long."));
    assert!(html.contains("This email is already registered."));
    assert!(html.contains("Password must be at least 8 characters long."));
    assert!(html.contains("Password and confirmation do not match."));

    // Flashes are shown once.
    let html = body_text(client.get(&app, "/signup").await).await;
    assert!(!html.contains("This email is already registered."));
}

#[tokio::test]
async fn test_login_failures() {
    let app = test_app(false).await;
    let user = app.user("staff@pharma.test", Some(Role::Pharmacist)).await;
    let mut client = Client::default();

    let response = client
        .post(&app, "/login", "email=staff@pharma.test&password=wrong-password")
        .await;
    assert_eq!(location(&response), "/login");
    let html = body_text(client.get(&app, "/login").await).await;
    assert!(html.contains("Invalid email or password."));

    let response = client
        .post(&app, "/login", "email=nobody@pharma.test&password=whatever1")
        .await;
    assert_eq!(location(&response), "/login");

    app.db
        .users()
        .update_from_admin(user.id, Role::Pharmacist, false)
        .await
        .unwrap();
    let response = client
        .post(&app, "/login", &format!("email=staff@pharma.test&password={}", PASSWORD))
        .await;
    assert_eq!(location(&response), "/login");
    let html = body_text(client.get(&app, "/login").await).await;
    assert!(html.contains("Your account is disabled."));
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = test_app(false).await;
    app.user("staff@pharma.test", Some(Role::Pharmacist)).await;
    let mut client = Client::default();
    client.login(&app, "staff@pharma.test").await;

    let response = client.get(&app, "/logout").await;
    assert_eq!(location(&response), "/login");
    assert_eq!(app.sessions.len().await, 0);

    let response = client.get(&app, "/dashboard").await;
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_repeated_login_logout_keeps_store_flat() {
    let app = test_app(false).await;
    app.user("staff@pharma.test", Some(Role::Pharmacist)).await;
    let mut client = Client::default();

    for _ in 0..25 {
        client.login(&app, "staff@pharma.test").await;
        assert_eq!(app.sessions.len().await, 1);

        let response = client.get(&app, "/logout").await;
        assert_eq!(location(&response), "/login");
        assert_eq!(app.sessions.len().await, 0);
    }
}

#[tokio::test]
async fn test_cookieless_failed_logins_are_capped() {
    let app = test_app_with(false, &[("PHARMA_MAX_SESSIONS", "50")]).await;

    for _ in 0..200 {
        // a new client each time: no cookie is ever sent back
        let mut client = Client::default();
        let response = client
            .post(&app, "/login", "email=nobody@pharma.test&password=whatever1")
            .await;
        assert_eq!(location(&response), "/login");
        assert!(client.cookie.is_some());
    }

    assert_eq!(app.sessions.len().await, 50);
}

#[tokio::test]
async fn test_login_moves_session_to_new_id() {
    let app = test_app(false).await;
    app.user("staff@pharma.test", Some(Role::Pharmacist)).await;
    let mut client = Client::default();

    // a failed attempt stores a flash, so the browser holds an anonymous id
    client
        .post(&app, "/login", "email=staff@pharma.test&password=wrong-password")
        .await;
    let before_login = client.cookie.clone().unwrap();

    client.login(&app, "staff@pharma.test").await;
    let after_login = client.cookie.clone().unwrap();
    assert_ne!(before_login, after_login);

    let response = client.get(&app, "/dashboard").await;
    assert_eq!(response.status(), StatusCode::OK);

    // whoever kept the pre-login id is not logged in
    let mut planted = Client {
        cookie: Some(before_login),
    };
    let response = planted.get(&app, "/dashboard").await;
    assert_eq!(location(&response), "/login");
    assert_eq!(app.sessions.len().await, 1);
}

// =============================================================================
// Authorization
// =============================================================================

#[tokio::test]
async fn test_non_admin_cannot_manage() {
    let app = test_app(false).await;
    app.user("staff@pharma.test", Some(Role::Pharmacist)).await;
    let mut client = Client::default();
    client.login(&app, "staff@pharma.test").await;

    let response = client.get(&app, "/drugs/add").await;
    assert_eq!(location(&response), "/drugs");

    let response = client.get(&app, "/users").await;
    assert_eq!(location(&response), "/drugs");

    let response = client.post(&app, "/users/1/update", "role=admin&is_active=on").await;
    assert_eq!(location(&response), "/drugs");
}

#[tokio::test]
async fn test_bad_form_body_checks_login_first() {
    let app = test_app(false).await;
    app.user("admin@pharma.test", Some(Role::Admin)).await;

    let mut anonymous = Client::default();
    let response = anonymous
        .post_as(&app, "/drugs/add", "text/plain", "not a form")
        .await;
    assert_eq!(location(&response), "/login");

    let response = anonymous
        .post_as(&app, "/users/1/update", "application/json", "{}")
        .await;
    assert_eq!(location(&response), "/login");

    let mut admin = Client::default();
    admin.login(&app, "admin@pharma.test").await;
    let response = admin.post_as(&app, "/drugs/add", "text/plain", "not a form").await;
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_admin_updates_user() {
    let app = test_app(false).await;
    app.user("admin@pharma.test", Some(Role::Admin)).await;
    let staff = app.user("new@pharma.test", None).await;
    let mut client = Client::default();
    client.login(&app, "admin@pharma.test").await;

    let response = client
        .post(&app, &format!("/users/{}/update", staff.id), "role=pharmacist")
        .await;
    assert_eq!(location(&response), "/users");

    let updated = app.db.users().get_by_id(staff.id).await.unwrap().unwrap();
    assert_eq!(updated.role, Some(Role::Pharmacist));
    assert!(!updated.is_active);

    let html = body_text(client.get(&app, "/users").await).await;
    assert!(html.contains("User updated successfully."));
}

// =============================================================================
// Drugs
// =============================================================================

#[tokio::test]
async fn test_drug_list_filters_and_paginates() {
    let app = test_app(false).await;
    let admin = app.user("admin@pharma.test", Some(Role::Admin)).await;
    let analgesics = app.category("Analgesics").await;
    let antibiotics = app.category("Antibiotics").await;
    for i in 1..=7 {
        app.drug(&admin, &format!("Paracetamol {}", i), i, &analgesics).await;
    }
    app.drug(&admin, "Amoxicillin", 0, &antibiotics).await;

    let mut client = Client::default();
    client.login(&app, "admin@pharma.test").await;

    let html = body_text(client.get(&app, "/drugs?q=para").await).await;
    assert!(html.contains("7 drug(s) found."));
    assert!(html.contains("page=2"));
    assert!(!html.contains("Amoxicillin"));

    // Past the end: clamped to the last page, which holds 2 of the 7.
    let html = body_text(client.get(&app, "/drugs?q=para&page=99").await).await;
    assert!(html.contains("Paracetamol 6") || html.contains("Paracetamol 7"));

    let url = format!("/drugs?category_id={}&in_stock_only=on", antibiotics.id);
    let html = body_text(client.get(&app, &url).await).await;
    assert!(html.contains("0 drug(s) found."));

    // A bad category id is ignored rather than rejected.
    let html = body_text(client.get(&app, "/drugs?category_id=abc").await).await;
    assert!(html.contains("8 drug(s) found."));
}

#[tokio::test]
async fn test_admin_creates_drug() {
    let app = test_app(false).await;
    app.user("admin@pharma.test", Some(Role::Admin)).await;
    let category = app.category("Analgesics").await;
    let mut client = Client::default();
    client.login(&app, "admin@pharma.test").await;

    let form = format!(
        "name=Ibuprofen&active_ingredient=Ibuprofen&dosage_form=Tablet&indications=Pain&side_effects=&stock_quantity=12&category_id={}",
        category.id
    );
    let response = client.post(&app, "/drugs/add", &form).await;
    assert_eq!(location(&response), "/drugs");

    let html = body_text(client.get(&app, "/drugs").await).await;
    assert!(html.contains("Drug created successfully."));
    assert!(html.contains("Ibuprofen"));
}

#[tokio::test]
async fn test_invalid_drug_is_rejected() {
    let app = test_app(false).await;
    app.user("admin@pharma.test", Some(Role::Admin)).await;
    let mut client = Client::default();
    client.login(&app, "admin@pharma.test").await;

    let response = client
        .post(&app, "/drugs/add", "name=X&stock_quantity=-3&category_id=")
        .await;
    assert_eq!(location(&response), "/drugs/add");

    let html = body_text(client.get(&app, "/drugs/add").await).await;
    assert!(html.contains("Stock quantity cannot be negative."));
    assert_eq!(app.db.drugs().count_filtered(&Default::default()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_unknown_drug_is_404() {
    let app = test_app(false).await;
    app.user("staff@pharma.test", Some(Role::Pharmacist)).await;
    let mut client = Client::default();
    client.login(&app, "staff@pharma.test").await;

    let response = client.get(&app, "/drugs/9999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client.get(&app, "/no/such/page").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Stock & Notification
// =============================================================================

#[tokio::test]
async fn test_stock_to_zero_emails_admins() {
    let app = test_app(true).await;
    let admin = app.user("admin@pharma.test", Some(Role::Admin)).await;
    app.user("staff@pharma.test", Some(Role::Pharmacist)).await;
    let category = app.category("Analgesics").await;
    let drug = app.drug(&admin, "Paracetamol", 3, &category).await;

    let mut client = Client::default();
    client.login(&app, "staff@pharma.test").await;

    let uri = format!("/drugs/{}/stock/update", drug.id);
    let response = client.post(&app, &uri, "stock_quantity=2").await;
    assert_eq!(location(&response), format!("/drugs/{}", drug.id));
    assert!(app.sent_mails().is_empty());

    let response = client.post(&app, &uri, "stock_quantity=0").await;
    assert_eq!(location(&response), format!("/drugs/{}", drug.id));

    let mails = app.sent_mails();
    assert_eq!(mails.len(), 1);
    assert_eq!(mails[0].to, vec!["admin@pharma.test".to_string()]);
    assert_eq!(mails[0].from, "shelf@pharma.test");
    assert!(mails[0].subject.contains("Paracetamol"));
    assert!(mails[0].plain_text.contains("Paracetamol"));
    // Autoescaped in the HTML body.
    assert!(mails[0].html.contains("http:&#x2F;&#x2F;pharma.test&#x2F;drugs"));

    let html = body_text(client.get(&app, &format!("/drugs/{}", drug.id)).await).await;
    assert!(html.contains("Stock value was updated successfully."));
    assert!(html.contains("Out of stock"));
}

#[tokio::test]
async fn test_stock_update_without_mailer() {
    let app = test_app(false).await;
    let admin = app.user("admin@pharma.test", Some(Role::Admin)).await;
    let category = app.category("Analgesics").await;
    let drug = app.drug(&admin, "Paracetamol", 3, &category).await;

    let mut client = Client::default();
    client.login(&app, "admin@pharma.test").await;

    let response = client
        .post(&app, &format!("/drugs/{}/stock/update", drug.id), "stock_quantity=0")
        .await;
    assert_eq!(location(&response), format!("/drugs/{}", drug.id));

    assert!(app.sent_mails().is_empty());
    let stored = app.db.drugs().get_by_id(drug.id).await.unwrap().unwrap();
    assert_eq!(stored.stock_quantity, 0);
}

#[tokio::test]
async fn test_invalid_stock_value() {
    let app = test_app(true).await;
    let admin = app.user("admin@pharma.test", Some(Role::Admin)).await;
    let category = app.category("Analgesics").await;
    let drug = app.drug(&admin, "Paracetamol", 3, &category).await;

    let mut client = Client::default();
    client.login(&app, "admin@pharma.test").await;

    let response = client
        .post(&app, &format!("/drugs/{}/stock/update", drug.id), "stock_quantity=lots")
        .await;
    assert_eq!(location(&response), format!("/drugs/{}", drug.id));

    let html = body_text(client.get(&app, &format!("/drugs/{}", drug.id)).await).await;
    assert!(html.contains("Stock quantity must be a number."));
    assert!(app.sent_mails().is_empty());
}

// =============================================================================
// Interactions & Alternatives
// =============================================================================

#[tokio::test]
async fn test_interaction_checker() {
    let app = test_app(false).await;
    let admin = app.user("admin@pharma.test", Some(Role::Admin)).await;
    let category = app.category("General").await;
    let warfarin = app.drug(&admin, "Warfarin", 10, &category).await;
    let aspirin = app.drug(&admin, "Aspirin", 10, &category).await;

    let mut client = Client::default();
    client.login(&app, "admin@pharma.test").await;

    let form = format!(
        "drug_a_id={}&drug_b_id={}&severity=Severe&description=Bleeding+risk",
        warfarin.id, aspirin.id
    );
    let response = client.post(&app, "/interactions/add", &form).await;
    assert_eq!(location(&response), "/interactions/check");

    // Either order finds it.
    let url = format!("/interactions/check?drug_a_id={}&drug_b_id={}", aspirin.id, warfarin.id);
    let html = body_text(client.get(&app, &url).await).await;
    assert!(html.contains("Bleeding risk"));

    let html = body_text(client.get(&app, "/interactions/check?drug_a_id=&drug_b_id=").await).await;
    assert!(!html.contains("No known interaction"));

    let same = format!("drug_a_id={}&drug_b_id={}&severity=Mild&description=x", aspirin.id, aspirin.id);
    let response = client.post(&app, "/interactions/add", &same).await;
    assert_eq!(location(&response), "/interactions/add");
}

#[tokio::test]
async fn test_alternatives_add_and_remove() {
    let app = test_app(false).await;
    let admin = app.user("admin@pharma.test", Some(Role::Admin)).await;
    let category = app.category("Analgesics").await;
    let main = app.drug(&admin, "Paracetamol", 0, &category).await;
    let other = app.drug(&admin, "Ibuprofen", 20, &category).await;

    let mut client = Client::default();
    client.login(&app, "admin@pharma.test").await;

    let form = format!("drug_id={}&alternative_drug_id={}&note=Same+use", main.id, other.id);
    let response = client
        .post(&app, &format!("/drugs/{}/alternatives/add", main.id), &form)
        .await;
    assert_eq!(location(&response), format!("/drugs/{}", main.id));

    let alternatives = app.db.alternatives().for_drug(main.id).await.unwrap();
    assert_eq!(alternatives.len(), 1);
    assert_eq!(alternatives[0].alternative_drug_name, "Ibuprofen");

    let html = body_text(client.get(&app, &format!("/drugs/{}", main.id)).await).await;
    assert!(html.contains("Alternative added successfully."));
    assert!(html.contains("Same use"));

    let uri = format!("/drugs/{}/alternatives/{}/remove", main.id, alternatives[0].id);
    let response = client.post(&app, &uri, "").await;
    assert_eq!(location(&response), format!("/drugs/{}", main.id));
    assert!(app.db.alternatives().for_drug(main.id).await.unwrap().is_empty());
}

// =============================================================================
// Dashboard, Profile, Health
// =============================================================================

#[tokio::test]
async fn test_dashboard_counts() {
    let app = test_app(false).await;
    let admin = app.user("admin@pharma.test", Some(Role::Admin)).await;
    let category = app.category("Analgesics").await;
    app.drug(&admin, "Paracetamol", 0, &category).await;
    app.drug(&admin, "Ibuprofen", 4, &category).await;

    let mut client = Client::default();
    client.login(&app, "admin@pharma.test").await;

    let html = body_text(client.get(&app, "/dashboard").await).await;
    assert!(html.contains("data-in-stock=\"1\""));
    assert!(html.contains("data-out-of-stock=\"1\""));
    assert!(html.contains("Pharmacists"));
    // Ibuprofen is low on stock; Paracetamol is out, not low.
    assert!(html.contains("Ibuprofen"));
}

#[tokio::test]
async fn test_profile_password_change() {
    let app = test_app(false).await;
    app.user("staff@pharma.test", Some(Role::Pharmacist)).await;
    let mut client = Client::default();
    client.login(&app, "staff@pharma.test").await;

    let response = client
        .post(
            &app,
            "/profile",
            "form_type=password&current_password=not-it-at-all&new_password=brand-new-pass&confirm_password=brand-new-pass",
        )
        .await;
    assert_eq!(location(&response), "/profile");
    let html = body_text(client.get(&app, "/profile").await).await;
    assert!(html.contains("Current password is incorrect."));

    let form = format!(
        "form_type=password&current_password={}&new_password=brand-new-pass&confirm_password=brand-new-pass",
        PASSWORD
    );
    let response = client.post(&app, "/profile", &form).await;
    assert_eq!(location(&response), "/profile");

    let mut fresh = Client::default();
    let response = fresh
        .post(&app, "/login", "email=staff@pharma.test&password=brand-new-pass")
        .await;
    assert_eq!(location(&response), "/dashboard");
}

#[tokio::test]
async fn test_health() {
    let app = test_app(false).await;
    let mut client = Client::default();

    let response = client.get(&app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "OK");
}

//! Ownership gating across the mutation routes.
//!
//! Two users log in through the mocked provider; each browser session is a
//! separate cookie jar over the same application. Every mutating route must
//! refuse anyone but the owner and never leak why.

use axum_test::TestServer;
use menu_manager::AppResources;
use menu_manager::api::app_router;
use menu_manager::auth::provider::ProviderClient;
use menu_manager::auth::session::SessionStore;
use menu_manager::config::{AppConfig, FacebookConfig, GoogleConfig, SessionConfig};
use menu_manager::entity::menu_item;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbBackend, EntityTrait, Statement};
use serde_json::{Value, json};
use std::sync::Arc;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GOOGLE_CLIENT_ID: &str = "test-google-client";

async fn create_test_db() -> Arc<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await.expect("connect");
    db.execute(Statement::from_string(
        DbBackend::Sqlite,
        r#"CREATE TABLE identity (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            picture_url TEXT NULL
        );"#,
    ))
    .await
    .expect("create identity table");
    db.execute(Statement::from_string(
        DbBackend::Sqlite,
        r#"CREATE TABLE restaurant (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            owner_id INTEGER NOT NULL
        );"#,
    ))
    .await
    .expect("create restaurant table");
    db.execute(Statement::from_string(
        DbBackend::Sqlite,
        r#"CREATE TABLE menu_item (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            course TEXT NULL,
            description TEXT NULL,
            price TEXT NULL,
            image TEXT NULL,
            restaurant_id INTEGER NOT NULL,
            owner_id INTEGER NOT NULL
        );"#,
    ))
    .await
    .expect("create menu_item table");
    Arc::new(db)
}

fn test_config(provider_base: &str) -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".into(),
        listen_addr: "127.0.0.1:0".into(),
        frontend_url: "http://localhost:3000".into(),
        session: SessionConfig {
            cookie_name: "menu_session".into(),
        },
        google: GoogleConfig {
            client_id: GOOGLE_CLIENT_ID.into(),
            client_secret: "test-google-secret".into(),
            token_endpoint: format!("{provider_base}/token"),
            tokeninfo_endpoint: format!("{provider_base}/tokeninfo"),
            userinfo_endpoint: format!("{provider_base}/userinfo"),
            revoke_endpoint: format!("{provider_base}/revoke"),
        },
        facebook: FacebookConfig {
            app_id: "test-fb-app".into(),
            app_secret: "test-fb-secret".into(),
            graph_base: provider_base.to_string(),
        },
        provider_timeout_secs: 2,
    }
}

async fn create_resources(provider_base: &str) -> AppResources {
    let _ = rustls::crypto::ring::default_provider().install_default();
    let config = Arc::new(test_config(provider_base));
    AppResources {
        db: create_test_db().await,
        sessions: SessionStore::new(),
        providers: ProviderClient::new(&config),
        config,
    }
}

fn browser(resources: &AppResources) -> TestServer {
    TestServer::builder()
        .save_cookies()
        .build(app_router(resources.clone()))
        .expect("build test server")
}

/// Mount Google mocks for one user, keyed by a per-user code and token.
async fn mock_google_user(mock: &MockServer, tag: &str, name: &str, email: &str) {
    let code = format!("code-{tag}");
    let token = format!("tok-{tag}");
    let subject = format!("g-{tag}");
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains(code))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": token
        })))
        .mount(mock)
        .await;
    Mock::given(method("GET"))
        .and(path("/tokeninfo"))
        .and(query_param("access_token", token.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user_id": subject,
            "issued_to": GOOGLE_CLIENT_ID
        })))
        .mount(mock)
        .await;
    Mock::given(method("GET"))
        .and(path("/userinfo"))
        .and(query_param("access_token", token.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": subject,
            "name": name,
            "email": email
        })))
        .mount(mock)
        .await;
}

/// Open a fresh browser session and log `tag` in through the mocked
/// provider.
async fn login_user(resources: &AppResources, tag: &str) -> TestServer {
    let server = browser(resources);
    let response = server.get("/auth/login").await;
    response.assert_status_ok();
    let body: Value = response.json();
    let state = body["state"].as_str().expect("state token").to_string();

    server
        .post("/auth/gconnect")
        .add_query_param("state", &state)
        .text(format!("code-{tag}"))
        .await
        .assert_status_ok();
    server
}

async fn create_restaurant(server: &TestServer, name: &str) -> i32 {
    let response = server
        .post("/api/restaurants")
        .json(&json!({ "name": name }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let body: Value = response.json();
    body["id"].as_i64().expect("restaurant id") as i32
}

#[tokio::test]
async fn anonymous_cannot_create_restaurant() {
    let mock = MockServer::start().await;
    let resources = create_resources(&mock.uri()).await;
    let server = browser(&resources);

    let response = server
        .post("/api/restaurants")
        .json(&json!({ "name": "Nope" }))
        .await;
    response.assert_status_unauthorized();
}

#[tokio::test]
async fn listing_is_public() {
    let mock = MockServer::start().await;
    let resources = create_resources(&mock.uri()).await;
    mock_google_user(&mock, "ada", "Ada", "a@x.com").await;

    let ada = login_user(&resources, "ada").await;
    let restaurant_id = create_restaurant(&ada, "Ada's Diner").await;

    // A session that never logged in can read everything.
    let anonymous = browser(&resources);
    let listing = anonymous.get("/api/restaurants").await;
    listing.assert_status_ok();
    let body: Value = listing.json();
    assert_eq!(body["restaurants"][0]["name"], "Ada's Diner");
    assert_eq!(body["restaurants"][0]["owner"], "Ada");

    let menu = anonymous
        .get(&format!("/api/restaurants/{restaurant_id}/menu"))
        .await;
    menu.assert_status_ok();
}

#[tokio::test]
async fn only_the_owner_can_rename_a_restaurant() {
    let mock = MockServer::start().await;
    let resources = create_resources(&mock.uri()).await;
    mock_google_user(&mock, "ada", "Ada", "a@x.com").await;
    mock_google_user(&mock, "bob", "Bob", "b@x.com").await;

    let ada = login_user(&resources, "ada").await;
    let bob = login_user(&resources, "bob").await;
    let restaurant_id = create_restaurant(&ada, "Ada's Diner").await;

    // Another authenticated user is denied with the generic message.
    let denied = bob
        .put(&format!("/api/restaurants/{restaurant_id}"))
        .json(&json!({ "name": "Bob's Now" }))
        .await;
    denied.assert_status_forbidden();
    let body: Value = denied.json();
    assert_eq!(body["message"], "Not authorized");

    // An anonymous session is denied too.
    let anonymous = browser(&resources);
    anonymous
        .put(&format!("/api/restaurants/{restaurant_id}"))
        .json(&json!({ "name": "Drive By" }))
        .await
        .assert_status_forbidden();

    // The owner succeeds.
    let renamed = ada
        .put(&format!("/api/restaurants/{restaurant_id}"))
        .json(&json!({ "name": "Ada's Bistro" }))
        .await;
    renamed.assert_status_ok();
    let body: Value = renamed.json();
    assert_eq!(body["name"], "Ada's Bistro");
}

#[tokio::test]
async fn only_the_owner_can_delete_a_restaurant() {
    let mock = MockServer::start().await;
    let resources = create_resources(&mock.uri()).await;
    mock_google_user(&mock, "ada", "Ada", "a@x.com").await;
    mock_google_user(&mock, "bob", "Bob", "b@x.com").await;

    let ada = login_user(&resources, "ada").await;
    let bob = login_user(&resources, "bob").await;
    let restaurant_id = create_restaurant(&ada, "Ada's Diner").await;

    bob.delete(&format!("/api/restaurants/{restaurant_id}"))
        .await
        .assert_status_forbidden();
    ada.delete(&format!("/api/restaurants/{restaurant_id}"))
        .await
        .assert_status_ok();

    // Gone for everyone.
    let listing = bob.get("/api/restaurants").await;
    let body: Value = listing.json();
    assert!(body["restaurants"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn menu_item_mutations_are_owner_only() {
    let mock = MockServer::start().await;
    let resources = create_resources(&mock.uri()).await;
    mock_google_user(&mock, "ada", "Ada", "a@x.com").await;
    mock_google_user(&mock, "bob", "Bob", "b@x.com").await;

    let ada = login_user(&resources, "ada").await;
    let bob = login_user(&resources, "bob").await;
    let restaurant_id = create_restaurant(&ada, "Ada's Diner").await;

    // Only the restaurant owner can add items.
    bob.post(&format!("/api/restaurants/{restaurant_id}/menu"))
        .json(&json!({ "name": "Bob's Burger" }))
        .await
        .assert_status_forbidden();

    let created = ada
        .post(&format!("/api/restaurants/{restaurant_id}/menu"))
        .json(&json!({
            "name": "Soup",
            "course": "Starter",
            "price": "$4.50"
        }))
        .await;
    created.assert_status(axum::http::StatusCode::CREATED);
    let body: Value = created.json();
    let item_id = body["id"].as_i64().unwrap();

    // Edits and deletes gate on the item's owner.
    bob.put(&format!(
        "/api/restaurants/{restaurant_id}/menu/{item_id}"
    ))
    .json(&json!({ "price": "$99.99" }))
    .await
    .assert_status_forbidden();

    let updated = ada
        .put(&format!(
            "/api/restaurants/{restaurant_id}/menu/{item_id}"
        ))
        .json(&json!({ "price": "$5.00" }))
        .await;
    updated.assert_status_ok();
    let body: Value = updated.json();
    assert_eq!(body["price"], "$5.00");
    assert_eq!(body["name"], "Soup");

    bob.delete(&format!(
        "/api/restaurants/{restaurant_id}/menu/{item_id}"
    ))
    .await
    .assert_status_forbidden();
    ada.delete(&format!(
        "/api/restaurants/{restaurant_id}/menu/{item_id}"
    ))
    .await
    .assert_status_ok();
}

#[tokio::test]
async fn deleting_a_restaurant_deletes_its_menu() {
    let mock = MockServer::start().await;
    let resources = create_resources(&mock.uri()).await;
    mock_google_user(&mock, "ada", "Ada", "a@x.com").await;

    let ada = login_user(&resources, "ada").await;
    let restaurant_id = create_restaurant(&ada, "Ada's Diner").await;
    ada.post(&format!("/api/restaurants/{restaurant_id}/menu"))
        .json(&json!({ "name": "Soup" }))
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    ada.delete(&format!("/api/restaurants/{restaurant_id}"))
        .await
        .assert_status_ok();

    let orphans = menu_item::Entity::find()
        .all(resources.db.as_ref())
        .await
        .unwrap();
    assert!(orphans.is_empty());
}

#[tokio::test]
async fn mutating_a_missing_resource_is_not_found() {
    let mock = MockServer::start().await;
    let resources = create_resources(&mock.uri()).await;
    mock_google_user(&mock, "ada", "Ada", "a@x.com").await;

    let ada = login_user(&resources, "ada").await;
    ada.put("/api/restaurants/4711")
        .json(&json!({ "name": "Ghost" }))
        .await
        .assert_status_not_found();

    let restaurant_id = create_restaurant(&ada, "Ada's Diner").await;
    // An item id from another restaurant's namespace is not reachable here.
    ada.delete(&format!("/api/restaurants/{restaurant_id}/menu/4711"))
        .await
        .assert_status_not_found();
}

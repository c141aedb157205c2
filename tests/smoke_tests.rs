//! Smoke tests for the public site and admin dashboard flows.

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use folio::clients::email::{ContactNotification, ContactNotifier, EmailError};
use folio::config::Config;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<ContactNotification>>,
    fail: bool,
}

#[async_trait]
impl ContactNotifier for RecordingNotifier {
    async fn notify(&self, contact: &ContactNotification) -> Result<(), EmailError> {
        self.sent.lock().unwrap().push(contact.clone());
        if self.fail {
            return Err(EmailError::Api {
                status: 500,
                body: "mail server down".to_string(),
            });
        }
        Ok(())
    }
}

async fn spawn_app(notifier: Option<Arc<RecordingNotifier>>) -> (Router, String) {
    let db_path =
        std::env::temp_dir().join(format!("folio-smoke-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_url = format!("sqlite:{}", db_path.display());
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;
    config.auth.jwt_secret = "smoke-test-secret-0123456789abcdef-0123".to_string();
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config.security.argon2_parallelism = 1;

    let notifier = notifier.map(|n| n as Arc<dyn ContactNotifier>);
    let state = folio::api::create_app_state(config, notifier, None)
        .await
        .expect("failed to create app state");

    let admin = state
        .auth
        .create_administrator("admin", "smoke-password", None)
        .await
        .expect("failed to create admin");
    let token = state
        .auth
        .login(&admin.username, "smoke-password")
        .await
        .expect("failed to log in")
        .token;

    (folio::api::router(state), token)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn authed(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn valid_contact() -> Value {
    json!({
        "name": "Grace Hopper",
        "email": "Grace@Example.com",
        "message": "Loved the compiler project, let's talk!",
    })
}

#[tokio::test]
async fn test_project_management_flow() {
    let (app, token) = spawn_app(None).await;

    let (status, body) = send(&app, get("/api/projects")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["results"], 0);

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/admin/projects",
            Some(&token),
            &json!({
                "title": "Folio",
                "description": "Portfolio backend",
                "techStack": "Rust, Axum, SQLite",
                "githubUrl": "https://github.com/example/folio",
                "featured": true,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["project"]["techStack"], json!(["Rust", "Axum", "SQLite"]));
    let id = body["data"]["project"]["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/admin/projects",
            Some(&token),
            &json!({
                "title": "Side project",
                "description": "Not featured",
                "techStack": ["Go"],
                "sortOrder": 5,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send(&app, get("/api/projects")).await;
    assert_eq!(body["data"]["results"], 2);
    assert_eq!(body["data"]["projects"][0]["title"], "Folio");

    let (_, body) = send(&app, get("/api/projects?featured=true")).await;
    assert_eq!(body["data"]["results"], 1);

    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/admin/projects/{id}"),
            Some(&token),
            &json!({ "title": "Folio v2", "githubUrl": null }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["project"]["title"], "Folio v2");
    assert!(body["data"]["project"]["githubUrl"].is_null());
    assert_eq!(body["data"]["project"]["description"], "Portfolio backend");

    let (status, body) = send(&app, get(&format!("/api/projects/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["project"]["title"], "Folio v2");

    let (status, _) = send(&app, authed("DELETE", &format!("/api/admin/projects/{id}"), &token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, get(&format!("/api/projects/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Project not found");

    let (status, _) = send(&app, authed("DELETE", &format!("/api/admin/projects/{id}"), &token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_project_create_requires_fields() {
    let (app, token) = spawn_app(None).await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/admin/projects",
            Some(&token),
            &json!({ "title": "No description" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Title, description, and techStack are required");
}

#[tokio::test]
async fn test_contact_flow_and_message_admin() {
    let notifier = Arc::new(RecordingNotifier::default());
    let (app, token) = spawn_app(Some(notifier.clone())).await;

    let (status, body) = send(&app, json_request("POST", "/api/contact", None, &valid_contact())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["contact"]["email"], "grace@example.com");
    assert!(body["data"]["contact"]["createdAt"].is_string());
    assert!(body["message"].as_str().unwrap().starts_with("Thank you"));
    let id = body["data"]["contact"]["id"].as_i64().unwrap();

    // Notification runs in the background
    for _ in 0..50 {
        if !notifier.sent.lock().unwrap().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    {
        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].name, "Grace Hopper");
    }

    let (status, body) = send(&app, authed("GET", "/api/admin/messages/stats", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({ "total": 1, "unread": 1, "read": 0 }));

    let (status, body) = send(&app, authed("PUT", &format!("/api/admin/messages/{id}/read"), &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"]["isRead"], true);

    let (_, body) = send(&app, authed("GET", "/api/admin/messages?unread=true", &token)).await;
    assert_eq!(body["data"]["messages"], json!([]));

    let (_, body) = send(&app, authed("GET", "/api/admin/messages", &token)).await;
    assert_eq!(body["data"]["messages"][0]["message"], "Loved the compiler project, let's talk!");

    let (_, body) = send(&app, authed("GET", "/api/admin/dashboard/stats", &token)).await;
    assert_eq!(
        body["data"],
        json!({ "projects": 0, "messages": 1, "unreadMessages": 0 })
    );

    let (status, _) = send(&app, authed("DELETE", &format!("/api/admin/messages/{id}"), &token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, authed("PUT", &format!("/api/admin/messages/{id}/read"), &token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Message not found");
}

#[tokio::test]
async fn test_contact_succeeds_when_notification_fails() {
    let notifier = Arc::new(RecordingNotifier {
        fail: true,
        ..Default::default()
    });
    let (app, _) = spawn_app(Some(notifier)).await;

    let (status, body) = send(&app, json_request("POST", "/api/contact", None, &valid_contact())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_contact_validation_lists_fields() {
    let (app, _) = spawn_app(None).await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/contact",
            None,
            &json!({ "name": "G", "email": "nope", "message": "hi" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation failed");

    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["name", "email", "message"]);
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let (app, _) = spawn_app(None).await;

    let body = json!({
        "name": "Grace Hopper",
        "email": "grace@example.com",
        "message": "x".repeat(20 * 1024),
    });
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/contact", None, &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_health_index_and_fallback() {
    let (app, _) = spawn_app(None).await;

    let response = app.clone().oneshot(get("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(response.headers()["x-frame-options"], "DENY");
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["database"], "connected");
    assert_eq!(body["data"]["environment"], "development");

    let (status, body) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["endpoints"]["health"], "/api/health");

    let (status, body) = send(&app, get("/api/nothing-here")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Cannot GET /api/nothing-here");
}

//! Router-level tests for authentication and input validation.
//!
//! These run against a lazily connected pool: every request here must
//! be rejected before any query executes, so no database is required.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use http_body_util::BodyExt;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower::ServiceExt;

use meshforge_api::auth::jwt::{generate_access_token, JwtConfig};
use meshforge_api::config::{MeshyConfig, ServerConfig};
use meshforge_api::routes;
use meshforge_api::state::AppState;
use meshforge_meshy::MeshyClient;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".into(),
        port: 0,
        cors_origins: vec![],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-not-for-production".into(),
            access_token_expiry_mins: 15,
        },
        meshy: MeshyConfig {
            api_key: "test-key".into(),
            base_url: "http://127.0.0.1:9".into(),
        },
    }
}

fn test_app() -> (axum::Router, ServerConfig) {
    let config = test_config();
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/unused")
        .expect("lazy pool");
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        meshy: Arc::new(MeshyClient::new(
            config.meshy.base_url.clone(),
            config.meshy.api_key.clone(),
        )),
    };
    (
        axum::Router::new()
            .nest("/api", routes::api_routes())
            .with_state(state),
        config,
    )
}

fn bearer(config: &ServerConfig, user_id: &str, role: &str) -> String {
    let token = generate_access_token(user_id, role, &config.jwt).unwrap();
    format!("Bearer {token}")
}

async fn send(
    app: axum::Router,
    method: Method,
    uri: &str,
    auth: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let (app, _) = test_app();
    let (status, body) = send(app, Method::GET, "/api/models", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn malformed_authorization_header_is_unauthorized() {
    let (app, _) = test_app();
    let (status, _) = send(app, Method::GET, "/api/models", Some("Basic abc"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_route_rejects_plain_users() {
    let (app, config) = test_app();
    let auth = bearer(&config, "user-1", "user");
    let (status, body) = send(app, Method::GET, "/api/admin/models", Some(&auth), None).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}

// ---------------------------------------------------------------------------
// Input validation (all rejected before any query runs)
// ---------------------------------------------------------------------------

#[tokio::test]
async fn preview_generation_requires_prompt() {
    let (app, config) = test_app();
    let auth = bearer(&config, "user-1", "user");
    let (status, body) = send(
        app,
        Method::POST,
        "/api/generate",
        Some(&auth),
        Some(serde_json::json!({ "mode": "preview" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn refine_generation_requires_preview_task_id() {
    let (app, config) = test_app();
    let auth = bearer(&config, "user-1", "user");
    let (status, _) = send(
        app,
        Method::POST,
        "/api/generate",
        Some(&auth),
        Some(serde_json::json!({ "mode": "refine" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_generation_mode_is_rejected() {
    let (app, config) = test_app();
    let auth = bearer(&config, "user-1", "user");
    let (status, _) = send(
        app,
        Method::POST,
        "/api/generate",
        Some(&auth),
        Some(serde_json::json!({ "mode": "remix", "prompt": "a red car" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn spend_rejects_unknown_service_type() {
    let (app, _) = test_app();
    let (status, body) = send(
        app,
        Method::POST,
        "/api/credits/spend",
        None,
        Some(serde_json::json!({ "userId": "user-1", "serviceType": "text-to-4d" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "UNKNOWN_SERVICE_TYPE");
}

#[tokio::test]
async fn rating_must_be_between_one_and_five() {
    let (app, config) = test_app();
    let auth = bearer(&config, "user-1", "user");

    for rating in [serde_json::json!(0), serde_json::json!(6), serde_json::Value::Null] {
        let (status, _) = send(
            app.clone(),
            Method::PUT,
            "/api/models/task-a/rating",
            Some(&auth),
            Some(serde_json::json!({ "rating": rating.clone() })),
        )
        .await;
        assert_eq!(
            status,
            StatusCode::BAD_REQUEST,
            "rating {rating} should be rejected"
        );
    }
}

#[tokio::test]
async fn delete_requires_model_id() {
    let (app, config) = test_app();
    let auth = bearer(&config, "user-1", "user");
    let (status, _) = send(app, Method::DELETE, "/api/models", Some(&auth), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn similarity_search_requires_prompt() {
    let (app, config) = test_app();
    let auth = bearer(&config, "user-1", "user");
    let (status, _) = send(
        app,
        Method::POST,
        "/api/models/similar",
        Some(&auth),
        Some(serde_json::json!({ "prompt": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reuse_requires_original_model_id() {
    let (app, config) = test_app();
    let auth = bearer(&config, "user-1", "user");
    let (status, _) = send(
        app,
        Method::POST,
        "/api/models/reuse",
        Some(&auth),
        Some(serde_json::json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn initialize_rejects_blank_identifiers() {
    let (app, _) = test_app();
    let (status, _) = send(
        app,
        Method::POST,
        "/api/credits/initialize",
        None,
        Some(serde_json::json!({ "userId": " ", "email": "one@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

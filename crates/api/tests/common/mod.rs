#![allow(dead_code)]

use std::path::Path;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use worktrace_api::config::ServerConfig;
use worktrace_api::routes;
use worktrace_api::state::AppState;
use worktrace_core::api_keys::{hash_api_key, API_KEY_HEADER};
use worktrace_core::types::DbId;

/// Largest screenshot accepted by the test app.
pub const TEST_MAX_SCREENSHOT_BYTES: usize = 4096;

/// Minimal PNG signature; enough for format sniffing.
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

const BOUNDARY: &str = "worktrace-test-boundary";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(screenshot_dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        screenshot_dir: screenshot_dir.to_path_buf(),
        max_screenshot_bytes: TEST_MAX_SCREENSHOT_BYTES,
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool and screenshot directory.
///
/// This mirrors the router construction in `main.rs`.
pub fn build_test_app(pool: PgPool, screenshot_dir: &Path) -> Router {
    let state = AppState::new(pool, test_config(screenshot_dir));

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(API_KEY_HEADER)])
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get_authed(app: Router, uri: &str, api_key: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header(API_KEY_HEADER, api_key)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(
    app: Router,
    uri: &str,
    api_key: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(API_KEY_HEADER, api_key)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// A multipart part: field name, optional file name, contents.
pub struct Part<'a> {
    pub name: &'a str,
    pub file_name: Option<&'a str>,
    pub data: &'a [u8],
}

impl<'a> Part<'a> {
    pub fn text(name: &'a str, value: &'a str) -> Self {
        Self {
            name,
            file_name: None,
            data: value.as_bytes(),
        }
    }

    pub fn file(name: &'a str, file_name: &'a str, data: &'a [u8]) -> Self {
        Self {
            name,
            file_name: Some(file_name),
            data,
        }
    }
}

pub async fn post_multipart(
    app: Router,
    uri: &str,
    api_key: &str,
    parts: &[Part<'_>],
) -> Response<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part.file_name {
            Some(file_name) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{file_name}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n",
                    part.name
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    part.name
                )
                .as_bytes(),
            ),
        }
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(API_KEY_HEADER, api_key)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub async fn insert_employee(pool: &PgPool, email: &str, api_key: &str, activated: bool) -> DbId {
    sqlx::query_scalar(
        "INSERT INTO employees (name, email, api_key_hash, activated) \
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(email.split('@').next())
    .bind(email)
    .bind(hash_api_key(api_key))
    .bind(activated)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Insert a project with one task and return `(project_id, task_id)`.
pub async fn insert_project_with_task(pool: &PgPool, name: &str) -> (DbId, DbId) {
    let project_id: DbId =
        sqlx::query_scalar("INSERT INTO projects (name) VALUES ($1) RETURNING id")
            .bind(name)
            .fetch_one(pool)
            .await
            .unwrap();
    let task_id: DbId = sqlx::query_scalar(
        "INSERT INTO tasks (project_id, name) VALUES ($1, 'Default Task') RETURNING id",
    )
    .bind(project_id)
    .fetch_one(pool)
    .await
    .unwrap();
    (project_id, task_id)
}

pub async fn assign(pool: &PgPool, project_id: DbId, employee_id: DbId) {
    sqlx::query("INSERT INTO project_assignments (project_id, employee_id) VALUES ($1, $2)")
        .bind(project_id)
        .bind(employee_id)
        .execute(pool)
        .await
        .unwrap();
}

//! End-to-end tests: the agent's HTTP client, uploader and orchestrator
//! against a live API server on an ephemeral port.

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use async_trait::async_trait;
use axum::Router;
use sqlx::PgPool;
use worktrace_agent::capture::{CaptureError, CaptureProvider, DisabledCaptureProvider, SourceId};
use worktrace_agent::client::ApiClient;
use worktrace_agent::config::SchedulerConfig;
use worktrace_agent::orchestrator::SessionOrchestrator;
use worktrace_agent::uploader::{EvidenceUploader, HttpEvidenceUploader};
use worktrace_api::config::ServerConfig;
use worktrace_api::routes;
use worktrace_api::state::AppState;
use worktrace_core::api_keys::hash_api_key;
use worktrace_core::error::CoreError;
use worktrace_core::evidence::EvidenceUpload;
use worktrace_core::timer::TimerStore;
use worktrace_core::types::DbId;
use worktrace_db::PgTimerStore;

const PERIOD: Duration = Duration::from_millis(200);
const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct PngCapture;

#[async_trait]
impl CaptureProvider for PngCapture {
    async fn acquire_source_id(&self) -> Option<SourceId> {
        Some(SourceId(":0".into()))
    }

    async fn capture_still(&self, _source: &SourceId) -> Result<Vec<u8>, CaptureError> {
        Ok(PNG.to_vec())
    }
}

/// Serve the API on an ephemeral port and return its base URL.
async fn spawn_server(pool: PgPool, screenshot_dir: &std::path::Path) -> String {
    let config = ServerConfig {
        host: "127.0.0.1".into(),
        port: 0,
        cors_origins: vec![],
        request_timeout_secs: 30,
        screenshot_dir: screenshot_dir.to_path_buf(),
        max_screenshot_bytes: 1024 * 1024,
    };
    let app = Router::new()
        .nest("/api/v1", routes::api_routes())
        .with_state(AppState::new(pool, config));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Insert an employee with one assigned task; returns `(employee_id, task_id)`.
async fn seed(pool: &PgPool, api_key: &str) -> (DbId, DbId) {
    let employee_id: DbId = sqlx::query_scalar(
        "INSERT INTO employees (name, email, api_key_hash, activated) \
         VALUES ('Ada', 'ada@example.com', $1, TRUE) RETURNING id",
    )
    .bind(hash_api_key(api_key))
    .fetch_one(pool)
    .await
    .unwrap();
    let project_id: DbId =
        sqlx::query_scalar("INSERT INTO projects (name) VALUES ('Website') RETURNING id")
            .fetch_one(pool)
            .await
            .unwrap();
    let task_id: DbId = sqlx::query_scalar(
        "INSERT INTO tasks (project_id, name) VALUES ($1, 'Build') RETURNING id",
    )
    .bind(project_id)
    .fetch_one(pool)
    .await
    .unwrap();
    sqlx::query("INSERT INTO project_assignments (project_id, employee_id) VALUES ($1, $2)")
        .bind(project_id)
        .bind(employee_id)
        .execute(pool)
        .await
        .unwrap();
    (employee_id, task_id)
}

fn orchestrator(
    client: &ApiClient,
    capture: Arc<dyn CaptureProvider>,
) -> SessionOrchestrator<ApiClient> {
    SessionOrchestrator::new(
        client.clone(),
        capture,
        Arc::new(HttpEvidenceUploader::new(client.clone())),
        SchedulerConfig::new(PERIOD),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn session_uploads_screenshots_until_stopped(pool: PgPool) {
    let dir = tempfile::tempdir().unwrap();
    let (employee_id, task_id) = seed(&pool, "key-ada").await;
    let client = ApiClient::new(spawn_server(pool.clone(), dir.path()).await, "key-ada");

    let me = client.me().await.unwrap();
    assert_eq!(me.id, employee_id);
    let projects = client.projects().await.unwrap();
    assert_eq!(projects[0].tasks[0].id, task_id);

    let sessions = orchestrator(&client, Arc::new(PngCapture));
    let entry = sessions.start_session(employee_id, task_id).await.unwrap();
    assert_eq!(client.active().await.unwrap().map(|e| e.id), Some(entry.id));

    tokio::time::sleep(PERIOD * 2 + PERIOD / 2).await;
    let stopped = sessions.stop_session(employee_id).await.unwrap();
    assert!(stopped.end_time.unwrap() >= stopped.start_time);

    let store = PgTimerStore::new(pool.clone());
    let at_stop = store.list_screenshots(entry.id).await.unwrap();
    assert!(at_stop.len() >= 2, "expected at least two ticks, got {}", at_stop.len());
    assert!(at_stop
        .iter()
        .all(|s| s.permission_flag && dir.path().join(&s.image_ref).exists()));

    tokio::time::sleep(PERIOD * 3).await;
    let later = store.list_screenshots(entry.id).await.unwrap();
    assert!(later.len() <= at_stop.len() + 1, "at most one in-flight tick may land");
    assert!(client.active().await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn disabled_capture_uploads_gap_records(pool: PgPool) {
    let dir = tempfile::tempdir().unwrap();
    let (employee_id, task_id) = seed(&pool, "key-ada").await;
    let client = ApiClient::new(spawn_server(pool.clone(), dir.path()).await, "key-ada");

    let sessions = orchestrator(&client, Arc::new(DisabledCaptureProvider));
    let entry = sessions.start_session(employee_id, task_id).await.unwrap();
    tokio::time::sleep(PERIOD / 2).await;
    sessions.stop_session(employee_id).await.unwrap();

    let shots = PgTimerStore::new(pool).list_screenshots(entry.id).await.unwrap();
    assert!(!shots.is_empty());
    assert!(shots.iter().all(|s| s.is_gap()));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn server_rejections_map_to_domain_errors(pool: PgPool) {
    let dir = tempfile::tempdir().unwrap();
    let (employee_id, task_id) = seed(&pool, "key-ada").await;
    let base_url = spawn_server(pool, dir.path()).await;
    let client = ApiClient::new(&base_url, "key-ada");
    let sessions = orchestrator(&client, Arc::new(DisabledCaptureProvider));

    assert_matches!(
        sessions.stop_session(employee_id).await,
        Err(CoreError::NotFound { .. })
    );
    assert_matches!(
        sessions.start_session(employee_id, 999_999).await,
        Err(CoreError::NotFound { entity: "Task", id: 999_999 })
    );

    sessions.start_session(employee_id, task_id).await.unwrap();
    assert_matches!(
        sessions.start_session(employee_id, task_id).await,
        Err(CoreError::Conflict(_))
    );
    sessions.stop_session(employee_id).await.unwrap();

    let stranger = ApiClient::new(&base_url, "wrong-key");
    assert_matches!(
        stranger.me().await.map_err(|e| e.into_core(CoreError::no_open_entry(0))),
        Err(CoreError::Unauthorized(_))
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn upload_to_closed_entry_is_still_attached(pool: PgPool) {
    let dir = tempfile::tempdir().unwrap();
    let (employee_id, task_id) = seed(&pool, "key-ada").await;
    let client = ApiClient::new(spawn_server(pool.clone(), dir.path()).await, "key-ada");

    let entry = client.start_timer(employee_id, task_id).await.unwrap();
    client.stop_timer(employee_id).await.unwrap();

    let uploader = HttpEvidenceUploader::new(client.clone());
    let shot = uploader
        .upload(EvidenceUpload::captured(entry.id, chrono::Utc::now(), PNG.to_vec()))
        .await
        .unwrap();
    assert_eq!(shot.time_entry_id, entry.id);

    let missing = uploader
        .upload(EvidenceUpload::gap(entry.id + 1000, chrono::Utc::now()))
        .await
        .unwrap_err();
    assert!(missing.is_missing_entry());
}

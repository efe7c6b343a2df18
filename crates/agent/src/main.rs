//! `worktrace-agent` -- desktop time-tracking client.
//!
//! Authenticates with the API key, opens a time entry for the configured
//! (or default) task, captures screenshots while the entry is open, and
//! closes the entry on Ctrl-C / SIGTERM.
//!
//! See [`worktrace_agent::config::AgentConfig`] for the environment
//! variables.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use worktrace_core::tracking::default_task;

use worktrace_agent::capture::{CaptureProvider, CommandCaptureProvider, DisabledCaptureProvider};
use worktrace_agent::client::ApiClient;
use worktrace_agent::config::AgentConfig;
use worktrace_agent::orchestrator::SessionOrchestrator;
use worktrace_agent::uploader::HttpEvidenceUploader;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "worktrace_agent=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AgentConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid agent configuration");
        std::process::exit(1);
    });

    let client = ApiClient::new(&config.api_base_url, &config.api_key);

    let me = client.me().await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Login failed");
        std::process::exit(1);
    });
    tracing::info!(employee_id = me.id, email = %me.email, "Logged in");

    let task_id = match config.task_id {
        Some(id) => id,
        None => {
            let projects = client.projects().await.unwrap_or_else(|e| {
                tracing::error!(error = %e, "Failed to load assigned projects");
                std::process::exit(1);
            });
            match default_task(&projects) {
                Some(task) => {
                    tracing::info!(task_id = task.id, task = %task.name, "Using default task");
                    task.id
                }
                None => {
                    tracing::error!("No TASK_ID configured and no tasks are assigned");
                    std::process::exit(1);
                }
            }
        }
    };

    let capture: Arc<dyn CaptureProvider> = match config
        .capture_command
        .as_deref()
        .and_then(|cmd| {
            CommandCaptureProvider::from_command_line(
                cmd,
                config.capture_source.clone(),
                config.capture_timeout,
            )
        }) {
        Some(provider) => Arc::new(provider),
        None => {
            tracing::warn!("CAPTURE_COMMAND not set; every screenshot will be a permission gap");
            Arc::new(DisabledCaptureProvider)
        }
    };

    let uploader = Arc::new(HttpEvidenceUploader::new(client.clone()));
    let orchestrator = SessionOrchestrator::new(client, capture, uploader, config.scheduler);

    tracing::info!(
        employee_id = me.id,
        task_id,
        period_secs = config.scheduler.period.as_secs(),
        "Starting session",
    );

    let entry = orchestrator
        .start_session(me.id, task_id)
        .await
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to start session");
            std::process::exit(1);
        });
    tracing::info!(time_entry_id = entry.id, "Tracking");

    shutdown_signal().await;

    let mut failed = false;
    for (employee_id, result) in orchestrator.stop_all().await {
        match result {
            Ok(entry) => tracing::info!(employee_id, time_entry_id = entry.id, "Session closed"),
            Err(e) => {
                tracing::error!(employee_id, error = %e, "Failed to stop session");
                failed = true;
            }
        }
    }
    if failed {
        std::process::exit(1);
    }
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT (Ctrl-C), stopping session"),
        () = terminate => tracing::info!("Received SIGTERM, stopping session"),
    }
}

mod handlers;
mod metrics;
mod routes;

use anyhow::Context;
use axum::Router;
use prepjudge_common::config::JudgeConfig;
use prepjudge_engine::{CancellationToken, Judge};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

pub struct AppState {
    pub judge: Judge,
    /// Parent of every per-request token; cancelled on shutdown.
    pub shutdown: CancellationToken,
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new().merge(routes::routes()).with_state(state)
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    info!("PrepJudge API booting...");

    let config = JudgeConfig::from_env().context("Invalid judge configuration")?;
    let judge = Judge::from_config(&config).context("Failed to build judge")?;

    if !judge.has_remote_backend() {
        info!(
            fallback_mode = ?config.fallback_mode,
            "No remote judge configured, results will be approximate"
        );
    }

    let shutdown = CancellationToken::new();
    let state = Arc::new(AppState {
        judge,
        shutdown: shutdown.clone(),
    });

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| {
        let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
        format!("0.0.0.0:{}", port)
    });
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown requested, cancelling in-flight judgements");
            shutdown.cancel();
        })
        .await
        .context("Server error")?;

    Ok(())
}

mod handlers;
mod metrics;
mod routes;

use anyhow::{Context, Result};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use verdict_harness::generator::HarnessGenerator;
use verdict_runtime::{
    Grader, HttpScoreSink, LanguageConfigManager, RunOptions, RuntimeConfig, SandboxClient,
    ScoreSink, TestRunner,
};

pub struct AppState {
    pub grader: Grader,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // VERDICT_LOG_FORMAT=json for log shippers
    if std::env::var("VERDICT_LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    info!("Verdict API booting...");

    let config = RuntimeConfig::from_env();
    let languages = LanguageConfigManager::load_or_builtin(&config.languages_file)
        .context("Failed to load language configuration")?;
    info!(languages = ?languages.list_languages(), "Languages loaded");

    let backend = SandboxClient::from_config(&config).context("Failed to build sandbox client")?;
    info!(service_url = %config.service_url, "Execution service configured");

    let runner = TestRunner::new(
        Arc::new(backend),
        Arc::new(HarnessGenerator::new()),
        languages,
        RunOptions::from_config(&config),
    );

    let sink = match &config.score_sink_url {
        Some(url) => {
            let sink = HttpScoreSink::new(url.as_str()).context("Failed to build score sink")?;
            info!(url = %url, "Scores will be persisted");
            Some(Arc::new(sink) as Arc<dyn ScoreSink>)
        }
        None => None,
    };

    let state = Arc::new(AppState {
        grader: Grader::new(runner, sink),
    });

    let app = Router::new()
        .merge(routes::routes())
        .with_state(state);

    let addr = std::env::var("VERDICT_API_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

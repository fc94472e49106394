// Main entry point for the image transformation service

use imgmorph::{
    core::Config,
    orchestration::TransformOrchestrator,
    server::{router, AppState},
    utils::Metrics,
};

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Arc::new(Config::new()?);

    // Initialize logging
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::new(format!(
        "imgmorph={}",
        match config.log_level() {
            tracing::Level::TRACE => "trace",
            tracing::Level::DEBUG => "debug",
            tracing::Level::INFO => "info",
            tracing::Level::WARN => "warn",
            tracing::Level::ERROR => "error",
        }
    ));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("=== IMGMORPH - AI IMAGE TRANSFORMATION ===");
    info!(
        "Transform endpoint: {} (timeout {}s, {} attempts)",
        config.transform_url(),
        config.transform_timeout_seconds(),
        config.max_retry_attempts()
    );

    // Initialize metrics and the orchestrator
    let metrics = Metrics::new();
    let orchestrator = Arc::new(TransformOrchestrator::new(
        config.clone(),
        Some(metrics.clone()),
    )?);
    let state = AppState {
        config: config.clone(),
        orchestrator,
        metrics,
    };

    let app = router(state);

    let addr = format!("{}:{}", config.server_host(), config.server_port());
    info!("{}", "=".repeat(60));
    info!("Server starting on http://{}", addr);
    info!("{}", "-".repeat(60));
    info!("Endpoints:");
    info!("  GET  /              - Transformation page");
    info!("  GET  /health        - Health check");
    info!("  GET  /stats         - Detailed statistics");
    info!("  GET  /metrics       - Prometheus metrics");
    info!("  POST /api/transform - Transform an already-hosted image");
    info!("  POST /api/process   - Upload and transform (multipart)");
    info!("{}", "=".repeat(60));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

use rating_service::config::RatingConfig;
use rating_service::services::init_metrics;
use rating_service::startup::Application;
use service_core::observability::init_tracing;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = RatingConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    // Worker threads serve HTTP; inference runs on the blocking pool.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.runtime.worker_threads)
        .max_blocking_threads(config.runtime.max_blocking_threads)
        .enable_all()
        .build()?;

    runtime.block_on(run(config))
}

async fn run(config: RatingConfig) -> anyhow::Result<()> {
    init_tracing(
        "rating-service",
        &config.telemetry.log_level,
        config.telemetry.otlp_endpoint.as_deref(),
    )?;

    // Initialize metrics recorder (must be before any metrics are recorded)
    init_metrics()?;

    tracing::info!(
        worker_threads = config.runtime.worker_threads,
        max_blocking_threads = config.runtime.max_blocking_threads,
        "Starting rating-service"
    );

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        anyhow::anyhow!("Startup error: {}", e)
    })?;

    app.run_until_stopped().await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}

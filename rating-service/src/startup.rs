//! Application startup and lifecycle management.

use crate::config::RatingConfig;
use crate::handlers;
use crate::ApiDoc;
use crate::services::{load_classifier, ClassificationService, TextClassifier};
use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{make_request_span, metrics_middleware, request_id_middleware};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub classification: ClassificationService,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/review", post(handlers::predict_rating))
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Load the configured classifier and bind the listener.
    pub async fn build(config: RatingConfig) -> Result<Self, AppError> {
        let model_config = config.model.clone();
        let classifier = tokio::task::spawn_blocking(move || load_classifier(&model_config))
            .await?
            .map_err(|e| {
                tracing::error!("Failed to load classifier: {}", e);
                AppError::InternalError(e.into())
            })?;

        tracing::info!(
            backend = ?config.model.backend,
            model_id = %classifier.model_id(),
            "Initialized text classifier"
        );

        Self::build_with_classifier(config, classifier).await
    }

    /// Bind the listener around an already constructed classifier.
    pub async fn build_with_classifier(
        config: RatingConfig,
        classifier: Arc<dyn TextClassifier>,
    ) -> Result<Self, AppError> {
        let state = AppState {
            classification: ClassificationService::new(classifier),
        };

        // Port 0 = random port for testing
        let addr = config.common.bind_addr()?;
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Rating service listening on {}:{}", config.common.host, port);

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until Ctrl+C or SIGTERM, then drain in-flight requests.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);

        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

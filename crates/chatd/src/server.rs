//! HTTP server for chatd

use crate::config::ServerConfig;
use crate::error::{handle_middleware_error, panic_response};
use crate::orchestrator::ChatOrchestrator;
use crate::routes;
use anyhow::{Context, Result};
use axum::error_handling::HandleErrorLayer;
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use chat_common::{FallbackProvider, FaqStore, LlmClient, VaguenessClassifier};
use std::sync::Arc;
use std::time::Duration;
use tower::timeout::TimeoutLayer;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Application state shared across handlers
pub struct AppState {
    pub faq: Arc<FaqStore>,
    pub fallback: Arc<dyn FallbackProvider>,
    pub orchestrator: ChatOrchestrator,
}

impl AppState {
    pub fn new(
        faq: Arc<FaqStore>,
        llm: Arc<dyn LlmClient>,
        fallback: Arc<dyn FallbackProvider>,
        classifier: VaguenessClassifier,
    ) -> Self {
        let orchestrator = ChatOrchestrator::new(faq.clone(), llm, fallback.clone(), classifier);
        Self {
            faq,
            fallback,
            orchestrator,
        }
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin: {}", o);
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

/// Assemble routes and middleware
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    let state = Arc::new(state);

    Router::new()
        .merge(routes::chat_routes())
        .merge(routes::faq_routes())
        .merge(routes::log_routes())
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.request_body_limit_bytes))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.request_timeout_secs,
                ))),
        )
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
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
    info!("Shutting down gracefully");
}

/// Run the HTTP server until Ctrl-C or SIGTERM
pub async fn run(state: AppState, config: &ServerConfig) -> Result<()> {
    let app = router(state, config);

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!("  Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;
    Ok(())
}

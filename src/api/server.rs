//! HTTP server

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::core::AppState;

use super::handlers;

/// Build the router with all tracker endpoints
pub fn router(state: Arc<AppState>, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/tasks/",
            get(handlers::list_tasks).post(handlers::create_task),
        )
        .route(
            "/tasks/:task_id/",
            get(handlers::get_task).delete(handlers::delete_task),
        )
        .route("/tasks/:task_id/chunks/", post(handlers::create_chunk))
        .route("/tasks/:task_id/complete", post(handlers::complete_task))
        .route(
            "/tasks/:task_id/check_chunks_and_complete",
            post(handlers::check_chunks_and_complete),
        )
        .route("/chunks/:chunk_id/complete", patch(handlers::complete_chunk))
        .route(
            "/focus-sessions/",
            get(handlers::list_focus_sessions).post(handlers::create_focus_session),
        )
        .route("/stats/", get(handlers::get_stats))
        .with_state(state)
        .layer(cors(allowed_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    if allowed_origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(AllowOrigin::any());
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}

pub struct ApiServer {
    host: String,
    port: u16,
    allowed_origins: Vec<String>,
    state: Arc<AppState>,
}

impl ApiServer {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        allowed_origins: Vec<String>,
        state: Arc<AppState>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            allowed_origins,
            state,
        }
    }

    pub async fn run(self) -> Result<()> {
        let addr = format!("{}:{}", self.host, self.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        tracing::info!("API server listening on http://{}", addr);

        let app = router(self.state, &self.allowed_origins);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("API server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutdown requested");
}

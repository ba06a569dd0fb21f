//! ScaleLens API Crate
//!
//! Self-contained HTTP API layer using Axum.
//!
//! # Architecture
//!
//! This crate provides the REST surface over `appstate`:
//! - `POST /recognize` — multipart image upload, failover recognition
//! - `GET/POST /config` — API credential status and persistence
//! - `GET /health` — liveness probe
//! - OpenAPI/Swagger documentation (optional)
//! - CORS, tracing, and body-limit middleware
//!
//! # Usage
//!
//! ```rust,no_run
//! use appstate::{AppState, AppStateConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let state = AppState::new(AppStateConfig::default())?;
//!     scalelens_api::run_server(state, 5001).await
//! }
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

mod config;
mod error;
mod middleware;
mod router;
mod routes;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use router::build_router;

use std::{net::SocketAddr, sync::Arc};

use appstate::AppState;

/// Run the HTTP API server with default configuration on `port`.
///
/// # Errors
///
/// Returns an error if the port is already in use, the server fails to
/// bind, or the server encounters a fatal error.
pub async fn run_server(state: AppState, port: u16) -> anyhow::Result<()> {
    run_server_with_config(
        Arc::new(state),
        ApiConfig {
            port,
            ..Default::default()
        },
    )
    .await
}

/// Run the HTTP API server with custom configuration.
pub async fn run_server_with_config(state: Arc<AppState>, config: ApiConfig) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("ScaleLens API server listening on http://{}", addr);
    if config.enable_swagger {
        tracing::info!("Swagger UI:   http://{}/swagger-ui/", addr);
        tracing::info!("OpenAPI spec: http://{}/api-doc/openapi.json", addr);
    }

    let app = router::build_router(state, &config);
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

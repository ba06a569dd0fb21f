//! Router configuration and setup.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use appstate::AppState;

use crate::{config::ApiConfig, middleware, routes};

/// Build the application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>, config: &ApiConfig) -> Router {
    let mut router = Router::new()
        .route("/health", get(routes::health::health))
        .route("/recognize", post(routes::recognize::recognize))
        .route(
            "/config",
            get(routes::config::get_config).post(routes::config::set_config),
        );

    if config.enable_swagger {
        router = router.merge(
            SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", routes::ApiDoc::openapi()),
        );
    }

    // Layer order: outer to inner.
    router
        .layer(DefaultBodyLimit::max(config.max_body_size))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors_layer(config))
        .with_state(state)
}

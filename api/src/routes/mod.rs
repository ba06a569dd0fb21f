//! API route handlers.

pub mod config;
pub mod health;
pub mod recognize;

use utoipa::OpenApi;

/// OpenAPI documentation for all routes.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "ScaleLens API",
        version = "1.0.0",
        description = "Object recognition and weight estimation over a hosted vision model pool",
        license(name = "MIT"),
    ),
    servers(
        (url = "http://localhost:5001", description = "Local development"),
    ),
    paths(
        health::health,
        recognize::recognize,
        config::get_config,
        config::set_config,
    ),
    components(schemas(
        health::HealthResponse,
        recognize::RecognitionResponse,
        recognize::RecognizeForm,
        config::ConfigStatusResponse,
        config::SetApiKeyRequest,
        config::SetApiKeyResponse,
    ))
)]
pub struct ApiDoc;

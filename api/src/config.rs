//! API configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Port to bind the HTTP server to.
    ///
    /// Default: 5001
    pub port: u16,

    /// Enable Cross-Origin Resource Sharing (CORS).
    ///
    /// The bundled frontend is a static page served from elsewhere, so
    /// CORS is on by default.
    pub enable_cors: bool,

    /// Allowed origins for CORS requests.
    ///
    /// Use `["*"]` to allow all origins (development only).
    pub cors_origins: Vec<String>,

    /// Maximum accepted request body size in bytes (uploads).
    ///
    /// Default: 10 MB
    pub max_body_size: usize,

    /// Enable Swagger UI documentation at `/swagger-ui`.
    pub enable_swagger: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: 5001,
            enable_cors: true,
            cors_origins: vec!["*".to_string()],
            max_body_size: 10 * 1024 * 1024,
            enable_swagger: true,
        }
    }
}

impl ApiConfig {
    /// Stricter defaults suitable for production: CORS restricted to the
    /// given origins, Swagger UI disabled.
    pub fn production(allowed_origins: Vec<String>) -> Self {
        Self {
            enable_swagger: false,
            cors_origins: allowed_origins,
            ..Default::default()
        }
    }

    /// Permissive defaults for local development.
    pub fn development() -> Self {
        Self {
            cors_origins: vec!["*".to_string()],
            enable_swagger: true,
            ..Default::default()
        }
    }
}

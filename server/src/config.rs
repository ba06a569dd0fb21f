//! Configuration for the ScaleLens server.
//!
//! Priority: CLI arguments > environment variables > defaults.

use std::path::PathBuf;

use clap::Parser;

use appstate::AppStateConfig;
use scalelens_api::ApiConfig;

/// Command-line arguments for the ScaleLens server.
#[derive(Parser, Debug, Clone)]
#[command(name = "scalelens-server")]
#[command(about = "ScaleLens - object recognition and weight estimation over a hosted vision model pool")]
#[command(version)]
pub struct CliArgs {
    /// HTTP port for the API server
    #[arg(long, short = 'p', default_value = "5001", env = "SCALELENS_PORT")]
    pub port: u16,

    /// Key-value file holding the API credential, colocated with the service
    #[arg(long, default_value = ".env", env = "SCALELENS_ENV_FILE")]
    pub env_file: PathBuf,

    /// Base URL of the hosted inference API
    #[arg(long, default_value = appstate::DEFAULT_BASE_URL, env = "SCALELENS_BASE_URL")]
    pub base_url: String,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Disable the Swagger UI
    #[arg(long, env = "SCALELENS_NO_SWAGGER")]
    pub no_swagger: bool,
}

impl CliArgs {
    /// Application-state configuration derived from the arguments.
    pub fn state_config(&self) -> AppStateConfig {
        AppStateConfig {
            env_file: self.env_file.clone(),
            base_url: self.base_url.clone(),
        }
    }

    /// API-layer configuration derived from the arguments.
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            port: self.port,
            enable_swagger: !self.no_swagger,
            ..Default::default()
        }
    }
}

//! ScaleLens server - HTTP backend for object recognition and weight
//! estimation against a hosted multimodal model pool.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;

use appstate::AppState;
use config::CliArgs;

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "scalelens_server={level},scalelens_api={level},appstate={level},tower_http=info",
                    level = args.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ScaleLens server v{}", env!("CARGO_PKG_VERSION"));
    info!("Credential file: {}", args.env_file.display());
    info!("Inference endpoint: {}", args.base_url);
    info!("HTTP port: {}", args.port);

    let state = AppState::new(args.state_config())?;

    scalelens_api::run_server_with_config(Arc::new(state), args.api_config()).await
}

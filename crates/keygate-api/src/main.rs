//! Keygate API server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p keygate-api
//! ```
//!
//! Configuration is loaded from environment variables; a `.env` file is
//! honored when present.

use keygate_common::{telemetry, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Pick up a local .env before reading configuration
    dotenvy::dotenv().ok();

    // Load configuration
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    // Initialize tracing
    let tracing_config = TracingConfig::for_environment(config.environment);
    if let Err(e) = telemetry::try_init_tracing_with_config(tracing_config) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        environment = ?config.environment,
        address = %config.server.address(),
        "Configuration loaded"
    );

    // Run the server
    if let Err(e) = keygate_api::run(config).await {
        error!(error = %e, "Server failed to start");
        std::process::exit(1);
    }
}

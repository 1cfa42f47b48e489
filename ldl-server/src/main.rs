//! Long Distance Love backend - main entry point.

use anyhow::Result;
use ldl_common::config::Config;
use ldl_common::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    init_logging(
        &config.observability.log_level,
        &config.observability.log_format,
    );

    tracing::info!("Long Distance Love backend v{}", env!("CARGO_PKG_VERSION"));

    // Start the HTTP server
    ldl_server::start_server(&config).await
}

//! Google Images MCP Server
//!
//! Serves image search and download tools to a desktop AI assistant over
//! a persistent WebSocket connection.
//!
//! # Configuration
//! Set `GOOGLE_IMAGES_CONFIG_PATH` env var or configure in
//! `~/.google-images-mcp.toml`. `PORT` overrides the listening port.

use google_images_mcp::config::Config;
use google_images_mcp::{init, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init::init_tracing("google_images_mcp")?;

    tracing::info!("Starting Google Images MCP Server");

    let config = Config::load()?;
    tracing::info!(
        "Listening on port {}, downloads dir: {}",
        config.server.port,
        config.download.dir.display()
    );

    server::run(config).await?;

    tracing::info!("Server shutting down");
    Ok(())
}

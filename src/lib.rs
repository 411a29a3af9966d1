//! Google Images bridge server
//!
//! Lets a desktop AI assistant issue structured tool calls over a
//! persistent WebSocket connection: search Google Images by scraping the
//! HTML results page, download a chosen image to local disk, and tune the
//! search settings for the connection.
//!
//! # Usage as Library
//!
//! ```rust,ignore
//! use google_images_mcp::{config::Config, server};
//!
//! let config = Config::load()?;
//! server::run(config).await?;
//! ```
//!
//! # Configuration
//! Set `GOOGLE_IMAGES_CONFIG_PATH` env var or configure in
//! `~/.google-images-mcp.toml`. `PORT` overrides the listening port.

pub mod config;
pub mod dispatch;
pub mod download;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod init;
pub mod search;
pub mod server;
pub mod types;
pub mod util;

// Re-export the types most callers need
pub use config::Config;
pub use dispatch::Dispatcher;
pub use error::ToolError;
pub use types::{ImageRecord, ImageType, SearchSettings};

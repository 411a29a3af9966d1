//! Configuration loading for google-images-mcp
//!
//! Configuration is loaded from:
//! 1. Environment variable GOOGLE_IMAGES_CONFIG_PATH
//! 2. ~/.google-images-mcp.toml
//! 3. Default values
//!
//! The listening port can additionally be overridden with the PORT
//! environment variable.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::types::{ImageType, SearchSettings};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Default search settings handed to each new connection
    #[serde(default)]
    pub search: SearchConfig,
    /// Outbound HTTP configuration
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Download configuration
    #[serde(default)]
    pub download: DownloadConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Default search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Enable safe search by default
    #[serde(default = "default_true")]
    pub safe_search: bool,
    /// Image type filter applied by default
    #[serde(default = "default_image_type")]
    pub image_type: ImageType,
    /// Maximum number of results per page
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

/// Outbound HTTP configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// User-Agent header sent on every outbound request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

/// Download configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Directory downloaded images are written to, relative to the
    /// working directory unless absolute
    #[serde(default = "default_download_dir")]
    pub dir: PathBuf,
}

// Default value functions
fn default_port() -> u16 {
    8033
}

fn default_true() -> bool {
    true
}

fn default_image_type() -> ImageType {
    ImageType::All
}

fn default_max_results() -> usize {
    20
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/91.0.4472.124 Safari/537.36"
        .to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("downloads")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            safe_search: default_true(),
            image_type: default_image_type(),
            max_results: default_max_results(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            dir: default_download_dir(),
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::find_config_path();

        let mut config = if let Some(path) = config_path {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                let content = std::fs::read_to_string(&path)?;
                toml::from_str(&content)?
            } else {
                tracing::info!("Config file not found, using defaults");
                Self::default()
            }
        } else {
            tracing::info!("No config path available, using defaults");
            Self::default()
        };

        // Port from environment (highest priority)
        if let Ok(port) = std::env::var("PORT") {
            match port.parse() {
                Ok(port) => config.server.port = port,
                Err(_) => tracing::warn!("Ignoring unparseable PORT value: {}", port),
            }
        }

        Ok(config)
    }

    /// Find the configuration file path
    fn find_config_path() -> Option<PathBuf> {
        // 1. Check environment variable
        if let Ok(path) = std::env::var("GOOGLE_IMAGES_CONFIG_PATH") {
            return Some(PathBuf::from(path));
        }

        // 2. Check ~/.google-images-mcp.toml
        if let Ok(home) = std::env::var("HOME") {
            let path = PathBuf::from(home).join(".google-images-mcp.toml");
            return Some(path);
        }

        None
    }

    /// Initial search settings for a new connection
    pub fn session_defaults(&self) -> SearchSettings {
        SearchSettings {
            safe_search: self.search.safe_search,
            image_type: self.search.image_type,
            max_results: self.search.max_results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8033);
        assert!(config.search.safe_search);
        assert_eq!(config.search.image_type, ImageType::All);
        assert_eq!(config.search.max_results, 20);
        assert_eq!(config.fetch.timeout_seconds, 30);
        assert_eq!(config.download.dir, PathBuf::from("downloads"));
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 9000

            [search]
            image_type = "photo"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.search.image_type, ImageType::Photo);
        // Unspecified fields keep their defaults
        assert!(config.search.safe_search);
        assert_eq!(config.search.max_results, 20);
        assert_eq!(config.fetch.timeout_seconds, 30);
    }

    #[test]
    fn test_session_defaults_mirror_search_config() {
        let mut config = Config::default();
        config.search.safe_search = false;
        config.search.max_results = 5;

        let settings = config.session_defaults();
        assert!(!settings.safe_search);
        assert_eq!(settings.max_results, 5);
        assert_eq!(settings.image_type, ImageType::All);
    }
}

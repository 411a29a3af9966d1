//! Image download to the local downloads directory
//!
//! Files land under one fixed directory with no per-client namespacing;
//! two downloads generating a name in the same millisecond can collide.

use std::path::PathBuf;

use anyhow::Result;
use bytes::Bytes;

use crate::config::DownloadConfig;
use crate::fetch::Fetcher;
use crate::types::{DownloadMetadata, DownloadOutput};
use crate::util::{file_extension, format_file_size};

/// Fetches image bytes and writes them to disk
#[derive(Clone)]
pub struct DownloadService {
    fetcher: Fetcher,
    dir: PathBuf,
}

impl DownloadService {
    pub fn new(fetcher: Fetcher, config: &DownloadConfig) -> Self {
        Self {
            fetcher,
            dir: config.dir.clone(),
        }
    }

    /// Download `url` into the downloads directory. When `filename` is
    /// absent the name is synthesized from the current millisecond
    /// timestamp and the extension derived from the URL path.
    pub async fn download(&self, url: &str, filename: Option<String>) -> Result<DownloadOutput> {
        let (bytes, content_type) = self.fetcher.fetch_image(url).await?;
        self.store(url, bytes, content_type, filename).await
    }

    /// Write already-fetched bytes to the downloads directory, creating it
    /// if needed
    async fn store(
        &self,
        url: &str,
        bytes: Bytes,
        content_type: Option<String>,
        filename: Option<String>,
    ) -> Result<DownloadOutput> {
        let timestamp = chrono::Utc::now().timestamp_millis();
        let filename = filename
            .unwrap_or_else(|| format!("google-image-{}{}", timestamp, file_extension(url)));

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(&filename);
        tokio::fs::write(&path, &bytes).await?;

        tracing::info!(
            "Downloaded {} ({}) to {}",
            filename,
            format_file_size(bytes.len()),
            path.display()
        );

        Ok(DownloadOutput {
            success: true,
            filename,
            path: path.display().to_string(),
            size: bytes.len(),
            metadata: DownloadMetadata {
                content_type,
                timestamp,
            },
        })
    }
}

//! Outbound HTTP for search pages and image bytes
//!
//! One client, built once at startup with the configured timeout and
//! User-Agent. Browser-like headers are fixed: the search engine serves a
//! different (unscrapable) page shape to unknown agents. No retry, no
//! backoff; a non-2xx status is a hard failure for the call.

use anyhow::{anyhow, Result};
use bytes::Bytes;
use reqwest::Client;
use std::time::Duration;

use crate::config::FetchConfig;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
const REFERER: &str = "https://www.google.com/";

/// HTTP fetch service with a configurable client
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Create a new Fetcher with the given configuration
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self { client })
    }

    /// Fetch a search results page and return its HTML
    pub async fn fetch_search_page(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .header("Accept", ACCEPT_HTML)
            .header("Accept-Language", ACCEPT_LANGUAGE)
            .header("Referer", REFERER)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("HTTP error! Status: {}", status.as_u16()));
        }

        Ok(response.text().await?)
    }

    /// Fetch raw image bytes, returning the body and the Content-Type
    /// header when the server sent one
    pub async fn fetch_image(&self, url: &str) -> Result<(Bytes, Option<String>)> {
        let response = self
            .client
            .get(url)
            .header("Referer", REFERER)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("HTTP error! Status: {}", status.as_u16()));
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let bytes = response.bytes().await?;
        Ok((bytes, content_type))
    }
}

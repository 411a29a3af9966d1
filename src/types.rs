//! Common types for image search results and tool outputs
//!
//! These types define the JSON shapes that cross the wire, so field names
//! follow the protocol's camelCase convention where it applies.

use serde::{Deserialize, Serialize};

/// A single image extracted from a search results page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Direct URL of the image
    pub url: String,
    /// Title of the image as shown on the results page
    pub title: String,
    /// URL of the page the image was found on
    pub source: String,
    /// Thumbnail URL; the results page exposes no separate thumbnail,
    /// so this always equals `url`
    pub thumbnail: String,
}

/// Image type filter accepted by the search engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageType {
    All,
    Photo,
    Clipart,
    Lineart,
    Animated,
}

impl ImageType {
    /// Parse a filter value, returning `None` for anything outside the
    /// accepted set (the caller decides whether that fails open or closed)
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "all" => Some(Self::All),
            "photo" => Some(Self::Photo),
            "clipart" => Some(Self::Clipart),
            "lineart" => Some(Self::Lineart),
            "animated" => Some(Self::Animated),
            _ => None,
        }
    }

    /// The `itp:` token this type contributes to the search URL, if any
    pub fn filter_token(&self) -> Option<&'static str> {
        match self {
            Self::All => None,
            Self::Photo => Some("itp:photo"),
            Self::Clipart => Some("itp:clipart"),
            Self::Lineart => Some("itp:lineart"),
            Self::Animated => Some("itp:animated"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Photo => "photo",
            Self::Clipart => "clipart",
            Self::Lineart => "lineart",
            Self::Animated => "animated",
        }
    }
}

/// Tunable search settings, scoped to one connection
///
/// Each WebSocket connection starts from the configured defaults and may
/// overwrite these via the config tool; later search calls on the same
/// connection use them as parameter defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSettings {
    pub safe_search: bool,
    pub image_type: ImageType,
    pub max_results: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            safe_search: true,
            image_type: ImageType::All,
            max_results: 20,
        }
    }
}

/// Filters echoed back in search result metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedFilters {
    pub safe_search: bool,
    pub image_type: ImageType,
}

/// Metadata attached to a successful search response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMetadata {
    /// The sanitized query that was actually sent
    pub query: String,
    pub page: u32,
    pub total_results: usize,
    /// Heuristic: true iff the returned count equals the page size. An
    /// exact-multiple result count is indistinguishable from "more exists";
    /// downstream pagination depends on exactly this approximation.
    pub has_more: bool,
    pub filters: AppliedFilters,
}

/// Successful search result payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutput {
    pub results: Vec<ImageRecord>,
    pub metadata: SearchMetadata,
}

/// Metadata attached to a completed download
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadMetadata {
    pub content_type: Option<String>,
    /// Unix milliseconds at download time
    pub timestamp: i64,
}

/// Successful download result payload
///
/// Describes a side effect that already completed: the file is on disk by
/// the time this is produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadOutput {
    pub success: bool,
    pub filename: String,
    pub path: String,
    pub size: usize,
    pub metadata: DownloadMetadata,
}

/// Snapshot returned by the config tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigOutput {
    pub success: bool,
    pub config: SearchSettings,
}

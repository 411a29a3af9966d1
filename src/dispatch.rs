//! Tool dispatcher
//!
//! Maps a named tool invocation onto the search, download, or config path
//! and always produces either a result object or an embedded
//! `{ "error": { code, message } }` object, mirroring the wire contract.
//! Parameter handling is deliberately lenient everywhere except the two
//! required fields: ill-typed optional fields fall back to the session's
//! current settings, and an unrecognized image type contributes no filter
//! token rather than failing the call.

use std::sync::Arc;

use serde_json::{json, Map, Value};
use tokio::sync::RwLock;

use crate::config::Config;
use crate::download::DownloadService;
use crate::error::ToolError;
use crate::extract::PatternExtractor;
use crate::fetch::Fetcher;
use crate::search::SearchService;
use crate::types::{ImageType, SearchSettings};

pub const TOOL_SEARCH: &str = "google_images_search";
pub const TOOL_DOWNLOAD: &str = "google_images_download";
pub const TOOL_CONFIG: &str = "google_images_config";

/// Search settings scoped to one connection, shared by the invocations
/// in flight on it
pub type Session = Arc<RwLock<SearchSettings>>;

/// Per-call search parameters after merging with the session settings
#[derive(Debug, PartialEq, Eq)]
struct SearchRequest {
    page: u32,
    safe_search: bool,
    image_type: ImageType,
    max_results: usize,
}

/// Merge optional per-call parameters with the session's settings.
/// Ill-typed or out-of-range values fall back rather than failing the
/// call; an unrecognized image type is treated as "all" so it contributes
/// no filter token.
fn resolve_search_request(params: &Map<String, Value>, settings: &SearchSettings) -> SearchRequest {
    let page = params
        .get("page")
        .and_then(Value::as_u64)
        .and_then(|p| u32::try_from(p).ok())
        .filter(|p| *p >= 1)
        .unwrap_or(1);
    let safe_search = params
        .get("safeSearch")
        .and_then(Value::as_bool)
        .unwrap_or(settings.safe_search);
    let image_type = params
        .get("imageType")
        .and_then(Value::as_str)
        .map(|s| ImageType::parse(s).unwrap_or(ImageType::All))
        .unwrap_or(settings.image_type);
    let max_results = params
        .get("maxResults")
        .and_then(Value::as_u64)
        .filter(|n| *n > 0)
        .map(|n| n as usize)
        .unwrap_or(settings.max_results);

    SearchRequest {
        page,
        safe_search,
        image_type,
        max_results,
    }
}

/// Dispatches tool invocations to the underlying services
#[derive(Clone)]
pub struct Dispatcher {
    search: SearchService,
    download: DownloadService,
}

impl Dispatcher {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let fetcher = Fetcher::new(&config.fetch)?;
        let search = SearchService::new(fetcher.clone(), Arc::new(PatternExtractor::new()));
        let download = DownloadService::new(fetcher, &config.download);

        Ok(Self { search, download })
    }

    /// Run one tool invocation. The returned value is always a well-formed
    /// result object; failures are embedded, never raised.
    pub async fn invoke(&self, tool: &str, params: Value, session: &Session) -> Value {
        let outcome = match tool {
            TOOL_SEARCH => self.handle_search(params, session).await,
            TOOL_DOWNLOAD => self.handle_download(params).await,
            TOOL_CONFIG => Ok(self.handle_config(params, session).await),
            other => Err(ToolError::UnsupportedTool(other.to_string())),
        };

        match outcome {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("Tool '{}' failed: {} ({})", tool, e, e.code());
                e.to_value()
            }
        }
    }

    async fn handle_search(&self, params: Value, session: &Session) -> Result<Value, ToolError> {
        let params = params.as_object().cloned().unwrap_or_default();

        let Some(query) = params.get("query").and_then(Value::as_str) else {
            return Err(ToolError::InvalidParams(
                "Search query is required".to_string(),
            ));
        };

        let settings = session.read().await.clone();
        let request = resolve_search_request(&params, &settings);

        let output = self
            .search
            .search(
                query,
                request.page,
                request.safe_search,
                request.image_type,
                request.max_results,
            )
            .await
            .map_err(|e| ToolError::Search(e.to_string()))?;

        serde_json::to_value(output).map_err(|e| ToolError::Internal(e.to_string()))
    }

    async fn handle_download(&self, params: Value) -> Result<Value, ToolError> {
        let params = params.as_object().cloned().unwrap_or_default();

        let Some(url) = params.get("url").and_then(Value::as_str) else {
            return Err(ToolError::InvalidParams(
                "Image URL is required".to_string(),
            ));
        };

        let filename = params
            .get("filename")
            .and_then(Value::as_str)
            .map(|s| s.to_string());

        let output = self
            .download
            .download(url, filename)
            .await
            .map_err(|e| ToolError::Download(e.to_string()))?;

        serde_json::to_value(output).map_err(|e| ToolError::Internal(e.to_string()))
    }

    /// Apply the fields that are present and valid; silently ignore the
    /// rest. Never fails.
    async fn handle_config(&self, params: Value, session: &Session) -> Value {
        let params = params.as_object().cloned().unwrap_or_default();
        let mut settings = session.write().await;

        if let Some(safe_search) = params.get("safeSearch").and_then(Value::as_bool) {
            settings.safe_search = safe_search;
        }

        if let Some(image_type) = params
            .get("imageType")
            .and_then(Value::as_str)
            .and_then(ImageType::parse)
        {
            settings.image_type = image_type;
        }

        if let Some(max_results) = params
            .get("maxResults")
            .and_then(Value::as_u64)
            .filter(|n| *n > 0)
        {
            settings.max_results = max_results as usize;
        }

        json!({
            "success": true,
            "config": &*settings,
        })
    }

    /// The capability advertisement sent once per connection. Hard-coded:
    /// these three tools are the whole surface.
    pub fn capabilities() -> Value {
        json!({
            "tools": [
                {
                    "name": TOOL_SEARCH,
                    "description": "Search for images on Google Images",
                    "parameters": {
                        "type": "object",
                        "properties": {
                            "query": {
                                "type": "string",
                                "description": "The search query"
                            },
                            "page": {
                                "type": "integer",
                                "description": "Page number (starting from 1)",
                                "default": 1
                            },
                            "safeSearch": {
                                "type": "boolean",
                                "description": "Enable or disable safe search",
                                "default": true
                            },
                            "imageType": {
                                "type": "string",
                                "description": "Filter by image type",
                                "enum": ["all", "photo", "clipart", "lineart", "animated"],
                                "default": "all"
                            },
                            "maxResults": {
                                "type": "integer",
                                "description": "Maximum number of results to return",
                                "default": 20
                            }
                        },
                        "required": ["query"]
                    }
                },
                {
                    "name": TOOL_DOWNLOAD,
                    "description": "Download an image from a URL",
                    "parameters": {
                        "type": "object",
                        "properties": {
                            "url": {
                                "type": "string",
                                "description": "URL of the image to download"
                            },
                            "filename": {
                                "type": "string",
                                "description": "Name to save the file as (optional)"
                            }
                        },
                        "required": ["url"]
                    }
                },
                {
                    "name": TOOL_CONFIG,
                    "description": "Configure Google Images search settings",
                    "parameters": {
                        "type": "object",
                        "properties": {
                            "safeSearch": {
                                "type": "boolean",
                                "description": "Enable or disable safe search"
                            },
                            "imageType": {
                                "type": "string",
                                "description": "Filter by image type",
                                "enum": ["all", "photo", "clipart", "lineart", "animated"]
                            },
                            "maxResults": {
                                "type": "integer",
                                "description": "Maximum number of results per page"
                            }
                        }
                    }
                }
            ]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(&Config::default()).unwrap()
    }

    fn session() -> Session {
        Arc::new(RwLock::new(SearchSettings::default()))
    }

    #[tokio::test]
    async fn test_search_missing_query_is_invalid_params() {
        let result = dispatcher()
            .invoke(TOOL_SEARCH, json!({}), &session())
            .await;
        assert_eq!(result["error"]["code"], "invalid_params");
    }

    #[tokio::test]
    async fn test_search_non_string_query_is_invalid_params() {
        let result = dispatcher()
            .invoke(TOOL_SEARCH, json!({ "query": 42 }), &session())
            .await;
        assert_eq!(result["error"]["code"], "invalid_params");
    }

    #[tokio::test]
    async fn test_download_missing_url_is_invalid_params() {
        let result = dispatcher()
            .invoke(TOOL_DOWNLOAD, json!({ "filename": "x.jpg" }), &session())
            .await;
        assert_eq!(result["error"]["code"], "invalid_params");
    }

    #[tokio::test]
    async fn test_unknown_tool_is_unsupported() {
        let result = dispatcher()
            .invoke("frobnicate", json!({}), &session())
            .await;
        assert_eq!(result["error"]["code"], "unsupported_tool");
        assert!(result["error"]["message"]
            .as_str()
            .unwrap()
            .contains("frobnicate"));
    }

    #[tokio::test]
    async fn test_config_updates_valid_fields() {
        let session = session();
        let result = dispatcher()
            .invoke(
                TOOL_CONFIG,
                json!({ "safeSearch": false, "imageType": "photo", "maxResults": 5 }),
                &session,
            )
            .await;

        assert_eq!(result["success"], true);
        assert_eq!(result["config"]["safeSearch"], false);
        assert_eq!(result["config"]["imageType"], "photo");
        assert_eq!(result["config"]["maxResults"], 5);

        let settings = session.read().await;
        assert!(!settings.safe_search);
        assert_eq!(settings.image_type, ImageType::Photo);
        assert_eq!(settings.max_results, 5);
    }

    #[tokio::test]
    async fn test_config_ignores_invalid_image_type() {
        let session = session();
        let result = dispatcher()
            .invoke(TOOL_CONFIG, json!({ "imageType": "vector" }), &session)
            .await;

        // Invalid fields are ignored, not rejected
        assert_eq!(result["success"], true);
        assert_eq!(result["config"]["imageType"], "all");
        assert_eq!(session.read().await.image_type, ImageType::All);
    }

    #[tokio::test]
    async fn test_config_rejects_non_positive_max_results() {
        let session = session();
        let dispatcher = dispatcher();

        dispatcher
            .invoke(TOOL_CONFIG, json!({ "maxResults": 5 }), &session)
            .await;
        let result = dispatcher
            .invoke(TOOL_CONFIG, json!({ "maxResults": 0 }), &session)
            .await;

        // Zero is not a positive integer; the stored value stays at 5
        assert_eq!(result["config"]["maxResults"], 5);
        assert_eq!(session.read().await.max_results, 5);
    }

    #[tokio::test]
    async fn test_config_ignores_ill_typed_fields() {
        let session = session();
        let result = dispatcher()
            .invoke(
                TOOL_CONFIG,
                json!({ "safeSearch": "yes", "maxResults": 2.5 }),
                &session,
            )
            .await;

        assert_eq!(result["success"], true);
        let settings = session.read().await;
        assert!(settings.safe_search);
        assert_eq!(settings.max_results, 20);
    }

    #[tokio::test]
    async fn test_config_with_non_object_params_never_fails() {
        let result = dispatcher()
            .invoke(TOOL_CONFIG, json!("not an object"), &session())
            .await;
        assert_eq!(result["success"], true);
    }

    fn resolve(params: Value) -> SearchRequest {
        let params = params.as_object().cloned().unwrap_or_default();
        resolve_search_request(&params, &SearchSettings::default())
    }

    #[test]
    fn test_resolve_defaults_from_session() {
        let request = resolve(json!({}));
        assert_eq!(
            request,
            SearchRequest {
                page: 1,
                safe_search: true,
                image_type: ImageType::All,
                max_results: 20,
            }
        );
    }

    #[test]
    fn test_resolve_page_out_of_range_falls_back_to_one() {
        // A value past u32::MAX must not wrap around to a small page
        let request = resolve(json!({ "query": "cats", "page": u64::from(u32::MAX) + 2 }));
        assert_eq!(request.page, 1);

        let request = resolve(json!({ "query": "cats", "page": 0 }));
        assert_eq!(request.page, 1);

        let request = resolve(json!({ "query": "cats", "page": 3 }));
        assert_eq!(request.page, 3);
    }

    #[test]
    fn test_resolve_unrecognized_image_type_fails_open() {
        let request = resolve(json!({ "query": "cats", "imageType": "vector" }));
        assert_eq!(request.image_type, ImageType::All);
    }

    #[test]
    fn test_capabilities_lists_three_tools() {
        let caps = Dispatcher::capabilities();
        let tools = caps["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 3);

        let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec![TOOL_SEARCH, TOOL_DOWNLOAD, TOOL_CONFIG]);

        assert_eq!(tools[0]["parameters"]["required"], json!(["query"]));
        assert_eq!(tools[1]["parameters"]["required"], json!(["url"]));
        assert!(tools[2]["parameters"].get("required").is_none());
    }
}

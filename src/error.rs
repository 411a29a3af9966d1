//! Tool error taxonomy
//!
//! Every tool failure is converted to a structured error object at the
//! operation boundary; nothing crosses the connection unhandled. The codes
//! here are part of the wire contract.

use serde_json::{json, Value};
use thiserror::Error;

/// Errors a tool invocation can produce
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{0}")]
    InvalidParams(String),

    #[error("Failed to search Google Images: {0}")]
    Search(String),

    #[error("Failed to download image: {0}")]
    Download(String),

    #[error("Tool '{0}' is not supported")]
    UnsupportedTool(String),

    #[error("{0}")]
    Internal(String),
}

impl ToolError {
    /// Machine-readable error code sent to clients
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidParams(_) => "invalid_params",
            Self::Search(_) => "search_error",
            Self::Download(_) => "download_error",
            Self::UnsupportedTool(_) => "unsupported_tool",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Render as the `{ "error": { code, message } }` result object
    pub fn to_value(&self) -> Value {
        json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ToolError::InvalidParams("x".into()).code(), "invalid_params");
        assert_eq!(ToolError::Search("x".into()).code(), "search_error");
        assert_eq!(ToolError::Download("x".into()).code(), "download_error");
        assert_eq!(
            ToolError::UnsupportedTool("x".into()).code(),
            "unsupported_tool"
        );
        assert_eq!(ToolError::Internal("x".into()).code(), "internal_error");
    }

    #[test]
    fn test_error_value_shape() {
        let value = ToolError::UnsupportedTool("frobnicate".into()).to_value();
        assert_eq!(value["error"]["code"], "unsupported_tool");
        assert!(value["error"]["message"]
            .as_str()
            .unwrap()
            .contains("frobnicate"));
    }
}

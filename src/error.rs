//! Error types for jirabridge

use std::path::PathBuf;
use thiserror::Error;

/// Bridge error type
#[derive(Error, Debug)]
pub enum BridgeError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error (missing file, missing base URL, bad value)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed JSON in a config or cookie file
    #[error("Invalid JSON in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport failure from the HTTP client
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response from Jira
    #[error("{status} for url: {url}{}", body_suffix(.body))]
    Status {
        status: reqwest::StatusCode,
        url: String,
        body: String,
    },

    /// Tool call before a successful bootstrap
    #[error("Manager not initialized")]
    NotInitialized,

    /// Tool name not present in the registry
    #[error("Tool not implemented: {0}")]
    UnknownTool(String),

    /// Required tool argument absent
    #[error("Missing required parameter: {0}")]
    MissingParam(String),

    /// Tool argument present but unusable
    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    /// Lookup inside a Jira response came up empty
    #[error("{0} not found")]
    NotFound(String),
}

fn body_suffix(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        String::new()
    } else {
        let snippet: String = body.chars().take(300).collect();
        format!(" ({})", snippet)
    }
}

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readiness_messages_are_exact() {
        assert_eq!(
            BridgeError::NotInitialized.to_string(),
            "Manager not initialized"
        );
        assert_eq!(
            BridgeError::UnknownTool("jira_frobnicate".into()).to_string(),
            "Tool not implemented: jira_frobnicate"
        );
    }

    #[test]
    fn test_status_error_includes_trimmed_body() {
        let err = BridgeError::Status {
            status: reqwest::StatusCode::NOT_FOUND,
            url: "https://jira.example.com/rest/api/2/issue/X-1".into(),
            body: "  {\"errorMessages\":[\"Issue does not exist\"]}\n".into(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("404 Not Found for url: https://jira.example.com"));
        assert!(msg.ends_with("({\"errorMessages\":[\"Issue does not exist\"]})"));
    }
}

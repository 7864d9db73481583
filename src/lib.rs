//! jirabridge - MCP server that drives Jira's REST API with browser session cookies
//!
//! This crate provides:
//! - Cookie file format detection and extraction (cookie-manager files,
//!   browser exports, HAR captures, nested and unknown layouts)
//! - Session bootstrap: base URL resolution and browser-like default headers
//! - A data-driven registry of Jira tools
//! - An MCP server speaking JSON-RPC 2.0 over stdio
//!
//! # Usage
//!
//! As a library:
//! ```ignore
//! use jirabridge::jira::{JiraManager, Sources};
//!
//! let mut manager = JiraManager::new(Sources::default());
//! manager.initialize().await?;
//! let issue = manager
//!     .execute_tool("jira_get_issue", &serde_json::json!({"issue_key": "PROJ-1"}))
//!     .await;
//! ```
//!
//! As a standalone server (CLI):
//! ```text
//! jirabridge --config jira_config.json --cookies cookies.json
//! ```

pub mod config;
pub mod cookies;
pub mod error;
pub mod jira;
pub mod mcp;
pub mod session;

// Re-export main types for convenience
pub use config::{Config, Settings};
pub use cookies::{detect, read_cookies, CookieFormat, CookieSet, Extraction};
pub use error::{BridgeError, Result};
pub use jira::{JiraClient, JiraManager, Sources};
pub use session::{bootstrap, SessionContext};

//! Jira session management and tool execution

pub mod client;
pub mod invoke;
pub mod tools;

pub use client::JiraClient;
pub use tools::{ToolSpec, TOOLS};

use crate::config::{self, Config};
use crate::cookies;
use crate::error::{BridgeError, Result};
use crate::session;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

/// Where the manager looks for its configuration and cookies.
/// `None` falls back to environment variables and well-known file names.
#[derive(Debug, Clone, Default)]
pub struct Sources {
    pub config_file: Option<PathBuf>,
    pub cookie_file: Option<PathBuf>,
}

/// Load the configuration file, or defaults when none is found.
///
/// An explicitly named file that does not exist is an error.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let mut config = match config::find_config_file(explicit) {
        Some(path) => {
            let config = Config::from_file(&path)?;
            tracing::info!("Loaded configuration from {}", path.display());
            config
        }
        None => {
            tracing::warn!("No configuration file found, using defaults and environment");
            Config::default()
        }
    };
    config.apply_env_overrides();
    Ok(config)
}

/// Read config and cookies, bootstrap a session and build its client
pub fn open_session(sources: &Sources) -> Result<JiraClient> {
    let config = load_config(sources.config_file.as_deref())?;

    let cookie_path = config::find_cookie_file(sources.cookie_file.as_deref(), &config)
        .ok_or_else(|| {
            BridgeError::Config(format!(
                "No cookie file found (pass --cookies, set {}, or add cookie_file to the config)",
                config::COOKIE_FILE_ENV
            ))
        })?;
    let (document, extraction) = cookies::load_cookie_file(&cookie_path)?;

    let ctx = session::bootstrap(
        extraction.cookies,
        config.jira_base_url(),
        &config.headers,
        &document,
    )?;
    JiraClient::connect(&ctx, &config.settings)
}

/// Owns the live Jira session, if any, and runs tools against it
pub struct JiraManager {
    sources: Sources,
    client: Option<JiraClient>,
}

impl JiraManager {
    pub fn new(sources: Sources) -> Self {
        Self {
            sources,
            client: None,
        }
    }

    /// Manager that is ready immediately with the given client
    pub fn with_client(client: JiraClient) -> Self {
        Self {
            sources: Sources::default(),
            client: Some(client),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.client.is_some()
    }

    pub fn client(&self) -> Option<&JiraClient> {
        self.client.as_ref()
    }

    /// (Re)load the session from disk. On failure the manager is left not ready.
    pub async fn initialize(&mut self) -> Result<()> {
        self.client = None;

        let client = open_session(&self.sources)?;
        if client.settings().verify_connection {
            let me = client.myself().await?;
            tracing::info!(
                "Connected to {} as {}",
                client.base_url(),
                me.get("displayName")
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or("unknown user")
            );
        }

        self.client = Some(client);
        Ok(())
    }

    /// Run a tool. Every failure is reported as `{"error": message}`.
    pub async fn execute_tool(&self, name: &str, arguments: &Value) -> Value {
        match self.try_execute(name, arguments).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("Tool {} failed: {}", name, e);
                json!({"error": e.to_string()})
            }
        }
    }

    async fn try_execute(&self, name: &str, arguments: &Value) -> Result<Value> {
        let spec = tools::find(name).ok_or_else(|| BridgeError::UnknownTool(name.to_string()))?;
        let client = self.client.as_ref().ok_or(BridgeError::NotInitialized)?;
        let args = tools::Args::bind(spec.params, arguments)?;

        tracing::debug!("Running tool {}", name);
        invoke::invoke(client, spec, &args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jira::client::tests::{client_for, serve_fake};
    use crate::jira::invoke::tests::fake_jira;
    use axum::http::StatusCode;
    use axum::Router;
    use std::fs;

    fn write_files(dir: &Path, base_url: &str, verify: bool) -> Sources {
        let config_path = dir.join("jira_config.json");
        let cookie_path = dir.join("cookies.json");
        fs::write(
            &config_path,
            json!({
                "jira_url": base_url,
                "settings": {
                    "request_delay_ms": 0,
                    "post_request_delay_ms": 0,
                    "verify_connection": verify
                }
            })
            .to_string(),
        )
        .unwrap();
        fs::write(
            &cookie_path,
            json!({"cookies": {"JIRASESSIONID": "abc", "seraph.rememberme.cookie": "x"}})
                .to_string(),
        )
        .unwrap();
        Sources {
            config_file: Some(config_path),
            cookie_file: Some(cookie_path),
        }
    }

    #[tokio::test]
    async fn test_tool_before_initialize() {
        let manager = JiraManager::new(Sources::default());
        assert!(!manager.is_ready());

        let result = manager
            .execute_tool("jira_get_issue", &json!({"issue_key": "PROJ-1"}))
            .await;
        assert_eq!(result, json!({"error": "Manager not initialized"}));
    }

    #[tokio::test]
    async fn test_unknown_tool_reported_first() {
        let manager = JiraManager::new(Sources::default());
        let result = manager.execute_tool("jira_nope", &json!({})).await;
        assert_eq!(result, json!({"error": "Tool not implemented: jira_nope"}));
    }

    #[tokio::test]
    async fn test_missing_argument_envelope() {
        let manager = JiraManager::with_client(client_for("https://jira.example.com", &[]));
        let result = manager.execute_tool("jira_get_issue", &json!({})).await;
        assert_eq!(
            result,
            json!({"error": "Missing required parameter: issue_key"})
        );
    }

    #[tokio::test]
    async fn test_initialize_from_files_and_run_tool() {
        let (base, log) = fake_jira().await;
        let dir = tempfile::tempdir().unwrap();
        let mut manager = JiraManager::new(write_files(dir.path(), &base, true));

        manager.initialize().await.unwrap();
        assert!(manager.is_ready());
        assert!(manager
            .client()
            .unwrap()
            .cookie_header()
            .unwrap()
            .contains("JIRASESSIONID=abc"));

        // The connection check went out first
        assert_eq!(log.lock().unwrap()[0].1, "/rest/api/2/myself");

        let result = manager
            .execute_tool("jira_get_issue", &json!({"issue_key": "PROJ-1"}))
            .await;
        assert_eq!(result["key"], "PROJ-1");
    }

    #[tokio::test]
    async fn test_status_error_becomes_envelope() {
        let (base, _) = fake_jira().await;
        let dir = tempfile::tempdir().unwrap();
        let mut manager = JiraManager::new(write_files(dir.path(), &base, false));
        manager.initialize().await.unwrap();

        let result = manager
            .execute_tool("jira_get_issue", &json!({"issue_key": "MISSING-1"}))
            .await;
        let message = result["error"].as_str().unwrap();
        assert!(message.starts_with("404 Not Found"));
    }

    #[tokio::test]
    async fn test_failed_verification_leaves_manager_not_ready() {
        let app = Router::new().fallback(|| async { StatusCode::UNAUTHORIZED });
        let base = serve_fake(app).await;
        let dir = tempfile::tempdir().unwrap();
        let mut manager = JiraManager::new(write_files(dir.path(), &base, true));

        let err = manager.initialize().await.unwrap_err();
        assert!(err.to_string().starts_with("401 Unauthorized"));
        assert!(!manager.is_ready());
    }

    #[tokio::test]
    async fn test_missing_cookie_file_fails_initialize() {
        let dir = tempfile::tempdir().unwrap();
        let mut sources = write_files(dir.path(), "https://jira.example.com", false);
        sources.cookie_file = Some(dir.path().join("absent.json"));

        let mut manager = JiraManager::new(sources);
        let err = manager.initialize().await.unwrap_err();
        assert!(matches!(err, BridgeError::Config(_)));
        assert!(!manager.is_ready());
    }

    #[test]
    fn test_explicit_missing_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("nope.json"))).unwrap_err();
        assert!(err.to_string().contains("Configuration file not found"));
    }
}

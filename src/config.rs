//! Configuration management for jirabridge
//!
//! Loads settings from a JSON file discovered by convention (see [`find_config_file`])
//! and resolves the cookie file the session is bootstrapped from.

use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Environment variable naming the config file
pub const CONFIG_FILE_ENV: &str = "JIRA_CONFIG_FILE";

/// Environment variable naming the cookie file
pub const COOKIE_FILE_ENV: &str = "JIRA_COOKIE_FILE";

/// Config file names tried in each search directory, in order
pub const CONFIG_CANDIDATES: &[&str] = &[
    "jira_config.json",
    "config.json",
    "atlassian_config.json",
    ".jira_config.json",
];

/// Cookie file names tried in each search directory, in order
pub const COOKIE_CANDIDATES: &[&str] = &[
    "production_cookies.json",
    "cookies.json",
    "jira_cookies.json",
    "auth.json",
    ".cookies.json",
];

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Jira base URL. `url`, `base_url` and `server_url` are accepted as
    /// fallbacks, first present wins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jira_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,

    /// Extra request headers, applied over the browser defaults
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Cookie file location (also accepted as `cookies_file` / `auth_file`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookies_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_file: Option<PathBuf>,

    /// Request behaviour
    #[serde(default)]
    pub settings: Settings,
}

/// Request timing and connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Per-request timeout (default: 30)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Pause before each outbound request (default: 200)
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Pause after each outbound request (default: 75)
    #[serde(default = "default_post_request_delay_ms")]
    pub post_request_delay_ms: u64,

    /// Call /rest/api/2/myself during initialize and stay not-ready on failure
    #[serde(default = "default_true")]
    pub verify_connection: bool,
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_request_delay_ms() -> u64 {
    200
}

fn default_post_request_delay_ms() -> u64 {
    75
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            request_delay_ms: default_request_delay_ms(),
            post_request_delay_ms: default_post_request_delay_ms(),
            verify_connection: default_true(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = expand_path(path.as_ref());

        if !path.exists() {
            return Err(BridgeError::Config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(&path)?;
        serde_json::from_str(&content).map_err(|source| BridgeError::Parse { path, source })
    }

    /// First non-blank base URL among `jira_url`, `url`, `base_url`, `server_url`
    pub fn jira_base_url(&self) -> Option<&str> {
        [&self.jira_url, &self.url, &self.base_url, &self.server_url]
            .into_iter()
            .filter_map(|v| v.as_deref())
            .map(str::trim)
            .find(|v| !v.is_empty())
    }

    /// Cookie file named by the config, if any
    pub fn cookie_file_hint(&self) -> Option<PathBuf> {
        [&self.cookie_file, &self.cookies_file, &self.auth_file]
            .into_iter()
            .flatten()
            .next()
            .map(|p| expand_path(p))
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("JIRA_URL") {
            if !url.trim().is_empty() {
                self.jira_url = Some(url);
            }
        }
        if let Ok(timeout) = std::env::var("JIRA_TIMEOUT_SECONDS") {
            match timeout.parse() {
                Ok(secs) => self.settings.timeout_seconds = secs,
                Err(_) => tracing::warn!("Ignoring invalid JIRA_TIMEOUT_SECONDS: {}", timeout),
            }
        }
    }

    /// Create a sample configuration file at the given path
    pub fn create_default<P: AsRef<Path>>(path: P) -> Result<()> {
        let sample = serde_json::json!({
            "jira_url": "https://jira.example.com",
            "cookie_file": "cookies.json",
            "headers": {},
            "settings": {
                "timeout_seconds": default_timeout_seconds(),
                "request_delay_ms": default_request_delay_ms(),
                "post_request_delay_ms": default_post_request_delay_ms(),
                "verify_connection": true
            }
        });

        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, serde_json::to_string_pretty(&sample)?)?;

        Ok(())
    }
}

/// Directories searched for convention-named files: executable dir, then cwd
pub fn search_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
    {
        dirs.push(exe_dir);
    }
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.contains(&cwd) {
            dirs.push(cwd);
        }
    }
    dirs
}

/// First existing `dir/name`, trying every name in each directory before moving on
pub fn locate(dirs: &[PathBuf], names: &[&str]) -> Option<PathBuf> {
    dirs.iter()
        .flat_map(|dir| names.iter().map(move |name| dir.join(name)))
        .find(|candidate| candidate.is_file())
}

/// Resolve the config file: explicit path, `JIRA_CONFIG_FILE`, then candidates
pub fn find_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(expand_path(path));
    }
    if let Some(path) = env_path(CONFIG_FILE_ENV) {
        return Some(path);
    }
    locate(&search_dirs(), CONFIG_CANDIDATES)
}

/// Resolve the cookie file: explicit path, `JIRA_COOKIE_FILE`, config keys, then candidates
pub fn find_cookie_file(explicit: Option<&Path>, config: &Config) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(expand_path(path));
    }
    if let Some(path) = env_path(COOKIE_FILE_ENV) {
        return Some(path);
    }
    if let Some(path) = config.cookie_file_hint() {
        return Some(path);
    }
    locate(&search_dirs(), COOKIE_CANDIDATES)
}

fn env_path(var: &str) -> Option<PathBuf> {
    std::env::var(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(|v| expand_path(Path::new(&v)))
}

/// Expand ~ to home directory in paths
pub fn expand_path(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}

//! Cookie file handling
//!
//! Reads browser/devtools cookie exports in several shapes, flattens them into
//! a [`CookieSet`], and writes them back out in the cookie-manager layout the
//! server prefers.

pub mod detect;
pub mod extract;

pub use detect::{detect, CookieFormat};
pub use extract::{extract, read_cookies, Extraction};

use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Cookie name to value
pub type CookieSet = BTreeMap<String, String>;

/// Cookie Jira needs for an authenticated session
pub const CRITICAL_COOKIE: &str = "JIRASESSIONID";

/// Cookies listed first when showing a cookie set
pub const PRIORITY_COOKIES: &[&str] = &["JIRASESSIONID", "atlassian.xsrf.token", "AWSALBAPP-0"];

/// Read and parse a cookie document
pub fn load_document(path: &Path) -> Result<Value> {
    if !path.is_file() {
        return Err(BridgeError::Config(format!(
            "Cookie file not found: {}",
            path.display()
        )));
    }
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|source| BridgeError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a cookie file, logging what was found
pub fn load_cookie_file(path: &Path) -> Result<(Value, Extraction)> {
    let doc = load_document(path)?;
    let extraction = read_cookies(&doc);

    tracing::info!(
        "Loaded {} cookies from {} (format: {})",
        extraction.cookies.len(),
        path.display(),
        extraction.format
    );
    for at in &extraction.found_at {
        tracing::debug!("Found cookies at: {}", at);
    }
    for warning in &extraction.warnings {
        tracing::warn!("Cookie file {}: {}", path.display(), warning);
    }
    if !extraction.cookies.contains_key(CRITICAL_COOKIE) {
        tracing::warn!("Critical cookie {} is missing", CRITICAL_COOKIE);
    }

    Ok((doc, extraction))
}

/// Cookie file in the cookie-manager layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedCookies {
    pub cookies: CookieSet,
    /// Unix seconds when the file was written
    pub timestamp: f64,
    pub domain: Option<String>,
    /// RFC 3339 time of the last refresh
    pub last_refresh: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_detected: Option<String>,
}

impl SavedCookies {
    pub fn new(cookies: CookieSet, domain: Option<String>) -> Self {
        let now = chrono::Utc::now();
        Self {
            cookies,
            timestamp: now.timestamp_millis() as f64 / 1000.0,
            domain,
            last_refresh: now.to_rfc3339(),
            source_file: None,
            format_detected: None,
        }
    }

    /// Record where the cookies came from
    pub fn with_source(mut self, source: &Path, format: CookieFormat) -> Self {
        self.source_file = Some(source.display().to_string());
        self.format_detected = Some(format.as_str().to_string());
        self
    }

    /// Write as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Default output path for a converted file: `cookies.json` beside the source,
/// or `<stem>.converted.json` when the source already has that name
pub fn default_output_path(source: &Path) -> PathBuf {
    let target = source
        .parent()
        .map(|dir| dir.join("cookies.json"))
        .unwrap_or_else(|| PathBuf::from("cookies.json"));
    if target == source {
        source.with_extension("converted.json")
    } else {
        target
    }
}

/// Shorten a cookie value for display
pub fn mask_value(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() > 30 {
        let head: String = chars[..10].iter().collect();
        let tail: String = chars[chars.len() - 10..].iter().collect();
        format!("{}...{}", head, tail)
    } else if chars.len() > 15 {
        let head: String = chars[..15].iter().collect();
        format!("{}...", head)
    } else {
        value.to_string()
    }
}

/// Cookies in display order: priority names first, then the rest by name
pub fn display_order(cookies: &CookieSet) -> Vec<(&str, &str)> {
    let mut ordered: Vec<(&str, &str)> = PRIORITY_COOKIES
        .iter()
        .filter_map(|name| cookies.get_key_value(*name))
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    ordered.extend(
        cookies
            .iter()
            .filter(|(k, _)| !PRIORITY_COOKIES.contains(&k.as_str()))
            .map(|(k, v)| (k.as_str(), v.as_str())),
    );
    ordered
}

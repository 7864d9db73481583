//! Session bootstrap
//!
//! Turns an extracted [`CookieSet`] plus configuration into a [`SessionContext`]:
//! the resolved base URL and the header set every Jira request carries. No
//! network traffic happens here; see [`crate::jira::JiraClient::connect`] for
//! turning a context into a live HTTP client.

use crate::cookies::CookieSet;
use crate::error::{BridgeError, Result};
use reqwest::Url;
use serde_json::Value;
use std::collections::BTreeMap;

/// Cookie document keys that may carry the Jira base URL
const DOCUMENT_URL_KEYS: &[&str] = &["jira_url", "url", "base_url", "server_url"];

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Everything needed to issue authenticated requests against one Jira instance
#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    pub cookies: CookieSet,
    /// Base URL without a trailing slash
    pub base_url: String,
    pub headers: BTreeMap<String, String>,
}

impl SessionContext {
    /// Base URL as a parsed [`Url`]
    pub fn url(&self) -> Result<Url> {
        parse_base_url(&self.base_url)
    }
}

/// Build a session context.
///
/// `base_url_hint` is the configured URL and wins over anything found in the
/// cookie document. Headers layer as defaults, then the document's `headers`
/// object, then `config_headers`.
pub fn bootstrap(
    cookies: CookieSet,
    base_url_hint: Option<&str>,
    config_headers: &BTreeMap<String, String>,
    document: &Value,
) -> Result<SessionContext> {
    let base_url = resolve_base_url(base_url_hint, document)?;

    let mut headers = default_headers(&base_url);
    if let Some(doc_headers) = document.get("headers").and_then(Value::as_object) {
        for (name, value) in doc_headers {
            if let Some(value) = value.as_str() {
                headers.insert(name.clone(), value.to_string());
            }
        }
    }
    headers.extend(config_headers.iter().map(|(k, v)| (k.clone(), v.clone())));

    if cookies.is_empty() {
        tracing::warn!("Bootstrapping session for {} without cookies", base_url);
    }

    Ok(SessionContext {
        cookies,
        base_url,
        headers,
    })
}

/// Pick the base URL: configured value, then a known key in the cookie document
pub fn resolve_base_url(explicit: Option<&str>, document: &Value) -> Result<String> {
    let candidate = explicit
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| url_from_document(document));

    let Some(raw) = candidate else {
        return Err(BridgeError::Config(
            "No Jira base URL configured (set jira_url in the config file or JIRA_URL)"
                .to_string(),
        ));
    };

    let trimmed = raw.trim_end_matches('/').to_string();
    parse_base_url(&trimmed)?;
    Ok(trimmed)
}

fn url_from_document(document: &Value) -> Option<String> {
    let map = document.as_object()?;
    DOCUMENT_URL_KEYS
        .iter()
        .filter_map(|key| map.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|v| !v.is_empty())
        .or_else(|| {
            map.get("domain")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|d| d.starts_with("http"))
        })
        .map(str::to_string)
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| BridgeError::Config(format!("Invalid Jira base URL '{}': {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(BridgeError::Config(format!(
            "Unsupported scheme '{}' in Jira base URL",
            other
        ))),
    }
}

/// Browser-like headers sent with every request
pub fn default_headers(base_url: &str) -> BTreeMap<String, String> {
    [
        ("User-Agent", USER_AGENT.to_string()),
        (
            "Accept",
            "application/json, text/javascript, */*; q=0.01".to_string(),
        ),
        ("Accept-Language", "en-US,en;q=0.9".to_string()),
        ("X-Atlassian-Token", "no-check".to_string()),
        ("X-Requested-With", "XMLHttpRequest".to_string()),
        ("Sec-Fetch-Dest", "empty".to_string()),
        ("Sec-Fetch-Mode", "cors".to_string()),
        ("Sec-Fetch-Site", "same-origin".to_string()),
        (
            "Sec-Ch-Ua",
            r#""Not_A Brand";v="8", "Chromium";v="120", "Google Chrome";v="120""#.to_string(),
        ),
        ("Sec-Ch-Ua-Mobile", "?0".to_string()),
        ("Sec-Ch-Ua-Platform", r#""macOS""#.to_string()),
        ("Cache-Control", "no-cache".to_string()),
        ("Pragma", "no-cache".to_string()),
        ("Referer", format!("{}/secure/Dashboard.jspa", base_url)),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

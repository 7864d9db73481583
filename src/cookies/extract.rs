//! Cookie extraction for each detected document shape
//!
//! Extraction never fails. Entries that cannot be read are skipped and noted in
//! [`Extraction::warnings`], so a half-broken export still yields whatever
//! cookies it does contain.

use super::detect::{detect, CookieFormat};
use super::CookieSet;
use cookie::Cookie;
use serde_json::{Map, Value};

/// Depth limit for the keyword fallback search
pub const HEURISTIC_MAX_DEPTH: usize = 5;

/// Depth limit for the nested `cookies` object search
pub const NESTED_MAX_DEPTH: usize = 16;

/// Values must be longer than this to count as a heuristic match
const HEURISTIC_MIN_LEN: usize = 10;

const CREDENTIAL_KEYWORDS: &[&str] = &["session", "token", "auth", "cookie"];

/// Result of extracting cookies from a document
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// Shape the rules were applied for
    pub format: CookieFormat,

    /// Extracted cookies, non-empty string values only
    pub cookies: CookieSet,

    /// Paths of the `cookies` objects merged during a nested search
    pub found_at: Vec<String>,

    /// Recoverable issues encountered while walking the document
    pub warnings: Vec<String>,
}

impl Extraction {
    fn new(format: CookieFormat) -> Self {
        Self {
            format,
            cookies: CookieSet::new(),
            found_at: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn put(&mut self, name: &str, value: &str) -> bool {
        if name.is_empty() || value.is_empty() {
            return false;
        }
        self.cookies.insert(name.to_string(), value.to_string());
        true
    }

    fn put_strings(&mut self, map: &Map<String, Value>, origin: &str) {
        for (name, value) in map {
            match value.as_str() {
                Some(v) if !v.is_empty() => {
                    self.put(name, v);
                }
                Some(_) => {}
                None => self
                    .warnings
                    .push(format!("{}: skipped non-string value for '{}'", origin, name)),
            }
        }
    }
}

/// Detect the document's shape and extract its cookies
pub fn read_cookies(doc: &Value) -> Extraction {
    extract(doc, detect(doc))
}

/// Extract cookies from `doc` using the rules for `format`
pub fn extract(doc: &Value, format: CookieFormat) -> Extraction {
    let mut out = Extraction::new(format);

    match format {
        CookieFormat::CookieManager => from_cookie_manager(doc, &mut out),
        CookieFormat::Direct => {
            if let Some(map) = doc.as_object() {
                out.put_strings(map, "<root>");
            }
        }
        CookieFormat::BrowserExport => {
            if let Some(items) = doc.as_array() {
                from_browser_export(items, "<root>", &mut out);
            }
        }
        CookieFormat::Har => from_har(doc, &mut out),
        CookieFormat::Nested => walk_nested(doc, "", 0, &mut out),
        CookieFormat::Unknown => walk_heuristic(doc, 0, &mut out),
    }

    out
}

fn from_cookie_manager(doc: &Value, out: &mut Extraction) {
    match doc.get("cookies") {
        Some(Value::Object(map)) => out.put_strings(map, "cookies"),
        // Playwright storageState keeps a browser-style list under "cookies"
        Some(Value::Array(items)) => from_browser_export(items, "cookies", out),
        _ => out
            .warnings
            .push("'cookies' is neither an object nor a list".to_string()),
    }

    if let Some(domain) = doc.get("domain").and_then(Value::as_str) {
        tracing::debug!("Cookie file domain: {}", domain);
    }
    if let Some(ts) = doc.get("timestamp").and_then(Value::as_f64) {
        let age_hours = (chrono::Utc::now().timestamp() as f64 - ts) / 3600.0;
        tracing::debug!("Cookie file saved {:.1} hours ago", age_hours);
    }
}

fn from_browser_export(items: &[Value], origin: &str, out: &mut Extraction) {
    for (i, item) in items.iter().enumerate() {
        let name = item.get("name").and_then(Value::as_str).unwrap_or_default();
        let value = item.get("value").and_then(Value::as_str).unwrap_or_default();
        if !out.put(name, value) {
            out.warnings
                .push(format!("{}[{}]: missing name or value", origin, i));
        }
    }
}

fn from_har(doc: &Value, out: &mut Extraction) {
    let Some(entries) = doc.pointer("/log/entries").and_then(Value::as_array) else {
        out.warnings.push("log.entries is missing".to_string());
        return;
    };

    for (i, entry) in entries.iter().enumerate() {
        if !entry.is_object() {
            out.warnings.push(format!("entries[{}]: not an object", i));
            continue;
        }

        if let Some(cookies) = entry.pointer("/request/cookies").and_then(Value::as_array) {
            for cookie in cookies {
                let name = cookie.get("name").and_then(Value::as_str).unwrap_or_default();
                let value = cookie.get("value").and_then(Value::as_str).unwrap_or_default();
                out.put(name, value);
            }
        }

        let Some(headers) = entry.pointer("/response/headers").and_then(Value::as_array) else {
            continue;
        };
        for header in headers {
            let is_set_cookie = header
                .get("name")
                .and_then(Value::as_str)
                .is_some_and(|n| n.eq_ignore_ascii_case("set-cookie"));
            if !is_set_cookie {
                continue;
            }
            let Some(raw) = header.get("value").and_then(Value::as_str) else {
                continue;
            };
            // Some browsers fold several Set-Cookie lines into one header value
            for line in raw.lines() {
                match parse_set_cookie(line) {
                    Some((name, value)) => {
                        out.put(name, value);
                    }
                    None => out
                        .warnings
                        .push(format!("entries[{}]: unparseable Set-Cookie line", i)),
                }
            }
        }
    }
}

/// Split a `Set-Cookie` header line into its cookie name and value.
///
/// Attributes after the first `;` are dropped. Returns `None` when the pair
/// has no `=` or the name is blank.
pub fn parse_set_cookie(line: &str) -> Option<(&str, &str)> {
    let cookie = Cookie::parse(line).ok()?;
    Some((cookie.name_raw()?, cookie.value_raw()?))
}

fn walk_nested(value: &Value, path: &str, depth: usize, out: &mut Extraction) {
    if depth > NESTED_MAX_DEPTH {
        out.warnings
            .push(format!("{}: nesting deeper than {} levels", path, NESTED_MAX_DEPTH));
        return;
    }

    match value {
        Value::Object(map) => {
            if let Some(Value::Object(cookies)) = map.get("cookies") {
                let at = if path.is_empty() { "<root>" } else { path };
                out.put_strings(cookies, at);
                out.found_at.push(at.to_string());
            }
            for (key, child) in map {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };
                walk_nested(child, &child_path, depth + 1, out);
            }
        }
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                walk_nested(item, &format!("{}[{}]", path, i), depth + 1, out);
            }
        }
        _ => {}
    }
}

fn walk_heuristic(value: &Value, depth: usize, out: &mut Extraction) {
    if depth > HEURISTIC_MAX_DEPTH {
        return;
    }

    match value {
        Value::Object(map) => {
            for (key, child) in map {
                match child {
                    Value::String(s)
                        if s.chars().count() > HEURISTIC_MIN_LEN && is_credential_key(key) =>
                    {
                        out.put(key, s);
                    }
                    Value::Object(_) | Value::Array(_) => walk_heuristic(child, depth + 1, out),
                    _ => {}
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                walk_heuristic(item, depth + 1, out);
            }
        }
        _ => {}
    }
}

fn is_credential_key(key: &str) -> bool {
    let key = key.to_lowercase();
    CREDENTIAL_KEYWORDS.iter().any(|kw| key.contains(kw))
}

//! Cookie document classification
//!
//! Rules are checked in a fixed order and the first match wins. A document
//! carrying both `cookies` and `log` is a cookie-manager export, not a HAR.

use serde_json::Value;

/// Known shapes of a cookie export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CookieFormat {
    /// `{"cookies": {...}, ...metadata}`
    CookieManager,
    /// `{"NAME": "value", ...}`
    Direct,
    /// `[{"name": ..., "value": ..., "domain": ...}, ...]`
    BrowserExport,
    /// HTTP Archive with `log.entries`
    Har,
    /// Cookie-manager objects buried under other keys
    Nested,
    /// Anything else; falls back to a keyword search
    Unknown,
}

impl CookieFormat {
    /// Stable label recorded in saved cookie files
    pub fn as_str(&self) -> &'static str {
        match self {
            CookieFormat::CookieManager => "cookie_manager",
            CookieFormat::Direct => "direct_cookies",
            CookieFormat::BrowserExport => "browser_export",
            CookieFormat::Har => "har_file",
            CookieFormat::Nested => "nested_cookies",
            CookieFormat::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for CookieFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a parsed cookie document
pub fn detect(doc: &Value) -> CookieFormat {
    if let Value::Object(map) = doc {
        if map.contains_key("cookies") {
            return CookieFormat::CookieManager;
        }
        if map.values().all(Value::is_string) {
            return CookieFormat::Direct;
        }
    }

    if let Some(Value::Object(first)) = doc.as_array().and_then(|items| items.first()) {
        if first.contains_key("name") && first.contains_key("value") {
            return CookieFormat::BrowserExport;
        }
    }

    if let Value::Object(map) = doc {
        if map.contains_key("log") {
            return CookieFormat::Har;
        }
        let nested = map
            .values()
            .any(|v| v.as_object().is_some_and(|inner| inner.contains_key("cookies")));
        if nested {
            return CookieFormat::Nested;
        }
    }

    CookieFormat::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cookie_manager_shape() {
        let doc = json!({"cookies": {"JIRASESSIONID": "abc"}, "timestamp": 1.0});
        assert_eq!(detect(&doc), CookieFormat::CookieManager);
    }

    #[test]
    fn test_cookies_key_beats_log_key() {
        let doc = json!({"cookies": {}, "log": {"entries": []}});
        assert_eq!(detect(&doc), CookieFormat::CookieManager);
    }

    #[test]
    fn test_flat_string_object_is_direct() {
        assert_eq!(detect(&json!({"a": "1", "b": "2"})), CookieFormat::Direct);
        assert_eq!(detect(&json!({})), CookieFormat::Direct);
    }

    #[test]
    fn test_browser_export_checks_first_element_only() {
        let doc = json!([{"name": "a", "value": "1"}, 42]);
        assert_eq!(detect(&doc), CookieFormat::BrowserExport);

        let doc = json!([42, {"name": "a", "value": "1"}]);
        assert_eq!(detect(&doc), CookieFormat::Unknown);

        assert_eq!(detect(&json!([])), CookieFormat::Unknown);
    }

    #[test]
    fn test_har_shape() {
        let doc = json!({"log": {"version": "1.2", "entries": []}});
        assert_eq!(detect(&doc), CookieFormat::Har);
    }

    #[test]
    fn test_nested_shape() {
        let doc = json!({"profile": {"cookies": {"X": "1"}}, "count": 3});
        assert_eq!(detect(&doc), CookieFormat::Nested);
    }

    #[test]
    fn test_deeply_nested_only_is_unknown() {
        // Only direct values are inspected for the nested rule
        let doc = json!({"a": {"b": {"cookies": {"X": "1"}}}, "n": 1});
        assert_eq!(detect(&doc), CookieFormat::Unknown);
    }

    #[test]
    fn test_scalars_are_unknown() {
        for doc in [json!(null), json!(3), json!("cookie"), json!(true)] {
            assert_eq!(detect(&doc), CookieFormat::Unknown);
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(CookieFormat::Har.to_string(), "har_file");
        assert_eq!(CookieFormat::BrowserExport.as_str(), "browser_export");
    }
}

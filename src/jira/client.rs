//! HTTP client bound to one Jira session

use crate::config::Settings;
use crate::error::{BridgeError, Result};
use crate::session::SessionContext;
use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Url};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Owned HTTP session: cookie jar, default headers, request pacing
pub struct JiraClient {
    http: reqwest::Client,
    jar: Arc<Jar>,
    base: Url,
    settings: Settings,
}

impl JiraClient {
    /// Build a client from a bootstrapped session. Makes no requests.
    pub fn connect(ctx: &SessionContext, settings: &Settings) -> Result<Self> {
        let base = ctx.url()?;

        let jar = Arc::new(Jar::default());
        for (name, value) in &ctx.cookies {
            jar.add_cookie_str(&format!("{}={}", name, value), &base);
        }

        let mut headers = HeaderMap::new();
        for (name, value) in &ctx.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => tracing::warn!("Skipping invalid header: {}", name),
            }
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .cookie_provider(jar.clone())
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;

        tracing::info!(
            "Session ready for {} ({} cookies, {} headers)",
            ctx.base_url,
            ctx.cookies.len(),
            ctx.headers.len()
        );

        Ok(Self {
            http,
            jar,
            base,
            settings: settings.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// `Cookie` header the jar would send to the base URL
    pub fn cookie_header(&self) -> Option<String> {
        use reqwest::cookie::CookieStore;
        self.jar
            .cookies(&self.base)
            .and_then(|v| v.to_str().ok().map(str::to_string))
    }

    /// Absolute URL for already-rendered path segments and query pairs
    pub fn endpoint<S: AsRef<str>>(&self, segments: &[S], query: &[(String, String)]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| {
                BridgeError::Config(format!("Base URL cannot take a path: {}", self.base))
            })?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Send a request and decode the JSON reply. An empty body decodes as null.
    pub async fn send(&self, method: Method, url: Url, body: Option<&Value>) -> Result<Value> {
        let bytes = self.send_raw(method, url, body).await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// GET a path under the base URL
    pub async fn get(&self, segments: &[&str], query: &[(String, String)]) -> Result<Value> {
        let url = self.endpoint(segments, query)?;
        self.send(Method::GET, url, None).await
    }

    /// Download raw bytes from an absolute URL, e.g. an attachment's `content` link
    pub async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let url = Url::parse(url)
            .map_err(|e| BridgeError::InvalidParam(format!("bad download URL '{}': {}", url, e)))?;
        self.send_raw(Method::GET, url, None).await
    }

    /// The authenticated user's profile
    pub async fn myself(&self) -> Result<Value> {
        self.get(&["rest", "api", "2", "myself"], &[]).await
    }

    async fn send_raw(&self, method: Method, url: Url, body: Option<&Value>) -> Result<Vec<u8>> {
        pause(self.settings.request_delay_ms).await;

        tracing::debug!("{} {}", method, url);
        let mut request = self.http.request(method, url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }
        let sent = request.send().await;

        pause(self.settings.post_request_delay_ms).await;

        let response = sent?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("{} from {}", status, url);
            return Err(BridgeError::Status {
                status,
                url: url.to_string(),
                body,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

async fn pause(ms: u64) {
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::cookies::CookieSet;
    use std::collections::BTreeMap;

    /// Settings with pacing disabled
    pub(crate) fn fast_settings() -> Settings {
        Settings {
            timeout_seconds: 5,
            request_delay_ms: 0,
            post_request_delay_ms: 0,
            verify_connection: false,
        }
    }

    /// Serve `app` on an ephemeral local port and return its base URL
    pub(crate) async fn serve_fake(app: axum::Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    pub(crate) fn client_for(base_url: &str, cookies: &[(&str, &str)]) -> JiraClient {
        let cookies: CookieSet = cookies
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let ctx = crate::session::bootstrap(
            cookies,
            Some(base_url),
            &BTreeMap::new(),
            &serde_json::json!({}),
        )
        .unwrap();
        JiraClient::connect(&ctx, &fast_settings()).unwrap()
    }

    #[test]
    fn test_cookies_land_in_jar() {
        let client = client_for(
            "https://jira.example.com",
            &[("JIRASESSIONID", "abc"), ("atlassian.xsrf.token", "tok")],
        );
        let header = client.cookie_header().unwrap();
        assert!(header.contains("JIRASESSIONID=abc"));
        assert!(header.contains("atlassian.xsrf.token=tok"));
    }

    #[test]
    fn test_empty_jar_has_no_cookie_header() {
        let client = client_for("https://jira.example.com", &[]);
        assert!(client.cookie_header().is_none());
    }

    #[test]
    fn test_endpoint_keeps_context_path_and_encodes() {
        let client = client_for("https://example.com/jira/", &[]);
        let url = client
            .endpoint(
                &["rest", "api", "2", "user"],
                &[("username".to_string(), "j doe&co".to_string())],
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/jira/rest/api/2/user?username=j+doe%26co"
        );

        let url = client.endpoint(&["rest", "api", "2", "issue", "A/B 1"], &[]).unwrap();
        assert_eq!(url.path(), "/jira/rest/api/2/issue/A%2FB%201");
    }
}

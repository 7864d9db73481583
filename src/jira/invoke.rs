//! Generic tool invoker
//!
//! Renders a [`ToolSpec`]'s endpoint against bound [`Args`], performs the call
//! and shapes the reply. Multi-step tools are spelled out below.

use super::client::JiraClient;
use super::tools::{self, Action, Args, Composite, Endpoint, Reply, ToolSpec};
use crate::error::{BridgeError, Result};
use reqwest::{Method, Url};
use serde_json::{json, Map, Value};
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Run a tool with already-bound arguments
pub async fn invoke(client: &JiraClient, spec: &ToolSpec, args: &Args) -> Result<Value> {
    match spec.action {
        Action::Rest(endpoint) => call_endpoint(client, &endpoint, args).await,
        Action::Composite(composite) => run_composite(client, composite, args).await,
    }
}

async fn call_endpoint(client: &JiraClient, endpoint: &Endpoint, args: &Args) -> Result<Value> {
    let url = endpoint_url(client, endpoint, args)?;
    let body = endpoint.body.map(|build| build(args));
    let response = client
        .send(endpoint.verb.method(), url, body.as_ref())
        .await?;
    Ok(shape_reply(endpoint.reply, args, response))
}

/// Render the endpoint's path and query templates into a URL
pub fn endpoint_url(client: &JiraClient, endpoint: &Endpoint, args: &Args) -> Result<Url> {
    let segments = endpoint
        .path
        .split('/')
        .map(|segment| tools::render_strict(segment, |name| args.render(name)))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(BridgeError::MissingParam)?;

    let query: Vec<(String, String)> = endpoint
        .query
        .iter()
        .filter_map(|(key, template)| {
            tools::render_strict(template, |name| args.render(name))
                .ok()
                .map(|value| (key.to_string(), value))
        })
        .collect();

    client.endpoint(&segments, &query)
}

fn shape_reply(reply: Reply, args: &Args, response: Value) -> Value {
    match reply {
        Reply::Json => response,
        Reply::Wrap(key) => json!({ key: response }),
        Reply::Success(template) => {
            json!({"success": tools::render_message(template, |name| args.render(name))})
        }
        Reply::SuccessWith(template, key) => {
            let message = tools::render_message(template, |name| {
                args.render(name).or_else(|| scalar(response.get(name)?))
            });
            json!({"success": message, key: response})
        }
        Reply::Pluck { pointer, key } => {
            let picked = response.pointer(pointer).cloned().unwrap_or_else(|| json!([]));
            json!({ key: picked })
        }
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Rebind a registry tool's arguments and call its endpoint
async fn call_tool(client: &JiraClient, name: &str, arguments: Value) -> Result<Value> {
    let spec = tools::find(name).ok_or_else(|| BridgeError::UnknownTool(name.to_string()))?;
    let args = Args::bind(spec.params, &arguments)?;
    Box::pin(invoke(client, spec, &args)).await
}

// ─── Composite tools ────────────────────────────────────────────────────────

async fn run_composite(client: &JiraClient, composite: Composite, args: &Args) -> Result<Value> {
    match composite {
        Composite::TransitionIssue => transition_issue(client, args).await,
        Composite::SearchFields => {
            let query = args.text_or_empty("query").to_lowercase();
            let fields = filter_fields(client, |field| {
                field
                    .get("name")
                    .and_then(Value::as_str)
                    .is_some_and(|name| name.to_lowercase().contains(&query))
            })
            .await?;
            Ok(json!({"fields": fields}))
        }
        Composite::CustomFields => {
            let fields = filter_fields(client, |field| {
                field.get("custom").and_then(Value::as_bool).unwrap_or(false)
            })
            .await?;
            Ok(json!({"custom_fields": fields}))
        }
        Composite::LinkToEpic => link_to_epic(client, args).await,
        Composite::CloneIssue => clone_issue(client, args).await,
        Composite::DownloadAttachment => download_attachment(client, args).await,
        Composite::BatchCreateIssues => batch_create_issues(client, args).await,
        Composite::BatchCreateVersions => batch_create_versions(client, args).await,
        Composite::BatchGetChangelogs => batch_get_changelogs(client, args).await,
    }
}

async fn transition_issue(client: &JiraClient, args: &Args) -> Result<Value> {
    let issue_key = args.text_or_empty("issue_key");
    let wanted = args.text_or_empty("transition_name");

    let available = client
        .get(&["rest", "api", "2", "issue", issue_key, "transitions"], &[])
        .await?;
    let transition_id = available
        .get("transitions")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .find(|t| {
            t.get("name")
                .and_then(Value::as_str)
                .is_some_and(|name| name.to_lowercase() == wanted.to_lowercase())
        })
        .and_then(|t| t.get("id").cloned())
        .ok_or_else(|| BridgeError::NotFound(format!("Transition '{}'", wanted)))?;

    let url = client.endpoint(&["rest", "api", "2", "issue", issue_key, "transitions"], &[])?;
    client
        .send(
            Method::POST,
            url,
            Some(&json!({"transition": {"id": transition_id}})),
        )
        .await?;

    Ok(json!({"success": format!("Transitioned {} to {}", issue_key, wanted)}))
}

async fn all_fields(client: &JiraClient) -> Result<Vec<Value>> {
    let fields = client.get(&["rest", "api", "2", "field"], &[]).await?;
    match fields {
        Value::Array(items) => Ok(items),
        other => Err(BridgeError::InvalidParam(format!(
            "expected a field list from Jira, got {}",
            type_name(&other)
        ))),
    }
}

async fn filter_fields<F>(client: &JiraClient, keep: F) -> Result<Vec<Value>>
where
    F: Fn(&Value) -> bool,
{
    Ok(all_fields(client).await?.into_iter().filter(|f| keep(f)).collect())
}

async fn link_to_epic(client: &JiraClient, args: &Args) -> Result<Value> {
    let issue_key = args.text_or_empty("issue_key");
    let epic_key = args.text_or_empty("epic_key");

    let field_id = all_fields(client)
        .await?
        .into_iter()
        .find(|f| f.get("name").and_then(Value::as_str) == Some("Epic Link"))
        .and_then(|f| f.get("id").and_then(Value::as_str).map(str::to_string))
        .ok_or_else(|| BridgeError::NotFound("Epic Link field".to_string()))?;

    let mut fields = Map::new();
    fields.insert(field_id, json!(epic_key));
    let url = client.endpoint(&["rest", "api", "2", "issue", issue_key], &[])?;
    client
        .send(Method::PUT, url, Some(&json!({ "fields": fields })))
        .await?;

    Ok(json!({"success": format!("Linked {} to epic {}", issue_key, epic_key)}))
}

/// Reduce a Jira reference object (issuetype, priority) to what a create call accepts
fn reference(value: Option<&Value>, fallback: &str) -> Value {
    match value {
        Some(v) if v.get("id").is_some() => json!({"id": v["id"]}),
        Some(v) if v.get("name").is_some() => json!({"name": v["name"]}),
        _ => json!({ "name": fallback }),
    }
}

async fn clone_issue(client: &JiraClient, args: &Args) -> Result<Value> {
    let issue_key = args.text_or_empty("issue_key");
    let original = client
        .get(&["rest", "api", "2", "issue", issue_key], &[])
        .await?;
    let fields = original.get("fields").cloned().unwrap_or_else(|| json!({}));

    let project = args
        .text("project_key")
        .map(str::to_string)
        .or_else(|| scalar(fields.pointer("/project/key")?))
        .ok_or_else(|| BridgeError::MissingParam("project_key".to_string()))?;
    let description = fields
        .get("description")
        .filter(|d| !d.is_null())
        .cloned()
        .unwrap_or_else(|| json!(""));

    let body = json!({
        "fields": {
            "project": {"key": project},
            "summary": args.text_or_empty("summary"),
            "description": description,
            "issuetype": reference(fields.get("issuetype"), "Task"),
            "priority": reference(fields.get("priority"), "Medium")
        }
    });

    let url = client.endpoint(&["rest", "api", "2", "issue"], &[])?;
    let new_issue = client.send(Method::POST, url, Some(&body)).await?;
    let new_key = new_issue.get("key").and_then(scalar).unwrap_or_default();

    Ok(json!({
        "success": format!("Cloned {} as {}", issue_key, new_key),
        "new_issue": new_issue
    }))
}

async fn download_attachment(client: &JiraClient, args: &Args) -> Result<Value> {
    let attachment_id = args.text_or_empty("attachment_id");
    let meta = client
        .get(&["rest", "api", "2", "attachment", attachment_id], &[])
        .await?;

    let Some(content_url) = meta.get("content").and_then(Value::as_str) else {
        let size = serde_json::to_vec(&meta)?.len();
        return Ok(json!({
            "success": format!("Attachment {} info retrieved", attachment_id),
            "size": size,
            "attachment": meta
        }));
    };

    let bytes = client.download(content_url).await?;
    let mut result = json!({
        "success": format!("Attachment {} downloaded", attachment_id),
        "filename": meta.get("filename").cloned().unwrap_or(Value::Null),
        "mimeType": meta.get("mimeType").cloned().unwrap_or(Value::Null),
        "size": bytes.len()
    });

    if let Some(target) = args.text("filename") {
        let target = crate::config::expand_path(Path::new(target));
        save_new_file(&target, &bytes).await?;
        tracing::info!("Saved attachment {} to {}", attachment_id, target.display());
        result["saved_to"] = json!(target.display().to_string());
    }

    Ok(result)
}

/// Write `bytes` to a file that must not exist yet
async fn save_new_file(target: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = match tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
        .await
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            return Err(BridgeError::InvalidParam(format!(
                "{} already exists",
                target.display()
            )))
        }
        Err(e) => return Err(e.into()),
    };
    file.write_all(bytes).await?;
    file.flush().await?;
    Ok(())
}

async fn batch_create_issues(client: &JiraClient, args: &Args) -> Result<Value> {
    let updates: Vec<Value> = args
        .list("issues")
        .iter()
        .map(|item| tools::new_issue_fields(&Args::from_item(item)))
        .collect();

    let url = client.endpoint(&["rest", "api", "2", "issue", "bulk"], &[])?;
    let result = client
        .send(Method::POST, url, Some(&json!({ "issueUpdates": updates })))
        .await?;
    let created = result
        .get("issues")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);

    Ok(json!({
        "success": format!("Created {} issues", created),
        "issues": result
    }))
}

async fn batch_create_versions(client: &JiraClient, args: &Args) -> Result<Value> {
    let project_key = args.text_or_empty("project_key");
    let mut created = Vec::new();
    let mut errors = Vec::new();

    for version in args.list("versions") {
        let name = version.get("name").and_then(Value::as_str).unwrap_or_default();
        let arguments = json!({
            "project_key": project_key,
            "name": name,
            "description": version.get("description").cloned().unwrap_or(Value::Null)
        });
        match call_tool(client, "jira_create_version", arguments).await {
            Ok(result) => created.push(result),
            Err(e) => {
                tracing::warn!("Creating version '{}' failed: {}", name, e);
                errors.push(format!("Version '{}': {}", name, e));
            }
        }
    }

    Ok(json!({
        "success": format!("Created {} versions", created.len()),
        "created": created,
        "errors": errors
    }))
}

async fn batch_get_changelogs(client: &JiraClient, args: &Args) -> Result<Value> {
    let mut changelogs = Map::new();
    let mut errors = Vec::new();

    for key in args.list("issue_keys").iter().filter_map(Value::as_str) {
        let query = [("expand".to_string(), "changelog".to_string())];
        match client.get(&["rest", "api", "2", "issue", key], &query).await {
            Ok(issue) => {
                let changelog = issue.get("changelog").cloned().unwrap_or_else(|| json!({}));
                changelogs.insert(key.to_string(), changelog);
            }
            Err(e) => errors.push(format!("Issue {}: {}", key, e)),
        }
    }

    Ok(json!({
        "success": format!("Retrieved changelogs for {} issues", changelogs.len()),
        "changelogs": changelogs,
        "errors": errors
    }))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::jira::client::tests::{client_for, serve_fake};
    use crate::jira::tools::Verb;
    use axum::extract::{Path as UrlPath, State};
    use axum::http::{HeaderMap, Method as HttpMethod, StatusCode, Uri};
    use axum::response::{IntoResponse, Response};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use std::sync::{Arc, Mutex};

    /// Requests seen by the fake server: method, path and query, JSON body
    pub(crate) type Log = Arc<Mutex<Vec<(String, String, Value)>>>;

    fn note(log: &Log, method: &HttpMethod, uri: &Uri, body: &str) -> Value {
        let parsed = serde_json::from_str(body).unwrap_or(Value::Null);
        log.lock()
            .unwrap()
            .push((method.to_string(), uri.to_string(), parsed.clone()));
        parsed
    }

    async fn get_issue(
        State(log): State<Log>,
        UrlPath(key): UrlPath<String>,
        method: HttpMethod,
        uri: Uri,
    ) -> Response {
        note(&log, &method, &uri, "");
        if key == "MISSING-1" {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"errorMessages": ["Issue Does Not Exist"]})),
            )
                .into_response();
        }
        Json(json!({
            "key": key,
            "fields": {
                "summary": "Original",
                "description": null,
                "project": {"key": "SRC"},
                "issuetype": {"id": "10001", "name": "Story"},
                "attachment": [{"id": "10", "filename": "notes.txt"}]
            },
            "changelog": {"histories": [{"id": "1"}]}
        }))
        .into_response()
    }

    async fn accept(
        State(log): State<Log>,
        method: HttpMethod,
        uri: Uri,
        body: String,
    ) -> StatusCode {
        note(&log, &method, &uri, &body);
        StatusCode::NO_CONTENT
    }

    async fn create_issue(
        State(log): State<Log>,
        method: HttpMethod,
        uri: Uri,
        body: String,
    ) -> Json<Value> {
        note(&log, &method, &uri, &body);
        Json(json!({"id": "100", "key": "NEW-1"}))
    }

    async fn bulk_create(
        State(log): State<Log>,
        method: HttpMethod,
        uri: Uri,
        body: String,
    ) -> Json<Value> {
        let body = note(&log, &method, &uri, &body);
        let count = body["issueUpdates"].as_array().map_or(0, Vec::len);
        let issues: Vec<Value> = (1..=count)
            .map(|i| json!({"key": format!("NEW-{}", i)}))
            .collect();
        Json(json!({"issues": issues, "errors": []}))
    }

    async fn transitions() -> Json<Value> {
        Json(json!({"transitions": [
            {"id": "21", "name": "To Do"},
            {"id": "31", "name": "In Progress"}
        ]}))
    }

    async fn fields() -> Json<Value> {
        Json(json!([
            {"id": "summary", "name": "Summary", "custom": false},
            {"id": "customfield_10008", "name": "Epic Link", "custom": true},
            {"id": "customfield_10010", "name": "Story Points", "custom": true}
        ]))
    }

    async fn create_version(
        State(log): State<Log>,
        method: HttpMethod,
        uri: Uri,
        body: String,
    ) -> Response {
        let body = note(&log, &method, &uri, &body);
        if body["name"] == "dup" {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"errorMessages": ["A version with this name already exists"]})),
            )
                .into_response();
        }
        Json(json!({"id": "1", "name": body["name"], "project": body["project"]})).into_response()
    }

    async fn attachment_meta(UrlPath(id): UrlPath<String>, headers: HeaderMap) -> Json<Value> {
        let host = headers
            .get("host")
            .and_then(|h| h.to_str().ok())
            .unwrap_or_default()
            .to_string();
        Json(json!({
            "id": id,
            "filename": "notes.txt",
            "mimeType": "text/plain",
            "content": format!("http://{}/secure/attachment/{}/notes.txt", host, id)
        }))
    }

    async fn attachment_content() -> &'static str {
        "hello attachment"
    }

    async fn echo(State(log): State<Log>, method: HttpMethod, uri: Uri, body: String) -> Json<Value> {
        let body = note(&log, &method, &uri, &body);
        Json(json!({"method": method.as_str(), "uri": uri.to_string(), "body": body}))
    }

    /// A small in-process Jira. Unrouted paths echo the request back.
    pub(crate) async fn fake_jira() -> (String, Log) {
        let log = Log::default();
        let app = Router::new()
            .route("/rest/api/2/issue", post(create_issue))
            .route("/rest/api/2/issue/bulk", post(bulk_create))
            .route("/rest/api/2/issue/:key", get(get_issue).put(accept))
            .route(
                "/rest/api/2/issue/:key/transitions",
                get(transitions).post(accept),
            )
            .route("/rest/api/2/field", get(fields))
            .route("/rest/api/2/version", post(create_version))
            .route("/rest/api/2/attachment/:id", get(attachment_meta))
            .route("/secure/attachment/:id/:name", get(attachment_content))
            .fallback(echo)
            .with_state(log.clone());
        (serve_fake(app).await, log)
    }

    async fn run(base: &str, name: &str, arguments: Value) -> Result<Value> {
        let client = client_for(base, &[("JIRASESSIONID", "abc")]);
        call_tool(&client, name, arguments).await
    }

    fn last_request(log: &Log) -> (String, String, Value) {
        log.lock().unwrap().last().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_search_renders_query_pairs() {
        let (base, _) = fake_jira().await;
        let result = run(&base, "jira_search", json!({"jql": "project = X"}))
            .await
            .unwrap();
        let uri = result["uri"].as_str().unwrap();
        assert!(uri.starts_with("/rest/api/2/search?jql=project+%3D+X&maxResults=50&fields="));
        assert_eq!(result["method"], "GET");
    }

    #[test]
    fn test_endpoint_url_drops_unresolved_query_pairs() {
        let client = client_for("https://jira.example.com", &[]);
        let endpoint = Endpoint {
            verb: Verb::Get,
            path: "rest/api/2/thing/{a}",
            query: &[("q", "{b}"), ("fixed", "yes")],
            body: None,
            reply: Reply::Json,
        };

        let url = endpoint_url(&client, &endpoint, &Args::from_item(&json!({"a": "x y"}))).unwrap();
        assert_eq!(url.as_str(), "https://jira.example.com/rest/api/2/thing/x%20y?fixed=yes");

        let err = endpoint_url(&client, &endpoint, &Args::from_item(&json!({"b": "1"}))).unwrap_err();
        assert_eq!(err.to_string(), "Missing required parameter: a");
    }

    #[tokio::test]
    async fn test_pluck_reply() {
        let (base, log) = fake_jira().await;
        let result = run(&base, "jira_get_attachments", json!({"issue_key": "PROJ-1"}))
            .await
            .unwrap();
        assert_eq!(result["attachments"][0]["filename"], "notes.txt");
        assert_eq!(last_request(&log).1, "/rest/api/2/issue/PROJ-1?fields=attachment");
    }

    #[tokio::test]
    async fn test_success_message_uses_response_fields() {
        let (base, log) = fake_jira().await;
        let result = run(
            &base,
            "jira_create_issue",
            json!({"project_key": "PROJ", "summary": "Hello"}),
        )
        .await
        .unwrap();
        assert_eq!(result["success"], "Created issue NEW-1");
        assert_eq!(result["issue"]["id"], "100");

        let (method, _, body) = last_request(&log);
        assert_eq!(method, "POST");
        assert_eq!(body["fields"]["issuetype"]["name"], "Task");
        assert_eq!(body["fields"]["project"]["key"], "PROJ");
    }

    #[tokio::test]
    async fn test_http_error_carries_status_and_body() {
        let (base, _) = fake_jira().await;
        let err = run(&base, "jira_get_issue", json!({"issue_key": "MISSING-1"}))
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("404 Not Found for url: "));
        assert!(message.contains("Issue Does Not Exist"));
    }

    #[tokio::test]
    async fn test_transition_matches_name_case_insensitively() {
        let (base, log) = fake_jira().await;
        let result = run(
            &base,
            "jira_transition_issue",
            json!({"issue_key": "PROJ-1", "transition_name": "in progress"}),
        )
        .await
        .unwrap();
        assert_eq!(result["success"], "Transitioned PROJ-1 to in progress");

        let (method, uri, body) = last_request(&log);
        assert_eq!(method, "POST");
        assert_eq!(uri, "/rest/api/2/issue/PROJ-1/transitions");
        assert_eq!(body, json!({"transition": {"id": "31"}}));

        let err = run(
            &base,
            "jira_transition_issue",
            json!({"issue_key": "PROJ-1", "transition_name": "Closed"}),
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Transition 'Closed' not found");
    }

    #[tokio::test]
    async fn test_field_filters() {
        let (base, _) = fake_jira().await;
        let result = run(&base, "jira_search_fields", json!({"query": "STORY"}))
            .await
            .unwrap();
        assert_eq!(result["fields"].as_array().unwrap().len(), 1);
        assert_eq!(result["fields"][0]["id"], "customfield_10010");

        let result = run(&base, "jira_get_custom_fields", json!({})).await.unwrap();
        assert_eq!(result["custom_fields"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_link_to_epic_uses_discovered_field() {
        let (base, log) = fake_jira().await;
        let result = run(
            &base,
            "jira_link_to_epic",
            json!({"issue_key": "PROJ-2", "epic_key": "PROJ-1"}),
        )
        .await
        .unwrap();
        assert_eq!(result["success"], "Linked PROJ-2 to epic PROJ-1");

        let (method, uri, body) = last_request(&log);
        assert_eq!(method, "PUT");
        assert_eq!(uri, "/rest/api/2/issue/PROJ-2");
        assert_eq!(body, json!({"fields": {"customfield_10008": "PROJ-1"}}));
    }

    #[tokio::test]
    async fn test_clone_copies_reference_fields() {
        let (base, log) = fake_jira().await;
        let result = run(
            &base,
            "jira_clone_issue",
            json!({"issue_key": "PROJ-1", "summary": "Copy"}),
        )
        .await
        .unwrap();
        assert_eq!(result["success"], "Cloned PROJ-1 as NEW-1");
        assert_eq!(result["new_issue"]["key"], "NEW-1");

        let (_, uri, body) = last_request(&log);
        assert_eq!(uri, "/rest/api/2/issue");
        assert_eq!(
            body,
            json!({"fields": {
                "project": {"key": "SRC"},
                "summary": "Copy",
                "description": "",
                "issuetype": {"id": "10001"},
                "priority": {"name": "Medium"}
            }})
        );
    }

    #[tokio::test]
    async fn test_download_attachment_saves_content() {
        let (base, _) = fake_jira().await;
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.txt");

        let result = run(
            &base,
            "jira_download_attachment",
            json!({"attachment_id": "10", "filename": target.to_str().unwrap()}),
        )
        .await
        .unwrap();

        assert_eq!(result["success"], "Attachment 10 downloaded");
        assert_eq!(result["size"], 16);
        assert_eq!(result["filename"], "notes.txt");
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "hello attachment");
    }

    #[tokio::test]
    async fn test_download_attachment_refuses_existing_file() {
        let (base, _) = fake_jira().await;
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("keep.txt");
        std::fs::write(&target, "original").unwrap();

        let err = run(
            &base,
            "jira_download_attachment",
            json!({"attachment_id": "10", "filename": target.to_str().unwrap()}),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, BridgeError::InvalidParam(ref msg) if msg.ends_with("already exists")));
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "original");
    }

    #[tokio::test]
    async fn test_batch_create_issues_posts_bulk_payload() {
        let (base, log) = fake_jira().await;
        let result = run(
            &base,
            "jira_batch_create_issues",
            json!({"issues": [
                {"project_key": "PROJ", "summary": "One"},
                {"project_key": "PROJ", "summary": "Two", "issue_type": "Bug"}
            ]}),
        )
        .await
        .unwrap();
        assert_eq!(result["success"], "Created 2 issues");

        let (_, uri, body) = last_request(&log);
        assert_eq!(uri, "/rest/api/2/issue/bulk");
        assert_eq!(body["issueUpdates"][0]["fields"]["issuetype"]["name"], "Task");
        assert_eq!(body["issueUpdates"][1]["fields"]["issuetype"]["name"], "Bug");
    }

    #[tokio::test]
    async fn test_batch_create_versions_collects_failures() {
        let (base, _) = fake_jira().await;
        let result = run(
            &base,
            "jira_batch_create_versions",
            json!({"project_key": "PROJ", "versions": [{"name": "1.0"}, {"name": "dup"}]}),
        )
        .await
        .unwrap();
        assert_eq!(result["success"], "Created 1 versions");
        assert_eq!(result["created"][0]["success"], "Created version 1.0");
        let error = result["errors"][0].as_str().unwrap();
        assert!(error.starts_with("Version 'dup': 400 Bad Request"));
    }

    #[tokio::test]
    async fn test_batch_changelogs_keeps_going_after_failure() {
        let (base, log) = fake_jira().await;
        let result = run(
            &base,
            "jira_batch_get_changelogs",
            json!({"issue_keys": ["PROJ-1", "MISSING-1"]}),
        )
        .await
        .unwrap();
        assert_eq!(result["success"], "Retrieved changelogs for 1 issues");
        assert_eq!(result["changelogs"]["PROJ-1"]["histories"][0]["id"], "1");
        assert!(result["errors"][0]
            .as_str()
            .unwrap()
            .starts_with("Issue MISSING-1: 404"));

        let requests = log.lock().unwrap();
        assert_eq!(requests[0].1, "/rest/api/2/issue/PROJ-1?expand=changelog");
    }
}

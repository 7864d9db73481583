//! MCP (Model Context Protocol) server exposing Jira tools
//!
//! The server communicates over stdio using line-delimited JSON-RPC 2.0.
//! stdout carries protocol messages only; logs go to stderr.
//!
//! ```text
//! jirabridge --config jira_config.json --cookies cookies.json
//! ```

mod handlers;
mod protocol;

use crate::error::Result;
use crate::jira::JiraManager;
use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// Run the MCP server over stdio until stdin closes
pub async fn run_mcp_server(mut manager: JiraManager) -> Result<()> {
    tracing::info!("Starting MCP server (stdio mode)");

    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    serve(stdin, stdout, &mut manager).await
}

/// Main event loop: one request line in, at most one response line out.
/// Each request is handled to completion before the next line is read.
pub async fn serve<R, W>(reader: R, mut writer: W, manager: &mut JiraManager) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let Some(response) = handle_line(&line, manager).await else {
            continue;
        };

        let response_json = serde_json::to_string(&response)?;
        writer.write_all(response_json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }

    tracing::info!("stdin closed, shutting down");
    Ok(())
}

async fn handle_line(line: &str, manager: &mut JiraManager) -> Option<JsonRpcResponse> {
    let value: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(e) => {
            return Some(JsonRpcResponse::error(
                Value::Null,
                JsonRpcError::parse_error(format!("Invalid JSON: {}", e)),
            ))
        }
    };

    let id = value.get("id").cloned().unwrap_or(Value::Null);
    match serde_json::from_value::<JsonRpcRequest>(value) {
        Ok(request) => handle_request(request, manager).await,
        Err(e) => Some(JsonRpcResponse::error(
            id,
            JsonRpcError::invalid_request(format!("Invalid request: {}", e)),
        )),
    }
}

/// Handle a single JSON-RPC request. Notifications (no `id` member) produce
/// no response.
async fn handle_request(
    request: JsonRpcRequest,
    manager: &mut JiraManager,
) -> Option<JsonRpcResponse> {
    let Some(id) = request.id else {
        tracing::debug!("Notification: {}", request.method);
        return None;
    };

    let response = match request.method.as_str() {
        "initialize" => handlers::handle_initialize(id, manager).await,
        "tools/list" => handlers::handle_tools_list(id),
        "tools/call" => handlers::handle_tools_call(id, request.params, manager).await,
        "resources/list" => handlers::handle_resources_list(id),
        "prompts/list" => handlers::handle_prompts_list(id),
        "ping" => JsonRpcResponse::success(id, serde_json::json!({})),

        // Unknown method
        _ => JsonRpcResponse::error(
            id,
            JsonRpcError::method_not_found(format!("Method not found: {}", request.method)),
        ),
    };
    Some(response)
}

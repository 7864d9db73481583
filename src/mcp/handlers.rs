//! MCP method handlers
//! Implements initialize, tools/list, tools/call and the empty resource/prompt lists

use serde_json::{json, Value};

use super::protocol::{
    InitializeResult, JsonRpcError, JsonRpcResponse, ListCapability, ResourcesCapability,
    ServerCapabilities, ServerInfo, ToolCallResult, ToolDefinition, PROTOCOL_VERSION,
};
use crate::jira::{JiraManager, TOOLS};

/// Handle the initialize method. (Re)loads the Jira session; a failure is
/// logged and the result is returned regardless.
pub async fn handle_initialize(id: Value, manager: &mut JiraManager) -> JsonRpcResponse {
    match manager.initialize().await {
        Ok(()) => tracing::info!("Jira session initialized"),
        Err(e) => tracing::error!("Jira session not available: {}", e),
    }

    let result = InitializeResult {
        protocol_version: PROTOCOL_VERSION.to_string(),
        capabilities: ServerCapabilities {
            tools: ListCapability {
                list_changed: false,
            },
            resources: ResourcesCapability {
                subscribe: false,
                list_changed: false,
            },
            prompts: ListCapability {
                list_changed: false,
            },
        },
        server_info: ServerInfo {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    };

    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, JsonRpcError::internal_error(e.to_string())),
    }
}

/// Handle the tools/list method
pub fn handle_tools_list(id: Value) -> JsonRpcResponse {
    let tools: Vec<ToolDefinition> = TOOLS
        .iter()
        .map(|spec| ToolDefinition {
            name: spec.name.to_string(),
            description: spec.description.to_string(),
            input_schema: spec.input_schema(),
        })
        .collect();

    match serde_json::to_value(tools) {
        Ok(tools) => JsonRpcResponse::success(id, json!({ "tools": tools })),
        Err(e) => JsonRpcResponse::error(id, JsonRpcError::internal_error(e.to_string())),
    }
}

/// Handle the tools/call method
pub async fn handle_tools_call(
    id: Value,
    params: Option<Value>,
    manager: &JiraManager,
) -> JsonRpcResponse {
    let params = match params {
        Some(p) => p,
        None => {
            return JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_params("Missing params".to_string()),
            );
        }
    };

    let tool_name = match params.get("name").and_then(|v| v.as_str()) {
        Some(name) => name,
        None => {
            return JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_params("Missing tool name".to_string()),
            );
        }
    };

    let arguments = params.get("arguments").cloned().unwrap_or(json!({}));
    let result = manager.execute_tool(tool_name, &arguments).await;

    let text = match serde_json::to_string_pretty(&result) {
        Ok(text) => text,
        Err(e) => {
            return JsonRpcResponse::error(id, JsonRpcError::tool_error(e.to_string()));
        }
    };

    match serde_json::to_value(ToolCallResult::text(text)) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, JsonRpcError::tool_error(e.to_string())),
    }
}

/// Handle the resources/list method
pub fn handle_resources_list(id: Value) -> JsonRpcResponse {
    JsonRpcResponse::success(id, json!({ "resources": [] }))
}

/// Handle the prompts/list method
pub fn handle_prompts_list(id: Value) -> JsonRpcResponse {
    JsonRpcResponse::success(id, json!({ "prompts": [] }))
}

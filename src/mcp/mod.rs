// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! JSON-RPC 2.0 over line-delimited stdio
//!
//! One request per line in, one response per line out. Notifications (no
//! `id`) are handled silently.

pub mod schema;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::constants::errors::{
    ERROR_INTERNAL_ERROR, ERROR_INVALID_PARAMS, ERROR_INVALID_REQUEST, ERROR_METHOD_NOT_FOUND, ERROR_PARSE,
    MSG_INVALID_REQUEST, MSG_METHOD_NOT_FOUND, MSG_PARSE_ERROR,
};
use crate::constants::json_fields::{ARGUMENTS, NAME};
use crate::constants::protocol::{mcp_protocol_version, server_name, JSONRPC_VERSION, SERVER_VERSION};
use crate::logging::AppLogger;
use crate::mcp::schema::{InitializeResponse, ToolCallResponse, ToolsListResponse};
use crate::tools::{ToolContext, ToolError};

pub struct McpServer {
    context: Arc<ToolContext>,
}

impl McpServer {
    pub fn new(context: ToolContext) -> Self {
        Self {
            context: Arc::new(context),
        }
    }

    /// Serve the process's stdin/stdout until stdin closes
    pub async fn run_stdio(&self) -> Result<()> {
        info!("MCP server listening on stdio");
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = BufReader::new(reader).lines();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(response) = self.handle_line(&line).await {
                let mut encoded = serde_json::to_string(&response)?;
                encoded.push('\n');
                writer.write_all(encoded.as_bytes()).await?;
                writer.flush().await?;
            }
        }

        info!("stdin closed, shutting down");
        Ok(())
    }

    /// Decode and answer one line; `None` for notifications
    pub async fn handle_line(&self, line: &str) -> Option<McpResponse> {
        let raw: Value = match serde_json::from_str(line) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Unparseable request: {e}");
                return Some(McpResponse::error(
                    Value::Null,
                    ERROR_PARSE,
                    format!("{MSG_PARSE_ERROR}: {e}"),
                    None,
                ));
            }
        };

        let id = raw.get("id").cloned();
        match serde_json::from_value::<McpRequest>(raw) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => id.map(|id| {
                McpResponse::error(id, ERROR_INVALID_REQUEST, format!("{MSG_INVALID_REQUEST}: {e}"), None)
            }),
        }
    }

    pub async fn handle_request(&self, request: McpRequest) -> Option<McpResponse> {
        let Some(id) = request.id else {
            debug!("Notification received: {}", request.method);
            return None;
        };

        let response = match request.method.as_str() {
            "initialize" => {
                let init_response = InitializeResponse::new(mcp_protocol_version(), server_name(), SERVER_VERSION.to_string());
                McpResponse::from_serializable(id, &init_response)
            }
            "ping" => McpResponse::success(id, json!({})),
            "tools/list" => McpResponse::from_serializable(id, &ToolsListResponse::default()),
            "tools/call" => self.handle_tool_call(request.params.unwrap_or_default(), id).await,
            other => McpResponse::error(
                id,
                ERROR_METHOD_NOT_FOUND,
                format!("{MSG_METHOD_NOT_FOUND}: {other}"),
                None,
            ),
        };
        Some(response)
    }

    async fn handle_tool_call(&self, params: Value, id: Value) -> McpResponse {
        let Some(tool_name) = params.get(NAME).and_then(Value::as_str) else {
            return McpResponse::error(id, ERROR_INVALID_PARAMS, "tools/call requires a tool name".to_string(), None);
        };
        let arguments = params.get(ARGUMENTS).cloned().unwrap_or_else(|| json!({}));

        let started = Instant::now();
        let result = self.context.call_tool(tool_name, &arguments).await;
        #[allow(clippy::cast_possible_truncation)]
        let duration_ms = started.elapsed().as_millis() as u64;
        AppLogger::log_tool_call(tool_name, result.is_ok(), duration_ms);

        match result {
            Ok(value) => match ToolCallResponse::json(&value) {
                Ok(content) => McpResponse::from_serializable(id, &content),
                Err(e) => McpResponse::error(id, ERROR_INTERNAL_ERROR, format!("Failed to encode result: {e}"), None),
            },
            Err(error) => tool_error_response(id, error),
        }
    }
}

fn tool_error_response(id: Value, error: ToolError) -> McpResponse {
    let message = error.to_string();
    match error {
        ToolError::UnknownTool(_) => McpResponse::error(id, ERROR_METHOD_NOT_FOUND, message, None),
        ToolError::InvalidArguments(_) => McpResponse::error(id, ERROR_INVALID_PARAMS, message, None),
        ToolError::Validation(validation) => McpResponse::error(
            id,
            ERROR_INVALID_PARAMS,
            message,
            Some(json!({
                "path": validation.path.to_string(),
                "violation": validation.violation.to_string(),
            })),
        ),
        ToolError::Upstream(_) | ToolError::UnexpectedResponse { .. } | ToolError::Encoding(_) => {
            warn!("Tool call failed upstream: {message}");
            McpResponse::error(id, ERROR_INTERNAL_ERROR, message, None)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct McpRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
    /// Absent for notifications
    #[serde(default)]
    pub id: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<McpError>,
    pub id: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl McpResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn error(id: Value, code: i32, message: String, data: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: None,
            error: Some(McpError { code, message, data }),
            id,
        }
    }

    fn from_serializable<T: Serialize>(id: Value, result: &T) -> Self {
        match serde_json::to_value(result) {
            Ok(value) => Self::success(id, value),
            Err(e) => Self::error(id, ERROR_INTERNAL_ERROR, format!("Failed to encode result: {e}"), None),
        }
    }
}

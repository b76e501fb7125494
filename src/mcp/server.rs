use crate::app::App;
use crate::errors::{ErrorCode, McpError, ToolError, ToolErrorKind};
use crate::mcp::catalog::{tool_by_name, tool_catalog, unknown_tool_error, validate_tool_args};
use crate::mcp::protocol::{JsonRpcRequest, JsonRpcResponse};
use crate::services::tool_executor::ToolCallMeta;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};

const PROTOCOL_VERSION: &str = "2025-06-18";
const SERVER_NAME: &str = "branch-mcp";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

fn map_tool_error(tool: &str, error: &ToolError) -> McpError {
    let mut lines = vec![
        "BranchApiError".to_string(),
        format!("tool: {}", tool),
        format!("kind: {:?}", error.kind).to_lowercase(),
        format!("code: {}", error.code),
        format!("retryable: {}", error.retryable),
        format!("message: {}", error.message),
    ];
    if let Some(hint) = &error.hint {
        lines.push(format!("hint: {}", hint));
    }
    if let Some(status) = error
        .details
        .as_ref()
        .and_then(|d| d.get("status"))
        .and_then(|v| v.as_u64())
    {
        lines.push(format!("status: {}", status));
    }
    let message = lines.join("\n");

    match error.kind {
        ToolErrorKind::InvalidParams => McpError::new(ErrorCode::InvalidParams, message),
        ToolErrorKind::Timeout => McpError::new(ErrorCode::RequestTimeout, message),
        ToolErrorKind::Denied | ToolErrorKind::Conflict | ToolErrorKind::NotFound => {
            McpError::new(ErrorCode::InvalidRequest, message)
        }
        _ => McpError::new(ErrorCode::InternalError, message),
    }
}

pub struct McpServer {
    app: Arc<App>,
}

impl McpServer {
    pub fn new() -> Result<Self, ToolError> {
        let app = App::initialize()?;
        Ok(Self { app: Arc::new(app) })
    }

    fn handle_initialize(&self) -> Value {
        serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {"tools": {"list": true, "call": true}},
            "serverInfo": {"name": SERVER_NAME, "version": SERVER_VERSION},
        })
    }

    fn handle_tools_list(&self) -> Value {
        serde_json::json!({ "tools": tool_catalog() })
    }

    async fn handle_tools_call(&self, name: &str, args: Value) -> Result<Value, McpError> {
        if tool_by_name(name).is_none() {
            return Err(unknown_tool_error(name));
        }
        let args = if args.is_null() {
            serde_json::json!({})
        } else {
            args
        };
        validate_tool_args(name, &args)?;

        let meta = ToolCallMeta {
            trace_id: uuid::Uuid::new_v4().to_string(),
            span_id: uuid::Uuid::new_v4().to_string(),
        };
        let payload = self
            .app
            .tool_executor
            .execute(name, args, meta)
            .await
            .map_err(|err| map_tool_error(name, &err))?;

        Ok(serde_json::json!({
            "content": [{
                "type": "text",
                "text": serde_json::to_string(&payload).unwrap_or_else(|_| "{}".to_string()),
            }]
        }))
    }

    // Notifications are never answered, with or without an id; every
    // other method without an id is silently dropped per JSON-RPC.
    async fn dispatch(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        match request.method.as_str() {
            _ if request.method.starts_with("notifications/") => None,
            "initialize" => request
                .id
                .clone()
                .map(|id| JsonRpcResponse::success(id, self.handle_initialize())),
            "tools/list" => request
                .id
                .clone()
                .map(|id| JsonRpcResponse::success(id, self.handle_tools_list())),
            "tools/call" => match request.id.clone() {
                Some(id) => {
                    let params = request.params.as_object().cloned().unwrap_or_default();
                    let name = params.get("name").and_then(|v| v.as_str()).unwrap_or("");
                    if name.is_empty() {
                        Some(JsonRpcResponse::failure(
                            id,
                            ErrorCode::InvalidParams.as_i32(),
                            "Missing tool name".to_string(),
                        ))
                    } else {
                        let args = params.get("arguments").cloned().unwrap_or(Value::Null);
                        Some(match self.handle_tools_call(name, args).await {
                            Ok(result) => JsonRpcResponse::success(id, result),
                            Err(err) => {
                                JsonRpcResponse::failure(id, err.code.as_i32(), err.message)
                            }
                        })
                    }
                }
                None => None,
            },
            _ => request.id.clone().map(|id| {
                JsonRpcResponse::failure(
                    id,
                    ErrorCode::MethodNotFound.as_i32(),
                    "Method not found".to_string(),
                )
            }),
        }
    }

    pub async fn run_stdio(&self) -> Result<(), ToolError> {
        let stdin = tokio::io::stdin();
        let stdout = tokio::io::stdout();
        let mut reader = BufReader::new(stdin).lines();
        let mut writer = BufWriter::new(stdout);

        while let Some(line) = reader
            .next_line()
            .await
            .map_err(|err| ToolError::internal(err.to_string()))?
        {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let request: JsonRpcRequest = match serde_json::from_str(trimmed) {
                Ok(req) => req,
                Err(_) => {
                    let response = JsonRpcResponse::failure(
                        Value::Null,
                        ErrorCode::ParseError.as_i32(),
                        "Parse error".to_string(),
                    );
                    write_response(&mut writer, &response).await?;
                    continue;
                }
            };

            if let Some(response) = self.dispatch(request).await {
                write_response(&mut writer, &response).await?;
            }
        }

        Ok(())
    }
}

async fn write_response(
    writer: &mut BufWriter<tokio::io::Stdout>,
    response: &JsonRpcResponse,
) -> Result<(), ToolError> {
    let payload = serde_json::to_string(response).unwrap_or_default();
    writer.write_all(payload.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

pub async fn run_stdio() -> Result<(), ToolError> {
    let server = McpServer::new()?;
    server.run_stdio().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_errors_map_onto_json_rpc_codes() {
        let err = map_tool_error("mcp_links", &ToolError::invalid_params("url is required"));
        assert_eq!(err.code, ErrorCode::InvalidParams);
        assert!(err.message.contains("mcp_links"));
        assert!(err.message.contains("url is required"));

        let err = map_tool_error("mcp_apps", &ToolError::denied("401 Unauthorized"));
        assert_eq!(err.code, ErrorCode::InvalidRequest);

        let err = map_tool_error("mcp_exports", &ToolError::retryable("connect reset"));
        assert_eq!(err.code, ErrorCode::InternalError);
    }

    #[test]
    fn status_from_details_surfaces_in_message() {
        let err = ToolError::denied("Invalid access token")
            .with_details(serde_json::json!({"status": 401}));
        let mapped = map_tool_error("mcp_analytics", &err);
        assert!(mapped.message.contains("status: 401"));
    }

    fn request(raw: &str) -> JsonRpcRequest {
        serde_json::from_str(raw).expect("request must parse")
    }

    #[tokio::test]
    async fn notifications_never_get_a_response() {
        let server = McpServer::new().expect("server");
        let without_id =
            request(r#"{"jsonrpc":"2.0","method":"notifications/initialized","params":{}}"#);
        assert!(server.dispatch(without_id).await.is_none());

        // A stray id on a notification still must not produce a reply.
        let with_id =
            request(r#"{"jsonrpc":"2.0","id":7,"method":"notifications/initialized","params":{}}"#);
        assert!(server.dispatch(with_id).await.is_none());
    }

    #[tokio::test]
    async fn tools_list_answers_with_the_catalog() {
        let server = McpServer::new().expect("server");
        let response = server
            .dispatch(request(r#"{"jsonrpc":"2.0","id":1,"method":"tools/list","params":{}}"#))
            .await
            .expect("response");
        let result = response.result.expect("result");
        assert!(result["tools"]
            .as_array()
            .is_some_and(|tools| !tools.is_empty()));
    }
}

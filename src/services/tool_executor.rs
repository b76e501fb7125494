use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::ToolError;
use crate::services::logger::Logger;
use crate::utils::suggest::suggest;

#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn handle(&self, args: Value) -> Result<Value, ToolError>;
}

#[derive(Clone)]
pub struct ToolCallMeta {
    pub trace_id: String,
    pub span_id: String,
}

/// Dispatches tool calls to their handlers and wraps results in the
/// common envelope. Arguments are logged through the redacting logger, so
/// credential overrides never reach the log sink in clear text.
#[derive(Clone)]
pub struct ToolExecutor {
    logger: Logger,
    handlers: Arc<HashMap<String, Arc<dyn ToolHandler>>>,
}

impl ToolExecutor {
    pub fn new(logger: Logger, handlers: HashMap<String, Arc<dyn ToolHandler>>) -> Self {
        Self {
            logger: logger.child("executor"),
            handlers: Arc::new(handlers),
        }
    }

    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn has_handler(&self, tool: &str) -> bool {
        self.handlers.contains_key(tool)
    }

    pub async fn execute(
        &self,
        tool: &str,
        args: Value,
        meta: ToolCallMeta,
    ) -> Result<Value, ToolError> {
        let Some(handler) = self.handlers.get(tool) else {
            let known = self.tool_names();
            let suggestions = suggest(tool, &known, 3);
            let mut err = ToolError::not_found(format!("Unknown tool: {}", tool));
            if !suggestions.is_empty() {
                err = err.with_hint(format!("Did you mean: {}?", suggestions.join(", ")));
            }
            return Err(err.with_details(serde_json::json!({"known_tools": known})));
        };

        self.logger.debug(
            "execute",
            Some(&serde_json::json!({
                "tool": tool,
                "trace_id": meta.trace_id,
                "args": args,
            })),
        );

        let started = std::time::Instant::now();
        let result = handler.handle(args.clone()).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(value) => Ok(serde_json::json!({
                "result": value,
                "meta": {
                    "tool": tool,
                    "action": args.get("action").cloned().unwrap_or(Value::Null),
                    "duration_ms": duration_ms,
                    "trace_id": meta.trace_id,
                    "span_id": meta.span_id,
                },
            })),
            Err(err) => {
                self.logger.warn(
                    "tool_failed",
                    Some(&serde_json::json!({
                        "tool": tool,
                        "kind": err.kind,
                        "code": err.code,
                        "duration_ms": duration_ms,
                        "trace_id": meta.trace_id,
                    })),
                );
                Err(err)
            }
        }
    }
}

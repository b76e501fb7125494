use crate::errors::{ErrorCode, McpError};
use crate::utils::suggest::suggest;
use jsonschema::JSONSchema;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDef {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

static TOOL_CATALOG: Lazy<Vec<ToolDef>> = Lazy::new(|| {
    let raw = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tool_catalog.json"));
    serde_json::from_str(raw).expect("tool_catalog.json must be valid JSON")
});

static TOOL_MAP: Lazy<HashMap<String, ToolDef>> = Lazy::new(|| {
    TOOL_CATALOG
        .iter()
        .cloned()
        .map(|tool| (tool.name.clone(), tool))
        .collect()
});

static TOOL_VALIDATORS: Lazy<HashMap<String, JSONSchema>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for tool in TOOL_CATALOG.iter() {
        if let Ok(schema) = JSONSchema::compile(&tool.input_schema) {
            map.insert(tool.name.clone(), schema);
        }
    }
    map
});

pub fn tool_catalog() -> &'static Vec<ToolDef> {
    &TOOL_CATALOG
}

pub fn tool_by_name(name: &str) -> Option<&'static ToolDef> {
    TOOL_MAP.get(name)
}

pub fn unknown_tool_error(name: &str) -> McpError {
    let known: Vec<String> = TOOL_CATALOG.iter().map(|tool| tool.name.clone()).collect();
    let suggestions = suggest(name, &known, 3);
    let mut message = format!("Unknown tool: {}", name);
    if !suggestions.is_empty() {
        message.push_str(&format!(". Did you mean: {}?", suggestions.join(", ")));
    }
    McpError::new(ErrorCode::MethodNotFound, message)
}

pub fn validate_tool_args(tool_name: &str, args: &Value) -> Result<(), McpError> {
    let Some(schema) = TOOL_VALIDATORS.get(tool_name) else {
        return Ok(());
    };
    if let Err(errors) = schema.validate(args) {
        let mut lines: Vec<String> = errors
            .take(5)
            .map(|err| {
                let path = err.instance_path.to_string();
                if path.is_empty() {
                    err.to_string()
                } else {
                    format!("{}: {}", path, err)
                }
            })
            .collect();
        lines.insert(0, format!("Invalid arguments for {}", tool_name));
        return Err(McpError::new(ErrorCode::InvalidParams, lines.join("\n")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_loads_and_indexes_tools() {
        assert!(!tool_catalog().is_empty());
        assert!(tool_by_name("mcp_links").is_some());
        assert!(tool_by_name("nope").is_none());
    }

    #[test]
    fn every_tool_schema_compiles() {
        for tool in tool_catalog() {
            assert!(
                TOOL_VALIDATORS.contains_key(&tool.name),
                "schema for {} failed to compile",
                tool.name
            );
        }
    }

    #[test]
    fn missing_action_is_rejected() {
        let err = validate_tool_args("mcp_links", &serde_json::json!({}))
            .expect_err("action is required");
        assert_eq!(err.code, ErrorCode::InvalidParams);
    }

    #[test]
    fn unexpected_property_is_rejected() {
        let args = serde_json::json!({"action": "create", "bogus": 1});
        assert!(validate_tool_args("mcp_links", &args).is_err());
    }

    #[test]
    fn valid_args_pass() {
        let args = serde_json::json!({
            "action": "create",
            "alias": "spring-sale",
            "data": {"$canonical_url": "https://example.com/spring"},
        });
        assert!(validate_tool_args("mcp_links", &args).is_ok());
    }

    #[test]
    fn unknown_tool_error_suggests_close_names() {
        let err = unknown_tool_error("mcp_link");
        assert!(err.message.contains("mcp_links"));
    }
}

use crate::errors::ToolError;
use crate::utils::suggest::suggest;
use serde_json::Value;

pub fn unknown_action_error(
    tool: &str,
    action: Option<&Value>,
    known_actions: &[&str],
) -> ToolError {
    let action_value = action
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    let known: Vec<String> = known_actions.iter().map(|s| s.to_string()).collect();
    let suggestions = if action_value.is_empty() {
        Vec::new()
    } else {
        suggest(&action_value, &known, 5)
    };

    let mut hint_parts = Vec::new();
    if !suggestions.is_empty() {
        hint_parts.push(format!("Did you mean: {}?", suggestions.join(", ")));
    }
    if !known.is_empty() {
        hint_parts.push(format!("Use one of: {}.", known.join(", ")));
    }

    let mut err = ToolError::invalid_params(format!("Unknown {} action: {}", tool, action_value));
    if !hint_parts.is_empty() {
        err = err.with_hint(hint_parts.join(" "));
    }
    if !known.is_empty() {
        err = err.with_details(serde_json::json!({
            "known_actions": known,
            "did_you_mean": suggestions,
        }));
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_action_carries_suggestions() {
        let err = unknown_action_error(
            "mcp_links",
            Some(&Value::String("craete".to_string())),
            &["create", "read", "update"],
        );
        let hint = err.hint.expect("hint");
        assert!(hint.contains("create"));
        assert!(err.message.contains("mcp_links"));
    }

    #[test]
    fn missing_action_still_lists_known_actions() {
        let err = unknown_action_error("mcp_qr", None, &["create"]);
        assert!(err.hint.expect("hint").contains("create"));
    }
}

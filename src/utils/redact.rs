use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;

const REDACTION: &str = "[REDACTED]";
const INLINE_REDACTION: &str = "***REDACTED***";

// Recursion guard: serde_json values are acyclic, but a hostile payload
// can still nest deeply enough to blow the stack.
const MAX_DEPTH: usize = 64;

static SENSITIVE_KEYS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "branch_key",
        "branch_secret",
        "api_key",
        "auth_token",
        "access_token",
        "authorization",
        "password",
        "secret",
    ]
    .into_iter()
    .collect()
});

static SENSITIVE_HEADER_KEYS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["authorization", "access-token", "x-api-key", "x-auth-token"]
        .into_iter()
        .collect()
});

static INLINE_REDACTION_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (
            Regex::new(r"\bkey_(live|test)_[A-Za-z0-9]{10,}\b").expect("inline redaction regex"),
            "key_${1}_***REDACTED***",
        ),
        (
            Regex::new(r"\bsecret_(live|test)_[A-Za-z0-9]{10,}\b").expect("inline redaction regex"),
            "secret_${1}_***REDACTED***",
        ),
        (
            Regex::new(r"\b(Bearer)\s+([A-Za-z0-9._~-]{10,})\b").expect("inline redaction regex"),
            "$1 ***REDACTED***",
        ),
        (
            Regex::new(r#"\b(api[_-]?key|auth[_-]?token|access[_-]?token|secret)\b\s*([:=])\s*([^\s"'`]+)"#)
                .expect("inline redaction regex"),
            "$1$2***REDACTED***",
        ),
    ]
});

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

pub fn is_sensitive_key(key: &str) -> bool {
    let normalized = normalize_key(key);
    if normalized.is_empty() {
        return false;
    }
    if SENSITIVE_KEYS.contains(normalized.as_str()) {
        return true;
    }
    normalized.contains("secret") || normalized.contains("token") || normalized.contains("password")
}

pub fn redact_text(value: &str) -> String {
    let mut out = value.to_string();
    for (re, replacement) in INLINE_REDACTION_PATTERNS.iter() {
        if re.is_match(&out) {
            out = re.replace_all(&out, *replacement).to_string();
        }
    }
    out
}

// Header maps get both checks: the header-specific names and the
// regular sensitive-key rules, and non-string entries recurse so a
// sensitive key can never hide inside a headers object.
fn redact_headers(value: &Value, depth: usize) -> Value {
    let mut out = serde_json::Map::new();
    if let Some(map) = value.as_object() {
        for (key, entry) in map.iter() {
            let normalized = normalize_key(key);
            if SENSITIVE_HEADER_KEYS.contains(normalized.as_str()) || is_sensitive_key(key) {
                out.insert(key.clone(), Value::String(REDACTION.to_string()));
            } else if let Some(text) = entry.as_str() {
                out.insert(key.clone(), Value::String(redact_text(text)));
            } else {
                out.insert(key.clone(), redact_value(entry, depth + 1));
            }
        }
    }
    Value::Object(out)
}

fn redact_value(value: &Value, depth: usize) -> Value {
    if depth >= MAX_DEPTH {
        return Value::String(REDACTION.to_string());
    }
    match value {
        Value::Null | Value::Bool(_) | Value::Number(_) => value.clone(),
        Value::String(text) => Value::String(redact_text(text)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| redact_value(item, depth + 1))
                .collect(),
        ),
        Value::Object(map) => {
            let mut out = serde_json::Map::new();
            for (key, entry) in map.iter() {
                if key == "headers" && entry.is_object() {
                    out.insert(key.clone(), redact_headers(entry, depth + 1));
                    continue;
                }
                if is_sensitive_key(key) {
                    out.insert(key.clone(), Value::String(REDACTION.to_string()));
                    continue;
                }
                out.insert(key.clone(), redact_value(entry, depth + 1));
            }
            Value::Object(out)
        }
    }
}

/// Returns a deep copy of `value` with every entry under a sensitive key
/// replaced by a fixed placeholder, recursing through nested objects and
/// array elements. The input is never mutated. Applied by the logger as
/// the last step before a structured record is emitted.
pub fn redact_object(value: &Value) -> Value {
    redact_value(value, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_sensitive_keys_at_any_depth() {
        let input = serde_json::json!({
            "branch_key": "k",
            "nested": {"auth_token": "t", "ok": "v"},
        });
        let out = redact_object(&input);
        assert_eq!(out["branch_key"], REDACTION);
        assert_eq!(out["nested"]["auth_token"], REDACTION);
        assert_eq!(out["nested"]["ok"], "v");
    }

    #[test]
    fn recurses_into_array_elements() {
        let input = serde_json::json!({
            "links": [{"api_key": "a"}, {"alias": "spring-sale"}],
        });
        let out = redact_object(&input);
        assert_eq!(out["links"][0]["api_key"], REDACTION);
        assert_eq!(out["links"][1]["alias"], "spring-sale");
    }

    #[test]
    fn does_not_mutate_input() {
        let input = serde_json::json!({"branch_secret": "s"});
        let _ = redact_object(&input);
        assert_eq!(input["branch_secret"], "s");
    }

    #[test]
    fn leaves_scalars_and_plain_keys_alone() {
        let input = serde_json::json!({"count": 3, "enabled": true, "note": null});
        assert_eq!(redact_object(&input), input);
    }

    #[test]
    fn redacts_sensitive_headers() {
        let input = serde_json::json!({
            "headers": {"Access-Token": "tok", "accept": "application/json"},
        });
        let out = redact_object(&input);
        assert_eq!(out["headers"]["Access-Token"], REDACTION);
        assert_eq!(out["headers"]["accept"], "application/json");
    }

    #[test]
    fn sensitive_keys_inside_headers_are_redacted() {
        let input = serde_json::json!({
            "headers": {"auth_token": "tok-secret-value", "accept": "application/json"},
        });
        let out = redact_object(&input);
        assert_eq!(out["headers"]["auth_token"], REDACTION);
        assert_eq!(out["headers"]["accept"], "application/json");
    }

    #[test]
    fn header_redaction_recurses_into_nested_objects() {
        let input = serde_json::json!({
            "headers": {"meta": {"branch_secret": "s", "ok": "v"}},
        });
        let out = redact_object(&input);
        assert_eq!(out["headers"]["meta"]["branch_secret"], REDACTION);
        assert_eq!(out["headers"]["meta"]["ok"], "v");
    }

    #[test]
    fn inline_branch_keys_are_scrubbed_from_strings() {
        let out = redact_text("failed for key_live_abcDEF123456 during export");
        assert!(!out.contains("abcDEF123456"));
        assert!(out.contains("key_live_***REDACTED***"));
    }

    #[test]
    fn terminates_on_deep_nesting() {
        let mut value = serde_json::json!("leaf");
        for _ in 0..200 {
            value = serde_json::json!({ "inner": value });
        }
        let out = redact_object(&value);
        assert!(out.is_object());
    }
}

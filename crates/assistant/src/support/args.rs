#![forbid(unsafe_code)]

//! Argument extraction for tool calls.
//!
//! The conversational model's serializer is sloppy about absence: a field
//! it means to omit may arrive as JSON null, the string "null", or the
//! string "undefined". Every extractor here treats all three as "not
//! provided" so that downstream code only ever sees real values.

use crate::support::ai::ai_error;
use dbl_core::ids::TeamId;
use dbl_core::resolve::{is_absent_token, is_unassigned_token};
use serde_json::Value;

pub(crate) fn require_team(
    args: &serde_json::Map<String, Value>,
    default_team: Option<&str>,
) -> Result<TeamId, Value> {
    let raw = match optional_text(args, "team")? {
        Some(v) => v,
        None => match default_team {
            Some(v) => v.to_string(),
            None => {
                return Err(ai_error(
                    "INVALID_INPUT",
                    "team is required (no default team configured)",
                ));
            }
        },
    };
    TeamId::try_new(raw).map_err(|_| {
        ai_error(
            "INVALID_INPUT",
            "team must start with an alphanumeric character and use only alphanumerics, '.', '_', '/' or '-'",
        )
    })
}

pub(crate) fn optional_text(
    args: &serde_json::Map<String, Value>,
    key: &str,
) -> Result<Option<String>, Value> {
    let Some(value) = args.get(key) else {
        return Ok(None);
    };
    match value {
        Value::Null => Ok(None),
        Value::String(v) => {
            if is_absent_token(v) {
                Ok(None)
            } else {
                Ok(Some(v.trim().to_string()))
            }
        }
        _ => Err(ai_error(
            "INVALID_INPUT",
            &format!("{key} must be a string"),
        )),
    }
}

pub(crate) fn require_text(
    args: &serde_json::Map<String, Value>,
    key: &str,
) -> Result<String, Value> {
    match optional_text(args, key)? {
        Some(v) => Ok(v),
        None => Err(ai_error("INVALID_INPUT", &format!("{key} is required"))),
    }
}

/// Assignee semantics differ from every other field: a present-but-empty
/// value ("unassigned", "null", "undefined", JSON null) means "clear the
/// assignee", while a missing key means "leave it alone".
pub(crate) fn assignee_field(
    args: &serde_json::Map<String, Value>,
    key: &str,
) -> Result<Option<Option<String>>, Value> {
    let Some(value) = args.get(key) else {
        return Ok(None);
    };
    match value {
        Value::Null => Ok(Some(None)),
        Value::String(v) => {
            if is_unassigned_token(v) {
                Ok(Some(None))
            } else {
                Ok(Some(Some(v.trim().to_string())))
            }
        }
        _ => Err(ai_error(
            "INVALID_INPUT",
            &format!("{key} must be a string or null"),
        )),
    }
}

/// Accepts an array of strings, or a bare string for a single entry (the
/// model does both). Absent-token entries are dropped.
pub(crate) fn optional_text_list(
    args: &serde_json::Map<String, Value>,
    key: &str,
) -> Result<Option<Vec<String>>, Value> {
    let Some(value) = args.get(key) else {
        return Ok(None);
    };
    match value {
        Value::Null => Ok(None),
        Value::String(v) => {
            if is_absent_token(v) {
                Ok(None)
            } else {
                Ok(Some(vec![v.trim().to_string()]))
            }
        }
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                let Some(text) = item.as_str() else {
                    return Err(ai_error(
                        "INVALID_INPUT",
                        &format!("{key} items must be strings"),
                    ));
                };
                if !is_absent_token(text) {
                    out.push(text.trim().to_string());
                }
            }
            Ok(Some(out))
        }
        _ => Err(ai_error(
            "INVALID_INPUT",
            &format!("{key} must be an array of strings"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> serde_json::Map<String, Value> {
        value.as_object().cloned().expect("object literal")
    }

    #[test]
    fn absent_tokens_read_as_missing() {
        let args = args(json!({
            "a": null,
            "b": "null",
            "c": "undefined",
            "d": "  ",
            "e": "real"
        }));
        for key in ["a", "b", "c", "d", "missing"] {
            assert_eq!(optional_text(&args, key).expect("ok"), None, "key {key}");
        }
        assert_eq!(
            optional_text(&args, "e").expect("ok"),
            Some("real".to_string())
        );
        assert!(require_text(&args, "b").is_err());
    }

    #[test]
    fn assignee_field_distinguishes_clear_from_keep() {
        let args = args(json!({
            "cleared": "unassigned",
            "also_cleared": null,
            "set": "Alice"
        }));
        assert_eq!(assignee_field(&args, "missing").expect("ok"), None);
        assert_eq!(assignee_field(&args, "cleared").expect("ok"), Some(None));
        assert_eq!(assignee_field(&args, "also_cleared").expect("ok"), Some(None));
        assert_eq!(
            assignee_field(&args, "set").expect("ok"),
            Some(Some("Alice".to_string()))
        );
    }

    #[test]
    fn text_list_accepts_bare_strings_and_filters_junk() {
        let args = args(json!({
            "one": "bug",
            "many": ["bug", "null", "ui"],
            "bad": [1, 2]
        }));
        assert_eq!(
            optional_text_list(&args, "one").expect("ok"),
            Some(vec!["bug".to_string()])
        );
        assert_eq!(
            optional_text_list(&args, "many").expect("ok"),
            Some(vec!["bug".to_string(), "ui".to_string()])
        );
        assert!(optional_text_list(&args, "bad").is_err());
    }

    #[test]
    fn team_falls_back_to_the_configured_default() {
        let empty = args(json!({}));
        let team = require_team(&empty, Some("acme")).expect("default team");
        assert_eq!(team.as_str(), "acme");
        assert!(require_team(&empty, None).is_err());

        let explicit = args(json!({ "team": "other" }));
        let team = require_team(&explicit, Some("acme")).expect("explicit team");
        assert_eq!(team.as_str(), "other");
    }
}

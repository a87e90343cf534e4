#![forbid(unsafe_code)]

use dbl_storage::StoreError;
use serde_json::{Value, json};

pub(crate) fn format_store_error(err: StoreError) -> String {
    match err {
        StoreError::Io(e) => format!("IO: {e}"),
        StoreError::Sql(e) => format!("SQL: {e}"),
        StoreError::InvalidInput(msg) => format!("Invalid input: {msg}"),
        StoreError::UnknownId => "Unknown id".to_string(),
        StoreError::DuplicateProjectKey { key } => {
            format!("The project key '{key}' is already in use.")
        }
    }
}

pub(crate) fn ai_ok(intent: &str, result: Value) -> Value {
    json!({
        "success": true,
        "intent": intent,
        "result": result,
        "summary": null,
        "error": null
    })
}

/// `summary` is the dispatcher's human-readable line; the chat layer
/// renders it into the turn and downstream view refreshers pattern-match
/// on it, so it names the entity kind and the past-tense action.
pub(crate) fn ai_ok_with_summary(intent: &str, summary: &str, result: Value) -> Value {
    json!({
        "success": true,
        "intent": intent,
        "result": result,
        "summary": summary,
        "error": null
    })
}

pub(crate) fn ai_error(code: &str, message: &str) -> Value {
    ai_error_with(code, message, None)
}

pub(crate) fn ai_error_with(code: &str, message: &str, detail: Option<Value>) -> Value {
    let mut error_obj = serde_json::Map::new();
    error_obj.insert("code".to_string(), Value::String(code.to_string()));
    error_obj.insert(
        "message".to_string(),
        Value::String(message.trim().to_string()),
    );
    if let Some(Value::Object(extra)) = detail {
        for (key, value) in extra {
            error_obj.insert(key, value);
        }
    }

    json!({
        "success": false,
        "intent": "error",
        "result": {},
        "summary": null,
        "error": Value::Object(error_obj)
    })
}

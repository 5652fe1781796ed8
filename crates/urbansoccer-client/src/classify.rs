//! Maps HTTP failures onto the `ClientError` taxonomy.

use serde_json::Value;
use urbansoccer_core::error::ClientError;

/// Which call a failed response answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operation {
    /// Playing a card; the only call whose 400 means an invalid action.
    Submit,
    /// Any other campaign or narration call.
    Other,
}

pub(crate) fn from_status(operation: Operation, status: u16, body: &str) -> ClientError {
    let detail = extract_detail(body);
    match status {
        401 => ClientError::Unauthorized,
        404 => ClientError::NotFound(detail.unwrap_or_else(|| "resource not found".to_owned())),
        400 if operation == Operation::Submit => ClientError::InvalidAction { detail },
        500 => ClientError::Unknown {
            status: Some(status),
            detail: detail.or_else(|| Some("Internal server error.".to_owned())),
        },
        _ => ClientError::Unknown {
            status: Some(status),
            detail,
        },
    }
}

pub(crate) fn from_transport(error: &reqwest::Error) -> ClientError {
    if error.is_timeout() {
        ClientError::Connectivity("request timed out".to_owned())
    } else if error.is_decode() {
        ClientError::Unknown {
            status: None,
            detail: Some(format!("malformed response: {error}")),
        }
    } else {
        ClientError::Connectivity(error.to_string())
    }
}

/// Pulls a human-readable detail out of an error body.
///
/// Understands `{"detail": "..."}`, `{"message": "..."}` and validation
/// arrays `{"detail": [{"loc": [..., "field"], "msg": "..."}]}`, which are
/// rendered as `field: msg` pairs.
pub(crate) fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail") {
        Some(Value::String(detail)) if !detail.trim().is_empty() => Some(detail.clone()),
        Some(Value::Array(items)) => {
            let parts: Vec<String> = items.iter().filter_map(validation_message).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        _ => value
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.trim().is_empty())
            .map(str::to_owned),
    }
}

fn validation_message(item: &Value) -> Option<String> {
    let msg = item.get("msg").and_then(Value::as_str)?;
    let field = item
        .get("loc")
        .and_then(Value::as_array)
        .and_then(|loc| loc.last())
        .map(|field| match field {
            Value::String(name) => name.clone(),
            other => other.to_string(),
        });
    Some(match field {
        Some(field) => format!("{field}: {msg}"),
        None => msg.to_owned(),
    })
}

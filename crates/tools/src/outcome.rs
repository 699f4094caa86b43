//! Argument decoding and outcome reporting shared by every store tool.

use serde::Serialize;
use serde::de::DeserializeOwned;
use shopbot_core::error::{ErrorKind, ServiceError, ToolError};
use shopbot_core::tool::ToolOutcome;
use tracing::{error, info, warn};

/// Longest response preview written to the log.
pub const PREVIEW_CHARS: usize = 300;

/// Decode tool arguments. A missing argument object counts as `{}`.
pub(crate) fn decode<T: DeserializeOwned>(tool: &str, arguments: serde_json::Value) -> Result<T, ToolError> {
    let arguments = if arguments.is_null() {
        serde_json::json!({})
    } else {
        arguments
    };
    serde_json::from_value(arguments).map_err(|e| rejected(tool, e.to_string()))
}

/// Build an `InvalidArguments` error and log it.
pub(crate) fn rejected(tool: &str, reason: impl Into<String>) -> ToolError {
    let reason = reason.into();
    warn!(tool, kind = %ErrorKind::InvalidArguments, error = %reason, "Tool arguments rejected");
    ToolError::InvalidArguments(reason)
}

/// Require a positive quantity that fits the service's integer range.
pub(crate) fn quantity(tool: &str, value: i64) -> Result<u32, ToolError> {
    match u32::try_from(value) {
        Ok(q) if q > 0 => Ok(q),
        _ => Err(rejected(tool, format!("quantity must be a positive integer, got {value}"))),
    }
}

/// Require a non-blank string argument.
pub(crate) fn non_blank<'a>(tool: &str, field: &str, value: &'a str) -> Result<&'a str, ToolError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(rejected(tool, format!("'{field}' must not be empty")));
    }
    Ok(trimmed)
}

/// Turn a service response into an outcome and log the call.
///
/// `signature` is the call as the model wrote it, e.g.
/// `add_product_to_basket(sku="soda-6pk", quantity=3)`.
pub(crate) fn report<T: Serialize>(signature: &str, result: Result<T, ServiceError>) -> ToolOutcome {
    let outcome = match result {
        Ok(value) => ToolOutcome::success(&value),
        Err(e) => e.into(),
    };

    match &outcome {
        ToolOutcome::Success { .. } => {
            info!(call = %signature, response = %preview(&outcome.to_wire()), "Tool call");
        }
        ToolOutcome::Error { kind: ErrorKind::Internal, message } => {
            error!(call = %signature, error = %message, "Tool call failed");
        }
        ToolOutcome::Error { kind, message } => {
            warn!(call = %signature, %kind, error = %message, "Tool call rejected");
        }
    }
    outcome
}

/// Truncate to [`PREVIEW_CHARS`] characters, marking the cut.
pub fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

//! One typed decoder per endpoint.
//!
//! The backend sometimes wraps payloads as `{"data": ...}` and sometimes
//! returns them bare; these decoders accept both so callers never see the
//! envelope.

use serde::de::DeserializeOwned;
use serde_json::Value;

use jobwatch_core::{JobTicket, ResultOutcome, StatusSnapshot};

use crate::ClientError;

const DEFAULT_REJECTION: &str = "The backend reported that the job did not succeed.";

/// Reply to a submission.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitReply<O> {
    Accepted(JobTicket),
    /// Synchronous answer carrying the final payload.
    Inline(O),
}

pub fn decode_submit_reply<O: DeserializeOwned>(
    body: &[u8],
    allow_inline: bool,
) -> Result<SubmitReply<O>, ClientError> {
    let value = unwrap_data(parse(body)?);

    if let Some(job_id) = value.get("job_id").and_then(job_id_text) {
        let mut ticket = JobTicket::with_default_urls(job_id);
        if let Some(poll_url) = non_empty_str(&value, "poll_url") {
            ticket.poll_url = poll_url;
        }
        if let Some(result_url) = non_empty_str(&value, "result_url") {
            ticket.result_url = result_url;
        }
        return Ok(SubmitReply::Accepted(ticket));
    }

    if let Some(message) = rejection(&value) {
        return Err(ClientError::Rejected(message));
    }
    if allow_inline {
        if let Ok(output) = serde_json::from_value(value) {
            return Ok(SubmitReply::Inline(output));
        }
    }
    Err(ClientError::MissingJobId)
}

pub fn decode_snapshot(body: &[u8]) -> Result<StatusSnapshot, ClientError> {
    let value = unwrap_data(parse(body)?);
    serde_json::from_value(value).map_err(|err| ClientError::InvalidResponse(err.to_string()))
}

pub fn decode_result<O: DeserializeOwned>(body: &[u8]) -> Result<ResultOutcome<O>, ClientError> {
    let value = parse(body)?;
    if let Some(message) = rejection(&value) {
        return Ok(ResultOutcome::Rejected(message));
    }
    let value = unwrap_data(value);
    if let Some(message) = rejection(&value) {
        return Ok(ResultOutcome::Rejected(message));
    }
    serde_json::from_value(value)
        .map(ResultOutcome::Delivered)
        .map_err(|err| ClientError::InvalidResponse(err.to_string()))
}

/// Best-effort human message from an error body such as `{"detail": "..."}`.
pub(crate) fn error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let value = unwrap_data(value);
    ["detail", "error", "message"]
        .iter()
        .find_map(|key| non_empty_str(&value, key))
}

fn parse(body: &[u8]) -> Result<Value, ClientError> {
    serde_json::from_slice(body).map_err(|err| ClientError::InvalidResponse(err.to_string()))
}

fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.get("data").is_some_and(Value::is_object) => map
            .remove("data")
            .unwrap_or(Value::Null),
        other => other,
    }
}

/// Message of a `success: false` payload, if it is one.
fn rejection(value: &Value) -> Option<String> {
    if value.get("success").and_then(Value::as_bool) != Some(false) {
        return None;
    }
    Some(
        non_empty_str(value, "error")
            .or_else(|| non_empty_str(value, "message"))
            .unwrap_or_else(|| DEFAULT_REJECTION.to_string()),
    )
}

fn job_id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn non_empty_str(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
        .map(ToOwned::to_owned)
}

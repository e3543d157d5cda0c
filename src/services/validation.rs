use serde_json::Value;

use crate::constants::PAYLOAD_SAMPLE_CHARS;
use crate::error::ChatError;
use crate::models::{ChatRequest, Message};
use crate::utils::truncate_chars;

/// A request that passed validation, ready to be sent upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedChat {
    pub contents: Vec<Message>,
    pub system_instruction: Option<String>,
}

const MISSING_INPUT: &str = "missing \"message\" and \"history\".";

/// Parse and validate a raw `/api/chat` body.
///
/// Rejects the body when it is not JSON, or when it has neither a non-empty
/// `message` nor a non-empty array `history`. History entries come first,
/// followed by one user turn holding `message`.
pub fn validate_chat_request(body: &[u8]) -> Result<ValidatedChat, ChatError> {
    let payload: Value = serde_json::from_slice(body).map_err(|e| {
        log::warn!(
            "❌ Validation failed: body is not JSON ({}) payloadSample={}",
            e,
            truncate_chars(&String::from_utf8_lossy(body), PAYLOAD_SAMPLE_CHARS)
        );
        ChatError::InvalidRequest(format!("body is not valid JSON: {}", e))
    })?;

    let request: ChatRequest = match &payload {
        Value::Null => ChatRequest::default(),
        other => serde_json::from_value(other.clone())
            .map_err(|e| reject(&payload, &e.to_string()))?,
    };

    let message = request.message.filter(|m| !m.is_empty());
    let history = match request.history {
        Some(Value::Array(items)) if !items.is_empty() => Some(items),
        Some(Value::Array(_)) | Some(Value::Null) | None => None,
        Some(other) => {
            if message.is_none() {
                return Err(reject(&payload, MISSING_INPUT));
            }
            log::warn!(
                "⚠️  Ignoring non-array \"history\" ({})",
                json_type_name(&other)
            );
            None
        }
    };

    if message.is_none() && history.is_none() {
        return Err(reject(&payload, MISSING_INPUT));
    }

    let mut contents = Vec::with_capacity(history.as_ref().map_or(0, Vec::len) + 1);
    for (idx, entry) in history.into_iter().flatten().enumerate() {
        let turn: Message = serde_json::from_value(entry).map_err(|e| {
            reject(&payload, &format!("history[{}] is not a {{role, parts}} message: {}", idx, e))
        })?;
        contents.push(turn);
    }
    if let Some(text) = message {
        contents.push(Message::user(text));
    }

    log::debug!("📊 Validated chat request: {} contents", contents.len());

    Ok(ValidatedChat {
        contents,
        system_instruction: request.system_instruction.filter(|s| !s.trim().is_empty()),
    })
}

fn reject(payload: &Value, reason: &str) -> ChatError {
    let sample = serde_json::to_string(payload).unwrap_or_default();
    log::warn!(
        "❌ Validation failed: {} payloadSample={}",
        reason,
        truncate_chars(&sample, PAYLOAD_SAMPLE_CHARS)
    );
    ChatError::InvalidRequest(reason.to_string())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

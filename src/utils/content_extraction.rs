use serde_json::Value;

use crate::error::ChunkError;

/// Extract the text of a streamed generation payload.
///
/// Joins every `text` part of the first candidate, skipping parts flagged as
/// `thought`. Returns `Ok(None)` when the payload simply carries no text
/// (usage-only or prompt-feedback chunks) and an error when the shape is wrong.
pub fn extract_chunk_text(payload: &Value) -> Result<Option<String>, ChunkError> {
    let obj = payload
        .as_object()
        .ok_or_else(|| ChunkError::Shape("payload is not an object".into()))?;

    let candidates = match obj.get("candidates") {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Array(arr)) => arr,
        Some(_) => return Err(ChunkError::Shape("`candidates` is not an array".into())),
    };

    if candidates.len() > 1 {
        log::debug!(
            "⚠️  Chunk has {} candidates, only the first one is forwarded",
            candidates.len()
        );
    }
    let Some(first) = candidates.first() else {
        return Ok(None);
    };

    let parts = match first.get("content").and_then(|c| c.get("parts")) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Array(arr)) => arr,
        Some(_) => return Err(ChunkError::Shape("`parts` is not an array".into())),
    };

    let mut text = String::new();
    let mut has_text = false;
    for part in parts {
        if part.get("thought").and_then(Value::as_bool) == Some(true) {
            continue;
        }
        match part.get("text") {
            None | Some(Value::Null) => {}
            Some(Value::String(s)) => {
                has_text = true;
                text.push_str(s);
            }
            Some(_) => return Err(ChunkError::Shape("`text` is not a string".into())),
        }
    }

    Ok(has_text.then_some(text))
}

/// Pull the human readable message out of an upstream error body
/// (`{"error": {"message": ...}}`), falling back to the error status name.
pub fn extract_upstream_error_message(body: &Value) -> Option<String> {
    let error_obj = body.get("error")?;
    if let Some(s) = error_obj.as_str() {
        return Some(s.to_string());
    }
    error_obj
        .get("message")
        .or_else(|| error_obj.get("status"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Truncate to at most `max_chars` characters without splitting a code point
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

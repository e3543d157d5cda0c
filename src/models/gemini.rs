use serde::Serialize;
use serde_json::Value;

use crate::error::ChunkError;
use crate::models::{Message, Part};
use crate::utils::content_extraction::extract_chunk_text;

// ---------- Request ----------

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<SystemInstruction>,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct SystemInstruction {
    pub parts: Vec<Part>,
}

impl SystemInstruction {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![Part { text: text.into() }],
        }
    }
}

// ---------- Streamed response ----------

/// One item of the upstream sequence.
/// Payloads that failed to parse are kept so the failure surfaces when the
/// text is read, which lets the bridge skip just that chunk.
#[derive(Debug, Clone)]
pub struct GenerationChunk {
    payload: Result<Value, String>,
}

impl GenerationChunk {
    pub fn new(payload: Value) -> Self {
        Self {
            payload: Ok(payload),
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self {
            payload: Err(reason.into()),
        }
    }

    /// Text carried by this chunk, `None` when it carries no text at all.
    pub fn text(&self) -> Result<Option<String>, ChunkError> {
        match &self.payload {
            Ok(value) => extract_chunk_text(value),
            Err(reason) => Err(ChunkError::Unparseable(reason.clone())),
        }
    }
}

#[cfg(test)]
impl GenerationChunk {
    /// Chunk shaped like a single-candidate streaming response with one text part.
    pub fn with_text(text: &str) -> Self {
        Self::new(serde_json::json!({
            "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
        }))
    }
}

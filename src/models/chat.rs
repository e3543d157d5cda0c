use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /api/chat`.
/// `history` stays untyped until validation so a non-array value can be reported
/// instead of failing deserialization of the whole body.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub history: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub system_instruction: Option<String>,
}

/// One conversation turn, in the shape the upstream expects.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Message {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Part {
    pub text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            parts: vec![Part { text: text.into() }],
        }
    }
}

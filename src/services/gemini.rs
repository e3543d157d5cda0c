//! Gemini REST client for streamed generation.
//!
//! Calls `models/{model}:streamGenerateContent?alt=sse` and exposes the SSE body
//! as a pull-driven [`ChunkStream`]: the network is only read when the consumer
//! asks for the next chunk, and dropping the stream drops the connection.

use std::{collections::VecDeque, fmt::Display, pin::Pin};

use async_trait::async_trait;
use axum::body::Bytes;
use futures::{stream, Stream, StreamExt};
use reqwest::{header::HeaderValue, Client, Url};
use serde_json::Value;

use crate::constants::*;
use crate::error::{ChatError, StreamError};
use crate::models::{GenerateContentRequest, GenerationChunk, SystemInstruction};
use crate::services::{
    api_key_header, ChunkStream, GenerateParams, GenerationBackend, GenerationClient,
    SseEventParser,
};
use crate::utils::{extract_upstream_error_message, model_resource_path};

/// Backend sharing one pooled HTTP client across requests.
pub struct GeminiBackend {
    http: Client,
    api_base: String,
}

impl GeminiBackend {
    pub fn new(http: Client, api_base: impl Into<String>) -> Self {
        Self {
            http,
            api_base: api_base.into(),
        }
    }
}

impl GenerationBackend for GeminiBackend {
    fn connect(&self, api_key: &str) -> Result<Box<dyn GenerationClient>, ChatError> {
        let base = self.api_base.trim_end_matches('/');
        Url::parse(base).map_err(|e| {
            ChatError::ClientInit(format!("invalid upstream base URL '{}': {}", base, e))
        })?;
        let client = GeminiClient {
            http: self.http.clone(),
            api_base: base.to_string(),
            api_key: api_key_header(api_key)?,
        };
        log::info!("✅ Generation client initialized ({})", base);
        Ok(Box::new(client))
    }
}

pub struct GeminiClient {
    http: Client,
    api_base: String,
    api_key: HeaderValue,
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn stream_generate(&self, params: GenerateParams) -> Result<ChunkStream, ChatError> {
        let url = format!(
            "{}/{}:{}?alt=sse",
            self.api_base,
            model_resource_path(&params.model),
            STREAM_METHOD
        );
        let body = GenerateContentRequest {
            contents: params.contents,
            system_instruction: params
                .system_instruction
                .filter(|s| !s.trim().is_empty())
                .map(SystemInstruction::text),
        };

        log::debug!(
            "🚀 POST {} ({} contents, system_instruction={})",
            url,
            body.contents.len(),
            body.system_instruction.is_some()
        );

        let res = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, self.api_key.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                log::error!("❌ Upstream connection failed: {}", e);
                ChatError::UpstreamCall(e.to_string())
            })?;

        let status = res.status();
        log::debug!("📥 Upstream response status: {}", status);

        if !status.is_success() {
            let error_body = res.text().await.unwrap_or_default();
            let message = serde_json::from_str::<Value>(&error_body)
                .ok()
                .and_then(|v| extract_upstream_error_message(&v))
                .unwrap_or_else(|| {
                    format!("{} (HTTP {})", UPSTREAM_CALL_FALLBACK_MESSAGE, status.as_u16())
                });
            log::error!(
                "❌ Upstream rejected the call: {} {} - {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or(""),
                message
            );
            return Err(ChatError::UpstreamCall(message));
        }

        log::info!("✅ Upstream accepted streamed generation ({})", status);
        Ok(sse_chunks(res.bytes_stream()))
    }
}

struct SseState<S> {
    body: Pin<Box<S>>,
    parser: SseEventParser,
    pending: VecDeque<String>,
    finished: bool,
}

/// Adapt a raw SSE byte stream into generation chunks.
pub fn sse_chunks<S, E>(body: S) -> ChunkStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let state = SseState {
        body: Box::pin(body),
        parser: SseEventParser::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut st| async move {
        loop {
            if let Some(payload) = st.pending.pop_front() {
                match classify_payload(&payload) {
                    Some(Err(e)) => {
                        st.finished = true;
                        st.pending.clear();
                        return Some((Err(e), st));
                    }
                    Some(item) => return Some((item, st)),
                    None => continue,
                }
            }
            if st.finished {
                return None;
            }
            match st.body.next().await {
                Some(Ok(bytes)) => {
                    let events = st.parser.push_and_drain_events(&bytes);
                    st.pending.extend(events);
                }
                Some(Err(e)) => {
                    st.finished = true;
                    st.pending.clear();
                    return Some((Err(StreamError::Transport(e.to_string())), st));
                }
                None => {
                    st.finished = true;
                    let tail = st.parser.flush();
                    st.pending.extend(tail);
                }
            }
        }
    })
    .boxed()
}

fn classify_payload(payload: &str) -> Option<Result<GenerationChunk, StreamError>> {
    let data = payload.trim();
    if data.is_empty() || data == "[DONE]" {
        return None;
    }
    match serde_json::from_str::<Value>(data) {
        Ok(value) if value.get("error").is_some() => {
            let message = extract_upstream_error_message(&value)
                .unwrap_or_else(|| "unknown upstream error".into());
            Some(Err(StreamError::Upstream(message)))
        }
        Ok(value) => Some(Ok(GenerationChunk::new(value))),
        Err(e) => {
            log::debug!("⚠️  Non-JSON SSE payload ({} bytes): {}", data.len(), e);
            Some(Ok(GenerationChunk::malformed(e.to_string())))
        }
    }
}

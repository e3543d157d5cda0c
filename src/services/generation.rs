use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::error::{ChatError, StreamError};
use crate::models::{GenerationChunk, Message};

/// Cancellable sequence of upstream chunks. Dropping it stops production.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<GenerationChunk, StreamError>> + Send>>;

/// Everything the upstream needs for one streamed generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateParams {
    pub model: String,
    pub contents: Vec<Message>,
    pub system_instruction: Option<String>,
}

/// Builds per-request clients bound to a credential.
pub trait GenerationBackend: Send + Sync {
    /// Fails with [`ChatError::ClientInit`].
    fn connect(&self, api_key: &str) -> Result<Box<dyn GenerationClient>, ChatError>;
}

#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Start a streamed generation. Fails with [`ChatError::UpstreamCall`] when the
    /// call is rejected before any chunk is available.
    async fn stream_generate(&self, params: GenerateParams) -> Result<ChunkStream, ChatError>;
}

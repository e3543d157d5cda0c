//! Bridge from the upstream chunk sequence to the outbound response body.
//!
//! The bridge is itself a pull-driven stream handed to `Body::from_stream`, so
//! the transport's demand is the only thing that drives upstream consumption:
//! nothing is read before the first poll, at most one chunk is in flight, and
//! a client disconnect drops the bridge together with the upstream handle.

use std::{
    pin::Pin,
    task::{Context, Poll},
};

use axum::body::Bytes;
use futures::{Stream, StreamExt};

use crate::error::StreamError;
use crate::services::ChunkStream;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    NotStarted,
    Streaming,
    Closed,
    Errored,
}

pub struct StreamBridge {
    upstream: ChunkStream,
    state: BridgeState,
    chunks_seen: usize,
    bytes_emitted: usize,
}

impl StreamBridge {
    pub fn new(upstream: ChunkStream) -> Self {
        Self {
            upstream,
            state: BridgeState::NotStarted,
            chunks_seen: 0,
            bytes_emitted: 0,
        }
    }
}

impl Stream for StreamBridge {
    type Item = Result<Bytes, StreamError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        match this.state {
            BridgeState::Closed | BridgeState::Errored => return Poll::Ready(None),
            BridgeState::NotStarted => {
                log::debug!("🎬 Streaming started");
                this.state = BridgeState::Streaming;
            }
            BridgeState::Streaming => {}
        }

        loop {
            match this.upstream.poll_next_unpin(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Some(Ok(chunk))) => {
                    this.chunks_seen += 1;
                    match chunk.text() {
                        Ok(Some(text)) if !text.is_empty() => {
                            this.bytes_emitted += text.len();
                            return Poll::Ready(Some(Ok(Bytes::from(text))));
                        }
                        Ok(_) => {
                            log::debug!("⏭️  Chunk #{} carries no text", this.chunks_seen);
                        }
                        Err(e) => {
                            log::error!("⚠️  Error processing chunk #{}: {}", this.chunks_seen, e);
                        }
                    }
                }
                Poll::Ready(Some(Err(e))) => {
                    log::error!(
                        "❌ Stream iteration error after {} chunks ({} bytes sent): {}",
                        this.chunks_seen,
                        this.bytes_emitted,
                        e
                    );
                    this.state = BridgeState::Errored;
                    return Poll::Ready(Some(Err(e)));
                }
                Poll::Ready(None) => {
                    log::info!(
                        "🏁 Stream completed: {} chunks, {} bytes",
                        this.chunks_seen,
                        this.bytes_emitted
                    );
                    this.state = BridgeState::Closed;
                    return Poll::Ready(None);
                }
            }
        }
    }
}

impl Drop for StreamBridge {
    fn drop(&mut self) {
        if matches!(self.state, BridgeState::NotStarted | BridgeState::Streaming) {
            log::info!(
                "🔌 Client went away after {} bytes; releasing upstream stream",
                self.bytes_emitted
            );
        }
    }
}

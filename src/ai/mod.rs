//! Chat-completion integration for story writing
//!
//! Provides a streaming interface to an OpenAI-compatible chat API (Groq)
//! that turns the caption prompt into a short narrative.

pub mod groq;
pub mod mock;

pub use groq::GroqChatClient;
pub use mock::MockStoryClient;

use crate::Result;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// Incremental content deltas, in arrival order.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Two-message exchange sent to the chat model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryRequest {
    pub system: String,
    pub user: String,
}

impl StoryRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

#[async_trait]
pub trait StoryService: Send + Sync {
    async fn stream_story(&self, request: StoryRequest) -> Result<ChunkStream>;
}

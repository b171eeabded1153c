use super::{ChunkStream, StoryRequest, StoryService};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Scripted [`StoryService`] for tests: replays fixed chunks, optionally
/// failing part-way through, and records every request it receives.
pub struct MockStoryClient {
    chunks: Vec<String>,
    failure: Option<(usize, String)>,
    requests: Arc<Mutex<Vec<StoryRequest>>>,
}

impl MockStoryClient {
    pub fn new() -> Self {
        Self {
            chunks: Vec::new(),
            failure: None,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_chunks<I, S>(mut self, chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.chunks = chunks.into_iter().map(Into::into).collect();
        self
    }

    /// Fail with `message` after `after` chunks have been delivered.
    pub fn with_failure_after(mut self, after: usize, message: impl Into<String>) -> Self {
        self.failure = Some((after, message.into()));
        self
    }

    pub fn requests(&self) -> Vec<StoryRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn get_call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Default for MockStoryClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StoryService for MockStoryClient {
    async fn stream_story(&self, request: StoryRequest) -> Result<ChunkStream> {
        self.requests.lock().unwrap().push(request);

        let mut items: Vec<Result<String>> = Vec::new();
        for (index, chunk) in self.chunks.iter().enumerate() {
            if let Some((after, message)) = &self.failure {
                if index == *after {
                    items.push(Err(Error::Stream(message.clone())));
                    return Ok(Box::pin(futures::stream::iter(items)));
                }
            }
            items.push(Ok(chunk.clone()));
        }
        if let Some((after, message)) = &self.failure {
            if *after >= self.chunks.len() {
                items.push(Err(Error::Stream(message.clone())));
            }
        }

        Ok(Box::pin(futures::stream::iter(items)))
    }
}

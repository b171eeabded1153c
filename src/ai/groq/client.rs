use super::types::{ChatCompletionChunk, ChatCompletionRequest};
use crate::ai::ChunkStream;
use crate::{Error, Result};
use futures::StreamExt;
use reqwest::Client;
use reqwest_eventsource::retry::Never;
use reqwest_eventsource::{Event, EventSource};

const DONE_MARKER: &str = "[DONE]";

/// Low-level HTTP client for Groq's OpenAI-compatible endpoints.
pub struct GroqHttpClient {
    pub(crate) client: Client,
    pub(crate) api_key: String,
    pub(crate) base_url: String,
}

impl GroqHttpClient {
    pub fn new_with_client(api_key: String, base_url: String, client: Client) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Open a streamed chat completion and yield each non-empty content delta.
    ///
    /// Connection, status and payload errors surface as stream items; the
    /// stream ends after the first error. Reconnects are disabled.
    pub fn stream_chat_completion(&self, request: &ChatCompletionRequest) -> Result<ChunkStream> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        tracing::debug!("Opening chat completion stream at {}", url);

        let builder = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(request);

        let mut source = EventSource::new(builder)
            .map_err(|e| Error::Stream(format!("Failed to open event stream: {}", e)))?;
        source.set_retry_policy(Box::new(Never));

        let stream = async_stream::stream! {
            while let Some(event) = source.next().await {
                match event {
                    Ok(Event::Open) => tracing::debug!("Chat completion stream opened"),
                    Ok(Event::Message(message)) => {
                        let data = message.data.trim();
                        if data == DONE_MARKER {
                            break;
                        }
                        match serde_json::from_str::<ChatCompletionChunk>(data) {
                            Ok(chunk) => {
                                if let Some(content) = chunk.into_content() {
                                    yield Ok(content);
                                }
                            }
                            Err(e) => {
                                tracing::error!("Failed to parse Groq chunk: {}\nData: {}", e, data);
                                yield Err(Error::AiProvider(format!(
                                    "Failed to parse Groq response: {}",
                                    e
                                )));
                                break;
                            }
                        }
                    }
                    Err(reqwest_eventsource::Error::StreamEnded) => {
                        tracing::debug!("Chat completion stream ended");
                        break;
                    }
                    Err(reqwest_eventsource::Error::InvalidStatusCode(status, response)) => {
                        let error_text = response.text().await.unwrap_or_default();
                        tracing::error!("Groq API error (status {}): {}", status, error_text);
                        yield Err(Error::AiProvider(format!(
                            "Groq API error (status {}): {}",
                            status, error_text
                        )));
                        break;
                    }
                    Err(e) => {
                        tracing::error!("Chat completion stream failed: {}", e);
                        yield Err(Error::Stream(e.to_string()));
                        break;
                    }
                }
            }
            source.close();
        };

        Ok(Box::pin(stream))
    }
}

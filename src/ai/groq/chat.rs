use super::client::GroqHttpClient;
use super::types::{ChatCompletionRequest, ChatMessage};
use crate::ai::{ChunkStream, StoryRequest, StoryService};
use crate::Result;
use async_trait::async_trait;

const TEMPERATURE: f32 = 0.7;
const TOP_P: f32 = 1.0;
const MAX_COMPLETION_TOKENS: u32 = 500;

pub struct GroqChatClient {
    http: GroqHttpClient,
    model: String,
}

impl GroqChatClient {
    pub fn new(api_key: String, model: String, base_url: String) -> Self {
        Self::new_with_client(api_key, model, base_url, reqwest::Client::new())
    }

    pub fn new_with_client(
        api_key: String,
        model: String,
        base_url: String,
        client: reqwest::Client,
    ) -> Self {
        Self {
            http: GroqHttpClient::new_with_client(api_key, base_url, client),
            model,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    fn build_request(&self, request: StoryRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(request.system),
                ChatMessage::user(request.user),
            ],
            temperature: TEMPERATURE,
            top_p: TOP_P,
            max_completion_tokens: MAX_COMPLETION_TOKENS,
            stream: true,
            stop: None,
        }
    }
}

#[async_trait]
impl StoryService for GroqChatClient {
    async fn stream_story(&self, request: StoryRequest) -> Result<ChunkStream> {
        tracing::info!("Requesting story from Groq (model: {})", self.model);
        let request = self.build_request(request);
        self.http.stream_chat_completion(&request)
    }
}

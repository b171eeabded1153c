//! Groq (OpenAI-compatible) request and streaming payloads.

use serde::{Deserialize, Serialize};

/// Request body for a streamed chat completion.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub top_p: f32,
    pub max_completion_tokens: u32,
    pub stream: bool,
    /// Always serialized, `null` when unset.
    pub stop: Option<Vec<String>>,
}

/// Chat message object.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// One `data:` payload of the event stream.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: ChunkDelta,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChunkDelta {
    pub role: Option<String>,
    pub content: Option<String>,
}

impl ChatCompletionChunk {
    /// Content of the first choice, if it carries any text.
    pub fn into_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta.content)
            .filter(|content| !content.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_null_stop() {
        let request = ChatCompletionRequest {
            model: "m".to_string(),
            messages: vec![ChatMessage::system("s"), ChatMessage::user("u")],
            temperature: 0.7,
            top_p: 1.0,
            max_completion_tokens: 500,
            stream: true,
            stop: None,
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"stop\":null"));
        assert!(json.contains("\"stream\":true"));
        assert!(json.contains("\"temperature\":0.7"));
        assert!(json.contains("\"role\":\"system\""));
    }

    #[test]
    fn test_chunk_content_extraction() {
        let chunk: ChatCompletionChunk = serde_json::from_str(
            r#"{"id":"x","choices":[{"index":0,"delta":{"content":"Bir"},"finish_reason":null}]}"#,
        )
        .unwrap();
        assert_eq!(chunk.into_content().as_deref(), Some("Bir"));
    }

    #[test]
    fn test_role_only_and_empty_chunks_have_no_content() {
        let role_only: ChatCompletionChunk =
            serde_json::from_str(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#).unwrap();
        assert!(role_only.into_content().is_none());

        let empty: ChatCompletionChunk =
            serde_json::from_str(r#"{"choices":[{"delta":{"content":""},"finish_reason":"stop"}]}"#)
                .unwrap();
        assert!(empty.into_content().is_none());

        let no_choices: ChatCompletionChunk =
            serde_json::from_str(r#"{"x_groq":{"usage":{}}}"#).unwrap();
        assert!(no_choices.into_content().is_none());
    }
}

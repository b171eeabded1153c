//! The background generation task: caption every image, build the story
//! prompt, stream the chat completion and report progress as
//! [`GenerationEvent`]s.

use crate::ai::{StoryRequest, StoryService};
use crate::caption::CaptionService;
use crate::models::{GenerationEvent, GenerationJob};
use crate::{prompts, Result};
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{error, info, warn, Instrument};

pub const STATUS_ANALYZING: &str = "Analyzing images... (This may take a moment)";
pub const STATUS_CRAFTING: &str = "AI is crafting your story...";

/// Receiver side of the generation events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: GenerationEvent);
}

impl EventSink for UnboundedSender<GenerationEvent> {
    fn emit(&self, event: GenerationEvent) {
        if self.send(event).is_err() {
            tracing::debug!("Generation event dropped: receiver closed");
        }
    }
}

pub struct StoryGenerator {
    captioner: Arc<dyn CaptionService>,
    story: Arc<dyn StoryService>,
}

impl StoryGenerator {
    pub fn new(captioner: Arc<dyn CaptionService>, story: Arc<dyn StoryService>) -> Self {
        Self { captioner, story }
    }

    /// Run `job` on the current tokio runtime.
    pub fn spawn(self: &Arc<Self>, job: GenerationJob, sink: Arc<dyn EventSink>) -> JoinHandle<()> {
        let generator = Arc::clone(self);
        let span = tracing::info_span!("generation", task_id = %job.id);

        tokio::spawn(
            async move {
                generator.run(job, sink.as_ref()).await;
            }
            .instrument(span),
        )
    }

    /// Execute one request to completion. Always ends with exactly one
    /// terminal event (`Final` or `Error`).
    pub async fn run(&self, job: GenerationJob, sink: &dyn EventSink) {
        match self.generate(&job, sink).await {
            Ok(story) => {
                info!("Story complete ({} chars)", story.chars().count());
                sink.emit(GenerationEvent::Final(story));
            }
            Err(e) => {
                error!("Story generation failed: {}", e);
                sink.emit(GenerationEvent::Error(e.to_string()));
            }
        }
    }

    async fn generate(&self, job: &GenerationJob, sink: &dyn EventSink) -> Result<String> {
        sink.emit(GenerationEvent::Status(STATUS_ANALYZING.to_string()));
        let captions = self.caption_all(&job.images).await;

        sink.emit(GenerationEvent::Status(STATUS_CRAFTING.to_string()));
        let request = StoryRequest::new(
            prompts::STORY_SYSTEM.trim(),
            prompts::story_prompt(&captions, &job.instruction),
        );

        let mut chunks = self.story.stream_story(request).await?;
        let mut story = String::new();
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            if chunk.is_empty() {
                continue;
            }
            story.push_str(&chunk);
            sink.emit(GenerationEvent::Partial(story.clone()));
        }

        Ok(story)
    }

    /// Caption images in order. An image that cannot be captioned is
    /// logged and left out; it never fails the run.
    // TODO: report skipped images to the window instead of only logging them.
    async fn caption_all(&self, images: &[PathBuf]) -> Vec<String> {
        let mut captions = Vec::with_capacity(images.len());
        for path in images {
            match self.captioner.caption(path).await {
                Ok(caption) => {
                    info!("Caption for {}: {}", path.display(), caption);
                    captions.push(caption);
                }
                Err(e) => warn!("Image error ({}): {}", path.display(), e),
            }
        }
        captions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockStoryClient;
    use crate::caption::MockCaptioner;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<GenerationEvent>>,
    }

    impl EventSink for RecordingSink {
        fn emit(&self, event: GenerationEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    impl RecordingSink {
        fn events(&self) -> Vec<GenerationEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    fn job(images: &[&str], instruction: &str) -> GenerationJob {
        GenerationJob::new(
            images.iter().map(PathBuf::from).collect(),
            instruction.to_string(),
        )
    }

    #[tokio::test]
    async fn test_event_order_for_successful_run() {
        let story = Arc::new(MockStoryClient::new().with_chunks(["A", "B", "C"]));
        let generator = StoryGenerator::new(Arc::new(MockCaptioner::new()), story);
        let sink = RecordingSink::default();

        generator.run(job(&["one.png"], "task"), &sink).await;

        assert_eq!(
            sink.events(),
            vec![
                GenerationEvent::Status(STATUS_ANALYZING.to_string()),
                GenerationEvent::Status(STATUS_CRAFTING.to_string()),
                GenerationEvent::Partial("A".to_string()),
                GenerationEvent::Partial("AB".to_string()),
                GenerationEvent::Partial("ABC".to_string()),
                GenerationEvent::Final("ABC".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_chunks_emit_no_partial() {
        let story = Arc::new(MockStoryClient::new().with_chunks(["A", "", "B"]));
        let generator = StoryGenerator::new(Arc::new(MockCaptioner::new()), story);
        let sink = RecordingSink::default();

        generator.run(job(&["one.png"], "task"), &sink).await;

        let partials: Vec<_> = sink
            .events()
            .into_iter()
            .filter(|e| matches!(e, GenerationEvent::Partial(_)))
            .collect();
        assert_eq!(
            partials,
            vec![
                GenerationEvent::Partial("A".to_string()),
                GenerationEvent::Partial("AB".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_prompt_uses_system_message_and_captions() {
        let story = Arc::new(MockStoryClient::new().with_chunks(["x"]));
        let captioner = MockCaptioner::new()
            .with_caption("a.png", "a lighthouse at dusk")
            .with_caption("b.png", "a fishing boat");
        let generator = StoryGenerator::new(Arc::new(captioner), story.clone());

        generator
            .run(job(&["a.png", "b.png"], "Şu olayı temel al: fırtına"), &RecordingSink::default())
            .await;

        let requests = story.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].system, prompts::STORY_SYSTEM.trim());
        assert!(requests[0]
            .user
            .contains("Resim İpuçları: a lighthouse at dusk a fishing boat"));
        assert!(requests[0].user.contains("Görev: Şu olayı temel al: fırtına"));
    }

    #[tokio::test]
    async fn test_caption_failure_is_skipped() {
        let story = Arc::new(MockStoryClient::new().with_chunks(["ok"]));
        let captioner = Arc::new(
            MockCaptioner::new()
                .with_caption("a.png", "first")
                .with_failure("b.png")
                .with_caption("c.png", "third"),
        );
        let generator = StoryGenerator::new(captioner.clone(), story.clone());
        let sink = RecordingSink::default();

        generator.run(job(&["a.png", "b.png", "c.png"], "t"), &sink).await;

        assert_eq!(captioner.get_call_count(), 3);
        assert!(story.requests()[0].user.contains("Resim İpuçları: first third\n"));
        assert_eq!(
            sink.events().last(),
            Some(&GenerationEvent::Final("ok".to_string()))
        );
    }

    #[tokio::test]
    async fn test_stream_error_ends_with_error_event() {
        let story = Arc::new(
            MockStoryClient::new()
                .with_chunks(["A", "B"])
                .with_failure_after(1, "connection reset"),
        );
        let generator = StoryGenerator::new(Arc::new(MockCaptioner::new()), story);
        let sink = RecordingSink::default();

        generator.run(job(&["a.png"], "t"), &sink).await;

        let events = sink.events();
        assert_eq!(events[2], GenerationEvent::Partial("A".to_string()));
        assert_eq!(
            events.last(),
            Some(&GenerationEvent::Error("Stream error: connection reset".to_string()))
        );
        assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);
    }

    #[tokio::test]
    async fn test_spawn_delivers_events_over_channel() {
        let story = Arc::new(MockStoryClient::new().with_chunks(["Bir", " gün"]));
        let generator = Arc::new(StoryGenerator::new(Arc::new(MockCaptioner::new()), story));
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        generator
            .spawn(job(&["a.png"], "t"), Arc::new(tx))
            .await
            .unwrap();

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert_eq!(events.len(), 5);
        assert_eq!(events[4], GenerationEvent::Final("Bir gün".to_string()));
    }
}

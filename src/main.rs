use anyhow::Result;
use std::sync::Arc;
use story_creator::ai::{GroqChatClient, StoryService};
use story_creator::caption::{CaptionModel, CaptionService};
use story_creator::config::Config;
use story_creator::generator::StoryGenerator;
use story_creator::ui;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn build_generator(config: &Config, captioner: Arc<dyn CaptionService>) -> Option<Arc<StoryGenerator>> {
    let Some(api_key) = config.groq_api_key.clone() else {
        warn!("GROQ_API_KEY not set; story generation is disabled");
        return None;
    };

    info!("Story provider: Groq (model: {})", config.story_model);
    let story: Arc<dyn StoryService> = Arc::new(GroqChatClient::new(
        api_key,
        config.story_model.clone(),
        config.groq_base_url.clone(),
    ));

    Some(Arc::new(StoryGenerator::new(captioner, story)))
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "story_creator=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting story-creator");

    let config = Config::from_env();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let _guard = runtime.enter();

    let captioner = runtime.block_on(CaptionModel::load(&config));
    if !captioner.is_ready() {
        warn!("Captioning is unavailable; images will be skipped during generation");
    }

    let generator = build_generator(&config, Arc::new(captioner));
    ui::run(generator)
}

//! Image captioning
//!
//! Derives a short English caption for each selected image with a pretrained
//! BLIP model. The model is loaded once at startup; if loading fails the
//! failure is recorded and every caption request reports it.

pub mod blip;
pub mod download;
pub mod mock;

pub use blip::BlipCaptioner;
pub use download::ModelDownloader;
pub use mock::MockCaptioner;

use crate::config::Config;
use crate::{Error, Result};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

#[async_trait]
pub trait CaptionService: Send + Sync {
    async fn caption(&self, image_path: &Path) -> Result<String>;
}

/// Outcome of the one-time caption model initialization.
pub enum CaptionModel {
    Ready(Arc<BlipCaptioner>),
    Unavailable(String),
}

impl CaptionModel {
    /// Fetch (if needed) and load the caption model. Never fails: a load
    /// error is logged and kept as the reason captioning is unavailable.
    pub async fn load(config: &Config) -> Self {
        let downloader = ModelDownloader::new(
            config.hf_endpoint.clone(),
            config.model_cache_dir.clone().into(),
        );

        match BlipCaptioner::load(&downloader, &config.caption_repo, &config.caption_revision)
            .await
        {
            Ok(captioner) => {
                tracing::info!("Caption model ready ({})", config.caption_repo);
                Self::Ready(Arc::new(captioner))
            }
            Err(e) => {
                tracing::error!("Model loading error: {}", e);
                Self::Unavailable(e.to_string())
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

#[async_trait]
impl CaptionService for CaptionModel {
    async fn caption(&self, image_path: &Path) -> Result<String> {
        match self {
            Self::Ready(captioner) => captioner.caption(image_path).await,
            Self::Unavailable(reason) => Err(Error::ModelUnavailable(reason.clone())),
        }
    }
}

use super::{CaptionService, ModelDownloader};
use crate::{Error, Result};
use async_trait::async_trait;
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::generation::LogitsProcessor;
use candle_transformers::models::blip;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokenizers::Tokenizer;

const IMAGE_SIZE: u32 = 384;
const BOS_TOKEN_ID: u32 = 30522;
const SEP_TOKEN_ID: u32 = 102;
const MAX_NEW_TOKENS: usize = 100;
const CLIP_MEAN: [f32; 3] = [0.481_454_66, 0.457_827_5, 0.408_210_73];
const CLIP_STD: [f32; 3] = [0.268_629_54, 0.261_302_6, 0.275_777_1];

struct BlipState {
    model: blip::BlipForConditionalGeneration,
    logits_processor: LogitsProcessor,
}

/// BLIP image-captioning model (large variant) running on the CPU.
///
/// The text decoder keeps a KV cache, so inference is serialized through a
/// mutex and each caption starts from a reset cache. Clones share the model.
#[derive(Clone)]
pub struct BlipCaptioner {
    state: Arc<Mutex<BlipState>>,
    tokenizer: Arc<Tokenizer>,
    device: Device,
}

impl BlipCaptioner {
    pub async fn load(downloader: &ModelDownloader, repo: &str, revision: &str) -> Result<Self> {
        let model_file = downloader.fetch(repo, revision, "model.safetensors").await?;
        let tokenizer_file = downloader.fetch(repo, "main", "tokenizer.json").await?;

        tokio::task::spawn_blocking(move || Self::from_files(&model_file, &tokenizer_file))
            .await
            .map_err(|e| Error::Invariant(format!("Caption model load task join error: {}", e)))?
    }

    pub fn from_files(model_file: &Path, tokenizer_file: &Path) -> Result<Self> {
        tracing::debug!("Loading caption model from {}", model_file.display());

        let tokenizer = Tokenizer::from_file(tokenizer_file)
            .map_err(|e| Error::CaptionModel(format!("Failed to load tokenizer: {}", e)))?;

        let device = Device::Cpu;
        let weights = std::fs::read(model_file)?;
        let vb = VarBuilder::from_buffered_safetensors(weights, DType::F32, &device)?;
        let config = blip::Config::image_captioning_large();
        let model = blip::BlipForConditionalGeneration::new(&config, vb)?;

        Ok(Self {
            state: Arc::new(Mutex::new(BlipState {
                model,
                logits_processor: LogitsProcessor::new(1337, None, None),
            })),
            tokenizer: Arc::new(tokenizer),
            device,
        })
    }

    fn caption_blocking(&self, image_path: &Path) -> Result<String> {
        let image = load_image(image_path)?.to_device(&self.device)?;

        let mut state = self
            .state
            .lock()
            .map_err(|_| Error::Invariant("Caption model lock poisoned".to_string()))?;
        let BlipState {
            model,
            logits_processor,
        } = &mut *state;

        let image_embeds = image.unsqueeze(0)?.apply(model.vision_model())?;
        model.text_decoder().reset_kv_cache();

        let mut token_ids = vec![BOS_TOKEN_ID];
        for index in 0..MAX_NEW_TOKENS {
            let context_size = if index > 0 { 1 } else { token_ids.len() };
            let start_pos = token_ids.len().saturating_sub(context_size);
            let input_ids = Tensor::new(&token_ids[start_pos..], &self.device)?.unsqueeze(0)?;
            let logits = model.text_decoder().forward(&input_ids, &image_embeds)?;
            let logits = logits.squeeze(0)?;
            let logits = logits.get(logits.dim(0)? - 1)?;
            let token = logits_processor.sample(&logits)?;
            if token == SEP_TOKEN_ID {
                break;
            }
            token_ids.push(token);
        }

        self.tokenizer
            .decode(&token_ids, true)
            .map(|caption| caption.trim().to_string())
            .map_err(|e| Error::CaptionModel(format!("Failed to decode caption: {}", e)))
    }
}

#[async_trait]
impl CaptionService for BlipCaptioner {
    async fn caption(&self, image_path: &Path) -> Result<String> {
        tracing::debug!("Generating caption for {}", image_path.display());

        let captioner = self.clone();
        let path: PathBuf = image_path.to_path_buf();

        tokio::task::spawn_blocking(move || captioner.caption_blocking(&path))
            .await
            .map_err(|e| Error::Invariant(format!("Caption task join error: {}", e)))?
    }
}

/// Decode an image into a normalized `(3, 384, 384)` tensor.
pub fn load_image(path: &Path) -> Result<Tensor> {
    let img = image::ImageReader::open(path)?
        .with_guessed_format()?
        .decode()?
        .resize_to_fill(
            IMAGE_SIZE,
            IMAGE_SIZE,
            image::imageops::FilterType::Triangle,
        )
        .to_rgb8();

    let size = IMAGE_SIZE as usize;
    let data = Tensor::from_vec(img.into_raw(), (size, size, 3), &Device::Cpu)?.permute((2, 0, 1))?;
    let mean = Tensor::new(&CLIP_MEAN, &Device::Cpu)?.reshape((3, 1, 1))?;
    let std = Tensor::new(&CLIP_STD, &Device::Cpu)?.reshape((3, 1, 1))?;

    let normalized = (data.to_dtype(DType::F32)? / 255.)?
        .broadcast_sub(&mean)?
        .broadcast_div(&std)?;
    Ok(normalized)
}

//! Process configuration read once at startup.

pub const DEFAULT_STORY_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai";
pub const DEFAULT_CAPTION_REPO: &str = "Salesforce/blip-image-captioning-large";
pub const DEFAULT_CAPTION_REVISION: &str = "refs/pr/18";
pub const DEFAULT_HF_ENDPOINT: &str = "https://huggingface.co";
pub const DEFAULT_MODEL_CACHE_DIR: &str = "models";

#[derive(Debug, Clone)]
pub struct Config {
    /// Chat-completion credential. `None` disables generation.
    pub groq_api_key: Option<String>,
    pub groq_base_url: String,
    pub story_model: String,
    pub caption_repo: String,
    /// Revision holding the safetensors weights of the caption model.
    pub caption_revision: String,
    pub hf_endpoint: String,
    pub model_cache_dir: String,
}

impl Config {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let or_default = |key: &str, default: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            groq_api_key: lookup("GROQ_API_KEY").filter(|key| !key.trim().is_empty()),
            groq_base_url: or_default("GROQ_BASE_URL", DEFAULT_GROQ_BASE_URL),
            story_model: or_default("STORY_MODEL", DEFAULT_STORY_MODEL),
            caption_repo: or_default("CAPTION_MODEL_REPO", DEFAULT_CAPTION_REPO),
            caption_revision: or_default("CAPTION_MODEL_REVISION", DEFAULT_CAPTION_REVISION),
            hf_endpoint: or_default("HF_ENDPOINT", DEFAULT_HF_ENDPOINT),
            model_cache_dir: or_default("MODEL_CACHE_DIR", DEFAULT_MODEL_CACHE_DIR),
        }
    }

    pub fn has_credential(&self) -> bool {
        self.groq_api_key.is_some()
    }
}

use super::CaptionService;
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub struct MockCaptioner {
    captions: HashMap<PathBuf, String>,
    failures: HashSet<PathBuf>,
    call_count: Arc<Mutex<usize>>,
}

impl MockCaptioner {
    pub fn new() -> Self {
        Self {
            captions: HashMap::new(),
            failures: HashSet::new(),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_caption(mut self, path: impl Into<PathBuf>, caption: impl Into<String>) -> Self {
        self.captions.insert(path.into(), caption.into());
        self
    }

    pub fn with_failure(mut self, path: impl Into<PathBuf>) -> Self {
        self.failures.insert(path.into());
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl Default for MockCaptioner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CaptionService for MockCaptioner {
    async fn caption(&self, image_path: &Path) -> Result<String> {
        *self.call_count.lock().unwrap() += 1;

        if self.failures.contains(image_path) {
            return Err(Error::Image(image::ImageError::IoError(
                std::io::Error::other("Mock failure"),
            )));
        }

        // Default caption derived from the file name
        Ok(self.captions.get(image_path).cloned().unwrap_or_else(|| {
            let stem = image_path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            format!("a photo of {}", stem)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_captioner_default_caption() {
        let captioner = MockCaptioner::new();

        let caption = captioner.caption(Path::new("/tmp/beach.jpg")).await.unwrap();
        assert_eq!(caption, "a photo of beach");
        assert_eq!(captioner.get_call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_captioner_scripted_caption_and_failure() {
        let captioner = MockCaptioner::new()
            .with_caption("a.png", "a cat on a sofa")
            .with_failure("b.png");

        assert_eq!(
            captioner.caption(Path::new("a.png")).await.unwrap(),
            "a cat on a sofa"
        );
        assert!(captioner.caption(Path::new("b.png")).await.is_err());
        assert_eq!(captioner.get_call_count(), 2);
    }
}

//! State behind the story window, independent of any GUI toolkit.
//!
//! The window forwards user actions and worker events here and renders
//! whatever this state says. The single-flight rule lives here too: a new
//! job is refused while one is still running.

use crate::filter::clean_story;
use crate::models::{AddOutcome, GenerationEvent, GenerationJob, ImageSelection};
use crate::prompts;
use std::fmt;
use std::path::PathBuf;

pub const PLACEHOLDER_TEXT: &str = "Your story will appear here...";
pub const GENERATING_TEXT: &str = "Generating story...";
pub const FAILED_TEXT: &str = "Story generation failed.";

/// A user-facing refusal shown as a warning dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Warning {
    MissingCredential,
    NoImages,
    SelectionFull,
    AlreadyRunning,
}

impl Warning {
    pub fn title(&self) -> &'static str {
        match self {
            Self::MissingCredential => "Error",
            _ => "Warning",
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::MissingCredential => "GROQ API Key not found!",
            Self::NoImages => "Please upload images first!",
            Self::SelectionFull => "Maximum 3 images allowed!",
            Self::AlreadyRunning => "A story is already being generated.",
        };
        f.write_str(message)
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    images: ImageSelection,
    pub theme: String,
    display: String,
    in_flight: bool,
    has_credential: bool,
}

impl Session {
    pub fn new(has_credential: bool) -> Self {
        Self {
            images: ImageSelection::new(),
            theme: String::new(),
            display: PLACEHOLDER_TEXT.to_string(),
            in_flight: false,
            has_credential,
        }
    }

    pub fn images(&self) -> &ImageSelection {
        &self.images
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn is_generating(&self) -> bool {
        self.in_flight
    }

    pub fn has_credential(&self) -> bool {
        self.has_credential
    }

    /// Whether the picker may be opened at all.
    pub fn check_can_add(&self) -> Result<(), Warning> {
        if self.images.is_full() {
            Err(Warning::SelectionFull)
        } else {
            Ok(())
        }
    }

    pub fn add_images(&mut self, picked: Vec<PathBuf>) -> AddOutcome {
        let outcome = self.images.add(picked);
        if let AddOutcome::Added(count) = outcome {
            tracing::debug!("Added {} image(s), {} loaded", count, self.images.len());
            self.refresh_display();
        }
        outcome
    }

    pub fn clear_all(&mut self) {
        self.images.clear();
        self.theme.clear();
        self.display = PLACEHOLDER_TEXT.to_string();
    }

    pub fn can_generate(&self) -> bool {
        self.has_credential && !self.images.is_empty() && !self.in_flight
    }

    /// Validate preconditions and hand out the job for the worker.
    pub fn start_generation(&mut self) -> Result<GenerationJob, Warning> {
        if !self.has_credential {
            return Err(Warning::MissingCredential);
        }
        if self.images.is_empty() {
            return Err(Warning::NoImages);
        }
        if self.in_flight {
            return Err(Warning::AlreadyRunning);
        }

        self.in_flight = true;
        self.display = GENERATING_TEXT.to_string();
        Ok(GenerationJob::new(
            self.images.paths().to_vec(),
            prompts::theme_instruction(&self.theme),
        ))
    }

    /// Apply a worker event. Returns the error dialog text when the run failed.
    pub fn apply(&mut self, event: GenerationEvent) -> Option<String> {
        match event {
            GenerationEvent::Status(text) | GenerationEvent::Partial(text) => {
                self.display = text;
                None
            }
            GenerationEvent::Final(text) => {
                self.display = clean_story(&text);
                self.in_flight = false;
                None
            }
            GenerationEvent::Error(message) => {
                self.display = FAILED_TEXT.to_string();
                self.in_flight = false;
                Some(format!("An error occurred:\n{}", message))
            }
        }
    }

    fn refresh_display(&mut self) {
        self.display = if self.images.is_empty() {
            PLACEHOLDER_TEXT.to_string()
        } else {
            format!(
                "{} image(s) loaded. Click the button to generate your story!",
                self.images.len()
            )
        };
    }
}

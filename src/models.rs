//! Core data structures shared by the window, the session and the
//! generation task.

use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Maximum number of images a story can be built from.
pub const MAX_IMAGES: usize = 3;

/// Result of adding a batch of picked files to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The selection was already full; nothing changed.
    Full,
    /// The picker returned no files.
    Nothing,
    /// This many paths were appended (excess beyond capacity is dropped).
    Added(usize),
}

/// Ordered image paths, capped at [`MAX_IMAGES`]. Duplicates are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSelection {
    paths: Vec<PathBuf>,
}

impl ImageSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<I>(&mut self, picked: I) -> AddOutcome
    where
        I: IntoIterator<Item = PathBuf>,
    {
        if self.is_full() {
            return AddOutcome::Full;
        }

        let before = self.paths.len();
        let capacity = self.remaining();
        self.paths.extend(picked.into_iter().take(capacity));

        match self.paths.len() - before {
            0 => AddOutcome::Nothing,
            n => AddOutcome::Added(n),
        }
    }

    pub fn clear(&mut self) {
        self.paths.clear();
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.paths.len() >= MAX_IMAGES
    }

    pub fn remaining(&self) -> usize {
        MAX_IMAGES.saturating_sub(self.paths.len())
    }

    pub fn get(&self, slot: usize) -> Option<&Path> {
        self.paths.get(slot).map(PathBuf::as_path)
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

/// Everything the generation task needs for one request.
#[derive(Debug, Clone)]
pub struct GenerationJob {
    pub id: Uuid,
    pub images: Vec<PathBuf>,
    /// Theme line already resolved (custom or default).
    pub instruction: String,
}

impl GenerationJob {
    pub fn new(images: Vec<PathBuf>, instruction: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            images,
            instruction,
        }
    }
}

/// Progress reported by the generation task, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationEvent {
    /// Human-readable phase description.
    Status(String),
    /// Full story text received so far (cumulative, not a delta).
    Partial(String),
    /// Complete, unfiltered story.
    Final(String),
    /// Message of the error that aborted the run.
    Error(String),
}

impl GenerationEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Final(_) | Self::Error(_))
    }
}

//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.
//! The `Display` text of an error is what the user sees in the error dialog.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("AI provider error: {0}")]
    AiProvider(String),

    #[error("Caption model error: {0}")]
    CaptionModel(String),

    #[error("Inference error: {0}")]
    Inference(#[from] candle_core::Error),

    #[error("Caption model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Invariant violation: {0}")]
    Invariant(String),
}

pub type Result<T> = std::result::Result<T, Error>;

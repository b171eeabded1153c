//! Story Creator - turns up to three pictures into a short Turkish story
//!
//! Each selected image is captioned with a local BLIP model, the captions and
//! an optional theme are combined into a fixed prompt, and a hosted chat model
//! streams the story back into a desktop window.

pub mod ai;
pub mod caption;
pub mod config;
pub mod error;
pub mod filter;
pub mod generator;
pub mod models;
pub mod prompts;
pub mod session;
pub mod ui;

pub use error::{Error, Result};

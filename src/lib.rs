//! Text and image generation demos on top of Together AI
//!
//! Prompts a hosted language model for completions and a hosted image model
//! for illustrations, then combines them in four preset modes including an
//! interactive language-tutor chat that illustrates every reply.

pub mod ai;
pub mod app;
pub mod error;
pub mod image;
pub mod models;
pub mod prompts;
pub mod text;

pub use error::{Error, ErrorKind, Result};

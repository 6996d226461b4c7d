//! AI service integration for text completion and image generation
//!
//! Provides interfaces to Together AI's chat-completion and image-generation
//! endpoints, plus in-memory mocks for tests and harnesses.

pub mod mime;
pub mod mock;
pub mod together;

pub use mock::{MockCompletionClient, MockImageGenerationClient};
pub use together::{TogetherChatClient, TogetherImageClient};

use crate::Result;
use async_trait::async_trait;

/// Single-prompt text completion.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Send `prompt` as the only user message and return the reply text.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Single-prompt image generation.
#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    /// Generate one image for `prompt` and return its encoded bytes.
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>>;
}

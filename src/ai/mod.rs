//! AI gateway integration for prompt and image generation
//!
//! The form controller only sees the two service traits below. Gemini backs
//! both in production; the mocks back them in tests.

pub mod gemini;
pub mod mock;

pub use gemini::{GeminiChatClient, GeminiImageClient};
pub use mock::{MockChatClient, MockImageGenerationClient};

use crate::Result;
use async_trait::async_trait;

/// Text-to-text half of the gateway.
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Turn a video title and free-form keywords into an image-generation prompt.
    async fn derive_prompt(&self, title: &str, keywords: &str) -> Result<String>;
}

/// Text-to-image half of the gateway.
#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    /// Generate one image for `prompt` and return its raw (decoded) bytes.
    async fn derive_image(&self, prompt: &str) -> Result<Vec<u8>>;
}

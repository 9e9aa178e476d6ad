//! Form state controller for the thumbnail workflow.
//!
//! Two independent request lifecycles share one [`FormState`]:
//! title/keywords → prompt, and prompt → image. Each goes
//! idle → loading → success | error → idle.

use crate::ai::{ChatService, ImageGenerationService};
use crate::models::FormState;
use crate::{Error, Result};
use base64::Engine as _;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

pub const TITLE_REQUIRED: &str = "Please enter a video title.";
pub const PROMPT_REQUIRED: &str = "Please generate a prompt first.";
pub const PROMPT_FAILED: &str = "Failed to generate prompt. Please try again.";
pub const THUMBNAIL_FAILED: &str = "Failed to generate thumbnail. Please try again.";
pub const BUSY: &str = "A generation request is already in progress.";

/// Wrap raw image bytes for inline display in an `<img src>`.
pub fn jpeg_data_uri(bytes: &[u8]) -> String {
    format!(
        "data:image/jpeg;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// Owns the form state and drives the gateway calls.
///
/// The state lock is never held across a gateway call, so [`snapshot`]
/// answers while a request is in flight.
///
/// [`snapshot`]: ThumbnailStudio::snapshot
pub struct ThumbnailStudio {
    chat: Box<dyn ChatService>,
    image_gen: Box<dyn ImageGenerationService>,
    state: Mutex<FormState>,
}

impl ThumbnailStudio {
    pub fn new(chat: Box<dyn ChatService>, image_gen: Box<dyn ImageGenerationService>) -> Self {
        Self {
            chat,
            image_gen,
            state: Mutex::new(FormState::default()),
        }
    }

    pub async fn snapshot(&self) -> FormState {
        self.state.lock().await.clone()
    }

    /// Replace the stored prompt with the user's edit.
    pub async fn edit_prompt(&self, prompt: &str) -> FormState {
        let mut state = self.state.lock().await;
        state.generated_prompt = prompt.to_string();
        state.clone()
    }

    /// Derive a prompt from `title` and `keywords` and store it.
    ///
    /// Clears the previous prompt, image and error before calling the
    /// gateway. A blank title is always [`Error::Validation`]; otherwise the
    /// call is rejected with [`Error::Busy`] while any request is in flight.
    /// Neither rejection touches the state of a request that is running.
    pub async fn request_prompt(&self, title: &str, keywords: &str) -> Result<String> {
        {
            let mut state = self.state.lock().await;

            if title.trim().is_empty() {
                if !state.is_busy() {
                    state.video_title = title.to_string();
                    state.keywords = keywords.to_string();
                    state.error = Some(TITLE_REQUIRED.to_string());
                }
                return Err(Error::Validation(TITLE_REQUIRED.to_string()));
            }

            if state.is_busy() {
                warn!("Rejecting prompt request: another request is in flight");
                return Err(Error::Busy(BUSY.to_string()));
            }

            state.video_title = title.to_string();
            state.keywords = keywords.to_string();
            state.error = None;
            state.image_url.clear();
            state.generated_prompt.clear();
            state.is_prompt_loading = true;
        }

        info!("Generating prompt for title: {}", title.trim());
        let result = self.chat.derive_prompt(title, keywords).await;

        let mut state = self.state.lock().await;
        state.is_prompt_loading = false;

        match result {
            Ok(prompt) => {
                info!("Generated prompt ({} chars)", prompt.len());
                state.generated_prompt = prompt.clone();
                Ok(prompt)
            }
            Err(e) => {
                error!("Prompt generation failed: {}", e);
                state.error = Some(PROMPT_FAILED.to_string());
                Err(Error::Gateway(PROMPT_FAILED.to_string()))
            }
        }
    }

    /// Generate a thumbnail for `prompt` and store it as a data URI.
    ///
    /// `prompt` becomes the stored prompt, so edits made before the call are
    /// kept. Calling again with the same prompt produces a new variation; the
    /// result is never cached. On failure the previous image stays cleared.
    /// Validation and busy rejections follow the same order as
    /// [`request_prompt`](Self::request_prompt).
    pub async fn request_image(&self, prompt: &str) -> Result<String> {
        {
            let mut state = self.state.lock().await;

            if prompt.trim().is_empty() {
                if !state.is_busy() {
                    state.generated_prompt = prompt.to_string();
                    state.error = Some(PROMPT_REQUIRED.to_string());
                }
                return Err(Error::Validation(PROMPT_REQUIRED.to_string()));
            }

            if state.is_busy() {
                warn!("Rejecting image request: another request is in flight");
                return Err(Error::Busy(BUSY.to_string()));
            }

            state.generated_prompt = prompt.to_string();
            state.error = None;
            state.image_url.clear();
            state.is_image_loading = true;
        }

        info!("Generating thumbnail ({} char prompt)", prompt.len());
        let result = self.image_gen.derive_image(prompt).await;

        let mut state = self.state.lock().await;
        state.is_image_loading = false;

        match result {
            Ok(bytes) => {
                info!("Generated thumbnail ({} bytes)", bytes.len());
                let image_url = jpeg_data_uri(&bytes);
                state.image_url = image_url.clone();
                Ok(image_url)
            }
            Err(e) => {
                error!("Thumbnail generation failed: {}", e);
                state.error = Some(THUMBNAIL_FAILED.to_string());
                Err(Error::Gateway(THUMBNAIL_FAILED.to_string()))
            }
        }
    }
}

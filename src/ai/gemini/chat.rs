use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentResponse};
use crate::ai::ChatService;
use crate::{prompts, Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct ChatRequest {
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: Option<ChatGenerationConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

/// Derives thumbnail prompts from a title and keywords.
pub struct GeminiChatClient {
    http: GeminiHttpClient,
}

impl GeminiChatClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(
                api_key,
                model,
                Duration::from_secs(30),
                client,
            ),
        }
    }

    fn build_request(title: &str, keywords: &str) -> ChatRequest {
        let keywords = match keywords.trim() {
            "" => "none",
            k => k,
        };

        ChatRequest {
            system_instruction: Some(Content::text(None, prompts::THUMBNAIL_SYSTEM)),
            contents: vec![Content::text(
                Some("user"),
                prompts::render(
                    prompts::THUMBNAIL_USER,
                    &[("title", title.trim()), ("keywords", keywords)],
                ),
            )],
            generation_config: Some(ChatGenerationConfig {
                max_output_tokens: Some(3000),
            }),
        }
    }
}

#[cfg(test)]
super::impl_with_gemini_base_url!(GeminiChatClient);

#[async_trait]
impl ChatService for GeminiChatClient {
    async fn derive_prompt(&self, title: &str, keywords: &str) -> Result<String> {
        let request = Self::build_request(title, keywords);

        let response: GenerateContentResponse = self.http.generate_content(&request).await?;

        response
            .first_text()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .ok_or_else(|| Error::AiProvider("No text in Gemini chat response".to_string()))
    }
}

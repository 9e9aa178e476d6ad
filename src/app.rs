//! Application wiring: configuration, gateway clients, and the web server.

use crate::ai::{ChatService, GeminiChatClient, GeminiImageClient, ImageGenerationService};
use crate::models::Config;
use crate::server;
use crate::studio::ThumbnailStudio;
use crate::Result;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

/// Owns the form controller and the address the form is served on.
pub struct App {
    studio: Arc<ThumbnailStudio>,
    bind_addr: SocketAddr,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub chat: Box<dyn ChatService>,
    pub image_gen: Box<dyn ImageGenerationService>,
}

impl App {
    /// Build an app from concrete service dependencies.
    pub fn with_services(services: AppServices, bind_addr: SocketAddr) -> Self {
        Self {
            studio: Arc::new(ThumbnailStudio::new(services.chat, services.image_gen)),
            bind_addr,
        }
    }

    /// Construct an app from environment configuration (`Config::from_env`).
    ///
    /// `bind_override` takes precedence over `BIND_ADDR`.
    pub fn new(bind_override: Option<SocketAddr>) -> Result<Self> {
        let config = Config::from_env()?;
        Ok(Self::from_config(config, bind_override))
    }

    pub fn from_config(config: Config, bind_override: Option<SocketAddr>) -> Self {
        // Reuse one HTTP connection pool across both gateway clients.
        let http_client = reqwest::Client::new();

        info!("Prompt model: {}", config.chat_model);
        let chat = GeminiChatClient::new_with_client(
            config.gemini_api_key.clone(),
            config.chat_model,
            http_client.clone(),
        );

        info!("Image model: {}", config.image_model);
        let image_gen = GeminiImageClient::new_with_client(
            config.gemini_api_key,
            config.image_model,
            http_client,
        );

        Self::with_services(
            AppServices {
                chat: Box::new(chat),
                image_gen: Box::new(image_gen),
            },
            bind_override.unwrap_or(config.bind_addr),
        )
    }

    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    pub fn studio(&self) -> Arc<ThumbnailStudio> {
        self.studio.clone()
    }

    /// Serve the form until Ctrl-C.
    pub async fn run(&self) -> Result<()> {
        server::serve(self.studio.clone(), self.bind_addr).await
    }

    /// Serve the form until `shutdown` resolves.
    pub async fn run_until<S>(&self, shutdown: S) -> Result<()>
    where
        S: Future<Output = ()> + Send + 'static,
    {
        server::serve_with_shutdown(self.studio.clone(), self.bind_addr, shutdown).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{MockChatClient, MockImageGenerationClient};
    use crate::models::{DEFAULT_CHAT_MODEL, DEFAULT_IMAGE_MODEL};

    #[test]
    fn test_bind_override_wins_over_config() {
        let config = Config {
            gemini_api_key: "key".to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            bind_addr: "127.0.0.1:21296".parse().unwrap(),
        };

        let app = App::from_config(config.clone(), None);
        assert_eq!(app.bind_addr().port(), 21296);

        let app = App::from_config(config, Some("127.0.0.1:9000".parse().unwrap()));
        assert_eq!(app.bind_addr().port(), 9000);
    }

    #[tokio::test]
    async fn test_with_services_starts_with_empty_form() {
        let app = App::with_services(
            AppServices {
                chat: Box::new(MockChatClient::new()),
                image_gen: Box::new(MockImageGenerationClient::new()),
            },
            "127.0.0.1:0".parse().unwrap(),
        );

        let state = app.studio().snapshot().await;
        assert_eq!(state, Default::default());
    }
}

//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP server error: {0}")]
    Server(#[from] warp::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("AI provider error: {0}")]
    AiProvider(String),

    /// A required form field was empty. Carries the message shown to the user.
    #[error("{0}")]
    Validation(String),

    /// The gateway failed; the detail is logged, the user sees a generic message.
    #[error("{0}")]
    Gateway(String),

    #[error("{0}")]
    Busy(String),
}

pub type Result<T> = std::result::Result<T, Error>;

//! AI YouTube thumbnail strategist
//!
//! Serves a local form that turns a video title and keywords into an
//! editable image prompt with Gemini, then renders a thumbnail from that
//! prompt inline.

pub mod ai;
pub mod app;
pub mod error;
pub mod models;
pub mod prompts;
pub mod server;
pub mod studio;

pub use error::{Error, Result};

//! Text generation for guides and earning recommendations.
//!
//! A [`CompletionInterface`] talks to a chat-completion backend. The
//! [`ContentService`] builds the prompts, calls the backend once, and turns
//! empty or failed completions into fixed fallback text so callers always get
//! something to show.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod implementations {
	pub mod openrouter;
}

pub mod service;

pub use service::ContentService;

/// Errors that can occur while requesting a completion.
#[derive(Debug, Error)]
pub enum ContentError {
	#[error("Request failed: {0}")]
	Request(String),
	/// Backend answered with a non-success status.
	#[error("API error ({status}): {message}")]
	Api { status: u16, message: String },
	#[error("Invalid response: {0}")]
	InvalidResponse(String),
	#[error("Configuration error: {0}")]
	Configuration(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
	pub role: String,
	pub content: String,
}

impl ChatMessage {
	pub fn system(content: impl Into<String>) -> Self {
		Self {
			role: "system".to_string(),
			content: content.into(),
		}
	}

	pub fn user(content: impl Into<String>) -> Self {
		Self {
			role: "user".to_string(),
			content: content.into(),
		}
	}
}

/// A single chat-completion call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
	pub model: String,
	pub messages: Vec<ChatMessage>,
	pub max_tokens: u32,
	pub temperature: f32,
}

#[async_trait]
pub trait CompletionInterface: Send + Sync {
	/// Returns the text of the first choice, possibly empty.
	async fn complete(&self, request: &CompletionRequest) -> Result<String, ContentError>;
}

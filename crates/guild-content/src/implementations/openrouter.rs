//! OpenAI-compatible chat-completion client, pointed at OpenRouter by default.

use crate::{CompletionInterface, CompletionRequest, ContentError};
use async_trait::async_trait;
use guild_config::ContentConfig;
use guild_types::SecretString;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Read when the configured API key resolves to an empty string.
pub const FALLBACK_API_KEY_VAR: &str = "OPENAI_API_KEY";

#[derive(Deserialize)]
struct ChatResponse {
	#[serde(default)]
	choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
	message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
	#[serde(default)]
	content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
	error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
	message: String,
}

pub struct OpenRouterClient {
	client: Client,
	base_url: String,
	api_key: SecretString,
}

impl OpenRouterClient {
	pub fn new(config: &ContentConfig) -> Result<Self, ContentError> {
		let client = Client::builder()
			.timeout(Duration::from_secs(config.timeout_seconds))
			.build()
			.map_err(|e| ContentError::Configuration(format!("HTTP client: {}", e)))?;

		Ok(Self {
			client,
			base_url: config.base_url.trim_end_matches('/').to_string(),
			api_key: resolve_api_key(&config.api_key, std::env::var(FALLBACK_API_KEY_VAR).ok()),
		})
	}
}

/// The configured key, or `fallback` when the configured one is empty.
fn resolve_api_key(configured: &SecretString, fallback: Option<String>) -> SecretString {
	if !configured.is_empty() {
		return configured.clone();
	}
	match fallback {
		Some(key) if !key.is_empty() => {
			tracing::debug!("Using {} for completion requests", FALLBACK_API_KEY_VAR);
			SecretString::new(key)
		},
		_ => configured.clone(),
	}
}

#[async_trait]
impl CompletionInterface for OpenRouterClient {
	async fn complete(&self, request: &CompletionRequest) -> Result<String, ContentError> {
		let url = format!("{}/chat/completions", self.base_url);

		let mut builder = self.client.post(&url).json(request);
		if !self.api_key.is_empty() {
			builder = self.api_key.with_exposed(|key| builder.bearer_auth(key));
		}

		tracing::debug!(model = %request.model, max_tokens = request.max_tokens, "Requesting completion");

		let response = builder
			.send()
			.await
			.map_err(|e| ContentError::Request(e.to_string()))?;

		let status = response.status();

		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			let message = serde_json::from_str::<ErrorBody>(&body)
				.map(|parsed| parsed.error.message)
				.unwrap_or(body);

			return Err(ContentError::Api {
				status: status.as_u16(),
				message,
			});
		}

		let parsed: ChatResponse = response
			.json()
			.await
			.map_err(|e| ContentError::InvalidResponse(e.to_string()))?;

		Ok(parsed
			.choices
			.into_iter()
			.next()
			.and_then(|choice| choice.message.content)
			.unwrap_or_default())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ChatMessage;
	use mockito::Matcher;

	fn config(base_url: String, api_key: &str) -> ContentConfig {
		ContentConfig {
			base_url,
			api_key: SecretString::new(api_key),
			model: "google/gemini-2.0-flash-001".into(),
			timeout_seconds: 5,
		}
	}

	fn request() -> CompletionRequest {
		CompletionRequest {
			model: "google/gemini-2.0-flash-001".into(),
			messages: vec![ChatMessage::user("hello")],
			max_tokens: 10,
			temperature: 0.5,
		}
	}

	#[tokio::test]
	async fn test_complete_returns_first_choice() {
		let mut server = mockito::Server::new_async().await;
		let mock = server
			.mock("POST", "/chat/completions")
			.match_header("authorization", "Bearer test-key")
			.match_body(Matcher::PartialJson(serde_json::json!({
				"model": "google/gemini-2.0-flash-001",
				"max_tokens": 10,
			})))
			.with_status(200)
			.with_header("content-type", "application/json")
			.with_body(r#"{"choices":[{"message":{"role":"assistant","content":"hi there"}}]}"#)
			.create_async()
			.await;

		let client = OpenRouterClient::new(&config(server.url(), "test-key")).unwrap();
		let text = client.complete(&request()).await.unwrap();

		assert_eq!(text, "hi there");
		mock.assert_async().await;
	}

	#[test]
	fn test_api_key_fallback() {
		let key = resolve_api_key(&SecretString::new("sk-or"), Some("sk-openai".into()));
		key.with_exposed(|key| assert_eq!(key, "sk-or"));

		let key = resolve_api_key(&SecretString::new(""), Some("sk-openai".into()));
		key.with_exposed(|key| assert_eq!(key, "sk-openai"));

		assert!(resolve_api_key(&SecretString::new(""), Some(String::new())).is_empty());
		assert!(resolve_api_key(&SecretString::new(""), None).is_empty());
	}

	#[tokio::test]
	async fn test_empty_key_uses_openai_env() {
		let mut server = mockito::Server::new_async().await;
		let mock = server
			.mock("POST", "/chat/completions")
			.match_header("authorization", "Bearer sk-openai-env")
			.with_status(200)
			.with_body(r#"{"choices":[{"message":{"content":"ok"}}]}"#)
			.create_async()
			.await;

		std::env::set_var(FALLBACK_API_KEY_VAR, "sk-openai-env");
		let client = OpenRouterClient::new(&config(server.url(), ""));
		std::env::remove_var(FALLBACK_API_KEY_VAR);

		assert_eq!(client.unwrap().complete(&request()).await.unwrap(), "ok");
		mock.assert_async().await;
	}

	#[tokio::test]
	async fn test_no_choices_is_empty() {
		let mut server = mockito::Server::new_async().await;
		server
			.mock("POST", "/chat/completions")
			.with_status(200)
			.with_body(r#"{"choices":[]}"#)
			.create_async()
			.await;

		let client = OpenRouterClient::new(&config(format!("{}/", server.url()), "k")).unwrap();
		assert_eq!(client.complete(&request()).await.unwrap(), "");
	}

	#[tokio::test]
	async fn test_api_error() {
		let mut server = mockito::Server::new_async().await;
		server
			.mock("POST", "/chat/completions")
			.with_status(401)
			.with_body(r#"{"error":{"message":"No auth credentials found"}}"#)
			.create_async()
			.await;

		let client = OpenRouterClient::new(&config(server.url(), "")).unwrap();
		match client.complete(&request()).await {
			Err(ContentError::Api { status, message }) => {
				assert_eq!(status, 401);
				assert_eq!(message, "No auth credentials found");
			},
			other => panic!("unexpected result: {:?}", other),
		}
	}
}

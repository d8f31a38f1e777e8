//! Guide and recommendation generation with fixed fallbacks.

use crate::implementations::openrouter::OpenRouterClient;
use crate::{ChatMessage, CompletionInterface, CompletionRequest, ContentError};
use guild_config::ContentConfig;
use std::sync::Arc;

pub const DEFAULT_MODEL: &str = "google/gemini-2.0-flash-001";
pub const DEFAULT_LEVEL: &str = "beginner";

const GUIDE_MAX_TOKENS: u32 = 600;
const GUIDE_TEMPERATURE: f32 = 0.7;
const RECOMMENDATION_MAX_TOKENS: u32 = 400;
const RECOMMENDATION_TEMPERATURE: f32 = 0.8;
const MAX_RECOMMENDATIONS: usize = 5;

const GUIDE_SYSTEM_PROMPT: &str = "You are an expert in online earning and micro-skills. Create concise, actionable guides that help people earn money online.";
const RECOMMENDATION_SYSTEM_PROMPT: &str = "You are a career advisor specializing in online earning opportunities. Provide personalized recommendations based on user skills and interests.";

pub const EMPTY_GUIDE_FALLBACK: &str = "Content generation failed. Please try again.";
pub const FAILED_GUIDE_FALLBACK: &str =
	"Unable to generate content at this time. Please check back later.";

pub const FALLBACK_RECOMMENDATIONS: [&str; 5] = [
	"Virtual Assistant - Provide administrative support remotely",
	"Content Writing - Create articles and blog posts for businesses",
	"Social Media Management - Manage social media accounts for brands",
	"Online Tutoring - Teach subjects you're knowledgeable about",
	"Freelance Design - Create graphics and visual content",
];

pub struct ContentService {
	completion: Arc<dyn CompletionInterface>,
	model: String,
}

impl ContentService {
	pub fn new(completion: Arc<dyn CompletionInterface>, model: impl Into<String>) -> Self {
		Self {
			completion,
			model: model.into(),
		}
	}

	/// Service backed by the OpenRouter client described by `config`.
	pub fn from_config(config: &ContentConfig) -> Result<Self, ContentError> {
		let client = OpenRouterClient::new(config)?;
		Ok(Self::new(Arc::new(client), config.model.clone()))
	}

	/// Writes a short actionable guide for `topic` at `level`.
	///
	/// Never fails: an empty completion and a failed request each map to
	/// their own fallback sentence.
	pub async fn generate_micro_skill_content(&self, topic: &str, level: &str) -> String {
		let prompt = format!(
			"Create a micro-skill guide for \"{}\" at {} level. Include practical steps, tools needed, and earning potential. Keep it under 500 words and make it immediately actionable.",
			topic, level
		);
		let request = self.request(GUIDE_SYSTEM_PROMPT, prompt, GUIDE_MAX_TOKENS, GUIDE_TEMPERATURE);

		match self.completion.complete(&request).await {
			Ok(content) if content.is_empty() => EMPTY_GUIDE_FALLBACK.to_string(),
			Ok(content) => content,
			Err(e) => {
				tracing::error!(topic, error = %e, "Guide generation failed");
				FAILED_GUIDE_FALLBACK.to_string()
			},
		}
	}

	/// Suggests up to five earning opportunities from skills and interests.
	pub async fn generate_personalized_recommendations(
		&self,
		skills: &[String],
		interests: &[String],
	) -> Vec<String> {
		let prompt = format!(
			"Based on these skills: {} and interests: {}, recommend 5 specific online earning opportunities with brief descriptions.",
			skills.join(", "),
			interests.join(", ")
		);
		let request = self.request(
			RECOMMENDATION_SYSTEM_PROMPT,
			prompt,
			RECOMMENDATION_MAX_TOKENS,
			RECOMMENDATION_TEMPERATURE,
		);

		match self.completion.complete(&request).await {
			Ok(content) => parse_recommendations(&content),
			Err(e) => {
				tracing::error!(error = %e, "Recommendation generation failed");
				fallback_recommendations()
			},
		}
	}

	fn request(
		&self,
		system: &str,
		user: String,
		max_tokens: u32,
		temperature: f32,
	) -> CompletionRequest {
		CompletionRequest {
			model: self.model.clone(),
			messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
			max_tokens,
			temperature,
		}
	}
}

/// Non-empty lines of a completion, at most five.
pub fn parse_recommendations(content: &str) -> Vec<String> {
	content
		.lines()
		.filter(|line| !line.trim().is_empty())
		.take(MAX_RECOMMENDATIONS)
		.map(str::to_string)
		.collect()
}

pub fn fallback_recommendations() -> Vec<String> {
	FALLBACK_RECOMMENDATIONS
		.iter()
		.map(|line| line.to_string())
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use std::sync::Mutex;

	/// Completion stub that replays one answer and keeps the last request.
	struct StubCompletion {
		answer: Result<String, String>,
		last: Mutex<Option<CompletionRequest>>,
	}

	impl StubCompletion {
		fn new(answer: Result<&str, &str>) -> Arc<Self> {
			Arc::new(Self {
				answer: answer.map(str::to_string).map_err(str::to_string),
				last: Mutex::new(None),
			})
		}

		fn last_request(&self) -> CompletionRequest {
			self.last.lock().unwrap().clone().unwrap()
		}
	}

	#[async_trait]
	impl CompletionInterface for StubCompletion {
		async fn complete(&self, request: &CompletionRequest) -> Result<String, ContentError> {
			*self.last.lock().unwrap() = Some(request.clone());
			self.answer.clone().map_err(ContentError::Request)
		}
	}

	#[tokio::test]
	async fn test_guide_prompt_and_parameters() {
		let stub = StubCompletion::new(Ok("Step 1: start"));
		let service = ContentService::new(stub.clone(), DEFAULT_MODEL);

		let guide = service
			.generate_micro_skill_content("Copywriting", DEFAULT_LEVEL)
			.await;
		assert_eq!(guide, "Step 1: start");

		let request = stub.last_request();
		assert_eq!(request.model, DEFAULT_MODEL);
		assert_eq!(request.max_tokens, 600);
		assert_eq!(request.temperature, 0.7);
		assert_eq!(request.messages[0].role, "system");
		assert!(request.messages[1]
			.content
			.starts_with("Create a micro-skill guide for \"Copywriting\" at beginner level."));
	}

	#[tokio::test]
	async fn test_guide_fallbacks() {
		let service = ContentService::new(StubCompletion::new(Ok("")), DEFAULT_MODEL);
		assert_eq!(
			service.generate_micro_skill_content("x", "expert").await,
			EMPTY_GUIDE_FALLBACK
		);

		let service = ContentService::new(StubCompletion::new(Ok("  ")), DEFAULT_MODEL);
		assert_eq!(service.generate_micro_skill_content("x", "expert").await, "  ");

		let service = ContentService::new(StubCompletion::new(Err("down")), DEFAULT_MODEL);
		assert_eq!(
			service.generate_micro_skill_content("x", "expert").await,
			FAILED_GUIDE_FALLBACK
		);
	}

	#[tokio::test]
	async fn test_recommendations_keep_five_lines() {
		let stub = StubCompletion::new(Ok("1. A\n\n2. B\n3. C\n   \n4. D\n5. E\n6. F\n"));
		let service = ContentService::new(stub.clone(), DEFAULT_MODEL);

		let skills = vec!["writing".to_string(), "design".to_string()];
		let interests = vec!["travel".to_string()];
		let recommendations = service
			.generate_personalized_recommendations(&skills, &interests)
			.await;

		assert_eq!(recommendations, vec!["1. A", "2. B", "3. C", "4. D", "5. E"]);

		let request = stub.last_request();
		assert_eq!(request.max_tokens, 400);
		assert_eq!(request.temperature, 0.8);
		assert!(request.messages[1]
			.content
			.starts_with("Based on these skills: writing, design and interests: travel,"));
	}

	#[tokio::test]
	async fn test_recommendations_fallback() {
		let service = ContentService::new(StubCompletion::new(Err("down")), DEFAULT_MODEL);
		let recommendations = service.generate_personalized_recommendations(&[], &[]).await;
		assert_eq!(recommendations, fallback_recommendations());
		assert_eq!(recommendations.len(), 5);
	}

	#[test]
	fn test_empty_completion_gives_no_recommendations() {
		assert!(parse_recommendations("").is_empty());
	}
}

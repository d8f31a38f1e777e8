//! Configuration for the guild payment service.
//!
//! Configuration is a single TOML file. String values may reference
//! environment variables as `${VAR}` or `${VAR:-default}`; references are
//! resolved before parsing so secrets such as API keys never have to live in
//! the file itself.

use guild_types::{
	SecretString, BASE_CHAIN_ID, DEFAULT_PAYMENT_DESCRIPTION, USDC_BASE_ADDRESS, USDC_DECIMALS,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("Configuration error: {0}")]
	Parse(String),
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// The full error embeds the whole input; the message is enough
		ConfigError::Parse(err.message().to_string())
	}
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	pub guild: GuildConfig,
	#[serde(default)]
	pub payment: PaymentConfig,
	/// Wallet used as the signing capability. Absent means not connected.
	pub wallet: Option<WalletConfig>,
	pub settlement: SettlementConfig,
	/// Content generation client. Absent disables remote generation.
	pub content: Option<ContentConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GuildConfig {
	/// Identifier of this deployment, used in logs.
	pub id: String,
}

/// Largest accepted `confirmation_timeout_seconds` (one day).
pub const MAX_CONFIRMATION_TIMEOUT_SECONDS: u64 = 86_400;

/// Payment flow parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentConfig {
	#[serde(default = "default_token_address")]
	pub token_address: String,
	#[serde(default = "default_token_decimals")]
	pub token_decimals: u32,
	#[serde(default = "default_chain_id")]
	pub chain_id: u64,
	#[serde(default = "default_description")]
	pub default_description: String,
	/// Upper bound on the confirmation wait.
	#[serde(default = "default_confirmation_timeout_seconds")]
	pub confirmation_timeout_seconds: u64,
	/// Delay between receipt polls.
	#[serde(default = "default_poll_interval_ms")]
	pub poll_interval_ms: u64,
	/// Confirmations after which the wait returns early.
	#[serde(default = "default_min_confirmations")]
	pub min_confirmations: u64,
}

fn default_token_address() -> String {
	USDC_BASE_ADDRESS.to_string()
}

fn default_token_decimals() -> u32 {
	USDC_DECIMALS
}

fn default_chain_id() -> u64 {
	BASE_CHAIN_ID
}

fn default_description() -> String {
	DEFAULT_PAYMENT_DESCRIPTION.to_string()
}

fn default_confirmation_timeout_seconds() -> u64 {
	60
}

fn default_poll_interval_ms() -> u64 {
	2000
}

fn default_min_confirmations() -> u64 {
	1
}

impl Default for PaymentConfig {
	fn default() -> Self {
		Self {
			token_address: default_token_address(),
			token_decimals: default_token_decimals(),
			chain_id: default_chain_id(),
			default_description: default_description(),
			confirmation_timeout_seconds: default_confirmation_timeout_seconds(),
			poll_interval_ms: default_poll_interval_ms(),
			min_confirmations: default_min_confirmations(),
		}
	}
}

impl PaymentConfig {
	pub fn confirmation_timeout(&self) -> Duration {
		Duration::from_secs(self.confirmation_timeout_seconds)
	}

	pub fn poll_interval(&self) -> Duration {
		Duration::from_millis(self.poll_interval_ms)
	}
}

/// Wallet implementations; `primary` selects the one in use.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WalletConfig {
	pub primary: String,
	/// Raw per-implementation tables, parsed by each implementation's factory.
	pub implementations: HashMap<String, toml::Value>,
}

impl WalletConfig {
	pub fn primary_config(&self) -> Option<&toml::Value> {
		self.implementations.get(&self.primary)
	}
}

/// Settlement implementations; `primary` selects the one in use.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SettlementConfig {
	pub primary: String,
	pub implementations: HashMap<String, toml::Value>,
}

impl SettlementConfig {
	pub fn primary_config(&self) -> Option<&toml::Value> {
		self.implementations.get(&self.primary)
	}
}

/// OpenAI-compatible completion endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContentConfig {
	#[serde(default = "default_content_base_url")]
	pub base_url: String,
	#[serde(default)]
	pub api_key: SecretString,
	#[serde(default = "default_content_model")]
	pub model: String,
	#[serde(default = "default_content_timeout_seconds")]
	pub timeout_seconds: u64,
}

fn default_content_base_url() -> String {
	"https://openrouter.ai/api/v1".to_string()
}

fn default_content_model() -> String {
	"google/gemini-2.0-flash-001".to_string()
}

fn default_content_timeout_seconds() -> u64 {
	30
}

/// Replaces `${VAR}` and `${VAR:-default}` with environment values.
///
/// Placeholders inside `#` comments are left untouched. Input is capped at
/// 1MB to bound regex work.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = String::with_capacity(input.len());

	for line in input.split_inclusive('\n') {
		let (code, comment) = line.split_at(comment_start(line).unwrap_or(line.len()));
		let mut last = 0;

		for cap in re.captures_iter(code) {
			let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
				continue;
			};

			let value = match std::env::var(var_name.as_str()) {
				Ok(v) => v,
				Err(_) => match cap.get(2) {
					Some(default) => default.as_str().to_string(),
					None => {
						return Err(ConfigError::Validation(format!(
							"Environment variable '{}' not found",
							var_name.as_str()
						)));
					},
				},
			};

			result.push_str(&code[last..full_match.start()]);
			result.push_str(&value);
			last = full_match.end();
		}

		result.push_str(&code[last..]);
		result.push_str(comment);
	}

	Ok(result)
}

/// Byte offset of the first `#` on `line` that sits outside a string.
fn comment_start(line: &str) -> Option<usize> {
	let mut quote: Option<char> = None;
	let mut escaped = false;

	for (i, c) in line.char_indices() {
		match quote {
			Some('"') if escaped => escaped = false,
			Some('"') if c == '\\' => escaped = true,
			Some(q) if c == q => quote = None,
			Some(_) => {},
			None if c == '"' || c == '\'' => quote = Some(c),
			None if c == '#' => return Some(i),
			None => {},
		}
	}

	None
}

impl Config {
	/// Loads, resolves and validates a configuration file.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let content = tokio::fs::read_to_string(path).await.map_err(|e| {
			ConfigError::Io(std::io::Error::new(
				e.kind(),
				format!("Cannot read {}: {}", path.display(), e),
			))
		})?;
		content.parse()
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if self.guild.id.trim().is_empty() {
			return Err(ConfigError::Validation("Guild ID cannot be empty".into()));
		}

		let payment = &self.payment;
		if payment.token_decimals > 18 {
			return Err(ConfigError::Validation(format!(
				"token_decimals must be at most 18, got {}",
				payment.token_decimals
			)));
		}
		if payment.poll_interval_ms == 0 {
			return Err(ConfigError::Validation(
				"poll_interval_ms must be greater than zero".into(),
			));
		}
		if payment.confirmation_timeout_seconds == 0 {
			return Err(ConfigError::Validation(
				"confirmation_timeout_seconds must be greater than zero".into(),
			));
		}
		if payment.confirmation_timeout_seconds > MAX_CONFIRMATION_TIMEOUT_SECONDS {
			return Err(ConfigError::Validation(format!(
				"confirmation_timeout_seconds must be at most {}",
				MAX_CONFIRMATION_TIMEOUT_SECONDS
			)));
		}
		if payment.min_confirmations == 0 {
			return Err(ConfigError::Validation(
				"min_confirmations must be at least 1".into(),
			));
		}
		if !payment.token_address.starts_with("0x") {
			return Err(ConfigError::Validation(format!(
				"token_address must be a 0x-prefixed address, got '{}'",
				payment.token_address
			)));
		}

		if let Some(wallet) = &self.wallet {
			if wallet.primary_config().is_none() {
				return Err(ConfigError::Validation(format!(
					"Primary wallet '{}' not found in wallet.implementations",
					wallet.primary
				)));
			}
		}

		if self.settlement.primary_config().is_none() {
			return Err(ConfigError::Validation(format!(
				"Primary settlement '{}' not found in settlement.implementations",
				self.settlement.primary
			)));
		}

		if let Some(content) = &self.content {
			if content.base_url.trim().is_empty() {
				return Err(ConfigError::Validation(
					"content.base_url cannot be empty".into(),
				));
			}
		}

		Ok(())
	}
}

impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

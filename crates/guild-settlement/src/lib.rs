//! Settlement step for guild payments.
//!
//! Settlement is whatever actually moves value from the connected wallet to
//! the recipient. The orchestrator hands a [`SettlementDescriptor`] to a
//! [`SettlementInterface`] and gets back the identifier of the resulting
//! transaction, which it then watches for confirmations.

use async_trait::async_trait;
use guild_types::{ImplementationRegistry, SettlementDescriptor, TransactionHash};
use guild_wallet::WalletInterface;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod implementations {
	pub mod http;
	pub mod mock;
	pub mod simulated;
}

/// Message used when a failure carries no usable text.
pub const GENERIC_FAILURE_MESSAGE: &str = "Payment failed";

/// Payload attached to a rejection by a remote settlement party.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorData {
	#[serde(default)]
	pub message: Option<String>,
}

/// Response details of a rejected settlement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
	#[serde(default)]
	pub status: Option<u16>,
	#[serde(default)]
	pub data: ErrorData,
}

/// Errors that can occur during settlement.
#[derive(Debug, Clone, Error)]
pub enum SettlementError {
	/// The settlement party refused the payment.
	///
	/// Display prefers `response.data.message`, then `message`, then
	/// [`GENERIC_FAILURE_MESSAGE`].
	#[error("{}", rejection_message(.message, .response))]
	Rejected {
		message: Option<String>,
		response: Option<ErrorResponse>,
	},
	#[error("Network error: {0}")]
	Network(String),
	#[error("Configuration error: {0}")]
	Configuration(String),
}

impl SettlementError {
	/// Rejection carrying only a top-level message.
	pub fn rejected(message: impl Into<String>) -> Self {
		Self::Rejected {
			message: Some(message.into()),
			response: None,
		}
	}

	/// Message suitable for a failed payment result.
	pub fn user_message(&self) -> String {
		let message = self.to_string();
		if message.trim().is_empty() {
			GENERIC_FAILURE_MESSAGE.to_string()
		} else {
			message
		}
	}
}

fn rejection_message(message: &Option<String>, response: &Option<ErrorResponse>) -> String {
	let nested = response
		.as_ref()
		.and_then(|response| response.data.message.as_deref());

	[nested, message.as_deref()]
		.into_iter()
		.flatten()
		.find(|text| !text.trim().is_empty())
		.unwrap_or(GENERIC_FAILURE_MESSAGE)
		.to_string()
}

/// Interface every settlement mechanism provides.
#[async_trait]
pub trait SettlementInterface: Send + Sync {
	/// Short name used in logs.
	fn name(&self) -> &str;

	/// Performs the transfer described by `descriptor` on behalf of `wallet`.
	///
	/// An empty hash in the `Ok` case is allowed here; the caller decides
	/// whether that is a failure.
	async fn settle(
		&self,
		descriptor: &SettlementDescriptor,
		wallet: &dyn WalletInterface,
	) -> Result<TransactionHash, SettlementError>;
}

/// Builds a settlement mechanism from its `[settlement.implementations.<name>]` table.
pub type SettlementFactory =
	fn(&toml::Value) -> Result<Box<dyn SettlementInterface>, SettlementError>;

pub trait SettlementRegistry: ImplementationRegistry<Factory = SettlementFactory> {}

/// Returns every settlement implementation as (name, factory) pairs.
pub fn get_all_implementations() -> Vec<(&'static str, SettlementFactory)> {
	use implementations::{http, mock, simulated};

	vec![
		(simulated::Registry::NAME, simulated::Registry::factory()),
		(http::Registry::NAME, http::Registry::factory()),
		(mock::Registry::NAME, mock::Registry::factory()),
	]
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_nested_message_wins() {
		let error = SettlementError::Rejected {
			message: Some("Request failed with status 402".into()),
			response: Some(ErrorResponse {
				status: Some(402),
				data: ErrorData {
					message: Some("Insufficient USDC balance".into()),
				},
			}),
		};
		assert_eq!(error.user_message(), "Insufficient USDC balance");
	}

	#[test]
	fn test_message_fallbacks() {
		assert_eq!(
			SettlementError::rejected("User rejected").user_message(),
			"User rejected"
		);

		let empty_nested = SettlementError::Rejected {
			message: Some("outer".into()),
			response: Some(ErrorResponse::default()),
		};
		assert_eq!(empty_nested.user_message(), "outer");

		let nothing = SettlementError::Rejected {
			message: None,
			response: None,
		};
		assert_eq!(nothing.user_message(), GENERIC_FAILURE_MESSAGE);

		let blank = SettlementError::rejected("  ");
		assert_eq!(blank.user_message(), GENERIC_FAILURE_MESSAGE);

		assert_eq!(
			SettlementError::Network("timeout".into()).user_message(),
			"Network error: timeout"
		);
	}

	#[test]
	fn test_registered_names() {
		let names: Vec<_> = get_all_implementations()
			.into_iter()
			.map(|(name, _)| name)
			.collect();
		assert_eq!(names, vec!["simulated", "http", "mock"]);
	}
}

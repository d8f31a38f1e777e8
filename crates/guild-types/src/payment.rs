//! Payment request lifecycle types.
//!
//! A [`PaymentRequest`] is checked and submitted by the orchestrator, which
//! produces exactly one [`PaymentResult`]. Callers track progress through a
//! [`PaymentStatus`] that only changes by applying [`PaymentEvent`]s.

use crate::utils::conversion::parse_decimal_amount;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Required prefix of a recipient address.
pub const RECIPIENT_PREFIX: &str = "0x";
/// Required length of a recipient address, prefix included.
pub const RECIPIENT_LENGTH: usize = 42;

/// Reasons a payment request is rejected before any side effect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentRequestError {
	/// Amount is missing, not a number, or not strictly positive.
	#[error("Invalid amount")]
	InvalidAmount,
	/// Recipient is missing or does not start with `0x`.
	#[error("Invalid recipient address")]
	InvalidRecipientFormat,
	/// Recipient is not exactly 42 characters long.
	#[error("Invalid recipient address length")]
	InvalidRecipientLength,
}

/// A single payment attempt as entered by the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
	/// Amount in whole tokens as a decimal string (e.g. "1.50").
	pub amount: String,
	/// Recipient address.
	pub recipient: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	/// Opaque caller data forwarded to the settlement step.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub metadata: Option<BTreeMap<String, serde_json::Value>>,
}

impl PaymentRequest {
	pub fn new(amount: impl Into<String>, recipient: impl Into<String>) -> Self {
		Self {
			amount: amount.into(),
			recipient: recipient.into(),
			description: None,
			metadata: None,
		}
	}

	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}

	pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
		self.metadata
			.get_or_insert_with(BTreeMap::new)
			.insert(key.into(), value);
		self
	}

	/// Checks amount, then recipient prefix, then recipient length.
	///
	/// The order is fixed so the reported message is deterministic when
	/// several fields are wrong at once.
	pub fn validate(&self) -> Result<(), PaymentRequestError> {
		if parse_decimal_amount(&self.amount).is_err() {
			return Err(PaymentRequestError::InvalidAmount);
		}

		if self.recipient.is_empty() || !self.recipient.starts_with(RECIPIENT_PREFIX) {
			return Err(PaymentRequestError::InvalidRecipientFormat);
		}

		if self.recipient.chars().count() != RECIPIENT_LENGTH {
			return Err(PaymentRequestError::InvalidRecipientLength);
		}

		Ok(())
	}
}

/// Terminal outcome of one orchestrator call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResult {
	pub success: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub transaction_hash: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
	/// Confirmations observed before the wait window elapsed.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub confirmations: Option<u64>,
}

impl PaymentResult {
	pub fn succeeded(transaction_hash: impl Into<String>, confirmations: u64) -> Self {
		Self {
			success: true,
			transaction_hash: Some(transaction_hash.into()),
			error: None,
			confirmations: Some(confirmations),
		}
	}

	pub fn failed(error: impl Into<String>) -> Self {
		Self {
			success: false,
			transaction_hash: None,
			error: Some(error.into()),
			confirmations: None,
		}
	}
}

/// Status transitions produced by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentEvent {
	/// Refused before submission; only the error is recorded.
	Rejected { error: String },
	/// A submission is now in flight.
	Started,
	/// The in-flight submission produced its result.
	Finished(PaymentResult),
}

/// Caller-visible progress of the payment flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatus {
	pub is_loading: bool,
	pub error: Option<String>,
	pub last_payment: Option<PaymentResult>,
}

impl PaymentStatus {
	/// Returns the status that follows `event`. Never mutates `self`.
	pub fn apply(&self, event: &PaymentEvent) -> PaymentStatus {
		match event {
			PaymentEvent::Rejected { error } => PaymentStatus {
				error: Some(error.clone()),
				..self.clone()
			},
			PaymentEvent::Started => PaymentStatus {
				is_loading: true,
				error: None,
				..self.clone()
			},
			PaymentEvent::Finished(result) => PaymentStatus {
				is_loading: false,
				error: result.error.clone(),
				last_payment: Some(result.clone()),
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const VALID_RECIPIENT: &str = "0x742d35Cc6634C0532925a3b8D4C9db96C4b4d8b6";

	#[test]
	fn test_valid_request() {
		let request = PaymentRequest::new("10.50", VALID_RECIPIENT)
			.with_description("Test payment")
			.with_metadata("testId", serde_json::json!("123"));
		assert_eq!(request.validate(), Ok(()));
	}

	#[test]
	fn test_invalid_amounts() {
		for amount in ["", "0", "-5.00", "abc", "0.00"] {
			let request = PaymentRequest::new(amount, VALID_RECIPIENT);
			assert_eq!(
				request.validate(),
				Err(PaymentRequestError::InvalidAmount),
				"amount {:?}",
				amount
			);
		}
	}

	#[test]
	fn test_invalid_recipients() {
		let request = PaymentRequest::new("1.00", "invalid-address");
		assert_eq!(
			request.validate(),
			Err(PaymentRequestError::InvalidRecipientFormat)
		);

		let request = PaymentRequest::new("1.00", "");
		assert_eq!(
			request.validate(),
			Err(PaymentRequestError::InvalidRecipientFormat)
		);

		let request = PaymentRequest::new("1.00", "0x123");
		assert_eq!(
			request.validate(),
			Err(PaymentRequestError::InvalidRecipientLength)
		);
	}

	#[test]
	fn test_amount_checked_before_recipient() {
		let request = PaymentRequest::new("0", "0x123");
		assert_eq!(request.validate(), Err(PaymentRequestError::InvalidAmount));
		assert_eq!(
			PaymentRequestError::InvalidAmount.to_string(),
			"Invalid amount"
		);
	}

	#[test]
	fn test_status_transitions() {
		let idle = PaymentStatus::default();

		let rejected = idle.apply(&PaymentEvent::Rejected {
			error: "Wallet not connected".to_string(),
		});
		assert!(!rejected.is_loading);
		assert_eq!(rejected.error.as_deref(), Some("Wallet not connected"));
		assert!(rejected.last_payment.is_none());

		let started = rejected.apply(&PaymentEvent::Started);
		assert!(started.is_loading);
		assert!(started.error.is_none());

		let failed = PaymentResult::failed("Payment failed");
		let finished = started.apply(&PaymentEvent::Finished(failed.clone()));
		assert!(!finished.is_loading);
		assert_eq!(finished.error.as_deref(), Some("Payment failed"));
		assert_eq!(finished.last_payment, Some(failed));

		// A later success replaces the previous result and clears the error
		let ok = PaymentResult::succeeded("0xabc", 2);
		let next = finished
			.apply(&PaymentEvent::Started)
			.apply(&PaymentEvent::Finished(ok.clone()));
		assert!(next.error.is_none());
		assert_eq!(next.last_payment, Some(ok));
	}

	#[test]
	fn test_result_serializes_camel_case() {
		let result = PaymentResult::succeeded("0xabc", 3);
		let json = serde_json::to_value(&result).unwrap();
		assert_eq!(json["transactionHash"], "0xabc");
		assert_eq!(json["confirmations"], 3);
		assert!(json.get("error").is_none());
	}
}

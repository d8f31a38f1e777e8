//! Settlement descriptor passed from the orchestrator to a settlement step.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything a settlement implementation needs to move funds.
///
/// Built from a validated [`crate::PaymentRequest`]; `amount` is already in
/// token base units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementDescriptor {
	/// Destination address.
	pub to: String,
	/// Amount in base units as an integer string.
	pub amount: String,
	/// Token contract address.
	pub token: String,
	pub description: String,
	#[serde(default)]
	pub metadata: BTreeMap<String, serde_json::Value>,
	pub chain_id: u64,
}

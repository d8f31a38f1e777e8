//! Transaction types shared by wallets and settlement implementations.
//!
//! Hashes are kept as the opaque strings returned by the settlement step; only
//! chain-facing implementations need to parse them into fixed-size bytes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque transaction identifier, normally `0x` followed by 64 hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionHash(pub String);

impl TransactionHash {
	pub fn new(hash: impl Into<String>) -> Self {
		Self(hash.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Whether the settlement step produced no usable identifier.
	pub fn is_empty(&self) -> bool {
		self.0.trim().is_empty()
	}
}

impl fmt::Display for TransactionHash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<String> for TransactionHash {
	fn from(hash: String) -> Self {
		Self(hash)
	}
}

impl From<&str> for TransactionHash {
	fn from(hash: &str) -> Self {
		Self(hash.to_string())
	}
}

/// Receipt for a transaction that has been included in a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
	/// The hash of the transaction.
	pub hash: TransactionHash,
	/// The block number where the transaction was included.
	pub block_number: u64,
	/// Whether the transaction executed successfully.
	pub success: bool,
}

impl TransactionReceipt {
	/// Number of blocks produced on top of the inclusion block.
	pub fn confirmations_at(&self, head: u64) -> u64 {
		head.saturating_sub(self.block_number)
	}
}

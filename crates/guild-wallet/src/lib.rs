//! Wallet access for the guild payment system.
//!
//! A wallet is the signing capability the payment flow depends on: it owns
//! the paying account and can answer questions about chain state. The
//! orchestrator only needs receipts and the current block height to count
//! confirmations, plus a token balance for display.

use async_trait::async_trait;
use guild_types::{ImplementationRegistry, TransactionHash, TransactionReceipt};
use thiserror::Error;

pub mod implementations {
	pub mod evm {
		pub mod alloy;
	}
	pub mod mock;
}

/// Errors that can occur when querying a wallet.
#[derive(Debug, Error)]
pub enum WalletError {
	/// RPC or transport failure.
	#[error("Network error: {0}")]
	Network(String),
	/// The transaction hash could not be parsed for this chain.
	#[error("Invalid transaction hash: {0}")]
	InvalidHash(String),
	#[error("Invalid address: {0}")]
	InvalidAddress(String),
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Interface every wallet implementation provides.
///
/// All chain queries are fallible and asynchronous. Callers that poll (such
/// as the confirmation monitor) are expected to treat errors as "not yet
/// available" rather than as a failed payment.
#[async_trait]
pub trait WalletInterface: Send + Sync {
	/// Address of the connected account.
	fn address(&self) -> &str;

	/// Chain the wallet is connected to.
	fn chain_id(&self) -> u64;

	/// Returns the receipt for `hash`, or `None` while it is not yet mined.
	async fn get_receipt(
		&self,
		hash: &TransactionHash,
	) -> Result<Option<TransactionReceipt>, WalletError>;

	/// Returns the latest block number.
	async fn get_block_number(&self) -> Result<u64, WalletError>;

	/// Returns the account's balance of `token` in base units.
	async fn get_token_balance(&self, token: &str) -> Result<String, WalletError>;
}

/// Builds a wallet from its `[wallet.implementations.<name>]` table.
pub type WalletFactory = fn(&toml::Value) -> Result<Box<dyn WalletInterface>, WalletError>;

pub trait WalletRegistry: ImplementationRegistry<Factory = WalletFactory> {}

/// Returns every wallet implementation as (name, factory) pairs.
pub fn get_all_implementations() -> Vec<(&'static str, WalletFactory)> {
	use implementations::{evm::alloy, mock};

	vec![
		(alloy::Registry::NAME, alloy::Registry::factory()),
		(mock::Registry::NAME, mock::Registry::factory()),
	]
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_registered_names() {
		let names: Vec<_> = get_all_implementations()
			.into_iter()
			.map(|(name, _)| name)
			.collect();
		assert_eq!(names, vec!["evm_alloy", "mock"]);
	}
}

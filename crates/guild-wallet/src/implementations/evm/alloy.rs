//! JSON-RPC wallet backed by an Alloy HTTP provider.
//!
//! This wallet is read-only: it answers receipt, block and balance queries
//! for a configured account. Signing stays with the settlement step.

use crate::{WalletError, WalletFactory, WalletInterface, WalletRegistry};
use alloy_primitives::{Address, B256, U256};
use alloy_provider::{Provider, ProviderBuilder};
use alloy_rpc_types::TransactionRequest;
use alloy_transport_http::Http;
use async_trait::async_trait;
use guild_types::{ImplementationRegistry, TransactionHash, TransactionReceipt, BASE_CHAIN_ID};
use serde::Deserialize;
use std::sync::Arc;

/// ERC-20 `balanceOf(address)` selector.
const BALANCE_OF_SELECTOR: [u8; 4] = [0x70, 0xa0, 0x82, 0x31];

/// Configuration for [`AlloyWallet`].
#[derive(Debug, Clone, Deserialize)]
pub struct AlloyWalletConfig {
	pub rpc_url: String,
	/// Account the wallet acts for.
	pub address: String,
	#[serde(default = "default_chain_id")]
	pub chain_id: u64,
}

fn default_chain_id() -> u64 {
	BASE_CHAIN_ID
}

pub struct AlloyWallet {
	provider: Arc<dyn Provider<Http<reqwest::Client>> + Send + Sync>,
	address: String,
	account: Address,
	chain_id: u64,
}

impl AlloyWallet {
	pub fn new(config: AlloyWalletConfig) -> Result<Self, WalletError> {
		let url = config.rpc_url.parse().map_err(|e| {
			WalletError::Configuration(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
		})?;

		let account: Address = config
			.address
			.parse()
			.map_err(|e| WalletError::InvalidAddress(format!("{}: {}", config.address, e)))?;

		let provider = ProviderBuilder::new().on_http(url);

		tracing::debug!(
			chain_id = config.chain_id,
			address = %config.address,
			"Created JSON-RPC wallet"
		);

		Ok(Self {
			provider: Arc::new(provider) as Arc<dyn Provider<Http<reqwest::Client>> + Send + Sync>,
			address: config.address,
			account,
			chain_id: config.chain_id,
		})
	}
}

#[async_trait]
impl WalletInterface for AlloyWallet {
	fn address(&self) -> &str {
		&self.address
	}

	fn chain_id(&self) -> u64 {
		self.chain_id
	}

	async fn get_receipt(
		&self,
		hash: &TransactionHash,
	) -> Result<Option<TransactionReceipt>, WalletError> {
		let tx_hash: B256 = hash
			.as_str()
			.parse()
			.map_err(|e| WalletError::InvalidHash(format!("{}: {}", hash, e)))?;

		let receipt = self
			.provider
			.get_transaction_receipt(tx_hash)
			.await
			.map_err(|e| WalletError::Network(format!("Failed to get receipt: {}", e)))?;

		Ok(receipt.map(|receipt| TransactionReceipt {
			hash: hash.clone(),
			block_number: receipt.block_number.unwrap_or(0),
			success: receipt.status(),
		}))
	}

	async fn get_block_number(&self) -> Result<u64, WalletError> {
		self.provider
			.get_block_number()
			.await
			.map_err(|e| WalletError::Network(format!("Failed to get block number: {}", e)))
	}

	async fn get_token_balance(&self, token: &str) -> Result<String, WalletError> {
		let token_addr: Address = token
			.parse()
			.map_err(|e| WalletError::InvalidAddress(format!("{}: {}", token, e)))?;

		let mut call_data = Vec::with_capacity(36);
		call_data.extend_from_slice(&BALANCE_OF_SELECTOR);
		call_data.extend_from_slice(&[0; 12]);
		call_data.extend_from_slice(self.account.as_slice());

		let request = TransactionRequest::default()
			.to(token_addr)
			.input(call_data.into());

		let result = self
			.provider
			.call(&request)
			.await
			.map_err(|e| WalletError::Network(format!("Failed to call balanceOf: {}", e)))?;

		if result.len() < 32 {
			return Err(WalletError::Network(
				"Invalid balanceOf response".to_string(),
			));
		}

		Ok(U256::from_be_slice(&result[..32]).to_string())
	}
}

/// Factory for `[wallet.implementations.evm_alloy]`.
///
/// Required keys: `rpc_url`, `address`. Optional: `chain_id` (defaults to Base).
pub fn create_wallet(config: &toml::Value) -> Result<Box<dyn WalletInterface>, WalletError> {
	let config: AlloyWalletConfig = config
		.clone()
		.try_into()
		.map_err(|e| WalletError::Configuration(format!("Invalid evm_alloy config: {}", e)))?;

	Ok(Box::new(AlloyWallet::new(config)?))
}

pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "evm_alloy";
	type Factory = WalletFactory;

	fn factory() -> Self::Factory {
		create_wallet
	}
}

impl WalletRegistry for Registry {}

//! Scripted in-memory wallet for tests and local demos.
//!
//! The mock simulates a chain whose head advances by a fixed number of blocks
//! every time the block number is read. Any hash is reported as mined at a
//! configured block once a configured number of receipt queries has passed.

use crate::{WalletError, WalletFactory, WalletInterface, WalletRegistry};
use async_trait::async_trait;
use guild_types::{ImplementationRegistry, TransactionHash, TransactionReceipt, BASE_CHAIN_ID};
use serde::Deserialize;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Configuration for [`MockWallet`], all keys optional.
#[derive(Debug, Clone, Deserialize)]
pub struct MockWalletConfig {
	#[serde(default = "default_address")]
	pub address: String,
	#[serde(default = "default_chain_id")]
	pub chain_id: u64,
	/// Block height reported by the first head query.
	#[serde(default = "default_head")]
	pub head: u64,
	/// Block every receipt reports; `None` means nothing is ever mined.
	#[serde(default = "default_receipt_block")]
	pub receipt_block: Option<u64>,
	/// Overrides `receipt_block` so every receipt query returns nothing.
	#[serde(default)]
	pub never_mined: bool,
	/// Head advance per block number query.
	#[serde(default = "default_blocks_per_poll")]
	pub blocks_per_poll: u64,
	/// Balance reported for every token, in base units.
	#[serde(default = "default_balance")]
	pub balance: String,
}

fn default_address() -> String {
	"0x1234567890123456789012345678901234567890".to_string()
}

fn default_chain_id() -> u64 {
	BASE_CHAIN_ID
}

fn default_head() -> u64 {
	100
}

fn default_receipt_block() -> Option<u64> {
	Some(100)
}

fn default_blocks_per_poll() -> u64 {
	1
}

fn default_balance() -> String {
	"0".to_string()
}

impl Default for MockWalletConfig {
	fn default() -> Self {
		Self {
			address: default_address(),
			chain_id: default_chain_id(),
			head: default_head(),
			receipt_block: default_receipt_block(),
			never_mined: false,
			blocks_per_poll: default_blocks_per_poll(),
			balance: default_balance(),
		}
	}
}

#[derive(Debug)]
struct MockChain {
	head: u64,
	blocks_per_poll: u64,
	receipt_block: Option<u64>,
	/// Receipt queries answered with `None` before the receipt shows up.
	pending_polls: u32,
	fail_receipts: bool,
	default_balance: String,
	balances: HashMap<String, String>,
	receipt_queries: u32,
}

pub struct MockWallet {
	address: String,
	chain_id: u64,
	chain: Mutex<MockChain>,
}

impl MockWallet {
	pub fn new(config: MockWalletConfig) -> Self {
		let receipt_block = if config.never_mined {
			None
		} else {
			config.receipt_block
		};

		Self {
			address: config.address,
			chain_id: config.chain_id,
			chain: Mutex::new(MockChain {
				head: config.head,
				blocks_per_poll: config.blocks_per_poll,
				receipt_block,
				pending_polls: 0,
				fail_receipts: false,
				default_balance: config.balance,
				balances: HashMap::new(),
				receipt_queries: 0,
			}),
		}
	}

	/// A wallet whose chain sits at `head` and never advances.
	pub fn at_head(head: u64) -> Self {
		Self::new(MockWalletConfig {
			head,
			blocks_per_poll: 0,
			..Default::default()
		})
	}

	pub fn with_receipt_at(mut self, block: u64) -> Self {
		self.chain.get_mut().receipt_block = Some(block);
		self
	}

	pub fn never_mined(mut self) -> Self {
		self.chain.get_mut().receipt_block = None;
		self
	}

	/// Reports the transaction as unknown for the first `polls` queries.
	pub fn mined_after(mut self, polls: u32) -> Self {
		self.chain.get_mut().pending_polls = polls;
		self
	}

	pub fn with_blocks_per_poll(mut self, blocks: u64) -> Self {
		self.chain.get_mut().blocks_per_poll = blocks;
		self
	}

	/// Every receipt query fails with a network error.
	pub fn failing_receipts(mut self) -> Self {
		self.chain.get_mut().fail_receipts = true;
		self
	}

	pub fn with_balance(mut self, token: &str, amount: &str) -> Self {
		self.chain
			.get_mut()
			.balances
			.insert(token.to_lowercase(), amount.to_string());
		self
	}

	/// Number of receipt queries served so far.
	pub async fn receipt_queries(&self) -> u32 {
		self.chain.lock().await.receipt_queries
	}
}

#[async_trait]
impl WalletInterface for MockWallet {
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
		let mut chain = self.chain.lock().await;
		chain.receipt_queries += 1;

		if chain.fail_receipts {
			return Err(WalletError::Network("mock receipt query failed".to_string()));
		}

		if chain.pending_polls > 0 {
			chain.pending_polls -= 1;
			return Ok(None);
		}

		Ok(chain.receipt_block.map(|block_number| TransactionReceipt {
			hash: hash.clone(),
			block_number,
			success: true,
		}))
	}

	async fn get_block_number(&self) -> Result<u64, WalletError> {
		let mut chain = self.chain.lock().await;
		let head = chain.head;
		chain.head += chain.blocks_per_poll;
		Ok(head)
	}

	async fn get_token_balance(&self, token: &str) -> Result<String, WalletError> {
		let chain = self.chain.lock().await;
		Ok(chain
			.balances
			.get(&token.to_lowercase())
			.unwrap_or(&chain.default_balance)
			.clone())
	}
}

/// Factory for `[wallet.implementations.mock]`.
pub fn create_wallet(config: &toml::Value) -> Result<Box<dyn WalletInterface>, WalletError> {
	let config: MockWalletConfig = config
		.clone()
		.try_into()
		.map_err(|e| WalletError::Configuration(format!("Invalid mock wallet config: {}", e)))?;

	Ok(Box::new(MockWallet::new(config)))
}

pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "mock";
	type Factory = WalletFactory;

	fn factory() -> Self::Factory {
		create_wallet
	}
}

impl WalletRegistry for Registry {}

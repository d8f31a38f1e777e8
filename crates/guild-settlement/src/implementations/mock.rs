//! Settlement with a scripted outcome, recording every descriptor it receives.

use crate::{SettlementError, SettlementFactory, SettlementInterface, SettlementRegistry};
use async_trait::async_trait;
use guild_types::{ImplementationRegistry, SettlementDescriptor, TransactionHash};
use guild_wallet::WalletInterface;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Deserialize)]
pub struct MockSettlementConfig {
	#[serde(default = "default_transaction_hash")]
	pub transaction_hash: String,
	/// When set, every settlement is rejected with this message.
	#[serde(default)]
	pub error: Option<String>,
	#[serde(default)]
	pub delay_ms: u64,
}

fn default_transaction_hash() -> String {
	format!("0x{}", "ab".repeat(32))
}

pub struct MockSettlement {
	outcome: Result<TransactionHash, SettlementError>,
	delay: Duration,
	received: Mutex<Vec<SettlementDescriptor>>,
}

impl MockSettlement {
	pub fn returning(hash: impl Into<TransactionHash>) -> Self {
		Self {
			outcome: Ok(hash.into()),
			delay: Duration::ZERO,
			received: Mutex::new(Vec::new()),
		}
	}

	/// Settles "successfully" without an identifier.
	pub fn empty() -> Self {
		Self::returning("")
	}

	pub fn failing(error: SettlementError) -> Self {
		Self {
			outcome: Err(error),
			delay: Duration::ZERO,
			received: Mutex::new(Vec::new()),
		}
	}

	pub fn with_delay(mut self, delay: Duration) -> Self {
		self.delay = delay;
		self
	}

	/// Descriptors passed to `settle`, oldest first.
	pub async fn received(&self) -> Vec<SettlementDescriptor> {
		self.received.lock().await.clone()
	}
}

#[async_trait]
impl SettlementInterface for MockSettlement {
	fn name(&self) -> &str {
		"mock"
	}

	async fn settle(
		&self,
		descriptor: &SettlementDescriptor,
		_wallet: &dyn WalletInterface,
	) -> Result<TransactionHash, SettlementError> {
		self.received.lock().await.push(descriptor.clone());

		if !self.delay.is_zero() {
			tokio::time::sleep(self.delay).await;
		}

		self.outcome.clone()
	}
}

/// Factory for `[settlement.implementations.mock]`.
pub fn create_settlement(
	config: &toml::Value,
) -> Result<Box<dyn SettlementInterface>, SettlementError> {
	let config: MockSettlementConfig = config.clone().try_into().map_err(|e| {
		SettlementError::Configuration(format!("Invalid mock settlement config: {}", e))
	})?;

	let settlement = match config.error {
		Some(message) => MockSettlement::failing(SettlementError::rejected(message)),
		None => MockSettlement::returning(config.transaction_hash),
	};

	Ok(Box::new(
		settlement.with_delay(Duration::from_millis(config.delay_ms)),
	))
}

pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "mock";
	type Factory = SettlementFactory;

	fn factory() -> Self::Factory {
		create_settlement
	}
}

impl SettlementRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;
	use guild_wallet::implementations::mock::MockWallet;
	use std::collections::BTreeMap;

	fn descriptor() -> SettlementDescriptor {
		SettlementDescriptor {
			to: "0x1234567890123456789012345678901234567890".into(),
			amount: "1".into(),
			token: "0xtoken".into(),
			description: "test".into(),
			metadata: BTreeMap::new(),
			chain_id: 1,
		}
	}

	#[tokio::test]
	async fn test_records_descriptors() {
		let settlement = MockSettlement::returning("0xfeed");
		let wallet = MockWallet::at_head(1);

		let hash = settlement.settle(&descriptor(), &wallet).await.unwrap();
		assert_eq!(hash.as_str(), "0xfeed");
		assert_eq!(settlement.received().await, vec![descriptor()]);
	}

	#[tokio::test]
	async fn test_factory_error_outcome() {
		let mut table = toml::map::Map::new();
		table.insert("error".into(), toml::Value::String("User rejected".into()));
		let settlement = create_settlement(&toml::Value::Table(table)).unwrap();
		let wallet = MockWallet::at_head(1);

		let error = settlement.settle(&descriptor(), &wallet).await.unwrap_err();
		assert_eq!(error.user_message(), "User rejected");
	}

	#[tokio::test]
	async fn test_factory_default_hash() {
		let settlement = create_settlement(&toml::Value::Table(toml::map::Map::new())).unwrap();
		let wallet = MockWallet::at_head(1);

		let hash = settlement.settle(&descriptor(), &wallet).await.unwrap();
		assert_eq!(hash.as_str().len(), 66);
	}
}

//! Simulated settlement.
//!
//! Nothing is sent anywhere: after a fixed delay the settlement answers with
//! a random 32-byte transaction identifier. Confirmation counting against a
//! real chain will therefore never find a receipt for it.

use crate::{SettlementError, SettlementFactory, SettlementInterface, SettlementRegistry};
use async_trait::async_trait;
use guild_types::{
	truncate_id, with_0x_prefix, ImplementationRegistry, SettlementDescriptor, TransactionHash,
};
use guild_wallet::WalletInterface;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct SimulatedSettlementConfig {
	/// Time spent "processing" before the identifier is returned.
	#[serde(default = "default_delay_ms")]
	pub delay_ms: u64,
}

fn default_delay_ms() -> u64 {
	2000
}

impl Default for SimulatedSettlementConfig {
	fn default() -> Self {
		Self {
			delay_ms: default_delay_ms(),
		}
	}
}

pub struct SimulatedSettlement {
	delay: Duration,
}

impl SimulatedSettlement {
	pub fn new(config: SimulatedSettlementConfig) -> Self {
		Self {
			delay: Duration::from_millis(config.delay_ms),
		}
	}
}

/// Random `0x`-prefixed identifier of 64 hex digits.
pub fn random_transaction_hash() -> TransactionHash {
	let bytes: [u8; 32] = rand::random();
	TransactionHash::new(with_0x_prefix(&hex::encode(bytes)))
}

#[async_trait]
impl SettlementInterface for SimulatedSettlement {
	fn name(&self) -> &str {
		"simulated"
	}

	async fn settle(
		&self,
		descriptor: &SettlementDescriptor,
		wallet: &dyn WalletInterface,
	) -> Result<TransactionHash, SettlementError> {
		tracing::info!(
			from = %wallet.address(),
			to = %descriptor.to,
			amount = %descriptor.amount,
			token = %descriptor.token,
			chain_id = descriptor.chain_id,
			description = %descriptor.description,
			"Simulating settlement"
		);

		tokio::time::sleep(self.delay).await;

		let hash = random_transaction_hash();
		tracing::debug!(tx_hash = %truncate_id(hash.as_str()), "Simulated settlement complete");
		Ok(hash)
	}
}

/// Factory for `[settlement.implementations.simulated]`.
pub fn create_settlement(
	config: &toml::Value,
) -> Result<Box<dyn SettlementInterface>, SettlementError> {
	let config: SimulatedSettlementConfig = config.clone().try_into().map_err(|e| {
		SettlementError::Configuration(format!("Invalid simulated settlement config: {}", e))
	})?;

	Ok(Box::new(SimulatedSettlement::new(config)))
}

pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "simulated";
	type Factory = SettlementFactory;

	fn factory() -> Self::Factory {
		create_settlement
	}
}

impl SettlementRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;
	use guild_types::{BASE_CHAIN_ID, DEFAULT_PAYMENT_DESCRIPTION, USDC_BASE_ADDRESS};
	use guild_wallet::implementations::mock::MockWallet;
	use std::collections::BTreeMap;

	fn descriptor() -> SettlementDescriptor {
		SettlementDescriptor {
			to: "0x1234567890123456789012345678901234567890".into(),
			amount: "1500000".into(),
			token: USDC_BASE_ADDRESS.into(),
			description: DEFAULT_PAYMENT_DESCRIPTION.into(),
			metadata: BTreeMap::new(),
			chain_id: BASE_CHAIN_ID,
		}
	}

	#[test]
	fn test_random_hash_shape() {
		let hash = random_transaction_hash();
		assert_eq!(hash.as_str().len(), 66);
		assert!(hash.as_str().starts_with("0x"));
		assert!(hash.as_str()[2..].chars().all(|c| c.is_ascii_hexdigit()));
		assert_ne!(hash, random_transaction_hash());
	}

	#[tokio::test(start_paused = true)]
	async fn test_settle_waits_for_delay() {
		let settlement = SimulatedSettlement::new(SimulatedSettlementConfig::default());
		let wallet = MockWallet::at_head(1);

		let start = tokio::time::Instant::now();
		let hash = settlement.settle(&descriptor(), &wallet).await.unwrap();

		assert!(start.elapsed() >= Duration::from_millis(2000));
		assert!(!hash.is_empty());
	}

	#[test]
	fn test_factory_reads_delay() {
		let mut table = toml::map::Map::new();
		table.insert("delay_ms".into(), toml::Value::Integer(10));
		assert!(create_settlement(&toml::Value::Table(table)).is_ok());

		let mut bad = toml::map::Map::new();
		bad.insert("delay_ms".into(), toml::Value::String("soon".into()));
		assert!(matches!(
			create_settlement(&toml::Value::Table(bad)),
			Err(SettlementError::Configuration(_))
		));
	}
}

//! Builds a [`PaymentOrchestrator`] from configuration and factory functions.
//!
//! Only the `primary` implementation of each component is instantiated. A
//! missing `[wallet]` section yields a disconnected orchestrator.

use crate::orchestrator::PaymentOrchestrator;
use crate::state::PaymentStatusStore;
use guild_config::Config;
use guild_settlement::{SettlementError, SettlementInterface};
use guild_wallet::{WalletError, WalletInterface};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Missing required component: {0}")]
	MissingComponent(String),
}

/// Factory functions keyed by implementation name.
pub struct OrchestratorFactories<WF, SF> {
	pub wallet_factories: HashMap<String, WF>,
	pub settlement_factories: HashMap<String, SF>,
}

pub struct OrchestratorBuilder {
	config: Config,
	status: Option<Arc<PaymentStatusStore>>,
}

impl OrchestratorBuilder {
	pub fn new(config: Config) -> Self {
		Self {
			config,
			status: None,
		}
	}

	/// Shares an existing status store instead of creating a fresh one.
	pub fn with_status(mut self, status: Arc<PaymentStatusStore>) -> Self {
		self.status = Some(status);
		self
	}

	pub fn build<WF, SF>(
		self,
		factories: OrchestratorFactories<WF, SF>,
	) -> Result<PaymentOrchestrator, BuilderError>
	where
		WF: Fn(&toml::Value) -> Result<Box<dyn WalletInterface>, WalletError>,
		SF: Fn(&toml::Value) -> Result<Box<dyn SettlementInterface>, SettlementError>,
	{
		let settlement_config = &self.config.settlement;
		let primary_settlement = &settlement_config.primary;
		let settlement_table = settlement_config.primary_config().ok_or_else(|| {
			BuilderError::MissingComponent(format!(
				"settlement implementation '{}'",
				primary_settlement
			))
		})?;
		let settlement_factory = factories
			.settlement_factories
			.get(primary_settlement)
			.ok_or_else(|| {
				BuilderError::Config(format!(
					"Unknown settlement implementation '{}'",
					primary_settlement
				))
			})?;

		let settlement: Arc<dyn SettlementInterface> = match settlement_factory(settlement_table) {
			Ok(settlement) => {
				tracing::info!(component = "settlement", implementation = %primary_settlement, "Loaded");
				Arc::from(settlement)
			},
			Err(e) => {
				tracing::error!(
					component = "settlement",
					implementation = %primary_settlement,
					error = %e,
					"Failed to create settlement implementation"
				);
				return Err(BuilderError::Config(format!(
					"Failed to create settlement implementation '{}': {}",
					primary_settlement, e
				)));
			},
		};

		let status = self
			.status
			.unwrap_or_else(|| Arc::new(PaymentStatusStore::new()));
		let orchestrator =
			PaymentOrchestrator::new(self.config.payment.clone(), settlement, status);

		let Some(wallet_config) = &self.config.wallet else {
			tracing::info!(component = "wallet", "No wallet configured, payments are disabled");
			return Ok(orchestrator);
		};

		let primary_wallet = &wallet_config.primary;
		let wallet_table = wallet_config.primary_config().ok_or_else(|| {
			BuilderError::MissingComponent(format!("wallet implementation '{}'", primary_wallet))
		})?;
		let wallet_factory = factories
			.wallet_factories
			.get(primary_wallet)
			.ok_or_else(|| {
				BuilderError::Config(format!(
					"Unknown wallet implementation '{}'",
					primary_wallet
				))
			})?;

		let wallet: Arc<dyn WalletInterface> = match wallet_factory(wallet_table) {
			Ok(wallet) => {
				tracing::info!(
					component = "wallet",
					implementation = %primary_wallet,
					address = %wallet.address(),
					"Loaded"
				);
				Arc::from(wallet)
			},
			Err(e) => {
				tracing::error!(
					component = "wallet",
					implementation = %primary_wallet,
					error = %e,
					"Failed to create wallet implementation"
				);
				return Err(BuilderError::Config(format!(
					"Failed to create wallet implementation '{}': {}",
					primary_wallet, e
				)));
			},
		};

		if wallet.chain_id() != self.config.payment.chain_id {
			tracing::warn!(
				wallet_chain = wallet.chain_id(),
				payment_chain = self.config.payment.chain_id,
				"Wallet chain differs from payment chain"
			);
		}

		Ok(orchestrator.with_wallet(wallet))
	}
}

//! Registry of every wallet and settlement implementation the binary knows.
//!
//! Configuration refers to implementations by name; this module maps those
//! names to factory functions and hands them to the orchestrator builder.

use guild_config::Config;
use guild_core::{OrchestratorBuilder, OrchestratorFactories, PaymentOrchestrator};
use guild_settlement::SettlementFactory;
use guild_wallet::WalletFactory;
use std::collections::HashMap;
use std::sync::OnceLock;

pub struct FactoryRegistry {
	pub wallet: HashMap<String, WalletFactory>,
	pub settlement: HashMap<String, SettlementFactory>,
}

impl FactoryRegistry {
	pub fn new() -> Self {
		Self {
			wallet: HashMap::new(),
			settlement: HashMap::new(),
		}
	}

	pub fn register_wallet(&mut self, name: impl Into<String>, factory: WalletFactory) {
		self.wallet.insert(name.into(), factory);
	}

	pub fn register_settlement(&mut self, name: impl Into<String>, factory: SettlementFactory) {
		self.settlement.insert(name.into(), factory);
	}
}

impl Default for FactoryRegistry {
	fn default() -> Self {
		Self::new()
	}
}

static REGISTRY: OnceLock<FactoryRegistry> = OnceLock::new();

/// Returns the process-wide registry, filling it on first use.
pub fn get_registry() -> &'static FactoryRegistry {
	REGISTRY.get_or_init(|| {
		let mut registry = FactoryRegistry::new();

		for (name, factory) in guild_wallet::get_all_implementations() {
			tracing::debug!("Registering wallet implementation: {}", name);
			registry.register_wallet(name, factory);
		}

		for (name, factory) in guild_settlement::get_all_implementations() {
			tracing::debug!("Registering settlement implementation: {}", name);
			registry.register_settlement(name, factory);
		}

		registry
	})
}

/// Collects the factories named in a config section, failing on unknown names.
macro_rules! build_factories {
	($registry:expr, $config_impls:expr, $registry_field:ident, $type_name:literal) => {{
		let mut factories = HashMap::new();
		for name in $config_impls.keys() {
			if let Some(factory) = $registry.$registry_field.get(name) {
				factories.insert(name.clone(), *factory);
			} else {
				let mut available: Vec<_> = $registry.$registry_field.keys().cloned().collect();
				available.sort();
				return Err(format!(
					"Unknown {} implementation '{}'. Available: [{}]",
					$type_name,
					name,
					available.join(", ")
				)
				.into());
			}
		}
		factories
	}};
}

/// Builds the orchestrator described by `config`.
pub fn build_orchestrator_from_config(
	config: &Config,
) -> Result<PaymentOrchestrator, Box<dyn std::error::Error>> {
	let registry = get_registry();

	let wallet_factories = match &config.wallet {
		Some(wallet) => build_factories!(registry, wallet.implementations, wallet, "wallet"),
		None => HashMap::new(),
	};
	let settlement_factories = build_factories!(
		registry,
		config.settlement.implementations,
		settlement,
		"settlement"
	);

	let factories = OrchestratorFactories {
		wallet_factories,
		settlement_factories,
	};

	Ok(OrchestratorBuilder::new(config.clone()).build(factories)?)
}

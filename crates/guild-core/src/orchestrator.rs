//! The payment request lifecycle: validate, settle, wait for confirmations.

use crate::monitoring::ConfirmationMonitor;
use crate::state::PaymentStatusStore;
use crate::PaymentError;
use guild_config::PaymentConfig;
use guild_settlement::SettlementInterface;
use guild_types::{
	format_token_amount, to_base_units, truncate_id, PaymentRequest, PaymentRequestError,
	PaymentResult, SettlementDescriptor, TransactionHash,
};
use guild_wallet::WalletInterface;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

pub struct PaymentOrchestrator {
	config: PaymentConfig,
	wallet: Option<Arc<dyn WalletInterface>>,
	settlement: Arc<dyn SettlementInterface>,
	status: Arc<PaymentStatusStore>,
}

impl PaymentOrchestrator {
	/// Creates an orchestrator with no wallet attached.
	pub fn new(
		config: PaymentConfig,
		settlement: Arc<dyn SettlementInterface>,
		status: Arc<PaymentStatusStore>,
	) -> Self {
		Self {
			config,
			wallet: None,
			settlement,
			status,
		}
	}

	pub fn with_wallet(mut self, wallet: Arc<dyn WalletInterface>) -> Self {
		self.wallet = Some(wallet);
		self
	}

	pub fn is_connected(&self) -> bool {
		self.wallet.is_some()
	}

	pub fn status(&self) -> Arc<PaymentStatusStore> {
		self.status.clone()
	}

	/// First problem with `request`, if any.
	pub fn validate(&self, request: &PaymentRequest) -> Option<PaymentRequestError> {
		request.validate().err()
	}

	/// Runs one payment to completion and returns its result.
	///
	/// Refusals before settlement (no wallet, invalid request, a payment
	/// already in flight) never enter the loading state. A confirmation wait
	/// that times out still yields a successful result.
	#[instrument(skip_all, fields(recipient = %truncate_id(&request.recipient), amount = %request.amount))]
	pub async fn submit(&self, request: &PaymentRequest) -> PaymentResult {
		let Some(wallet) = self.wallet.clone() else {
			return self.reject(PaymentError::NotConnected).await;
		};

		let descriptor = match self.build_descriptor(request) {
			Ok(descriptor) => descriptor,
			Err(e) => return self.reject(e).await,
		};

		if let Err(e) = self.status.begin().await {
			tracing::warn!("Submission refused, another payment is in flight");
			return PaymentResult::failed(e.to_string());
		}

		let result = self.settle_and_confirm(&descriptor, wallet).await;
		self.status.finish(result.clone()).await;
		result
	}

	/// Waits up to `max_wait` and returns the confirmations observed.
	///
	/// Without a wallet there is nothing to poll and the count is 0.
	pub async fn await_confirmation(&self, hash: &TransactionHash, max_wait: Duration) -> u64 {
		match self.confirmation_monitor() {
			Some(monitor) => monitor.wait(hash, max_wait).await.confirmations,
			None => {
				tracing::warn!("No wallet to poll for confirmations");
				0
			},
		}
	}

	/// Monitor bound to the connected wallet, for callers that need the
	/// full outcome or cancellation.
	pub fn confirmation_monitor(&self) -> Option<ConfirmationMonitor> {
		self.wallet.as_ref().map(|wallet| {
			ConfirmationMonitor::new(
				wallet.clone(),
				self.config.poll_interval(),
				self.config.min_confirmations,
			)
		})
	}

	/// Connected account's balance of the payment token, human readable.
	pub async fn usdc_balance(&self) -> Option<String> {
		let wallet = self.wallet.as_ref()?;

		match wallet.get_token_balance(&self.config.token_address).await {
			Ok(raw) => {
				let formatted = format_token_amount(&raw, self.config.token_decimals);
				if formatted.is_none() {
					tracing::warn!(raw = %raw, "Wallet returned an unreadable balance");
				}
				formatted
			},
			Err(e) => {
				tracing::warn!(error = %e, "Failed to fetch token balance");
				None
			},
		}
	}

	async fn reject(&self, error: PaymentError) -> PaymentResult {
		let message = error.to_string();
		tracing::info!(error = %message, "Payment rejected");
		self.status.reject(message.clone()).await;
		PaymentResult::failed(message)
	}

	fn build_descriptor(&self, request: &PaymentRequest) -> Result<SettlementDescriptor, PaymentError> {
		request.validate()?;

		let amount = to_base_units(&request.amount, self.config.token_decimals).map_err(|e| {
			tracing::debug!(error = %e, "Amount not representable in base units");
			PaymentError::Validation(PaymentRequestError::InvalidAmount)
		})?;

		Ok(SettlementDescriptor {
			to: request.recipient.clone(),
			amount,
			token: self.config.token_address.clone(),
			description: request
				.description
				.clone()
				.unwrap_or_else(|| self.config.default_description.clone()),
			metadata: request.metadata.clone().unwrap_or_default(),
			chain_id: self.config.chain_id,
		})
	}

	async fn settle_and_confirm(
		&self,
		descriptor: &SettlementDescriptor,
		wallet: Arc<dyn WalletInterface>,
	) -> PaymentResult {
		tracing::info!(
			settlement = self.settlement.name(),
			base_units = %descriptor.amount,
			"Submitting payment"
		);

		let hash = match self.settlement.settle(descriptor, wallet.as_ref()).await {
			Ok(hash) if hash.is_empty() => {
				tracing::error!("Settlement returned no transaction hash");
				return PaymentResult::failed(PaymentError::MissingTransactionHash.to_string());
			},
			Ok(hash) => hash,
			Err(e) => {
				let message = e.user_message();
				tracing::error!(error = %e, "Settlement failed");
				return PaymentResult::failed(PaymentError::Settlement(message).to_string());
			},
		};

		tracing::info!(tx_hash = %truncate_id(hash.as_str()), "Settlement submitted");

		let monitor = ConfirmationMonitor::new(
			wallet,
			self.config.poll_interval(),
			self.config.min_confirmations,
		);
		let outcome = monitor
			.wait(&hash, self.config.confirmation_timeout())
			.await;

		PaymentResult::succeeded(hash.as_str(), outcome.confirmations)
	}
}

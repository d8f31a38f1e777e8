//! Timed polling for transaction confirmations.
//!
//! Polls the wallet for a receipt and the chain head until enough blocks sit
//! on top of the transaction, the wait window closes, or the caller cancels.
//! Wallet failures while polling count as "not yet available".

use guild_types::{truncate_id, TransactionHash};
use guild_wallet::WalletInterface;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::instrument;

/// How a confirmation wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationStatus {
	/// At least the required number of confirmations was observed.
	Confirmed,
	/// The wait window closed first.
	TimedOut,
	/// The cancellation signal fired first.
	Cancelled,
}

/// Result of a confirmation wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationOutcome {
	/// Last observed confirmation count, 0 if no receipt was ever seen.
	pub confirmations: u64,
	pub status: ConfirmationStatus,
}

pub struct ConfirmationMonitor {
	wallet: Arc<dyn WalletInterface>,
	poll_interval: Duration,
	min_confirmations: u64,
}

impl ConfirmationMonitor {
	pub fn new(
		wallet: Arc<dyn WalletInterface>,
		poll_interval: Duration,
		min_confirmations: u64,
	) -> Self {
		Self {
			wallet,
			poll_interval,
			min_confirmations: min_confirmations.max(1),
		}
	}

	/// Waits up to `max_wait` for the transaction to be confirmed.
	pub async fn wait(&self, hash: &TransactionHash, max_wait: Duration) -> ConfirmationOutcome {
		let (_cancel_tx, cancel_rx) = watch::channel(false);
		self.wait_with_cancel(hash, max_wait, cancel_rx).await
	}

	/// Like [`Self::wait`], but returns early once `cancel` becomes `true`.
	///
	/// Dropping the sender leaves the wait running until its deadline.
	#[instrument(skip_all, fields(tx_hash = %truncate_id(hash.as_str())))]
	pub async fn wait_with_cancel(
		&self,
		hash: &TransactionHash,
		max_wait: Duration,
		mut cancel: watch::Receiver<bool>,
	) -> ConfirmationOutcome {
		// `None` when `max_wait` is too large to represent; the wait is then unbounded.
		let deadline = Instant::now().checked_add(max_wait);
		let mut confirmations = 0;

		loop {
			if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
				tracing::warn!(
					confirmations,
					max_wait_secs = max_wait.as_secs(),
					"Confirmation wait timed out"
				);
				return ConfirmationOutcome {
					confirmations,
					status: ConfirmationStatus::TimedOut,
				};
			}

			if let Some(observed) = self.poll(hash).await {
				confirmations = observed;
				if confirmations >= self.min_confirmations {
					tracing::info!(confirmations, "Transaction confirmed");
					return ConfirmationOutcome {
						confirmations,
						status: ConfirmationStatus::Confirmed,
					};
				}
			}

			tokio::select! {
				_ = tokio::time::sleep(self.poll_interval) => {},
				_ = cancelled(&mut cancel) => {
					tracing::info!(confirmations, "Confirmation wait cancelled");
					return ConfirmationOutcome {
						confirmations,
						status: ConfirmationStatus::Cancelled,
					};
				},
			}
		}
	}

	/// One receipt and head query; `None` when either is unavailable.
	async fn poll(&self, hash: &TransactionHash) -> Option<u64> {
		let receipt = match self.wallet.get_receipt(hash).await {
			Ok(Some(receipt)) => receipt,
			Ok(None) => {
				tracing::debug!("Waiting for transaction to be mined");
				return None;
			},
			Err(e) => {
				tracing::warn!(error = %e, "Receipt query failed");
				return None;
			},
		};

		match self.wallet.get_block_number().await {
			Ok(head) => {
				let confirmations = receipt.confirmations_at(head);
				tracing::debug!(
					block = receipt.block_number,
					head,
					confirmations,
					"Checked confirmations"
				);
				Some(confirmations)
			},
			Err(e) => {
				tracing::warn!(error = %e, "Block number query failed");
				None
			},
		}
	}
}

/// Resolves once the flag is set; never resolves if the sender is gone.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
	let closed = cancel.wait_for(|flag| *flag).await.is_err();
	if closed {
		std::future::pending::<()>().await;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use guild_wallet::implementations::mock::MockWallet;

	fn monitor(wallet: MockWallet, min_confirmations: u64) -> ConfirmationMonitor {
		ConfirmationMonitor::new(
			Arc::new(wallet),
			Duration::from_secs(2),
			min_confirmations,
		)
	}

	fn hash() -> TransactionHash {
		TransactionHash::from("0x1111111111111111111111111111111111111111111111111111111111111111")
	}

	#[tokio::test(start_paused = true)]
	async fn test_confirms_from_receipt_and_head() {
		let monitor = monitor(MockWallet::at_head(102).with_receipt_at(100), 1);
		let start = Instant::now();

		let outcome = monitor.wait(&hash(), Duration::from_secs(60)).await;

		assert_eq!(
			outcome,
			ConfirmationOutcome {
				confirmations: 2,
				status: ConfirmationStatus::Confirmed,
			}
		);
		assert!(start.elapsed() < Duration::from_secs(60));
	}

	#[tokio::test(start_paused = true)]
	async fn test_times_out_without_receipt() {
		let monitor = monitor(MockWallet::at_head(100).never_mined(), 1);
		let start = Instant::now();

		let outcome = monitor.wait(&hash(), Duration::from_secs(60)).await;

		assert_eq!(outcome.confirmations, 0);
		assert_eq!(outcome.status, ConfirmationStatus::TimedOut);
		assert!(start.elapsed() >= Duration::from_secs(60));
	}

	#[tokio::test(start_paused = true)]
	async fn test_unbounded_wait_still_confirms() {
		let wallet = MockWallet::at_head(100)
			.with_receipt_at(100)
			.with_blocks_per_poll(1)
			.mined_after(3);
		let monitor = monitor(wallet, 2);

		let outcome = monitor.wait(&hash(), Duration::MAX).await;

		assert_eq!(outcome.status, ConfirmationStatus::Confirmed);
		assert_eq!(outcome.confirmations, 2);
	}

	#[tokio::test(start_paused = true)]
	async fn test_waits_for_head_to_advance() {
		let wallet = MockWallet::at_head(100)
			.with_receipt_at(100)
			.with_blocks_per_poll(1)
			.mined_after(2);
		let monitor = monitor(wallet, 1);

		let outcome = monitor.wait(&hash(), Duration::from_secs(60)).await;

		assert_eq!(outcome.status, ConfirmationStatus::Confirmed);
		assert_eq!(outcome.confirmations, 1);
	}

	#[tokio::test(start_paused = true)]
	async fn test_wallet_errors_are_not_fatal() {
		let wallet = Arc::new(MockWallet::at_head(100).failing_receipts());
		let monitor = ConfirmationMonitor::new(wallet.clone(), Duration::from_secs(2), 1);

		let outcome = monitor.wait(&hash(), Duration::from_secs(10)).await;

		assert_eq!(outcome.status, ConfirmationStatus::TimedOut);
		assert_eq!(outcome.confirmations, 0);
		assert_eq!(wallet.receipt_queries().await, 5);
	}

	#[tokio::test(start_paused = true)]
	async fn test_cancel_keeps_last_count() {
		let monitor = monitor(MockWallet::at_head(101).with_receipt_at(100), 3);
		let (cancel_tx, cancel_rx) = watch::channel(false);

		tokio::spawn(async move {
			tokio::time::sleep(Duration::from_secs(5)).await;
			let _ = cancel_tx.send(true);
		});

		let outcome = monitor
			.wait_with_cancel(&hash(), Duration::from_secs(60), cancel_rx)
			.await;

		assert_eq!(
			outcome,
			ConfirmationOutcome {
				confirmations: 1,
				status: ConfirmationStatus::Cancelled,
			}
		);
	}

	#[tokio::test(start_paused = true)]
	async fn test_dropped_sender_runs_to_deadline() {
		let monitor = monitor(MockWallet::at_head(100).never_mined(), 1);
		let (cancel_tx, cancel_rx) = watch::channel(false);
		drop(cancel_tx);

		let outcome = monitor
			.wait_with_cancel(&hash(), Duration::from_secs(6), cancel_rx)
			.await;

		assert_eq!(outcome.status, ConfirmationStatus::TimedOut);
	}
}

//! Caller-owned store for [`PaymentStatus`].

use crate::PaymentError;
use guild_types::{PaymentEvent, PaymentResult, PaymentStatus};
use tokio::sync::RwLock;

/// Shared payment status, normally held as `Arc<PaymentStatusStore>`.
#[derive(Debug, Default)]
pub struct PaymentStatusStore {
	status: RwLock<PaymentStatus>,
}

impl PaymentStatusStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Copy of the current status.
	pub async fn snapshot(&self) -> PaymentStatus {
		self.status.read().await.clone()
	}

	/// Applies `event` under the write lock and returns the new status.
	pub async fn apply(&self, event: &PaymentEvent) -> PaymentStatus {
		let mut status = self.status.write().await;
		*status = status.apply(event);
		status.clone()
	}

	/// Records an error for a request that never started.
	pub async fn reject(&self, error: impl Into<String>) -> PaymentStatus {
		self.apply(&PaymentEvent::Rejected {
			error: error.into(),
		})
		.await
	}

	/// Enters the loading state, unless a submission is already in flight.
	pub async fn begin(&self) -> Result<(), PaymentError> {
		let mut status = self.status.write().await;
		if status.is_loading {
			return Err(PaymentError::AlreadyInProgress);
		}
		*status = status.apply(&PaymentEvent::Started);
		Ok(())
	}

	/// Leaves the loading state with `result` as the last payment.
	pub async fn finish(&self, result: PaymentResult) -> PaymentStatus {
		self.apply(&PaymentEvent::Finished(result)).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_lifecycle() {
		let store = PaymentStatusStore::new();
		assert_eq!(store.snapshot().await, PaymentStatus::default());

		store.reject("Invalid amount").await;
		assert_eq!(store.snapshot().await.error.as_deref(), Some("Invalid amount"));

		store.begin().await.unwrap();
		let status = store.snapshot().await;
		assert!(status.is_loading);
		assert!(status.error.is_none());

		let status = store.finish(PaymentResult::succeeded("0xabc", 3)).await;
		assert!(!status.is_loading);
		assert!(status.error.is_none());
		assert_eq!(
			status.last_payment,
			Some(PaymentResult::succeeded("0xabc", 3))
		);
	}

	#[tokio::test]
	async fn test_begin_twice_is_rejected() {
		let store = PaymentStatusStore::new();
		store.begin().await.unwrap();

		assert!(matches!(
			store.begin().await,
			Err(PaymentError::AlreadyInProgress)
		));
		assert!(store.snapshot().await.is_loading);

		store.finish(PaymentResult::failed("Payment failed")).await;
		assert!(store.begin().await.is_ok());
	}
}

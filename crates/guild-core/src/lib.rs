//! Payment orchestration for the guild payment system.
//!
//! The orchestrator validates a payment request, forwards it to the settlement
//! step on behalf of the connected wallet, and then waits a bounded time for
//! confirmations. Every call ends with exactly one [`guild_types::PaymentResult`]
//! and the matching status transitions on a caller-owned
//! [`state::PaymentStatusStore`].

use guild_types::PaymentRequestError;
use thiserror::Error;

pub mod builder;
pub mod monitoring;
pub mod orchestrator;
pub mod state;

pub use builder::{BuilderError, OrchestratorBuilder, OrchestratorFactories};
pub use monitoring::{ConfirmationMonitor, ConfirmationOutcome, ConfirmationStatus};
pub use orchestrator::PaymentOrchestrator;
pub use state::PaymentStatusStore;

/// Reasons a payment ends without a transaction.
///
/// The display text is what ends up in `PaymentResult::error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
	#[error("Wallet not connected")]
	NotConnected,
	#[error(transparent)]
	Validation(#[from] PaymentRequestError),
	#[error("Payment already in progress")]
	AlreadyInProgress,
	/// Settlement reported success without an identifier.
	#[error("No transaction hash received")]
	MissingTransactionHash,
	/// Settlement failed; carries the extracted user-facing message.
	#[error("{0}")]
	Settlement(String),
}

//! Confirmation tracking for settled payments.

pub mod confirmation;

pub use confirmation::{ConfirmationMonitor, ConfirmationOutcome, ConfirmationStatus};

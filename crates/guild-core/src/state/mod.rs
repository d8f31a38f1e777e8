//! Payment status bookkeeping.
//!
//! Transitions are computed by the pure [`guild_types::PaymentStatus::apply`];
//! this module only owns the shared copy and applies them atomically.

pub mod payment;

pub use payment::PaymentStatusStore;

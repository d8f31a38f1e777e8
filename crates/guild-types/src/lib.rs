//! Common types for the guild payment system.
//!
//! Shared data types used by the wallet, settlement, content and orchestration
//! crates, kept in one place so every component agrees on their shape.

/// Payment request, result and status types.
pub mod payment;
/// Registry trait for configuration-selected implementations.
pub mod registry;
/// Redacting wrapper for API keys and other secrets.
pub mod secret_string;
/// Settlement descriptor handed to settlement implementations.
pub mod settlement;
/// Transaction hash and receipt types.
pub mod transaction;
/// Amount conversion and string formatting helpers.
pub mod utils;

pub use payment::*;
pub use registry::ImplementationRegistry;
pub use secret_string::SecretString;
pub use settlement::SettlementDescriptor;
pub use transaction::*;
pub use utils::{
	format_token_amount, to_base_units, truncate_id, with_0x_prefix, AmountError,
	BASE_CHAIN_ID, DEFAULT_PAYMENT_DESCRIPTION, USDC_BASE_ADDRESS, USDC_DECIMALS,
};

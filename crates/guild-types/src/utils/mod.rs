//! Amount conversion and string helpers used across the payment crates.

pub mod constants;
pub mod conversion;
pub mod formatting;

pub use constants::{BASE_CHAIN_ID, DEFAULT_PAYMENT_DESCRIPTION, USDC_BASE_ADDRESS, USDC_DECIMALS};
pub use conversion::{format_token_amount, to_base_units, AmountError};
pub use formatting::{truncate_id, with_0x_prefix};

//! Fixed payment parameters for USDC on Base.

/// USDC token contract on Base mainnet.
pub const USDC_BASE_ADDRESS: &str = "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913";

/// Fractional digits of USDC.
pub const USDC_DECIMALS: u32 = 6;

/// Base mainnet chain id.
pub const BASE_CHAIN_ID: u64 = 8453;

/// Description used when a request carries none.
pub const DEFAULT_PAYMENT_DESCRIPTION: &str = "Payment via Gigs & Gains Guild";

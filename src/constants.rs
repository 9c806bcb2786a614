//! Constants and defaults for the mint SDK

use alloy::primitives::{Address, U256};
use std::time::Duration;

/// Sentinel address used for the native currency (ETH and friends)
pub const NATIVE_CURRENCY: Address = Address::ZERO;

/// Native currency decimals on every supported EVM network
pub const NATIVE_DECIMALS: u8 = 18;

/// Default gas buffer multiplier, as a percentage of the raw estimate (120 = +20%)
pub const DEFAULT_GAS_MULTIPLIER: u32 = 120;

/// Gas limit for a step that cannot be estimated until an earlier step of its plan
/// lands (a token mint behind its approval), used when no fallback gas is configured
pub const DEFAULT_DEPENDENT_STEP_GAS: u64 = 250_000;

/// Default per-call timeout for read endpoints
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(10);

/// Poll interval while confirming a network switch
pub const DEFAULT_SWITCH_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Maximum `chain_id` polls after requesting a network switch
pub const DEFAULT_SWITCH_MAX_ATTEMPTS: u32 = 20;

/// How long to wait for a submitted transaction to reach the requested confirmations
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(180);

/// Receipt poll interval
pub const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Token metadata cache lifetime
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Log subscription poll interval
pub const DEFAULT_SUBSCRIPTION_POLL_INTERVAL: Duration = Duration::from_secs(4);

/// Maximum units per purchase accepted by the claim extensions (uint16 mint count)
pub const MAX_MINT_QUANTITY: u32 = u16::MAX as u32;

/// Unscale a U256 value to floating point with specified decimals
pub fn unscale_from_decimals(value: U256, decimals: u8) -> f64 {
    let divisor = 10f64.powi(decimals as i32);
    let value_u128: u128 = value.try_into().unwrap_or(u128::MAX);
    value_u128 as f64 / divisor
}

/// One whole unit of a currency with `decimals` decimals
pub fn unit(decimals: u8) -> U256 {
    U256::from(10u64).pow(U256::from(decimals))
}

/// Current unix time in seconds
pub fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

//! Network and engine configuration for the mint SDK

use crate::constants::{
    DEFAULT_CACHE_TTL, DEFAULT_CONFIRMATION_TIMEOUT, DEFAULT_GAS_MULTIPLIER, DEFAULT_RPC_TIMEOUT,
    DEFAULT_SUBSCRIPTION_POLL_INTERVAL, DEFAULT_SWITCH_MAX_ATTEMPTS,
    DEFAULT_SWITCH_POLL_INTERVAL, NATIVE_DECIMALS,
};
use crate::error::{MintError, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

/// A network definition: chain identity, native currency and read endpoints
#[derive(Debug, Clone, Serialize)]
pub struct NetworkConfig {
    /// Chain ID (e.g. 8453 for Base)
    pub chain_id: u64,
    /// Display name, also used when asking a wallet to add the network
    pub name: String,
    /// Native currency symbol
    pub native_symbol: String,
    pub native_decimals: u8,
    /// Primary RPC endpoints, tried in declared order
    pub rpc_urls: Vec<String>,
    /// Fallback RPC endpoints, tried after every primary endpoint
    pub fallback_rpc_urls: Vec<String>,
    pub block_explorer: Option<String>,
}

impl NetworkConfig {
    pub fn new(chain_id: u64, name: impl Into<String>, native_symbol: impl Into<String>) -> Self {
        Self {
            chain_id,
            name: name.into(),
            native_symbol: native_symbol.into(),
            native_decimals: NATIVE_DECIMALS,
            rpc_urls: Vec::new(),
            fallback_rpc_urls: Vec::new(),
            block_explorer: None,
        }
    }

    /// Ethereum mainnet
    pub fn mainnet() -> Self {
        Self::new(1, "Ethereum", "ETH")
            .with_rpc_url("https://eth.llamarpc.com")
            .with_fallback_rpc_url("https://ethereum-rpc.publicnode.com")
            .with_block_explorer("https://etherscan.io")
    }

    /// Base mainnet
    pub fn base() -> Self {
        Self::new(8453, "Base", "ETH")
            .with_rpc_url("https://mainnet.base.org")
            .with_fallback_rpc_url("https://base-rpc.publicnode.com")
            .with_block_explorer("https://basescan.org")
    }

    /// OP mainnet
    pub fn optimism() -> Self {
        Self::new(10, "OP Mainnet", "ETH")
            .with_rpc_url("https://mainnet.optimism.io")
            .with_fallback_rpc_url("https://optimism-rpc.publicnode.com")
            .with_block_explorer("https://optimistic.etherscan.io")
    }

    /// Arbitrum One
    pub fn arbitrum() -> Self {
        Self::new(42161, "Arbitrum One", "ETH")
            .with_rpc_url("https://arb1.arbitrum.io/rpc")
            .with_fallback_rpc_url("https://arbitrum-one-rpc.publicnode.com")
            .with_block_explorer("https://arbiscan.io")
    }

    /// Shape mainnet
    pub fn shape() -> Self {
        Self::new(360, "Shape", "ETH")
            .with_rpc_url("https://mainnet.shape.network")
            .with_block_explorer("https://shapescan.xyz")
    }

    /// Sepolia testnet
    pub fn sepolia() -> Self {
        Self::new(11155111, "Sepolia", "ETH")
            .with_rpc_url("https://ethereum-sepolia-rpc.publicnode.com")
            .with_fallback_rpc_url("https://rpc.sepolia.org")
            .with_block_explorer("https://sepolia.etherscan.io")
    }

    /// Base Sepolia testnet
    pub fn base_sepolia() -> Self {
        Self::new(84532, "Base Sepolia", "ETH")
            .with_rpc_url("https://sepolia.base.org")
            .with_block_explorer("https://sepolia.basescan.org")
    }

    /// Replace the primary RPC endpoints with a single URL
    pub fn with_rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.rpc_urls = vec![rpc_url.into()];
        self
    }

    /// Append a fallback RPC endpoint
    pub fn with_fallback_rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.fallback_rpc_urls.push(rpc_url.into());
        self
    }

    pub fn with_block_explorer(mut self, url: impl Into<String>) -> Self {
        self.block_explorer = Some(url.into());
        self
    }

    /// All endpoints in try order: primaries first, then fallbacks
    pub fn endpoints(&self) -> impl Iterator<Item = &String> {
        self.rpc_urls.iter().chain(self.fallback_rpc_urls.iter())
    }
}

/// Gas headroom applied on top of raw estimates
///
/// `fixed` is added flat to the estimate and wins when both are set. `multiplier` is a
/// percentage of the estimate (`120` means the buffered limit is 1.2x the estimate).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GasBuffer {
    pub fixed: Option<u64>,
    pub multiplier: Option<u32>,
}

impl GasBuffer {
    pub fn fixed(amount: u64) -> Self {
        Self {
            fixed: Some(amount),
            multiplier: None,
        }
    }

    pub fn multiplier(percent: u32) -> Self {
        Self {
            fixed: None,
            multiplier: Some(percent),
        }
    }

    /// Buffered gas limit for a raw estimate
    pub fn apply(&self, estimate: u64) -> u64 {
        if let Some(fixed) = self.fixed {
            return estimate.saturating_add(fixed);
        }
        let percent = self.multiplier.unwrap_or(DEFAULT_GAS_MULTIPLIER) as u128;
        let buffered = estimate as u128 * percent / 100;
        u64::try_from(buffered).unwrap_or(u64::MAX)
    }
}

/// Engine-wide configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Provider registration table, keyed by chain id
    pub networks: HashMap<u64, NetworkConfig>,
    /// Buffer used when a purchase does not specify one
    pub gas_buffer: GasBuffer,
    /// Gas limit substituted when estimation fails (e.g. a mint that needs a pending approval)
    pub fallback_gas: Option<u64>,
    pub rpc_timeout: Duration,
    pub switch_poll_interval: Duration,
    pub switch_max_attempts: u32,
    pub confirmation_timeout: Duration,
    pub cache_ttl: Duration,
    pub subscription_poll_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(vec![
            NetworkConfig::mainnet(),
            NetworkConfig::base(),
            NetworkConfig::optimism(),
            NetworkConfig::arbitrum(),
            NetworkConfig::shape(),
            NetworkConfig::sepolia(),
            NetworkConfig::base_sepolia(),
        ])
    }
}

impl EngineConfig {
    /// Configuration with exactly the given networks
    pub fn new(networks: impl IntoIterator<Item = NetworkConfig>) -> Self {
        Self {
            networks: networks.into_iter().map(|n| (n.chain_id, n)).collect(),
            gas_buffer: GasBuffer::default(),
            fallback_gas: None,
            rpc_timeout: DEFAULT_RPC_TIMEOUT,
            switch_poll_interval: DEFAULT_SWITCH_POLL_INTERVAL,
            switch_max_attempts: DEFAULT_SWITCH_MAX_ATTEMPTS,
            confirmation_timeout: DEFAULT_CONFIRMATION_TIMEOUT,
            cache_ttl: DEFAULT_CACHE_TTL,
            subscription_poll_interval: DEFAULT_SUBSCRIPTION_POLL_INTERVAL,
        }
    }

    /// Defaults overridden by environment variables
    ///
    /// `MINT_SDK_RPC_<CHAIN_ID>` replaces the primary endpoints and
    /// `MINT_SDK_FALLBACK_RPC_<CHAIN_ID>` the fallbacks; both accept comma separated lists.
    /// `MINT_SDK_FALLBACK_GAS` sets the estimation fallback.
    pub fn from_env() -> Result<Self> {
        Self::default().with_vars(std::env::vars())
    }

    /// Apply `MINT_SDK_*` overrides from an explicit variable list
    pub fn with_vars(mut self, vars: impl IntoIterator<Item = (String, String)>) -> Result<Self> {
        for (key, value) in vars {
            if key == "MINT_SDK_FALLBACK_GAS" {
                let gas = value.parse().map_err(|_| {
                    MintError::invalid_input(format!("MINT_SDK_FALLBACK_GAS is not a number: {}", value))
                })?;
                self.fallback_gas = Some(gas);
            } else if let Some(id) = key.strip_prefix("MINT_SDK_FALLBACK_RPC_") {
                if let Some(network) = self.network_entry(&key, id) {
                    network.fallback_rpc_urls = split_urls(&value);
                }
            } else if let Some(id) = key.strip_prefix("MINT_SDK_RPC_") {
                if let Some(network) = self.network_entry(&key, id) {
                    network.rpc_urls = split_urls(&value);
                }
            }
        }
        Ok(self)
    }

    pub fn with_network(mut self, network: NetworkConfig) -> Self {
        self.networks.insert(network.chain_id, network);
        self
    }

    pub fn with_gas_buffer(mut self, gas_buffer: GasBuffer) -> Self {
        self.gas_buffer = gas_buffer;
        self
    }

    pub fn with_fallback_gas(mut self, gas: u64) -> Self {
        self.fallback_gas = Some(gas);
        self
    }

    pub fn network(&self, chain_id: u64) -> Result<&NetworkConfig> {
        self.networks
            .get(&chain_id)
            .ok_or_else(|| MintError::unsupported_network(chain_id))
    }

    /// Network for a `..._<CHAIN_ID>` key; keys with another suffix are not endpoint lists
    fn network_entry(&mut self, key: &str, id: &str) -> Option<&mut NetworkConfig> {
        let Ok(chain_id) = id.parse::<u64>() else {
            tracing::debug!(key, "Ignoring env var without a chain id suffix");
            return None;
        };
        Some(
            self.networks
                .entry(chain_id)
                .or_insert_with(|| NetworkConfig::new(chain_id, format!("Chain {}", chain_id), "ETH")),
        )
    }
}

fn split_urls(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

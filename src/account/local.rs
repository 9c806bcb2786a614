//! Local private key account

use super::classify::{classify, RawWalletError, LOCAL_RULES};
use super::{wait_for_confirmations, Account, AccountKind, TxRequest};
use crate::config::{EngineConfig, NetworkConfig};
use crate::constants::DEFAULT_CONFIRMATION_TIMEOUT;
use crate::error::{ErrorCode, MintError, Result};
use crate::types::Receipt;
use alloy::dyn_abi::TypedData;
use alloy::network::{Ethereum, EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use alloy::transports::http::reqwest::Url;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Account signing locally with a raw EVM private key
///
/// Holds one wallet-filled provider per known network; switching networks selects
/// the provider, so the switch completes synchronously.
pub struct LocalAccount {
    signer: PrivateKeySigner,
    wallet: EthereumWallet,
    /// Providers with wallet filler - they handle nonce, gas, chain_id and signing
    providers: RwLock<HashMap<u64, Arc<dyn Provider<Ethereum>>>>,
    current_chain: AtomicU64,
    confirmation_timeout: Duration,
}

impl LocalAccount {
    /// Create an account from a private key hex string
    ///
    /// # Arguments
    ///
    /// * `private_key` - Hex-encoded private key (with or without 0x prefix)
    /// * `networks` - Networks the account can switch to; the first RPC URL of each is used
    /// * `chain_id` - Network selected initially
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let account = LocalAccount::from_private_key(
    ///     "0x...",
    ///     [NetworkConfig::base()],
    ///     8453,
    /// )?;
    /// ```
    pub fn from_private_key(
        private_key: impl AsRef<str>,
        networks: impl IntoIterator<Item = NetworkConfig>,
        chain_id: u64,
    ) -> Result<Self> {
        let key = private_key.as_ref();
        let key = key.strip_prefix("0x").unwrap_or(key);

        let signer: PrivateKeySigner = key
            .parse()
            .map_err(|e| MintError::invalid_input("Failed to parse private key").with_original(e))?;
        let wallet = EthereumWallet::from(signer.clone());

        let mut providers = HashMap::new();
        for network in networks {
            let provider = build_provider(&wallet, &network)?;
            providers.insert(network.chain_id, provider);
        }
        if !providers.contains_key(&chain_id) {
            return Err(MintError::unsupported_network(chain_id));
        }

        Ok(Self {
            signer,
            wallet,
            providers: RwLock::new(providers),
            current_chain: AtomicU64::new(chain_id),
            confirmation_timeout: DEFAULT_CONFIRMATION_TIMEOUT,
        })
    }

    /// Account knowing every network of an engine configuration
    pub fn from_config(
        private_key: impl AsRef<str>,
        config: &EngineConfig,
        chain_id: u64,
    ) -> Result<Self> {
        let networks = config
            .networks
            .values()
            .filter(|n| !n.rpc_urls.is_empty() || !n.fallback_rpc_urls.is_empty())
            .cloned();
        Ok(Self::from_private_key(private_key, networks, chain_id)?
            .with_confirmation_timeout(config.confirmation_timeout))
    }

    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = timeout;
        self
    }

    async fn current_provider(&self) -> Result<Arc<dyn Provider<Ethereum>>> {
        let chain_id = self.current_chain.load(Ordering::SeqCst);
        self.providers
            .read()
            .await
            .get(&chain_id)
            .cloned()
            .ok_or_else(|| MintError::unsupported_network(chain_id))
    }
}

fn build_provider(
    wallet: &EthereumWallet,
    network: &NetworkConfig,
) -> Result<Arc<dyn Provider<Ethereum>>> {
    let rpc_url = network.endpoints().next().ok_or_else(|| {
        MintError::invalid_input(format!("Network {} has no RPC URL", network.chain_id))
    })?;
    let url: Url = rpc_url
        .parse()
        .map_err(|e| MintError::invalid_input(format!("Invalid RPC URL '{}'", rpc_url)).with_original(e))?;

    // Provider with wallet filler - this handles nonce, gas, and signing
    let provider = ProviderBuilder::new()
        .wallet(wallet.clone())
        .connect_http(url);
    Ok(Arc::new(provider))
}

fn wallet_error(message: impl std::fmt::Display) -> MintError {
    classify(LOCAL_RULES, &RawWalletError::message(message))
}

impl Account for LocalAccount {
    fn kind(&self) -> AccountKind {
        AccountKind::Local
    }

    fn address(&self) -> Address {
        self.signer.address()
    }

    async fn chain_id(&self) -> Result<u64> {
        Ok(self.current_chain.load(Ordering::SeqCst))
    }

    async fn send_transaction(&self, tx: TxRequest) -> Result<TxHash> {
        let current = self.current_chain.load(Ordering::SeqCst);
        if tx.chain_id != current {
            return Err(MintError::wrong_network(tx.chain_id, current));
        }
        let provider = self.current_provider().await?;

        let mut request = TransactionRequest::default()
            .with_from(self.address())
            .with_to(tx.to)
            .with_value(tx.value)
            .with_input(tx.data)
            .with_chain_id(tx.chain_id);
        if let Some(gas_limit) = tx.gas_limit {
            request = request.with_gas_limit(gas_limit);
        }

        // Provider fills nonce, fees and signs
        let pending = provider
            .send_transaction(request)
            .await
            .map_err(|e| classify(LOCAL_RULES, &RawWalletError::from_transport(&e)))?;

        let hash = *pending.tx_hash();
        tracing::info!(%hash, chain_id = tx.chain_id, "Submitted transaction");
        Ok(hash)
    }

    async fn wait_for_transaction(&self, hash: TxHash, confirmations: u64) -> Result<Receipt> {
        let provider = self.current_provider().await?;
        wait_for_confirmations(
            provider.as_ref(),
            hash,
            confirmations,
            self.confirmation_timeout,
            LOCAL_RULES,
        )
        .await
    }

    async fn switch_network(&self, chain_id: u64) -> Result<()> {
        if !self.providers.read().await.contains_key(&chain_id) {
            return Err(MintError::new(
                ErrorCode::UnsupportedNetwork,
                format!("Network {} is not registered with this account", chain_id),
            )
            .with_expected_chain(chain_id));
        }
        let previous = self.current_chain.swap(chain_id, Ordering::SeqCst);
        tracing::debug!(from = previous, to = chain_id, "Local account switched network");
        Ok(())
    }

    async fn add_network(&self, network: &NetworkConfig) -> Result<()> {
        let provider = build_provider(&self.wallet, network)?;
        self.providers.write().await.insert(network.chain_id, provider);
        tracing::info!(chain_id = network.chain_id, name = %network.name, "Registered network");
        Ok(())
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Bytes> {
        let signature = self.signer.sign_message(message).await.map_err(wallet_error)?;
        Ok(Bytes::from(signature.as_bytes().to_vec()))
    }

    async fn sign_typed_data(&self, data: &TypedData) -> Result<Bytes> {
        let signature = self
            .signer
            .sign_dynamic_typed_data(data)
            .await
            .map_err(wallet_error)?;
        Ok(Bytes::from(signature.as_bytes().to_vec()))
    }
}

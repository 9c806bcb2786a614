//! Read-only chain access with automatic endpoint fallback
//!
//! Every call on a network walks that network's endpoints in declared order. An
//! endpoint is used only after it reports the expected chain id; endpoints that
//! report another chain are asked to switch when they support it and skipped
//! otherwise. A failing or timed-out call moves on to the next endpoint, so callers
//! only see an error when every endpoint has failed.

mod cache;
mod endpoint;
mod subscription;

pub use cache::{TokenCache, TokenMetadata};
pub use endpoint::{CallRequest, HttpEndpoint, ReadEndpoint};
pub use subscription::Subscription;

use crate::config::EngineConfig;
use crate::constants::{DEFAULT_CACHE_TTL, DEFAULT_RPC_TIMEOUT, DEFAULT_SUBSCRIPTION_POLL_INTERVAL};
use crate::contracts::IERC20;
use crate::error::{ErrorCode, MintError, Result};
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::rpc::types::{Filter, Log};
use alloy::sol_types::SolCall;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

/// Provider registration table: network id -> endpoints in try order
pub type EndpointTable = HashMap<u64, Vec<Arc<dyn ReadEndpoint>>>;

struct Inner {
    endpoints: EndpointTable,
    timeout: Duration,
    poll_interval: Duration,
    tokens: TokenCache,
}

/// Public (read-only) provider shared by the preparer and the executor
///
/// Cheap to clone; the registration table is immutable after construction.
#[derive(Clone)]
pub struct PublicProvider {
    inner: Arc<Inner>,
}

impl PublicProvider {
    /// Build a provider from explicit endpoints
    pub fn new(endpoints: EndpointTable) -> Self {
        Self::with_settings(
            endpoints,
            DEFAULT_RPC_TIMEOUT,
            DEFAULT_CACHE_TTL,
            DEFAULT_SUBSCRIPTION_POLL_INTERVAL,
        )
    }

    pub fn with_settings(
        endpoints: EndpointTable,
        rpc_timeout: Duration,
        cache_ttl: Duration,
        poll_interval: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                endpoints,
                timeout: rpc_timeout,
                poll_interval,
                tokens: TokenCache::new(cache_ttl),
            }),
        }
    }

    /// Build HTTP endpoints for every configured network (primaries, then fallbacks)
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let mut endpoints: EndpointTable = HashMap::new();
        for (chain_id, network) in &config.networks {
            let list = endpoints.entry(*chain_id).or_default();
            for url in network.endpoints() {
                match HttpEndpoint::new(url) {
                    Ok(endpoint) => list.push(Arc::new(endpoint)),
                    Err(e) => {
                        tracing::warn!(chain_id, error = %e, "Ignoring invalid RPC URL");
                    }
                }
            }
        }
        Ok(Self::with_settings(
            endpoints,
            config.rpc_timeout,
            config.cache_ttl,
            config.subscription_poll_interval,
        ))
    }

    /// Whether at least one endpoint is registered for the network
    pub fn supports(&self, network_id: u64) -> bool {
        self.inner
            .endpoints
            .get(&network_id)
            .is_some_and(|list| !list.is_empty())
    }

    pub fn token_cache(&self) -> &TokenCache {
        &self.inner.tokens
    }

    /// Native balance, or ERC-20 balance when `token` is given
    pub async fn get_balance(
        &self,
        address: Address,
        network_id: u64,
        token: Option<Address>,
    ) -> Result<U256> {
        match token {
            Some(token) => {
                self.read_contract(network_id, token, &IERC20::balanceOfCall { account: address })
                    .await
            }
            None => {
                self.with_fallback(network_id, "get_balance", |endpoint| {
                    endpoint.balance(address)
                })
                .await
            }
        }
    }

    /// ERC-20 allowance granted by `owner` to `spender`
    pub async fn allowance(
        &self,
        network_id: u64,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256> {
        self.read_contract(network_id, token, &IERC20::allowanceCall { owner, spender })
            .await
    }

    /// Call a view function and decode its return value
    ///
    /// A reply that does not decode (an empty `0x` from a lagging node, a truncated
    /// result) counts as a failure of that endpoint.
    pub async fn read_contract<C>(&self, network_id: u64, contract: Address, call: &C) -> Result<C::Return>
    where
        C: SolCall + 'static,
        C::Return: Send,
    {
        let data = Bytes::from(call.abi_encode());
        self.with_fallback(network_id, C::SIGNATURE, |endpoint| {
            let request = CallRequest::new(contract, data.clone());
            Box::pin(async move {
                let result = endpoint.call(request).await?;
                C::abi_decode_returns(&result).map_err(|e| {
                    MintError::new(
                        ErrorCode::NetworkError,
                        format!("Failed to decode {} from {}", C::SIGNATURE, contract),
                    )
                    .with_original(e)
                })
            })
        })
        .await
    }

    /// Gas estimate for a contract call; failures surface as `ESTIMATION_FAILED`
    pub async fn estimate_contract_gas(
        &self,
        network_id: u64,
        request: CallRequest,
    ) -> Result<u64> {
        self.with_fallback(network_id, "estimate_gas", |endpoint| {
            endpoint.estimate_gas(request.clone())
        })
        .await
        .map_err(|e| match e.code {
            ErrorCode::UnsupportedNetwork => e,
            _ => {
                let original = e
                    .details
                    .original_error
                    .clone()
                    .unwrap_or_else(|| e.message.clone());
                MintError::new(
                    ErrorCode::EstimationFailed,
                    format!("Gas estimation failed for call to {}", request.to),
                )
                .with_original(original)
            }
        })
    }

    pub async fn gas_price(&self, network_id: u64) -> Result<u128> {
        self.with_fallback(network_id, "gas_price", |endpoint| endpoint.gas_price())
            .await
    }

    pub async fn block_number(&self, network_id: u64) -> Result<u64> {
        self.with_fallback(network_id, "block_number", |endpoint| {
            endpoint.block_number()
        })
        .await
    }

    pub async fn get_logs(&self, network_id: u64, filter: &Filter) -> Result<Vec<Log>> {
        self.with_fallback(network_id, "get_logs", |endpoint| {
            endpoint.logs(filter.clone())
        })
        .await
    }

    /// Symbol and decimals of an ERC-20 token, cached per provider
    pub async fn token_metadata(&self, network_id: u64, token: Address) -> Result<TokenMetadata> {
        if let Some(metadata) = self.inner.tokens.get(network_id, token) {
            return Ok(metadata);
        }
        let symbol = self
            .read_contract(network_id, token, &IERC20::symbolCall {})
            .await?;
        let decimals = self
            .read_contract(network_id, token, &IERC20::decimalsCall {})
            .await?;
        let metadata = TokenMetadata { symbol, decimals };
        self.inner.tokens.insert(network_id, token, metadata.clone());
        Ok(metadata)
    }

    /// Poll for logs emitted by `address` (optionally one event) and feed them to `callback`
    ///
    /// Delivery starts at the block after the current head. Transient polling
    /// failures are logged and retried on the next tick.
    pub async fn subscribe_to_contract_events<F>(
        &self,
        network_id: u64,
        address: Address,
        event_signature: Option<B256>,
        callback: F,
    ) -> Result<Subscription>
    where
        F: Fn(Log) + Send + Sync + 'static,
    {
        let mut next_block = self.block_number(network_id).await? + 1;
        let mut filter = Filter::new().address(address);
        if let Some(signature) = event_signature {
            filter = filter.event_signature(signature);
        }

        let provider = self.clone();
        let interval = self.inner.poll_interval;
        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                let head = match provider.block_number(network_id).await {
                    Ok(head) => head,
                    Err(e) => {
                        tracing::warn!(network_id, error = %e, "Subscription head poll failed");
                        continue;
                    }
                };
                if head < next_block {
                    continue;
                }
                let range = filter.clone().from_block(next_block).to_block(head);
                match provider.get_logs(network_id, &range).await {
                    Ok(logs) => {
                        for log in logs {
                            callback(log);
                        }
                        next_block = head + 1;
                    }
                    Err(e) => {
                        tracing::warn!(network_id, error = %e, "Subscription log poll failed");
                    }
                }
            }
        });

        tracing::debug!(network_id, %address, "Subscribed to contract events");
        Ok(Subscription::new(handle))
    }

    /// Run `op` on the first endpoint of `network_id` that verifies and succeeds
    async fn with_fallback<T, F>(&self, network_id: u64, operation: &str, op: F) -> Result<T>
    where
        F: for<'a> Fn(&'a dyn ReadEndpoint) -> BoxFuture<'a, Result<T>>,
    {
        let endpoints = self
            .inner
            .endpoints
            .get(&network_id)
            .filter(|list| !list.is_empty())
            .ok_or_else(|| MintError::unsupported_network(network_id))?;

        let mut last_error = None;
        for (index, endpoint) in endpoints.iter().enumerate() {
            let endpoint = endpoint.as_ref();

            if let Err(e) = self.verify_endpoint(endpoint, network_id).await {
                tracing::debug!(
                    endpoint = %endpoint.label(),
                    endpoint_idx = index,
                    network_id,
                    error = %e,
                    "Skipping endpoint"
                );
                last_error = Some(e);
                continue;
            }

            match timeout(self.inner.timeout, op(endpoint)).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) => {
                    tracing::warn!(
                        endpoint = %endpoint.label(),
                        endpoint_idx = index,
                        operation,
                        error = %e,
                        "Endpoint call failed, trying next endpoint"
                    );
                    last_error = Some(e);
                }
                Err(_) => {
                    tracing::warn!(
                        endpoint = %endpoint.label(),
                        endpoint_idx = index,
                        operation,
                        "Endpoint call timed out, trying next endpoint"
                    );
                    last_error = Some(MintError::timeout(format!(
                        "{} timed out after {:?}",
                        operation, self.inner.timeout
                    )));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| MintError::unsupported_network(network_id)))
    }

    /// Confirm an endpoint serves `network_id`, switching it when it can
    async fn verify_endpoint(&self, endpoint: &dyn ReadEndpoint, network_id: u64) -> Result<()> {
        let reported = self.reported_chain(endpoint).await?;
        if reported == network_id {
            return Ok(());
        }

        let Some(switch) = endpoint.switch_chain(network_id) else {
            return Err(MintError::wrong_network(network_id, reported));
        };
        match timeout(self.inner.timeout, switch).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(MintError::timeout("Endpoint network switch timed out")),
        }

        let reported = self.reported_chain(endpoint).await?;
        if reported != network_id {
            return Err(MintError::wrong_network(network_id, reported));
        }
        tracing::debug!(endpoint = %endpoint.label(), network_id, "Endpoint switched network");
        Ok(())
    }

    async fn reported_chain(&self, endpoint: &dyn ReadEndpoint) -> Result<u64> {
        match timeout(self.inner.timeout, endpoint.chain_id()).await {
            Ok(result) => result,
            Err(_) => Err(MintError::timeout("eth_chainId timed out")),
        }
    }
}

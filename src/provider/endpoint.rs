//! Read endpoints backing the public provider

use crate::error::{MintError, Result};
use alloy::network::{Ethereum, TransactionBuilder};
use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::{Provider, ProviderBuilder, RootProvider};
use alloy::rpc::types::{Filter, Log, TransactionRequest};
use alloy::transports::http::reqwest::Url;
use alloy::transports::TransportError;
use futures::future::BoxFuture;

/// A read-only contract call or gas estimation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    pub from: Option<Address>,
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
}

impl CallRequest {
    pub fn new(to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            from: None,
            to,
            data: data.into(),
            value: U256::ZERO,
        }
    }

    pub fn from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    pub fn value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    fn to_transaction_request(&self) -> TransactionRequest {
        let mut tx = TransactionRequest::default()
            .with_to(self.to)
            .with_input(self.data.clone());
        if let Some(from) = self.from {
            tx = tx.with_from(from);
        }
        if !self.value.is_zero() {
            tx = tx.with_value(self.value);
        }
        tx
    }
}

/// One backing endpoint for a network
///
/// Methods return boxed futures so endpoints of different kinds can sit in one
/// fallback list.
pub trait ReadEndpoint: Send + Sync {
    /// Name used in logs
    fn label(&self) -> &str;

    /// Chain id the endpoint reports
    fn chain_id(&self) -> BoxFuture<'_, Result<u64>>;

    /// Wallet-style endpoints can be asked to move to another chain
    fn switch_chain(&self, _chain_id: u64) -> Option<BoxFuture<'_, Result<()>>> {
        None
    }

    fn balance(&self, address: Address) -> BoxFuture<'_, Result<U256>>;

    fn call(&self, request: CallRequest) -> BoxFuture<'_, Result<Bytes>>;

    fn estimate_gas(&self, request: CallRequest) -> BoxFuture<'_, Result<u64>>;

    fn gas_price(&self) -> BoxFuture<'_, Result<u128>>;

    fn block_number(&self) -> BoxFuture<'_, Result<u64>>;

    fn logs(&self, filter: Filter) -> BoxFuture<'_, Result<Vec<Log>>>;
}

/// JSON-RPC endpoint over HTTP
pub struct HttpEndpoint {
    label: String,
    provider: RootProvider<Ethereum>,
}

impl HttpEndpoint {
    pub fn new(rpc_url: impl AsRef<str>) -> Result<Self> {
        let rpc_url = rpc_url.as_ref();
        let url: Url = rpc_url.parse().map_err(|e| {
            MintError::invalid_input(format!("Invalid RPC URL '{}': {}", rpc_url, e))
        })?;
        // Read-only provider without fillers (we only do eth_call style operations)
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .network::<Ethereum>()
            .connect_http(url.clone());

        Ok(Self {
            label: redact_url(&url),
            provider,
        })
    }
}

impl ReadEndpoint for HttpEndpoint {
    fn label(&self) -> &str {
        &self.label
    }

    fn chain_id(&self) -> BoxFuture<'_, Result<u64>> {
        Box::pin(async move {
            self.provider
                .get_chain_id()
                .await
                .map_err(|e| rpc_error("eth_chainId", e))
        })
    }

    fn balance(&self, address: Address) -> BoxFuture<'_, Result<U256>> {
        Box::pin(async move {
            self.provider
                .get_balance(address)
                .await
                .map_err(|e| rpc_error("eth_getBalance", e))
        })
    }

    fn call(&self, request: CallRequest) -> BoxFuture<'_, Result<Bytes>> {
        Box::pin(async move {
            self.provider
                .call(request.to_transaction_request())
                .await
                .map_err(|e| rpc_error("eth_call", e))
        })
    }

    fn estimate_gas(&self, request: CallRequest) -> BoxFuture<'_, Result<u64>> {
        Box::pin(async move {
            self.provider
                .estimate_gas(request.to_transaction_request())
                .await
                .map_err(|e| rpc_error("eth_estimateGas", e))
        })
    }

    fn gas_price(&self) -> BoxFuture<'_, Result<u128>> {
        Box::pin(async move {
            self.provider
                .get_gas_price()
                .await
                .map_err(|e| rpc_error("eth_gasPrice", e))
        })
    }

    fn block_number(&self) -> BoxFuture<'_, Result<u64>> {
        Box::pin(async move {
            self.provider
                .get_block_number()
                .await
                .map_err(|e| rpc_error("eth_blockNumber", e))
        })
    }

    fn logs(&self, filter: Filter) -> BoxFuture<'_, Result<Vec<Log>>> {
        Box::pin(async move {
            self.provider
                .get_logs(&filter)
                .await
                .map_err(|e| rpc_error("eth_getLogs", e))
        })
    }
}

fn rpc_error(method: &str, err: TransportError) -> MintError {
    MintError::new(
        crate::error::ErrorCode::NetworkError,
        format!("{} failed", method),
    )
    .with_original(err)
}

/// Keep scheme and host only; RPC URLs often embed API keys
fn redact_url(url: &Url) -> String {
    format!("{}://{}", url.scheme(), url.host_str().unwrap_or("unknown"))
}

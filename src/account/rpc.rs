//! Account backed by a wallet that manages its own keys behind JSON-RPC
//!
//! Speaks the provider-style (EIP-1193) method set: `eth_sendTransaction`,
//! `wallet_switchEthereumChain`, `wallet_addEthereumChain`, `personal_sign` and
//! `eth_signTypedData_v4`. The wallet decides when the user approves, so every call
//! may take as long as the user does.

use super::classify::{classify, RawWalletError, RPC_RULES};
use super::{wait_for_confirmations, Account, AccountKind, TxRequest};
use crate::config::NetworkConfig;
use crate::constants::DEFAULT_CONFIRMATION_TIMEOUT;
use crate::error::{MintError, Result};
use crate::types::Receipt;
use alloy::dyn_abi::TypedData;
use alloy::network::Ethereum;
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::providers::{Provider, ProviderBuilder, RootProvider};
use alloy::transports::http::reqwest::Url;
use alloy::transports::TransportError;
use serde_json::{json, Value};
use std::time::Duration;

pub struct RpcAccount {
    provider: RootProvider<Ethereum>,
    address: Address,
    confirmation_timeout: Duration,
}

impl RpcAccount {
    /// Use a known address on the wallet endpoint
    pub fn new(rpc_url: impl AsRef<str>, address: Address) -> Result<Self> {
        Ok(Self {
            provider: connect(rpc_url.as_ref())?,
            address,
            confirmation_timeout: DEFAULT_CONFIRMATION_TIMEOUT,
        })
    }

    /// Ask the wallet for its accounts and use the first one
    pub async fn connect(rpc_url: impl AsRef<str>) -> Result<Self> {
        let provider = connect(rpc_url.as_ref())?;
        let accounts: Vec<Address> = provider
            .raw_request("eth_requestAccounts".into(), ())
            .await
            .map_err(|e| rpc_error(&e))?;
        let address = accounts
            .first()
            .copied()
            .ok_or_else(|| MintError::invalid_input("Wallet exposed no accounts"))?;
        tracing::info!(%address, "Connected to wallet");

        Ok(Self {
            provider,
            address,
            confirmation_timeout: DEFAULT_CONFIRMATION_TIMEOUT,
        })
    }

    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = timeout;
        self
    }
}

fn connect(rpc_url: &str) -> Result<RootProvider<Ethereum>> {
    let url: Url = rpc_url
        .parse()
        .map_err(|e| MintError::invalid_input(format!("Invalid wallet RPC URL '{}'", rpc_url)).with_original(e))?;
    // The wallet fills nonce, fees and signs; no local fillers
    Ok(ProviderBuilder::new()
        .disable_recommended_fillers()
        .network::<Ethereum>()
        .connect_http(url))
}

fn rpc_error(err: &TransportError) -> MintError {
    classify(RPC_RULES, &RawWalletError::from_transport(err))
}

fn chain_hex(chain_id: u64) -> String {
    format!("0x{:x}", chain_id)
}

fn send_params(from: Address, tx: &TxRequest) -> Value {
    let mut params = json!({
        "from": from,
        "to": tx.to,
        "value": format!("0x{:x}", tx.value),
        "data": tx.data,
        "chainId": chain_hex(tx.chain_id),
    });
    if let Some(gas) = tx.gas_limit {
        params["gas"] = Value::String(format!("0x{:x}", gas));
    }
    json!([params])
}

fn add_chain_params(network: &NetworkConfig) -> Value {
    let rpc_urls: Vec<&String> = network.endpoints().collect();
    let mut params = json!({
        "chainId": chain_hex(network.chain_id),
        "chainName": network.name,
        "nativeCurrency": {
            "name": network.native_symbol,
            "symbol": network.native_symbol,
            "decimals": network.native_decimals,
        },
        "rpcUrls": rpc_urls,
    });
    if let Some(explorer) = &network.block_explorer {
        params["blockExplorerUrls"] = json!([explorer]);
    }
    json!([params])
}

impl Account for RpcAccount {
    fn kind(&self) -> AccountKind {
        AccountKind::Rpc
    }

    fn address(&self) -> Address {
        self.address
    }

    async fn chain_id(&self) -> Result<u64> {
        self.provider.get_chain_id().await.map_err(|e| rpc_error(&e))
    }

    async fn send_transaction(&self, tx: TxRequest) -> Result<TxHash> {
        let hash: TxHash = self
            .provider
            .raw_request("eth_sendTransaction".into(), send_params(self.address, &tx))
            .await
            .map_err(|e| rpc_error(&e))?;
        tracing::info!(%hash, chain_id = tx.chain_id, "Wallet submitted transaction");
        Ok(hash)
    }

    async fn wait_for_transaction(&self, hash: TxHash, confirmations: u64) -> Result<Receipt> {
        wait_for_confirmations(
            &self.provider,
            hash,
            confirmations,
            self.confirmation_timeout,
            RPC_RULES,
        )
        .await
    }

    async fn switch_network(&self, chain_id: u64) -> Result<()> {
        let _: Value = self
            .provider
            .raw_request(
                "wallet_switchEthereumChain".into(),
                json!([{ "chainId": chain_hex(chain_id) }]),
            )
            .await
            .map_err(|e| rpc_error(&e))?;
        Ok(())
    }

    async fn add_network(&self, network: &NetworkConfig) -> Result<()> {
        let _: Value = self
            .provider
            .raw_request("wallet_addEthereumChain".into(), add_chain_params(network))
            .await
            .map_err(|e| rpc_error(&e))?;
        tracing::info!(chain_id = network.chain_id, name = %network.name, "Wallet added network");
        Ok(())
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Bytes> {
        let message = Bytes::copy_from_slice(message);
        self.provider
            .raw_request("personal_sign".into(), json!([message, self.address]))
            .await
            .map_err(|e| rpc_error(&e))
    }

    async fn sign_typed_data(&self, data: &TypedData) -> Result<Bytes> {
        let payload = serde_json::to_string(data)
            .map_err(|e| MintError::invalid_input("Typed data is not serializable").with_original(e))?;
        self.provider
            .raw_request("eth_signTypedData_v4".into(), json!([self.address, payload]))
            .await
            .map_err(|e| rpc_error(&e))
    }
}

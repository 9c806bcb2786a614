//! Wallet-agnostic write access
//!
//! The [`Account`] trait is the only surface the executor and the network switch
//! coordinator see. Three wallet families implement it:
//! - [`LocalAccount`]: a local private key driving alloy wallet providers
//! - [`RpcAccount`]: a wallet that manages keys itself behind a JSON-RPC endpoint
//! - [`FordefiAccount`]: Fordefi MPC custody over its REST API
//!
//! Each adapter translates its library's errors with its own rule table in [`classify`].

pub mod classify;
mod fordefi;
mod local;
mod rpc;

pub use fordefi::FordefiAccount;
pub use local::LocalAccount;
pub use rpc::RpcAccount;

use crate::config::NetworkConfig;
use crate::constants::RECEIPT_POLL_INTERVAL;
use crate::error::{MintError, Result};
use crate::types::{RawTransaction, Receipt, ReceiptStatus};
use alloy::dyn_abi::TypedData;
use alloy::network::{Ethereum, ReceiptResponse};
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::Provider;
use alloy::rpc::types::TransactionReceipt;
use classify::{classify, ClassificationRule, RawWalletError};
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Transaction request parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRequest {
    /// Target contract address
    pub to: Address,
    /// Transaction value in wei
    pub value: U256,
    /// Encoded calldata
    pub data: Bytes,
    /// Optional gas limit override
    pub gas_limit: Option<u64>,
    /// Network the transaction is meant for
    pub chain_id: u64,
}

impl TxRequest {
    pub fn new(to: Address, data: impl Into<Bytes>, chain_id: u64) -> Self {
        Self {
            to,
            value: U256::ZERO,
            data: data.into(),
            gas_limit: None,
            chain_id,
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }
}

impl From<&RawTransaction> for TxRequest {
    fn from(raw: &RawTransaction) -> Self {
        let tx = Self::new(raw.contract_address, raw.call_data.clone(), raw.network_id)
            .with_value(raw.native_value);
        if raw.gas_estimate > 0 {
            tx.with_gas_limit(raw.gas_estimate)
        } else {
            tx
        }
    }
}

/// Which wallet family backs an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Local,
    Rpc,
    Fordefi,
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Local => "local",
            Self::Rpc => "rpc",
            Self::Fordefi => "fordefi",
        };
        f.write_str(s)
    }
}

/// Write access to a wallet
///
/// Every failure is reported as a [`MintError`] already classified into the shared
/// taxonomy; callers never see wallet-library error shapes.
pub trait Account: Send + Sync {
    fn kind(&self) -> AccountKind;

    /// Address that signs and pays
    fn address(&self) -> Address;

    /// Network the wallet is currently connected to
    fn chain_id(&self) -> impl Future<Output = Result<u64>> + Send;

    /// Sign and submit a transaction, returning its hash
    fn send_transaction(&self, tx: TxRequest) -> impl Future<Output = Result<TxHash>> + Send;

    /// Wait until the transaction has `confirmations` blocks on top of it (1 = mined)
    fn wait_for_transaction(
        &self,
        hash: TxHash,
        confirmations: u64,
    ) -> impl Future<Output = Result<Receipt>> + Send;

    /// Ask the wallet to move to another network
    ///
    /// Completion may be asynchronous relative to this call; the switch coordinator
    /// confirms it by polling [`Account::chain_id`].
    fn switch_network(&self, chain_id: u64) -> impl Future<Output = Result<()>> + Send;

    /// Register a network definition the wallet does not know yet
    fn add_network(&self, network: &NetworkConfig) -> impl Future<Output = Result<()>> + Send;

    /// EIP-191 personal message signature
    fn sign_message(&self, message: &[u8]) -> impl Future<Output = Result<Bytes>> + Send;

    /// EIP-712 typed data signature
    fn sign_typed_data(&self, data: &TypedData) -> impl Future<Output = Result<Bytes>> + Send;
}

/// Any of the supported wallet families
pub enum WalletAccount {
    Local(LocalAccount),
    Rpc(RpcAccount),
    Fordefi(FordefiAccount),
}

impl From<LocalAccount> for WalletAccount {
    fn from(account: LocalAccount) -> Self {
        Self::Local(account)
    }
}

impl From<RpcAccount> for WalletAccount {
    fn from(account: RpcAccount) -> Self {
        Self::Rpc(account)
    }
}

impl From<FordefiAccount> for WalletAccount {
    fn from(account: FordefiAccount) -> Self {
        Self::Fordefi(account)
    }
}

impl Account for WalletAccount {
    fn kind(&self) -> AccountKind {
        match self {
            Self::Local(a) => a.kind(),
            Self::Rpc(a) => a.kind(),
            Self::Fordefi(a) => a.kind(),
        }
    }

    fn address(&self) -> Address {
        match self {
            Self::Local(a) => a.address(),
            Self::Rpc(a) => a.address(),
            Self::Fordefi(a) => a.address(),
        }
    }

    async fn chain_id(&self) -> Result<u64> {
        match self {
            Self::Local(a) => a.chain_id().await,
            Self::Rpc(a) => a.chain_id().await,
            Self::Fordefi(a) => a.chain_id().await,
        }
    }

    async fn send_transaction(&self, tx: TxRequest) -> Result<TxHash> {
        match self {
            Self::Local(a) => a.send_transaction(tx).await,
            Self::Rpc(a) => a.send_transaction(tx).await,
            Self::Fordefi(a) => a.send_transaction(tx).await,
        }
    }

    async fn wait_for_transaction(&self, hash: TxHash, confirmations: u64) -> Result<Receipt> {
        match self {
            Self::Local(a) => a.wait_for_transaction(hash, confirmations).await,
            Self::Rpc(a) => a.wait_for_transaction(hash, confirmations).await,
            Self::Fordefi(a) => a.wait_for_transaction(hash, confirmations).await,
        }
    }

    async fn switch_network(&self, chain_id: u64) -> Result<()> {
        match self {
            Self::Local(a) => a.switch_network(chain_id).await,
            Self::Rpc(a) => a.switch_network(chain_id).await,
            Self::Fordefi(a) => a.switch_network(chain_id).await,
        }
    }

    async fn add_network(&self, network: &NetworkConfig) -> Result<()> {
        match self {
            Self::Local(a) => a.add_network(network).await,
            Self::Rpc(a) => a.add_network(network).await,
            Self::Fordefi(a) => a.add_network(network).await,
        }
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Bytes> {
        match self {
            Self::Local(a) => a.sign_message(message).await,
            Self::Rpc(a) => a.sign_message(message).await,
            Self::Fordefi(a) => a.sign_message(message).await,
        }
    }

    async fn sign_typed_data(&self, data: &TypedData) -> Result<Bytes> {
        match self {
            Self::Local(a) => a.sign_typed_data(data).await,
            Self::Rpc(a) => a.sign_typed_data(data).await,
            Self::Fordefi(a) => a.sign_typed_data(data).await,
        }
    }
}

/// Convert an RPC receipt, keeping the raw logs for order decoding
pub(crate) fn receipt_from_rpc(receipt: &TransactionReceipt) -> Receipt {
    let status = if receipt.status() {
        ReceiptStatus::Success
    } else {
        ReceiptStatus::Reverted
    };
    Receipt {
        transaction_hash: receipt.transaction_hash,
        status,
        block_number: receipt.block_number,
        gas_used: receipt.gas_used,
        order: None,
        logs: receipt
            .inner
            .logs()
            .iter()
            .map(|log| log.inner.clone())
            .collect(),
    }
}

/// Blocks on top of (and including) the one a transaction was mined in
fn confirmation_depth(head: u64, mined_at: u64) -> u64 {
    head.saturating_sub(mined_at) + 1
}

/// Poll for a receipt until it has `confirmations` blocks, or `timeout` elapses
pub(crate) async fn wait_for_confirmations<P>(
    provider: &P,
    hash: TxHash,
    confirmations: u64,
    timeout: Duration,
    rules: &[ClassificationRule],
) -> Result<Receipt>
where
    P: Provider<Ethereum> + ?Sized,
{
    let confirmations = confirmations.max(1);
    let poll = async {
        loop {
            let receipt = provider
                .get_transaction_receipt(hash)
                .await
                .map_err(|e| classify(rules, &RawWalletError::from_transport(&e)))?;

            if let Some(receipt) = receipt {
                let mined_at = receipt.block_number.unwrap_or_default();
                let head = provider
                    .get_block_number()
                    .await
                    .map_err(|e| classify(rules, &RawWalletError::from_transport(&e)))?;
                let depth = confirmation_depth(head, mined_at);
                if depth >= confirmations {
                    return Ok::<_, MintError>(receipt_from_rpc(&receipt));
                }
                tracing::debug!(%hash, depth, confirmations, "Waiting for confirmations");
            }

            tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
        }
    };

    match tokio::time::timeout(timeout, poll).await {
        Ok(result) => result,
        Err(_) => Err(MintError::timeout(format!(
            "Transaction {} not confirmed after {:?}",
            hash, timeout
        ))),
    }
}

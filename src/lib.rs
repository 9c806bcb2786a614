//! Mint SDK for Rust
//!
//! Prepares and executes NFT purchases (Edition and BlindMint claims) on EVM networks.
//!
//! # Features
//!
//! - Price a purchase across native and ERC-20 currencies, gas included
//! - Check sale rules and balances before anything is signed
//! - Execute the step plan (approve, mint) with local keys, RPC wallets or Fordefi
//! - One error taxonomy across every wallet family
//!
//! # Example
//!
//! ```rust,ignore
//! use mint_sdk::{
//!     EngineConfig, LocalAccount, Product, ProductData, PublicProvider, PurchaseParams,
//!     PurchasePreparer, StepExecutor,
//! };
//!
//! #[tokio::main]
//! async fn main() -> eyre::Result<()> {
//!     let config = EngineConfig::from_env()?;
//!     let provider = PublicProvider::from_config(&config)?;
//!     let account = LocalAccount::from_config("0x...", &config, 8453)?;
//!
//!     let product = Product::edition(extension, creator, instance_id, ProductData::new("Drop", 8453));
//!     let preparer = PurchasePreparer::new(provider.clone(), config.clone());
//!     let mut purchase = preparer
//!         .prepare(&product, PurchaseParams::new(account.address(), 1))
//!         .await?;
//!
//!     let receipts = StepExecutor::new(provider, &config)
//!         .execute_all(&mut purchase, &account, None, 1)
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod account;
pub mod config;
pub mod constants;
pub mod contracts;
pub mod error;
pub mod executor;
pub mod money;
pub mod network;
pub mod preparer;
pub mod price;
pub mod product;
pub mod provider;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types for convenience
pub use account::{Account, AccountKind, FordefiAccount, LocalAccount, RpcAccount, TxRequest, WalletAccount};
pub use config::{EngineConfig, GasBuffer, NetworkConfig};
pub use error::{ErrorCategory, ErrorCode, ErrorDetails, MintError, Result};
pub use executor::{StepCallbacks, StepExecutor};
pub use money::{Cost, Currency, Money};
pub use network::{NetworkSwitcher, SwitchState};
pub use preparer::PurchasePreparer;
pub use price::{HttpRateSource, StaticRateSource, UsdRateSource};
pub use product::{
    AllowlistEntry, AudienceRestriction, ClaimState, Product, ProductData, ProductKind, ProductRef,
};
pub use provider::{PublicProvider, Subscription};
pub use types::{
    Ineligibility, MintIntent, Order, OrderItem, PreparedPurchase, PurchaseCost, PurchaseParams,
    RawTransaction, Receipt, ReceiptStatus, StepAction, StepKind, StepStatus, TransactionStep,
};

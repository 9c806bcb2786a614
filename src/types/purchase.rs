//! Purchase intent and prepared purchase types

use crate::config::GasBuffer;
use crate::constants::MAX_MINT_QUANTITY;
use crate::error::{ErrorCode, MintError, Result};
use crate::money::{Cost, Money};
use crate::types::TransactionStep;
use alloy::primitives::Address;
use serde::Serialize;

/// Parameters for preparing a purchase
#[derive(Debug, Clone)]
pub struct PurchaseParams {
    /// Buyer (the address that signs and pays)
    pub address: Address,
    /// Receiver of the minted tokens (defaults to the buyer)
    pub recipient: Option<Address>,
    /// Forces the network the steps target (defaults to the product's network)
    pub network_id: Option<u64>,
    /// Units to mint
    pub quantity: u32,
    /// Overrides the engine's gas buffer
    pub gas_buffer: Option<GasBuffer>,
    /// When set, balances of this address are checked against the total cost
    pub account: Option<Address>,
}

impl PurchaseParams {
    pub fn new(address: Address, quantity: u32) -> Self {
        Self {
            address,
            recipient: None,
            network_id: None,
            quantity,
            gas_buffer: None,
            account: None,
        }
    }

    pub fn with_recipient(mut self, recipient: Address) -> Self {
        self.recipient = Some(recipient);
        self
    }

    pub fn with_network(mut self, network_id: u64) -> Self {
        self.network_id = Some(network_id);
        self
    }

    pub fn with_gas_buffer(mut self, gas_buffer: GasBuffer) -> Self {
        self.gas_buffer = Some(gas_buffer);
        self
    }

    /// Check balances of `account` during preparation
    pub fn with_balance_check(mut self, account: Address) -> Self {
        self.account = Some(account);
        self
    }

    pub fn recipient(&self) -> Address {
        self.recipient.unwrap_or(self.address)
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        if self.quantity == 0 {
            return Err(MintError::invalid_input("Quantity must be positive"));
        }
        if self.quantity > MAX_MINT_QUANTITY {
            return Err(MintError::invalid_input(format!(
                "Quantity must be at most {}",
                MAX_MINT_QUANTITY
            )));
        }
        if self.address == Address::ZERO {
            return Err(MintError::invalid_input("Buyer address must not be zero"));
        }
        if self.recipient == Some(Address::ZERO) {
            return Err(MintError::invalid_input("Recipient address must not be zero"));
        }
        if self.gas_buffer.and_then(|b| b.multiplier) == Some(0) {
            return Err(MintError::invalid_input("Gas multiplier must be positive"));
        }
        Ok(())
    }
}

/// Why a purchase cannot proceed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ineligibility {
    pub code: ErrorCode,
    pub message: String,
}

impl Ineligibility {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Raise as an error, for execution paths that re-validate before submitting
    pub fn into_error(self) -> MintError {
        MintError::new(self.code, self.message)
    }
}

/// Price of a purchase; network fees are kept apart from what is paid for the items
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseCost {
    /// Value each step transfers (native value, token amount), in step order
    pub per_step: Vec<Cost>,
    /// Gas fee of each step at the current gas price, in step order
    pub per_step_gas: Vec<Money>,
    /// Sum of `per_step`
    pub total: Cost,
    /// Sum of `per_step_gas`
    pub gas: Money,
}

impl PurchaseCost {
    /// Everything the buyer needs to hold: `total` plus gas in the native bucket
    pub fn required(&self) -> Result<Cost> {
        let mut required = self.total.clone();
        required.add_money(&self.gas)?;
        Ok(required)
    }
}

/// A priced, ordered plan for one purchase attempt
///
/// Regenerate it for every attempt: allowances and supply change between attempts.
#[derive(Debug, Clone, Serialize)]
pub struct PreparedPurchase {
    pub is_eligible: bool,
    pub ineligibility_reason: Option<Ineligibility>,
    /// Shortfall per currency when the balance pre-check failed
    pub missing_funds: Vec<Money>,
    pub cost: PurchaseCost,
    pub steps: Vec<TransactionStep>,
}

impl PreparedPurchase {
    pub fn step(&self, id: &str) -> Option<&TransactionStep> {
        self.steps.iter().find(|s| s.id() == id)
    }

    pub fn reason_code(&self) -> Option<ErrorCode> {
        self.ineligibility_reason.as_ref().map(|r| r.code)
    }
}

//! Currency amounts
//!
//! [`Money`] is an immutable amount in the smallest unit of a currency. Arithmetic and
//! comparison require both operands to be in the same currency (address and symbol);
//! mixing currencies is a programming error and fails with `INVALID_INPUT`.

use crate::constants::{NATIVE_CURRENCY, NATIVE_DECIMALS};
use crate::error::{MintError, Result};
use alloy::primitives::utils::format_units;
use alloy::primitives::{Address, U256};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Which currency an amount is denominated in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "address")]
pub enum Currency {
    Native,
    Token(Address),
}

impl Currency {
    /// Map an on-chain payment token field (zero address = native)
    pub fn from_address(address: Address) -> Self {
        if address == NATIVE_CURRENCY {
            Self::Native
        } else {
            Self::Token(address)
        }
    }

    pub fn address(&self) -> Address {
        match self {
            Self::Native => NATIVE_CURRENCY,
            Self::Token(address) => *address,
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Self::Native)
    }
}

/// An amount of native currency or ERC-20 tokens on a given network
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Money {
    value: U256,
    decimals: u8,
    currency: Currency,
    symbol: String,
    network_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    formatted_usd: Option<String>,
}

impl Money {
    pub fn new(
        value: U256,
        decimals: u8,
        currency: Currency,
        symbol: impl Into<String>,
        network_id: u64,
    ) -> Self {
        Self {
            value,
            decimals,
            currency,
            symbol: symbol.into(),
            network_id,
            formatted_usd: None,
        }
    }

    /// Native currency amount (18 decimals)
    pub fn native(value: U256, symbol: impl Into<String>, network_id: u64) -> Self {
        Self::new(value, NATIVE_DECIMALS, Currency::Native, symbol, network_id)
    }

    /// Token amount
    pub fn token(
        value: U256,
        token: Address,
        decimals: u8,
        symbol: impl Into<String>,
        network_id: u64,
    ) -> Self {
        Self::new(value, decimals, Currency::Token(token), symbol, network_id)
    }

    /// Zero amount in the same currency as `self`
    pub fn zero_like(&self) -> Self {
        self.with_value(U256::ZERO)
    }

    pub fn value(&self) -> U256 {
        self.value
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn currency_address(&self) -> Address {
        self.currency.address()
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn network_id(&self) -> u64 {
        self.network_id
    }

    pub fn formatted_usd(&self) -> Option<&str> {
        self.formatted_usd.as_deref()
    }

    pub fn is_native(&self) -> bool {
        self.currency.is_native()
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Human readable amount, e.g. `0.1`
    pub fn formatted(&self) -> String {
        format_units(self.value, self.decimals).unwrap_or_else(|_| self.value.to_string())
    }

    /// Attach a USD valuation given the price of one whole unit
    pub fn with_usd_rate(mut self, usd_per_unit: f64) -> Self {
        let amount = crate::constants::unscale_from_decimals(self.value, self.decimals);
        self.formatted_usd = Some(format!("{:.2}", amount * usd_per_unit));
        self
    }

    pub fn same_currency(&self, other: &Money) -> bool {
        self.currency == other.currency && self.symbol == other.symbol
    }

    pub fn add(&self, other: &Money) -> Result<Money> {
        self.ensure_same_currency(other, "add")?;
        let value = self
            .value
            .checked_add(other.value)
            .ok_or_else(|| MintError::invalid_input("Money addition overflowed"))?;
        Ok(self.with_value(value))
    }

    /// Subtract `other`; fails if the result would be negative
    pub fn subtract(&self, other: &Money) -> Result<Money> {
        self.ensure_same_currency(other, "subtract")?;
        let value = self.value.checked_sub(other.value).ok_or_else(|| {
            MintError::invalid_input(format!(
                "Cannot subtract {} from {}",
                other, self
            ))
        })?;
        Ok(self.with_value(value))
    }

    /// Subtract `other`, flooring at zero
    pub fn saturating_subtract(&self, other: &Money) -> Result<Money> {
        self.ensure_same_currency(other, "subtract")?;
        Ok(self.with_value(self.value.saturating_sub(other.value)))
    }

    pub fn multiply(&self, factor: u64) -> Result<Money> {
        let value = self
            .value
            .checked_mul(U256::from(factor))
            .ok_or_else(|| MintError::invalid_input("Money multiplication overflowed"))?;
        Ok(self.with_value(value))
    }

    pub fn compare(&self, other: &Money) -> Result<Ordering> {
        self.ensure_same_currency(other, "compare")?;
        Ok(self.value.cmp(&other.value))
    }

    pub fn gte(&self, other: &Money) -> Result<bool> {
        Ok(self.compare(other)? != Ordering::Less)
    }

    fn with_value(&self, value: U256) -> Money {
        Money {
            value,
            decimals: self.decimals,
            currency: self.currency,
            symbol: self.symbol.clone(),
            network_id: self.network_id,
            formatted_usd: None,
        }
    }

    fn ensure_same_currency(&self, other: &Money, op: &str) -> Result<()> {
        if self.same_currency(other) {
            return Ok(());
        }
        Err(MintError::invalid_input(format!(
            "Cannot {} {} and {}: currency mismatch",
            op, self.symbol, other.symbol
        )))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.formatted(), self.symbol)
    }
}

/// Cost split into a native bucket and one bucket per token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cost {
    pub native: Money,
    pub tokens: Vec<Money>,
}

impl Cost {
    /// Zero cost in the native currency of a network
    pub fn zero(native_symbol: &str, network_id: u64) -> Self {
        Self {
            native: Money::native(U256::ZERO, native_symbol, network_id),
            tokens: Vec::new(),
        }
    }

    /// Add an amount to the matching bucket
    pub fn add_money(&mut self, amount: &Money) -> Result<()> {
        if amount.is_native() {
            self.native = self.native.add(amount)?;
            return Ok(());
        }
        match self.tokens.iter_mut().find(|t| t.same_currency(amount)) {
            Some(existing) => *existing = existing.add(amount)?,
            None => self.tokens.push(amount.clone()),
        }
        Ok(())
    }

    /// Bucket-wise sum of two costs
    pub fn add(&self, other: &Cost) -> Result<Cost> {
        let mut sum = self.clone();
        sum.add_money(&other.native)?;
        for token in &other.tokens {
            sum.add_money(token)?;
        }
        Ok(sum)
    }

    /// Every bucket scaled by `factor`
    pub fn multiply(&self, factor: u64) -> Result<Cost> {
        Ok(Cost {
            native: self.native.multiply(factor)?,
            tokens: self
                .tokens
                .iter()
                .map(|t| t.multiply(factor))
                .collect::<Result<Vec<_>>>()?,
        })
    }

    pub fn token(&self, token: Address) -> Option<&Money> {
        self.tokens
            .iter()
            .find(|t| t.currency() == Currency::Token(token))
    }
}

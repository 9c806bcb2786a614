//! Purchase preparation
//!
//! Turns a purchase intent into a priced, ordered step plan. The result is always a
//! complete [`PreparedPurchase`]: rule failures and insufficient balances are
//! reported inside it so callers can render the reason next to the cost. Only input
//! errors and unrecoverable read failures are raised.

use crate::config::{EngineConfig, GasBuffer, NetworkConfig};
use crate::constants::{unix_now, DEFAULT_DEPENDENT_STEP_GAS};
use crate::contracts::IERC20;
use crate::error::{ErrorCode, MintError, Result};
use crate::money::{Cost, Currency, Money};
use crate::price::UsdRateSource;
use crate::product::{ClaimState, Product, ProductKind};
use crate::provider::{CallRequest, PublicProvider};
use crate::types::{
    Ineligibility, MintIntent, PreparedPurchase, PurchaseCost, PurchaseParams, RawTransaction,
    StepAction, TransactionStep,
};
use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;
use std::sync::Arc;

pub const APPROVE_STEP_ID: &str = "approve";
pub const MINT_STEP_ID: &str = "mint";

/// What a step waits on when it cannot be simulated yet
enum Precondition<'a> {
    Ready,
    /// An earlier approve step in the same plan
    Approval,
    /// The buyer holding the quoted amounts
    Funds(&'a Quote),
}

/// Everything resolved about a purchase before steps are built
struct Quote {
    network_id: u64,
    buyer: Address,
    recipient: Address,
    quantity: u32,
    minted_before: u32,
    claim: ClaimState,
    /// Price of one unit: fee (+ price when native) in the native bucket, price in a token bucket
    unit_cost: Cost,
    /// Unit cost x quantity
    subtotal: Cost,
}

impl Quote {
    fn native_value(&self) -> U256 {
        self.subtotal.native.value()
    }

    fn token_amount(&self) -> Option<&Money> {
        self.subtotal.tokens.first()
    }
}

pub struct PurchasePreparer {
    provider: PublicProvider,
    config: EngineConfig,
    rates: Option<Arc<dyn UsdRateSource>>,
}

impl PurchasePreparer {
    pub fn new(provider: PublicProvider, config: EngineConfig) -> Self {
        Self {
            provider,
            config,
            rates: None,
        }
    }

    /// Attach USD valuations to totals
    pub fn with_rate_source(mut self, rates: Arc<dyn UsdRateSource>) -> Self {
        self.rates = Some(rates);
        self
    }

    pub fn provider(&self) -> &PublicProvider {
        &self.provider
    }

    /// Prepare a purchase of `product`
    pub async fn prepare(&self, product: &Product, params: PurchaseParams) -> Result<PreparedPurchase> {
        params.validate()?;

        let network_id = params.network_id.unwrap_or(product.data.network_id);
        let network = self.config.network(network_id)?;
        if !self.provider.supports(network_id) {
            return Err(MintError::unsupported_network(network_id));
        }
        let recipient = params.recipient();
        if product.kind() == ProductKind::BlindMint && recipient != params.address {
            return Err(MintError::invalid_input(
                "BlindMint reservations are always made for the buyer",
            ));
        }

        let quote = self.quote(product, &params, network).await?;
        tracing::debug!(
            product = %product.data.title,
            network_id,
            quantity = params.quantity,
            minted_before = quote.minted_before,
            "Resolved purchase quote"
        );

        let rules = product.evaluate_rules(
            &quote.claim,
            quote.minted_before,
            quote.quantity,
            recipient,
            unix_now(),
        );
        if let Some(reason) = rules {
            tracing::info!(
                product = %product.data.title,
                code = %reason.code,
                reason = %reason.message,
                "Purchase not eligible"
            );
            let total = self.with_usd(quote.subtotal.clone()).await;
            return Ok(PreparedPurchase {
                is_eligible: false,
                ineligibility_reason: Some(reason),
                missing_funds: Vec::new(),
                cost: PurchaseCost {
                    per_step: Vec::new(),
                    per_step_gas: Vec::new(),
                    total,
                    gas: Money::native(U256::ZERO, &network.native_symbol, network_id),
                },
                steps: Vec::new(),
            });
        }

        let gas_buffer = params.gas_buffer.unwrap_or(self.config.gas_buffer);
        let steps = self.build_steps(product, &quote, network, gas_buffer).await?;
        let gas_price = self.provider.gas_price(network_id).await?;

        let mut per_step = Vec::with_capacity(steps.len());
        let mut per_step_gas = Vec::with_capacity(steps.len());
        let mut total = Cost::zero(&network.native_symbol, network_id);
        let mut gas = Money::native(U256::ZERO, &network.native_symbol, network_id);
        for step in &steps {
            let cost = step
                .cost()
                .cloned()
                .unwrap_or_else(|| Cost::zero(&network.native_symbol, network_id));
            total = total.add(&cost)?;
            per_step.push(cost);

            let fee = U256::from(step.raw_transaction().gas_estimate) * U256::from(gas_price);
            let fee = Money::native(fee, &network.native_symbol, network_id);
            gas = gas.add(&fee)?;
            per_step_gas.push(fee);
        }

        let mut prepared = PreparedPurchase {
            is_eligible: true,
            ineligibility_reason: None,
            missing_funds: Vec::new(),
            cost: PurchaseCost {
                per_step,
                per_step_gas,
                total,
                gas,
            },
            steps,
        };

        if let Some(account) = params.account {
            let required = prepared.cost.required()?;
            let missing = self.missing_funds(account, &required).await?;
            if !missing.is_empty() {
                let summary: Vec<String> = missing.iter().map(|m| m.to_string()).collect();
                tracing::info!(%account, missing = %summary.join(", "), "Insufficient funds for purchase");
                prepared.is_eligible = false;
                prepared.ineligibility_reason = Some(Ineligibility::new(
                    ErrorCode::InsufficientFunds,
                    format!("Insufficient funds: missing {}", summary.join(", ")),
                ));
                prepared.missing_funds = missing;
            }
        }

        prepared.cost.total = self.with_usd(prepared.cost.total).await;
        prepared.cost.gas = self.usd_value(prepared.cost.gas).await;
        Ok(prepared)
    }

    async fn quote(&self, product: &Product, params: &PurchaseParams, network: &NetworkConfig) -> Result<Quote> {
        let network_id = network.chain_id;
        let recipient = params.recipient();
        let reference = &product.reference;

        let claim = reference
            .fetch_claim(&self.provider, network_id)
            .await?
            .with_catalog(&product.data);
        let minted_before = reference
            .fetch_wallet_mints(&self.provider, network_id, recipient)
            .await?;

        let fee = Money::native(claim.mint_fee, &network.native_symbol, network_id);
        let mut unit_cost = Cost::zero(&network.native_symbol, network_id);
        unit_cost.add_money(&fee)?;
        match claim.currency {
            Currency::Native => {
                unit_cost.add_money(&Money::native(claim.unit_price, &network.native_symbol, network_id))?;
            }
            Currency::Token(token) => {
                let metadata = self.provider.token_metadata(network_id, token).await?;
                unit_cost.add_money(&Money::token(
                    claim.unit_price,
                    token,
                    metadata.decimals,
                    metadata.symbol,
                    network_id,
                ))?;
            }
        }
        let subtotal = unit_cost.multiply(params.quantity as u64)?;

        Ok(Quote {
            network_id,
            buyer: params.address,
            recipient,
            quantity: params.quantity,
            minted_before,
            claim,
            unit_cost,
            subtotal,
        })
    }

    async fn build_steps(
        &self,
        product: &Product,
        quote: &Quote,
        network: &NetworkConfig,
        gas_buffer: GasBuffer,
    ) -> Result<Vec<TransactionStep>> {
        let network_id = quote.network_id;
        let extension = product.reference.extension;
        let mut steps = Vec::new();

        // Token payments need an allowance for the extension; approve exactly what is needed
        if let Some(amount) = quote.token_amount() {
            let token = amount.currency_address();
            let allowance = self
                .provider
                .allowance(network_id, token, quote.buyer, extension)
                .await?;
            if allowance < amount.value() {
                tracing::debug!(%token, %allowance, required = %amount.value(), "Allowance insufficient, adding approve step");
                let data: Bytes = IERC20::approveCall {
                    spender: extension,
                    amount: amount.value(),
                }
                .abi_encode()
                .into();
                let request = CallRequest::new(token, data.clone()).from(quote.buyer);
                let gas = self
                    .estimate(network_id, request, gas_buffer, Precondition::Ready)
                    .await?;
                let raw = RawTransaction {
                    contract_address: token,
                    call_data: data,
                    native_value: U256::ZERO,
                    gas_estimate: gas,
                    network_id,
                };
                let cost = Cost::zero(&network.native_symbol, network_id);
                let action = StepAction::Approve {
                    token,
                    owner: quote.buyer,
                    spender: extension,
                    amount: amount.value(),
                };
                steps.push(
                    TransactionStep::new(APPROVE_STEP_ID, format!("Approve {}", amount.symbol()), raw, action)
                        .with_cost(cost),
                );
            }
        }

        let allowlist = product.data.audience_restriction.entry(quote.recipient);
        let data = product
            .reference
            .mint_call(quote.quantity, quote.recipient, allowlist)?;
        let value = quote.native_value();
        let request = CallRequest::new(extension, data.clone())
            .from(quote.buyer)
            .value(value);
        let precondition = if steps.is_empty() {
            Precondition::Funds(quote)
        } else {
            Precondition::Approval
        };
        let gas = self
            .estimate(network_id, request, gas_buffer, precondition)
            .await?;

        let raw = RawTransaction {
            contract_address: extension,
            call_data: data,
            native_value: value,
            gas_estimate: gas,
            network_id,
        };
        let cost = step_cost(network, value, quote.token_amount())?;
        let intent = MintIntent {
            product: product.reference.clone(),
            quantity: quote.quantity,
            recipient: quote.recipient,
            minted_before: quote.minted_before,
            token_id: quote.claim.token_id,
            unit_cost: quote.unit_cost.clone(),
        };
        steps.push(
            TransactionStep::new(MINT_STEP_ID, format!("Mint {}", product.data.title), raw, StepAction::Mint(intent))
                .with_cost(cost),
        );

        Ok(steps)
    }

    /// Buffered gas estimate, or the fallback when estimation cannot succeed yet
    ///
    /// A node refuses to simulate a mint the buyer cannot pay for, so a failed
    /// estimate is only an error when the step's precondition already holds.
    async fn estimate(
        &self,
        network_id: u64,
        request: CallRequest,
        gas_buffer: GasBuffer,
        precondition: Precondition<'_>,
    ) -> Result<u64> {
        let e = match self.provider.estimate_contract_gas(network_id, request).await {
            Ok(estimate) => return Ok(gas_buffer.apply(estimate)),
            Err(e) if e.code != ErrorCode::EstimationFailed => return Err(e),
            Err(e) => e,
        };

        let pending = match precondition {
            Precondition::Ready => None,
            Precondition::Approval => Some("approval"),
            Precondition::Funds(quote) => {
                let missing = self.missing_funds(quote.buyer, &quote.subtotal).await?;
                (!missing.is_empty()).then_some("funds")
            }
        };
        match (self.config.fallback_gas, pending) {
            (Some(fallback), _) => {
                tracing::warn!(fallback, error = %e, "Gas estimation failed, using fallback gas");
                Ok(fallback)
            }
            (None, Some(pending)) => {
                tracing::debug!(
                    fallback = DEFAULT_DEPENDENT_STEP_GAS,
                    pending,
                    "Step cannot be simulated yet, using default gas"
                );
                Ok(DEFAULT_DEPENDENT_STEP_GAS)
            }
            (None, None) => Err(e),
        }
    }

    /// Shortfall per currency bucket; each bucket must be covered on its own
    async fn missing_funds(&self, account: Address, total: &Cost) -> Result<Vec<Money>> {
        let network_id = total.native.network_id();
        let mut missing = Vec::new();

        let native = self.provider.get_balance(account, network_id, None).await?;
        if native < total.native.value() {
            missing.push(Money::new(
                total.native.value() - native,
                total.native.decimals(),
                Currency::Native,
                total.native.symbol(),
                network_id,
            ));
        }

        for required in &total.tokens {
            let token = required.currency_address();
            let balance = self.provider.get_balance(account, network_id, Some(token)).await?;
            if balance < required.value() {
                missing.push(Money::new(
                    required.value() - balance,
                    required.decimals(),
                    required.currency(),
                    required.symbol(),
                    network_id,
                ));
            }
        }
        Ok(missing)
    }

    async fn with_usd(&self, mut total: Cost) -> Cost {
        total.native = self.usd_value(total.native).await;
        let mut tokens = Vec::with_capacity(total.tokens.len());
        for token in total.tokens {
            tokens.push(self.usd_value(token).await);
        }
        total.tokens = tokens;
        total
    }

    /// Attach a USD valuation to one amount when a quote is available
    async fn usd_value(&self, amount: Money) -> Money {
        let Some(rates) = &self.rates else {
            return amount;
        };
        match rates.usd_rate(amount.symbol()).await {
            Ok(rate) => amount.with_usd_rate(rate),
            Err(e) => {
                tracing::warn!(symbol = %amount.symbol(), error = %e, "USD quote unavailable");
                amount
            }
        }
    }
}

/// Native value in the native bucket, token amount in its own bucket
fn step_cost(network: &NetworkConfig, native_value: U256, token_amount: Option<&Money>) -> Result<Cost> {
    let mut cost = Cost::zero(&network.native_symbol, network.chain_id);
    cost.add_money(&Money::native(native_value, &network.native_symbol, network.chain_id))?;
    if let Some(amount) = token_amount {
        cost.add_money(amount)?;
    }
    Ok(cost)
}

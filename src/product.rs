//! Products: catalog snapshot, on-chain claim state and purchase rules
//!
//! A product is a claim instance on a claim extension contract. The catalog
//! snapshot ([`ProductData`]) is read-only input supplied by the caller; the claim
//! state ([`ClaimState`]) is read from the extension for every preparation and wins
//! wherever the contract defines a value.

use crate::contracts::{IBlindMint, IEditionClaim};
use crate::error::{ErrorCode, MintError, Result};
use crate::money::Currency;
use crate::provider::PublicProvider;
use crate::types::Ineligibility;
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::sol_types::SolCall;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    /// Fixed or open edition: every unit mints the same token
    Edition,
    /// Gacha-style drop: units are reserved and revealed later
    BlindMint,
}

/// On-chain identity of a product
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ProductRef {
    pub kind: ProductKind,
    /// Claim extension contract that sells the product
    pub extension: Address,
    /// Creator token contract the extension mints on
    pub creator_contract: Address,
    pub instance_id: U256,
}

/// Allowlist data for one address
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowlistEntry {
    pub mint_indices: Vec<u32>,
    /// One proof per mint index
    pub merkle_proofs: Vec<Vec<B256>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AudienceRestriction {
    #[default]
    None,
    Allowlist(HashMap<Address, AllowlistEntry>),
}

impl AudienceRestriction {
    pub fn entry(&self, address: Address) -> Option<&AllowlistEntry> {
        match self {
            Self::None => None,
            Self::Allowlist(entries) => entries.get(&address),
        }
    }
}

/// Catalog snapshot of a product
#[derive(Debug, Clone, Default)]
pub struct ProductData {
    pub title: String,
    pub network_id: u64,
    /// Payment token; `None` or the zero address means native currency
    pub currency: Option<Address>,
    pub unit_price: Option<U256>,
    pub total_max: Option<u32>,
    pub wallet_max: Option<u32>,
    /// Unix seconds
    pub start_date: Option<u64>,
    pub end_date: Option<u64>,
    pub audience_restriction: AudienceRestriction,
}

impl ProductData {
    pub fn new(title: impl Into<String>, network_id: u64) -> Self {
        Self {
            title: title.into(),
            network_id,
            ..Default::default()
        }
    }
}

/// A purchasable product
#[derive(Debug, Clone)]
pub struct Product {
    pub reference: ProductRef,
    pub data: ProductData,
}

impl Product {
    pub fn edition(
        extension: Address,
        creator_contract: Address,
        instance_id: U256,
        data: ProductData,
    ) -> Self {
        Self {
            reference: ProductRef {
                kind: ProductKind::Edition,
                extension,
                creator_contract,
                instance_id,
            },
            data,
        }
    }

    pub fn blind_mint(
        extension: Address,
        creator_contract: Address,
        instance_id: U256,
        data: ProductData,
    ) -> Self {
        Self {
            reference: ProductRef {
                kind: ProductKind::BlindMint,
                extension,
                creator_contract,
                instance_id,
            },
            data,
        }
    }

    pub fn kind(&self) -> ProductKind {
        self.reference.kind
    }

    /// First failing purchase rule, if any
    ///
    /// Order: not started, ended, sold out, wallet limit, audience restriction.
    pub fn evaluate_rules(
        &self,
        claim: &ClaimState,
        minted_by_recipient: u32,
        quantity: u32,
        recipient: Address,
        now: u64,
    ) -> Option<Ineligibility> {
        if let Some(reason) = claim.availability(quantity, now) {
            return Some(reason);
        }

        if let Some(wallet_max) = claim.wallet_max {
            if minted_by_recipient.saturating_add(quantity) > wallet_max {
                let left = wallet_max.saturating_sub(minted_by_recipient);
                return Some(Ineligibility::new(
                    ErrorCode::LimitReached,
                    format!("Wallet limit reached: {} more allowed of {}", left, wallet_max),
                ));
            }
        }

        match &self.data.audience_restriction {
            AudienceRestriction::Allowlist(entries) => match entries.get(&recipient) {
                None => Some(Ineligibility::new(
                    ErrorCode::NotEligible,
                    "Address is not on the allowlist",
                )),
                Some(entry) if (entry.mint_indices.len() as u64) < quantity as u64 => {
                    Some(Ineligibility::new(
                        ErrorCode::NotEligible,
                        format!("Allowlist allows {} mints", entry.mint_indices.len()),
                    ))
                }
                Some(_) => None,
            },
            AudienceRestriction::None if claim.merkle_gated => Some(Ineligibility::new(
                ErrorCode::NotEligible,
                "Claim is restricted to an allowlist",
            )),
            AudienceRestriction::None => None,
        }
    }
}

/// Claim state as reported by the extension contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimState {
    pub total_minted: u32,
    /// `None` = unlimited
    pub total_max: Option<u32>,
    pub wallet_max: Option<u32>,
    pub start_date: Option<u64>,
    pub end_date: Option<u64>,
    pub currency: Currency,
    pub unit_price: U256,
    /// Platform fee per unit, always native
    pub mint_fee: U256,
    /// Edition token id; unknown for BlindMint until reveal
    pub token_id: Option<U256>,
    pub merkle_gated: bool,
}

fn non_zero<T: PartialEq + Default>(value: T) -> Option<T> {
    (value != T::default()).then_some(value)
}

impl ClaimState {
    /// Fill fields the contract leaves unset from the catalog snapshot
    pub fn with_catalog(mut self, data: &ProductData) -> Self {
        self.total_max = self.total_max.or(data.total_max.and_then(non_zero));
        self.wallet_max = self.wallet_max.or(data.wallet_max.and_then(non_zero));
        self.start_date = self.start_date.or(data.start_date.and_then(non_zero));
        self.end_date = self.end_date.or(data.end_date.and_then(non_zero));
        if self.currency.is_native() && self.unit_price.is_zero() {
            if let Some(currency) = data.currency {
                self.currency = Currency::from_address(currency);
            }
            if let Some(price) = data.unit_price {
                self.unit_price = price;
            }
        }
        self
    }

    pub fn remaining(&self) -> Option<u32> {
        self.total_max
            .map(|max| max.saturating_sub(self.total_minted))
    }

    /// Timing and supply rules, the part of the rules that only depends on the claim
    pub fn availability(&self, quantity: u32, now: u64) -> Option<Ineligibility> {
        if let Some(start) = self.start_date {
            if now < start {
                return Some(Ineligibility::new(
                    ErrorCode::NotStarted,
                    format!("Sale starts at {}", start),
                ));
            }
        }
        if let Some(end) = self.end_date {
            if now >= end {
                return Some(Ineligibility::new(ErrorCode::Ended, "Sale has ended"));
            }
        }
        match self.remaining() {
            Some(0) => Some(Ineligibility::new(ErrorCode::SoldOut, "Sold out")),
            Some(remaining) if quantity > remaining => Some(Ineligibility::new(
                ErrorCode::SoldOut,
                format!("Only {} items remaining", remaining),
            )),
            _ => None,
        }
    }
}

impl ProductRef {
    /// Read the claim from the extension contract
    pub async fn fetch_claim(&self, provider: &PublicProvider, network_id: u64) -> Result<ClaimState> {
        match self.kind {
            ProductKind::Edition => {
                let claim = provider
                    .read_contract(
                        network_id,
                        self.extension,
                        &IEditionClaim::getClaimCall {
                            creatorContractAddress: self.creator_contract,
                            instanceId: self.instance_id,
                        },
                    )
                    .await?;
                let merkle_gated = claim.merkleRoot != B256::ZERO;
                let mint_fee = if merkle_gated {
                    provider
                        .read_contract(network_id, self.extension, &IEditionClaim::MINT_FEE_MERKLECall {})
                        .await?
                } else {
                    provider
                        .read_contract(network_id, self.extension, &IEditionClaim::MINT_FEECall {})
                        .await?
                };

                Ok(ClaimState {
                    total_minted: claim.total,
                    total_max: non_zero(claim.totalMax),
                    wallet_max: non_zero(claim.walletMax),
                    start_date: non_zero(claim.startDate.to::<u64>()),
                    end_date: non_zero(claim.endDate.to::<u64>()),
                    currency: Currency::from_address(claim.erc20),
                    unit_price: claim.cost,
                    mint_fee,
                    token_id: non_zero(claim.tokenId),
                    merkle_gated,
                })
            }
            ProductKind::BlindMint => {
                let claim = provider
                    .read_contract(
                        network_id,
                        self.extension,
                        &IBlindMint::getClaimCall {
                            creatorContractAddress: self.creator_contract,
                            instanceId: self.instance_id,
                        },
                    )
                    .await?;
                let mint_fee = provider
                    .read_contract(network_id, self.extension, &IBlindMint::MINT_FEECall {})
                    .await?;

                Ok(ClaimState {
                    total_minted: claim.total,
                    total_max: non_zero(claim.totalMax),
                    wallet_max: None,
                    start_date: non_zero(claim.startDate.to::<u64>()),
                    end_date: non_zero(claim.endDate.to::<u64>()),
                    currency: Currency::from_address(claim.erc20),
                    unit_price: claim.cost,
                    mint_fee,
                    token_id: None,
                    merkle_gated: false,
                })
            }
        }
    }

    /// Units `recipient` has minted (or reserved) on this claim
    pub async fn fetch_wallet_mints(
        &self,
        provider: &PublicProvider,
        network_id: u64,
        recipient: Address,
    ) -> Result<u32> {
        match self.kind {
            ProductKind::Edition => {
                provider
                    .read_contract(
                        network_id,
                        self.extension,
                        &IEditionClaim::getTotalMintsCall {
                            minter: recipient,
                            creatorContractAddress: self.creator_contract,
                            instanceId: self.instance_id,
                        },
                    )
                    .await
            }
            ProductKind::BlindMint => {
                let mints = provider
                    .read_contract(
                        network_id,
                        self.extension,
                        &IBlindMint::getUserMintsCall {
                            minter: recipient,
                            creatorContractAddress: self.creator_contract,
                            instanceId: self.instance_id,
                        },
                    )
                    .await?;
                Ok(mints.reservedCount)
            }
        }
    }

    /// Calldata of the mint call
    ///
    /// BlindMint reservations always go to the sender, so `recipient` only applies to
    /// editions.
    pub fn mint_call(
        &self,
        quantity: u32,
        recipient: Address,
        allowlist: Option<&AllowlistEntry>,
    ) -> Result<Bytes> {
        match self.kind {
            ProductKind::Edition => {
                let mint_count = u16::try_from(quantity).map_err(|_| {
                    MintError::invalid_input(format!("Cannot mint {} units in one call", quantity))
                })?;
                let (mint_indices, merkle_proofs) = match allowlist {
                    Some(entry) => (
                        entry.mint_indices.iter().take(quantity as usize).copied().collect(),
                        entry.merkle_proofs.iter().take(quantity as usize).cloned().collect(),
                    ),
                    None => (Vec::new(), Vec::new()),
                };
                let call = IEditionClaim::mintProxyCall {
                    creatorContractAddress: self.creator_contract,
                    instanceId: self.instance_id,
                    mintCount: mint_count,
                    mintIndices: mint_indices,
                    merkleProofs: merkle_proofs,
                    mintFor: recipient,
                };
                Ok(call.abi_encode().into())
            }
            ProductKind::BlindMint => {
                let call = IBlindMint::mintReserveCall {
                    creatorContractAddress: self.creator_contract,
                    instanceId: self.instance_id,
                    mintCount: quantity,
                };
                Ok(call.abi_encode().into())
            }
        }
    }
}

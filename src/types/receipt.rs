//! Execution receipts

use crate::contracts::{IERC1155, IERC721};
use crate::money::Cost;
use alloy::primitives::{Address, Log, TxHash, U256};
use alloy::sol_types::SolEvent;
use serde::Serialize;

/// Outcome of a confirmed (or skipped) step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptStatus {
    Success,
    Reverted,
}

/// One minted token in an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItem {
    /// `None` while a BlindMint reservation is unrevealed
    pub token_id: Option<U256>,
    pub quantity: u64,
    /// Price paid for this line (unit price x quantity, excluding gas)
    pub cost: Cost,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Order {
    pub items: Vec<OrderItem>,
}

impl Order {
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

/// Result of executing one step
#[derive(Debug, Clone, Serialize)]
pub struct Receipt {
    pub transaction_hash: TxHash,
    pub status: ReceiptStatus,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    /// Present for mint steps only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
    /// Raw logs of the transaction, used to decode the order
    #[serde(skip)]
    pub logs: Vec<Log>,
}

impl Receipt {
    /// Receipt for a step whose effect was already on-chain; no transaction was sent
    pub fn already_satisfied() -> Self {
        Self {
            transaction_hash: TxHash::ZERO,
            status: ReceiptStatus::Success,
            block_number: None,
            gas_used: 0,
            order: None,
            logs: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ReceiptStatus::Success
    }

    /// True when no transaction backs this receipt
    pub fn is_synthetic(&self) -> bool {
        self.transaction_hash == TxHash::ZERO
    }

    pub fn with_order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    /// Tokens minted to `recipient` by `token_contract`, aggregated by id
    pub fn minted_tokens(&self, token_contract: Address, recipient: Address) -> Vec<(U256, u64)> {
        let mut minted: Vec<(U256, u64)> = Vec::new();
        let mut push = |id: U256, quantity: u64| match minted.iter_mut().find(|(t, _)| *t == id) {
            Some((_, q)) => *q += quantity,
            None => minted.push((id, quantity)),
        };

        for log in self.logs.iter().filter(|l| l.address == token_contract) {
            if let Ok(event) = IERC1155::TransferSingle::decode_log_data(&log.data) {
                if event.from == Address::ZERO && event.to == recipient {
                    push(event.id, event.value.saturating_to());
                }
            } else if let Ok(event) = IERC1155::TransferBatch::decode_log_data(&log.data) {
                if event.from == Address::ZERO && event.to == recipient {
                    for (id, value) in event.ids.iter().zip(event.values.iter()) {
                        push(*id, value.saturating_to());
                    }
                }
            } else if let Ok(event) = IERC721::Transfer::decode_log_data(&log.data) {
                if event.from == Address::ZERO && event.to == recipient {
                    push(event.tokenId, 1);
                }
            }
        }
        minted
    }
}

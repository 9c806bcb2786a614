//! Transaction steps produced by the preparer

use crate::money::Cost;
use crate::product::ProductRef;
use alloy::primitives::{Address, Bytes, U256};
use serde::Serialize;
use std::fmt;

/// What a step does on-chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Approve,
    Mint,
    Other,
}

/// Lifecycle of a step: `Idle -> Executing -> Completed | Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    #[default]
    Idle,
    Executing,
    Completed,
    Failed,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Executing => "executing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// The call a step submits
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawTransaction {
    pub contract_address: Address,
    pub call_data: Bytes,
    /// Wei attached to the call
    pub native_value: U256,
    /// Buffered gas limit
    pub gas_estimate: u64,
    pub network_id: u64,
}

/// Mint parameters the executor needs to re-validate and detect completed mints
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MintIntent {
    pub product: ProductRef,
    pub quantity: u32,
    pub recipient: Address,
    /// Units the recipient held on this claim when the plan was prepared
    pub minted_before: u32,
    /// Token minted by an Edition claim; unknown for BlindMint until reveal
    pub token_id: Option<U256>,
    /// Price of one unit (excluding gas)
    pub unit_cost: Cost,
}

/// Intent behind a step, used for idempotency checks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum StepAction {
    Approve {
        token: Address,
        owner: Address,
        spender: Address,
        amount: U256,
    },
    Mint(MintIntent),
    Other,
}

/// One transaction in a step plan
///
/// The transaction data is fixed at preparation time; execution only moves `status`.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionStep {
    id: String,
    name: String,
    kind: StepKind,
    raw: RawTransaction,
    cost: Option<Cost>,
    action: StepAction,
    status: StepStatus,
}

impl TransactionStep {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        raw: RawTransaction,
        action: StepAction,
    ) -> Self {
        let kind = match action {
            StepAction::Approve { .. } => StepKind::Approve,
            StepAction::Mint(_) => StepKind::Mint,
            StepAction::Other => StepKind::Other,
        };
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            raw,
            cost: None,
            action,
            status: StepStatus::Idle,
        }
    }

    pub fn with_cost(mut self, cost: Cost) -> Self {
        self.cost = Some(cost);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> StepKind {
        self.kind
    }

    pub fn raw_transaction(&self) -> &RawTransaction {
        &self.raw
    }

    pub fn network_id(&self) -> u64 {
        self.raw.network_id
    }

    pub fn cost(&self) -> Option<&Cost> {
        self.cost.as_ref()
    }

    pub fn action(&self) -> &StepAction {
        &self.action
    }

    pub fn status(&self) -> StepStatus {
        self.status
    }

    pub(crate) fn set_status(&mut self, status: StepStatus) {
        tracing::debug!(step = %self.id, from = %self.status, to = %status, "Step status");
        self.status = status;
    }
}

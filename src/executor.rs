//! Step execution
//!
//! Runs prepared steps one at a time against an [`Account`]: confirm the network,
//! skip steps whose effect is already on-chain, re-check mint availability, submit,
//! then wait for confirmations.

use crate::account::{Account, TxRequest};
use crate::config::EngineConfig;
use crate::constants::unix_now;
use crate::error::{ErrorCode, MintError, Result};
use crate::network::NetworkSwitcher;
use crate::provider::PublicProvider;
use crate::types::{
    MintIntent, Order, OrderItem, PreparedPurchase, Receipt, StepAction, StepStatus, TransactionStep,
};
use alloy::primitives::TxHash;

/// Progress hooks; every method defaults to a no-op
pub trait StepCallbacks: Send + Sync {
    fn on_status(&self, _step: &TransactionStep, _status: StepStatus) {}

    fn on_submitted(&self, _step: &TransactionStep, _hash: TxHash) {}

    fn on_confirmed(&self, _step: &TransactionStep, _receipt: &Receipt) {}
}

pub struct StepExecutor {
    provider: PublicProvider,
    switcher: NetworkSwitcher,
}

impl StepExecutor {
    pub fn new(provider: PublicProvider, config: &EngineConfig) -> Self {
        Self {
            provider,
            switcher: NetworkSwitcher::new(config),
        }
    }

    pub fn with_switcher(mut self, switcher: NetworkSwitcher) -> Self {
        self.switcher = switcher;
        self
    }

    /// Execute one step and return its receipt
    ///
    /// A step whose effect is already on-chain completes with a synthetic receipt
    /// (zero hash) and nothing is sent.
    pub async fn execute<A: Account>(
        &self,
        step: &mut TransactionStep,
        account: &A,
        callbacks: Option<&dyn StepCallbacks>,
        confirmations: u64,
    ) -> Result<Receipt> {
        transition(step, StepStatus::Executing, callbacks);
        match self.run(step, account, callbacks, confirmations).await {
            Ok(receipt) => {
                transition(step, StepStatus::Completed, callbacks);
                if let Some(cb) = callbacks {
                    cb.on_confirmed(step, &receipt);
                }
                Ok(receipt)
            }
            Err(e) => {
                tracing::warn!(step = %step.id(), code = %e.code, error = %e.message, "Step failed");
                transition(step, StepStatus::Failed, callbacks);
                Err(e)
            }
        }
    }

    /// Execute every step of an eligible purchase in order
    ///
    /// Stops at the first failure; the error carries the receipts of the steps
    /// completed before it.
    pub async fn execute_all<A: Account>(
        &self,
        purchase: &mut PreparedPurchase,
        account: &A,
        callbacks: Option<&dyn StepCallbacks>,
        confirmations: u64,
    ) -> Result<Vec<Receipt>> {
        if !purchase.is_eligible {
            return Err(match &purchase.ineligibility_reason {
                Some(reason) => reason
                    .clone()
                    .into_error()
                    .with_missing_funds(purchase.missing_funds.clone()),
                None => MintError::new(ErrorCode::NotEligible, "Purchase is not eligible"),
            });
        }

        let mut receipts = Vec::with_capacity(purchase.steps.len());
        for step in purchase.steps.iter_mut() {
            match self.execute(step, account, callbacks, confirmations).await {
                Ok(receipt) => receipts.push(receipt),
                Err(e) => return Err(e.with_receipts(receipts)),
            }
        }
        Ok(receipts)
    }

    async fn run<A: Account>(
        &self,
        step: &TransactionStep,
        account: &A,
        callbacks: Option<&dyn StepCallbacks>,
        confirmations: u64,
    ) -> Result<Receipt> {
        let network_id = step.network_id();
        self.switcher.ensure_network(account, network_id).await?;

        if let Some(receipt) = self.already_satisfied(step).await? {
            tracing::info!(step = %step.id(), "Step already satisfied on-chain, skipping");
            return Ok(receipt);
        }

        if let StepAction::Mint(intent) = step.action() {
            let claim = intent.product.fetch_claim(&self.provider, network_id).await?;
            if let Some(reason) = claim.availability(intent.quantity, unix_now()) {
                return Err(reason.into_error());
            }
        }

        let hash = account
            .send_transaction(TxRequest::from(step.raw_transaction()))
            .await?;
        tracing::info!(step = %step.id(), %hash, network_id, "Transaction submitted");
        if let Some(cb) = callbacks {
            cb.on_submitted(step, hash);
        }

        let receipt = account.wait_for_transaction(hash, confirmations).await?;
        if !receipt.is_success() {
            return Err(MintError::new(
                ErrorCode::TransactionReverted,
                format!("Transaction {} for step '{}' reverted", hash, step.name()),
            )
            .with_failed_receipt(receipt));
        }
        tracing::info!(step = %step.id(), %hash, block = ?receipt.block_number, gas_used = receipt.gas_used, "Transaction confirmed");

        match step.action() {
            StepAction::Mint(intent) => {
                let order = order_from_receipt(intent, &receipt)?;
                Ok(receipt.with_order(order))
            }
            _ => Ok(receipt),
        }
    }

    /// Synthetic receipt when the step's effect can already be observed
    async fn already_satisfied(&self, step: &TransactionStep) -> Result<Option<Receipt>> {
        let network_id = step.network_id();
        match step.action() {
            StepAction::Approve {
                token,
                owner,
                spender,
                amount,
            } => {
                let allowance = self
                    .provider
                    .allowance(network_id, *token, *owner, *spender)
                    .await?;
                Ok((allowance >= *amount).then(Receipt::already_satisfied))
            }
            StepAction::Mint(intent) => {
                let minted = intent
                    .product
                    .fetch_wallet_mints(&self.provider, network_id, intent.recipient)
                    .await?;
                if minted < intent.minted_before.saturating_add(intent.quantity) {
                    return Ok(None);
                }
                let order = fallback_order(intent)?;
                Ok(Some(Receipt::already_satisfied().with_order(order)))
            }
            StepAction::Other => Ok(None),
        }
    }
}

fn transition(step: &mut TransactionStep, status: StepStatus, callbacks: Option<&dyn StepCallbacks>) {
    step.set_status(status);
    if let Some(cb) = callbacks {
        cb.on_status(step, status);
    }
}

/// Minted tokens decoded from the receipt logs
fn order_from_receipt(intent: &MintIntent, receipt: &Receipt) -> Result<Order> {
    let minted = receipt.minted_tokens(intent.product.creator_contract, intent.recipient);
    if minted.is_empty() {
        return fallback_order(intent);
    }
    let items = minted
        .into_iter()
        .map(|(token_id, quantity)| {
            Ok(OrderItem {
                token_id: Some(token_id),
                quantity,
                cost: intent.unit_cost.multiply(quantity)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Order { items })
}

/// Order built from the intent when no mint logs are available (BlindMint reservations)
fn fallback_order(intent: &MintIntent) -> Result<Order> {
    let quantity = intent.quantity as u64;
    Ok(Order {
        items: vec![OrderItem {
            token_id: intent.token_id,
            quantity,
            cost: intent.unit_cost.multiply(quantity)?,
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::unit;
    use crate::preparer::{PurchasePreparer, APPROVE_STEP_ID, MINT_STEP_ID};
    use crate::testing::{
        blind_mint_product, edition_product, MockAccount, MockChain, BASE, BUYER, RECIPIENT, USDC,
    };
    use crate::types::{PurchaseParams, StepKind};
    use alloy::primitives::U256;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct Recorder {
        statuses: Mutex<Vec<(String, StepStatus)>>,
        submitted: Mutex<Vec<TxHash>>,
        confirmed: Mutex<usize>,
    }

    impl StepCallbacks for Recorder {
        fn on_status(&self, step: &TransactionStep, status: StepStatus) {
            self.statuses.lock().unwrap().push((step.id().to_string(), status));
        }

        fn on_submitted(&self, _step: &TransactionStep, hash: TxHash) {
            self.submitted.lock().unwrap().push(hash);
        }

        fn on_confirmed(&self, _step: &TransactionStep, _receipt: &Receipt) {
            *self.confirmed.lock().unwrap() += 1;
        }
    }

    fn executor(chain: &MockChain) -> StepExecutor {
        let config = chain.config();
        StepExecutor::new(chain.provider(), &config)
            .with_switcher(NetworkSwitcher::new(&config).with_polling(Duration::from_millis(1), 5))
    }

    async fn prepare(chain: &MockChain, params: PurchaseParams) -> PreparedPurchase {
        PurchasePreparer::new(chain.provider(), chain.config())
            .prepare(&edition_product(chain), params)
            .await
            .unwrap()
    }

    fn usdc_edition(chain: &MockChain) {
        chain.set_edition_claim(|c| {
            c.erc20 = USDC;
            c.cost = U256::from(5_000_000u64);
        });
        chain.set_token_balance(USDC, BUYER, U256::from(100_000_000u64));
        chain.set_native_balance(BUYER, unit(18));
    }

    #[tokio::test]
    async fn test_native_purchase_end_to_end() {
        let chain = MockChain::new();
        let price = unit(18) / U256::from(10u64);
        chain.set_edition_claim(|c| c.cost = price);
        chain.set_mint_fee(U256::ZERO);
        chain.set_native_balance(BUYER, unit(18));
        let account = MockAccount::new(&chain, BUYER);

        let mut purchase = prepare(&chain, PurchaseParams::new(BUYER, 1)).await;
        assert_eq!(purchase.steps.len(), 1);
        let recorder = Recorder::default();

        let receipts = executor(&chain)
            .execute_all(&mut purchase, &account, Some(&recorder), 1)
            .await
            .unwrap();

        assert_eq!(receipts.len(), 1);
        let receipt = &receipts[0];
        assert!(receipt.is_success());
        assert!(!receipt.is_synthetic());
        let order = receipt.order.as_ref().unwrap();
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].quantity, 1);
        assert_eq!(order.items[0].token_id, Some(chain.edition_token_id()));
        assert_eq!(order.items[0].cost.native.value(), price);

        assert_eq!(purchase.steps[0].status(), StepStatus::Completed);
        let statuses: Vec<StepStatus> = recorder.statuses.lock().unwrap().iter().map(|(_, s)| *s).collect();
        assert_eq!(statuses, vec![StepStatus::Executing, StepStatus::Completed]);
        assert_eq!(recorder.submitted.lock().unwrap().len(), 1);
        assert_eq!(*recorder.confirmed.lock().unwrap(), 1);
        assert_eq!(chain.edition_mints(BUYER), 1);
    }

    #[tokio::test]
    async fn test_token_purchase_approve_then_mint() {
        let chain = MockChain::new();
        usdc_edition(&chain);
        let account = MockAccount::new(&chain, BUYER);

        let mut purchase = prepare(&chain, PurchaseParams::new(BUYER, 2)).await;
        let kinds: Vec<StepKind> = purchase.steps.iter().map(|s| s.kind()).collect();
        assert_eq!(kinds, vec![StepKind::Approve, StepKind::Mint]);

        let executor = executor(&chain);
        executor
            .execute(&mut purchase.steps[0], &account, None, 1)
            .await
            .unwrap();
        assert_eq!(
            chain.allowance(USDC, BUYER, chain.edition_extension()),
            U256::from(10_000_000u64)
        );

        // a fresh plan no longer needs the approval
        let replanned = prepare(&chain, PurchaseParams::new(BUYER, 2)).await;
        assert_eq!(replanned.steps.len(), 1);
        assert_eq!(replanned.steps[0].id(), MINT_STEP_ID);

        let receipt = executor
            .execute(&mut purchase.steps[1], &account, None, 1)
            .await
            .unwrap();
        let order = receipt.order.unwrap();
        assert_eq!(order.total_quantity(), 2);
        assert_eq!(order.items[0].cost.token(USDC).unwrap().value(), U256::from(10_000_000u64));
        assert_eq!(chain.token_balance(USDC, BUYER), U256::from(90_000_000u64));
    }

    #[tokio::test]
    async fn test_approve_is_idempotent() {
        let chain = MockChain::new();
        usdc_edition(&chain);
        let account = MockAccount::new(&chain, BUYER);
        let mut purchase = prepare(&chain, PurchaseParams::new(BUYER, 1)).await;
        let executor = executor(&chain);

        let step = purchase.steps.iter_mut().find(|s| s.id() == APPROVE_STEP_ID).unwrap();
        let first = executor.execute(step, &account, None, 1).await.unwrap();
        assert!(!first.is_synthetic());
        let second = executor.execute(step, &account, None, 1).await.unwrap();
        assert!(second.is_synthetic());
        assert_eq!(account.sent_count(), 1);
    }

    #[tokio::test]
    async fn test_completed_mint_is_not_repeated() {
        let chain = MockChain::new();
        let account = MockAccount::new(&chain, BUYER);
        let mut purchase = prepare(&chain, PurchaseParams::new(BUYER, 1)).await;
        let executor = executor(&chain);

        executor.execute(&mut purchase.steps[0], &account, None, 1).await.unwrap();
        let again = executor.execute(&mut purchase.steps[0], &account, None, 1).await.unwrap();
        assert!(again.is_synthetic());
        assert_eq!(again.order.unwrap().total_quantity(), 1);
        assert_eq!(account.sent_count(), 1);
        assert_eq!(chain.edition_mints(BUYER), 1);
    }

    #[tokio::test]
    async fn test_mint_for_recipient_decodes_order() {
        let chain = MockChain::new();
        let account = MockAccount::new(&chain, BUYER);
        let mut purchase = prepare(&chain, PurchaseParams::new(BUYER, 3).with_recipient(RECIPIENT)).await;
        let receipts = executor(&chain)
            .execute_all(&mut purchase, &account, None, 1)
            .await
            .unwrap();
        assert_eq!(receipts[0].order.as_ref().unwrap().total_quantity(), 3);
        assert_eq!(chain.edition_mints(RECIPIENT), 3);
    }

    #[tokio::test]
    async fn test_blind_mint_uses_fallback_order() {
        let chain = MockChain::new();
        chain.set_blind_mint_claim(|c| c.cost = U256::from(10u64));
        let account = MockAccount::new(&chain, BUYER);
        let mut purchase = PurchasePreparer::new(chain.provider(), chain.config())
            .prepare(&blind_mint_product(&chain), PurchaseParams::new(BUYER, 2))
            .await
            .unwrap();

        let receipts = executor(&chain)
            .execute_all(&mut purchase, &account, None, 1)
            .await
            .unwrap();
        let order = receipts[0].order.as_ref().unwrap();
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].token_id, None);
        assert_eq!(order.items[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_switches_network_before_sending() {
        let chain = MockChain::new();
        let account = MockAccount::new(&chain, BUYER).on_chain(1);
        let mut purchase = prepare(&chain, PurchaseParams::new(BUYER, 1)).await;
        executor(&chain)
            .execute_all(&mut purchase, &account, None, 1)
            .await
            .unwrap();
        assert_eq!(account.switch_requests(), 1);
        assert_eq!(account.chain_id().await.unwrap(), BASE);
    }

    #[tokio::test]
    async fn test_wrong_network_fails_step() {
        let chain = MockChain::new();
        let account = MockAccount::new(&chain, BUYER).on_chain(1).ignoring_switches();
        let mut purchase = prepare(&chain, PurchaseParams::new(BUYER, 1)).await;
        let err = executor(&chain)
            .execute(&mut purchase.steps[0], &account, None, 1)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::WrongNetwork);
        assert_eq!(purchase.steps[0].status(), StepStatus::Failed);
        assert_eq!(account.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_sold_out_between_prepare_and_execute() {
        let chain = MockChain::new();
        chain.set_edition_claim(|c| {
            c.total = 8;
            c.total_max = 10;
        });
        let account = MockAccount::new(&chain, BUYER);
        let mut purchase = prepare(&chain, PurchaseParams::new(BUYER, 2)).await;
        assert!(purchase.is_eligible);

        chain.set_edition_claim(|c| c.total = 9);
        let err = executor(&chain)
            .execute(&mut purchase.steps[0], &account, None, 1)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::SoldOut);
        assert_eq!(err.message, "Only 1 items remaining");
        assert_eq!(account.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_rejected_transaction() {
        let chain = MockChain::new();
        let account = MockAccount::new(&chain, BUYER).rejecting_transactions();
        let mut purchase = prepare(&chain, PurchaseParams::new(BUYER, 1)).await;
        let recorder = Recorder::default();
        let err = executor(&chain)
            .execute(&mut purchase.steps[0], &account, Some(&recorder), 1)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::TransactionRejected);
        assert_eq!(purchase.steps[0].status(), StepStatus::Failed);
        assert!(recorder.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_execute_all_attaches_completed_receipts() {
        let chain = MockChain::new();
        usdc_edition(&chain);
        let account = MockAccount::new(&chain, BUYER).reverting_after(1);
        let mut purchase = prepare(&chain, PurchaseParams::new(BUYER, 1)).await;

        let err = executor(&chain)
            .execute_all(&mut purchase, &account, None, 1)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::TransactionReverted);
        // only the approval completed; the reverted mint is kept apart
        assert_eq!(err.details.receipts.len(), 1);
        assert!(err.details.receipts[0].is_success());
        let failed = err.details.failed_receipt.as_ref().unwrap();
        assert!(!failed.is_success());
        assert_ne!(failed.transaction_hash, err.details.receipts[0].transaction_hash);
        assert_eq!(purchase.steps[0].status(), StepStatus::Completed);
        assert_eq!(purchase.steps[1].status(), StepStatus::Failed);
    }

    #[tokio::test]
    async fn test_ineligible_purchase_is_refused() {
        let chain = MockChain::new();
        chain.set_edition_claim(|c| {
            c.total = 10;
            c.total_max = 10;
        });
        let account = MockAccount::new(&chain, BUYER);
        let mut purchase = prepare(&chain, PurchaseParams::new(BUYER, 1)).await;
        let err = executor(&chain)
            .execute_all(&mut purchase, &account, None, 1)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::SoldOut);
        assert_eq!(account.sent_count(), 0);
    }
}

//! In-memory chain, endpoint and wallet doubles shared by unit tests

use crate::account::{Account, AccountKind, TxRequest};
use crate::config::{EngineConfig, NetworkConfig};
use crate::contracts::{
    BlindMintClaim, EditionClaim, IBlindMint, IEditionClaim, IERC1155, IERC20, UserMint,
};
use crate::error::{ErrorCode, MintError, Result};
use crate::product::{Product, ProductData};
use crate::provider::{CallRequest, PublicProvider, ReadEndpoint};
use crate::types::{Receipt, ReceiptStatus};
use alloy::dyn_abi::TypedData;
use alloy::primitives::aliases::U48;
use alloy::primitives::{address, Address, Bytes, Log as PrimitiveLog, TxHash, B256, U256};
use alloy::rpc::types::{Filter, Log};
use alloy::sol_types::{SolCall, SolEvent, SolValue};
use futures::future::BoxFuture;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const BASE: u64 = 8453;
pub const BUYER: Address = address!("0x00000000000000000000000000000000000000b1");
pub const RECIPIENT: Address = address!("0x00000000000000000000000000000000000000b2");
pub const USDC: Address = address!("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913");
pub const CREATOR: Address = address!("0x00000000000000000000000000000000000000c1");
pub const EDITION_EXTENSION: Address = address!("0x00000000000000000000000000000000000000e1");
pub const BLIND_MINT_EXTENSION: Address = address!("0x00000000000000000000000000000000000000e2");
pub const INSTANCE_ID: u64 = 42;
pub const GAS_ESTIMATE: u64 = 100_000;
pub const GAS_PRICE: u128 = 1_000_000_000;
pub const MINT_FEE: u64 = 500;

/// Edition claim fields the tests tweak; zero means unset, as on-chain
#[derive(Debug, Clone)]
pub struct EditionClaimState {
    pub total: u32,
    pub total_max: u32,
    pub wallet_max: u32,
    pub start_date: u64,
    pub end_date: u64,
    pub cost: U256,
    pub erc20: Address,
    pub token_id: U256,
    pub merkle_root: B256,
}

impl Default for EditionClaimState {
    fn default() -> Self {
        Self {
            total: 0,
            total_max: 0,
            wallet_max: 0,
            start_date: 0,
            end_date: 0,
            cost: U256::from(1_000u64),
            erc20: Address::ZERO,
            token_id: U256::from(1u64),
            merkle_root: B256::ZERO,
        }
    }
}

impl EditionClaimState {
    fn to_sol(&self) -> EditionClaim {
        EditionClaim {
            total: self.total,
            totalMax: self.total_max,
            walletMax: self.wallet_max,
            startDate: U48::from(self.start_date),
            endDate: U48::from(self.end_date),
            merkleRoot: self.merkle_root,
            tokenId: self.token_id,
            cost: self.cost,
            erc20: self.erc20,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BlindMintClaimState {
    pub total: u32,
    pub total_max: u32,
    pub start_date: u64,
    pub end_date: u64,
    pub cost: U256,
    pub erc20: Address,
}

impl BlindMintClaimState {
    fn to_sol(&self) -> BlindMintClaim {
        BlindMintClaim {
            total: self.total,
            totalMax: self.total_max,
            startDate: U48::from(self.start_date),
            endDate: U48::from(self.end_date),
            tokenVariations: 4,
            startingTokenId: U256::from(100u64),
            erc20: self.erc20,
            cost: self.cost,
            ..Default::default()
        }
    }
}

struct State {
    block: u64,
    native: HashMap<Address, U256>,
    tokens: HashMap<Address, (String, u8)>,
    token_balances: HashMap<(Address, Address), U256>,
    allowances: HashMap<(Address, Address, Address), U256>,
    edition: EditionClaimState,
    edition_mints: HashMap<Address, u32>,
    blind: BlindMintClaimState,
    reservations: HashMap<Address, u32>,
    mint_fee: U256,
    logs: Vec<(u64, PrimitiveLog)>,
}

/// A single network with one ERC-20, one edition claim and one BlindMint claim
#[derive(Clone)]
pub struct MockChain {
    state: Arc<Mutex<State>>,
}

fn reverted(reason: &str) -> MintError {
    MintError::new(ErrorCode::NetworkError, "eth_call failed")
        .with_original(format!("execution reverted: {}", reason))
}

fn selector(data: &[u8]) -> [u8; 4] {
    let mut out = [0u8; 4];
    if data.len() >= 4 {
        out.copy_from_slice(&data[..4]);
    }
    out
}

impl MockChain {
    pub fn new() -> Self {
        let state = State {
            block: 100,
            native: HashMap::new(),
            tokens: HashMap::from([(USDC, ("USDC".to_string(), 6u8))]),
            token_balances: HashMap::new(),
            allowances: HashMap::new(),
            edition: EditionClaimState::default(),
            edition_mints: HashMap::new(),
            blind: BlindMintClaimState::default(),
            reservations: HashMap::new(),
            mint_fee: U256::from(MINT_FEE),
            logs: Vec::new(),
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn config(&self) -> EngineConfig {
        EngineConfig::default()
    }

    /// Provider with a single healthy endpoint on [`BASE`]
    pub fn provider(&self) -> PublicProvider {
        let list: Vec<Arc<dyn ReadEndpoint>> = vec![Arc::new(MockEndpoint::new(self))];
        PublicProvider::new(HashMap::from([(BASE, list)]))
    }

    pub fn edition_extension(&self) -> Address {
        EDITION_EXTENSION
    }

    pub fn blind_mint_extension(&self) -> Address {
        BLIND_MINT_EXTENSION
    }

    pub fn edition_token_id(&self) -> U256 {
        self.state().edition.token_id
    }

    pub fn set_edition_claim(&self, update: impl FnOnce(&mut EditionClaimState)) {
        update(&mut self.state().edition);
    }

    pub fn set_blind_mint_claim(&self, update: impl FnOnce(&mut BlindMintClaimState)) {
        update(&mut self.state().blind);
    }

    pub fn set_edition_mints(&self, minter: Address, count: u32) {
        self.state().edition_mints.insert(minter, count);
    }

    pub fn edition_mints(&self, minter: Address) -> u32 {
        self.state().edition_mints.get(&minter).copied().unwrap_or_default()
    }

    pub fn set_mint_fee(&self, fee: U256) {
        self.state().mint_fee = fee;
    }

    pub fn mint_fee(&self) -> U256 {
        self.state().mint_fee
    }

    pub fn set_native_balance(&self, owner: Address, value: U256) {
        self.state().native.insert(owner, value);
    }

    pub fn set_token_balance(&self, token: Address, owner: Address, value: U256) {
        self.state().token_balances.insert((token, owner), value);
    }

    pub fn token_balance(&self, token: Address, owner: Address) -> U256 {
        self.state()
            .token_balances
            .get(&(token, owner))
            .copied()
            .unwrap_or_default()
    }

    pub fn set_allowance(&self, token: Address, owner: Address, spender: Address, value: U256) {
        self.state().allowances.insert((token, owner, spender), value);
    }

    pub fn allowance(&self, token: Address, owner: Address, spender: Address) -> U256 {
        self.state()
            .allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or_default()
    }

    /// Record an empty log at the next block
    pub fn emit_log(&self, emitter: Address) {
        let mut state = self.state();
        let block = state.block + 1;
        let log = PrimitiveLog::new_unchecked(emitter, vec![B256::repeat_byte(0x42)], Bytes::new());
        state.logs.push((block, log));
    }

    pub fn mine_block(&self) {
        self.state().block += 1;
    }

    fn native_balance(&self, owner: Address) -> U256 {
        self.state().native.get(&owner).copied().unwrap_or_default()
    }

    fn call(&self, request: &CallRequest) -> Result<Bytes> {
        let state = self.state();
        let data = &request.data[..];
        let sel = selector(data);

        if state.tokens.contains_key(&request.to) {
            let token = request.to;
            let encoded = if sel == IERC20::balanceOfCall::SELECTOR {
                let call = IERC20::balanceOfCall::abi_decode(data).map_err(|e| reverted(&e.to_string()))?;
                let balance = state.token_balances.get(&(token, call.account)).copied().unwrap_or_default();
                balance.abi_encode()
            } else if sel == IERC20::allowanceCall::SELECTOR {
                let call = IERC20::allowanceCall::abi_decode(data).map_err(|e| reverted(&e.to_string()))?;
                state
                    .allowances
                    .get(&(token, call.owner, call.spender))
                    .copied()
                    .unwrap_or_default()
                    .abi_encode()
            } else if sel == IERC20::symbolCall::SELECTOR {
                state.tokens[&token].0.abi_encode()
            } else if sel == IERC20::decimalsCall::SELECTOR {
                IERC20::decimalsCall::abi_encode_returns(&state.tokens[&token].1)
            } else {
                return Err(reverted("unknown token function"));
            };
            return Ok(encoded.into());
        }

        let to = request.to;
        let encoded = if to == EDITION_EXTENSION && sel == IEditionClaim::getClaimCall::SELECTOR {
            state.edition.to_sol().abi_encode()
        } else if to == EDITION_EXTENSION && sel == IEditionClaim::getTotalMintsCall::SELECTOR {
            let call = IEditionClaim::getTotalMintsCall::abi_decode(data).map_err(|e| reverted(&e.to_string()))?;
            state.edition_mints.get(&call.minter).copied().unwrap_or_default().abi_encode()
        } else if to == EDITION_EXTENSION
            && (sel == IEditionClaim::MINT_FEECall::SELECTOR || sel == IEditionClaim::MINT_FEE_MERKLECall::SELECTOR)
        {
            state.mint_fee.abi_encode()
        } else if to == BLIND_MINT_EXTENSION && sel == IBlindMint::getClaimCall::SELECTOR {
            state.blind.to_sol().abi_encode()
        } else if to == BLIND_MINT_EXTENSION && sel == IBlindMint::getUserMintsCall::SELECTOR {
            let call = IBlindMint::getUserMintsCall::abi_decode(data).map_err(|e| reverted(&e.to_string()))?;
            UserMint {
                reservedCount: state.reservations.get(&call.minter).copied().unwrap_or_default(),
                deliveredCount: 0,
            }
            .abi_encode()
        } else if to == BLIND_MINT_EXTENSION && sel == IBlindMint::MINT_FEECall::SELECTOR {
            state.mint_fee.abi_encode()
        } else {
            return Err(reverted("no contract at address"));
        };
        Ok(encoded.into())
    }

    /// Token payment the mint in `data` would pull, if any
    fn token_payment(state: &State, to: Address, data: &[u8]) -> Option<(Address, U256)> {
        let sel = selector(data);
        let (erc20, cost, count) = if to == EDITION_EXTENSION && sel == IEditionClaim::mintProxyCall::SELECTOR {
            let call = IEditionClaim::mintProxyCall::abi_decode(data).ok()?;
            (state.edition.erc20, state.edition.cost, call.mintCount as u64)
        } else if to == BLIND_MINT_EXTENSION && sel == IBlindMint::mintReserveCall::SELECTOR {
            let call = IBlindMint::mintReserveCall::abi_decode(data).ok()?;
            (state.blind.erc20, state.blind.cost, call.mintCount as u64)
        } else {
            return None;
        };
        (erc20 != Address::ZERO).then(|| (erc20, cost * U256::from(count)))
    }

    fn estimate(&self, request: &CallRequest) -> Result<u64> {
        let state = self.state();
        let from = request.from.unwrap_or_default();
        if let Some((token, amount)) = Self::token_payment(&state, request.to, &request.data) {
            let allowance = state
                .allowances
                .get(&(token, from, request.to))
                .copied()
                .unwrap_or_default();
            if allowance < amount {
                return Err(MintError::new(ErrorCode::NetworkError, "eth_estimateGas failed")
                    .with_original("execution reverted: ERC20: insufficient allowance"));
            }
            let balance = state.token_balances.get(&(token, from)).copied().unwrap_or_default();
            if balance < amount {
                return Err(MintError::new(ErrorCode::NetworkError, "eth_estimateGas failed")
                    .with_original("execution reverted: ERC20: transfer amount exceeds balance"));
            }
        }
        if request.value > state.native.get(&from).copied().unwrap_or_default() {
            return Err(MintError::new(ErrorCode::NetworkError, "eth_estimateGas failed")
                .with_original("insufficient funds for transfer"));
        }
        Ok(GAS_ESTIMATE)
    }

    /// Apply a transaction; returns whether it succeeded and the logs it emitted
    pub fn apply_transaction(&self, from: Address, tx: &TxRequest) -> (bool, Vec<PrimitiveLog>) {
        let mut state = self.state();
        state.block += 1;
        let data = &tx.data[..];
        let sel = selector(data);

        if state.tokens.contains_key(&tx.to) && sel == IERC20::approveCall::SELECTOR {
            let Ok(call) = IERC20::approveCall::abi_decode(data) else {
                return (false, Vec::new());
            };
            state.allowances.insert((tx.to, from, call.spender), call.amount);
            return (true, Vec::new());
        }

        if let Some((token, amount)) = Self::token_payment(&state, tx.to, data) {
            let allowance = state.allowances.get(&(token, from, tx.to)).copied().unwrap_or_default();
            let balance = state.token_balances.get(&(token, from)).copied().unwrap_or_default();
            if allowance < amount || balance < amount {
                return (false, Vec::new());
            }
            state.allowances.insert((token, from, tx.to), allowance - amount);
            state.token_balances.insert((token, from), balance - amount);
        }

        if tx.to == EDITION_EXTENSION && sel == IEditionClaim::mintProxyCall::SELECTOR {
            let Ok(call) = IEditionClaim::mintProxyCall::abi_decode(data) else {
                return (false, Vec::new());
            };
            let count = call.mintCount as u32;
            let native_due = state.mint_fee * U256::from(count)
                + if state.edition.erc20 == Address::ZERO {
                    state.edition.cost * U256::from(count)
                } else {
                    U256::ZERO
                };
            if tx.value < native_due {
                return (false, Vec::new());
            }
            state.edition.total += count;
            *state.edition_mints.entry(call.mintFor).or_default() += count;
            let event = IERC1155::TransferSingle {
                operator: EDITION_EXTENSION,
                from: Address::ZERO,
                to: call.mintFor,
                id: state.edition.token_id,
                value: U256::from(count),
            };
            let log = PrimitiveLog {
                address: CREATOR,
                data: event.encode_log_data(),
            };
            return (true, vec![log]);
        }

        if tx.to == BLIND_MINT_EXTENSION && sel == IBlindMint::mintReserveCall::SELECTOR {
            let Ok(call) = IBlindMint::mintReserveCall::abi_decode(data) else {
                return (false, Vec::new());
            };
            state.blind.total += call.mintCount;
            *state.reservations.entry(from).or_default() += call.mintCount;
            return (true, Vec::new());
        }

        (true, Vec::new())
    }

    fn logs(&self, filter: &Filter) -> Vec<Log> {
        let state = self.state();
        let from = filter.get_from_block().unwrap_or(0);
        let to = filter.get_to_block().unwrap_or(state.block);
        state
            .logs
            .iter()
            .filter(|(block, log)| *block >= from && *block <= to && filter.address.matches(&log.address))
            .map(|(block, log)| Log {
                inner: log.clone(),
                block_number: Some(*block),
                ..Default::default()
            })
            .collect()
    }
}

pub fn edition_product(_chain: &MockChain) -> Product {
    Product::edition(
        EDITION_EXTENSION,
        CREATOR,
        U256::from(INSTANCE_ID),
        ProductData::new("Test Edition", BASE),
    )
}

pub fn blind_mint_product(_chain: &MockChain) -> Product {
    Product::blind_mint(
        BLIND_MINT_EXTENSION,
        CREATOR,
        U256::from(INSTANCE_ID),
        ProductData::new("Test Drop", BASE),
    )
}

/// Read endpoint backed by a [`MockChain`]
pub struct MockEndpoint {
    chain: MockChain,
    reported_chain: AtomicU64,
    switchable: bool,
    failing: bool,
    failing_estimates: bool,
    empty_calls: bool,
    hanging: bool,
    calls: Arc<AtomicUsize>,
}

impl MockEndpoint {
    pub fn new(chain: &MockChain) -> Self {
        Self {
            chain: chain.clone(),
            reported_chain: AtomicU64::new(BASE),
            switchable: false,
            failing: false,
            failing_estimates: false,
            empty_calls: false,
            hanging: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn reporting_chain(self, chain_id: u64) -> Self {
        self.reported_chain.store(chain_id, Ordering::SeqCst);
        self
    }

    pub fn switchable(mut self) -> Self {
        self.switchable = true;
        self
    }

    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn failing_estimates(mut self) -> Self {
        self.failing_estimates = true;
        self
    }

    /// Answers every `eth_call` with `0x`
    pub fn empty_calls(mut self) -> Self {
        self.empty_calls = true;
        self
    }

    /// Reports its chain id but never answers anything else
    pub fn hanging(mut self) -> Self {
        self.hanging = true;
        self
    }

    /// Number of operations served (chain id checks excluded)
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }

    fn serve<T: Send + 'static>(&self, op: impl FnOnce(&MockChain) -> Result<T>) -> BoxFuture<'_, Result<T>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.hanging {
            return Box::pin(futures::future::pending());
        }
        let result = if self.failing {
            Err(MintError::new(ErrorCode::NetworkError, "connection refused"))
        } else {
            op(&self.chain)
        };
        Box::pin(async move { result })
    }
}

impl ReadEndpoint for MockEndpoint {
    fn label(&self) -> &str {
        "mock"
    }

    fn chain_id(&self) -> BoxFuture<'_, Result<u64>> {
        let id = self.reported_chain.load(Ordering::SeqCst);
        Box::pin(async move { Ok(id) })
    }

    fn switch_chain(&self, chain_id: u64) -> Option<BoxFuture<'_, Result<()>>> {
        if !self.switchable {
            return None;
        }
        Some(Box::pin(async move {
            self.reported_chain.store(chain_id, Ordering::SeqCst);
            Ok(())
        }))
    }

    fn balance(&self, address: Address) -> BoxFuture<'_, Result<U256>> {
        self.serve(move |chain| Ok(chain.native_balance(address)))
    }

    fn call(&self, request: CallRequest) -> BoxFuture<'_, Result<Bytes>> {
        let empty = self.empty_calls;
        self.serve(move |chain| if empty { Ok(Bytes::new()) } else { chain.call(&request) })
    }

    fn estimate_gas(&self, request: CallRequest) -> BoxFuture<'_, Result<u64>> {
        let failing_estimates = self.failing_estimates;
        self.serve(move |chain| {
            if failing_estimates {
                return Err(MintError::new(ErrorCode::NetworkError, "eth_estimateGas failed")
                    .with_original("execution reverted"));
            }
            chain.estimate(&request)
        })
    }

    fn gas_price(&self) -> BoxFuture<'_, Result<u128>> {
        self.serve(|_| Ok(GAS_PRICE))
    }

    fn block_number(&self) -> BoxFuture<'_, Result<u64>> {
        self.serve(|chain| Ok(chain.state().block))
    }

    fn logs(&self, filter: Filter) -> BoxFuture<'_, Result<Vec<Log>>> {
        self.serve(move |chain| Ok(chain.logs(&filter)))
    }
}

/// Wallet double that executes transactions against a [`MockChain`]
pub struct MockAccount {
    chain: MockChain,
    address: Address,
    current_chain: AtomicU64,
    /// Target chain and the number of `chain_id` polls before it takes effect
    pending_switch: Mutex<Option<(u64, u32)>>,
    switch_lag: u32,
    unknown_networks: Mutex<HashSet<u64>>,
    ignore_switches: bool,
    reject_switches: bool,
    reject_transactions: bool,
    revert_after: Option<usize>,
    switch_requests: AtomicUsize,
    added_networks: Mutex<Vec<u64>>,
    sent: Mutex<Vec<TxRequest>>,
    receipts: Mutex<HashMap<TxHash, Receipt>>,
}

impl MockAccount {
    pub fn new(chain: &MockChain, address: Address) -> Self {
        Self {
            chain: chain.clone(),
            address,
            current_chain: AtomicU64::new(BASE),
            pending_switch: Mutex::new(None),
            switch_lag: 0,
            unknown_networks: Mutex::new(HashSet::new()),
            ignore_switches: false,
            reject_switches: false,
            reject_transactions: false,
            revert_after: None,
            switch_requests: AtomicUsize::new(0),
            added_networks: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
            receipts: Mutex::new(HashMap::new()),
        }
    }

    pub fn on_chain(self, chain_id: u64) -> Self {
        self.current_chain.store(chain_id, Ordering::SeqCst);
        self
    }

    /// Switches complete only after `polls` further `chain_id` reads
    pub fn with_switch_lag(mut self, polls: u32) -> Self {
        self.switch_lag = polls;
        self
    }

    pub fn with_unknown_network(self, chain_id: u64) -> Self {
        self.unknown_networks.lock().unwrap().insert(chain_id);
        self
    }

    pub fn ignoring_switches(mut self) -> Self {
        self.ignore_switches = true;
        self
    }

    pub fn rejecting_switches(mut self) -> Self {
        self.reject_switches = true;
        self
    }

    pub fn rejecting_transactions(mut self) -> Self {
        self.reject_transactions = true;
        self
    }

    /// Every transaction after the first `sent` ones reverts
    pub fn reverting_after(mut self, sent: usize) -> Self {
        self.revert_after = Some(sent);
        self
    }

    pub fn switch_requests(&self) -> usize {
        self.switch_requests.load(Ordering::SeqCst)
    }

    pub fn added_networks(&self) -> Vec<u64> {
        self.added_networks.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl Account for MockAccount {
    fn kind(&self) -> AccountKind {
        AccountKind::Local
    }

    fn address(&self) -> Address {
        self.address
    }

    async fn chain_id(&self) -> Result<u64> {
        let mut pending = self.pending_switch.lock().unwrap();
        if let Some((target, polls_left)) = pending.as_mut() {
            if *polls_left == 0 {
                self.current_chain.store(*target, Ordering::SeqCst);
                *pending = None;
            } else {
                *polls_left -= 1;
            }
        }
        Ok(self.current_chain.load(Ordering::SeqCst))
    }

    async fn send_transaction(&self, tx: TxRequest) -> Result<TxHash> {
        if self.reject_transactions {
            return Err(MintError::new(ErrorCode::TransactionRejected, "User rejected the transaction"));
        }
        let current = self.current_chain.load(Ordering::SeqCst);
        if tx.chain_id != current {
            return Err(MintError::wrong_network(tx.chain_id, current));
        }

        let mut sent = self.sent.lock().unwrap();
        let index = sent.len();
        let hash = TxHash::with_last_byte(index as u8 + 1);
        let (success, logs) = match self.revert_after {
            Some(limit) if index >= limit => (false, Vec::new()),
            _ => self.chain.apply_transaction(self.address, &tx),
        };
        sent.push(tx);

        let receipt = Receipt {
            transaction_hash: hash,
            status: if success {
                ReceiptStatus::Success
            } else {
                ReceiptStatus::Reverted
            },
            block_number: Some(self.chain.state().block),
            gas_used: GAS_ESTIMATE,
            order: None,
            logs,
        };
        self.receipts.lock().unwrap().insert(hash, receipt);
        Ok(hash)
    }

    async fn wait_for_transaction(&self, hash: TxHash, _confirmations: u64) -> Result<Receipt> {
        self.receipts
            .lock()
            .unwrap()
            .get(&hash)
            .cloned()
            .ok_or_else(|| MintError::timeout(format!("Transaction {} not found", hash)))
    }

    async fn switch_network(&self, chain_id: u64) -> Result<()> {
        self.switch_requests.fetch_add(1, Ordering::SeqCst);
        if self.reject_switches {
            return Err(MintError::new(ErrorCode::TransactionRejected, "User rejected the request"));
        }
        if self.unknown_networks.lock().unwrap().contains(&chain_id) {
            return Err(MintError::unsupported_network(chain_id));
        }
        if !self.ignore_switches {
            *self.pending_switch.lock().unwrap() = Some((chain_id, self.switch_lag));
        }
        Ok(())
    }

    async fn add_network(&self, network: &NetworkConfig) -> Result<()> {
        self.unknown_networks.lock().unwrap().remove(&network.chain_id);
        self.added_networks.lock().unwrap().push(network.chain_id);
        Ok(())
    }

    async fn sign_message(&self, _message: &[u8]) -> Result<Bytes> {
        Ok(Bytes::from(vec![0u8; 65]))
    }

    async fn sign_typed_data(&self, _data: &TypedData) -> Result<Bytes> {
        Ok(Bytes::from(vec![0u8; 65]))
    }
}

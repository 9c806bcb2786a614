//! Network switch coordination
//!
//! Wallets complete a network switch asynchronously relative to the call that
//! requested it, so a switch is a two phase affair: request it, then poll the
//! wallet's chain id until it reports the target.

use crate::account::Account;
use crate::config::{EngineConfig, NetworkConfig};
use crate::error::{ErrorCode, MintError, Result};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Progress of one switch request: `Idle -> Switching -> Confirming -> Done | Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchState {
    Idle,
    Switching,
    Confirming,
    Done,
    Failed,
}

impl fmt::Display for SwitchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Switching => "switching",
            Self::Confirming => "confirming",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
pub struct NetworkSwitcher {
    /// Definitions offered to wallets that do not know a network yet
    networks: HashMap<u64, NetworkConfig>,
    poll_interval: Duration,
    max_attempts: u32,
}

struct Tracker {
    target: u64,
    state: SwitchState,
}

impl Tracker {
    fn enter(&mut self, next: SwitchState) {
        tracing::debug!(target_chain = self.target, from = %self.state, to = %next, "Network switch");
        self.state = next;
    }
}

impl NetworkSwitcher {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            networks: config.networks.clone(),
            poll_interval: config.switch_poll_interval,
            max_attempts: config.switch_max_attempts.max(1),
        }
    }

    pub fn with_polling(mut self, poll_interval: Duration, max_attempts: u32) -> Self {
        self.poll_interval = poll_interval;
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Make sure `account` is connected to `target`
    ///
    /// A wallet that does not know the network is offered its definition once and
    /// asked again. Fails with `WRONG_NETWORK` when the wallet never reports `target`.
    pub async fn ensure_network<A: Account>(&self, account: &A, target: u64) -> Result<()> {
        let current = account.chain_id().await?;
        if current == target {
            return Ok(());
        }

        let mut tracker = Tracker {
            target,
            state: SwitchState::Idle,
        };
        tracker.enter(SwitchState::Switching);
        if let Err(e) = self.request_switch(account, target).await {
            tracker.enter(SwitchState::Failed);
            return Err(e);
        }

        tracker.enter(SwitchState::Confirming);
        let mut observed = current;
        for attempt in 1..=self.max_attempts {
            observed = account.chain_id().await?;
            if observed == target {
                tracker.enter(SwitchState::Done);
                tracing::info!(from = current, to = target, attempt, "Wallet switched network");
                return Ok(());
            }
            tracing::debug!(target_chain = target, observed, attempt, "Waiting for wallet network");
            if attempt < self.max_attempts {
                tokio::time::sleep(self.poll_interval).await;
            }
        }

        tracker.enter(SwitchState::Failed);
        Err(MintError::wrong_network(target, observed))
    }

    async fn request_switch<A: Account>(&self, account: &A, target: u64) -> Result<()> {
        match account.switch_network(target).await {
            Ok(()) => Ok(()),
            Err(e) if e.code == ErrorCode::UnsupportedNetwork => {
                let Some(network) = self.networks.get(&target) else {
                    return Err(e);
                };
                tracing::info!(chain_id = target, name = %network.name, "Adding network to wallet");
                account.add_network(network).await?;
                account.switch_network(target).await
            }
            Err(e) => Err(e),
        }
    }
}

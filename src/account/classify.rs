//! Translation of wallet-library errors into [`ErrorCode`]s
//!
//! Each adapter owns an ordered table of `(predicate, code, message)` rules evaluated
//! top to bottom; the first match wins and unmatched errors become `UNKNOWN_ERROR`.
//! Matching is heuristic (error codes plus message fragments) and best-effort: the
//! underlying libraries do not expose a stable error shape.

use crate::error::{ErrorCode, MintError};
use alloy::transports::TransportError;
use std::fmt;

/// Error as reported by a wallet library: an optional numeric code and a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawWalletError {
    pub code: Option<i64>,
    pub message: String,
}

impl RawWalletError {
    pub fn new(code: Option<i64>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn message(message: impl fmt::Display) -> Self {
        Self::new(None, message.to_string())
    }

    /// JSON-RPC error payloads keep their code; transport failures only carry text
    pub fn from_transport(err: &TransportError) -> Self {
        match err.as_error_resp() {
            Some(payload) => Self::new(Some(payload.code), payload.message.to_string()),
            None => Self::message(err),
        }
    }

    fn contains(&self, needle: &str) -> bool {
        self.message.to_lowercase().contains(needle)
    }

    fn contains_any(&self, needles: &[&str]) -> bool {
        let message = self.message.to_lowercase();
        needles.iter().any(|n| message.contains(n))
    }
}

/// One classification rule
pub struct ClassificationRule {
    pub name: &'static str,
    pub matches: fn(&RawWalletError) -> bool,
    pub code: ErrorCode,
    pub message: &'static str,
}

/// Apply `rules` in order
pub fn classify(rules: &[ClassificationRule], raw: &RawWalletError) -> MintError {
    match rules.iter().find(|rule| (rule.matches)(raw)) {
        Some(rule) => {
            tracing::debug!(rule = rule.name, code = %rule.code, "Classified wallet error");
            MintError::new(rule.code, rule.message).with_original(&raw.message)
        }
        None => MintError::unknown(&raw.message),
    }
}

const USER_REJECTED: &[&str] = &["user rejected", "user denied", "rejected by user", "denied by the user"];
const NONCE: &[&str] = &["nonce too low", "nonce too high", "invalid nonce", "nonce has already been used"];
const GAS_TOO_LOW: &[&str] = &[
    "intrinsic gas too low",
    "transaction underpriced",
    "max fee per gas less than block base fee",
    "fee cap less than block base fee",
    "gas price too low",
];
const HARDWARE: &[&str] = &["ledger", "trezor", "hardware wallet", "device is locked"];
const TIMEOUT: &[&str] = &["timed out", "timeout"];
const CONNECTION: &[&str] = &["error sending request", "connection refused", "connection reset", "dns error"];

/// Rules for locally signed transactions sent through alloy providers
pub static LOCAL_RULES: &[ClassificationRule] = &[
    ClassificationRule {
        name: "insufficient_funds",
        matches: |e| e.contains("insufficient funds"),
        code: ErrorCode::InsufficientFunds,
        message: "Insufficient funds for gas and value",
    },
    ClassificationRule {
        name: "gas_too_low",
        matches: |e| e.contains_any(GAS_TOO_LOW),
        code: ErrorCode::GasPriceTooLow,
        message: "Gas price or limit too low",
    },
    ClassificationRule {
        name: "nonce",
        matches: |e| e.contains_any(NONCE),
        code: ErrorCode::NonceError,
        message: "Nonce conflict, another transaction may be pending",
    },
    ClassificationRule {
        name: "reverted",
        matches: |e| e.code == Some(3) || e.contains("execution reverted"),
        code: ErrorCode::TransactionReverted,
        message: "Transaction would revert",
    },
    ClassificationRule {
        name: "unknown_chain",
        matches: |e| e.contains_any(&["unrecognized chain", "unknown network", "no rpc registered"]),
        code: ErrorCode::UnsupportedNetwork,
        message: "Network is not registered with this account",
    },
    ClassificationRule {
        name: "timeout",
        matches: |e| e.contains_any(TIMEOUT),
        code: ErrorCode::Timeout,
        message: "Request timed out",
    },
    ClassificationRule {
        name: "connection",
        matches: |e| e.contains_any(CONNECTION),
        code: ErrorCode::NetworkError,
        message: "Could not reach the RPC endpoint",
    },
];

/// Rules for wallets driven over a provider-style JSON-RPC interface (EIP-1193 codes)
pub static RPC_RULES: &[ClassificationRule] = &[
    ClassificationRule {
        name: "ledger_denied",
        matches: |e| e.contains("0x6985"),
        code: ErrorCode::TransactionRejected,
        message: "Request denied on the hardware wallet",
    },
    ClassificationRule {
        name: "user_rejected",
        matches: |e| e.code == Some(4001) || e.contains_any(USER_REJECTED),
        code: ErrorCode::TransactionRejected,
        message: "User rejected the request",
    },
    ClassificationRule {
        name: "unauthorized",
        matches: |e| e.code == Some(4100),
        code: ErrorCode::TransactionRejected,
        message: "Account is not authorized by the wallet",
    },
    ClassificationRule {
        name: "unknown_chain",
        matches: |e| e.code == Some(4902) || e.contains("unrecognized chain"),
        code: ErrorCode::UnsupportedNetwork,
        message: "Network is not known to the wallet",
    },
    ClassificationRule {
        name: "disconnected",
        matches: |e| matches!(e.code, Some(4900) | Some(4901)),
        code: ErrorCode::NetworkError,
        message: "Wallet is disconnected",
    },
    ClassificationRule {
        name: "hardware",
        matches: |e| e.contains_any(HARDWARE),
        code: ErrorCode::HardwareWalletError,
        message: "Hardware wallet error, check the device is unlocked and the app is open",
    },
    ClassificationRule {
        name: "insufficient_funds",
        matches: |e| e.contains("insufficient funds"),
        code: ErrorCode::InsufficientFunds,
        message: "Insufficient funds for gas and value",
    },
    ClassificationRule {
        name: "gas_too_low",
        matches: |e| e.contains_any(GAS_TOO_LOW),
        code: ErrorCode::GasPriceTooLow,
        message: "Gas price or limit too low",
    },
    ClassificationRule {
        name: "nonce",
        matches: |e| e.contains_any(NONCE),
        code: ErrorCode::NonceError,
        message: "Nonce conflict, another transaction may be pending",
    },
    ClassificationRule {
        name: "reverted",
        matches: |e| e.code == Some(3) || e.contains("execution reverted"),
        code: ErrorCode::TransactionReverted,
        message: "Transaction would revert",
    },
    ClassificationRule {
        name: "timeout",
        matches: |e| e.contains_any(TIMEOUT),
        code: ErrorCode::Timeout,
        message: "Request timed out",
    },
    ClassificationRule {
        name: "connection",
        matches: |e| e.contains_any(CONNECTION),
        code: ErrorCode::NetworkError,
        message: "Could not reach the wallet",
    },
];

/// Rules for the Fordefi MPC API (transaction states and HTTP failures)
pub static FORDEFI_RULES: &[ClassificationRule] = &[
    ClassificationRule {
        name: "aborted",
        matches: |e| e.contains_any(&["aborted", "cancelled", "rejected"]),
        code: ErrorCode::TransactionRejected,
        message: "Transaction was rejected or cancelled in Fordefi",
    },
    ClassificationRule {
        name: "insufficient_funds",
        matches: |e| e.contains_any(&["insufficient funds", "insufficient_funds", "insufficient balance"]),
        code: ErrorCode::InsufficientFunds,
        message: "Insufficient funds in the Fordefi vault",
    },
    ClassificationRule {
        name: "unsupported_chain",
        matches: |e| e.contains_any(&["unsupported chain", "no rpc registered"]),
        code: ErrorCode::UnsupportedNetwork,
        message: "Network is not supported by the Fordefi vault",
    },
    ClassificationRule {
        name: "nonce",
        matches: |e| e.contains("nonce"),
        code: ErrorCode::NonceError,
        message: "Nonce conflict reported by Fordefi",
    },
    ClassificationRule {
        name: "signing",
        matches: |e| e.contains("error_signing"),
        code: ErrorCode::TransactionFailed,
        message: "Fordefi failed to sign the transaction",
    },
    ClassificationRule {
        name: "push",
        matches: |e| e.contains("error_pushing_to_blockchain"),
        code: ErrorCode::TransactionFailed,
        message: "Fordefi failed to broadcast the transaction",
    },
    ClassificationRule {
        name: "timeout",
        matches: |e| e.contains_any(TIMEOUT),
        code: ErrorCode::Timeout,
        message: "Timed out waiting for Fordefi",
    },
    ClassificationRule {
        name: "connection",
        matches: |e| e.contains_any(CONNECTION) || e.contains_any(&["502", "503", "504"]),
        code: ErrorCode::NetworkError,
        message: "Could not reach the Fordefi API",
    },
];

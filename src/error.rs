//! Error types for the mint SDK
//!
//! Every public operation fails with a single [`MintError`] carrying a code from a
//! closed taxonomy, a human readable message and optional structured details.
//! UIs branch on [`ErrorCode`] (retry vs. abort vs. re-prompt), never on the message.

use crate::money::Money;
use crate::types::Receipt;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, MintError>;

/// Error codes understood by callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidInput,
    UnsupportedNetwork,
    NotEligible,
    SoldOut,
    LimitReached,
    Ended,
    NotStarted,
    EstimationFailed,
    TransactionRejected,
    TransactionReverted,
    TransactionFailed,
    InsufficientFunds,
    NonceError,
    GasPriceTooLow,
    HardwareWalletError,
    Timeout,
    WrongNetwork,
    NetworkError,
    UnknownError,
}

/// Propagation policy group of an [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Surfaced immediately, never retried
    Input,
    /// Reported inside a successful preparation; raised only when execution re-validates
    Eligibility,
    /// May be replaced by a configured fallback gas value
    Estimation,
    /// Carries completed receipts so the caller can resume
    Execution,
    /// Surfaced after the single documented remediation cycle
    Network,
    Unknown,
}

impl ErrorCode {
    /// Wire name of the code, e.g. `INSUFFICIENT_FUNDS`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "INVALID_INPUT",
            Self::UnsupportedNetwork => "UNSUPPORTED_NETWORK",
            Self::NotEligible => "NOT_ELIGIBLE",
            Self::SoldOut => "SOLD_OUT",
            Self::LimitReached => "LIMIT_REACHED",
            Self::Ended => "ENDED",
            Self::NotStarted => "NOT_STARTED",
            Self::EstimationFailed => "ESTIMATION_FAILED",
            Self::TransactionRejected => "TRANSACTION_REJECTED",
            Self::TransactionReverted => "TRANSACTION_REVERTED",
            Self::TransactionFailed => "TRANSACTION_FAILED",
            Self::InsufficientFunds => "INSUFFICIENT_FUNDS",
            Self::NonceError => "NONCE_ERROR",
            Self::GasPriceTooLow => "GAS_PRICE_TOO_LOW",
            Self::HardwareWalletError => "HARDWARE_WALLET_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::WrongNetwork => "WRONG_NETWORK",
            Self::NetworkError => "NETWORK_ERROR",
            Self::UnknownError => "UNKNOWN_ERROR",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput | Self::UnsupportedNetwork => ErrorCategory::Input,
            Self::NotEligible
            | Self::SoldOut
            | Self::LimitReached
            | Self::Ended
            | Self::NotStarted => ErrorCategory::Eligibility,
            Self::EstimationFailed => ErrorCategory::Estimation,
            Self::TransactionRejected
            | Self::TransactionReverted
            | Self::TransactionFailed
            | Self::InsufficientFunds
            | Self::NonceError
            | Self::GasPriceTooLow
            | Self::HardwareWalletError
            | Self::Timeout => ErrorCategory::Execution,
            Self::WrongNetwork | Self::NetworkError => ErrorCategory::Network,
            Self::UnknownError => ErrorCategory::Unknown,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured context attached to a [`MintError`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct ErrorDetails {
    /// Receipts of steps that completed before the failure
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub receipts: Vec<Receipt>,
    /// Receipt of the transaction that was mined but reverted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_receipt: Option<Receipt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_chain_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_chain_id: Option<u64>,
    /// Shortfall per currency when a balance check fails
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_funds: Vec<Money>,
    /// Rendered underlying error, kept for diagnostics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_error: Option<String>,
}

/// The single error type returned by the SDK
#[derive(Debug, Clone, Error)]
#[error("{code}: {message}")]
pub struct MintError {
    pub code: ErrorCode,
    pub message: String,
    pub details: ErrorDetails,
}

impl MintError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: ErrorDetails::default(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    pub fn unsupported_network(chain_id: u64) -> Self {
        Self::new(
            ErrorCode::UnsupportedNetwork,
            format!("No provider configured for network {}", chain_id),
        )
        .with_expected_chain(chain_id)
    }

    pub fn wrong_network(expected: u64, actual: u64) -> Self {
        Self::new(
            ErrorCode::WrongNetwork,
            format!("Wallet is on network {}, expected {}", actual, expected),
        )
        .with_expected_chain(expected)
        .with_actual_chain(actual)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Timeout, message)
    }

    /// Catch-all for unrecognized failures; the source is logged and kept in the details
    pub fn unknown(source: impl fmt::Display) -> Self {
        let original = source.to_string();
        tracing::error!(original_error = %original, "Unrecognized underlying error");
        Self::new(ErrorCode::UnknownError, "An unknown error occurred").with_original(original)
    }

    pub fn with_original(mut self, source: impl fmt::Display) -> Self {
        self.details.original_error = Some(source.to_string());
        self
    }

    pub fn with_expected_chain(mut self, chain_id: u64) -> Self {
        self.details.expected_chain_id = Some(chain_id);
        self
    }

    pub fn with_actual_chain(mut self, chain_id: u64) -> Self {
        self.details.actual_chain_id = Some(chain_id);
        self
    }

    pub fn with_receipts(mut self, receipts: Vec<Receipt>) -> Self {
        self.details.receipts = receipts;
        self
    }

    pub fn with_failed_receipt(mut self, receipt: Receipt) -> Self {
        self.details.failed_receipt = Some(receipt);
        self
    }

    pub fn with_missing_funds(mut self, missing: Vec<Money>) -> Self {
        self.details.missing_funds = missing;
        self
    }

    pub fn category(&self) -> ErrorCategory {
        self.code.category()
    }
}

//! Purchase plan, step and receipt types

pub mod purchase;
pub mod receipt;
pub mod step;

pub use purchase::{Ineligibility, PreparedPurchase, PurchaseCost, PurchaseParams};
pub use receipt::{Order, OrderItem, Receipt, ReceiptStatus};
pub use step::{MintIntent, RawTransaction, StepAction, StepKind, StepStatus, TransactionStep};

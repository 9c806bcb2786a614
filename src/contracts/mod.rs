//! Contract bindings used by the purchase engine

pub mod blind_mint;
pub mod edition;
pub mod erc20;
pub mod tokens;

pub use blind_mint::*;
pub use edition::*;
pub use erc20::*;
pub use tokens::*;

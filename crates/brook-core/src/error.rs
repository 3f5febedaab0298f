//! Error types for the Brook vault.
use thiserror::Error;

/// Every way a vault operation can fail. A failed call leaves no observable
/// side effects.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VaultError {
    #[error("amount must be non-zero")] InvalidAmount,
    #[error("deposit of {amount} mints zero shares")] DustAmount { amount: u128 },
    #[error("insufficient shares: have {have}, need {need}")] InsufficientShares { have: u128, need: u128 },
    #[error("holder has no shares")] NoShares,
    #[error("vault is paused")] Paused,
    #[error("asset transfer failed")] TransferFailed,
    #[error("caller is not the owner")] Unauthorized,
    #[error("cannot rescue the vault's managed asset")] ReservedAsset,
    #[error("arithmetic overflow")] Overflow,
    #[error("division by zero")] DivisionByZero,
    #[error("reentrant call")] ReentrantCall,
    #[error("state codec: {0}")] Codec(String),
}

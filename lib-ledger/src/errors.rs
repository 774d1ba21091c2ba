//! Ledger Errors

use lib_types::{Address, Amount, TokenId};
use thiserror::Error;

use crate::roles::Role;

/// Error during ledger operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Unauthorized: {caller} lacks role {role}")]
    Unauthorized { role: Role, caller: Address },

    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("Insufficient balance: available {available}, required {required}")]
    InsufficientBalance { available: Amount, required: Amount },

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Arithmetic underflow")]
    Underflow,

    #[error("Ledger is paused")]
    Paused,

    #[error("Mint requires a non-empty verification id")]
    MissingVerification,

    #[error("Custody transfer of {token} reported failure")]
    TransferFailed { token: TokenId },

    #[error("Cannot remove the last administrator")]
    LastAdministrator,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid snapshot: {0}")]
    Snapshot(String),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

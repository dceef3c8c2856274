//! Wallet error types.

use atelier_core::error::{AddressError, KeyError};
use thiserror::Error;

/// Errors that can occur in vault and session operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// Malformed caller input, rejected before any cryptographic work.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Wrong password or corrupted ciphertext — deliberately
    /// indistinguishable.
    #[error("decryption failed: wrong password or corrupted data")]
    DecryptionFailed,

    /// Encryption failure.
    #[error("encryption: {0}")]
    Encryption(String),

    /// Secret bundle (de)serialization failure.
    #[error("serialization: {0}")]
    Serialization(String),

    /// Persistence collaborator failure.
    #[error("wallet store: {0}")]
    Store(String),

    /// Operation requires an unlocked session.
    #[error("session is locked")]
    Locked,

    /// A wallet already exists for the category.
    #[error("wallet already exists for category {0}")]
    DuplicateCategory(String),

    /// Key derivation error from atelier-core.
    #[error(transparent)]
    Key(#[from] KeyError),

    /// Address error from atelier-core.
    #[error(transparent)]
    Address(#[from] AddressError),
}

//! Chain client error types.

use atelier_core::error::{AddressError, KeyError};
use thiserror::Error;

/// Errors from TronGrid calls and transaction construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TronError {
    /// Transport-level failure: connection, timeout, non-2xx status.
    #[error("http transport: {0}")]
    Http(String),

    /// The node accepted the request but rejected its content.
    #[error("node rejected request: {code}: {message}")]
    Node { code: String, message: String },

    /// The response did not have the expected shape.
    #[error("unexpected response: {0}")]
    InvalidResponse(String),

    /// Address error from atelier-core.
    #[error(transparent)]
    Address(#[from] AddressError),

    /// Key error from atelier-core.
    #[error(transparent)]
    Key(#[from] KeyError),
}

//! # atelier-tron — TronGrid client and USDT transfer flow.
//!
//! Everything that talks to a TRON node: building and signing TRC-20
//! transfers, fee estimation, balance reads, status polling, and
//! transfer history. Node access goes through the [`TronRpc`] trait so
//! the flows are testable without a network.
//!
//! # Modules
//!
//! - [`error`] — `TronError` enum
//! - [`network`] — mainnet/Shasta endpoints and contract addresses
//! - [`rpc`] — `TronRpc` trait + TronGrid HTTP implementation
//! - [`balance`] — USDT and TRX balance reads (degrade to zero)
//! - [`transfer`] — build/sign/broadcast/status for USDT transfers
//! - [`history`] — TRC-20 transfer-log listing

pub mod balance;
pub mod error;
pub mod history;
pub mod network;
pub mod rpc;
pub mod transfer;

// Re-exports for convenient access
pub use balance::{BalanceReader, WalletBalance};
pub use error::TronError;
pub use history::{Direction, TransferHistory, TransferRecord};
pub use network::Network;
pub use rpc::{HttpTronRpc, TronRpc};
pub use transfer::{FeeEstimate, TransactionResult, TransferService, TxStatus};

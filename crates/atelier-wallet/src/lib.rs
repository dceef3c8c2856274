//! # atelier-wallet — encrypted wallet bundles and session state.
//!
//! Implements the non-custodial side of the dashboard: wallet secrets
//! are encrypted under a user-chosen master password before they ever
//! leave the process, and decrypted only into an in-memory session that
//! is wiped on lock. Durable storage is an external collaborator behind
//! the [`WalletStore`] trait.
//!
//! # Modules
//!
//! - [`error`] — `WalletError` enum
//! - [`vault`] — Argon2id + AES-256-GCM password encryption
//! - [`bundle`] — secret bundle payloads and their encrypted form
//! - [`store`] — persistence collaborator trait + in-memory impl
//! - [`session`] — unlock/lock lifecycle, wallet creation, rotation

pub mod bundle;
pub mod error;
pub mod session;
pub mod store;
pub mod vault;

// Re-exports for convenient access
pub use bundle::{DecryptedWallet, EncryptedWallet, WalletSecretBundle};
pub use error::WalletError;
pub use session::{CreatedWallet, WalletSession};
pub use store::{MemoryWalletStore, WalletStore};

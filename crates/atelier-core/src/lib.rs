//! # atelier-core — TRON wallet primitives.
//!
//! Chain-level building blocks shared by the wallet vault and the
//! TronGrid client: exact fixed-point token amounts, Base58Check address
//! encoding, secp256k1 key material, and BIP-39 mnemonic handling.
//!
//! # Modules
//!
//! - [`error`] — `AmountError`, `AddressError`, `KeyError`
//! - [`amount`] — 6-decimal fixed-point amounts (USDT and TRX/SUN)
//! - [`address`] — Keccak-256 + Base58Check TRON addresses
//! - [`mnemonic`] — 12-word mnemonic generation and validation
//! - [`keys`] — secp256k1 keypairs derived from mnemonic seeds

pub mod address;
pub mod amount;
pub mod error;
pub mod keys;
pub mod mnemonic;

// Re-exports for convenient access
pub use address::TronAddress;
pub use amount::Amount;
pub use error::{AddressError, AmountError, KeyError};
pub use keys::{KeyPair, PrivateKey, PublicKey, address_from_private_key_hex};
pub use mnemonic::{generate_mnemonic, mnemonic_to_seed, validate_mnemonic};

//! Wallet secret bundles and their encrypted/decrypted forms.
//!
//! A [`WalletSecretBundle`] is the JSON payload fed to the vault. The
//! field names use camelCase to stay compatible with bundles persisted
//! by earlier deployments.

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::WalletError;

/// Plaintext secret material for one wallet.
///
/// Exists only transiently in memory: created at generation or import
/// time and encrypted immediately. `mnemonic` is empty for wallets
/// imported from a raw private key. Zeroized on drop.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct WalletSecretBundle {
    /// Base58Check TRON address.
    pub address: String,
    /// Hex-encoded private key scalar.
    pub private_key: String,
    /// 12-word phrase, or empty for raw-key imports.
    #[serde(default)]
    pub mnemonic: String,
}

impl WalletSecretBundle {
    /// Serialize to the JSON form the vault encrypts.
    pub fn to_json(&self) -> Result<String, WalletError> {
        serde_json::to_string(self).map_err(|e| WalletError::Serialization(e.to_string()))
    }

    /// Parse a decrypted JSON payload, rejecting structurally valid but
    /// incomplete bundles (empty address or private key).
    pub fn from_json(s: &str) -> Result<Self, WalletError> {
        let bundle: WalletSecretBundle =
            serde_json::from_str(s).map_err(|e| WalletError::Serialization(e.to_string()))?;
        if bundle.address.is_empty() || bundle.private_key.is_empty() {
            return Err(WalletError::Serialization(
                "bundle missing address or private key".into(),
            ));
        }
        Ok(bundle)
    }
}

impl fmt::Debug for WalletSecretBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletSecretBundle")
            .field("address", &self.address)
            .field("private_key", &"[REDACTED]")
            .field("mnemonic", &"[REDACTED]")
            .finish()
    }
}

/// An encrypted bundle keyed by business category, safe to persist or
/// transmit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedWallet {
    /// The category ("project") this wallet belongs to.
    pub category_id: String,
    /// Self-contained vault ciphertext.
    pub ciphertext: String,
}

/// A decrypted wallet held in the session map. Never persisted;
/// zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DecryptedWallet {
    pub category_id: String,
    pub address: String,
    pub private_key: String,
    pub mnemonic: String,
}

impl fmt::Debug for DecryptedWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecryptedWallet")
            .field("category_id", &self.category_id)
            .field("address", &self.address)
            .field("private_key", &"[REDACTED]")
            .field("mnemonic", &"[REDACTED]")
            .finish()
    }
}

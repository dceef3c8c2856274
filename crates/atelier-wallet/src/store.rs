//! Persistence collaborator seam.
//!
//! The dashboard application owns the durable store (a relational
//! database in production); this crate only defines the contract it
//! must satisfy plus an in-memory implementation used by tests and the
//! CLI's file-backed store.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::bundle::EncryptedWallet;
use crate::error::WalletError;

/// External storage for encrypted wallet bundles.
///
/// Implementations never see plaintext key material. The batch update
/// exists for master-password rotation and MUST be applied atomically:
/// persisting only part of a re-encrypted batch would leave wallets
/// under two different passwords and make every future unlock fail.
#[async_trait]
pub trait WalletStore: Send + Sync {
    /// All stored encrypted wallets.
    async fn list_encrypted_wallets(&self) -> Result<Vec<EncryptedWallet>, WalletError>;

    /// Persist a newly created wallet. Fails if the category already
    /// has one.
    async fn create_encrypted_wallet(&self, wallet: EncryptedWallet) -> Result<(), WalletError>;

    /// Replace the ciphertexts of existing wallets as one atomic batch.
    async fn update_encrypted_wallets(
        &self,
        batch: Vec<EncryptedWallet>,
    ) -> Result<(), WalletError>;
}

/// In-memory store. Insertion-ordered; the whole vector is swapped on
/// batch update so rotation is atomic by construction.
#[derive(Default)]
pub struct MemoryWalletStore {
    wallets: Mutex<Vec<EncryptedWallet>>,
}

impl MemoryWalletStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed the store, e.g. with fixtures for unlock tests.
    pub fn with_wallets(wallets: Vec<EncryptedWallet>) -> Self {
        Self {
            wallets: Mutex::new(wallets),
        }
    }
}

#[async_trait]
impl WalletStore for MemoryWalletStore {
    async fn list_encrypted_wallets(&self) -> Result<Vec<EncryptedWallet>, WalletError> {
        Ok(self.wallets.lock().await.clone())
    }

    async fn create_encrypted_wallet(&self, wallet: EncryptedWallet) -> Result<(), WalletError> {
        let mut wallets = self.wallets.lock().await;
        if wallets.iter().any(|w| w.category_id == wallet.category_id) {
            return Err(WalletError::DuplicateCategory(wallet.category_id));
        }
        wallets.push(wallet);
        Ok(())
    }

    async fn update_encrypted_wallets(
        &self,
        batch: Vec<EncryptedWallet>,
    ) -> Result<(), WalletError> {
        let mut wallets = self.wallets.lock().await;
        // Validate the full batch before touching anything
        for update in &batch {
            if !wallets.iter().any(|w| w.category_id == update.category_id) {
                return Err(WalletError::Store(format!(
                    "no wallet for category {}",
                    update.category_id
                )));
            }
        }
        for update in batch {
            if let Some(existing) = wallets
                .iter_mut()
                .find(|w| w.category_id == update.category_id)
            {
                existing.ciphertext = update.ciphertext;
            }
        }
        Ok(())
    }
}

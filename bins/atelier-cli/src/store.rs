//! File-backed wallet store.
//!
//! The dashboard keeps encrypted bundles in its database; the CLI keeps
//! them in a JSON file. The whole file is rewritten on every change, so
//! the rotation batch is applied in a single write.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use atelier_wallet::bundle::EncryptedWallet;
use atelier_wallet::error::WalletError;
use atelier_wallet::store::WalletStore;

pub struct FileWalletStore {
    path: PathBuf,
    wallets: Mutex<Vec<EncryptedWallet>>,
}

impl FileWalletStore {
    /// Open (or start) a store at `path`. A missing file is an empty
    /// store; it is created on first write.
    pub fn open(path: &Path) -> Result<Self, WalletError> {
        let wallets = if path.exists() {
            let data = std::fs::read_to_string(path)
                .map_err(|e| WalletError::Store(format!("read {}: {e}", path.display())))?;
            serde_json::from_str(&data)
                .map_err(|e| WalletError::Store(format!("parse {}: {e}", path.display())))?
        } else {
            Vec::new()
        };
        Ok(Self {
            path: path.to_owned(),
            wallets: Mutex::new(wallets),
        })
    }

    fn persist(&self, wallets: &[EncryptedWallet]) -> Result<(), WalletError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| WalletError::Store(format!("create {}: {e}", parent.display())))?;
        }
        let json = serde_json::to_string_pretty(wallets)
            .map_err(|e| WalletError::Serialization(e.to_string()))?;
        std::fs::write(&self.path, json)
            .map_err(|e| WalletError::Store(format!("write {}: {e}", self.path.display())))
    }
}

#[async_trait]
impl WalletStore for FileWalletStore {
    async fn list_encrypted_wallets(&self) -> Result<Vec<EncryptedWallet>, WalletError> {
        Ok(self.wallets.lock().await.clone())
    }

    async fn create_encrypted_wallet(&self, wallet: EncryptedWallet) -> Result<(), WalletError> {
        let mut wallets = self.wallets.lock().await;
        if wallets.iter().any(|w| w.category_id == wallet.category_id) {
            return Err(WalletError::DuplicateCategory(wallet.category_id));
        }
        wallets.push(wallet);
        self.persist(&wallets)
    }

    async fn update_encrypted_wallets(
        &self,
        batch: Vec<EncryptedWallet>,
    ) -> Result<(), WalletError> {
        let mut wallets = self.wallets.lock().await;
        for update in &batch {
            if !wallets.iter().any(|w| w.category_id == update.category_id) {
                return Err(WalletError::Store(format!(
                    "no wallet for category {}",
                    update.category_id
                )));
            }
        }
        let mut updated = wallets.clone();
        for update in batch {
            if let Some(existing) = updated
                .iter_mut()
                .find(|w| w.category_id == update.category_id)
            {
                existing.ciphertext = update.ciphertext;
            }
        }
        self.persist(&updated)?;
        *wallets = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wallet(category: &str, ciphertext: &str) -> EncryptedWallet {
        EncryptedWallet {
            category_id: category.into(),
            ciphertext: ciphertext.into(),
        }
    }

    #[tokio::test]
    async fn missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileWalletStore::open(&dir.path().join("wallets.json")).unwrap();
        assert!(store.list_encrypted_wallets().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/wallets.json");

        let store = FileWalletStore::open(&path).unwrap();
        store.create_encrypted_wallet(wallet("a", "ct")).await.unwrap();

        let reopened = FileWalletStore::open(&path).unwrap();
        let listed = reopened.list_encrypted_wallets().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].category_id, "a");
    }

    #[tokio::test]
    async fn update_batch_rewrites_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallets.json");

        let store = FileWalletStore::open(&path).unwrap();
        store.create_encrypted_wallet(wallet("a", "old")).await.unwrap();
        store
            .update_encrypted_wallets(vec![wallet("a", "new")])
            .await
            .unwrap();

        let reopened = FileWalletStore::open(&path).unwrap();
        assert_eq!(
            reopened.list_encrypted_wallets().await.unwrap()[0].ciphertext,
            "new"
        );
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallets.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            FileWalletStore::open(&path),
            Err(WalletError::Store(_))
        ));
    }
}

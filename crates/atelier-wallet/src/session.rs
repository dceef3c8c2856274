//! In-memory wallet session.
//!
//! Holds decrypted wallets for the duration of an unlocked session and
//! transiently retains the master password so that new wallets can be
//! created without re-prompting. The session is an explicit object the
//! application constructs at startup and drops at logout — there is no
//! ambient global state.
//!
//! # States
//!
//! Locked (initial) → Unlocked via [`WalletSession::unlock`]; back to
//! Locked via [`WalletSession::lock`]. Unlock is all-or-nothing: one
//! bundle failing to decrypt fails the whole attempt, because every
//! wallet is assumed to share the single master password.
//!
//! # Secret hygiene
//!
//! Wallets and the retained password are zeroized when cleared, but the
//! runtime may have copied them (moves, reallocation) before that —
//! best-effort zeroing, not a guarantee.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use zeroize::Zeroizing;

use atelier_core::keys::{KeyPair, PRIVATE_KEY_HEX_LEN};
use atelier_core::mnemonic;

use crate::bundle::{DecryptedWallet, EncryptedWallet, WalletSecretBundle};
use crate::error::WalletError;
use crate::store::WalletStore;
use crate::vault;

/// The secret material returned exactly once when a wallet is created.
///
/// Display the mnemonic to the user immediately; it is not persisted in
/// plaintext anywhere.
pub struct CreatedWallet {
    pub category_id: String,
    pub address: String,
    pub mnemonic: Zeroizing<String>,
}

impl std::fmt::Debug for CreatedWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreatedWallet")
            .field("category_id", &self.category_id)
            .field("address", &self.address)
            .field("mnemonic", &"<redacted>")
            .finish()
    }
}

struct SessionState {
    wallets: HashMap<String, DecryptedWallet>,
    master_password: Option<Zeroizing<String>>,
    unlocked: bool,
}

impl SessionState {
    fn wipe(&mut self) {
        // DecryptedWallet zeroizes on drop; Zeroizing handles the password
        self.wallets.clear();
        self.master_password = None;
        self.unlocked = false;
    }
}

/// Process-local cache of decrypted wallets keyed by category.
///
/// Mutations (`unlock`, `lock`, `add_wallet`, `create_wallet`,
/// `import_wallet`, `rotate_master_password`) take the write lock and
/// therefore serialize against each other and against readers — a
/// reader can never observe a half-populated map.
pub struct WalletSession {
    store: Arc<dyn WalletStore>,
    inner: RwLock<SessionState>,
}

impl WalletSession {
    /// Create a locked session backed by the given store.
    pub fn new(store: Arc<dyn WalletStore>) -> Self {
        Self {
            store,
            inner: RwLock::new(SessionState {
                wallets: HashMap::new(),
                master_password: None,
                unlocked: false,
            }),
        }
    }

    /// Decrypt every stored bundle with `password` and enter the
    /// Unlocked state.
    ///
    /// All-or-nothing: any bundle that fails to decrypt or parses to an
    /// incomplete payload aborts the attempt with
    /// [`WalletError::DecryptionFailed`], leaving the session Locked and
    /// empty. An empty store unlocks trivially (new users have no
    /// wallets yet). On success the password is retained in memory
    /// until [`lock`](Self::lock).
    pub async fn unlock(&self, password: &str) -> Result<(), WalletError> {
        if password.is_empty() {
            return Err(WalletError::InvalidInput("password is required".into()));
        }

        let mut state = self.inner.write().await;
        let encrypted = self.store.list_encrypted_wallets().await?;

        // Stage into a fresh map; commit only if every bundle decrypts
        let mut staged = HashMap::with_capacity(encrypted.len());
        for entry in &encrypted {
            let wallet = decrypt_entry(entry, password)?;
            staged.insert(entry.category_id.clone(), wallet);
        }

        state.wipe();
        state.wallets = staged;
        state.master_password = Some(Zeroizing::new(password.to_owned()));
        state.unlocked = true;
        tracing::debug!(wallets = state.wallets.len(), "session unlocked");
        Ok(())
    }

    /// Clear all decrypted wallets and the retained password.
    pub async fn lock(&self) {
        let mut state = self.inner.write().await;
        state.wipe();
        tracing::debug!("session locked");
    }

    /// Whether the session is currently unlocked.
    pub async fn is_unlocked(&self) -> bool {
        self.inner.read().await.unlocked
    }

    /// Number of wallets in the session map.
    pub async fn wallet_count(&self) -> usize {
        self.inner.read().await.wallets.len()
    }

    /// Look up the decrypted wallet for a category.
    ///
    /// `None` means the session is locked or no wallet exists for the
    /// category.
    pub async fn get_wallet(&self, category_id: &str) -> Option<DecryptedWallet> {
        self.inner.read().await.wallets.get(category_id).cloned()
    }

    /// `(category_id, address)` pairs for every wallet in the session.
    pub async fn addresses(&self) -> Vec<(String, String)> {
        self.inner
            .read()
            .await
            .wallets
            .values()
            .map(|w| (w.category_id.clone(), w.address.clone()))
            .collect()
    }

    /// Insert an already-decrypted wallet into the Unlocked session map.
    pub async fn add_wallet(&self, wallet: DecryptedWallet) -> Result<(), WalletError> {
        let mut state = self.inner.write().await;
        if !state.unlocked {
            return Err(WalletError::Locked);
        }
        state.wallets.insert(wallet.category_id.clone(), wallet);
        Ok(())
    }

    /// Generate a brand-new wallet for a category within an unlocked
    /// session.
    ///
    /// Derives a fresh mnemonic and keypair, encrypts the bundle under
    /// the retained master password, persists the ciphertext, and adds
    /// the wallet to the live map. Returns the mnemonic for its single
    /// showing.
    pub async fn create_wallet(&self, category_id: &str) -> Result<CreatedWallet, WalletError> {
        let mut state = self.inner.write().await;
        if !state.unlocked {
            return Err(WalletError::Locked);
        }
        let password = state.master_password.clone().ok_or(WalletError::Locked)?;
        if state.wallets.contains_key(category_id) {
            return Err(WalletError::DuplicateCategory(category_id.to_string()));
        }

        let phrase = Zeroizing::new(mnemonic::generate_mnemonic());
        let keypair = KeyPair::from_mnemonic(&phrase)?;
        let address = keypair.address().encode();

        self.persist_and_insert(
            &mut state,
            category_id,
            &address,
            &keypair,
            phrase.as_str(),
            &password,
        )
        .await?;

        Ok(CreatedWallet {
            category_id: category_id.to_string(),
            address,
            mnemonic: phrase,
        })
    }

    /// Import a wallet from a 12-word mnemonic or a 64-character hex
    /// private key.
    ///
    /// Returns the derived address. Raw-key imports store an empty
    /// mnemonic in the bundle.
    pub async fn import_wallet(
        &self,
        category_id: &str,
        secret: &str,
    ) -> Result<String, WalletError> {
        let mut state = self.inner.write().await;
        if !state.unlocked {
            return Err(WalletError::Locked);
        }
        let password = state.master_password.clone().ok_or(WalletError::Locked)?;
        if state.wallets.contains_key(category_id) {
            return Err(WalletError::DuplicateCategory(category_id.to_string()));
        }

        let secret = secret.trim();
        let (keypair, phrase) = if mnemonic::validate_mnemonic(secret) {
            (KeyPair::from_mnemonic(secret)?, secret.to_string())
        } else if secret.len() == PRIVATE_KEY_HEX_LEN {
            (KeyPair::from_private_key_hex(secret)?, String::new())
        } else {
            return Err(WalletError::InvalidInput(
                "expected a 12-word mnemonic or a 64-character hex private key".into(),
            ));
        };
        let address = keypair.address().encode();

        self.persist_and_insert(&mut state, category_id, &address, &keypair, &phrase, &password)
            .await?;
        Ok(address)
    }

    /// Re-encrypt every stored bundle under a new master password.
    ///
    /// Decrypts all bundles with `old_password` first — one failure
    /// aborts the rotation with nothing written — then persists the
    /// re-encrypted set as a single batch. If the session was unlocked
    /// it stays unlocked under the new password; a locked session stays
    /// locked.
    pub async fn rotate_master_password(
        &self,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), WalletError> {
        if old_password.is_empty() || new_password.is_empty() {
            return Err(WalletError::InvalidInput("passwords are required".into()));
        }

        let mut state = self.inner.write().await;
        let encrypted = self.store.list_encrypted_wallets().await?;

        let mut reencrypted = Vec::with_capacity(encrypted.len());
        let mut staged = HashMap::with_capacity(encrypted.len());
        for entry in &encrypted {
            let wallet = decrypt_entry(entry, old_password)?;
            let bundle = WalletSecretBundle {
                address: wallet.address.clone(),
                private_key: wallet.private_key.clone(),
                mnemonic: wallet.mnemonic.clone(),
            };
            let ciphertext = vault::encrypt(&bundle.to_json()?, new_password)?;
            reencrypted.push(EncryptedWallet {
                category_id: entry.category_id.clone(),
                ciphertext,
            });
            staged.insert(entry.category_id.clone(), wallet);
        }

        self.store.update_encrypted_wallets(reencrypted).await?;
        tracing::info!(wallets = staged.len(), "master password rotated");

        if state.unlocked {
            state.wallets = staged;
            state.master_password = Some(Zeroizing::new(new_password.to_owned()));
        }
        Ok(())
    }

    /// Encrypt and persist a bundle, then insert the decrypted wallet
    /// into the live map. Callers hold the write lock.
    async fn persist_and_insert(
        &self,
        state: &mut SessionState,
        category_id: &str,
        address: &str,
        keypair: &KeyPair,
        phrase: &str,
        password: &str,
    ) -> Result<(), WalletError> {
        let bundle = WalletSecretBundle {
            address: address.to_string(),
            private_key: keypair.private_key().to_hex(),
            mnemonic: phrase.to_string(),
        };
        let ciphertext = vault::encrypt(&bundle.to_json()?, password)?;

        self.store
            .create_encrypted_wallet(EncryptedWallet {
                category_id: category_id.to_string(),
                ciphertext,
            })
            .await?;

        state.wallets.insert(
            category_id.to_string(),
            DecryptedWallet {
                category_id: category_id.to_string(),
                address: address.to_string(),
                private_key: bundle.private_key.clone(),
                mnemonic: bundle.mnemonic.clone(),
            },
        );
        Ok(())
    }
}

/// Decrypt one stored entry into a session wallet.
///
/// Bundles that decrypt but carry a non-JSON or incomplete payload (a
/// legacy format this deployment no longer writes) fail the unlock the
/// same way a wrong password does; the detail is logged, not surfaced.
fn decrypt_entry(
    entry: &EncryptedWallet,
    password: &str,
) -> Result<DecryptedWallet, WalletError> {
    let plaintext = match vault::decrypt(&entry.ciphertext, password) {
        Ok(p) => Zeroizing::new(p),
        Err(_) => {
            tracing::warn!(category = %entry.category_id, "wallet bundle failed to decrypt");
            return Err(WalletError::DecryptionFailed);
        }
    };

    let bundle = match WalletSecretBundle::from_json(&plaintext) {
        Ok(b) => b,
        Err(_) => {
            tracing::warn!(
                category = %entry.category_id,
                "wallet bundle payload is not a valid secret bundle"
            );
            return Err(WalletError::DecryptionFailed);
        }
    };

    Ok(DecryptedWallet {
        category_id: entry.category_id.clone(),
        address: bundle.address.clone(),
        private_key: bundle.private_key.clone(),
        mnemonic: bundle.mnemonic.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryWalletStore;

    fn session_with(store: MemoryWalletStore) -> WalletSession {
        WalletSession::new(Arc::new(store))
    }

    #[tokio::test]
    async fn starts_locked() {
        let session = session_with(MemoryWalletStore::new());
        assert!(!session.is_unlocked().await);
        assert!(session.get_wallet("a").await.is_none());
    }

    #[tokio::test]
    async fn empty_store_unlocks_trivially() {
        let session = session_with(MemoryWalletStore::new());
        session.unlock("any password").await.unwrap();
        assert!(session.is_unlocked().await);
        assert_eq!(session.wallet_count().await, 0);
    }

    #[tokio::test]
    async fn empty_password_rejected() {
        let session = session_with(MemoryWalletStore::new());
        let err = session.unlock("").await.unwrap_err();
        assert!(matches!(err, WalletError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn add_wallet_requires_unlock() {
        let session = session_with(MemoryWalletStore::new());
        let wallet = DecryptedWallet {
            category_id: "a".into(),
            address: "Taddr".into(),
            private_key: "ab".repeat(32),
            mnemonic: String::new(),
        };
        assert_eq!(
            session.add_wallet(wallet).await.unwrap_err(),
            WalletError::Locked
        );
    }

    #[tokio::test]
    async fn create_wallet_requires_unlock() {
        let session = session_with(MemoryWalletStore::new());
        assert_eq!(
            session.create_wallet("a").await.unwrap_err(),
            WalletError::Locked
        );
    }

    #[tokio::test]
    async fn lock_clears_everything() {
        let session = session_with(MemoryWalletStore::new());
        session.unlock("pw").await.unwrap();
        session.create_wallet("a").await.unwrap();
        assert_eq!(session.wallet_count().await, 1);

        session.lock().await;
        assert!(!session.is_unlocked().await);
        assert_eq!(session.wallet_count().await, 0);
        assert!(session.get_wallet("a").await.is_none());
    }

    #[tokio::test]
    async fn created_wallet_is_live_and_persisted() {
        let store = Arc::new(MemoryWalletStore::new());
        let session = WalletSession::new(store.clone());
        session.unlock("pw").await.unwrap();

        let created = session.create_wallet("brand").await.unwrap();
        assert!(created.address.starts_with('T'));
        assert_eq!(created.mnemonic.split_whitespace().count(), 12);

        let live = session.get_wallet("brand").await.unwrap();
        assert_eq!(live.address, created.address);

        let stored = store.list_encrypted_wallets().await.unwrap();
        assert_eq!(stored.len(), 1);
        // Ciphertext must not leak the secret material
        assert!(!stored[0].ciphertext.contains(&live.private_key));
    }

    #[tokio::test]
    async fn duplicate_category_rejected() {
        let session = session_with(MemoryWalletStore::new());
        session.unlock("pw").await.unwrap();
        session.create_wallet("a").await.unwrap();
        let err = session.create_wallet("a").await.unwrap_err();
        assert_eq!(err, WalletError::DuplicateCategory("a".into()));
    }

    #[tokio::test]
    async fn import_from_mnemonic_matches_derivation() {
        let phrase =
            "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
        let expected = KeyPair::from_mnemonic(phrase).unwrap().address().encode();

        let session = session_with(MemoryWalletStore::new());
        session.unlock("pw").await.unwrap();
        let address = session.import_wallet("a", phrase).await.unwrap();
        assert_eq!(address, expected);

        let wallet = session.get_wallet("a").await.unwrap();
        assert_eq!(wallet.mnemonic, phrase);
    }

    #[tokio::test]
    async fn import_from_raw_key_has_empty_mnemonic() {
        let key_hex = "5eb00bbddcf069084889a8ab9155568165f5c453ccb85e70811aaed6f6da5fc1";
        let session = session_with(MemoryWalletStore::new());
        session.unlock("pw").await.unwrap();
        session.import_wallet("a", key_hex).await.unwrap();

        let wallet = session.get_wallet("a").await.unwrap();
        assert_eq!(wallet.mnemonic, "");
        assert_eq!(wallet.private_key, key_hex);
    }

    #[tokio::test]
    async fn import_garbage_rejected() {
        let session = session_with(MemoryWalletStore::new());
        session.unlock("pw").await.unwrap();
        let err = session.import_wallet("a", "not a secret").await.unwrap_err();
        assert!(matches!(err, WalletError::InvalidInput(_)));
    }
}

//! End-to-end session scenarios against the in-memory store.

use std::sync::Arc;

use atelier_core::keys::KeyPair;
use atelier_wallet::bundle::{EncryptedWallet, WalletSecretBundle};
use atelier_wallet::error::WalletError;
use atelier_wallet::session::WalletSession;
use atelier_wallet::store::{MemoryWalletStore, WalletStore};
use atelier_wallet::vault;

/// Build an encrypted store entry the way the dashboard would persist it.
fn encrypted_entry(category: &str, password: &str) -> (EncryptedWallet, WalletSecretBundle) {
    let mnemonic = atelier_core::generate_mnemonic();
    let keypair = KeyPair::from_mnemonic(&mnemonic).unwrap();
    let bundle = WalletSecretBundle {
        address: keypair.address().encode(),
        private_key: keypair.private_key().to_hex(),
        mnemonic,
    };
    let ciphertext = vault::encrypt(&bundle.to_json().unwrap(), password).unwrap();
    (
        EncryptedWallet {
            category_id: category.into(),
            ciphertext,
        },
        bundle,
    )
}

#[tokio::test]
async fn generate_persist_unlock_roundtrip() {
    let password = "correcthorse1";
    let (entry, bundle) = encrypted_entry("models-berlin", password);
    let store = Arc::new(MemoryWalletStore::with_wallets(vec![entry]));
    let session = WalletSession::new(store);

    session.unlock(password).await.unwrap();

    let wallet = session.get_wallet("models-berlin").await.unwrap();
    assert_eq!(wallet.address, bundle.address);
    assert_eq!(wallet.private_key, bundle.private_key);
    assert_eq!(wallet.mnemonic, bundle.mnemonic);
}

#[tokio::test]
async fn unlock_is_all_or_nothing() {
    let password = "shared-master";
    let (a, _) = encrypted_entry("a", password);
    let (b, _) = encrypted_entry("b", password);
    // One bundle encrypted under a different password poisons the set
    let (c, _) = encrypted_entry("c", "someone-elses-password");

    let store = Arc::new(MemoryWalletStore::with_wallets(vec![a, b, c]));
    let session = WalletSession::new(store);

    let err = session.unlock(password).await.unwrap_err();
    assert_eq!(err, WalletError::DecryptionFailed);

    // No partial state: still locked, map empty
    assert!(!session.is_unlocked().await);
    assert_eq!(session.wallet_count().await, 0);
    assert!(session.get_wallet("a").await.is_none());
}

#[tokio::test]
async fn legacy_non_json_bundle_fails_whole_unlock() {
    let password = "pw";
    let (good, _) = encrypted_entry("good", password);
    // A pre-JSON bundle: the vault decrypts it fine, but the payload is
    // a bare string rather than a secret bundle
    let legacy = EncryptedWallet {
        category_id: "legacy".into(),
        ciphertext: vault::encrypt("deadbeefcafe", password).unwrap(),
    };

    let store = Arc::new(MemoryWalletStore::with_wallets(vec![good, legacy]));
    let session = WalletSession::new(store);

    let err = session.unlock(password).await.unwrap_err();
    assert_eq!(err, WalletError::DecryptionFailed);
    assert_eq!(session.wallet_count().await, 0);
}

#[tokio::test]
async fn wrong_password_then_correct_password() {
    let password = "right";
    let (entry, _) = encrypted_entry("a", password);
    let store = Arc::new(MemoryWalletStore::with_wallets(vec![entry]));
    let session = WalletSession::new(store);

    assert_eq!(
        session.unlock("wrong").await.unwrap_err(),
        WalletError::DecryptionFailed
    );
    session.unlock(password).await.unwrap();
    assert!(session.is_unlocked().await);
}

#[tokio::test]
async fn create_wallet_without_reprompting_after_unlock() {
    let password = "master";
    let store = Arc::new(MemoryWalletStore::new());
    let session = WalletSession::new(store.clone());
    session.unlock(password).await.unwrap();

    // The retained password encrypts the new bundle; no password argument
    let created = session.create_wallet("new-face").await.unwrap();

    // A fresh session proves the persisted ciphertext opens under the
    // same master password
    let session2 = WalletSession::new(store);
    session2.unlock(password).await.unwrap();
    let wallet = session2.get_wallet("new-face").await.unwrap();
    assert_eq!(wallet.address, created.address);
}

#[tokio::test]
async fn rotation_reencrypts_under_new_password() {
    let old = "old-master";
    let new = "new-master";
    let (a, bundle_a) = encrypted_entry("a", old);
    let (b, _) = encrypted_entry("b", old);
    let store = Arc::new(MemoryWalletStore::with_wallets(vec![a, b]));

    let session = WalletSession::new(store.clone());
    session.rotate_master_password(old, new).await.unwrap();

    // Old password no longer opens the set; the new one does
    let reopened = WalletSession::new(store);
    assert_eq!(
        reopened.unlock(old).await.unwrap_err(),
        WalletError::DecryptionFailed
    );
    reopened.unlock(new).await.unwrap();
    assert_eq!(reopened.wallet_count().await, 2);
    assert_eq!(
        reopened.get_wallet("a").await.unwrap().private_key,
        bundle_a.private_key
    );
}

#[tokio::test]
async fn rotation_aborts_on_wrong_old_password() {
    let old = "old-master";
    let (a, _) = encrypted_entry("a", old);
    let original_ciphertext = a.ciphertext.clone();
    let store = Arc::new(MemoryWalletStore::with_wallets(vec![a]));

    let session = WalletSession::new(store.clone());
    let err = session
        .rotate_master_password("not-the-old-one", "new")
        .await
        .unwrap_err();
    assert_eq!(err, WalletError::DecryptionFailed);

    // Nothing was rewritten
    let stored = store.list_encrypted_wallets().await.unwrap();
    assert_eq!(stored[0].ciphertext, original_ciphertext);
}

#[tokio::test]
async fn rotation_keeps_unlocked_session_live() {
    let old = "old-master";
    let (a, _) = encrypted_entry("a", old);
    let store = Arc::new(MemoryWalletStore::with_wallets(vec![a]));
    let session = WalletSession::new(store);

    session.unlock(old).await.unwrap();
    session.rotate_master_password(old, "new-master").await.unwrap();

    // Still unlocked, and the retained password is the new one:
    // creating a wallet succeeds without another unlock
    assert!(session.is_unlocked().await);
    session.create_wallet("post-rotation").await.unwrap();
}

#[tokio::test]
async fn locked_session_stays_locked_after_rotation() {
    let old = "old-master";
    let (a, _) = encrypted_entry("a", old);
    let store = Arc::new(MemoryWalletStore::with_wallets(vec![a]));
    let session = WalletSession::new(store);

    session.rotate_master_password(old, "new-master").await.unwrap();
    assert!(!session.is_unlocked().await);
    assert!(session.get_wallet("a").await.is_none());
}

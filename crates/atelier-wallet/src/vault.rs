//! Master-password encryption for wallet secret bundles.
//!
//! Argon2id derives a 256-bit key from the password and a fresh random
//! salt; AES-256-GCM provides authenticated encryption. The output is a
//! single base64 string that embeds everything needed for decryption, so
//! it can be stored in a text column or shipped over the wire as-is.
//!
//! # Wire format (inside the base64)
//! ```text
//! salt (16 bytes) || nonce (12 bytes) || ciphertext + auth_tag
//! ```
//!
//! Decryption failures are collapsed into one error: a wrong password
//! and a corrupted ciphertext are indistinguishable to the caller, so
//! the error cannot be used as an oracle for ciphertext structure.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use argon2::Argon2;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use zeroize::Zeroize;

use crate::error::WalletError;

/// Salt length in bytes.
const SALT_LEN: usize = 16;

/// AES-GCM nonce length in bytes.
const NONCE_LEN: usize = 12;

/// Minimum decoded payload size (salt + nonce + auth tag).
const MIN_ENCRYPTED_LEN: usize = SALT_LEN + NONCE_LEN + 16;

/// Derive a 256-bit encryption key from a password and salt with
/// Argon2id (default parameters).
fn derive_key(password: &str, salt: &[u8]) -> Result<[u8; 32], argon2::Error> {
    let mut key = [0u8; 32];
    Argon2::default().hash_password_into(password.as_bytes(), salt, &mut key)?;
    Ok(key)
}

/// Encrypt a plaintext string under a password.
///
/// Generates a fresh salt and nonce per call, so encrypting the same
/// plaintext twice yields different ciphertexts. Rejects empty
/// plaintext or password before touching any key material.
pub fn encrypt(plaintext: &str, password: &str) -> Result<String, WalletError> {
    if plaintext.is_empty() || password.is_empty() {
        return Err(WalletError::InvalidInput(
            "plaintext and password are required".into(),
        ));
    }

    use rand::RngCore;
    let mut salt = [0u8; SALT_LEN];
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);

    let mut key =
        derive_key(password, &salt).map_err(|e| WalletError::Encryption(e.to_string()))?;
    let cipher = Aes256Gcm::new_from_slice(&key)
        .map_err(|e| WalletError::Encryption(e.to_string()))?;
    key.zeroize();
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|e| WalletError::Encryption(e.to_string()))?;

    let mut payload = Vec::with_capacity(SALT_LEN + NONCE_LEN + ciphertext.len());
    payload.extend_from_slice(&salt);
    payload.extend_from_slice(&nonce_bytes);
    payload.extend_from_slice(&ciphertext);
    Ok(BASE64.encode(payload))
}

/// Decrypt a string produced by [`encrypt`].
///
/// Every failure mode after the empty-argument check — bad base64,
/// truncated payload, authentication tag mismatch, non-UTF-8 or empty
/// plaintext — returns [`WalletError::DecryptionFailed`].
pub fn decrypt(ciphertext: &str, password: &str) -> Result<String, WalletError> {
    if ciphertext.is_empty() || password.is_empty() {
        return Err(WalletError::InvalidInput(
            "ciphertext and password are required".into(),
        ));
    }

    let raw = BASE64
        .decode(ciphertext)
        .map_err(|_| WalletError::DecryptionFailed)?;
    if raw.len() < MIN_ENCRYPTED_LEN {
        return Err(WalletError::DecryptionFailed);
    }

    let salt = &raw[..SALT_LEN];
    let nonce_bytes = &raw[SALT_LEN..SALT_LEN + NONCE_LEN];
    let body = &raw[SALT_LEN + NONCE_LEN..];

    let mut key = derive_key(password, salt).map_err(|_| WalletError::DecryptionFailed)?;
    let cipher =
        Aes256Gcm::new_from_slice(&key).map_err(|_| WalletError::DecryptionFailed)?;
    key.zeroize();
    let nonce = Nonce::from_slice(nonce_bytes);

    let plaintext_bytes = cipher
        .decrypt(nonce, body)
        .map_err(|_| WalletError::DecryptionFailed)?;

    let plaintext =
        String::from_utf8(plaintext_bytes).map_err(|_| WalletError::DecryptionFailed)?;
    if plaintext.is_empty() {
        return Err(WalletError::DecryptionFailed);
    }
    Ok(plaintext)
}

//! secp256k1 key material and deterministic derivation from a mnemonic.
//!
//! The private key is the first 32 bytes of the 64-byte BIP-39 seed,
//! computed with an empty passphrase. There is no BIP-32/44 hierarchy:
//! one mnemonic maps to exactly one keypair and one address. This is
//! deliberately simpler than standard HD wallets and NOT compatible with
//! them — a standard wallet app given the same phrase derives a
//! different address.

use k256::ecdsa::{SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::address::TronAddress;
use crate::error::KeyError;
use crate::mnemonic;

/// Hex characters in a serialized private key.
pub const PRIVATE_KEY_HEX_LEN: usize = 64;

/// A 32-byte secp256k1 private key scalar.
///
/// Zeroized on drop; `Debug` never prints the bytes.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey {
    bytes: [u8; 32],
}

impl PrivateKey {
    /// Wrap raw scalar bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    /// Parse a 64-character hex private key.
    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        if s.len() != PRIVATE_KEY_HEX_LEN {
            return Err(KeyError::InvalidKeyFormat(format!(
                "expected {PRIVATE_KEY_HEX_LEN} hex characters, got {}",
                s.len()
            )));
        }
        let decoded = hex::decode(s)
            .map_err(|_| KeyError::InvalidKeyFormat("non-hex character".into()))?;
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&decoded);
        Ok(Self { bytes })
    }

    /// The raw scalar bytes. Handle with care.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Hex encoding of the scalar, as stored in secret bundles.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl Clone for PrivateKey {
    fn clone(&self) -> Self {
        Self { bytes: self.bytes }
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// An uncompressed (65-byte, 0x04-tagged) secp256k1 public key point.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey {
    point: [u8; 65],
}

impl PublicKey {
    /// The raw SEC1 uncompressed encoding.
    pub fn as_bytes(&self) -> &[u8; 65] {
        &self.point
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(self.point))
    }
}

/// A secp256k1 keypair for signing transfer transactions.
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Build a keypair from a private key scalar.
    ///
    /// Fails with [`KeyError::CryptoFailure`] if the scalar is zero or
    /// not below the curve order — vanishingly rare for honestly derived
    /// keys.
    pub fn from_private_key(private_key: &PrivateKey) -> Result<Self, KeyError> {
        let signing_key = SigningKey::from_slice(private_key.as_bytes())
            .map_err(|e| KeyError::CryptoFailure(e.to_string()))?;
        Ok(Self { signing_key })
    }

    /// Build a keypair from a 64-character hex private key.
    pub fn from_private_key_hex(s: &str) -> Result<Self, KeyError> {
        Self::from_private_key(&PrivateKey::from_hex(s)?)
    }

    /// Derive the keypair for a 12-word mnemonic.
    ///
    /// Deterministic: the same phrase always yields the same keypair.
    /// Uses the first 32 bytes of the BIP-39 seed directly — no
    /// derivation path (see module docs).
    pub fn from_mnemonic(phrase: &str) -> Result<Self, KeyError> {
        let mut seed = mnemonic::mnemonic_to_seed(phrase)?;
        let mut scalar = [0u8; 32];
        scalar.copy_from_slice(&seed[..32]);
        seed.zeroize();
        let key = PrivateKey::from_bytes(scalar);
        Self::from_private_key(&key)
    }

    /// The private key scalar.
    pub fn private_key(&self) -> PrivateKey {
        PrivateKey::from_bytes(self.signing_key.to_bytes().into())
    }

    /// The uncompressed public key point.
    pub fn public_key(&self) -> PublicKey {
        let encoded = self.signing_key.verifying_key().to_encoded_point(false);
        let mut point = [0u8; 65];
        point.copy_from_slice(encoded.as_bytes());
        PublicKey { point }
    }

    /// The TRON address for this keypair.
    pub fn address(&self) -> TronAddress {
        TronAddress::from_public_key(&self.public_key())
    }

    /// Sign a 32-byte message digest, returning the 64-byte `r || s`
    /// signature and the recovery id.
    pub fn sign_digest_recoverable(&self, digest: &[u8; 32]) -> Result<([u8; 64], u8), KeyError> {
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(digest)
            .map_err(|e| KeyError::CryptoFailure(e.to_string()))?;
        let mut sig = [0u8; 64];
        sig.copy_from_slice(&signature.to_bytes());
        Ok((sig, recovery_id.to_byte()))
    }

    /// The verifying half of this keypair.
    pub fn verifying_key(&self) -> &VerifyingKey {
        self.signing_key.verifying_key()
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// Derive the address for a hex private key without keeping the keypair.
pub fn address_from_private_key_hex(s: &str) -> Result<TronAddress, KeyError> {
    Ok(KeyPair::from_private_key_hex(s)?.address())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mnemonic::generate_mnemonic;

    /// Trezor test vector phrase; seed prefix checked in mnemonic tests.
    const VECTOR_PHRASE: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
    const VECTOR_PRIVATE_KEY: &str =
        "5eb00bbddcf069084889a8ab9155568165f5c453ccb85e70811aaed6f6da5fc1";

    #[test]
    fn private_key_hex_roundtrip() {
        let key = PrivateKey::from_hex(&"ab".repeat(32)).unwrap();
        assert_eq!(key.to_hex(), "ab".repeat(32));
    }

    #[test]
    fn private_key_rejects_wrong_length() {
        let err = PrivateKey::from_hex("abcd").unwrap_err();
        assert!(matches!(err, KeyError::InvalidKeyFormat(_)));
        let err = PrivateKey::from_hex(&"ab".repeat(33)).unwrap_err();
        assert!(matches!(err, KeyError::InvalidKeyFormat(_)));
    }

    #[test]
    fn private_key_rejects_non_hex() {
        let err = PrivateKey::from_hex(&"zz".repeat(32)).unwrap_err();
        assert!(matches!(err, KeyError::InvalidKeyFormat(_)));
    }

    #[test]
    fn private_key_debug_redacts() {
        let key = PrivateKey::from_hex(&"ab".repeat(32)).unwrap();
        let debug = format!("{key:?}");
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("ab"));
    }

    #[test]
    fn zero_scalar_rejected() {
        let err = KeyPair::from_private_key_hex(&"00".repeat(32)).unwrap_err();
        assert!(matches!(err, KeyError::CryptoFailure(_)));
    }

    #[test]
    fn vector_mnemonic_derives_expected_private_key() {
        let kp = KeyPair::from_mnemonic(VECTOR_PHRASE).unwrap();
        assert_eq!(kp.private_key().to_hex(), VECTOR_PRIVATE_KEY);
    }

    #[test]
    fn derivation_is_deterministic() {
        let phrase = generate_mnemonic();
        let a = KeyPair::from_mnemonic(&phrase).unwrap();
        let b = KeyPair::from_mnemonic(&phrase).unwrap();
        assert_eq!(a.private_key().to_hex(), b.private_key().to_hex());
        assert_eq!(a.public_key(), b.public_key());
        assert_eq!(a.address(), b.address());
    }

    #[test]
    fn different_mnemonics_differ() {
        let a = KeyPair::from_mnemonic(&generate_mnemonic()).unwrap();
        let b = KeyPair::from_mnemonic(&generate_mnemonic()).unwrap();
        assert_ne!(a.address(), b.address());
    }

    #[test]
    fn public_key_is_uncompressed() {
        let kp = KeyPair::from_private_key_hex(VECTOR_PRIVATE_KEY).unwrap();
        let pk = kp.public_key();
        assert_eq!(pk.as_bytes().len(), 65);
        assert_eq!(pk.as_bytes()[0], 0x04);
    }

    #[test]
    fn hex_key_and_mnemonic_agree() {
        let kp = KeyPair::from_mnemonic(VECTOR_PHRASE).unwrap();
        let from_hex = KeyPair::from_private_key_hex(&kp.private_key().to_hex()).unwrap();
        assert_eq!(from_hex.address(), kp.address());
    }

    #[test]
    fn signature_is_deterministic_rfc6979() {
        let kp = KeyPair::from_private_key_hex(VECTOR_PRIVATE_KEY).unwrap();
        let digest = [7u8; 32];
        let (sig_a, rec_a) = kp.sign_digest_recoverable(&digest).unwrap();
        let (sig_b, rec_b) = kp.sign_digest_recoverable(&digest).unwrap();
        assert_eq!(sig_a, sig_b);
        assert_eq!(rec_a, rec_b);
        assert!(rec_a <= 1);
    }

    #[test]
    fn address_helper_matches_keypair() {
        let kp = KeyPair::from_private_key_hex(VECTOR_PRIVATE_KEY).unwrap();
        let addr = address_from_private_key_hex(VECTOR_PRIVATE_KEY).unwrap();
        assert_eq!(addr, kp.address());
    }
}

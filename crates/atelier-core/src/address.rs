//! TRON address encoding.
//!
//! An address is derived from an uncompressed secp256k1 public key: drop
//! the SEC1 format byte, Keccak-256 the remaining 64 bytes, keep the last
//! 20 bytes of the digest, prepend the 0x41 network prefix, and
//! Base58Check-encode the 21-byte payload (4-byte double-SHA-256
//! checksum, each leading zero byte rendered as a leading '1'). Mainnet
//! addresses are 34 characters starting with 'T'.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;

use crate::error::AddressError;
use crate::keys::PublicKey;

/// Network prefix byte for TRON addresses.
pub const ADDRESS_PREFIX: u8 = 0x41;

/// Raw address length: prefix byte plus 20-byte pubkey hash.
pub const RAW_ADDRESS_LEN: usize = 21;

/// A validated TRON address.
///
/// Stores the 21-byte raw form (prefix + Keccak-256 pubkey hash tail);
/// the human-readable Base58Check string is produced on demand.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TronAddress {
    bytes: [u8; RAW_ADDRESS_LEN],
}

impl TronAddress {
    /// Derive the address for an uncompressed secp256k1 public key.
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        // Skip the 0x04 SEC1 tag, hash the 64-byte point
        let digest = Keccak256::digest(&public_key.as_bytes()[1..]);

        let mut bytes = [0u8; RAW_ADDRESS_LEN];
        bytes[0] = ADDRESS_PREFIX;
        bytes[1..].copy_from_slice(&digest[digest.len() - 20..]);
        Self { bytes }
    }

    /// Construct from the 21-byte raw form, validating the prefix.
    pub fn from_raw(bytes: [u8; RAW_ADDRESS_LEN]) -> Result<Self, AddressError> {
        if bytes[0] != ADDRESS_PREFIX {
            return Err(AddressError::InvalidPrefix(bytes[0]));
        }
        Ok(Self { bytes })
    }

    /// Decode and validate a Base58Check address string.
    pub fn from_base58(s: &str) -> Result<Self, AddressError> {
        if s.is_empty() {
            return Err(AddressError::Empty);
        }
        let decoded = bs58::decode(s)
            .with_check(None)
            .into_vec()
            .map_err(map_decode_error)?;
        if decoded.len() != RAW_ADDRESS_LEN {
            return Err(AddressError::InvalidLength(decoded.len()));
        }
        let mut bytes = [0u8; RAW_ADDRESS_LEN];
        bytes.copy_from_slice(&decoded);
        Self::from_raw(bytes)
    }

    /// Whether `s` is a well-formed, checksummed TRON address.
    ///
    /// Never panics; used to vet recipient input before building a
    /// transfer.
    pub fn is_valid(s: &str) -> bool {
        Self::from_base58(s).is_ok()
    }

    /// Encode as the Base58Check string.
    pub fn encode(&self) -> String {
        bs58::encode(&self.bytes).with_check().into_string()
    }

    /// The raw 21-byte form (prefix included).
    pub fn raw(&self) -> &[u8; RAW_ADDRESS_LEN] {
        &self.bytes
    }

    /// Hex of the 20-byte pubkey hash, without the network prefix.
    pub fn hash_hex(&self) -> String {
        hex::encode(&self.bytes[1..])
    }

    /// The address as a 32-byte ABI word: 20-byte hash left-padded with
    /// zeros to 64 hex characters, as expected by `transfer(address,uint256)`
    /// and `balanceOf(address)` parameters.
    pub fn abi_word(&self) -> String {
        format!("{:0>64}", self.hash_hex())
    }
}

impl fmt::Display for TronAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

impl fmt::Debug for TronAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TronAddress({})", self.encode())
    }
}

impl FromStr for TronAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58(s)
    }
}

impl Serialize for TronAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for TronAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_base58(&s).map_err(serde::de::Error::custom)
    }
}

fn map_decode_error(e: bs58::decode::Error) -> AddressError {
    match e {
        bs58::decode::Error::InvalidChecksum { .. } | bs58::decode::Error::NoChecksum => {
            AddressError::InvalidChecksum
        }
        bs58::decode::Error::InvalidCharacter { character, .. } => {
            AddressError::InvalidCharacter(character)
        }
        other => AddressError::Decode(other.to_string()),
    }
}

//! Error types for TRON primitives.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("empty amount")] Empty,
    #[error("invalid amount: {0}")] InvalidDigit(String),
    #[error("sign not allowed in amount: {0}")] SignNotAllowed(String),
    #[error("too many decimal places: {got} > {max}")] TooManyDecimals { got: usize, max: usize },
    #[error("amount overflow")] Overflow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("empty address")] Empty,
    #[error("invalid character: {0}")] InvalidCharacter(char),
    #[error("invalid checksum")] InvalidChecksum,
    #[error("invalid length: {0} bytes")] InvalidLength(usize),
    #[error("invalid address prefix: {0:#04x}")] InvalidPrefix(u8),
    #[error("invalid public key: expected 65-byte uncompressed point")] InvalidPublicKey,
    #[error("base58 decode: {0}")] Decode(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid key format: {0}")] InvalidKeyFormat(String),
    #[error("invalid mnemonic: {0}")] InvalidMnemonic(String),
    #[error("crypto failure: {0}")] CryptoFailure(String),
}

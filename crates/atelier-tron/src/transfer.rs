//! USDT transfer construction, signing, broadcast, and status polling.
//!
//! The node builds the unsigned contract-call transaction
//! (`triggersmartcontract`); we recompute the transaction id as the
//! SHA-256 of `raw_data_hex`, cross-check it against the node's `txID`,
//! sign it with recoverable secp256k1 ECDSA, and broadcast. Fee
//! estimates use fixed heuristic constants — they are advisory numbers
//! for the UI, not a quote; actual network fees depend on the account's
//! staked resources and current prices.
//!
//! A failed broadcast is never retried here: without an idempotency key
//! a resubmission risks sending the same funds twice. Callers decide
//! after checking [`TransferService::transaction_status`].

use std::sync::Arc;

use serde_json::{Value, json};
use sha2::{Digest, Sha256};

use atelier_core::keys::KeyPair;
use atelier_core::{Amount, TronAddress};

use crate::error::TronError;
use crate::network::Network;
use crate::rpc::TronRpc;

/// `transfer(address,uint256)` function selector.
const TRANSFER_SELECTOR: &str = "transfer(address,uint256)";

/// Energy consumed by a typical USDT transfer (conservative upper
/// estimate; transfers to fresh addresses cost the most).
pub const ESTIMATED_ENERGY: u64 = 65_000;

/// SUN per energy unit.
pub const ENERGY_PRICE_SUN: u64 = 420;

/// Serialized size of a transfer transaction in bytes.
pub const ESTIMATED_BANDWIDTH_BYTES: u64 = 345;

/// SUN per bandwidth byte.
pub const BANDWIDTH_PRICE_SUN: u64 = 1_000;

/// Maximum fee the signed transaction authorizes (100 TRX in SUN).
pub const FEE_LIMIT_SUN: u64 = 100_000_000;

/// Recovery id offset in the signature's trailing byte. TronWeb emits
/// v = recovery_id + 27 and java-tron accepts both offsets; we match
/// TronWeb.
const RECOVERY_ID_OFFSET: u8 = 27;

/// Advisory fee breakdown for a USDT transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeeEstimate {
    /// Energy cost in SUN.
    pub energy_fee_sun: u64,
    /// Bandwidth cost in SUN.
    pub bandwidth_fee_sun: u64,
    /// Combined fee in TRX.
    pub total_fee: Amount,
    /// Energy units assumed.
    pub estimated_energy: u64,
    /// Bandwidth bytes assumed.
    pub estimated_bandwidth: u64,
}

/// Outcome of a broadcast attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionResult {
    pub success: bool,
    pub tx_hash: Option<String>,
    pub error: Option<String>,
}

impl TransactionResult {
    fn ok(tx_hash: String) -> Self {
        Self {
            success: true,
            tx_hash: Some(tx_hash),
            error: None,
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            tx_hash: None,
            error: Some(message.into()),
        }
    }
}

/// Confirmation state of a broadcast transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxStatus {
    /// Not yet found or not yet executed.
    Pending,
    /// Executed successfully.
    Confirmed,
    /// Executed and reverted or rejected.
    Failed,
}

/// Builds, signs, and tracks USDT transfers.
pub struct TransferService {
    rpc: Arc<dyn TronRpc>,
    usdt_contract: TronAddress,
}

impl TransferService {
    pub fn new(rpc: Arc<dyn TronRpc>, network: Network) -> Self {
        Self {
            rpc,
            usdt_contract: network.usdt_contract(),
        }
    }

    /// Estimate the fee for a transfer. Advisory only.
    ///
    /// Asks the node to build the unsigned call, proving the transfer
    /// is constructible, then applies the heuristic constants. Returns
    /// `None` on any failure — estimation is a UX nicety and must never
    /// surface an error to the caller.
    pub async fn estimate_fee(
        &self,
        from: &TronAddress,
        to: &TronAddress,
        amount: Amount,
    ) -> Option<FeeEstimate> {
        let parameter = encode_transfer_params(to, amount);
        match self
            .rpc
            .trigger_smart_contract(
                from,
                &self.usdt_contract,
                TRANSFER_SELECTOR,
                &parameter,
                FEE_LIMIT_SUN,
            )
            .await
        {
            Ok(_) => Some(heuristic_fee()),
            Err(e) => {
                tracing::warn!(error = %e, "fee estimation failed");
                None
            }
        }
    }

    /// Sign and broadcast a USDT transfer.
    ///
    /// Validates the recipient before any node call; an address failing
    /// validation returns a failed result without touching the network.
    /// Node and transport failures come back as a failed result with a
    /// readable message, never as a panic or a silent drop.
    pub async fn send_transfer(
        &self,
        private_key_hex: &str,
        to: &str,
        amount: Amount,
    ) -> TransactionResult {
        let to = match TronAddress::from_base58(to) {
            Ok(addr) => addr,
            Err(_) => return TransactionResult::failure("invalid recipient address"),
        };
        let keypair = match KeyPair::from_private_key_hex(private_key_hex) {
            Ok(kp) => kp,
            Err(e) => return TransactionResult::failure(format!("invalid private key: {e}")),
        };
        if amount.is_zero() {
            return TransactionResult::failure("amount must be greater than zero");
        }

        match self.broadcast_transfer(&keypair, &to, amount).await {
            Ok(txid) => {
                tracing::info!(txid = %txid, amount = %amount, "transfer broadcast");
                TransactionResult::ok(txid)
            }
            Err(e) => {
                tracing::warn!(error = %e, "transfer failed");
                TransactionResult::failure(e.to_string())
            }
        }
    }

    async fn broadcast_transfer(
        &self,
        keypair: &KeyPair,
        to: &TronAddress,
        amount: Amount,
    ) -> Result<String, TronError> {
        let from = keypair.address();
        let parameter = encode_transfer_params(to, amount);

        let response = self
            .rpc
            .trigger_smart_contract(
                &from,
                &self.usdt_contract,
                TRANSFER_SELECTOR,
                &parameter,
                FEE_LIMIT_SUN,
            )
            .await?;

        let mut transaction = response
            .get("transaction")
            .cloned()
            .ok_or_else(|| TronError::InvalidResponse("missing transaction".into()))?;

        let raw_data_hex = transaction["raw_data_hex"]
            .as_str()
            .ok_or_else(|| TronError::InvalidResponse("missing raw_data_hex".into()))?;
        let raw_data = hex::decode(raw_data_hex)
            .map_err(|_| TronError::InvalidResponse("raw_data_hex is not hex".into()))?;

        // The transaction id is the hash of the raw payload; signing it
        // signs the whole transaction. Cross-check the node's value so a
        // tampered or confused node cannot make us sign something else.
        let digest: [u8; 32] = Sha256::digest(&raw_data).into();
        let txid = hex::encode(digest);
        if let Some(node_txid) = transaction["txID"].as_str() {
            if node_txid != txid {
                return Err(TronError::InvalidResponse(
                    "transaction id does not match raw_data_hex".into(),
                ));
            }
        }

        let (signature, recovery_id) = keypair.sign_digest_recoverable(&digest)?;
        let mut signature_bytes = Vec::with_capacity(65);
        signature_bytes.extend_from_slice(&signature);
        signature_bytes.push(recovery_id + RECOVERY_ID_OFFSET);
        transaction["signature"] = json!([hex::encode(signature_bytes)]);

        let broadcast = self.rpc.broadcast_transaction(transaction).await?;
        if broadcast["result"].as_bool() == Some(true) {
            let txid = broadcast["txid"]
                .as_str()
                .map(str::to_owned)
                .unwrap_or(txid);
            Ok(txid)
        } else {
            Err(TronError::Node {
                code: broadcast["code"].as_str().unwrap_or("UNKNOWN").to_owned(),
                message: decode_node_message(&broadcast["message"]),
            })
        }
    }

    /// Poll the confirmation state of a broadcast transaction.
    ///
    /// "Not yet found" is [`TxStatus::Pending`], not an error; the same
    /// goes for transient RPC failures — the caller polls again.
    pub async fn transaction_status(&self, txid: &str) -> TxStatus {
        match self.try_status(txid).await {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!(txid, error = %e, "status poll failed, treating as pending");
                TxStatus::Pending
            }
        }
    }

    async fn try_status(&self, txid: &str) -> Result<TxStatus, TronError> {
        let transaction = self.rpc.get_transaction_by_id(txid).await?;
        if transaction.get("txID").is_none() {
            // The node answers an unknown id with an empty object
            return Ok(TxStatus::Pending);
        }

        let info = self.rpc.get_transaction_info_by_id(txid).await?;
        Ok(receipt_status(&info))
    }
}

/// ABI-encode the `transfer(address,uint256)` arguments: two 32-byte
/// words, the recipient's 20-byte hash and the amount in smallest
/// units.
pub fn encode_transfer_params(to: &TronAddress, amount: Amount) -> String {
    format!("{}{:064x}", to.abi_word(), amount.as_units())
}

/// The fixed heuristic fee table.
fn heuristic_fee() -> FeeEstimate {
    let energy_fee_sun = ESTIMATED_ENERGY * ENERGY_PRICE_SUN;
    let bandwidth_fee_sun = ESTIMATED_BANDWIDTH_BYTES * BANDWIDTH_PRICE_SUN;
    FeeEstimate {
        energy_fee_sun,
        bandwidth_fee_sun,
        total_fee: Amount::from_units(energy_fee_sun + bandwidth_fee_sun),
        estimated_energy: ESTIMATED_ENERGY,
        estimated_bandwidth: ESTIMATED_BANDWIDTH_BYTES,
    }
}

/// Map a transaction-info response to a status via its receipt.
fn receipt_status(info: &Value) -> TxStatus {
    match info.get("receipt") {
        Some(receipt) if receipt.is_object() => {
            if receipt["result"].as_str() == Some("SUCCESS") {
                TxStatus::Confirmed
            } else {
                TxStatus::Failed
            }
        }
        _ => TxStatus::Pending,
    }
}

/// Broadcast error messages arrive hex-encoded; decode when possible.
fn decode_node_message(message: &Value) -> String {
    let Some(s) = message.as_str() else {
        return "broadcast rejected".into();
    };
    match hex::decode(s)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
    {
        Some(decoded) => decoded,
        None => s.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn heuristic_fee_matches_constants() {
        let fee = heuristic_fee();
        assert_eq!(fee.energy_fee_sun, 27_300_000);
        assert_eq!(fee.bandwidth_fee_sun, 345_000);
        // 27_645_000 SUN is 27.645 TRX
        assert_eq!(fee.total_fee, Amount::from_units(27_645_000));
        assert_eq!(fee.total_fee.to_string(), "27.645");
        assert!(fee.total_fee > Amount::ZERO);
    }

    #[test]
    fn transfer_params_are_two_words() {
        let kp = KeyPair::from_private_key_hex(&"11".repeat(32)).unwrap();
        let to = kp.address();
        let params = encode_transfer_params(&to, Amount::from_units(10_500_000));
        assert_eq!(params.len(), 128);
        assert!(params.starts_with(&to.abi_word()));
        assert!(params.ends_with("a037a0"), "{params}"); // 10_500_000 = 0xa037a0
    }

    #[test]
    fn receipt_status_mapping() {
        assert_eq!(
            receipt_status(&json!({"receipt": {"result": "SUCCESS"}})),
            TxStatus::Confirmed
        );
        assert_eq!(
            receipt_status(&json!({"receipt": {"result": "REVERT"}})),
            TxStatus::Failed
        );
        assert_eq!(
            receipt_status(&json!({"receipt": {"result": "OUT_OF_ENERGY"}})),
            TxStatus::Failed
        );
        assert_eq!(receipt_status(&json!({})), TxStatus::Pending);
        assert_eq!(receipt_status(&json!({"receipt": null})), TxStatus::Pending);
    }

    #[test]
    fn node_message_hex_decoding() {
        // "Contract validate error" in hex
        let hex_msg = hex::encode("Contract validate error");
        assert_eq!(
            decode_node_message(&json!(hex_msg)),
            "Contract validate error"
        );
        assert_eq!(decode_node_message(&json!("not hex")), "not hex");
        assert_eq!(decode_node_message(&json!(null)), "broadcast rejected");
    }
}

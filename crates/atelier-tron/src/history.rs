//! TRC-20 transfer history for an address.
//!
//! Used by the dashboard's transaction-sync job to pull incoming and
//! outgoing USDT movements. History is a display and bookkeeping
//! concern: any read failure logs a warning and yields an empty list,
//! and malformed rows are skipped rather than aborting the page.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use atelier_core::{Amount, TronAddress};

use crate::error::TronError;
use crate::network::Network;
use crate::rpc::TronRpc;

/// Default page size when the caller does not specify one.
pub const DEFAULT_LIMIT: u32 = 20;

/// Whether a transfer moved funds into or out of the queried address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Incoming,
    Outgoing,
}

/// One USDT transfer touching the queried address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransferRecord {
    pub tx_hash: String,
    pub from: String,
    pub to: String,
    pub amount: Amount,
    /// Block timestamp in milliseconds.
    pub timestamp: u64,
    pub block_number: u64,
    pub direction: Direction,
}

/// Transfer-log queries against a node.
pub struct TransferHistory {
    rpc: Arc<dyn TronRpc>,
    usdt_contract: TronAddress,
}

impl TransferHistory {
    pub fn new(rpc: Arc<dyn TronRpc>, network: Network) -> Self {
        Self {
            rpc,
            usdt_contract: network.usdt_contract(),
        }
    }

    /// USDT transfers touching `address`, newest first as the node
    /// returns them. Empty on any failure.
    pub async fn usdt_transfers(
        &self,
        address: &TronAddress,
        limit: u32,
        min_timestamp: Option<u64>,
    ) -> Vec<TransferRecord> {
        match self.try_transfers(address, limit, min_timestamp).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(address = %address, error = %e, "transfer history read failed");
                Vec::new()
            }
        }
    }

    /// Transfers strictly newer than `last_seen_timestamp` (ms), for
    /// incremental sync.
    pub async fn transfers_since(
        &self,
        address: &TronAddress,
        last_seen_timestamp: u64,
    ) -> Vec<TransferRecord> {
        self.usdt_transfers(address, 50, Some(last_seen_timestamp))
            .await
            .into_iter()
            .filter(|t| t.timestamp > last_seen_timestamp)
            .collect()
    }

    async fn try_transfers(
        &self,
        address: &TronAddress,
        limit: u32,
        min_timestamp: Option<u64>,
    ) -> Result<Vec<TransferRecord>, TronError> {
        let response = self
            .rpc
            .list_trc20_transfers(address, &self.usdt_contract, limit, min_timestamp)
            .await?;

        let Some(rows) = response["data"].as_array() else {
            return Ok(Vec::new());
        };

        let owner = address.encode();
        let records = rows
            .iter()
            .filter_map(|row| parse_record(row, &owner))
            .collect();
        Ok(records)
    }
}

/// Parse one TronGrid TRC-20 row; `None` skips malformed rows.
fn parse_record(row: &Value, owner: &str) -> Option<TransferRecord> {
    let tx_hash = row["transaction_id"].as_str()?.to_owned();
    let from = row["from"].as_str()?.to_owned();
    let to = row["to"].as_str()?.to_owned();
    // TronGrid serializes the value as a decimal string of smallest units
    let units = match &row["value"] {
        Value::String(s) => s.parse::<u64>().ok()?,
        Value::Number(n) => n.as_u64()?,
        _ => return None,
    };
    let timestamp = row["block_timestamp"].as_u64()?;
    let block_number = row["block_number"].as_u64().unwrap_or(0);

    let direction = if to.eq_ignore_ascii_case(owner) {
        Direction::Incoming
    } else {
        Direction::Outgoing
    };

    Some(TransferRecord {
        tx_hash,
        from,
        to,
        amount: Amount::from_units(units),
        timestamp,
        block_number,
        direction,
    })
}

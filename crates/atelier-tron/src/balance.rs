//! On-chain balance reads.
//!
//! Balances are display values for the dashboard, so every read failure
//! degrades to zero with a logged warning rather than an error — the UI
//! treats "could not determine balance" as "0" by policy. Nothing in
//! the signing or broadcast path consumes these values.

use std::sync::Arc;

use atelier_core::{Amount, TronAddress};

use crate::error::TronError;
use crate::network::Network;
use crate::rpc::TronRpc;

/// `balanceOf(address)` function selector.
const BALANCE_OF_SELECTOR: &str = "balanceOf(address)";

/// Token and native balances for one address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WalletBalance {
    /// USDT balance.
    pub usdt: Amount,
    /// Native TRX balance (pays fees).
    pub trx: Amount,
}

/// Read-only balance queries against a node.
pub struct BalanceReader {
    rpc: Arc<dyn TronRpc>,
    usdt_contract: TronAddress,
}

impl BalanceReader {
    pub fn new(rpc: Arc<dyn TronRpc>, network: Network) -> Self {
        Self {
            rpc,
            usdt_contract: network.usdt_contract(),
        }
    }

    /// USDT balance for an address; zero on any read failure.
    pub async fn usdt_balance(&self, address: &TronAddress) -> Amount {
        match self.try_usdt_balance(address).await {
            Ok(amount) => amount,
            Err(e) => {
                tracing::warn!(address = %address, error = %e, "USDT balance read failed, showing zero");
                Amount::ZERO
            }
        }
    }

    async fn try_usdt_balance(&self, address: &TronAddress) -> Result<Amount, TronError> {
        let response = self
            .rpc
            .trigger_constant_contract(
                address,
                &self.usdt_contract,
                BALANCE_OF_SELECTOR,
                &address.abi_word(),
            )
            .await?;

        let Some(word) = response["constant_result"][0].as_str() else {
            // Nodes omit constant_result for unknown accounts
            return Ok(Amount::ZERO);
        };
        parse_balance_word(word)
    }

    /// Native TRX balance for an address; zero on any read failure.
    pub async fn trx_balance(&self, address: &TronAddress) -> Amount {
        match self.rpc.get_account(address).await {
            Ok(response) => {
                // Accounts that never received TRX have no data entry
                let sun = response["data"][0]["balance"].as_u64().unwrap_or(0);
                Amount::from_units(sun)
            }
            Err(e) => {
                tracing::warn!(address = %address, error = %e, "TRX balance read failed, showing zero");
                Amount::ZERO
            }
        }
    }

    /// Both balances, fetched concurrently.
    pub async fn wallet_balance(&self, address: &TronAddress) -> WalletBalance {
        let (usdt, trx) = tokio::join!(self.usdt_balance(address), self.trx_balance(address));
        WalletBalance { usdt, trx }
    }
}

/// Parse a 32-byte ABI return word (hex) into an [`Amount`].
fn parse_balance_word(word: &str) -> Result<Amount, TronError> {
    let word = word.trim_start_matches("0x");
    if word.is_empty() {
        return Ok(Amount::ZERO);
    }
    let value = u128::from_str_radix(word, 16)
        .map_err(|_| TronError::InvalidResponse(format!("balance word is not hex: {word}")))?;
    let units: u64 = value
        .try_into()
        .map_err(|_| TronError::InvalidResponse("balance exceeds u64".into()))?;
    Ok(Amount::from_units(units))
}

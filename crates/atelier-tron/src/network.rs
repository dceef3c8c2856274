//! TRON network selection.

use std::fmt;
use std::str::FromStr;

use atelier_core::TronAddress;

use crate::error::TronError;

/// USDT TRC-20 contract on mainnet.
const USDT_MAINNET: &str = "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t";

/// USDT TRC-20 contract on the Shasta testnet.
const USDT_SHASTA: &str = "TG3XXyExBkPp9nzdajDZsozEu4BkaSJozs";

/// The TRON network a client talks to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Network {
    #[default]
    Mainnet,
    /// Shasta testnet.
    Shasta,
}

impl Network {
    /// TronGrid base URL for this network.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Network::Mainnet => "https://api.trongrid.io",
            Network::Shasta => "https://api.shasta.trongrid.io",
        }
    }

    /// The USDT contract address on this network.
    pub fn usdt_contract(&self) -> TronAddress {
        let s = match self {
            Network::Mainnet => USDT_MAINNET,
            Network::Shasta => USDT_SHASTA,
        };
        TronAddress::from_base58(s).expect("bundled contract address is valid")
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Shasta => write!(f, "shasta"),
        }
    }
}

impl FromStr for Network {
    type Err = TronError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "shasta" => Ok(Network::Shasta),
            other => Err(TronError::InvalidResponse(format!(
                "unknown network: {other}"
            ))),
        }
    }
}

//! TronGrid HTTP RPC client.
//!
//! The node interface the transfer, balance, and history modules depend
//! on is expressed as the [`TronRpc`] trait so that it can be stubbed in
//! tests; [`HttpTronRpc`] is the production implementation speaking
//! TronGrid's REST dialect with `visible: true` (Base58 addresses on the
//! wire).

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;

use atelier_core::TronAddress;

use crate::error::TronError;
use crate::network::Network;

/// Request timeout for all node calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Node operations the wallet core depends on.
#[async_trait]
pub trait TronRpc: Send + Sync {
    /// Read-only contract call (`balanceOf`-style); does not cost
    /// resources and is never broadcast.
    async fn trigger_constant_contract(
        &self,
        owner: &TronAddress,
        contract: &TronAddress,
        selector: &str,
        parameter: &str,
    ) -> Result<Value, TronError>;

    /// Build an unsigned contract-call transaction.
    async fn trigger_smart_contract(
        &self,
        owner: &TronAddress,
        contract: &TronAddress,
        selector: &str,
        parameter: &str,
        fee_limit: u64,
    ) -> Result<Value, TronError>;

    /// Broadcast a signed transaction.
    async fn broadcast_transaction(&self, signed_tx: Value) -> Result<Value, TronError>;

    /// Account info, including the native TRX balance in SUN.
    async fn get_account(&self, address: &TronAddress) -> Result<Value, TronError>;

    /// Transaction lookup by id; an empty object means not (yet) known.
    async fn get_transaction_by_id(&self, txid: &str) -> Result<Value, TronError>;

    /// Execution result lookup by id (receipt, fees, block).
    async fn get_transaction_info_by_id(&self, txid: &str) -> Result<Value, TronError>;

    /// TRC-20 transfer log entries touching an address.
    async fn list_trc20_transfers(
        &self,
        address: &TronAddress,
        contract: &TronAddress,
        limit: u32,
        min_timestamp: Option<u64>,
    ) -> Result<Value, TronError>;
}

/// TronGrid client over HTTPS.
pub struct HttpTronRpc {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpTronRpc {
    /// Client for a network without an API key (subject to public rate
    /// limits).
    pub fn new(network: Network) -> Self {
        Self::with_api_key(network, None)
    }

    /// Client with an optional TronGrid API key.
    pub fn with_api_key(network: Network, api_key: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("build reqwest client"),
            endpoint: network.endpoint().to_owned(),
            api_key,
        }
    }

    /// Client for an arbitrary node URL (local nodes, proxies).
    pub fn with_endpoint(endpoint: &str, api_key: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("build reqwest client"),
            endpoint: endpoint.trim_end_matches('/').to_owned(),
            api_key,
        }
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, TronError> {
        tracing::debug!(path, "tron rpc post");
        let mut request = self
            .client
            .post(format!("{}{}", self.endpoint, path))
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.header("TRON-PRO-API-KEY", key);
        }
        let response = request
            .send()
            .await
            .map_err(|e| TronError::Http(e.to_string()))?;
        if !response.status().is_success() {
            return Err(TronError::Http(format!(
                "{path} returned {}",
                response.status()
            )));
        }
        response
            .json()
            .await
            .map_err(|e| TronError::Http(e.to_string()))
    }

    async fn get(&self, path_and_query: &str) -> Result<Value, TronError> {
        tracing::debug!(path = path_and_query, "tron rpc get");
        let mut request = self
            .client
            .get(format!("{}{}", self.endpoint, path_and_query));
        if let Some(key) = &self.api_key {
            request = request.header("TRON-PRO-API-KEY", key);
        }
        let response = request
            .send()
            .await
            .map_err(|e| TronError::Http(e.to_string()))?;
        if !response.status().is_success() {
            return Err(TronError::Http(format!(
                "{path_and_query} returned {}",
                response.status()
            )));
        }
        response
            .json()
            .await
            .map_err(|e| TronError::Http(e.to_string()))
    }
}

#[async_trait]
impl TronRpc for HttpTronRpc {
    async fn trigger_constant_contract(
        &self,
        owner: &TronAddress,
        contract: &TronAddress,
        selector: &str,
        parameter: &str,
    ) -> Result<Value, TronError> {
        self.post(
            "/wallet/triggerconstantcontract",
            json!({
                "owner_address": owner.encode(),
                "contract_address": contract.encode(),
                "function_selector": selector,
                "parameter": parameter,
                "visible": true,
            }),
        )
        .await
    }

    async fn trigger_smart_contract(
        &self,
        owner: &TronAddress,
        contract: &TronAddress,
        selector: &str,
        parameter: &str,
        fee_limit: u64,
    ) -> Result<Value, TronError> {
        self.post(
            "/wallet/triggersmartcontract",
            json!({
                "owner_address": owner.encode(),
                "contract_address": contract.encode(),
                "function_selector": selector,
                "parameter": parameter,
                "fee_limit": fee_limit,
                "call_value": 0,
                "visible": true,
            }),
        )
        .await
    }

    async fn broadcast_transaction(&self, signed_tx: Value) -> Result<Value, TronError> {
        self.post("/wallet/broadcasttransaction", signed_tx).await
    }

    async fn get_account(&self, address: &TronAddress) -> Result<Value, TronError> {
        self.get(&format!("/v1/accounts/{}", address.encode())).await
    }

    async fn get_transaction_by_id(&self, txid: &str) -> Result<Value, TronError> {
        self.post(
            "/wallet/gettransactionbyid",
            json!({ "value": txid, "visible": true }),
        )
        .await
    }

    async fn get_transaction_info_by_id(&self, txid: &str) -> Result<Value, TronError> {
        self.post("/wallet/gettransactioninfobyid", json!({ "value": txid }))
            .await
    }

    async fn list_trc20_transfers(
        &self,
        address: &TronAddress,
        contract: &TronAddress,
        limit: u32,
        min_timestamp: Option<u64>,
    ) -> Result<Value, TronError> {
        let mut path = format!(
            "/v1/accounts/{}/transactions/trc20?limit={}&contract_address={}",
            address.encode(),
            limit,
            contract.encode()
        );
        if let Some(ts) = min_timestamp {
            path.push_str(&format!("&min_timestamp={ts}"));
        }
        self.get(&path).await
    }
}

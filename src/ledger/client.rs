use async_trait::async_trait;
use log::debug;
use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use super::model::{
    BalanceResponse, ChainSnapshot, FaucetGrant, FaucetRequest, MineReport, MineRequest,
    MiningStats, NewWallet, PendingSnapshot, TransactionRequest, ValidationReport,
};
use crate::error::{ConsoleError, Result};
use crate::wallet::Wallet;

/// Request/response operations offered by the ledger service.
/// None of them retries; a failure is final for that call.
#[async_trait]
pub trait LedgerApi: Send + Sync {
    async fn create_wallet(&self) -> Result<NewWallet>;
    async fn delete_wallet(&self, address: &str) -> Result<()>;
    async fn balance(&self, address: &str) -> Result<f64>;
    async fn request_faucet(&self, address: &str) -> Result<FaucetGrant>;
    async fn submit_transaction(&self, sender: &Wallet, receiver: &str, amount: f64)
    -> Result<()>;
    async fn mine(&self, miner_address: Option<&str>) -> Result<MineReport>;
    async fn chain(&self) -> Result<ChainSnapshot>;
    async fn pending(&self) -> Result<PendingSnapshot>;
    async fn mining_stats(&self) -> Result<MiningStats>;
    async fn validate_chain(&self) -> Result<ValidationReport>;
}

/// `LedgerApi` over HTTP/JSON.
pub struct HttpLedgerClient {
    base: Url,
    http: reqwest::Client,
}

impl HttpLedgerClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base = Url::parse(base_url).map_err(|e| ConsoleError::InvalidUrl(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ConsoleError::InvalidUrl(base_url.to_string()));
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { base, http })
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value> {
        // Non-2xx answers still carry the envelope, so the status is not checked here.
        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        debug!("ledger answered {status} ({} bytes)", bytes.len());
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn call<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        decode_envelope(self.send(request).await?)
    }

    async fn call_unit(&self, request: RequestBuilder) -> Result<()> {
        check_success(&self.send(request).await?)
    }
}

/// Fail with the server's reason unless the envelope says `success: true`.
pub(crate) fn check_success(value: &Value) -> Result<()> {
    match value.get("success").and_then(Value::as_bool) {
        Some(true) => Ok(()),
        None => Err(ConsoleError::Decode(serde::de::Error::custom(
            "response is not a ledger envelope (no boolean `success`)",
        ))),
        Some(false) => {
            let reason = value
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("ledger reported a failure without a reason");
            Err(ConsoleError::Rejected(reason.to_string()))
        }
    }
}

pub(crate) fn decode_envelope<T: DeserializeOwned>(value: Value) -> Result<T> {
    check_success(&value)?;
    Ok(serde_json::from_value(value)?)
}

#[async_trait]
impl LedgerApi for HttpLedgerClient {
    async fn create_wallet(&self) -> Result<NewWallet> {
        let url = self.url(&["api", "wallet", "create"]);
        self.call(self.http.post(url).json(&serde_json::json!({}))).await
    }

    async fn delete_wallet(&self, address: &str) -> Result<()> {
        let url = self.url(&["api", "wallet", address]);
        self.call_unit(self.http.delete(url)).await
    }

    async fn balance(&self, address: &str) -> Result<f64> {
        let url = self.url(&["api", "wallet", "balance", address]);
        let resp: BalanceResponse = self.call(self.http.get(url)).await?;
        Ok(resp.balance)
    }

    async fn request_faucet(&self, address: &str) -> Result<FaucetGrant> {
        let url = self.url(&["api", "faucet"]);
        self.call(self.http.post(url).json(&FaucetRequest { address }))
            .await
    }

    async fn submit_transaction(
        &self,
        sender: &Wallet,
        receiver: &str,
        amount: f64,
    ) -> Result<()> {
        let url = self.url(&["api", "transaction"]);
        let body = TransactionRequest {
            sender_address: &sender.address,
            sender_pubkey: &sender.public_key,
            receiver_address: receiver,
            amount,
        };
        self.call_unit(self.http.post(url).json(&body)).await
    }

    async fn mine(&self, miner_address: Option<&str>) -> Result<MineReport> {
        let url = self.url(&["api", "mine"]);
        self.call(self.http.post(url).json(&MineRequest { miner_address }))
            .await
    }

    async fn chain(&self) -> Result<ChainSnapshot> {
        self.call(self.http.get(self.url(&["api", "blockchain"])))
            .await
    }

    async fn pending(&self) -> Result<PendingSnapshot> {
        self.call(self.http.get(self.url(&["api", "transactions", "pending"])))
            .await
    }

    async fn mining_stats(&self) -> Result<MiningStats> {
        self.call(self.http.get(self.url(&["api", "mining", "stats"])))
            .await
    }

    async fn validate_chain(&self) -> Result<ValidationReport> {
        self.call(self.http.get(self.url(&["api", "blockchain", "validate"])))
            .await
    }
}

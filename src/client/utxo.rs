use async_trait::async_trait;
use serde_json::{json, Value};

use super::types::{
    parse_address_outputs, parse_best_block, parse_transaction_outputs, BestBlock, IndexedOutput,
    TransactionOutput,
};
use super::UtxoIndexer;
use crate::error::{Result, WalletError};

/// UTXO indexer over HTTP
pub struct HttpUtxoIndexer {
    client: reqwest::Client,
    base_url: String,
}

impl HttpUtxoIndexer {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn read_json(response: reqwest::Response, endpoint: &str) -> Result<Value> {
        let status = response.status();
        if !status.is_success() {
            return Err(WalletError::Network(format!(
                "{} returned HTTP {}",
                endpoint, status
            )));
        }
        response
            .json()
            .await
            .map_err(|e| WalletError::invalid_shape(endpoint, e.to_string()))
    }
}

#[async_trait]
impl UtxoIndexer for HttpUtxoIndexer {
    async fn address_outputs(&self, address: &str) -> Result<Vec<IndexedOutput>> {
        let url = format!("{}/utxos", self.base_url);
        log::debug!("POST {} for {}", url, address);

        let response = self
            .client
            .post(&url)
            .json(&json!({ "address": address }))
            .send()
            .await?;

        let body = Self::read_json(response, "utxos").await?;
        parse_address_outputs("utxos", &body)
    }

    async fn best_block(&self) -> Result<BestBlock> {
        let url = format!("{}/bestblock", self.base_url);
        log::debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let body = Self::read_json(response, "bestblock").await?;
        parse_best_block("bestblock", &body)
    }

    async fn transaction_outputs(&self, txid: &str) -> Result<Vec<TransactionOutput>> {
        let url = format!("{}/transaction/{}", self.base_url, txid);
        log::debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let body = Self::read_json(response, "transaction").await?;
        parse_transaction_outputs("transaction", &body)
    }
}

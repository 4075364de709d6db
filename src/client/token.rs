use async_trait::async_trait;
use serde_json::Value;

use super::types::{
    parse_token_balances, parse_transfer_check, ListingReceipt, ListingSubmission, TokenBalance,
    TransferCheck,
};
use super::TokenApi;
use crate::error::{Result, WalletError};

/// Token ledger and marketplace API over HTTP
pub struct HttpTokenApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTokenApi {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json(&self, path: &str, endpoint: &str) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, path);
        log::debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(WalletError::Network(format!(
                "{} returned HTTP {}",
                endpoint,
                response.status()
            )));
        }
        response
            .json()
            .await
            .map_err(|e| WalletError::invalid_shape(endpoint, e.to_string()))
    }
}

#[async_trait]
impl TokenApi for HttpTokenApi {
    async fn account_balances(&self, address: &str) -> Result<Vec<TokenBalance>> {
        let body = self
            .get_json(
                &format!("getAccountTokensBalance/{}", address),
                "getAccountTokensBalance",
            )
            .await?;
        parse_token_balances("getAccountTokensBalance", &body)
    }

    async fn single_transferable(&self, inscription_id: &str) -> Result<TransferCheck> {
        let body = self
            .get_json(
                &format!("getSingleTransferable/{}", inscription_id),
                "getSingleTransferable",
            )
            .await?;
        parse_transfer_check("getSingleTransferable", &body)
    }

    async fn submit_listing(&self, listing: &ListingSubmission) -> Result<ListingReceipt> {
        let url = format!("{}/token/list", self.base_url);
        log::info!(
            "Submitting listing of {} {} ({}) at {} koinu",
            listing.amount,
            listing.tick,
            listing.inscription_id,
            listing.price
        );

        let response = self.client.post(&url).json(listing).send().await?;
        if !response.status().is_success() {
            return Err(WalletError::Network(format!(
                "token/list returned HTTP {}",
                response.status()
            )));
        }
        response
            .json()
            .await
            .map_err(|e| WalletError::invalid_shape("token/list", e.to_string()))
    }
}

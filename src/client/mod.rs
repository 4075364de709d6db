//! Upstream API clients
//!
//! - `UtxoIndexer`: address outputs, best block, transaction outputs
//! - `InscriptionIndexer`: output → inscription ids, inscription content
//! - `TokenApi`: token balances, transferable checks, listing submission
//!
//! Each trait has a reqwest-backed implementation; tests use the fakes in
//! `crate::testing`.

pub mod html;
mod ord;
mod token;
mod types;
mod utxo;

pub use ord::HttpOrdExplorer;
pub use token::HttpTokenApi;
pub use types::*;
pub use utxo::HttpUtxoIndexer;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::WalletConfig;
use crate::error::Result;

#[async_trait]
pub trait UtxoIndexer: Send + Sync {
    /// Unspent outputs paying to `address`
    async fn address_outputs(&self, address: &str) -> Result<Vec<IndexedOutput>>;

    /// Liveness / sync check of the indexer
    async fn best_block(&self) -> Result<BestBlock>;

    async fn transaction_outputs(&self, txid: &str) -> Result<Vec<TransactionOutput>>;
}

#[async_trait]
pub trait InscriptionIndexer: Send + Sync {
    /// Inscription ids carried by the output `txid:vout`
    async fn output_inscriptions(&self, outpoint: &str) -> Result<Vec<String>>;

    async fn content(&self, inscription_id: &str) -> Result<InscriptionContent>;
}

#[async_trait]
pub trait TokenApi: Send + Sync {
    async fn account_balances(&self, address: &str) -> Result<Vec<TokenBalance>>;

    async fn single_transferable(&self, inscription_id: &str) -> Result<TransferCheck>;

    async fn submit_listing(&self, listing: &ListingSubmission) -> Result<ListingReceipt>;
}

/// The three upstream dependencies of a wallet
#[derive(Clone)]
pub struct WalletServices {
    pub utxo_indexer: Arc<dyn UtxoIndexer>,
    pub inscriptions: Arc<dyn InscriptionIndexer>,
    pub token_api: Arc<dyn TokenApi>,
}

impl WalletServices {
    /// HTTP clients for the configured endpoints, sharing one reqwest client
    pub fn http(config: &WalletConfig) -> Result<Self> {
        let client = config.http_client()?;
        Ok(Self {
            utxo_indexer: Arc::new(HttpUtxoIndexer::new(
                client.clone(),
                &config.utxo_indexer_url,
            )),
            inscriptions: Arc::new(HttpOrdExplorer::new(client.clone(), &config.ord_url)),
            token_api: Arc::new(HttpTokenApi::new(client, &config.token_api_url)),
        })
    }
}

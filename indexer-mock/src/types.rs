//! Fixture and response types
//!
//! A `Fixture` describes everything the three mocked services know about:
//! address outputs, transactions, ord output pages, inscription content,
//! transferable amounts and token balances. Response shapes match what the
//! wallet's HTTP clients parse.
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Cannot read fixture {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid fixture {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    #[error("Inscription {0} has invalid hex body")]
    InvalidHex(String),
}

/// One unspent output of an address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressOutput {
    pub txid: String,
    pub vout: u32,
    pub value: u64,
}

/// One output of a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutput {
    pub index: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub script: String,
    pub value: u64,
}

/// Inscription content: either UTF-8 `text` or a `hex` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InscriptionFixture {
    pub content_type: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub hex: Option<String>,
}

impl InscriptionFixture {
    pub fn body(&self, id: &str) -> Result<Vec<u8>, FixtureError> {
        match (&self.text, &self.hex) {
            (Some(text), _) => Ok(text.as_bytes().to_vec()),
            (None, Some(raw)) => {
                hex::decode(raw).map_err(|_| FixtureError::InvalidHex(id.to_string()))
            }
            (None, None) => Ok(Vec::new()),
        }
    }
}

/// Answer of the single-transferable check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferableFixture {
    /// Remaining amount as an 18-decimal fixed-point string
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inscription_number: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    pub ticker: String,
    pub overall_balance: String,
    pub transferable_balance: String,
}

fn default_synced() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    /// address → unspent outputs
    #[serde(default)]
    pub addresses: HashMap<String, Vec<AddressOutput>>,
    /// txid → outputs
    #[serde(default)]
    pub transactions: HashMap<String, Vec<TransactionOutput>>,
    /// `txid:vout` → inscription ids shown on the ord output page
    #[serde(default)]
    pub outputs: HashMap<String, Vec<String>>,
    /// inscription id → content
    #[serde(default)]
    pub inscriptions: HashMap<String, InscriptionFixture>,
    #[serde(default)]
    pub transferable: HashMap<String, TransferableFixture>,
    /// address → token balances
    #[serde(default)]
    pub balances: HashMap<String, Vec<TokenBalance>>,
    /// `success` of the best-block endpoint
    #[serde(default = "default_synced")]
    pub synced: bool,
    /// When set, every listing is rejected with this message
    #[serde(default)]
    pub reject_listings: Option<String>,
}

impl Default for Fixture {
    fn default() -> Self {
        Self {
            addresses: HashMap::new(),
            transactions: HashMap::new(),
            outputs: HashMap::new(),
            inscriptions: HashMap::new(),
            transferable: HashMap::new(),
            balances: HashMap::new(),
            synced: true,
            reject_listings: None,
        }
    }
}

impl Fixture {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| FixtureError::Json {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn with_output(mut self, address: &str, txid: &str, vout: u32, value: u64) -> Self {
        self.addresses
            .entry(address.to_string())
            .or_default()
            .push(AddressOutput {
                txid: txid.to_string(),
                vout,
                value,
            });
        self
    }

    pub fn with_transaction(mut self, txid: &str, outputs: Vec<TransactionOutput>) -> Self {
        self.transactions.insert(txid.to_string(), outputs);
        self
    }

    /// Text inscription sitting at `outpoint`
    pub fn with_text_inscription(mut self, outpoint: &str, id: &str, text: &str) -> Self {
        self.outputs
            .entry(outpoint.to_string())
            .or_default()
            .push(id.to_string());
        self.inscriptions.insert(
            id.to_string(),
            InscriptionFixture {
                content_type: "text/plain;charset=utf-8".to_string(),
                text: Some(text.to_string()),
                hex: None,
            },
        );
        self
    }

    pub fn with_transferable(mut self, id: &str, remaining: Option<&str>, number: Option<u64>) -> Self {
        self.transferable.insert(
            id.to_string(),
            TransferableFixture {
                result: remaining.map(str::to_string),
                inscription_number: number,
            },
        );
        self
    }

    pub fn with_balance(mut self, address: &str, balance: TokenBalance) -> Self {
        self.balances
            .entry(address.to_string())
            .or_default()
            .push(balance);
        self
    }

    pub fn unsynced(mut self) -> Self {
        self.synced = false;
        self
    }

    pub fn rejecting_listings(mut self, message: &str) -> Self {
        self.reject_listings = Some(message.to_string());
        self
    }
}

/// Body of `POST /utxos`
#[derive(Debug, Clone, Deserialize)]
pub struct AddressQuery {
    pub address: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutputsResponse<T> {
    pub outputs: Vec<T>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BestBlockResponse {
    pub success: bool,
    pub hash: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BalanceList {
    pub list: Vec<TokenBalance>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BalanceResponse {
    pub data: BalanceList,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_id: Option<String>,
}

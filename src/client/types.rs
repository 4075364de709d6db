//! Upstream API response types and shape validation
//!
//! Responses are decoded from `serde_json::Value` field by field so that a
//! malformed answer is reported as `InvalidResponseShape` naming the field.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, WalletError};
use crate::inscriptions::TokenAmount;

/// Unspent output as reported by the UTXO indexer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedOutput {
    pub txid: String,
    pub vout: u32,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestBlock {
    pub success: bool,
    pub hash: Option<String>,
}

/// Output of a transaction fetched by txid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionOutput {
    pub index: u32,
    pub address: Option<String>,
    /// Locking script, hex
    pub script: String,
    pub value: u64,
}

/// Raw inscription content with the response's content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InscriptionContent {
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl InscriptionContent {
    /// Textual when the content type is `text/*` or JSON
    pub fn is_textual(&self) -> bool {
        match &self.content_type {
            Some(content_type) => {
                let mime = content_type
                    .split(';')
                    .next()
                    .unwrap_or("")
                    .trim()
                    .to_ascii_lowercase();
                mime.starts_with("text/") || mime == "application/json"
            }
            None => false,
        }
    }

    /// UTF-8 text of a textual inscription
    pub fn text(&self) -> Option<String> {
        if !self.is_textual() {
            return None;
        }
        String::from_utf8(self.body.clone()).ok()
    }
}

/// Fungible token balance of an address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    pub ticker: String,
    pub overall_balance: String,
    pub transferable_balance: String,
}

/// Answer of the single-transferable check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferCheck {
    /// Amount still transferable; `None` once consumed
    pub remaining: Option<TokenAmount>,
    pub inscription_number: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingUtxo {
    pub txid: String,
    pub vout: u32,
    pub value: u64,
    pub script: String,
}

/// Body of `POST token/list`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingSubmission {
    pub tick: String,
    /// Asking price in koinu
    pub price: u64,
    /// Decimal token amount
    pub amount: String,
    pub seller_address: String,
    pub inscription_id: String,
    pub utxo: ListingUtxo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingReceipt {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub listing_id: Option<String>,
}

fn field<'a>(endpoint: &str, value: &'a Value, name: &str) -> Result<&'a Value> {
    value
        .get(name)
        .ok_or_else(|| WalletError::invalid_shape(endpoint, format!("missing '{}'", name)))
}

fn str_field(endpoint: &str, value: &Value, name: &str) -> Result<String> {
    field(endpoint, value, name)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| WalletError::invalid_shape(endpoint, format!("'{}' is not a string", name)))
}

/// Non-negative integer given as a JSON number or a decimal-digit string
fn unsigned_field(endpoint: &str, value: &Value, name: &str) -> Result<u64> {
    let raw = field(endpoint, value, name)?;
    let parsed = match raw {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| {
        WalletError::invalid_shape(
            endpoint,
            format!("'{}' is not a non-negative integer: {}", name, raw),
        )
    })
}

fn u32_field(endpoint: &str, value: &Value, name: &str) -> Result<u32> {
    let n = unsigned_field(endpoint, value, name)?;
    u32::try_from(n)
        .map_err(|_| WalletError::invalid_shape(endpoint, format!("'{}' out of range", name)))
}

/// `{ outputs: [{txid, vout, value}] }`
pub fn parse_address_outputs(endpoint: &str, body: &Value) -> Result<Vec<IndexedOutput>> {
    let outputs = field(endpoint, body, "outputs")?
        .as_array()
        .ok_or_else(|| WalletError::invalid_shape(endpoint, "'outputs' is not an array"))?;

    let outputs = outputs
        .iter()
        .map(|output| {
            Ok(IndexedOutput {
                txid: str_field(endpoint, output, "txid")?,
                vout: u32_field(endpoint, output, "vout")?,
                value: unsigned_field(endpoint, output, "value")?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    // Balances are summed in koinu as u64
    outputs
        .iter()
        .try_fold(0u64, |total, output| total.checked_add(output.value))
        .ok_or_else(|| WalletError::invalid_shape(endpoint, "output values overflow"))?;

    Ok(outputs)
}

/// `{ success, hash }`
pub fn parse_best_block(endpoint: &str, body: &Value) -> Result<BestBlock> {
    let success = field(endpoint, body, "success")?
        .as_bool()
        .ok_or_else(|| WalletError::invalid_shape(endpoint, "'success' is not a boolean"))?;
    let hash = body.get("hash").and_then(Value::as_str).map(str::to_string);
    Ok(BestBlock { success, hash })
}

/// `{ outputs: [{index, address, script, value}] }`
pub fn parse_transaction_outputs(endpoint: &str, body: &Value) -> Result<Vec<TransactionOutput>> {
    let outputs = field(endpoint, body, "outputs")?
        .as_array()
        .ok_or_else(|| WalletError::invalid_shape(endpoint, "'outputs' is not an array"))?;

    outputs
        .iter()
        .map(|output| {
            Ok(TransactionOutput {
                index: u32_field(endpoint, output, "index")?,
                address: output
                    .get("address")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                script: script_field(endpoint, output)?,
                value: unsigned_field(endpoint, output, "value")?,
            })
        })
        .collect()
}

/// Locking script as a hex string
fn script_field(endpoint: &str, output: &Value) -> Result<String> {
    let script = str_field(endpoint, output, "script")?;
    hex::decode(&script)
        .map_err(|e| WalletError::invalid_shape(endpoint, format!("'script' is not hex: {}", e)))?;
    Ok(script)
}

/// `{ result: <fixed-point amount | null>, inscriptionNumber? }`
pub fn parse_transfer_check(endpoint: &str, body: &Value) -> Result<TransferCheck> {
    let result = field(endpoint, body, "result")?;
    let remaining = match result {
        Value::Null => None,
        Value::String(s) => Some(TokenAmount::from_fixed_point(s).map_err(|e| {
            WalletError::invalid_shape(endpoint, format!("'result': {}", e))
        })?),
        Value::Number(n) => match n.as_u64() {
            Some(units) => Some(TokenAmount::from_units(units as u128)),
            None => Some(TokenAmount::from_number_text(&n.to_string()).map_err(|e| {
                WalletError::invalid_shape(endpoint, format!("'result': {}", e))
            })?),
        },
        other => {
            return Err(WalletError::invalid_shape(
                endpoint,
                format!("'result' has unexpected type: {}", other),
            ))
        }
    };

    Ok(TransferCheck {
        remaining,
        inscription_number: body.get("inscriptionNumber").and_then(Value::as_u64),
    })
}

/// `{ data: { list: [...] } }`
pub fn parse_token_balances(endpoint: &str, body: &Value) -> Result<Vec<TokenBalance>> {
    let list = field(endpoint, body, "data")
        .and_then(|data| field(endpoint, data, "list"))?
        .clone();
    serde_json::from_value(list).map_err(|e| WalletError::invalid_shape(endpoint, e.to_string()))
}

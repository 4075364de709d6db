//! In-process fakes of the upstream services
//!
//! Canned responses are raw JSON run through the same parsers as the HTTP
//! clients, so malformed payloads fail the way real ones would. Every fake
//! counts its calls.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::client::{
    parse_address_outputs, parse_best_block, parse_token_balances, parse_transaction_outputs,
    parse_transfer_check, BestBlock, IndexedOutput, InscriptionContent, InscriptionIndexer,
    ListingReceipt, ListingSubmission, TokenApi, TokenBalance, TransactionOutput, TransferCheck,
    UtxoIndexer,
};
use crate::clock::Clock;
use crate::error::{Result, WalletError};
use crate::utxo::Utxo;

/// UTXO with a 64-character txid made by repeating `txid_seed`
pub fn sample_utxo(txid_seed: &str, vout: u32, satoshis: u64) -> Utxo {
    let txid: String = txid_seed.chars().cycle().take(64).collect();
    Utxo {
        txid,
        vout,
        satoshis,
        last_updated: 0,
    }
}

/// Clock that only moves when told to
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }

    pub fn set(&self, to: DateTime<Utc>) {
        if let Ok(mut now) = self.now.lock() {
            *now = to;
        }
    }
}

impl Default for ManualClock {
    /// 2023-11-14T22:13:20Z
    fn default() -> Self {
        let start = Utc
            .timestamp_millis_opt(1_700_000_000_000)
            .single()
            .unwrap_or_else(Utc::now);
        Self::new(start)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(now) => *now,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

fn network_down(what: &str) -> WalletError {
    WalletError::Network(format!("{}: connection refused", what))
}

#[derive(Default)]
struct UtxoResponses {
    outputs: Option<Value>,
    best_block: Option<Value>,
    transactions: HashMap<String, Value>,
    fail_outputs: bool,
    delay: Option<std::time::Duration>,
}

#[derive(Default)]
pub struct FakeUtxoIndexer {
    responses: Mutex<UtxoResponses>,
    output_calls: AtomicUsize,
    best_block_calls: AtomicUsize,
    transaction_calls: AtomicUsize,
}

impl FakeUtxoIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Body of the address-outputs endpoint
    pub fn set_outputs(&self, body: Value) {
        self.with(|r| r.outputs = Some(body));
    }

    pub fn fail_outputs(&self, fail: bool) {
        self.with(|r| r.fail_outputs = fail);
    }

    /// Delay before answering the address-outputs endpoint
    pub fn set_delay(&self, delay: std::time::Duration) {
        self.with(|r| r.delay = Some(delay));
    }

    pub fn set_best_block(&self, body: Value) {
        self.with(|r| r.best_block = Some(body));
    }

    pub fn add_transaction(&self, txid: &str, body: Value) {
        self.with(|r| {
            r.transactions.insert(txid.to_string(), body);
        });
    }

    pub fn output_calls(&self) -> usize {
        self.output_calls.load(Ordering::SeqCst)
    }

    pub fn best_block_calls(&self) -> usize {
        self.best_block_calls.load(Ordering::SeqCst)
    }

    pub fn transaction_calls(&self) -> usize {
        self.transaction_calls.load(Ordering::SeqCst)
    }

    fn with<T>(&self, f: impl FnOnce(&mut UtxoResponses) -> T) -> T {
        let mut responses = self
            .responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut responses)
    }
}

#[async_trait]
impl UtxoIndexer for FakeUtxoIndexer {
    async fn address_outputs(&self, _address: &str) -> Result<Vec<IndexedOutput>> {
        self.output_calls.fetch_add(1, Ordering::SeqCst);
        let (body, fail, delay) =
            self.with(|r| (r.outputs.clone(), r.fail_outputs, r.delay));
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if fail {
            return Err(network_down("utxos"));
        }
        parse_address_outputs("utxos", &body.unwrap_or_else(|| json!({ "outputs": [] })))
    }

    async fn best_block(&self) -> Result<BestBlock> {
        self.best_block_calls.fetch_add(1, Ordering::SeqCst);
        let body = self.with(|r| r.best_block.clone());
        parse_best_block(
            "bestblock",
            &body.unwrap_or_else(|| json!({ "success": true, "hash": "00" })),
        )
    }

    async fn transaction_outputs(&self, txid: &str) -> Result<Vec<TransactionOutput>> {
        self.transaction_calls.fetch_add(1, Ordering::SeqCst);
        match self.with(|r| r.transactions.get(txid).cloned()) {
            Some(body) => parse_transaction_outputs("transaction", &body),
            None => Err(WalletError::Network(format!(
                "transaction {} returned HTTP 404 Not Found",
                txid
            ))),
        }
    }
}

#[derive(Default)]
struct OrdResponses {
    outputs: HashMap<String, Vec<String>>,
    contents: HashMap<String, InscriptionContent>,
    failing_outputs: HashSet<String>,
}

/// Ord explorer fake; unknown outputs carry no inscriptions
#[derive(Default)]
pub struct FakeInscriptionIndexer {
    responses: Mutex<OrdResponses>,
    output_calls: AtomicUsize,
    content_calls: AtomicUsize,
}

impl FakeInscriptionIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_output(&self, outpoint: &str, ids: &[&str]) {
        self.with(|r| {
            r.outputs
                .insert(outpoint.to_string(), ids.iter().map(|s| s.to_string()).collect());
        });
    }

    pub fn fail_output(&self, outpoint: &str) {
        self.with(|r| {
            r.failing_outputs.insert(outpoint.to_string());
        });
    }

    pub fn add_text(&self, inscription_id: &str, text: &str) {
        self.add_binary(
            inscription_id,
            "text/plain;charset=utf-8",
            text.as_bytes(),
        );
    }

    pub fn add_binary(&self, inscription_id: &str, content_type: &str, body: &[u8]) {
        self.with(|r| {
            r.contents.insert(
                inscription_id.to_string(),
                InscriptionContent {
                    content_type: Some(content_type.to_string()),
                    body: body.to_vec(),
                },
            );
        });
    }

    pub fn output_calls(&self) -> usize {
        self.output_calls.load(Ordering::SeqCst)
    }

    pub fn content_calls(&self) -> usize {
        self.content_calls.load(Ordering::SeqCst)
    }

    fn with<T>(&self, f: impl FnOnce(&mut OrdResponses) -> T) -> T {
        let mut responses = self
            .responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut responses)
    }
}

#[async_trait]
impl InscriptionIndexer for FakeInscriptionIndexer {
    async fn output_inscriptions(&self, outpoint: &str) -> Result<Vec<String>> {
        self.output_calls.fetch_add(1, Ordering::SeqCst);
        self.with(|r| {
            if r.failing_outputs.contains(outpoint) {
                return Err(network_down("output"));
            }
            Ok(r.outputs.get(outpoint).cloned().unwrap_or_default())
        })
    }

    async fn content(&self, inscription_id: &str) -> Result<InscriptionContent> {
        self.content_calls.fetch_add(1, Ordering::SeqCst);
        self.with(|r| r.contents.get(inscription_id).cloned())
            .ok_or_else(|| {
                WalletError::Network(format!(
                    "content {} returned HTTP 404 Not Found",
                    inscription_id
                ))
            })
    }
}

#[derive(Default)]
struct TokenResponses {
    transferable: HashMap<String, Value>,
    failing_transferable: HashSet<String>,
    balances: Option<Value>,
    fail_balances: bool,
    listing: Option<Value>,
    submitted: Vec<ListingSubmission>,
}

/// Token API fake; unknown inscriptions report no remaining amount
#[derive(Default)]
pub struct FakeTokenApi {
    responses: Mutex<TokenResponses>,
    transferable_calls: AtomicUsize,
    balance_calls: AtomicUsize,
    listing_calls: AtomicUsize,
}

impl FakeTokenApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// `result` as a fixed-point string
    pub fn set_remaining(&self, inscription_id: &str, fixed_point: &str, number: Option<u64>) {
        let mut body = json!({ "result": fixed_point });
        if let Some(number) = number {
            body["inscriptionNumber"] = json!(number);
        }
        self.set_transfer_check(inscription_id, body);
    }

    /// Raw body of the single-transferable endpoint
    pub fn set_transfer_check(&self, inscription_id: &str, body: Value) {
        self.with(|r| {
            r.transferable.insert(inscription_id.to_string(), body);
        });
    }

    pub fn fail_transferable(&self, inscription_id: &str) {
        self.with(|r| {
            r.failing_transferable.insert(inscription_id.to_string());
        });
    }

    pub fn set_balances(&self, body: Value) {
        self.with(|r| r.balances = Some(body));
    }

    pub fn fail_balances(&self, fail: bool) {
        self.with(|r| r.fail_balances = fail);
    }

    /// Body returned by the listing endpoint
    pub fn set_listing_response(&self, body: Value) {
        self.with(|r| r.listing = Some(body));
    }

    pub fn submitted(&self) -> Vec<ListingSubmission> {
        self.with(|r| r.submitted.clone())
    }

    pub fn transferable_calls(&self) -> usize {
        self.transferable_calls.load(Ordering::SeqCst)
    }

    pub fn balance_calls(&self) -> usize {
        self.balance_calls.load(Ordering::SeqCst)
    }

    pub fn listing_calls(&self) -> usize {
        self.listing_calls.load(Ordering::SeqCst)
    }

    fn with<T>(&self, f: impl FnOnce(&mut TokenResponses) -> T) -> T {
        let mut responses = self
            .responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut responses)
    }
}

#[async_trait]
impl TokenApi for FakeTokenApi {
    async fn account_balances(&self, _address: &str) -> Result<Vec<TokenBalance>> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        let (body, fail) = self.with(|r| (r.balances.clone(), r.fail_balances));
        if fail {
            return Err(network_down("getAccountTokensBalance"));
        }
        parse_token_balances(
            "getAccountTokensBalance",
            &body.unwrap_or_else(|| json!({ "data": { "list": [] } })),
        )
    }

    async fn single_transferable(&self, inscription_id: &str) -> Result<TransferCheck> {
        self.transferable_calls.fetch_add(1, Ordering::SeqCst);
        let (body, fail) = self.with(|r| {
            (
                r.transferable.get(inscription_id).cloned(),
                r.failing_transferable.contains(inscription_id),
            )
        });
        if fail {
            return Err(network_down("getSingleTransferable"));
        }
        parse_transfer_check(
            "getSingleTransferable",
            &body.unwrap_or_else(|| json!({ "result": null })),
        )
    }

    async fn submit_listing(&self, listing: &ListingSubmission) -> Result<ListingReceipt> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);
        let body = self.with(|r| {
            r.submitted.push(listing.clone());
            r.listing.clone()
        });
        let body = body.unwrap_or_else(|| json!({ "success": true, "listingId": "listing-1" }));
        serde_json::from_value(body)
            .map_err(|e| WalletError::invalid_shape("token/list", e.to_string()))
    }
}

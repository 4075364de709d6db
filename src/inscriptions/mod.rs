//! Inscription discovery
//!
//! Two cached phases (output → inscription ids, id → content) followed by
//! transferable filtering for a ticker. Per-item failures are logged and
//! skipped; they never abort a batch.

mod amount;
mod discovery;
mod transferable;

pub use amount::{TokenAmount, TOKEN_DECIMALS};
pub use discovery::{InscriptionDiscovery, InscriptionMap};
pub use transferable::TransferableFilter;

use serde::{Deserialize, Serialize};

/// Operation name of a token transfer inscription
pub const TRANSFER_OP: &str = "token-transfer";

/// Inscription record as persisted under `inscription_<id>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inscription {
    pub id: String,
    /// Decoded payload; `None` for binary content
    pub data: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    /// `txid:vout` currently holding the inscription
    pub outpoint: String,
}

/// Token transfer inscription that has not been consumed yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferableInscription {
    pub inscription_id: String,
    pub number: Option<u64>,
    pub amount: TokenAmount,
    pub tick: String,
    pub outpoint: String,
    pub data: String,
}

/// JSON payload of a token-protocol inscription
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenPayload {
    #[serde(default)]
    pub p: Option<String>,
    pub op: String,
    pub tick: String,
    #[serde(default)]
    pub amt: Option<String>,
}

impl TokenPayload {
    pub fn parse(data: &str) -> Option<Self> {
        serde_json::from_str(data).ok()
    }

    pub fn is_transfer(&self) -> bool {
        self.op == TRANSFER_OP
    }

    /// Tickers compare case-insensitively
    pub fn matches_tick(&self, tick: &str) -> bool {
        normalize_tick(&self.tick) == normalize_tick(tick)
    }
}

pub fn normalize_tick(tick: &str) -> String {
    tick.trim().to_lowercase()
}

/// Split `txid:vout`
pub fn split_outpoint(outpoint: &str) -> Option<(&str, u32)> {
    let (txid, vout) = outpoint.rsplit_once(':')?;
    Some((txid, vout.parse().ok()?))
}

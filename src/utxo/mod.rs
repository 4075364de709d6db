//! UTXO cache and UTXO-indexer rate limiting
//!
//! The cached set lives in the key-value store together with the time of the
//! last successful refresh. Every network refresh spends one unit of a daily
//! quota.

mod cache;
mod rate_limit;

pub use cache::UtxoCache;
pub use rate_limit::{RateLimitCounter, RateLimiter, RATE_LIMIT_WINDOW_HOURS};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::IndexedOutput;
use crate::clock::to_millis;
use crate::network::koinu_to_doge;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Utxo {
    pub txid: String,
    pub vout: u32,
    /// Value in koinu
    pub satoshis: u64,
    /// Milliseconds since the Unix epoch
    pub last_updated: i64,
}

impl Utxo {
    pub fn from_indexed(output: &IndexedOutput, fetched_at: DateTime<Utc>) -> Self {
        Self {
            txid: output.txid.clone(),
            vout: output.vout,
            satoshis: output.value,
            last_updated: to_millis(fetched_at),
        }
    }

    /// `txid:vout`
    pub fn outpoint(&self) -> String {
        format!("{}:{}", self.txid, self.vout)
    }
}

/// Where a UTXO set came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UtxoSource {
    Network,
    Cache,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoSet {
    pub utxos: Vec<Utxo>,
    pub source: UtxoSource,
}

impl UtxoSet {
    pub fn network(utxos: Vec<Utxo>) -> Self {
        Self {
            utxos,
            source: UtxoSource::Network,
        }
    }

    pub fn cached(utxos: Vec<Utxo>) -> Self {
        Self {
            utxos,
            source: UtxoSource::Cache,
        }
    }

    pub fn empty() -> Self {
        Self::cached(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    /// Saturates instead of overflowing on a corrupted cache
    pub fn total_koinu(&self) -> u64 {
        self.utxos
            .iter()
            .fold(0u64, |total, u| total.saturating_add(u.satoshis))
    }

    /// Balance in whole DOGE
    pub fn balance(&self) -> f64 {
        koinu_to_doge(self.total_koinu())
    }

    pub fn find(&self, outpoint: &str) -> Option<&Utxo> {
        self.utxos.iter().find(|u| u.outpoint() == outpoint)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    /// Never refreshed from the network
    Unsynced,
    /// Network refresh in flight
    Syncing,
    Synced,
    /// Last successful refresh is older than the cache duration
    Stale,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_balance() {
        let set = UtxoSet::network(vec![
            Utxo {
                txid: "aa".into(),
                vout: 0,
                satoshis: 100_000_000,
                last_updated: 0,
            },
            Utxo {
                txid: "bb".into(),
                vout: 2,
                satoshis: 250_000_000,
                last_updated: 0,
            },
        ]);
        assert_eq!(set.total_koinu(), 350_000_000);
        assert_eq!(set.balance(), 3.5);
        assert!(set.find("bb:2").is_some());
        assert!(set.find("bb:0").is_none());
    }

    #[test]
    fn test_total_saturates() {
        let big = |txid: &str| Utxo {
            txid: txid.into(),
            vout: 0,
            satoshis: u64::MAX - 1,
            last_updated: 0,
        };
        let set = UtxoSet::cached(vec![big("aa"), big("bb")]);
        assert_eq!(set.total_koinu(), u64::MAX);
    }

    #[test]
    fn test_persisted_shape() {
        let utxo = Utxo {
            txid: "aa".into(),
            vout: 1,
            satoshis: 5,
            last_updated: 1_700_000_000_000,
        };
        let json = serde_json::to_value(&utxo).unwrap();
        assert_eq!(json["lastUpdated"], 1_700_000_000_000i64);
        assert_eq!(json["satoshis"], 5);
    }
}

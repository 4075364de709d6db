//! Persisted key names
//!
//! These names are shared with the browser front-end and must stay stable.

pub const CACHED_UTXOS: &str = "cachedUtxos";
pub const LAST_UTXO_REFRESH: &str = "lastUtxoRefresh";
pub const CALL_COUNT: &str = "soChainCallCount";
pub const LAST_CALL_RESET: &str = "lastSoChainReset";
pub const ACCEPTED_TERMS: &str = "accepted_terms";
pub const WALLET_ADDRESS: &str = "walletAddress";
pub const MNEMONIC: &str = "mnemonic";
pub const DERIVATION: &str = "derivation";

const OUTPUT_INSCRIPTIONS_PREFIX: &str = "inscriptions_at_";
const INSCRIPTION_PREFIX: &str = "inscription_";

/// `inscriptions_at_<txid>:<vout>` → list of inscription ids
pub fn output_inscriptions_key(outpoint: &str) -> String {
    format!("{}{}", OUTPUT_INSCRIPTIONS_PREFIX, outpoint)
}

/// `inscription_<id>` → inscription record
pub fn inscription_key(inscription_id: &str) -> String {
    format!("{}{}", INSCRIPTION_PREFIX, inscription_id)
}

/// True for any key written by inscription discovery
pub fn is_inscription_cache_key(key: &str) -> bool {
    key.starts_with(OUTPUT_INSCRIPTIONS_PREFIX) || key.starts_with(INSCRIPTION_PREFIX)
}

//! Wallet configuration from environment variables
//!
//! Controls the Dogecoin network, the three upstream APIs, cache duration,
//! the daily UTXO-indexer quota and the HTTP request timeout.
//! Defaults to mainnet against a local `indexer-mock`.

use crate::network::DogeNetwork;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_CACHE_SECS: u64 = 3600;
const DEFAULT_DAILY_QUOTA: u32 = 300;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct WalletConfig {
    pub network: DogeNetwork,
    /// UTXO indexer base URL (utxos, bestblock, transaction)
    pub utxo_indexer_url: String,
    /// Ord explorer base URL (output pages, inscription content)
    pub ord_url: String,
    /// Token API base URL (balances, transferable checks, listings)
    pub token_api_url: String,
    /// Age after which a cached UTXO set is considered stale
    pub utxo_cache_duration: Duration,
    /// Calls to the UTXO indexer allowed per rolling 24h window
    pub daily_call_quota: u32,
    pub http_timeout: Duration,
    /// Overrides the network's default derivation path
    pub derivation_path: Option<String>,
    /// Directory holding the file-backed store
    pub data_dir: PathBuf,
}

impl WalletConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `DOGE_NETWORK`: "mainnet" (default) or "testnet"
    /// - `UTXO_INDEXER_URL`, `ORD_URL`, `TOKEN_API_URL`: upstream endpoints
    /// - `UTXO_CACHE_SECS`: cache duration in seconds (default 3600)
    /// - `UTXO_DAILY_QUOTA`: UTXO indexer calls per 24h (default 300)
    /// - `HTTP_TIMEOUT_SECS`: per-request timeout (default 30)
    /// - `DERIVATION_PATH`: e.g. "m/44'/3'/0'/0/0"
    /// - `WALLET_DATA_DIR`: file store directory (default "./wallet-data")
    pub fn from_env() -> Self {
        let network = match env::var("DOGE_NETWORK") {
            Ok(value) => value.parse().unwrap_or_else(|e| {
                log::warn!("{}, defaulting to mainnet", e);
                DogeNetwork::Mainnet
            }),
            Err(_) => DogeNetwork::Mainnet,
        };
        log::info!("Using Dogecoin {}", network);

        let utxo_indexer_url = url_var("UTXO_INDEXER_URL");
        let ord_url = url_var("ORD_URL");
        let token_api_url = url_var("TOKEN_API_URL");
        log::info!("UTXO indexer: {}", utxo_indexer_url);
        log::info!("Ord explorer: {}", ord_url);
        log::info!("Token API: {}", token_api_url);

        Self {
            network,
            utxo_indexer_url,
            ord_url,
            token_api_url,
            utxo_cache_duration: Duration::from_secs(number_var(
                "UTXO_CACHE_SECS",
                DEFAULT_CACHE_SECS,
            )),
            daily_call_quota: number_var("UTXO_DAILY_QUOTA", DEFAULT_DAILY_QUOTA),
            http_timeout: Duration::from_secs(number_var(
                "HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )),
            derivation_path: env::var("DERIVATION_PATH").ok(),
            data_dir: env::var("WALLET_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./wallet-data")),
        }
    }

    /// Get the derivation path for this network
    ///
    /// Returns: "m/44'/3'/0'/0/0" for mainnet, "m/44'/1'/0'/0/0" for testnet,
    /// unless `DERIVATION_PATH` overrides it
    pub fn derivation_path(&self) -> String {
        self.derivation_path
            .clone()
            .unwrap_or_else(|| format!("m/44'/{}'/0'/0/0", self.network.coin_type()))
    }

    /// Build the HTTP client shared by all upstream adapters
    pub fn http_client(&self) -> crate::Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.http_timeout)
            .build()
            .map_err(|e| crate::WalletError::Internal(format!("HTTP client: {}", e)))
    }
}

impl Default for WalletConfig {
    /// Default configuration (mainnet, local mock endpoints)
    fn default() -> Self {
        Self {
            network: DogeNetwork::Mainnet,
            utxo_indexer_url: DEFAULT_BASE_URL.to_string(),
            ord_url: DEFAULT_BASE_URL.to_string(),
            token_api_url: DEFAULT_BASE_URL.to_string(),
            utxo_cache_duration: Duration::from_secs(DEFAULT_CACHE_SECS),
            daily_call_quota: DEFAULT_DAILY_QUOTA,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            derivation_path: None,
            data_dir: PathBuf::from("./wallet-data"),
        }
    }
}

fn url_var(name: &str) -> String {
    env::var(name)
        .map(|url| url.trim_end_matches('/').to_string())
        .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
}

fn number_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring invalid {}='{}'", name, raw);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_mainnet() {
        let config = WalletConfig::default();
        assert_eq!(config.network, DogeNetwork::Mainnet);
        assert_eq!(config.utxo_cache_duration, Duration::from_secs(3600));
    }

    #[test]
    fn test_derivation_path() {
        let mainnet = WalletConfig::default();
        assert_eq!(mainnet.derivation_path(), "m/44'/3'/0'/0/0");

        let testnet = WalletConfig {
            network: DogeNetwork::Testnet,
            ..Default::default()
        };
        assert_eq!(testnet.derivation_path(), "m/44'/1'/0'/0/0");

        let custom = WalletConfig {
            derivation_path: Some("m/44'/3'/1'/0/0".to_string()),
            ..Default::default()
        };
        assert_eq!(custom.derivation_path(), "m/44'/3'/1'/0/0");
    }
}

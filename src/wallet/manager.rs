use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use crate::client::{TokenBalance, WalletServices};
use crate::clock::{Clock, SystemClock};
use crate::config::WalletConfig;
use crate::error::Result;
use crate::inscriptions::{
    Inscription, InscriptionDiscovery, InscriptionMap, TransferableFilter,
    TransferableInscription,
};
use crate::keys::Credentials;
use crate::storage::{KeyValueStore, ACCEPTED_TERMS, WALLET_ADDRESS};
use crate::utxo::{SyncState, Utxo, UtxoCache, UtxoSet};

/// Published state of a wallet, replaced wholesale on every refresh
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSnapshot {
    pub address: String,
    /// Whole DOGE
    pub balance: f64,
    pub balance_koinu: u64,
    pub utxos: Vec<Utxo>,
    pub token_balances: Vec<TokenBalance>,
    pub inscriptions: Vec<Inscription>,
    pub sync_state: SyncState,
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl WalletSnapshot {
    fn empty(address: &str) -> Self {
        Self {
            address: address.to_string(),
            balance: 0.0,
            balance_koinu: 0,
            utxos: Vec::new(),
            token_balances: Vec::new(),
            inscriptions: Vec::new(),
            sync_state: SyncState::Unsynced,
            refreshed_at: None,
        }
    }

    pub fn utxo_set(&self) -> UtxoSet {
        UtxoSet::cached(self.utxos.clone())
    }
}

/// Wallet Manager - Orchestration Layer
///
/// One per connected session. Owns the credentials, the UTXO cache and
/// inscription discovery for the bound address, and publishes a
/// `WalletSnapshot` after each refresh.
pub struct Wallet {
    pub(super) credentials: Credentials,
    pub(super) services: WalletServices,
    pub(super) store: Arc<dyn KeyValueStore>,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) utxos: UtxoCache,
    discovery: InscriptionDiscovery,
    transferables: TransferableFilter,
    pub(super) accepted_terms: AtomicBool,
    snapshot: RwLock<WalletSnapshot>,
}

impl Wallet {
    // ============================================================================
    // Constructor
    // ============================================================================

    /// Bind to the credentials' address and load the initial state
    pub async fn initialize(
        credentials: Credentials,
        services: WalletServices,
        store: Arc<dyn KeyValueStore>,
        config: &WalletConfig,
    ) -> Result<Self> {
        Self::initialize_with_clock(credentials, services, store, config, Arc::new(SystemClock))
            .await
    }

    pub async fn initialize_with_clock(
        credentials: Credentials,
        services: WalletServices,
        store: Arc<dyn KeyValueStore>,
        config: &WalletConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let address = credentials.address().to_string();
        log::info!("Initialising wallet for {}", address);

        store.set(WALLET_ADDRESS, &address)?;
        let accepted_terms = store.get(ACCEPTED_TERMS)?.as_deref() == Some("true");

        let utxos = UtxoCache::new(
            &address,
            services.utxo_indexer.clone(),
            store.clone(),
            clock.clone(),
            config.utxo_cache_duration,
            config.daily_call_quota,
        );
        let discovery = InscriptionDiscovery::new(services.inscriptions.clone(), store.clone());
        let transferables = TransferableFilter::new(services.token_api.clone());

        let wallet = Self {
            credentials,
            services,
            store,
            clock,
            utxos,
            discovery,
            transferables,
            accepted_terms: AtomicBool::new(accepted_terms),
            snapshot: RwLock::new(WalletSnapshot::empty(&address)),
        };

        wallet.refresh_state().await;
        Ok(wallet)
    }

    // ============================================================================
    // Accessors
    // ============================================================================

    pub fn address(&self) -> &str {
        self.credentials.address()
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn utxo_cache(&self) -> &UtxoCache {
        &self.utxos
    }

    pub fn has_accepted_terms(&self) -> bool {
        self.accepted_terms.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> WalletSnapshot {
        match self.snapshot.read() {
            Ok(snapshot) => snapshot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    // ============================================================================
    // Refresh
    // ============================================================================

    /// Forced UTXO refresh and token balances, fetched concurrently.
    ///
    /// A failing half contributes an empty result; the snapshot is always
    /// republished.
    pub async fn refresh_state(&self) -> WalletSnapshot {
        let address = self.address();
        let (utxos, balances) = futures::join!(
            self.utxos.refresh(true),
            self.services.token_api.account_balances(address)
        );

        let utxos = utxos.unwrap_or_else(|e| {
            log::warn!("UTXO refresh for {} failed: {}", address, e);
            UtxoSet::empty()
        });
        let token_balances = balances.unwrap_or_else(|e| {
            log::warn!("Token balances for {} unavailable: {}", address, e);
            Vec::new()
        });

        let snapshot = self.publish(|snapshot| {
            snapshot.balance = utxos.balance();
            snapshot.balance_koinu = utxos.total_koinu();
            snapshot.utxos = utxos.utxos;
            snapshot.token_balances = token_balances;
        });

        log::info!(
            "Wallet {}: {} DOGE in {} UTXOs, {} token balances",
            address,
            snapshot.balance,
            snapshot.utxos.len(),
            snapshot.token_balances.len()
        );
        snapshot
    }

    /// Discover inscriptions held by the current UTXO set
    pub async fn refresh_inscriptions(&self) -> InscriptionMap {
        let utxos = self.snapshot().utxos;
        let inscriptions = self.discovery.discover(&utxos).await;
        log::info!(
            "Found {} inscriptions across {} UTXOs",
            inscriptions.len(),
            utxos.len()
        );

        self.publish(|snapshot| {
            snapshot.inscriptions = inscriptions.values().cloned().collect();
        });
        inscriptions
    }

    /// Unconsumed transfer inscriptions of `tick` held by this wallet
    pub async fn transferable_inscriptions(&self, tick: &str) -> Vec<TransferableInscription> {
        let inscriptions = self.refresh_inscriptions().await;
        self.transferables.filter(tick, &inscriptions).await
    }

    fn publish(&self, update: impl FnOnce(&mut WalletSnapshot)) -> WalletSnapshot {
        let mut guard = match self.snapshot.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        update(&mut guard);
        guard.sync_state = self.utxos.sync_state();
        guard.refreshed_at = Some(self.clock.now());
        guard.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, CACHED_UTXOS};
    use crate::testing::{FakeInscriptionIndexer, FakeTokenApi, FakeUtxoIndexer, ManualClock};
    use crate::wallet::tests::{test_credentials, three_utxo_body};
    use serde_json::json;

    struct Fixture {
        utxo_indexer: Arc<FakeUtxoIndexer>,
        ord: Arc<FakeInscriptionIndexer>,
        token_api: Arc<FakeTokenApi>,
        store: Arc<MemoryStore>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                utxo_indexer: Arc::new(FakeUtxoIndexer::new()),
                ord: Arc::new(FakeInscriptionIndexer::new()),
                token_api: Arc::new(FakeTokenApi::new()),
                store: Arc::new(MemoryStore::new()),
            }
        }

        async fn wallet(&self) -> Wallet {
            let services = WalletServices {
                utxo_indexer: self.utxo_indexer.clone(),
                inscriptions: self.ord.clone(),
                token_api: self.token_api.clone(),
            };
            Wallet::initialize_with_clock(
                test_credentials(),
                services,
                self.store.clone(),
                &WalletConfig::default(),
                Arc::new(ManualClock::default()),
            )
            .await
            .unwrap()
        }
    }

    #[tokio::test]
    async fn test_initialize_publishes_state() {
        let f = Fixture::new();
        f.utxo_indexer.set_outputs(three_utxo_body());
        f.token_api.set_balances(json!({
            "data": { "list": [{
                "ticker": "dogi",
                "overallBalance": "1000000000000000000000",
                "transferableBalance": "0"
            }] }
        }));

        let wallet = f.wallet().await;
        let snapshot = wallet.snapshot();

        assert_eq!(snapshot.address, wallet.address());
        assert_eq!(snapshot.utxos.len(), 3);
        assert_eq!(snapshot.balance, 5.0);
        assert_eq!(snapshot.balance_koinu, 500_000_000);
        assert_eq!(snapshot.token_balances.len(), 1);
        assert_eq!(snapshot.sync_state, SyncState::Synced);
        assert!(snapshot.refreshed_at.is_some());
        assert_eq!(
            f.store.get(WALLET_ADDRESS).unwrap().as_deref(),
            Some(wallet.address())
        );
        assert!(!wallet.has_accepted_terms());
    }

    #[tokio::test]
    async fn test_failures_substitute_empty_results() {
        let f = Fixture::new();
        f.utxo_indexer.fail_outputs(true);
        f.token_api.fail_balances(true);

        let wallet = f.wallet().await;
        let snapshot = wallet.snapshot();
        assert!(snapshot.utxos.is_empty());
        assert_eq!(snapshot.balance, 0.0);
        assert!(snapshot.token_balances.is_empty());
        assert_eq!(snapshot.sync_state, SyncState::Unsynced);
        assert!(f.store.get(CACHED_UTXOS).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_transferable_inscriptions() {
        let f = Fixture::new();
        f.utxo_indexer.set_outputs(three_utxo_body());
        let wallet = f.wallet().await;

        let outpoint = wallet.snapshot().utxos[0].outpoint();
        let id = format!("{}i0", "ab".repeat(32));
        f.ord.add_output(&outpoint, &[id.as_str()]);
        f.ord.add_text(
            &id,
            r#"{"p":"tap","op":"token-transfer","tick":"dogi","amt":"250"}"#,
        );
        f.token_api
            .set_remaining(&id, "250000000000000000000", Some(7));

        let found = wallet.transferable_inscriptions("DOGI").await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].inscription_id, id);
        assert_eq!(found[0].outpoint, outpoint);
        assert_eq!(wallet.snapshot().inscriptions.len(), 1);
        assert_eq!(f.ord.output_calls(), 3);
    }
}

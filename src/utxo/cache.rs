use chrono::{DateTime, Duration, Utc};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{RateLimiter, SyncState, Utxo, UtxoSet, UtxoSource};
use crate::cancel::CancelToken;
use crate::client::UtxoIndexer;
use crate::clock::{from_millis, to_millis, Clock};
use crate::error::{Result, WalletError};
use crate::storage::{KeyValueStore, KeyValueStoreExt, CACHED_UTXOS, LAST_UTXO_REFRESH};

/// Cached UTXO set of one address.
///
/// Refreshes are single-flight: callers that queue behind an in-flight
/// refresh receive its outcome instead of spending another indexer call.
pub struct UtxoCache {
    address: String,
    indexer: Arc<dyn UtxoIndexer>,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    limiter: RateLimiter,
    cache_duration: Duration,
    refresh_guard: Mutex<()>,
    /// Bumped after every completed refresh
    generation: AtomicU64,
    last_outcome: std::sync::Mutex<Option<Result<UtxoSet>>>,
    syncing: AtomicBool,
}

impl UtxoCache {
    pub fn new(
        address: &str,
        indexer: Arc<dyn UtxoIndexer>,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        cache_duration: std::time::Duration,
        daily_quota: u32,
    ) -> Self {
        let limiter = RateLimiter::new(store.clone(), clock.clone(), daily_quota);
        Self {
            address: address.to_string(),
            indexer,
            store,
            clock,
            limiter,
            cache_duration: Duration::from_std(cache_duration)
                .unwrap_or_else(|_| Duration::hours(1)),
            refresh_guard: Mutex::new(()),
            generation: AtomicU64::new(0),
            last_outcome: std::sync::Mutex::new(None),
            syncing: AtomicBool::new(false),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Current UTXO set.
    ///
    /// Without `force`, a fresh cached set is returned without touching the
    /// network. Transport failures fall back to the cached set when one
    /// exists; quota and shape errors always reach the caller.
    pub async fn refresh(&self, force: bool) -> Result<UtxoSet> {
        if !force {
            if let Some(set) = self.fresh_cached()? {
                log::debug!("Using cached UTXOs for {}", self.address);
                return Ok(set);
            }
        }

        let seen = self.generation.load(Ordering::SeqCst);
        let _guard = self.refresh_guard.lock().await;

        if self.generation.load(Ordering::SeqCst) != seen {
            if let Some(outcome) = self.shared_outcome() {
                log::debug!("Reusing result of concurrent UTXO refresh");
                return outcome;
            }
        }

        let outcome = self.refresh_locked(force).await;
        self.publish(&outcome);
        outcome
    }

    /// Direct, rate-limited fetch that neither reads nor writes the cache
    pub async fn fetch_uncached(&self) -> Result<UtxoSet> {
        let _guard = self.refresh_guard.lock().await;
        let utxos = self.fetch_from_network().await?;
        Ok(UtxoSet::network(utxos))
    }

    /// Up to `attempts` forced refreshes, `delay` apart, until one is
    /// answered by the network.
    ///
    /// Failures are logged, never returned. Gives back the last set obtained,
    /// which may come from the cache.
    pub async fn wait_for_sync(
        &self,
        attempts: u32,
        delay: std::time::Duration,
        cancel: &CancelToken,
    ) -> Option<UtxoSet> {
        let mut last = None;

        for attempt in 1..=attempts {
            if cancel.is_cancelled() {
                log::info!("UTXO sync cancelled after {} attempts", attempt - 1);
                return last;
            }

            match self.refresh(true).await {
                Ok(set) if set.source == UtxoSource::Network => {
                    log::info!("UTXOs synced on attempt {}", attempt);
                    return Some(set);
                }
                Ok(set) => {
                    log::debug!("Attempt {} answered from cache", attempt);
                    last = Some(set);
                }
                Err(e @ WalletError::RateLimitExceeded { .. }) => {
                    log::warn!("Giving up UTXO sync: {}", e);
                    return last;
                }
                Err(e) => log::warn!("UTXO sync attempt {} failed: {}", attempt, e),
            }

            if attempt < attempts {
                tokio::time::sleep(delay).await;
            }
        }

        log::warn!("UTXOs not synced after {} attempts", attempts);
        last
    }

    pub fn sync_state(&self) -> SyncState {
        if self.syncing.load(Ordering::SeqCst) {
            return SyncState::Syncing;
        }
        match self.last_refresh() {
            None => SyncState::Unsynced,
            Some(at) if self.clock.now() - at >= self.cache_duration => SyncState::Stale,
            Some(_) => SyncState::Synced,
        }
    }

    /// Time of the last successful network refresh
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        match self.store.get(LAST_UTXO_REFRESH) {
            Ok(raw) => raw
                .and_then(|raw| raw.trim().parse().ok())
                .and_then(from_millis),
            Err(e) => {
                log::warn!("Cannot read last UTXO refresh: {}", e);
                None
            }
        }
    }

    /// Cached set regardless of age
    pub fn cached(&self) -> Result<Option<UtxoSet>> {
        Ok(self
            .store
            .get_json::<Vec<Utxo>>(CACHED_UTXOS)?
            .map(UtxoSet::cached))
    }

    /// Balance of the cached set in whole DOGE; zero without a cache
    pub fn balance(&self) -> f64 {
        match self.cached() {
            Ok(Some(set)) => set.balance(),
            Ok(None) => 0.0,
            Err(e) => {
                log::warn!("Cannot read cached UTXOs: {}", e);
                0.0
            }
        }
    }

    fn fresh_cached(&self) -> Result<Option<UtxoSet>> {
        match self.sync_state() {
            SyncState::Synced => self.cached(),
            _ => Ok(None),
        }
    }

    async fn refresh_locked(&self, force: bool) -> Result<UtxoSet> {
        if !force {
            if let Some(set) = self.fresh_cached()? {
                return Ok(set);
            }
        }

        self.syncing.store(true, Ordering::SeqCst);
        let fetched = self.fetch_from_network().await;
        self.syncing.store(false, Ordering::SeqCst);

        match fetched {
            Ok(utxos) => {
                let set = UtxoSet::network(utxos);
                self.persist(&set)?;
                log::info!(
                    "Refreshed {} UTXOs for {} ({} DOGE)",
                    set.len(),
                    self.address,
                    set.balance()
                );
                Ok(set)
            }
            Err(e) if e.is_network() => match self.cached() {
                Ok(Some(set)) => {
                    log::warn!("UTXO refresh failed, serving cached set: {}", e);
                    Ok(set)
                }
                Ok(None) => Err(e),
                Err(unreadable) => {
                    log::warn!("UTXO refresh failed and cached set is unreadable: {}", unreadable);
                    Err(e)
                }
            },
            Err(e) => Err(e),
        }
    }

    async fn fetch_from_network(&self) -> Result<Vec<Utxo>> {
        self.limiter.try_acquire()?;
        let outputs = self.indexer.address_outputs(&self.address).await?;
        let fetched_at = self.clock.now();
        Ok(outputs
            .iter()
            .map(|output| Utxo::from_indexed(output, fetched_at))
            .collect())
    }

    fn persist(&self, set: &UtxoSet) -> Result<()> {
        let utxos = serde_json::to_string(&set.utxos)
            .map_err(|e| WalletError::Internal(format!("Serialising UTXOs: {}", e)))?;
        self.store.set_many(&[
            (CACHED_UTXOS, utxos),
            (LAST_UTXO_REFRESH, to_millis(self.clock.now()).to_string()),
        ])?;
        Ok(())
    }

    fn publish(&self, outcome: &Result<UtxoSet>) {
        let shared = match outcome {
            Ok(set) => Ok(set.clone()),
            Err(e) => Err(e.replicate()),
        };
        if let Ok(mut slot) = self.last_outcome.lock() {
            *slot = Some(shared);
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    fn shared_outcome(&self) -> Option<Result<UtxoSet>> {
        let slot = self.last_outcome.lock().ok()?;
        slot.as_ref().map(|outcome| match outcome {
            Ok(set) => Ok(set.clone()),
            Err(e) => Err(e.replicate()),
        })
    }
}

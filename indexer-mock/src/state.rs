//! Shared server state: the fixture plus per-endpoint call counters
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use crate::types::Fixture;

/// Hash reported by the best-block endpoint
pub const BEST_BLOCK_HASH: &str =
    "1a91e3dace36e2be3bf030a65679fe821aa1d6ef92e7c9902eb318182c355691";

#[derive(Debug, Default)]
pub struct MockState {
    fixture: RwLock<Fixture>,
    calls: Mutex<HashMap<String, usize>>,
    listings: Mutex<Vec<Value>>,
}

impl MockState {
    pub fn new(fixture: Fixture) -> Self {
        Self {
            fixture: RwLock::new(fixture),
            calls: Mutex::new(HashMap::new()),
            listings: Mutex::new(Vec::new()),
        }
    }

    /// Read access to the fixture
    pub fn fixture<T>(&self, f: impl FnOnce(&Fixture) -> T) -> T {
        match self.fixture.read() {
            Ok(fixture) => f(&fixture),
            Err(poisoned) => f(&poisoned.into_inner()),
        }
    }

    /// Swap the fixture while the server is running
    pub fn update_fixture(&self, f: impl FnOnce(&mut Fixture)) {
        match self.fixture.write() {
            Ok(mut fixture) => f(&mut fixture),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }

    pub fn record(&self, endpoint: &str) {
        let mut calls = self.calls.lock().unwrap_or_else(|p| p.into_inner());
        *calls.entry(endpoint.to_string()).or_default() += 1;
    }

    /// Calls served by `endpoint` (e.g. "utxos", "token/list")
    pub fn calls(&self, endpoint: &str) -> usize {
        let calls = self.calls.lock().unwrap_or_else(|p| p.into_inner());
        calls.get(endpoint).copied().unwrap_or(0)
    }

    pub fn all_calls(&self) -> HashMap<String, usize> {
        self.calls.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn push_listing(&self, listing: Value) -> usize {
        let mut listings = self.listings.lock().unwrap_or_else(|p| p.into_inner());
        listings.push(listing);
        listings.len()
    }

    /// Listing bodies received so far
    pub fn listings(&self) -> Vec<Value> {
        self.listings.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

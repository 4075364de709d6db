use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::Inscription;
use crate::client::InscriptionIndexer;
use crate::storage::{inscription_key, output_inscriptions_key, KeyValueStore, KeyValueStoreExt};
use crate::utxo::Utxo;

/// Inscriptions by id
pub type InscriptionMap = BTreeMap<String, Inscription>;

/// Walks UTXOs to inscriptions, caching both lookups in the store.
///
/// Neither cache expires: an unspent output never gains or loses
/// inscriptions, and inscription content never changes.
pub struct InscriptionDiscovery {
    indexer: Arc<dyn InscriptionIndexer>,
    store: Arc<dyn KeyValueStore>,
}

impl InscriptionDiscovery {
    pub fn new(indexer: Arc<dyn InscriptionIndexer>, store: Arc<dyn KeyValueStore>) -> Self {
        Self { indexer, store }
    }

    /// Full pipeline for a UTXO set
    pub async fn discover(&self, utxos: &[Utxo]) -> InscriptionMap {
        let ids_by_outpoint = self.discover_ids(utxos).await;
        self.discover_content(&ids_by_outpoint).await
    }

    /// Phase 1: inscription ids per output.
    ///
    /// Outputs with a cached list (including an empty one) are not looked up
    /// again. Failed lookups are left uncached and omitted.
    pub async fn discover_ids(&self, utxos: &[Utxo]) -> BTreeMap<String, Vec<String>> {
        let mut ids_by_outpoint = BTreeMap::new();
        let mut missing = Vec::new();

        for utxo in utxos {
            let outpoint = utxo.outpoint();
            match self
                .store
                .get_json::<Vec<String>>(&output_inscriptions_key(&outpoint))
            {
                Ok(Some(ids)) => {
                    ids_by_outpoint.insert(outpoint, ids);
                }
                Ok(None) => missing.push(outpoint),
                Err(e) => {
                    log::warn!("Unreadable inscription cache for {}: {}", outpoint, e);
                    missing.push(outpoint);
                }
            }
        }

        log::debug!(
            "Inscription ids: {} outputs cached, {} to look up",
            ids_by_outpoint.len(),
            missing.len()
        );

        let lookups = missing.into_iter().map(|outpoint| async move {
            let result = self.indexer.output_inscriptions(&outpoint).await;
            (outpoint, result)
        });

        for (outpoint, result) in join_all(lookups).await {
            match result {
                Ok(ids) => {
                    if let Err(e) = self
                        .store
                        .set_json(&output_inscriptions_key(&outpoint), &ids)
                    {
                        log::warn!("Failed to cache inscriptions of {}: {}", outpoint, e);
                    }
                    ids_by_outpoint.insert(outpoint, ids);
                }
                Err(e) => log::warn!("Inscription lookup for {} failed: {}", outpoint, e),
            }
        }

        ids_by_outpoint
    }

    /// Phase 2: content of every id not already recorded.
    ///
    /// Binary inscriptions are recorded without data so they are fetched
    /// only once.
    pub async fn discover_content(
        &self,
        ids_by_outpoint: &BTreeMap<String, Vec<String>>,
    ) -> InscriptionMap {
        let mut inscriptions = InscriptionMap::new();
        let mut missing = Vec::new();

        for (outpoint, ids) in ids_by_outpoint {
            for id in ids {
                match self.store.get_json::<Inscription>(&inscription_key(id)) {
                    Ok(Some(mut record)) => {
                        if record.outpoint != *outpoint {
                            record.outpoint = outpoint.clone();
                            self.persist(&record);
                        }
                        inscriptions.insert(id.clone(), record);
                    }
                    Ok(None) => missing.push((id.clone(), outpoint.clone())),
                    Err(e) => {
                        log::warn!("Unreadable inscription record {}: {}", id, e);
                        missing.push((id.clone(), outpoint.clone()));
                    }
                }
            }
        }

        let fetches = missing.into_iter().map(|(id, outpoint)| async move {
            let result = self.indexer.content(&id).await;
            (id, outpoint, result)
        });

        for (id, outpoint, result) in join_all(fetches).await {
            match result {
                Ok(content) => {
                    let data = content.text();
                    if data.is_none() {
                        log::debug!(
                            "Inscription {} is not text ({:?})",
                            id,
                            content.content_type
                        );
                    }
                    let record = Inscription {
                        id: id.clone(),
                        data,
                        content_type: content.content_type,
                        outpoint,
                    };
                    self.persist(&record);
                    inscriptions.insert(id, record);
                }
                Err(e) => log::warn!("Content fetch for inscription {} failed: {}", id, e),
            }
        }

        inscriptions
    }

    fn persist(&self, record: &Inscription) {
        if let Err(e) = self.store.set_json(&inscription_key(&record.id), record) {
            log::warn!("Failed to cache inscription {}: {}", record.id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::testing::{sample_utxo, FakeInscriptionIndexer};

    const ID_TEXT: &str = "1111111111111111111111111111111111111111111111111111111111111111i0";
    const ID_IMAGE: &str = "2222222222222222222222222222222222222222222222222222222222222222i0";

    fn setup() -> (Arc<FakeInscriptionIndexer>, Arc<MemoryStore>, InscriptionDiscovery) {
        let indexer = Arc::new(FakeInscriptionIndexer::new());
        let store = Arc::new(MemoryStore::new());
        let discovery = InscriptionDiscovery::new(indexer.clone(), store.clone());
        (indexer, store, discovery)
    }

    #[tokio::test]
    async fn test_discovers_and_caches() {
        let (indexer, store, discovery) = setup();
        let with_text = sample_utxo("aa", 0, 100_000);
        let with_image = sample_utxo("bb", 1, 100_000);
        let plain = sample_utxo("cc", 0, 500_000_000);

        indexer.add_output(&with_text.outpoint(), &[ID_TEXT]);
        indexer.add_output(&with_image.outpoint(), &[ID_IMAGE]);
        indexer.add_text(ID_TEXT, r#"{"p":"tap","op":"token-transfer","tick":"dogi","amt":"5"}"#);
        indexer.add_binary(ID_IMAGE, "image/png", &[0x89, 0x50]);

        let utxos = vec![with_text.clone(), with_image.clone(), plain.clone()];
        let found = discovery.discover(&utxos).await;

        assert_eq!(found.len(), 2);
        assert!(found[ID_TEXT].data.as_deref().unwrap().contains("token-transfer"));
        assert_eq!(found[ID_TEXT].outpoint, with_text.outpoint());
        assert!(found[ID_IMAGE].data.is_none());
        assert_eq!(indexer.output_calls(), 3);
        assert_eq!(indexer.content_calls(), 2);

        // Empty result for the plain output is cached too
        let cached: Vec<String> = store
            .get_json(&output_inscriptions_key(&plain.outpoint()))
            .unwrap()
            .unwrap();
        assert!(cached.is_empty());

        let again = discovery.discover(&utxos).await;
        assert_eq!(again, found);
        assert_eq!(indexer.output_calls(), 3);
        assert_eq!(indexer.content_calls(), 2);
    }

    #[tokio::test]
    async fn test_failed_lookup_is_skipped_and_retried() {
        let (indexer, _store, discovery) = setup();
        let good = sample_utxo("aa", 0, 100_000);
        let bad = sample_utxo("dd", 0, 100_000);

        indexer.add_output(&good.outpoint(), &[ID_TEXT]);
        indexer.add_text(ID_TEXT, "hello");
        indexer.fail_output(&bad.outpoint());

        let utxos = vec![good, bad];
        let found = discovery.discover(&utxos).await;
        assert_eq!(found.len(), 1);
        assert_eq!(indexer.output_calls(), 2);

        discovery.discover(&utxos).await;
        assert_eq!(indexer.output_calls(), 3, "failed output is looked up again");
    }
}

use bitcoin::bip32::DerivationPath;
use std::str::FromStr;
use std::sync::atomic::Ordering;

use super::Wallet;
use crate::error::{Result, WalletError};
use crate::keys::{CredentialFactory, Credentials};
use crate::storage::{
    is_inscription_cache_key, KeyValueStore, ACCEPTED_TERMS, CACHED_UTXOS, DERIVATION,
    LAST_UTXO_REFRESH, MNEMONIC, WALLET_ADDRESS,
};

/// Explicit consent to keep the mnemonic in plaintext storage.
///
/// Only obtainable through `accept_plaintext_storage`, so persisting a
/// mnemonic is always a visible decision at the call site.
#[derive(Debug, Clone, Copy)]
pub struct RiskAcknowledgement {
    _private: (),
}

impl RiskAcknowledgement {
    pub fn accept_plaintext_storage() -> Self {
        Self { _private: () }
    }
}

impl Wallet {
    pub fn accept_terms(&self) -> Result<()> {
        self.store.set(ACCEPTED_TERMS, "true")?;
        self.accepted_terms.store(true, Ordering::SeqCst);
        log::info!("Terms accepted for {}", self.address());
        Ok(())
    }

    /// Persist the mnemonic and derivation path.
    ///
    /// Returns `false` for wallets imported from a raw key, which have no
    /// mnemonic to remember.
    pub fn remember_mnemonic(&self, _ack: RiskAcknowledgement) -> Result<bool> {
        let phrase = match self.credentials.mnemonic_phrase() {
            Some(phrase) => phrase,
            None => return Ok(false),
        };
        let mut entries = vec![(MNEMONIC, phrase)];
        if let Some(path) = self.credentials.derivation_path() {
            entries.push((DERIVATION, path.to_string()));
        }
        self.store.set_many(&entries)?;

        log::warn!("Mnemonic for {} stored in plaintext", self.address());
        Ok(true)
    }

    /// Remove session keys and every cache written for this wallet.
    ///
    /// The rate-limit counter is kept: the quota belongs to the client, not
    /// to the address.
    pub fn forget(&self) -> Result<()> {
        for key in [
            WALLET_ADDRESS,
            MNEMONIC,
            DERIVATION,
            ACCEPTED_TERMS,
            CACHED_UTXOS,
            LAST_UTXO_REFRESH,
        ] {
            self.store.remove(key)?;
        }

        let mut removed = 0;
        for key in self.store.keys()? {
            if is_inscription_cache_key(&key) {
                self.store.remove(&key)?;
                removed += 1;
            }
        }

        self.accepted_terms.store(false, Ordering::SeqCst);
        log::info!(
            "Forgot wallet {} ({} inscription cache entries removed)",
            self.address(),
            removed
        );
        Ok(())
    }
}

/// Credentials from a mnemonic stored by `Wallet::remember_mnemonic`.
///
/// A stored derivation path takes precedence over the factory's.
pub fn restore_mnemonic(
    store: &dyn KeyValueStore,
    factory: &CredentialFactory,
) -> Result<Option<Credentials>> {
    let phrase = match store.get(MNEMONIC)? {
        Some(phrase) => phrase,
        None => return Ok(None),
    };

    let credentials = match store.get(DERIVATION)? {
        Some(raw) => {
            let path = DerivationPath::from_str(raw.trim()).map_err(|e| {
                WalletError::Internal(format!("Stored derivation path '{}': {}", raw, e))
            })?;
            factory.with_derivation_path(path).from_mnemonic(&phrase)?
        }
        None => factory.from_mnemonic(&phrase)?,
    };

    log::info!("Restored wallet {} from stored mnemonic", credentials.address());
    Ok(Some(credentials))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::WalletServices;
    use crate::config::WalletConfig;
    use crate::storage::{inscription_key, output_inscriptions_key, MemoryStore, CALL_COUNT};
    use crate::testing::{FakeInscriptionIndexer, FakeTokenApi, FakeUtxoIndexer};
    use crate::wallet::tests::{test_credentials, test_factory, three_utxo_body, TEST_PHRASE};
    use std::sync::Arc;

    async fn wallet(store: Arc<MemoryStore>, credentials: Credentials) -> Wallet {
        let utxo_indexer = Arc::new(FakeUtxoIndexer::new());
        utxo_indexer.set_outputs(three_utxo_body());
        let services = WalletServices {
            utxo_indexer,
            inscriptions: Arc::new(FakeInscriptionIndexer::new()),
            token_api: Arc::new(FakeTokenApi::new()),
        };
        Wallet::initialize(credentials, services, store, &WalletConfig::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_terms_survive_reinitialisation() {
        let store = Arc::new(MemoryStore::new());
        let first = wallet(store.clone(), test_credentials()).await;
        first.accept_terms().unwrap();

        let second = wallet(store.clone(), test_credentials()).await;
        assert!(second.has_accepted_terms());
    }

    #[tokio::test]
    async fn test_remember_and_restore_mnemonic() {
        let store = Arc::new(MemoryStore::new());
        let wallet = wallet(store.clone(), test_credentials()).await;

        assert!(restore_mnemonic(store.as_ref(), &test_factory())
            .unwrap()
            .is_none());
        assert!(wallet
            .remember_mnemonic(RiskAcknowledgement::accept_plaintext_storage())
            .unwrap());
        assert_eq!(store.get(MNEMONIC).unwrap().as_deref(), Some(TEST_PHRASE));
        let stored: DerivationPath = store.get(DERIVATION).unwrap().unwrap().parse().unwrap();
        assert_eq!(&stored, test_factory().derivation_path());

        let restored = restore_mnemonic(store.as_ref(), &test_factory())
            .unwrap()
            .unwrap();
        assert_eq!(restored.address(), wallet.address());
    }

    #[tokio::test]
    async fn test_wif_wallet_has_no_mnemonic_to_remember() {
        let store = Arc::new(MemoryStore::new());
        let from_wif = test_factory()
            .from_private_key(test_credentials().wif())
            .unwrap();
        let wallet = wallet(store.clone(), from_wif).await;

        assert!(!wallet
            .remember_mnemonic(RiskAcknowledgement::accept_plaintext_storage())
            .unwrap());
        assert!(store.get(MNEMONIC).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_forget_clears_session_and_caches() {
        let store = Arc::new(MemoryStore::new());
        let wallet = wallet(store.clone(), test_credentials()).await;
        wallet.accept_terms().unwrap();
        wallet
            .remember_mnemonic(RiskAcknowledgement::accept_plaintext_storage())
            .unwrap();
        store.set(&output_inscriptions_key("aa:0"), "[]").unwrap();
        store.set(&inscription_key("abi0"), "{}").unwrap();

        wallet.forget().unwrap();

        assert!(!wallet.has_accepted_terms());
        for key in [WALLET_ADDRESS, MNEMONIC, ACCEPTED_TERMS, CACHED_UTXOS] {
            assert!(store.get(key).unwrap().is_none(), "{} still set", key);
        }
        assert!(store
            .keys()
            .unwrap()
            .iter()
            .all(|key| !is_inscription_cache_key(key)));
        assert_eq!(store.get(CALL_COUNT).unwrap().as_deref(), Some("1"));
    }
}

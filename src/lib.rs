//! TapOnDoge wallet core
//!
//! Client-side state manager of a Dogecoin token wallet: credentials, a
//! rate-limited UTXO cache, inscription discovery and the marketplace
//! listing flow.
//!
//! # Architecture
//!
//! - **Keys**: WIF and BIP39 import, random generation, Dogecoin encodings
//! - **UTXO cache**: staleness tracking, daily indexer quota, single-flight refresh
//! - **Inscriptions**: output → ids → content, transferable filtering per ticker
//! - **Wallet**: snapshot aggregation, session persistence, listing
//!
//! All upstream services sit behind traits in [`client`]; all persistence
//! goes through a [`storage::KeyValueStore`].
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tapondoge_wallet::{CredentialFactory, FileStore, Wallet, WalletConfig, WalletServices};
//!
//! let config = WalletConfig::from_env();
//! let credentials = CredentialFactory::from_config(&config)?.from_mnemonic(&phrase)?;
//! let store = Arc::new(FileStore::open(&config.data_dir)?);
//! let wallet = Wallet::initialize(credentials, WalletServices::http(&config)?, store, &config).await?;
//!
//! println!("{} DOGE", wallet.snapshot().balance);
//! let transferable = wallet.transferable_inscriptions("dogi").await;
//! ```

// Public modules
pub mod cancel;
pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod inscriptions;
pub mod keys;
pub mod network;
pub mod storage;
pub mod utxo;
pub mod wallet;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-exports for convenience
pub use cancel::CancelToken;
pub use client::{
    HttpOrdExplorer, HttpTokenApi, HttpUtxoIndexer, InscriptionIndexer, TokenApi, UtxoIndexer,
    WalletServices,
};
pub use clock::{Clock, SystemClock};
pub use config::WalletConfig;
pub use error::{Result, StorageError, WalletError};
pub use inscriptions::{
    Inscription, InscriptionDiscovery, InscriptionMap, TokenAmount, TransferableFilter,
    TransferableInscription,
};
pub use keys::{CredentialFactory, Credentials, KeyDerivationService, MnemonicService};
pub use network::{DogeNetwork, KOINU_PER_DOGE};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use utxo::{RateLimiter, SyncState, Utxo, UtxoCache, UtxoSet, UtxoSource};
pub use wallet::{ListingRequest, RiskAcknowledgement, Wallet, WalletSnapshot};

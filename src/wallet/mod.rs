//! Wallet state aggregation
//!
//! - `Wallet`: per-session owner of credentials, UTXO cache and discovery
//! - `WalletSnapshot`: published address, balances and inscriptions
//! - Listing flow and session persistence

mod listing;
mod manager;
mod session;

pub use listing::ListingRequest;
pub use manager::{Wallet, WalletSnapshot};
pub use session::{restore_mnemonic, RiskAcknowledgement};

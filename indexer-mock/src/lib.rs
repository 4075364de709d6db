//! Indexer Mock Server Library
//!
//! Serves the UTXO indexer, ord explorer and token API a TapOnDoge wallet
//! talks to, answering from a JSON fixture and counting calls per endpoint.
pub mod handlers;
pub mod server;
pub mod state;
pub mod types;

// Re-export commonly used types
pub use server::{create_router, run_server, spawn, MockServer};
pub use state::MockState;
pub use types::*;

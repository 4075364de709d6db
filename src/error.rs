//! Error types for wallet operations
//!
//! Credential errors always reach the caller. UTXO refresh errors are
//! recovered from the cache where possible, and inscription errors are
//! swallowed per candidate. Listing treats every error as fatal.

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Invalid private key format: {0}")]
    InvalidKeyFormat(String),

    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("UTXO indexer daily quota of {quota} calls exhausted (resets at {resets_at})")]
    RateLimitExceeded {
        quota: u32,
        resets_at: DateTime<Utc>,
    },

    #[error("Invalid response shape from {endpoint}: {reason}")]
    InvalidResponseShape { endpoint: String, reason: String },

    #[error("UTXO holding inscription {inscription_id} not found at {outpoint}")]
    InscriptionUtxoNotFound {
        inscription_id: String,
        outpoint: String,
    },

    #[error("No output of {outpoint} pays to {address}; locking script not found")]
    ScriptNotFound { outpoint: String, address: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Indexer is not synced with the chain tip")]
    IndexerNotSynced,

    #[error("Listing rejected by marketplace: {0}")]
    ListingRejected(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store lock poisoned")]
    Poisoned,
}

impl WalletError {
    pub fn invalid_shape(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponseShape {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    /// Transport-level failures are the only ones the UTXO cache may
    /// answer from its cached set.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Equivalent error for callers that share one outcome, such as those
    /// queued behind an in-flight UTXO refresh.
    pub fn replicate(&self) -> Self {
        match self {
            Self::InvalidKeyFormat(msg) => Self::InvalidKeyFormat(msg.clone()),
            Self::InvalidMnemonic(msg) => Self::InvalidMnemonic(msg.clone()),
            Self::RateLimitExceeded { quota, resets_at } => Self::RateLimitExceeded {
                quota: *quota,
                resets_at: *resets_at,
            },
            Self::InvalidResponseShape { endpoint, reason } => Self::InvalidResponseShape {
                endpoint: endpoint.clone(),
                reason: reason.clone(),
            },
            Self::InscriptionUtxoNotFound {
                inscription_id,
                outpoint,
            } => Self::InscriptionUtxoNotFound {
                inscription_id: inscription_id.clone(),
                outpoint: outpoint.clone(),
            },
            Self::ScriptNotFound { outpoint, address } => Self::ScriptNotFound {
                outpoint: outpoint.clone(),
                address: address.clone(),
            },
            Self::Network(msg) => Self::Network(msg.clone()),
            Self::IndexerNotSynced => Self::IndexerNotSynced,
            Self::ListingRejected(msg) => Self::ListingRejected(msg.clone()),
            Self::Cancelled => Self::Cancelled,
            Self::Storage(err) => Self::Storage(err.replicate()),
            Self::Internal(msg) => Self::Internal(msg.clone()),
        }
    }
}

impl StorageError {
    fn replicate(&self) -> Self {
        match self {
            Self::Io(err) => Self::Io(std::io::Error::new(err.kind(), err.to_string())),
            Self::Json(err) => Self::Json(serde::de::Error::custom(err.to_string())),
            Self::Poisoned => Self::Poisoned,
        }
    }
}

impl From<reqwest::Error> for WalletError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, WalletError>;

//! Dogecoin network parameters

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Koinu per DOGE.
pub const KOINU_PER_DOGE: u64 = 100_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DogeNetwork {
    Mainnet,
    Testnet,
}

impl DogeNetwork {
    /// Base58 version byte of P2PKH addresses
    pub fn p2pkh_version(&self) -> u8 {
        match self {
            Self::Mainnet => 0x1e,
            Self::Testnet => 0x71,
        }
    }

    /// Base58 version byte of WIF-encoded private keys
    pub fn wif_version(&self) -> u8 {
        match self {
            Self::Mainnet => 0x9e,
            Self::Testnet => 0xf1,
        }
    }

    /// SLIP-44 coin type (3 for Dogecoin, 1 for every test network)
    pub fn coin_type(&self) -> u32 {
        match self {
            Self::Mainnet => 3,
            Self::Testnet => 1,
        }
    }

    pub fn network_kind(&self) -> bitcoin::NetworkKind {
        match self {
            Self::Mainnet => bitcoin::NetworkKind::Main,
            Self::Testnet => bitcoin::NetworkKind::Test,
        }
    }
}

impl fmt::Display for DogeNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mainnet => write!(f, "mainnet"),
            Self::Testnet => write!(f, "testnet"),
        }
    }
}

impl FromStr for DogeNetwork {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mainnet" | "main" | "doge" => Ok(Self::Mainnet),
            "testnet" | "test" => Ok(Self::Testnet),
            other => Err(format!("unknown Dogecoin network '{}'", other)),
        }
    }
}

/// Convert koinu to whole DOGE
pub fn koinu_to_doge(koinu: u64) -> f64 {
    koinu as f64 / KOINU_PER_DOGE as f64
}

use bip39::Mnemonic;
use bitcoin::secp256k1::rand;

use crate::error::{Result, WalletError};

/// BIP39 generation, validation and seed conversion.
pub trait MnemonicService: Send + Sync {
    fn generate(&self) -> Result<Mnemonic>;

    fn parse(&self, phrase: &str) -> Result<Mnemonic>;

    fn to_seed(&self, mnemonic: &Mnemonic) -> [u8; 64];
}

/// English-wordlist BIP39 with an empty passphrase
#[derive(Debug, Clone, Copy, Default)]
pub struct Bip39Mnemonic;

impl MnemonicService for Bip39Mnemonic {
    /// 12 words from 128 bits of entropy
    fn generate(&self) -> Result<Mnemonic> {
        let entropy = rand::random::<[u8; 16]>();
        Mnemonic::from_entropy(&entropy).map_err(|e| WalletError::InvalidMnemonic(e.to_string()))
    }

    fn parse(&self, phrase: &str) -> Result<Mnemonic> {
        let normalized = phrase.split_whitespace().collect::<Vec<_>>().join(" ");
        Mnemonic::parse(&normalized).map_err(|e| WalletError::InvalidMnemonic(e.to_string()))
    }

    fn to_seed(&self, mnemonic: &Mnemonic) -> [u8; 64] {
        mnemonic.to_seed("")
    }
}

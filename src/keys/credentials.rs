use bip39::Mnemonic;
use bitcoin::bip32::DerivationPath;
use bitcoin::secp256k1::SecretKey;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::derivation::{DogeKeyDerivation, KeyDerivationService};
use super::mnemonic::{Bip39Mnemonic, MnemonicService};
use crate::config::WalletConfig;
use crate::error::{Result, WalletError};

/// Signing key and address of one connected wallet.
///
/// The private key is only held in memory; `Debug` redacts it.
#[derive(Clone)]
pub struct Credentials {
    private_key: SecretKey,
    compressed: bool,
    address: String,
    wif: String,
    mnemonic: Option<Mnemonic>,
    derivation_path: Option<DerivationPath>,
}

impl Credentials {
    pub fn private_key(&self) -> &SecretKey {
        &self.private_key
    }

    /// `false` only for keys imported from a legacy uncompressed WIF
    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn wif(&self) -> &str {
        &self.wif
    }

    pub fn mnemonic(&self) -> Option<&Mnemonic> {
        self.mnemonic.as_ref()
    }

    pub fn mnemonic_phrase(&self) -> Option<String> {
        self.mnemonic.as_ref().map(|m| m.to_string())
    }

    /// `None` for wallets imported from a raw key
    pub fn derivation_path(&self) -> Option<&DerivationPath> {
        self.derivation_path.as_ref()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("address", &self.address)
            .field("compressed", &self.compressed)
            .field("has_mnemonic", &self.mnemonic.is_some())
            .field(
                "derivation_path",
                &self.derivation_path.as_ref().map(|p| p.to_string()),
            )
            .finish_non_exhaustive()
    }
}

/// Builds `Credentials` from a WIF key, a mnemonic, or fresh entropy.
///
/// All mnemonic-based derivations use the single fixed path held here.
#[derive(Clone)]
pub struct CredentialFactory {
    keys: Arc<dyn KeyDerivationService>,
    mnemonics: Arc<dyn MnemonicService>,
    derivation_path: DerivationPath,
}

impl CredentialFactory {
    pub fn new(
        keys: Arc<dyn KeyDerivationService>,
        mnemonics: Arc<dyn MnemonicService>,
        derivation_path: DerivationPath,
    ) -> Self {
        Self {
            keys,
            mnemonics,
            derivation_path,
        }
    }

    /// Factory wired to the default Dogecoin and BIP39 services
    pub fn from_config(config: &WalletConfig) -> Result<Self> {
        let path = config.derivation_path();
        let derivation_path = DerivationPath::from_str(&path)
            .map_err(|e| WalletError::Internal(format!("Invalid derivation path {}: {}", path, e)))?;

        Ok(Self::new(
            Arc::new(DogeKeyDerivation::new(config.network)),
            Arc::new(Bip39Mnemonic),
            derivation_path,
        ))
    }

    pub fn derivation_path(&self) -> &DerivationPath {
        &self.derivation_path
    }

    /// Same services, different path (e.g. one restored from storage)
    pub fn with_derivation_path(&self, derivation_path: DerivationPath) -> Self {
        Self {
            derivation_path,
            ..self.clone()
        }
    }

    /// Import a wallet from a WIF-encoded private key
    pub fn from_private_key(&self, wif: &str) -> Result<Credentials> {
        let key = self.keys.parse_wif(wif)?;
        let address = self.keys.address_for(&key.secret, key.compressed);

        log::debug!(
            "Imported {} private key for address {}",
            if key.compressed { "compressed" } else { "uncompressed" },
            address
        );

        Ok(Credentials {
            private_key: key.secret,
            compressed: key.compressed,
            address,
            wif: wif.trim().to_string(),
            mnemonic: None,
            derivation_path: None,
        })
    }

    /// Import a wallet from an existing mnemonic phrase
    pub fn from_mnemonic(&self, phrase: &str) -> Result<Credentials> {
        let mnemonic = self.mnemonics.parse(phrase)?;
        self.derive(mnemonic)
    }

    /// Generate a new wallet, or derive from `existing_phrase` when given
    pub fn generate_random(&self, existing_phrase: Option<&str>) -> Result<Credentials> {
        let mnemonic = match existing_phrase {
            Some(phrase) => self.mnemonics.parse(phrase)?,
            None => self.mnemonics.generate()?,
        };
        self.derive(mnemonic)
    }

    fn derive(&self, mnemonic: Mnemonic) -> Result<Credentials> {
        let seed = self.mnemonics.to_seed(&mnemonic);
        let private_key = self.keys.derive_child(&seed, &self.derivation_path)?;
        let address = self.keys.address_for(&private_key, true);
        let wif = self.keys.encode_wif(&private_key);

        log::debug!(
            "Derived address {} at {}",
            address,
            self.derivation_path
        );

        Ok(Credentials {
            private_key,
            compressed: true,
            address,
            wif,
            mnemonic: Some(mnemonic),
            derivation_path: Some(self.derivation_path.clone()),
        })
    }
}

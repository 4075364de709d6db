use bitcoin::bip32::{DerivationPath, Xpriv};
use bitcoin::hashes::{hash160, Hash};
use bitcoin::secp256k1::{PublicKey, Secp256k1, SecretKey};

use crate::error::{Result, WalletError};
use crate::network::DogeNetwork;

/// Elliptic-curve and address-encoding capability.
pub trait KeyDerivationService: Send + Sync {
    /// Decode a WIF string for this network
    fn parse_wif(&self, wif: &str) -> Result<WifKey>;

    /// Encode a secret key as compressed WIF
    fn encode_wif(&self, key: &SecretKey) -> String;

    /// P2PKH address of the key's public key in the given serialisation
    fn address_for(&self, key: &SecretKey, compressed: bool) -> String;

    /// BIP32 child key at `path` from a BIP39 seed
    fn derive_child(&self, seed: &[u8], path: &DerivationPath) -> Result<SecretKey>;
}

/// Secret key decoded from WIF.
///
/// Legacy uncompressed keys pay to the hash of the 65-byte public key, so
/// the flag decides which address the key controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WifKey {
    pub secret: SecretKey,
    pub compressed: bool,
}

/// Dogecoin key derivation on top of the `bitcoin` crate primitives
pub struct DogeKeyDerivation {
    network: DogeNetwork,
    secp: Secp256k1<bitcoin::secp256k1::All>,
}

impl DogeKeyDerivation {
    pub fn new(network: DogeNetwork) -> Self {
        Self {
            network,
            secp: Secp256k1::new(),
        }
    }

    pub fn network(&self) -> DogeNetwork {
        self.network
    }
}

impl KeyDerivationService for DogeKeyDerivation {
    fn parse_wif(&self, wif: &str) -> Result<WifKey> {
        let data = bitcoin::base58::decode_check(wif.trim())
            .map_err(|e| WalletError::InvalidKeyFormat(e.to_string()))?;

        // version || key(32) [|| 0x01 when compressed]
        let compressed = match data.len() {
            33 => false,
            34 if data[33] == 0x01 => true,
            34 => {
                return Err(WalletError::InvalidKeyFormat(
                    "Invalid compression flag".into(),
                ))
            }
            len => {
                return Err(WalletError::InvalidKeyFormat(format!(
                    "Unexpected payload length {}",
                    len
                )))
            }
        };

        if data[0] != self.network.wif_version() {
            return Err(WalletError::InvalidKeyFormat(format!(
                "WIF version 0x{:02x} does not belong to Dogecoin {}",
                data[0], self.network
            )));
        }

        let secret = SecretKey::from_slice(&data[1..33])
            .map_err(|e| WalletError::InvalidKeyFormat(e.to_string()))?;
        Ok(WifKey { secret, compressed })
    }

    fn encode_wif(&self, key: &SecretKey) -> String {
        let mut payload = Vec::with_capacity(34);
        payload.push(self.network.wif_version());
        payload.extend_from_slice(&key.secret_bytes());
        payload.push(0x01);
        bitcoin::base58::encode_check(&payload)
    }

    fn address_for(&self, key: &SecretKey, compressed: bool) -> String {
        let public_key = PublicKey::from_secret_key(&self.secp, key);
        let pubkey_hash = if compressed {
            hash160::Hash::hash(&public_key.serialize())
        } else {
            hash160::Hash::hash(&public_key.serialize_uncompressed())
        };

        let mut payload = Vec::with_capacity(21);
        payload.push(self.network.p2pkh_version());
        payload.extend_from_slice(&pubkey_hash.to_byte_array());
        bitcoin::base58::encode_check(&payload)
    }

    fn derive_child(&self, seed: &[u8], path: &DerivationPath) -> Result<SecretKey> {
        let master_key = Xpriv::new_master(self.network.network_kind(), seed)
            .map_err(|e| WalletError::Internal(format!("Master key: {}", e)))?;

        let child = master_key
            .derive_priv(&self.secp, path)
            .map_err(|e| WalletError::Internal(format!("Child key at {}: {}", path, e)))?;

        Ok(child.private_key)
    }
}

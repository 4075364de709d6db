//! Credential derivation
//!
//! - WIF import (`from_private_key`)
//! - BIP39 mnemonic import (`from_mnemonic`)
//! - Random generation (`generate_random`)
//!
//! The elliptic-curve and mnemonic capabilities are injected through
//! `KeyDerivationService` and `MnemonicService`.

mod credentials;
mod derivation;
mod mnemonic;

pub use credentials::{CredentialFactory, Credentials};
pub use derivation::{DogeKeyDerivation, KeyDerivationService, WifKey};
pub use mnemonic::{Bip39Mnemonic, MnemonicService};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WalletConfig;
    use crate::error::WalletError;
    use crate::network::DogeNetwork;

    const TEST_PHRASE: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    const TEST_PHRASE_24: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon art";

    // m/44'/3'/0'/0/0 of TEST_PHRASE
    const COMPRESSED_WIF: &str = "QPkeC1ZfHx3c9g7WTj9cQ8gnvk2iSAfAcbq1aVAWjNTwDAKfZUzx";
    const COMPRESSED_ADDRESS: &str = "DBus3bamQjgJULBJtYXpEzDWQRwF5iwxgC";
    const UNCOMPRESSED_WIF: &str = "6JPaMAeJjouhb8xPzFzETYCHJAJ9wBoFsCyC1LXFSTcZDmHgy6L";
    const UNCOMPRESSED_ADDRESS: &str = "DDKHC5VfJ36c9BhX8YP3X4nQ7GDxUZZWP8";

    fn mainnet_factory() -> CredentialFactory {
        CredentialFactory::from_config(&WalletConfig::default()).unwrap()
    }

    #[test]
    fn test_mnemonic_derivation_is_deterministic() {
        let factory = mainnet_factory();
        let first = factory.from_mnemonic(TEST_PHRASE).unwrap();
        let second = factory.from_mnemonic(TEST_PHRASE).unwrap();

        assert_eq!(first.private_key(), second.private_key());
        assert_eq!(first.address(), second.address());
        assert_eq!(first.mnemonic_phrase().as_deref(), Some(TEST_PHRASE));
        let expected: bitcoin::bip32::DerivationPath = "m/44'/3'/0'/0/0".parse().unwrap();
        assert_eq!(first.derivation_path(), Some(&expected));
    }

    #[test]
    fn test_24_word_derivation_is_deterministic() {
        let factory = mainnet_factory();
        let first = factory.from_mnemonic(TEST_PHRASE_24).unwrap();
        let second = factory.from_mnemonic(TEST_PHRASE_24).unwrap();

        assert_eq!(first.private_key(), second.private_key());
        assert_eq!(first.address(), "DL1DoPj4HvpnRT9n3YfCkhHXe5287wMyWD");
        assert_eq!(second.address(), first.address());
        assert_eq!(first.mnemonic_phrase().as_deref(), Some(TEST_PHRASE_24));
    }

    #[test]
    fn test_mainnet_encodings() {
        let credentials = mainnet_factory().from_mnemonic(TEST_PHRASE).unwrap();
        assert_eq!(credentials.address(), COMPRESSED_ADDRESS);
        assert_eq!(credentials.wif(), COMPRESSED_WIF);
        assert!(credentials.is_compressed());
    }

    #[test]
    fn test_compressed_wif_import() {
        let credentials = mainnet_factory().from_private_key(COMPRESSED_WIF).unwrap();
        assert!(credentials.is_compressed());
        assert_eq!(credentials.address(), COMPRESSED_ADDRESS);
    }

    #[test]
    fn test_uncompressed_wif_import() {
        let factory = mainnet_factory();
        let credentials = factory.from_private_key(UNCOMPRESSED_WIF).unwrap();

        assert!(!credentials.is_compressed());
        assert_eq!(credentials.address(), UNCOMPRESSED_ADDRESS);
        assert_eq!(credentials.wif(), UNCOMPRESSED_WIF);
        // Same secret as the compressed form, different address
        let compressed = factory.from_private_key(COMPRESSED_WIF).unwrap();
        assert_eq!(credentials.private_key(), compressed.private_key());
    }

    #[test]
    fn test_wif_import_matches_mnemonic_address() {
        let factory = mainnet_factory();
        let from_phrase = factory.from_mnemonic(TEST_PHRASE).unwrap();
        let from_wif = factory.from_private_key(from_phrase.wif()).unwrap();

        assert_eq!(from_wif.address(), from_phrase.address());
        assert_eq!(from_wif.private_key(), from_phrase.private_key());
        assert!(from_wif.mnemonic().is_none());
        assert!(from_wif.derivation_path().is_none());
    }

    #[test]
    fn test_invalid_wif_is_rejected() {
        let factory = mainnet_factory();
        for bad in ["", "not-a-key", "QNcdLVw8fHkixm6NNyN6nVwxKek4u7qrioRbQmjxac5TVoTtZuot"] {
            let err = factory.from_private_key(bad).unwrap_err();
            assert!(matches!(err, WalletError::InvalidKeyFormat(_)), "{}: {:?}", bad, err);
        }
    }

    #[test]
    fn test_wif_from_other_network_is_rejected() {
        let testnet = CredentialFactory::from_config(&WalletConfig {
            network: DogeNetwork::Testnet,
            ..Default::default()
        })
        .unwrap();
        let testnet_wif = testnet.from_mnemonic(TEST_PHRASE).unwrap().wif().to_string();

        let err = mainnet_factory().from_private_key(&testnet_wif).unwrap_err();
        assert!(matches!(err, WalletError::InvalidKeyFormat(_)));
    }

    #[test]
    fn test_invalid_mnemonic_is_rejected() {
        let factory = mainnet_factory();
        // valid words, bad checksum
        let bad_checksum = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon";
        let err = factory.from_mnemonic(bad_checksum).unwrap_err();
        assert!(matches!(err, WalletError::InvalidMnemonic(_)));

        let err = factory.from_mnemonic("dogecoin to the moon").unwrap_err();
        assert!(matches!(err, WalletError::InvalidMnemonic(_)));
    }

    #[test]
    fn test_generate_random() {
        let factory = mainnet_factory();
        let generated = factory.generate_random(None).unwrap();
        let phrase = generated.mnemonic_phrase().unwrap();
        assert_eq!(phrase.split_whitespace().count(), 12);

        let restored = factory.from_mnemonic(&phrase).unwrap();
        assert_eq!(restored.address(), generated.address());

        let reused = factory.generate_random(Some(TEST_PHRASE)).unwrap();
        assert_eq!(
            reused.address(),
            factory.from_mnemonic(TEST_PHRASE).unwrap().address()
        );
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let credentials = mainnet_factory().from_mnemonic(TEST_PHRASE).unwrap();
        let rendered = format!("{:?}", credentials);
        assert!(!rendered.contains(credentials.wif()));
        assert!(rendered.contains(credentials.address()));
    }
}

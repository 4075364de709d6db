use anyhow::Context;
use std::env;
use std::sync::Arc;

use tapondoge_wallet::{CredentialFactory, FileStore, Wallet, WalletConfig, WalletServices};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    // RUST_LOG=debug for per-request output
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = WalletConfig::from_env();
    let factory = CredentialFactory::from_config(&config)?;

    let credentials = if let Ok(phrase) = env::var("WALLET_MNEMONIC") {
        factory.from_mnemonic(&phrase)?
    } else if let Ok(wif) = env::var("WALLET_WIF") {
        factory.from_private_key(&wif)?
    } else {
        let generated = factory.generate_random(None)?;
        log::warn!("No WALLET_MNEMONIC or WALLET_WIF set, generated a new wallet");
        if let Some(phrase) = generated.mnemonic_phrase() {
            eprintln!("New mnemonic (write it down): {}", phrase);
        }
        generated
    };

    let store = FileStore::open(&config.data_dir)
        .with_context(|| format!("Opening wallet store in {}", config.data_dir.display()))?;
    log::info!("Using store {}", store.path().display());

    let services = WalletServices::http(&config)?;
    let wallet = Wallet::initialize(credentials, services, Arc::new(store), &config).await?;

    println!("{}", serde_json::to_string_pretty(&wallet.snapshot())?);

    if let Ok(tick) = env::var("TICK") {
        let transferable = wallet.transferable_inscriptions(&tick).await;
        log::info!("{} transferable {} inscriptions", transferable.len(), tick);
        println!("{}", serde_json::to_string_pretty(&transferable)?);
    }

    Ok(())
}

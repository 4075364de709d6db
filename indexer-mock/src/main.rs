//! Indexer Mock Server
//!
//! Standalone server for local development against a fixture file.
use anyhow::{Context, Result};
use std::env;
use std::sync::Arc;

use indexer_mock::{run_server, Fixture, MockState};

#[derive(Debug)]
struct Config {
    fixture_path: Option<String>,
    server_host: String,
    server_port: u16,
}

impl Config {
    fn from_env() -> Result<Self> {
        dotenv::dotenv().ok(); // Load .env file if present

        let fixture_path = env::var("MOCK_FIXTURE").ok();

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("Invalid SERVER_PORT")?;

        Ok(Self {
            fixture_path,
            server_host,
            server_port,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().context("Failed to load configuration")?;

    let fixture = match &config.fixture_path {
        Some(path) => {
            log::info!("Loading fixture {}", path);
            Fixture::load(path)?
        }
        None => {
            log::warn!("MOCK_FIXTURE not set, serving an empty fixture");
            Fixture::default()
        }
    };

    run_server(
        Arc::new(MockState::new(fixture)),
        config.server_host,
        config.server_port,
    )
    .await
    .context("Server error")?;

    Ok(())
}

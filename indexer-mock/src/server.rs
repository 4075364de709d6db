//! Axum HTTP server setup and routing
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::*;
use crate::state::MockState;
use crate::types::Fixture;

pub fn create_router(state: Arc<MockState>) -> Router {
    // The browser front-end calls all three services cross-origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(health_check))
        .route("/mock/calls", get(get_call_counts))
        // UTXO indexer
        .route("/utxos", post(get_address_outputs))
        .route("/bestblock", get(get_best_block))
        .route("/transaction/:txid", get(get_transaction))
        // Ord explorer
        .route("/output/:outpoint", get(get_output_page))
        .route("/content/:id", get(get_content))
        // Token API
        .route("/getSingleTransferable/:id", get(get_single_transferable))
        .route("/getAccountTokensBalance/:address", get(get_account_balances))
        .route("/token/list", post(submit_listing))
        // Shared state
        .with_state(state)
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(state: Arc<MockState>, host: String, port: u16) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    log::info!("Indexer mock listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Server running in the background of the current tokio runtime
pub struct MockServer {
    pub addr: SocketAddr,
    pub state: Arc<MockState>,
    handle: JoinHandle<()>,
}

impl MockServer {
    /// Base URL usable for all three services
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Serve `fixture` on an ephemeral localhost port
pub async fn spawn(fixture: Fixture) -> anyhow::Result<MockServer> {
    let state = Arc::new(MockState::new(fixture));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = create_router(state.clone());

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            log::error!("Indexer mock stopped: {}", e);
        }
    });

    log::debug!("Indexer mock spawned on {}", addr);
    Ok(MockServer {
        addr,
        state,
        handle,
    })
}

//! Axum HTTP handlers for the mocked UTXO indexer, ord explorer and token API
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::state::{MockState, BEST_BLOCK_HASH};
use crate::types::*;

/// Shared application state
pub type AppState = Arc<MockState>;

/// Custom error type for handlers
pub enum ApiError {
    NotFound(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, message).into_response()
    }
}

impl From<FixtureError> for ApiError {
    fn from(err: FixtureError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

// ============================================================================
// UTXO INDEXER
// ============================================================================

/// POST /utxos
/// Unspent outputs of the address in the body; unknown addresses have none
pub async fn get_address_outputs(
    State(state): State<AppState>,
    Json(query): Json<AddressQuery>,
) -> Json<OutputsResponse<AddressOutput>> {
    state.record("utxos");
    let outputs = state.fixture(|f| f.addresses.get(&query.address).cloned().unwrap_or_default());
    log::debug!("{} outputs for {}", outputs.len(), query.address);
    Json(OutputsResponse { outputs })
}

/// GET /bestblock
pub async fn get_best_block(State(state): State<AppState>) -> Json<BestBlockResponse> {
    state.record("bestblock");
    let synced = state.fixture(|f| f.synced);
    Json(BestBlockResponse {
        success: synced,
        hash: synced.then(|| BEST_BLOCK_HASH.to_string()),
    })
}

/// GET /transaction/{txid}
pub async fn get_transaction(
    State(state): State<AppState>,
    Path(txid): Path<String>,
) -> Result<Json<OutputsResponse<TransactionOutput>>, ApiError> {
    state.record("transaction");
    let outputs = state
        .fixture(|f| f.transactions.get(&txid).cloned())
        .ok_or_else(|| ApiError::NotFound(format!("Transaction not found: {}", txid)))?;
    Ok(Json(OutputsResponse { outputs }))
}

// ============================================================================
// ORD EXPLORER
// ============================================================================

/// GET /output/{txid}:{vout}
/// HTML output page linking to every inscription it carries
pub async fn get_output_page(
    State(state): State<AppState>,
    Path(outpoint): Path<String>,
) -> Html<String> {
    state.record("output");
    let ids = state.fixture(|f| f.outputs.get(&outpoint).cloned().unwrap_or_default());
    Html(render_output_page(&outpoint, &ids))
}

/// GET /content/{inscription_id}
/// Raw inscription body with its content type
pub async fn get_content(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    state.record("content");
    let inscription = state
        .fixture(|f| f.inscriptions.get(&id).cloned())
        .ok_or_else(|| ApiError::NotFound(format!("Inscription not found: {}", id)))?;
    let body = inscription.body(&id)?;
    Ok(([(header::CONTENT_TYPE, inscription.content_type)], body).into_response())
}

fn render_output_page(outpoint: &str, ids: &[String]) -> String {
    let mut page = format!(
        "<!doctype html>\n<html>\n<head><title>Output {0}</title></head>\n<body>\n<h1>Output <span class=monospace>{0}</span></h1>\n<dl>\n",
        outpoint
    );
    if !ids.is_empty() {
        page.push_str("<dt>inscriptions</dt>\n<dd class=thumbnails>\n");
        for id in ids {
            page.push_str(&format!(
                "  <a href=/inscription/{0}><iframe sandbox=allow-scripts scrolling=no loading=lazy src=/preview/{0}></iframe></a>\n",
                id
            ));
        }
        page.push_str("</dd>\n");
    }
    page.push_str("</dl>\n</body>\n</html>\n");
    page
}

// ============================================================================
// TOKEN API
// ============================================================================

/// GET /getSingleTransferable/{inscription_id}
/// Unknown inscriptions report `result: null`
pub async fn get_single_transferable(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<Value> {
    state.record("getSingleTransferable");
    let body = match state.fixture(|f| f.transferable.get(&id).cloned()) {
        Some(transferable) => json!(transferable),
        None => json!({ "result": null }),
    };
    Json(body)
}

/// GET /getAccountTokensBalance/{address}
pub async fn get_account_balances(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Json<BalanceResponse> {
    state.record("getAccountTokensBalance");
    let list = state.fixture(|f| f.balances.get(&address).cloned().unwrap_or_default());
    Json(BalanceResponse {
        data: BalanceList { list },
    })
}

/// POST /token/list
/// Records the listing and accepts it unless the fixture rejects listings
pub async fn submit_listing(
    State(state): State<AppState>,
    Json(listing): Json<Value>,
) -> Json<ListingResponse> {
    state.record("token/list");
    let rejection = state.fixture(|f| f.reject_listings.clone());
    let count = state.push_listing(listing);

    let response = match rejection {
        Some(message) => {
            log::info!("Rejecting listing: {}", message);
            ListingResponse {
                success: false,
                message: Some(message),
                listing_id: None,
            }
        }
        None => ListingResponse {
            success: true,
            message: None,
            listing_id: Some(format!("listing-{}", count)),
        },
    };
    Json(response)
}

// ============================================================================
// MOCK HELPERS
// ============================================================================

/// GET /mock/calls
/// Calls served per endpoint
pub async fn get_call_counts(State(state): State<AppState>) -> Json<HashMap<String, usize>> {
    Json(state.all_calls())
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_page_links() {
        let page = render_output_page("aa:0", &["abci0".to_string(), "defi1".to_string()]);
        assert!(page.contains("href=/inscription/abci0"));
        assert!(page.contains("href=/inscription/defi1"));

        let empty = render_output_page("aa:1", &[]);
        assert!(!empty.contains("/inscription/"));
    }
}

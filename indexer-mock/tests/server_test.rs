use indexer_mock::{spawn, Fixture, TokenBalance};
use serde_json::{json, Value};

const ADDRESS: &str = "DH5yaieqoZN36fDVciNyRueRGvGLR3mr7L";
const TXID: &str = "6fb976ab49dcec017f1e201e84395983204ae1a7c2abf7ced0a85d692e442799";

fn inscription_id() -> String {
    format!("{}i0", TXID)
}

#[tokio::test]
async fn test_utxo_endpoints() {
    let server = spawn(Fixture::default().with_output(ADDRESS, TXID, 0, 100_000))
        .await
        .unwrap();
    let client = reqwest::Client::new();

    let body: Value = client
        .post(format!("{}/utxos", server.url()))
        .json(&json!({ "address": ADDRESS }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["outputs"][0]["value"], 100_000);

    let unknown: Value = client
        .post(format!("{}/utxos", server.url()))
        .json(&json!({ "address": "DUnknown" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(unknown["outputs"], json!([]));

    let tip: Value = client
        .get(format!("{}/bestblock", server.url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(tip["success"], true);

    let missing = client
        .get(format!("{}/transaction/{}", server.url(), TXID))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);

    assert_eq!(server.state.calls("utxos"), 2);
    assert_eq!(server.state.calls("bestblock"), 1);
}

#[tokio::test]
async fn test_ord_endpoints() {
    let id = inscription_id();
    let server = spawn(Fixture::default().with_text_inscription(
        &format!("{}:0", TXID),
        &id,
        "hello",
    ))
    .await
    .unwrap();

    let page = reqwest::get(format!("{}/output/{}:0", server.url(), TXID))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains(&format!("/inscription/{}", id)));

    let content = reqwest::get(format!("{}/content/{}", server.url(), id))
        .await
        .unwrap();
    assert_eq!(
        content.headers()[reqwest::header::CONTENT_TYPE],
        "text/plain;charset=utf-8"
    );
    assert_eq!(content.text().await.unwrap(), "hello");
}

#[tokio::test]
async fn test_token_endpoints() {
    let id = inscription_id();
    let server = spawn(
        Fixture::default()
            .with_transferable(&id, Some("5000000000000000000"), Some(9))
            .with_balance(
                ADDRESS,
                TokenBalance {
                    ticker: "dogi".into(),
                    overall_balance: "5000000000000000000".into(),
                    transferable_balance: "0".into(),
                },
            )
            .rejecting_listings("market closed"),
    )
    .await
    .unwrap();
    let client = reqwest::Client::new();

    let check: Value = reqwest::get(format!("{}/getSingleTransferable/{}", server.url(), id))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(check["result"], "5000000000000000000");
    assert_eq!(check["inscriptionNumber"], 9);

    let unknown: Value = reqwest::get(format!("{}/getSingleTransferable/other", server.url()))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(unknown["result"].is_null());

    let balances: Value =
        reqwest::get(format!("{}/getAccountTokensBalance/{}", server.url(), ADDRESS))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
    assert_eq!(balances["data"]["list"][0]["ticker"], "dogi");

    let listing: Value = client
        .post(format!("{}/token/list", server.url()))
        .json(&json!({ "tick": "dogi" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listing["success"], false);
    assert_eq!(listing["message"], "market closed");
    assert_eq!(server.state.listings().len(), 1);
}

#[test]
fn test_sample_fixture_loads() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/sample.json");
    let fixture = Fixture::load(path).unwrap();
    assert!(fixture.synced);
    assert_eq!(fixture.addresses[ADDRESS].len(), 2);
}

mod support;

use std::time::Duration;

use block_time::parse_timestamp;
use block_time_client::net::rest::{SpanAnchoredSource, TendermintClient, fetch_json};
use block_time_client::net::{BlockSource, ClientError, parse_endpoint};
use serde_json::{Value, json};
use support::{MockServer, Reply};

fn status_body(latest: u64, time: &str, earliest: u64) -> String {
    json!({
        "jsonrpc": "2.0",
        "id": -1,
        "result": {
            "node_info": {"network": "heimdallv2-137"},
            "sync_info": {
                "latest_block_hash": "ABCD",
                "latest_block_height": latest.to_string(),
                "latest_block_time": time,
                "earliest_block_height": earliest.to_string(),
                "catching_up": false
            }
        }
    })
    .to_string()
}

fn block_body(height: u64, time: &str) -> String {
    json!({
        "result": {
            "block_id": {"hash": "00"},
            "block": {"header": {"chain_id": "heimdallv2-137", "height": height.to_string(), "time": time}}
        }
    })
    .to_string()
}

fn client(server: &MockServer) -> TendermintClient {
    TendermintClient::new(&server.url(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn fetch_json_maps_failures_to_the_error_taxonomy() {
    let server = MockServer::route(vec![
        ("/ok", Reply::ok(r#"{"value": 7}"#)),
        ("/garbage", Reply::ok("not json")),
        ("/boom", Reply::Json(500, "{}".to_string())),
    ])
    .await;
    let http = reqwest::Client::new();
    let url = |path: &str| parse_endpoint(&format!("{}{path}", server.url())).unwrap();

    let ok: Value = fetch_json(&http, url("/ok")).await.unwrap();
    assert_eq!(ok["value"], 7);

    let missing = fetch_json::<Value>(&http, url("/missing")).await.unwrap_err();
    assert!(
        matches!(missing, ClientError::HttpStatus { status, .. } if status.as_u16() == 404),
        "{missing}"
    );

    let boom = fetch_json::<Value>(&http, url("/boom")).await.unwrap_err();
    assert!(matches!(boom, ClientError::HttpStatus { status, .. } if status.as_u16() == 500));

    let garbage = fetch_json::<Value>(&http, url("/garbage")).await.unwrap_err();
    assert!(matches!(garbage, ClientError::Decode(_)), "{garbage}");

    // One request each, no retries.
    assert_eq!(server.hits(), 4);
}

#[tokio::test]
async fn fetch_json_reports_dropped_connections_as_transport_errors() {
    let server = MockServer::start(vec![Reply::Hangup]).await;
    let http = reqwest::Client::new();

    let err = fetch_json::<Value>(&http, parse_endpoint(&server.url()).unwrap())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Transport(_)), "{err}");
    assert_eq!(server.hits(), 1);
}

#[tokio::test]
async fn status_decodes_tip_and_earliest_height() {
    let server = MockServer::route(vec![(
        "/status",
        Reply::ok(status_body(27_000_000, "2025-08-01T10:00:00.123456789Z", 24_404_501)),
    )])
    .await;

    let tip = client(&server).status().await.unwrap();

    assert_eq!(tip.block.height, 27_000_000);
    assert_eq!(
        tip.block.time,
        parse_timestamp("2025-08-01T10:00:00.123456789Z").unwrap()
    );
    assert_eq!(tip.earliest, Some(24_404_501));
}

#[tokio::test]
async fn status_without_earliest_height_has_no_floor() {
    let body = json!({"result": {"sync_info": {
        "latest_block_height": "100",
        "latest_block_time": "2024-01-01T00:00:00Z"
    }}});
    let server = MockServer::route(vec![("/status", Reply::ok(body.to_string()))]).await;

    let tip = client(&server).latest().await.unwrap();

    assert_eq!(tip.block.height, 100);
    assert_eq!(tip.earliest, None);
}

#[tokio::test]
async fn block_decodes_current_and_legacy_layouts() {
    let legacy = json!({"result": {"block_meta": {"header": {
        "height": "8786500",
        "time": "2025-06-01T00:00:00Z"
    }}}});
    let server = MockServer::route(vec![
        ("/block?height=42", Reply::ok(block_body(42, "2025-06-01T12:00:00.5Z"))),
        ("/block?height=8786500", Reply::ok(legacy.to_string())),
    ])
    .await;
    let client = client(&server);

    let current = client.block(42).await.unwrap();
    assert_eq!(current.height, 42);
    assert_eq!(current.time, parse_timestamp("2025-06-01T12:00:00.5Z").unwrap());

    let old = client.block_at(8_786_500).await.unwrap();
    assert_eq!(old.height, 8_786_500);
    assert_eq!(old.time, parse_timestamp("2025-06-01T00:00:00Z").unwrap());
}

#[tokio::test]
async fn block_with_empty_time_is_a_decode_error() {
    let server = MockServer::route(vec![(
        "/block?height=5",
        Reply::ok(json!({"result": {"block": {"header": {"height": "5", "time": ""}}}}).to_string()),
    )])
    .await;

    let err = client(&server).block(5).await.unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)), "{err}");
}

#[tokio::test]
async fn malformed_height_is_a_parse_error() {
    let server = MockServer::route(vec![(
        "/status",
        Reply::ok(status_body(1, "2024-01-01T00:00:00Z", 1).replace("\"1\"", "\"one\"")),
    )])
    .await;

    let err = client(&server).status().await.unwrap_err();
    assert!(matches!(err, ClientError::Parse(_)), "{err}");
}

#[tokio::test]
async fn span_anchored_source_takes_height_from_latest_span() {
    let heimdall_api = MockServer::route(vec![(
        "/bor/latest-span",
        Reply::ok(json!({"height": "8786000", "result": {"id": 1234}}).to_string()),
    )])
    .await;
    let tendermint = MockServer::route(vec![(
        "/block?height=8786000",
        Reply::ok(block_body(8_786_000, "2025-06-01T00:00:00Z")),
    )])
    .await;
    let blocks = client(&tendermint);
    let source = SpanAnchoredSource::new(&blocks, &heimdall_api.url()).unwrap();

    let tip = source.latest().await.unwrap();

    assert_eq!(tip.block.height, 8_786_000);
    assert_eq!(tip.earliest, None);
    assert_eq!(heimdall_api.hits(), 1);
    assert_eq!(tendermint.hits(), 1);
}

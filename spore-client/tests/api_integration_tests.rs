//! Integration tests for the JSON-RPC clients.
//!
//! These tests use wiremock to simulate a CKB node and indexer and verify
//! that requests are shaped correctly and responses are handled.

use serde_json::{Value, json};
use spore_client::mutation::SignedTransaction;
use spore_client::testing::CellBuilder;
use spore_client::{
    ChainContext, ClientError, ClusterService, IndexerClient, NodeClient, QueryOptions,
    SporeConfig, SporeService,
};
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn config_for(server: &MockServer) -> SporeConfig {
    let mut config = SporeConfig::testnet();
    config.ckb_node_url = server.uri();
    config.ckb_indexer_url = server.uri();
    config
}

fn rpc_result(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": result
    }))
}

async fn last_request_body(server: &MockServer) -> Value {
    let requests = server.received_requests().await.unwrap();
    requests.last().unwrap().body_json().unwrap()
}

#[tokio::test]
async fn test_get_cluster_over_rpc() {
    let mock_server = MockServer::start().await;
    let config = config_for(&mock_server);
    let cell = CellBuilder::cluster(&config, [0xab; 32])
        .cluster_data("Sporeland", "Home of spores")
        .build();

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "get_cells" })))
        .respond_with(rpc_result(json!({
            "objects": [cell],
            "last_cursor": "0x01"
        })))
        .mount(&mock_server)
        .await;

    let service = ClusterService::new(config.clone()).unwrap();
    let cluster = service
        .get(&format!("0x{}", "ab".repeat(32)))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cluster.name, "Sporeland");
    assert_eq!(cluster.description, "Home of spores");

    let body = last_request_body(&mock_server).await;
    assert_eq!(body["jsonrpc"], "2.0");
    let params = &body["params"];
    let search_key = &params[0];
    assert_eq!(search_key["script_type"], "type");
    assert_eq!(search_key["script_search_mode"], "prefix");
    assert_eq!(search_key["with_data"], true);
    assert_eq!(
        search_key["script"]["code_hash"],
        config.scripts.cluster.code_hash.to_string()
    );
    assert_eq!(search_key["script"]["hash_type"], "data1");
    assert_eq!(params[1], "asc");
    assert_eq!(params[2], "0x64");
    assert_eq!(params[3], Value::Null);
}

#[tokio::test]
async fn test_list_by_lock_moves_type_into_filter() {
    let mock_server = MockServer::start().await;
    let config = config_for(&mock_server);

    Mock::given(method("POST"))
        .respond_with(rpc_result(json!({ "objects": [], "last_cursor": "0x" })))
        .mount(&mock_server)
        .await;

    let service = SporeService::new(config.clone()).unwrap();
    let lock = spore_client::testing::default_lock(4);
    let result = service
        .list_by_lock(&lock, QueryOptions::limit(5))
        .await
        .unwrap();
    assert!(result.items.is_empty());
    assert_eq!(result.collected, 0);

    let body = last_request_body(&mock_server).await;
    let search_key = &body["params"][0];
    assert_eq!(search_key["script_type"], "lock");
    assert_eq!(search_key["script"]["args"], lock.args.to_hex());
    assert_eq!(
        search_key["filter"]["script"]["code_hash"],
        config.scripts.spore.code_hash.to_string()
    );
    assert_eq!(body["params"][1], "desc");
}

#[tokio::test]
async fn test_rpc_error_object() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32602, "message": "Invalid params" }
        })))
        .mount(&mock_server)
        .await;

    let service = SporeService::new(config_for(&mock_server)).unwrap();
    let result = service.recent(10, false).await;

    match result {
        Err(ClientError::Rpc { code, message }) => {
            assert_eq!(code, -32602);
            assert_eq!(message, "Invalid params");
        }
        other => panic!("Expected RPC error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal server error"))
        .mount(&mock_server)
        .await;

    let service = ClusterService::new(config_for(&mock_server)).unwrap();
    let result = service.list(QueryOptions::limit(1)).await;

    match result {
        Err(ClientError::Api { status, message }) => {
            assert_eq!(status, 500);
            assert!(message.contains("Internal server error"));
        }
        _ => panic!("Expected API error"),
    }
}

#[tokio::test]
async fn test_missing_result() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "jsonrpc": "2.0", "id": 1 })))
        .mount(&mock_server)
        .await;

    let node = NodeClient::new(mock_server.uri()).unwrap();
    assert!(matches!(
        node.get_tip_block_number().await,
        Err(ClientError::InvalidResponse(_))
    ));
}

#[tokio::test]
async fn test_get_tip_block_number() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "get_tip_block_number" })))
        .respond_with(rpc_result(json!("0x3e8")))
        .mount(&mock_server)
        .await;

    let node = NodeClient::new(mock_server.uri()).unwrap();
    assert_eq!(node.get_tip_block_number().await.unwrap(), 1000);
}

#[tokio::test]
async fn test_send_transaction_passthrough() {
    let mock_server = MockServer::start().await;
    let hash = format!("0x{}", "cd".repeat(32));

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "send_transaction" })))
        .respond_with(rpc_result(json!(hash)))
        .mount(&mock_server)
        .await;

    let node = NodeClient::new(mock_server.uri()).unwrap();
    let tx = SignedTransaction::new(json!({ "version": "0x0", "witnesses": [] }));
    let sent = node.send_transaction(&tx).await.unwrap();
    assert_eq!(sent.to_string(), hash);

    let body = last_request_body(&mock_server).await;
    assert_eq!(body["params"][0]["version"], "0x0");
    assert_eq!(body["params"][1], "passthrough");
}

#[tokio::test]
async fn test_paging_follows_cursor() {
    let mock_server = MockServer::start().await;
    let config = config_for(&mock_server);

    let first: Vec<_> = (1..=100u8)
        .map(|i| CellBuilder::spore(&config, [i; 32]).build())
        .collect();
    let second = vec![CellBuilder::spore(&config, [0xff; 32]).build()];

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "get_cells" })))
        .respond_with(move |request: &Request| {
            let body: Value = request.body_json().unwrap();
            assert_eq!(body["params"][1], "desc");
            assert_eq!(body["params"][2], "0x64");
            match body["params"][3].as_str() {
                None => rpc_result(json!({ "objects": first, "last_cursor": "0xaa" })),
                Some("0xaa") => rpc_result(json!({ "objects": second, "last_cursor": "0xbb" })),
                Some(other) => panic!("unexpected cursor {}", other),
            }
        })
        .mount(&mock_server)
        .await;

    let indexer = Arc::new(IndexerClient::new(mock_server.uri()).unwrap());
    let service = SporeService::with_context(ChainContext::with_indexer(config, indexer));
    let result = service.list(&[], QueryOptions::default()).await.unwrap();

    assert_eq!(result.items.len(), 101);
    assert_eq!(result.collected, 101);
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
}

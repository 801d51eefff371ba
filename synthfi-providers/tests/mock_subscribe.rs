//! End-to-end coverage against an in-process mock JSON-RPC websocket server, standing in
//! for a live Solana node the way a scripted fake server stands in for a live Ethereum
//! node in `ethers-providers`'s own transport tests. Drives the coalescing scenario: three
//! concurrent subscribers for the same account should produce exactly one upstream
//! `accountSubscribe` and one fanned-out notification.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

use synthfi_core::Commitment;
use synthfi_providers::SolanaPubSubClient;

/// Accepts exactly one connection, replies to the first inbound frame (expected to be an
/// `accountSubscribe` call) with a successful subscription id, then pushes one
/// `accountNotification`, and keeps reading until the client disconnects so the test's
/// `SolanaPubSubClient` (and its background engine task) can be dropped cleanly instead of
/// the mock server seeing a broken pipe on its next write attempt.
async fn run_mock_server(listener: TcpListener, subscribe_calls: Arc<AtomicUsize>) {
    let (stream, _) = listener.accept().await.expect("accept");
    let mut ws = tokio_tungstenite::accept_async(stream).await.expect("ws handshake");

    let Some(Ok(Message::Text(text))) = ws.next().await else {
        panic!("expected the initial accountSubscribe frame");
    };
    let request: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(request["method"], "accountSubscribe");
    subscribe_calls.fetch_add(1, Ordering::SeqCst);
    let id = request["id"].as_u64().unwrap();

    let reply = serde_json::json!({"jsonrpc": "2.0", "id": id, "result": 42});
    ws.send(Message::Text(reply.to_string())).await.unwrap();

    let notification = serde_json::json!({
        "jsonrpc": "2.0",
        "method": "accountNotification",
        "params": {
            "subscription": 42,
            "result": {
                "context": {"slot": 1234},
                "value": {
                    "executable": false,
                    "lamports": 100,
                    "owner": "11111111111111111111111111111111",
                    "data": ["aGVsbG8=", "base64"]
                }
            }
        }
    });
    ws.send(Message::Text(notification.to_string())).await.unwrap();

    // No `unsubscribe` call is ever issued in this test (unsubscribe is only sent when a
    // caller explicitly asks for it, not on drop), so this just keeps the socket alive
    // until the test process tears it down.
    while ws.next().await.is_some() {}
}

#[tokio::test]
async fn three_concurrent_subscribers_coalesce_onto_one_upstream_subscription() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let subscribe_calls = Arc::new(AtomicUsize::new(0));

    tokio::spawn(run_mock_server(listener, subscribe_calls.clone()));

    let url = url::Url::parse(&format!("ws://{addr}")).unwrap();
    let client = SolanaPubSubClient::connect(url).await.unwrap();

    let account: synthfi_core::PublicKey = "11111111111111111111111111111111".parse().unwrap();
    let subscriber = client.account_subscriber();

    let (a, b, c) = tokio::join!(
        subscriber.subscribe(account, Commitment::Confirmed),
        subscriber.subscribe(account, Commitment::Confirmed),
        subscriber.subscribe(account, Commitment::Confirmed),
    );
    let (handle_a, mut stream_a) = a.unwrap();
    let (handle_b, mut stream_b) = b.unwrap();
    let (handle_c, mut stream_c) = c.unwrap();

    assert_ne!(handle_a, handle_b);
    assert_ne!(handle_b, handle_c);
    assert_ne!(handle_a, handle_c);

    let info_a = stream_a.next().await.unwrap().unwrap();
    let info_b = stream_b.next().await.unwrap().unwrap();
    let info_c = stream_c.next().await.unwrap().unwrap();

    assert_eq!(info_a.lamports, 100);
    assert_eq!(info_a.data, b"hello");
    assert_eq!(info_b.lamports, info_a.lamports);
    assert_eq!(info_c.lamports, info_a.lamports);

    assert_eq!(subscribe_calls.load(Ordering::SeqCst), 1);
}

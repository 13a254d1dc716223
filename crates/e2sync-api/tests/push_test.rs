#![allow(clippy::unwrap_used)]
// Integration tests for the push channel against a local WebSocket server.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, oneshot};
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use url::Url;

use e2sync_api::push::{DEFAULT_PING, push_url_for};
use e2sync_api::{ConnectionState, PushConfig, PushEvent, PushHandle, ReconnectConfig};

// ── Helpers ─────────────────────────────────────────────────────────

fn fast_config(max_retries: Option<u32>) -> PushConfig {
    PushConfig {
        reconnect: ReconnectConfig {
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(50),
            max_retries,
        },
        ..PushConfig::default()
    }
}

async fn next_event(rx: &mut broadcast::Receiver<PushEvent>) -> PushEvent {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for push event")
        .unwrap()
}

// ── Lifecycle ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_open_message_close_reopen() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (ping_tx, ping_rx) = oneshot::channel::<String>();

    tokio::spawn(async move {
        // First connection: read the probe, push one message, close.
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        if let Some(Ok(Message::Text(text))) = ws.next().await {
            let _ = ping_tx.send(text.as_str().to_owned());
        }
        let _ = ws.send(Message::Text("changed".into())).await;
        let _ = ws.close(None).await;

        // Second connection: stay open until the client goes away.
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        while let Some(Ok(_)) = ws.next().await {}
    });

    let url = Url::parse(&format!("ws://{addr}/")).unwrap();
    let cancel = CancellationToken::new();
    let (handle, mut rx) = PushHandle::spawn(url, fast_config(None), cancel.clone());

    assert_eq!(next_event(&mut rx).await, PushEvent::Opened);
    assert_eq!(next_event(&mut rx).await, PushEvent::Message("changed".into()));
    assert_eq!(next_event(&mut rx).await, PushEvent::Closed { reason: None });
    assert_eq!(next_event(&mut rx).await, PushEvent::Opened);

    let ping = tokio::time::timeout(Duration::from_secs(5), ping_rx)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ping, DEFAULT_PING);

    assert_eq!(*handle.connection_state().borrow(), ConnectionState::Open);
    handle.shutdown();
}

#[tokio::test]
async fn test_failed_connect_reports_closed_and_gives_up() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let url = Url::parse(&format!("ws://127.0.0.1:{port}/")).unwrap();
    let cancel = CancellationToken::new();
    let (handle, mut rx) = PushHandle::spawn(url, fast_config(Some(0)), cancel);

    match next_event(&mut rx).await {
        PushEvent::Closed { reason } => assert!(reason.is_some()),
        other => panic!("expected Closed, got: {other:?}"),
    }

    let mut state = handle.connection_state();
    tokio::time::timeout(
        Duration::from_secs(5),
        state.wait_for(|s| *s == ConnectionState::Closed),
    )
    .await
    .unwrap()
    .unwrap();
}

#[test]
fn test_push_url_convention() {
    let base = Url::parse("http://192.168.0.10:8080/").unwrap();
    assert_eq!(push_url_for(&base).unwrap().as_str(), "ws://192.168.0.10:8081/");
}

//! End-to-end tests against a local WebSocket server

use futures_util::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use ticker_feed::config::{Config, FeedConfig};
use ticker_feed::feed::{FeedClient, FeedState};
use ticker_feed::store::{ConnectionStatus, PriceDirection, TickerStore, MAX_ATTEMPTS_ERROR};
use ticker_feed::ws::WsTransport;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

const FIRST: &str = r#"[{"e":"24hrMiniTicker","E":1000,"s":"BTCUSDT","c":"50000","o":"49000","h":"51000","l":"48000","v":"1000"},{"e":"24hrMiniTicker","E":1000,"s":"BTCETH","c":"20","o":"19","h":"21","l":"18","v":"5"}]"#;
const SECOND: &str = r#"[{"e":"24hrMiniTicker","E":2000,"s":"BTCUSDT","c":"50500","o":"49000","h":"51000","l":"48000","v":"1000"}]"#;

#[test]
fn test_example_config_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, include_str!("../../config.toml.example")).unwrap();

    let config = Config::load(&path).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.feed.max_reconnect_attempts, 5);
    assert_eq!(config.feed.quote_suffix, "USDT");
}

#[tokio::test]
async fn test_live_socket_feeds_store() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        ws.send(Message::Text(FIRST.to_string())).await.unwrap();
        ws.send(Message::Text("garbage".to_string())).await.unwrap();
        ws.send(Message::Text(SECOND.to_string())).await.unwrap();
        while let Some(Ok(_)) = ws.next().await {}
    });

    let config = FeedConfig {
        url: format!("ws://{addr}"),
        ..FeedConfig::default()
    };
    let store = TickerStore::new();
    let mut revisions = store.subscribe();
    let (client, driver) = FeedClient::spawn(config, WsTransport::default(), store.clone());

    client.connect();

    tokio::time::timeout(Duration::from_secs(5), async {
        while store.coin("BTCUSDT").map(|c| c.last_update) != Some(2000) {
            revisions.changed().await.unwrap();
        }
    })
    .await
    .expect("ticker never arrived");

    let btc = store.coin("BTCUSDT").unwrap();
    assert_eq!(btc.current_price, 50500.0);
    assert_eq!(btc.previous_price, 50000.0);
    assert_eq!(btc.price_direction, PriceDirection::Up);
    assert!(store.coin("BTCETH").is_none());
    assert_eq!(store.connection_status(), ConnectionStatus::connected());

    client.shutdown();
    driver.await.unwrap();
    assert_eq!(store.connection_status(), ConnectionStatus::disconnected());
}

#[tokio::test]
async fn test_server_drops_until_attempts_exhausted() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepted = Arc::new(AtomicUsize::new(0));

    {
        let accepted = accepted.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                accepted.fetch_add(1, Ordering::SeqCst);
                drop(stream);
            }
        });
    }

    let config = FeedConfig {
        url: format!("ws://{addr}"),
        reconnect_interval_ms: 50,
        max_reconnect_attempts: 2,
        ..FeedConfig::default()
    };
    let store = TickerStore::new();
    let (client, _driver) = FeedClient::spawn(config, WsTransport::default(), store.clone());
    let mut state = client.watch_state();

    client.connect();

    tokio::time::timeout(Duration::from_secs(5), state.wait_for(|s| *s == FeedState::Failed))
        .await
        .expect("feed never gave up")
        .unwrap();

    assert_eq!(accepted.load(Ordering::SeqCst), 3);
    assert_eq!(
        store.connection_status(),
        ConnectionStatus::failed(MAX_ATTEMPTS_ERROR)
    );
}

#[tokio::test]
async fn test_completed_handshake_restores_retry_budget() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepted = Arc::new(AtomicUsize::new(0));

    {
        let accepted = accepted.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                accepted.fetch_add(1, Ordering::SeqCst);
                if let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await {
                    let _ = ws.close(None).await;
                }
            }
        });
    }

    let config = FeedConfig {
        url: format!("ws://{addr}"),
        reconnect_interval_ms: 20,
        max_reconnect_attempts: 1,
        ..FeedConfig::default()
    };
    let store = TickerStore::new();
    let (client, driver) = FeedClient::spawn(config, WsTransport::default(), store.clone());

    client.connect();

    tokio::time::timeout(Duration::from_secs(5), async {
        while accepted.load(Ordering::SeqCst) < 4 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("feed stopped reconnecting");

    assert_ne!(client.state(), FeedState::Failed);

    client.shutdown();
    driver.await.unwrap();
}

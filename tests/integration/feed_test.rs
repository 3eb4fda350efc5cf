//! Integration tests for the feed client with a scripted transport

use std::time::Duration;
use ticker_feed::config::FeedConfig;
use ticker_feed::feed::{FeedClient, FeedEvent, FeedState};
use ticker_feed::store::{ConnectionStatus, TickerStore};
use ticker_feed::ws::{ConnectionHandle, Transport, WsEvent};
use tokio::sync::{mpsc, oneshot};

const MIXED: &str = r#"[
    {"e":"24hrMiniTicker","E":1000,"s":"BTCUSDT","c":"50000","o":"49000","h":"51000","l":"48000","v":"1000"},
    {"e":"24hrMiniTicker","E":1000,"s":"ETHBTC","c":"0.055","o":"0.054","h":"0.056","l":"0.053","v":"900"},
    {"e":"24hrMiniTicker","E":1000,"s":"BTCETH","c":"20","o":"19","h":"21","l":"18","v":"5"}
]"#;

/// Opens successfully and plays the given frames
struct FrameTransport {
    frames: Vec<&'static str>,
}

impl Transport for FrameTransport {
    fn open(&self, _url: &str, events: mpsc::Sender<WsEvent>) -> ConnectionHandle {
        let frames = self.frames.clone();
        let (close_tx, close_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let _ = events.send(WsEvent::Opened).await;
            for frame in frames {
                let _ = events.send(WsEvent::Frame(frame.to_string())).await;
            }
            let _ = close_rx.await;
        });
        ConnectionHandle::new(close_tx, task)
    }
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

#[tokio::test(start_paused = true)]
async fn test_channel_sink_receives_only_usdt_pairs() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let transport = FrameTransport {
        frames: vec![MIXED],
    };
    let (client, _driver) = FeedClient::spawn(FeedConfig::default(), transport, tx);

    client.connect();
    settle().await;

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }

    assert_eq!(events[0], FeedEvent::Status(ConnectionStatus::connecting()));
    assert_eq!(events[1], FeedEvent::Status(ConnectionStatus::connected()));

    let symbols: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            FeedEvent::Coin(coin) => Some(coin.symbol.as_str()),
            FeedEvent::Status(_) => None,
        })
        .collect();
    assert_eq!(symbols, vec!["BTCUSDT"]);
}

#[tokio::test(start_paused = true)]
async fn test_custom_quote_suffix() {
    let store = TickerStore::new();
    let config = FeedConfig {
        quote_suffix: "BTC".to_string(),
        ..FeedConfig::default()
    };
    let transport = FrameTransport {
        frames: vec![MIXED],
    };
    let (client, _driver) = FeedClient::spawn(config, transport, store.clone());

    client.connect();
    settle().await;

    assert!(store.coin("ETHBTC").is_some());
    assert!(store.coin("BTCUSDT").is_none());
    assert!(store.coin("BTCETH").is_none());
}

#[tokio::test(start_paused = true)]
async fn test_malformed_frames_keep_connection_open() {
    let store = TickerStore::new();
    let transport = FrameTransport {
        frames: vec!["", "[", r#"{"unexpected":true}"#, MIXED],
    };
    let (client, _driver) = FeedClient::spawn(FeedConfig::default(), transport, store.clone());

    client.connect();
    settle().await;

    assert_eq!(client.state(), FeedState::Open);
    assert!(store.connection_status().is_connected);
    assert!(store.coin("BTCUSDT").is_some());
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_then_connect_again() {
    let store = TickerStore::new();
    let transport = FrameTransport {
        frames: vec![MIXED],
    };
    let (client, _driver) = FeedClient::spawn(FeedConfig::default(), transport, store.clone());

    client.connect();
    settle().await;
    client.disconnect();
    settle().await;
    assert_eq!(client.state(), FeedState::ClosedManual);
    assert_eq!(store.connection_status(), ConnectionStatus::disconnected());
    // Symbols survive a disconnect
    assert!(store.coin("BTCUSDT").is_some());

    client.connect();
    settle().await;
    assert_eq!(client.state(), FeedState::Open);
}

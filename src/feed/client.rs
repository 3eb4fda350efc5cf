//! Feed client: connection lifecycle and reconnection policy
//!
//! All connection state lives in one driver task. Control calls on
//! [`FeedClient`] are queued as commands; transport events and the single
//! timer are handled in the same loop, one at a time.

use super::types::decode_frame;
use super::TickerSink;
use crate::config::FeedConfig;
use crate::store::{transform_ticker, ConnectionStatus, MAX_ATTEMPTS_ERROR};
use crate::telemetry::{self, CounterMetric};
use crate::ws::{ConnectionHandle, Transport, WsError, WsEvent};
use std::future::pending;
use std::pin::Pin;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Sleep};

/// Buffer size of the per-connection event channel
const EVENT_BUFFER: usize = 1024;

/// Lifecycle state of the feed connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedState {
    /// Not connected, nothing scheduled (or a manual reconnect is settling)
    Idle,
    /// Handshake in flight
    Connecting,
    /// Connection established, frames are applied
    Open,
    /// Closed by `disconnect()`; no automatic reconnect
    ClosedManual,
    /// Lost the connection; a reconnect is scheduled
    Retrying { attempt: u32 },
    /// Reconnect attempts exhausted; waits for `reconnect()`
    Failed,
}

#[derive(Debug)]
enum FeedCommand {
    Connect,
    Disconnect,
    Reconnect,
    Shutdown,
}

/// Control handle for a running feed.
///
/// Methods return immediately; effects are observed through the sink and
/// [`FeedClient::state`]. Dropping every handle shuts the feed down.
#[derive(Debug, Clone)]
pub struct FeedClient {
    commands: mpsc::UnboundedSender<FeedCommand>,
    state: watch::Receiver<FeedState>,
}

impl FeedClient {
    /// Start the feed driver on the current tokio runtime.
    ///
    /// The driver starts `Idle`; call [`connect`](Self::connect) to open the
    /// stream.
    pub fn spawn<T, S>(config: FeedConfig, transport: T, sink: S) -> (Self, JoinHandle<()>)
    where
        T: Transport,
        S: TickerSink,
    {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (state_tx, state) = watch::channel(FeedState::Idle);

        let driver = FeedDriver {
            config,
            transport,
            sink,
            state: FeedState::Idle,
            state_tx,
            retry_attempts: 0,
            connection: None,
            timer: None,
        };
        let handle = tokio::spawn(driver.run(command_rx));

        (Self { commands, state }, handle)
    }

    /// Open the stream unless one is already open or opening
    pub fn connect(&self) {
        self.send(FeedCommand::Connect);
    }

    /// Close the stream and cancel any scheduled reconnect
    pub fn disconnect(&self) {
        self.send(FeedCommand::Disconnect);
    }

    /// Disconnect, reset the retry budget and connect again after the
    /// settle delay
    pub fn reconnect(&self) {
        self.send(FeedCommand::Reconnect);
    }

    /// Disconnect and stop the driver task
    pub fn shutdown(&self) {
        self.send(FeedCommand::Shutdown);
    }

    /// Current lifecycle state
    pub fn state(&self) -> FeedState {
        *self.state.borrow()
    }

    /// Watch lifecycle state changes
    pub fn watch_state(&self) -> watch::Receiver<FeedState> {
        self.state.clone()
    }

    fn send(&self, command: FeedCommand) {
        if self.commands.send(command).is_err() {
            tracing::debug!("Feed driver already stopped");
        }
    }
}

struct LiveConnection {
    handle: ConnectionHandle,
    events: mpsc::Receiver<WsEvent>,
}

struct FeedDriver<T, S> {
    config: FeedConfig,
    transport: T,
    sink: S,
    state: FeedState,
    state_tx: watch::Sender<FeedState>,
    retry_attempts: u32,
    connection: Option<LiveConnection>,
    timer: Option<Pin<Box<Sleep>>>,
}

/// Next event of the live connection; never resolves without one
async fn next_event(connection: &mut Option<LiveConnection>) -> WsEvent {
    match connection {
        // A transport that goes away without saying so has closed
        Some(conn) => conn.events.recv().await.unwrap_or(WsEvent::Closed),
        None => pending().await,
    }
}

/// Resolves when the pending timer fires; never resolves without one
async fn timer_fired(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(delay) => delay.as_mut().await,
        None => pending().await,
    }
}

impl<T: Transport, S: TickerSink> FeedDriver<T, S> {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<FeedCommand>) {
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(FeedCommand::Connect) => self.connect(),
                    Some(FeedCommand::Disconnect) => self.disconnect(),
                    Some(FeedCommand::Reconnect) => self.reconnect(),
                    Some(FeedCommand::Shutdown) | None => {
                        self.disconnect();
                        break;
                    }
                },
                event = next_event(&mut self.connection) => self.handle_event(event),
                () = timer_fired(&mut self.timer) => {
                    self.timer = None;
                    self.connect();
                }
            }
        }

        tracing::info!("Feed client stopped");
    }

    fn set_state(&mut self, state: FeedState) {
        self.state = state;
        self.state_tx.send_replace(state);
    }

    /// Replace any pending timer with one firing after `delay`
    fn schedule_connect(&mut self, delay: Duration) {
        self.timer = Some(Box::pin(sleep(delay)));
    }

    fn cancel_timer(&mut self) {
        self.timer = None;
    }

    fn connect(&mut self) {
        if matches!(self.state, FeedState::Connecting | FeedState::Open) {
            tracing::debug!(state = ?self.state, "Connection already active, ignoring connect");
            return;
        }

        self.cancel_timer();
        tracing::info!(
            url = %self.config.url,
            retry_attempts = self.retry_attempts,
            "Connecting to ticker feed"
        );
        self.set_state(FeedState::Connecting);
        self.sink.set_connection_status(ConnectionStatus::connecting());

        let (tx, events) = mpsc::channel(EVENT_BUFFER);
        let handle = self.transport.open(&self.config.url, tx);
        self.connection = Some(LiveConnection { handle, events });
    }

    fn disconnect(&mut self) {
        self.cancel_timer();
        if let Some(conn) = self.connection.take() {
            conn.handle.close();
        }

        tracing::info!("Ticker feed disconnected");
        self.set_state(FeedState::ClosedManual);
        self.sink.set_connection_status(ConnectionStatus::disconnected());
    }

    fn reconnect(&mut self) {
        self.disconnect();
        self.retry_attempts = 0;
        self.set_state(FeedState::Idle);
        self.schedule_connect(self.config.reconnect_settle());
        tracing::info!(
            delay_ms = self.config.reconnect_settle_ms,
            "Manual reconnect scheduled"
        );
    }

    fn handle_event(&mut self, event: WsEvent) {
        match event {
            WsEvent::Opened => self.on_open(),
            WsEvent::Frame(text) => self.on_frame(&text),
            WsEvent::Error(error) => self.on_error(error),
            WsEvent::Closed => self.on_close(),
        }
    }

    fn on_open(&mut self) {
        if self.state != FeedState::Connecting {
            return;
        }

        tracing::info!("Ticker feed connected");
        self.retry_attempts = 0;
        self.set_state(FeedState::Open);
        self.sink.set_connection_status(ConnectionStatus::connected());
    }

    fn on_frame(&self, text: &str) {
        if self.state != FeedState::Open {
            return;
        }
        telemetry::increment(CounterMetric::FramesReceived, 1);

        let tickers = match decode_frame(text) {
            Ok(tickers) => tickers,
            Err(e) => {
                tracing::warn!(error = %e, "Dropping malformed ticker frame");
                telemetry::increment(CounterMetric::DecodeFailures, 1);
                return;
            }
        };

        let mut applied = 0;
        for ticker in tickers
            .iter()
            .filter(|t| t.is_quoted_in(&self.config.quote_suffix))
        {
            match transform_ticker(ticker) {
                Ok(coin) => {
                    self.sink.update_coin(coin);
                    applied += 1;
                }
                Err(e) => {
                    tracing::debug!(symbol = %ticker.symbol, error = %e, "Skipping ticker");
                }
            }
        }
        telemetry::increment(CounterMetric::TickersApplied, applied);
    }

    fn on_error(&mut self, error: WsError) {
        tracing::warn!(error = %error, "Ticker feed connection error");
        self.sink
            .set_connection_status(ConnectionStatus::failed(format!("connection error: {error}")));
    }

    fn on_close(&mut self) {
        self.connection = None;
        self.sink.set_connection_status(ConnectionStatus::disconnected());

        let max_attempts = self.config.max_reconnect_attempts;
        if self.retry_attempts < max_attempts {
            self.retry_attempts += 1;
            tracing::warn!(
                attempt = self.retry_attempts,
                max_attempts,
                delay_ms = self.config.reconnect_interval_ms,
                "Ticker feed closed, scheduling reconnect"
            );
            telemetry::increment(CounterMetric::ReconnectAttempts, 1);
            self.schedule_connect(self.config.reconnect_interval());
            self.set_state(FeedState::Retrying {
                attempt: self.retry_attempts,
            });
        } else {
            tracing::error!(max_attempts, "Ticker feed reconnect attempts exhausted");
            self.set_state(FeedState::Failed);
            self.sink
                .set_connection_status(ConnectionStatus::failed(MAX_ATTEMPTS_ERROR));
        }
    }
}

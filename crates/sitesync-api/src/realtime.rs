//! Realtime change channel with auto-reconnect.
//!
//! Connects to the store's realtime websocket, joins one logical channel
//! subscribed to insert/update/delete notifications for a fixed list of
//! tables, and streams parsed [`ChangeEvent`]s through a
//! [`tokio::sync::broadcast`] channel. Handles reconnection with
//! exponential backoff + jitter automatically; consumers see nothing but
//! a quiet stream while the transport recovers.
//!
//! The events carry no row payloads -- only "something changed in this
//! table". Anything finer-grained is the consumer's problem.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::broadcast;
use tokio_tungstenite::tungstenite::{self, ClientRequestBuilder};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::Error;

// ── Channel constants ────────────────────────────────────────────────

const EVENT_CHANNEL_CAPACITY: usize = 1024;
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

// ── ChangeEvent ──────────────────────────────────────────────────────

/// Which kind of row change a notification reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    Insert,
    Update,
    Delete,
}

impl ChangeAction {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "INSERT" => Some(Self::Insert),
            "UPDATE" => Some(Self::Update),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }
}

/// A change notification for one watched table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub table: String,
    pub action: ChangeAction,
}

// ── ReconnectConfig ──────────────────────────────────────────────────

/// Exponential backoff configuration for channel reconnection.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt. Default: 1s.
    pub initial_delay: Duration,

    /// Upper bound on backoff delay. Default: 30s.
    pub max_delay: Duration,

    /// Maximum reconnection attempts before giving up.
    /// `None` means retry forever.
    pub max_retries: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_retries: None,
        }
    }
}

// ── ChannelHandle ────────────────────────────────────────────────────

/// Handle to a running realtime channel.
///
/// Cheaply cloneable receivers via [`subscribe`](Self::subscribe). Call
/// [`shutdown`](Self::shutdown) to tear down the background task.
pub struct ChannelHandle {
    event_rx: broadcast::Receiver<ChangeEvent>,
    cancel: CancellationToken,
}

impl ChannelHandle {
    /// Connect to the realtime endpoint and spawn the reconnection loop.
    ///
    /// `tables` is the full set of watched tables -- one channel topic
    /// carries all of them. Returns immediately once the background task
    /// is spawned; the first connection attempt happens asynchronously.
    pub fn connect(
        ws_url: Url,
        tables: Vec<String>,
        reconnect: ReconnectConfig,
        cancel: CancellationToken,
    ) -> Self {
        let (event_tx, event_rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            channel_loop(ws_url, tables, event_tx, reconnect, task_cancel).await;
        });

        Self { event_rx, cancel }
    }

    /// Get a new broadcast receiver for the change stream.
    ///
    /// Multiple consumers can subscribe concurrently. If a consumer falls
    /// behind, it receives [`broadcast::error::RecvError::Lagged`].
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.event_rx.resubscribe()
    }

    /// Signal the background task to shut down gracefully.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

// ── Background reconnection loop ─────────────────────────────────────

/// Main loop: connect → join → read → on error, backoff → reconnect.
async fn channel_loop(
    ws_url: Url,
    tables: Vec<String>,
    event_tx: broadcast::Sender<ChangeEvent>,
    reconnect: ReconnectConfig,
    cancel: CancellationToken,
) {
    let mut attempt: u32 = 0;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = connect_and_read(&ws_url, &tables, &event_tx, &cancel) => {
                match result {
                    // Clean disconnect (server close frame or stream ended).
                    // Reset attempt counter and reconnect immediately.
                    Ok(()) => {
                        tracing::info!("realtime channel disconnected cleanly, reconnecting");
                        attempt = 0;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, attempt, "realtime channel error");

                        if let Some(max) = reconnect.max_retries {
                            if attempt >= max {
                                tracing::error!(
                                    max_retries = max,
                                    "realtime reconnection limit reached, giving up"
                                );
                                break;
                            }
                        }

                        let delay = calculate_backoff(attempt, &reconnect);
                        tracing::info!(
                            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                            attempt,
                            "waiting before reconnect"
                        );

                        tokio::select! {
                            biased;
                            () = cancel.cancelled() => break,
                            () = tokio::time::sleep(delay) => {}
                        }

                        attempt += 1;
                    }
                }
            }
        }
    }

    tracing::debug!("realtime channel loop exiting");
}

/// Exponential backoff with 10% jitter, capped at `max_delay`.
fn calculate_backoff(attempt: u32, cfg: &ReconnectConfig) -> Duration {
    let exp = cfg
        .initial_delay
        .saturating_mul(2u32.saturating_pow(attempt.min(16)));
    let capped = exp.min(cfg.max_delay);
    capped + capped.mul_f64(rand::random::<f64>() * 0.1)
}

// ── Single connection lifecycle ──────────────────────────────────────

/// Establish one websocket connection, join the channel topic, then read
/// frames until the connection drops. Heartbeats keep the channel alive.
async fn connect_and_read(
    url: &Url,
    tables: &[String],
    event_tx: &broadcast::Sender<ChangeEvent>,
    cancel: &CancellationToken,
) -> Result<(), Error> {
    tracing::info!(url = %url, "connecting to realtime channel");

    let uri: tungstenite::http::Uri = url
        .as_str()
        .parse()
        .map_err(|e: tungstenite::http::uri::InvalidUri| Error::RealtimeConnect(e.to_string()))?;

    let request = ClientRequestBuilder::new(uri);
    let (ws_stream, _response) = tokio_tungstenite::connect_async(request)
        .await
        .map_err(|e| Error::RealtimeConnect(e.to_string()))?;

    tracing::info!("realtime channel connected");

    let (mut write, mut read) = ws_stream.split();
    let mut msg_ref: u64 = 1;

    // Join one logical topic subscribed to every watched table.
    let subscriptions: Vec<_> = tables
        .iter()
        .map(|t| json!({ "event": "*", "schema": "public", "table": t }))
        .collect();
    let join = json!({
        "topic": "realtime:site",
        "event": "phx_join",
        "payload": { "config": { "postgres_changes": subscriptions } },
        "ref": msg_ref.to_string(),
    });
    write
        .send(tungstenite::Message::text(join.to_string()))
        .await
        .map_err(|e| Error::RealtimeConnect(e.to_string()))?;

    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    heartbeat.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    heartbeat.tick().await; // first tick fires immediately -- consume it

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => return Ok(()),
            _ = heartbeat.tick() => {
                msg_ref += 1;
                let beat = json!({
                    "topic": "phoenix",
                    "event": "heartbeat",
                    "payload": {},
                    "ref": msg_ref.to_string(),
                });
                write
                    .send(tungstenite::Message::text(beat.to_string()))
                    .await
                    .map_err(|e| Error::RealtimeConnect(e.to_string()))?;
            }
            frame = read.next() => {
                match frame {
                    Some(Ok(tungstenite::Message::Text(text))) => {
                        parse_and_broadcast(&text, event_tx);
                    }
                    Some(Ok(tungstenite::Message::Ping(_))) => {
                        // tungstenite handles pong replies automatically
                        tracing::trace!("realtime ping");
                    }
                    Some(Ok(tungstenite::Message::Close(frame))) => {
                        if let Some(ref cf) = frame {
                            tracing::info!(
                                code = %cf.code,
                                reason = %cf.reason,
                                "realtime close frame received"
                            );
                        } else {
                            tracing::info!("realtime close frame received (no payload)");
                        }
                        return Ok(());
                    }
                    Some(Err(e)) => {
                        return Err(Error::RealtimeConnect(e.to_string()));
                    }
                    None => {
                        // Stream ended without a close frame
                        tracing::info!("realtime stream ended");
                        return Ok(());
                    }
                    _ => {
                        // Binary, Pong, Frame -- ignore
                    }
                }
            }
        }
    }
}

// ── Message parsing ──────────────────────────────────────────────────

/// Raw frame envelope: `{ topic, event, payload, ref }`.
#[derive(Debug, Deserialize)]
struct WireMessage {
    event: String,
    #[serde(default)]
    payload: serde_json::Value,
}

/// Parse a text frame and broadcast any change notification found inside.
///
/// Everything that isn't a `postgres_changes` frame (join replies,
/// heartbeat acks, system messages) is logged at trace level and dropped.
fn parse_and_broadcast(text: &str, event_tx: &broadcast::Sender<ChangeEvent>) {
    let msg: WireMessage = match serde_json::from_str(text) {
        Ok(m) => m,
        Err(e) => {
            tracing::debug!(error = %e, "failed to parse realtime frame");
            return;
        }
    };

    if msg.event != "postgres_changes" {
        tracing::trace!(event = %msg.event, "realtime control frame");
        return;
    }

    let data = &msg.payload["data"];
    let Some(table) = data["table"].as_str() else {
        tracing::debug!("change frame without table, dropping");
        return;
    };
    let Some(action) = data["type"].as_str().and_then(ChangeAction::parse) else {
        tracing::debug!(table, "change frame with unknown action, dropping");
        return;
    };

    // Zero receivers is fine -- the send just reports it.
    let _ = event_tx.send(ChangeEvent {
        table: table.to_owned(),
        action,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(rx: &mut broadcast::Receiver<ChangeEvent>) -> Vec<ChangeEvent> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev);
        }
        out
    }

    #[test]
    fn parses_change_frames() {
        let (tx, mut rx) = broadcast::channel(8);
        let frame = r#"{
            "topic": "realtime:site",
            "event": "postgres_changes",
            "payload": { "data": { "type": "INSERT", "table": "programs" } },
            "ref": null
        }"#;

        parse_and_broadcast(frame, &tx);

        let events = drain(&mut rx);
        assert_eq!(
            events,
            vec![ChangeEvent {
                table: "programs".into(),
                action: ChangeAction::Insert,
            }]
        );
    }

    #[test]
    fn drops_control_frames() {
        let (tx, mut rx) = broadcast::channel(8);
        let frame = r#"{
            "topic": "realtime:site",
            "event": "phx_reply",
            "payload": { "status": "ok" },
            "ref": "1"
        }"#;

        parse_and_broadcast(frame, &tx);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn drops_unknown_actions() {
        let (tx, mut rx) = broadcast::channel(8);
        let frame = r#"{
            "topic": "realtime:site",
            "event": "postgres_changes",
            "payload": { "data": { "type": "TRUNCATE", "table": "faqs" } },
            "ref": null
        }"#;

        parse_and_broadcast(frame, &tx);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn backoff_is_capped() {
        let cfg = ReconnectConfig {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_retries: None,
        };
        // Even at absurd attempt counts the delay stays near the cap.
        let d = calculate_backoff(40, &cfg);
        assert!(d <= Duration::from_secs(33));
    }
}

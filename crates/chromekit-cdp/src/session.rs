//! The CDP Session Multiplexer.
//!
//! Wraps one WebSocket transport to one Chrome target with:
//! - a pending-request table keyed by monotonic integer id, completed exactly
//!   once each (reply, protocol error, timeout, or transport-close
//!   cancellation);
//! - a fan-out event dispatcher keyed by CDP method name, so `on(method)`
//!   returns a stream private to that method rather than every event on the
//!   connection.
//!
//! Two background tasks do the actual I/O (`write_loop`, `read_loop`); all
//! public methods only touch the shared pending/subscriber tables and the
//! mpsc channel that feeds `write_loop`. No lock is held across a network
//! wait.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc, oneshot, Mutex};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, trace, warn};

use crate::error::CdpError;
use crate::transport::{CdpEvent, CdpMessage, CdpRequest};

/// Default per-request reply timeout (spec.md §4.1: "default 10 s").
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Bounded buffer size for one event subscriber's queue. Per spec.md §4.1,
/// overflow policy is "drop oldest with a warning": `tokio::sync::broadcast`
/// already overwrites the oldest entry when a slow receiver lags, so this
/// bound only controls how much slack a subscriber gets before that happens.
const EVENT_CHANNEL_SIZE: usize = 256;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct PendingTable {
    next_id: AtomicU64,
    entries: Mutex<HashMap<u64, oneshot::Sender<Result<Value, CdpError>>>>,
}

/// A live event subscription for one CDP method name.
pub struct SessionEvent {
    method: String,
    rx: broadcast::Receiver<CdpEvent>,
}

impl SessionEvent {
    /// Await the next event for this method, logging (not failing) on the
    /// drop-oldest overflow policy described in spec.md §4.1.
    pub async fn recv(&mut self) -> Option<CdpEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(method = %self.method, skipped, "event subscriber lagged, dropped oldest events");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// One multiplexed session over a CDP WebSocket connection to a single
/// target.
pub struct Session {
    tx: mpsc::Sender<CdpRequest>,
    pending: Arc<PendingTable>,
    subscribers: Arc<Mutex<HashMap<String, broadcast::Sender<CdpEvent>>>>,
    default_timeout: Duration,
    _write_handle: tokio::task::JoinHandle<()>,
    _read_handle: tokio::task::JoinHandle<()>,
}

impl Session {
    /// Connect to a target's WebSocket debugger URL and start the session.
    ///
    /// # Errors
    ///
    /// Returns [`CdpError::ConnectionFailed`] if the WebSocket handshake
    /// fails.
    pub async fn connect(ws_url: &str) -> Result<Self, CdpError> {
        let (ws_stream, _) = tokio_tungstenite::connect_async(ws_url)
            .await
            .map_err(|e| CdpError::ConnectionFailed(ws_url.to_string(), e.to_string()))?;

        Ok(Self::from_stream(ws_stream))
    }

    fn from_stream(ws_stream: WsStream) -> Self {
        let (ws_sink, ws_source) = ws_stream.split();
        let (tx, rx) = mpsc::channel::<CdpRequest>(64);

        let pending = Arc::new(PendingTable {
            next_id: AtomicU64::new(1),
            entries: Mutex::new(HashMap::new()),
        });
        let subscribers: Arc<Mutex<HashMap<String, broadcast::Sender<CdpEvent>>>> =
            Arc::new(Mutex::new(HashMap::new()));

        let write_handle = tokio::spawn(write_loop(ws_sink, rx));
        let read_handle = tokio::spawn(read_loop(
            ws_source,
            Arc::clone(&pending),
            Arc::clone(&subscribers),
        ));

        Self {
            tx,
            pending,
            subscribers,
            default_timeout: DEFAULT_TIMEOUT,
            _write_handle: write_handle,
            _read_handle: read_handle,
        }
    }

    /// Send a CDP command and await its reply, deserialized as `R`.
    ///
    /// # Errors
    ///
    /// Returns [`CdpError::Timeout`] if no reply arrives within the default
    /// timeout, [`CdpError::ConnectionLost`] if the transport closes first,
    /// or [`CdpError::Protocol`]/[`CdpError::ContextDestroyed`] if Chrome
    /// replied with an error.
    pub async fn send<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: Option<P>,
    ) -> Result<R, CdpError> {
        self.send_with_timeout(method, params, self.default_timeout)
            .await
    }

    /// Like [`Session::send`] but with an explicit per-call timeout.
    ///
    /// # Errors
    ///
    /// See [`Session::send`].
    pub async fn send_with_timeout<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: Option<P>,
        timeout: Duration,
    ) -> Result<R, CdpError> {
        let params = params
            .map(|p| serde_json::to_value(p))
            .transpose()?;

        let id = self.pending.next_id.fetch_add(1, Ordering::Relaxed);
        let (reply_tx, reply_rx) = oneshot::channel();

        // Register before sending: the read loop must never be able to see a
        // reply for an id that has no pending entry yet.
        self.pending.entries.lock().await.insert(id, reply_tx);

        let request = CdpRequest {
            id,
            method: method.to_string(),
            params,
            session_id: None,
        };

        trace!(id, method, "sending CDP command");
        if self.tx.send(request).await.is_err() {
            self.pending.entries.lock().await.remove(&id);
            return Err(CdpError::ConnectionLost);
        }

        let result = tokio::time::timeout(timeout, reply_rx).await;
        match result {
            Ok(Ok(Ok(value))) => serde_json::from_value(value).map_err(CdpError::from),
            Ok(Ok(Err(cdp_err))) => Err(cdp_err),
            Ok(Err(_)) => Err(CdpError::ConnectionLost),
            Err(_) => {
                self.pending.entries.lock().await.remove(&id);
                Err(CdpError::Timeout(timeout))
            }
        }
    }

    /// Subscribe to unsolicited CDP events for one method name.
    ///
    /// Each call returns an independent cooperative queue; a slow subscriber
    /// lags and drops its oldest undelivered events rather than blocking the
    /// dispatcher or other subscribers (spec.md §4.1 suspension points).
    pub async fn on(&self, method: impl Into<String>) -> SessionEvent {
        let method = method.into();
        let mut subscribers = self.subscribers.lock().await;
        let sender = subscribers
            .entry(method.clone())
            .or_insert_with(|| broadcast::channel(EVENT_CHANNEL_SIZE).0);
        SessionEvent {
            method,
            rx: sender.subscribe(),
        }
    }
}

async fn write_loop(
    mut sink: futures_util::stream::SplitSink<WsStream, Message>,
    mut rx: mpsc::Receiver<CdpRequest>,
) {
    while let Some(request) = rx.recv().await {
        let payload = match serde_json::to_string(&request) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "failed to serialize CDP request");
                continue;
            }
        };
        trace!(payload = %payload, "writing frame");
        if let Err(e) = sink.send(Message::Text(payload.into())).await {
            warn!(error = %e, "CDP transport write failed, stopping write loop");
            return;
        }
    }
    debug!("write loop exiting: request channel closed");
}

async fn read_loop(
    mut source: futures_util::stream::SplitStream<WsStream>,
    pending: Arc<PendingTable>,
    subscribers: Arc<Mutex<HashMap<String, broadcast::Sender<CdpEvent>>>>,
) {
    while let Some(frame) = source.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "CDP transport read failed, stopping read loop");
                break;
            }
        };

        let Message::Text(text) = frame else {
            continue;
        };

        let message: CdpMessage = match serde_json::from_str(&text) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "failed to parse CDP frame");
                continue;
            }
        };

        match message {
            CdpMessage::Response(response) => {
                let sender = pending.entries.lock().await.remove(&response.id);
                let Some(sender) = sender else {
                    trace!(id = response.id, "reply for unknown or already-completed id, discarding");
                    continue;
                };
                let result = if let Some(error) = response.error {
                    Err(CdpError::classify_protocol(error.code, error.message))
                } else {
                    Ok(response.result.unwrap_or(Value::Null))
                };
                let _ = sender.send(result);
            }
            CdpMessage::Event(event) => {
                let subscribers = subscribers.lock().await;
                if let Some(sender) = subscribers.get(&event.method) {
                    // No receivers is not an error: nobody is listening yet.
                    let _ = sender.send(event);
                }
            }
        }
    }

    debug!("read loop exiting: transport closed");
    cancel_all_pending(&pending).await;
}

async fn cancel_all_pending(pending: &PendingTable) {
    let mut entries = pending.entries.lock().await;
    for (_, sender) in entries.drain() {
        let _ = sender.send(Err(CdpError::ConnectionLost));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeout_matches_spec() {
        assert_eq!(DEFAULT_TIMEOUT, Duration::from_secs(10));
    }
}

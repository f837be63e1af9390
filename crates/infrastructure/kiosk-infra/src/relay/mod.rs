//! Broadcast relay: every `POST /api/publish` is fanned out to all open
//! `GET /api/subscribe` streams of the same channel.
//!
//! Tokens are forwarded verbatim; deciding which ones mean something is left
//! to the displays. A channel exists only while it has subscribers.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use kiosk_config::{
    DEFAULT_CHANNEL, HEALTH_PATH, KEEPALIVE_INTERVAL, PUBLISH_PATH, SUBSCRIBE_PATH,
};
use kiosk_core::ActionMessage;
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::channel::MemoryChannel;

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("failed to bind relay on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("relay server error: {0}")]
    Serve(#[source] std::io::Error),
}

pub struct Relay {
    channels: Mutex<HashMap<String, MemoryChannel>>,
    capacity: usize,
    keepalive: Duration,
    shutdown: CancellationToken,
}

impl Default for Relay {
    fn default() -> Self {
        Self::new()
    }
}

impl Relay {
    pub fn new() -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
            capacity: kiosk_config::RELAY_CHANNEL_CAPACITY,
            keepalive: KEEPALIVE_INTERVAL,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_keepalive(mut self, keepalive: Duration) -> Self {
        self.keepalive = keepalive;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Tie the relay's lifetime to an external token.
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Cancelling this token stops the server and ends every open stream.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Channels that currently have at least one subscriber.
    pub fn channel_count(&self) -> usize {
        self.lock().len()
    }

    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.lock()
            .get(channel)
            .map_or(0, MemoryChannel::subscriber_count)
    }

    /// Broadcast `action` on `channel`. Returns how many subscribers it reached.
    /// Nothing is created for a channel nobody listens on.
    pub fn publish(&self, channel: &str, action: String) -> usize {
        match self.lock().get(channel) {
            Some(fanout) => {
                fanout.publish_raw(action);
                fanout.subscriber_count()
            }
            None => 0,
        }
    }

    /// Register a subscriber, creating the channel on first use. The channel
    /// is removed again when its last subscriber is dropped.
    pub fn subscribe(self: &Arc<Self>, channel: &str) -> RelaySubscriber {
        let receiver = self
            .lock()
            .entry(channel.to_string())
            .or_insert_with(|| MemoryChannel::new(self.capacity))
            .receiver();

        RelaySubscriber {
            relay: self.clone(),
            channel: channel.to_string(),
            receiver: Some(receiver),
        }
    }

    fn release(&self, channel: &str) {
        let mut channels = self.lock();
        if channels
            .get(channel)
            .is_some_and(|fanout| fanout.subscriber_count() == 0)
        {
            channels.remove(channel);
            debug!(%channel, "dropped idle channel");
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, MemoryChannel>> {
        self.channels.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn router(self: Arc<Self>) -> Router {
        Router::new()
            .route(&format!("/{PUBLISH_PATH}"), post(publish))
            .route(&format!("/{SUBSCRIBE_PATH}"), get(subscribe))
            .route(&format!("/{HEALTH_PATH}"), get(|| async { "ok" }))
            .with_state(self)
    }

    pub async fn bind(addr: &str) -> Result<TcpListener, RelayError> {
        TcpListener::bind(addr).await.map_err(|source| RelayError::Bind {
            addr: addr.to_string(),
            source,
        })
    }

    pub async fn serve(self: Arc<Self>, listener: TcpListener) -> Result<(), RelayError> {
        if let Ok(addr) = listener.local_addr() {
            info!(%addr, "relay listening");
        }
        let shutdown = self.shutdown.clone();
        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await
            .map_err(RelayError::Serve)
    }
}

/// One open subscription on a relay channel.
pub struct RelaySubscriber {
    relay: Arc<Relay>,
    channel: String,
    receiver: Option<broadcast::Receiver<String>>,
}

impl RelaySubscriber {
    pub async fn recv(&mut self) -> Result<String, RecvError> {
        match self.receiver.as_mut() {
            Some(receiver) => receiver.recv().await,
            None => Err(RecvError::Closed),
        }
    }
}

impl Drop for RelaySubscriber {
    fn drop(&mut self) {
        // The receiver must be gone before the channel's count is checked.
        self.receiver.take();
        self.relay.release(&self.channel);
    }
}

#[derive(Debug, Deserialize)]
struct PublishBody {
    action: Option<String>,
    channel: Option<String>,
}

async fn publish(
    State(relay): State<Arc<Relay>>,
    Json(body): Json<PublishBody>,
) -> impl IntoResponse {
    let action = body.action.unwrap_or_default();
    if action.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Action is required" })),
        );
    }

    let channel = body.channel.unwrap_or_else(|| DEFAULT_CHANNEL.to_string());
    let reached = relay.publish(&channel, action.clone());
    info!(%channel, %action, reached, "broadcasting action");

    (StatusCode::OK, Json(json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
struct SubscribeParams {
    channel: Option<String>,
}

async fn subscribe(
    State(relay): State<Arc<Relay>>,
    Query(params): Query<SubscribeParams>,
) -> impl IntoResponse {
    let channel = params.channel.unwrap_or_else(|| DEFAULT_CHANNEL.to_string());
    let subscriber = relay.subscribe(&channel);
    debug!(%channel, "subscriber connected");

    // The first tick fires immediately, so the client sees a keepalive at once.
    let keepalive = tokio::time::interval(relay.keepalive);
    let shutdown = relay.shutdown_token();

    let stream = futures::stream::unfold(
        (subscriber, keepalive, shutdown),
        |(mut subscriber, mut keepalive, shutdown)| async move {
            let chunk = tokio::select! {
                _ = shutdown.cancelled() => return None,
                received = subscriber.recv() => match received {
                    Ok(token) => encode_line(token),
                    Err(RecvError::Lagged(missed)) => {
                        warn!(missed, "subscriber lagged; dropped actions");
                        Bytes::from_static(b"\n")
                    }
                    Err(RecvError::Closed) => return None,
                },
                _ = keepalive.tick() => Bytes::from_static(b"\n"),
            };
            Some((
                Ok::<_, Infallible>(chunk),
                (subscriber, keepalive, shutdown),
            ))
        },
    );

    (
        [
            (header::CONTENT_TYPE, "application/x-ndjson"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(stream),
    )
}

fn encode_line(action: String) -> Bytes {
    match serde_json::to_vec(&ActionMessage { action }) {
        Ok(mut line) => {
            line.push(b'\n');
            Bytes::from(line)
        }
        Err(_) => Bytes::from_static(b"\n"),
    }
}

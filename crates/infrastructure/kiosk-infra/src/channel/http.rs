use std::time::Duration;

use futures::StreamExt;
use kiosk_config::{
    PUBLISH_PATH, PUBLISH_TIMEOUT, STREAM_IDLE_TIMEOUT, SUBSCRIBE_PATH, SUBSCRIPTION_BUFFER,
};
use kiosk_core::{ActionMessage, Command};
use reqwest::{Client, Response, Url};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{BroadcastChannel, ChannelError, ReconnectBackoff, Subscription};

/// Lines longer than this without a newline are discarded.
const MAX_LINE_BYTES: usize = 64 * 1024;

#[derive(Debug, Serialize)]
struct PublishRequest<'a> {
    action: &'a str,
    channel: &'a str,
}

/// Transport talking to a kiosk relay over HTTP.
///
/// Publishing is a `POST` of `{"action", "channel"}`. Subscribing holds a
/// streaming `GET` open and reads newline-delimited action messages,
/// reconnecting with backoff when the stream drops or goes silent.
#[derive(Debug, Clone)]
pub struct HttpRelayChannel {
    client: Client,
    base: Url,
    channel: String,
    idle_timeout: Duration,
    backoff: ReconnectBackoff,
}

/// Normalize a relay URL so it can be used as a base for the relay routes.
/// Accepts inputs with or without a trailing slash or path prefix.
pub(crate) fn normalize_relay_base(relay_url: &str) -> Result<Url, ChannelError> {
    let mut url = Url::parse(relay_url)
        .map_err(|e| ChannelError::InvalidEndpoint(format!("{relay_url}: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ChannelError::InvalidEndpoint(format!(
            "{relay_url}: unsupported scheme {}",
            url.scheme()
        )));
    }

    url.set_query(None);
    url.set_fragment(None);
    if !url.path().ends_with('/') {
        url.set_path(&format!("{}/", url.path()));
    }

    Ok(url)
}

impl HttpRelayChannel {
    pub fn new(
        client: Client,
        relay_url: &str,
        channel: impl Into<String>,
    ) -> Result<Self, ChannelError> {
        Ok(Self {
            client,
            base: normalize_relay_base(relay_url)?,
            channel: channel.into(),
            idle_timeout: STREAM_IDLE_TIMEOUT,
            backoff: ReconnectBackoff::default(),
        })
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    pub fn with_backoff(mut self, backoff: ReconnectBackoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn publish_url(&self) -> Result<Url, ChannelError> {
        self.base
            .join(PUBLISH_PATH)
            .map_err(|e| ChannelError::InvalidEndpoint(format!("{}: {e}", self.base)))
    }

    fn subscribe_url(&self) -> Result<Url, ChannelError> {
        let mut url = self
            .base
            .join(SUBSCRIBE_PATH)
            .map_err(|e| ChannelError::InvalidEndpoint(format!("{}: {e}", self.base)))?;
        url.query_pairs_mut().append_pair("channel", &self.channel);
        Ok(url)
    }
}

#[async_trait::async_trait]
impl BroadcastChannel for HttpRelayChannel {
    async fn publish(&self, command: Command) -> Result<(), ChannelError> {
        let body = PublishRequest {
            action: command.token(),
            channel: &self.channel,
        };

        let resp = self
            .client
            .post(self.publish_url()?)
            .timeout(PUBLISH_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChannelError::Unreachable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ChannelError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }

    async fn subscribe(&self) -> Result<Subscription, ChannelError> {
        let url = self.subscribe_url()?;
        let first = open_stream(&self.client, url.clone()).await?;
        info!(channel = %self.channel, relay = %self.base, "subscribed to relay");

        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let cancel = CancellationToken::new();
        let pump = StreamPump {
            client: self.client.clone(),
            url,
            idle_timeout: self.idle_timeout,
            backoff: self.backoff.clone(),
            tx,
            cancel: cancel.clone(),
        };
        tokio::spawn(pump.run(first));

        Ok(Subscription::new(rx, cancel))
    }
}

async fn open_stream(client: &Client, url: Url) -> Result<Response, ChannelError> {
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| ChannelError::Unreachable(e.to_string()))?;

    let status = resp.status();
    if !status.is_success() {
        let message = resp.text().await.unwrap_or_default();
        return Err(ChannelError::Rejected {
            status: status.as_u16(),
            message,
        });
    }
    Ok(resp)
}

enum Drained {
    Cancelled,
    Lost(String),
}

struct StreamPump {
    client: Client,
    url: Url,
    idle_timeout: Duration,
    backoff: ReconnectBackoff,
    tx: mpsc::Sender<String>,
    cancel: CancellationToken,
}

impl StreamPump {
    async fn run(mut self, first: Response) {
        let mut response = Some(first);
        loop {
            let resp = match response.take() {
                Some(resp) => resp,
                None => match self.reconnect().await {
                    Some(resp) => resp,
                    None => break,
                },
            };

            match self.drain(resp).await {
                Drained::Cancelled => break,
                Drained::Lost(reason) => warn!(%reason, url = %self.url, "relay stream lost"),
            }
        }
        debug!(url = %self.url, "relay subscription closed");
    }

    async fn reconnect(&mut self) -> Option<Response> {
        loop {
            let delay = self.backoff.next_delay();
            debug!(?delay, "waiting before relay reconnect");
            tokio::select! {
                _ = self.cancel.cancelled() => return None,
                _ = tokio::time::sleep(delay) => {}
            }

            match open_stream(&self.client, self.url.clone()).await {
                Ok(resp) => {
                    self.backoff.reset();
                    info!(url = %self.url, "reconnected to relay");
                    return Some(resp);
                }
                Err(e) => warn!(error = %e, "relay reconnect failed"),
            }
        }
    }

    async fn drain(&mut self, resp: Response) -> Drained {
        let mut stream = resp.bytes_stream();
        let mut lines = LineBuffer::default();

        loop {
            let next = tokio::select! {
                _ = self.cancel.cancelled() => return Drained::Cancelled,
                next = tokio::time::timeout(self.idle_timeout, stream.next()) => next,
            };

            let chunk = match next {
                Err(_) => return Drained::Lost("no data or keepalive within idle timeout".into()),
                Ok(None) => return Drained::Lost("stream ended".into()),
                Ok(Some(Err(e))) => return Drained::Lost(e.to_string()),
                Ok(Some(Ok(chunk))) => chunk,
            };

            for line in lines.push(&chunk) {
                if let Some(action) = decode_line(&line) {
                    if self.tx.send(action).await.is_err() {
                        return Drained::Cancelled;
                    }
                }
            }
        }
    }
}

#[derive(Default)]
struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    fn push(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            lines.push(self.pending.drain(..=pos).collect());
        }

        if self.pending.len() > MAX_LINE_BYTES {
            warn!(bytes = self.pending.len(), "discarding oversized relay line");
            self.pending.clear();
        }
        lines
    }
}

/// Extract the action token from one stream line. Blank lines are keepalives.
fn decode_line(line: &[u8]) -> Option<String> {
    let trimmed = line.trim_ascii();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_slice::<ActionMessage>(trimmed) {
        Ok(msg) => Some(msg.action),
        Err(e) => {
            debug!(error = %e, "ignoring malformed relay line");
            None
        }
    }
}

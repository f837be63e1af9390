use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use kiosk_core::Command;
use kiosk_infra::channel::{
    BroadcastChannel, ChannelError, HttpRelayChannel, ReconnectBackoff, Subscription,
};
use kiosk_infra::relay::Relay;
use tokio::task::JoinHandle;

const WAIT: Duration = Duration::from_secs(5);

async fn start_relay_on(addr: &str) -> (SocketAddr, Arc<Relay>, JoinHandle<()>) {
    let relay = Arc::new(Relay::new().with_keepalive(Duration::from_millis(200)));
    let listener = Relay::bind(addr).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn({
        let relay = relay.clone();
        async move {
            relay.serve(listener).await.unwrap();
        }
    });
    (addr, relay, handle)
}

async fn start_relay() -> (SocketAddr, Arc<Relay>, JoinHandle<()>) {
    start_relay_on("127.0.0.1:0").await
}

fn channel(addr: SocketAddr, name: &str) -> HttpRelayChannel {
    HttpRelayChannel::new(reqwest::Client::new(), &format!("http://{addr}"), name).unwrap()
}

async fn recv(sub: &mut Subscription) -> Option<String> {
    tokio::time::timeout(WAIT, sub.recv()).await.ok().flatten()
}

#[tokio::test]
async fn every_subscriber_receives_actions_in_publish_order() {
    let (addr, _relay, _server) = start_relay().await;
    let ch = channel(addr, "slides-channel");

    let mut a = ch.subscribe().await.unwrap();
    let mut b = ch.subscribe().await.unwrap();

    for cmd in [Command::Next, Command::Next, Command::Prev, Command::Reset] {
        ch.publish(cmd).await.unwrap();
    }

    for sub in [&mut a, &mut b] {
        let mut got = Vec::new();
        for _ in 0..4 {
            got.push(recv(sub).await.expect("token delivered"));
        }
        assert_eq!(got, vec!["next", "next", "prev", "reset"]);
    }
}

#[tokio::test]
async fn missing_action_is_rejected() {
    let (addr, _relay, _server) = start_relay().await;
    let client = reqwest::Client::new();

    for body in [serde_json::json!({}), serde_json::json!({ "action": "" })] {
        let resp = client
            .post(format!("http://{addr}/api/publish"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
        let json: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(json["error"], "Action is required");
    }
}

#[tokio::test]
async fn whitespace_action_is_accepted() {
    let (addr, _relay, _server) = start_relay().await;
    let mut sub = channel(addr, "slides-channel").subscribe().await.unwrap();

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/api/publish"))
        .json(&serde_json::json!({ "action": " " }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    assert_eq!(recv(&mut sub).await.as_deref(), Some(" "));
}

#[tokio::test]
async fn unknown_tokens_are_forwarded_verbatim() {
    let (addr, _relay, _server) = start_relay().await;
    let mut sub = channel(addr, "slides-channel").subscribe().await.unwrap();

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/api/publish"))
        .json(&serde_json::json!({ "action": "dance" }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["success"], true);

    assert_eq!(recv(&mut sub).await.as_deref(), Some("dance"));
}

#[tokio::test]
async fn channels_are_isolated() {
    let (addr, _relay, _server) = start_relay().await;
    let mut other = channel(addr, "other-booth").subscribe().await.unwrap();

    channel(addr, "slides-channel")
        .publish(Command::Next)
        .await
        .unwrap();

    let got = tokio::time::timeout(Duration::from_millis(300), other.recv()).await;
    assert!(got.is_err(), "message leaked across channels: {got:?}");
}

#[tokio::test]
async fn publish_to_unreachable_relay_fails() {
    let (addr, relay, server) = start_relay().await;
    relay.shutdown_token().cancel();
    server.await.unwrap();

    let err = channel(addr, "slides-channel")
        .publish(Command::Next)
        .await
        .unwrap_err();
    assert!(matches!(err, ChannelError::Unreachable(_)), "{err:?}");
}

#[tokio::test]
async fn subscriber_reconnects_after_relay_restart() {
    let (addr, relay, server) = start_relay().await;
    let ch = channel(addr, "slides-channel").with_backoff(ReconnectBackoff::new(
        Duration::from_millis(20),
        Duration::from_millis(100),
    ));
    let mut sub = ch.subscribe().await.unwrap();

    relay.shutdown_token().cancel();
    server.await.unwrap();

    let (_, relay, _server) = start_relay_on(&addr.to_string()).await;
    tokio::time::timeout(WAIT, async {
        while relay.subscriber_count("slides-channel") == 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("subscriber reconnected");

    ch.publish(Command::Skip).await.unwrap();
    assert_eq!(recv(&mut sub).await.as_deref(), Some("skip"));
}

#[tokio::test]
async fn dropping_subscription_releases_relay_side() {
    let (addr, relay, _server) = start_relay().await;
    let sub = channel(addr, "slides-channel").subscribe().await.unwrap();
    assert_eq!(relay.subscriber_count("slides-channel"), 1);
    assert_eq!(relay.channel_count(), 1);

    sub.unsubscribe();

    tokio::time::timeout(WAIT, async {
        while relay.channel_count() != 0 {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("relay dropped the idle channel");
}

#[tokio::test]
async fn publishing_to_unwatched_channels_keeps_nothing() {
    let (addr, relay, _server) = start_relay().await;
    let client = reqwest::Client::new();

    for i in 0..50 {
        let resp = client
            .post(format!("http://{addr}/api/publish"))
            .json(&serde_json::json!({ "action": "next", "channel": format!("junk-{i}") }))
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_success());
    }
    assert_eq!(relay.channel_count(), 0);
}

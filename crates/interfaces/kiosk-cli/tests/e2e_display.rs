use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use kiosk_app_core::DisplayStore;
use kiosk_cli::{commands, CliAction, CliPolicy, DisplayArgs, RelayTarget};
use kiosk_core::{Phase, TransitionKind};
use kiosk_infra::Relay;
use tokio_util::sync::CancellationToken;

const SLIDES: &str = r#"[
    {"title": "Welcome", "image": "/img/welcome.png"},
    {"title": "Products", "image": "/img/products.png"},
    {"title": "Contact", "image": "/img/contact.png"}
]"#;

async fn start_relay() -> (SocketAddr, Arc<Relay>, tokio::task::JoinHandle<()>) {
    let relay = Arc::new(Relay::new());
    let listener = Relay::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn({
        let relay = relay.clone();
        async move {
            relay.serve(listener).await.unwrap();
        }
    });
    (addr, relay, server)
}

fn target(addr: SocketAddr) -> RelayTarget {
    RelayTarget {
        relay: format!("http://{addr}"),
        channel: "slides-channel".into(),
    }
}

fn display_args(addr: SocketAddr, catalog: &str) -> DisplayArgs {
    DisplayArgs {
        target: target(addr),
        catalog: catalog.to_string(),
        intro: "videos/intro.mp4".into(),
        outro: "videos/outro.mp4".into(),
        policy: CliPolicy::QueueDuringIntro,
        player_cmd: None,
        clip_secs: 1,
    }
}

async fn wait_for(stores: &[DisplayStore], phase: Phase) {
    tokio::time::timeout(Duration::from_secs(10), async {
        while stores.iter().any(|s| s.state().phase() != phase) {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("displays never reached {phase:?}"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn remote_drives_every_display() {
    let (addr, relay, _server) = start_relay().await;
    let mut catalog = tempfile::NamedTempFile::new().unwrap();
    catalog.write_all(SLIDES.as_bytes()).unwrap();
    let catalog_path = catalog.path().to_str().unwrap().to_string();

    let shutdown = CancellationToken::new();
    let stores = [DisplayStore::default(), DisplayStore::default()];
    let displays: Vec<_> = stores
        .iter()
        .map(|store| {
            tokio::spawn(commands::cmd_display(
                display_args(addr, &catalog_path),
                store.clone(),
                shutdown.clone(),
            ))
        })
        .collect();

    tokio::time::timeout(Duration::from_secs(10), async {
        while relay.subscriber_count("slides-channel") < 2 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("both displays subscribed");

    commands::cmd_remote(target(addr), CliAction::Next).await.unwrap();
    commands::cmd_remote(target(addr), CliAction::Next).await.unwrap();
    wait_for(
        &stores,
        Phase::Transitioning {
            kind: TransitionKind::IdleToFirst,
            queued: Some(1),
        },
    )
    .await;

    // The intro lasts one second, then the queued advance applies.
    wait_for(&stores, Phase::Showing(1)).await;

    commands::cmd_remote(target(addr), CliAction::Prev).await.unwrap();
    wait_for(&stores, Phase::Showing(0)).await;

    commands::cmd_remote(target(addr), CliAction::Reset).await.unwrap();
    wait_for(&stores, Phase::Idle).await;

    shutdown.cancel();
    for display in displays {
        let state = display.await.unwrap().unwrap();
        assert_eq!(state.phase(), Phase::Idle);
        assert_eq!(state.slide_count, 3);
    }
}

#[tokio::test]
async fn remote_reports_unreachable_relay() {
    let (addr, relay, server) = start_relay().await;
    relay.shutdown_token().cancel();
    server.await.unwrap();

    let err = commands::cmd_remote(target(addr), CliAction::Next)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Failed to send Next"), "{err:#}");
}

#[tokio::test]
async fn display_starts_empty_without_catalog_or_relay() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("data.json");
    let args = display_args("127.0.0.1:1".parse().unwrap(), missing.to_str().unwrap());

    let shutdown = CancellationToken::new();
    let store = DisplayStore::default();
    let display = tokio::spawn(commands::cmd_display(args, store.clone(), shutdown.clone()));

    tokio::time::sleep(Duration::from_millis(200)).await;
    shutdown.cancel();

    let state = tokio::time::timeout(Duration::from_secs(5), display)
        .await
        .expect("display honours shutdown while reconnecting")
        .unwrap()
        .unwrap();
    assert_eq!(state.slide_count, 0);
    assert_eq!(state.phase(), Phase::Idle);
}

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use kiosk_app_core::{
    BroadcastChannel, DisplayKernel, DisplayOptions, DisplayStore, MediaPort, RemoteSender,
    Subscription,
};
use kiosk_core::{Catalog, DisplayState};
use kiosk_infra::{
    load_catalog, net::default_http_client, CommandClipPlayer, HttpRelayChannel,
    ReconnectBackoff, Relay, TimedClipPlayer,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::sink::ConsoleSink;
use crate::{CliAction, DisplayArgs, RelayTarget};

fn relay_channel(target: &RelayTarget) -> Result<HttpRelayChannel> {
    let client = default_http_client().context("Failed to build HTTP client")?;
    HttpRelayChannel::new(client, &target.relay, target.channel.clone())
        .with_context(|| format!("Invalid relay URL {}", target.relay))
}

fn media_player(args: &DisplayArgs) -> Result<Box<dyn MediaPort>> {
    match &args.player_cmd {
        Some(template) => {
            let player = CommandClipPlayer::from_template(template)
                .context("Failed to parse --player-cmd")?;
            Ok(Box::new(player))
        }
        None => {
            let secs = kiosk_config::clamp_clip_secs(args.clip_secs);
            Ok(Box::new(TimedClipPlayer::new(Duration::from_secs(secs))))
        }
    }
}

/// Run one display until `shutdown` fires. `store` lets the caller observe it.
pub async fn cmd_display(
    args: DisplayArgs,
    store: DisplayStore,
    shutdown: CancellationToken,
) -> Result<DisplayState> {
    println!(":: Starting display");
    println!("   Relay:   {}", args.target.relay);
    println!("   Channel: {}", args.target.channel);
    println!("   Catalog: {}", args.catalog);

    let client = default_http_client().context("Failed to build HTTP client")?;
    let catalog = match load_catalog(&client, &args.catalog).await {
        Ok(catalog) => catalog,
        Err(e) => {
            warn!(error = %e, catalog = %args.catalog, "catalog unavailable; starting empty");
            Catalog::default()
        }
    };

    let channel = relay_channel(&args.target)?;
    let options = DisplayOptions {
        policy: args.policy.into(),
        clips: args.clips(),
    };
    let kernel = DisplayKernel::new(store, catalog, media_player(&args)?, ConsoleSink, options);

    let Some(subscription) = subscribe_until_shutdown(&channel, &shutdown).await else {
        return Ok(kernel.state());
    };

    let state = kernel.run(subscription, shutdown).await;
    println!(":: Display stopped");
    Ok(state)
}

async fn subscribe_until_shutdown<C: BroadcastChannel>(
    channel: &C,
    shutdown: &CancellationToken,
) -> Option<Subscription> {
    let mut backoff = ReconnectBackoff::default();
    loop {
        let attempt = tokio::select! {
            _ = shutdown.cancelled() => return None,
            attempt = channel.subscribe() => attempt,
        };

        match attempt {
            Ok(subscription) => return Some(subscription),
            Err(e) => {
                let delay = backoff.next_delay();
                warn!(error = %e, ?delay, "relay not reachable; retrying");
                tokio::select! {
                    _ = shutdown.cancelled() => return None,
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }
    }
}

pub async fn cmd_remote(target: RelayTarget, action: CliAction) -> Result<()> {
    let remote = RemoteSender::new(relay_channel(&target)?);
    let sent = match action {
        CliAction::Next => remote.send_next().await,
        CliAction::Prev => remote.send_prev().await,
        CliAction::Reset => remote.send_reset().await,
    };
    sent.with_context(|| format!("Failed to send {action:?} to {}", target.relay))?;

    println!(":: Sent {action:?} on {}", target.channel);
    Ok(())
}

pub async fn cmd_relay(bind: String, shutdown: CancellationToken) -> Result<()> {
    let relay = Arc::new(Relay::new().with_shutdown(shutdown));
    let listener = Relay::bind(&bind).await?;
    if let Ok(addr) = listener.local_addr() {
        println!(":: Relay listening on http://{addr}");
    }

    relay.serve(listener).await?;
    info!("relay stopped");
    Ok(())
}

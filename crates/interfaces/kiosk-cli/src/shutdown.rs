use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Token cancelled on the first Ctrl+C or SIGTERM.
///
/// SIGTERM is registered before this returns, so a failed registration is
/// reported to the caller instead of leaving the process unkillable.
pub fn cancel_on_signal() -> std::io::Result<CancellationToken> {
    let token = CancellationToken::new();

    #[cfg(unix)]
    let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;

    let cancel = token.clone();
    tokio::spawn(async move {
        #[cfg(unix)]
        let terminate = async move {
            sigterm.recv().await;
        };
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();
        tokio::pin!(terminate);

        tokio::select! {
            interrupted = signal::ctrl_c() => {
                if let Err(e) = interrupted {
                    warn!(error = %e, "Ctrl+C unavailable; waiting for SIGTERM");
                    terminate.await;
                }
            }
            _ = &mut terminate => {}
        }
        info!("shutdown signal received");
        cancel.cancel();
    });

    Ok(token)
}

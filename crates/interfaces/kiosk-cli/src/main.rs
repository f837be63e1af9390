use anyhow::Context;
use clap::{Parser, Subcommand};
use kiosk_app_core::DisplayStore;
use kiosk_cli::{commands, shutdown, CliAction, DisplayArgs, RelayTarget};
use kiosk_config::DEFAULT_RELAY_BIND;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the slideshow and follow remote commands
    Display(DisplayArgs),
    /// Send one command to every display on a channel
    Remote {
        #[arg(value_enum)]
        action: CliAction,
        #[command(flatten)]
        target: RelayTarget,
    },
    /// Serve the broadcast relay
    Relay {
        #[arg(long, env = "KIOSK_RELAY_BIND", default_value = DEFAULT_RELAY_BIND)]
        bind: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let fallback = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install log subscriber")?;

    match cli.command {
        Commands::Display(args) => {
            let shutdown =
                shutdown::cancel_on_signal().context("Failed to install signal handlers")?;
            let state = commands::cmd_display(args, DisplayStore::default(), shutdown).await?;
            tracing::debug!(phase = ?state.phase(), "final display state");
        }
        Commands::Remote { action, target } => commands::cmd_remote(target, action).await?,
        Commands::Relay { bind } => {
            let shutdown =
                shutdown::cancel_on_signal().context("Failed to install signal handlers")?;
            commands::cmd_relay(bind, shutdown).await?;
        }
    }

    Ok(())
}

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{Level, info};

use vitrine_core::app::{GatewayBuilder, UrlSigner, router};
use vitrine_core::config::Config;
use vitrine_core::domain::{ObjectKey, Variant};
use vitrine_core::observability::init_tracing;
use vitrine_core::ports::SystemClock;

/// Signed media references for the gallery site.
///
/// Every subcommand reads its settings (secret, limits, bind address)
/// from the environment.
#[derive(Debug, Parser)]
#[command(name = "vitrine", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the media gateway.
    Serve {
        /// Overrides VITRINE_BIND.
        #[arg(short, long)]
        bind: Option<SocketAddr>,
    },

    /// Print a signed `/media/...` path for one object key.
    Sign {
        /// e.g. `deja-vu/full_1200_wm.webp`
        key: ObjectKey,

        /// Lifetime in seconds (default: MEDIA_SIGN_TTL_SECS).
        #[arg(long)]
        ttl: Option<u64>,

        /// Print the whole reference as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print a signed `srcset` covering every width of one variant.
    Srcset {
        collection: String,
        variant: Variant,

        #[arg(long)]
        ttl: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env().context("failed to load configuration")?;

    match cli.command {
        Command::Serve { bind } => serve(config, bind).await,
        Command::Sign { key, ttl, json } => {
            let signer = signer(&config)?;
            let reference = signer.sign(&key, ttl.map(Duration::from_secs));
            if json {
                println!("{}", serde_json::to_string_pretty(&reference)?);
            } else {
                println!("{}", reference.path_and_query());
            }
            Ok(())
        }
        Command::Srcset {
            collection,
            variant,
            ttl,
        } => {
            let srcset = signer(&config)?
                .srcset(&collection, variant, ttl.map(Duration::from_secs))
                .with_context(|| format!("invalid collection {collection:?}"))?;
            println!("{srcset}");
            Ok(())
        }
    }
}

fn signer(config: &Config) -> anyhow::Result<UrlSigner<SystemClock>> {
    Ok(UrlSigner::new(
        config.media.secret.clone(),
        SystemClock,
        config.media.sign_ttl,
    )?)
}

async fn serve(config: Config, bind: Option<SocketAddr>) -> anyhow::Result<()> {
    init_tracing(config.server.log_format, Level::INFO)?;

    let addr = bind.unwrap_or(config.server.bind);
    let limits = config.rate_limit.clone();
    let gateway = GatewayBuilder::new(config)
        .build()
        .context("failed to build media gateway")?;
    let app = router(Arc::new(gateway));

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(
        %addr,
        ip_max = limits.ip_max,
        key_max = limits.key_max,
        window_secs = limits.window.as_secs(),
        "media gateway listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("media gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received ctrl-c, shutting down"),
        Err(e) => tracing::error!(error = %e, "failed to listen for ctrl-c"),
    }
}

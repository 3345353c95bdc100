use gitscout::{Config, Scout, config};
use mimalloc::MiMalloc;
use std::path::PathBuf;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::var_os(config::CONFIG_PATH_ENV)
        .map_or_else(|| PathBuf::from(config::DEFAULT_CONFIG_FILE), PathBuf::from);
    let cfg = Config::load(&config_path)?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        config = %config_path.display(),
        loglevel = %cfg.basic.loglevel,
        proxy = %cfg.proxy.as_ref().map(|p| format!("{}:{}", p.host, p.port)).unwrap_or_else(|| "<none>".to_string()),
        api_url = %cfg.upstream.api_url,
        "Configuration loaded"
    );

    let cancel = CancellationToken::new();
    let scout = Scout::from_config(&cfg, cancel.clone())?;

    tokio::spawn(async move {
        shutdown_signal().await;
        warn!("Interrupt received; finishing in-flight calls and stopping.");
        cancel.cancel();
    });

    let summary = scout.run().await?;
    if summary.cancelled {
        info!("Run stopped early; rerun to resume from the ledgers.");
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

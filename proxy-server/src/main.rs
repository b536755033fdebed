#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::Request;
use axum::response::Response;
use axum::routing::any;
use axum::Router as AxumRouter;
use clap::Parser;
use proxy_dispatch::{Dispatcher, ReqwestForwarder};
use proxy_observability::MetricsSink;
use proxy_reload::{initial_load, EnvSettings, ReloadPaths, Reloader};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info};

/// Global shutdown flag — checked by signal handler.
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

#[derive(Parser, Debug)]
#[command(name = "token-gate", version, about = "Token-authenticating, role-authorizing reverse proxy")]
struct Cli {
    /// Log level used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .with_target(false)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "token-gate starting");

    let settings = EnvSettings::load()?;
    info!(
        config_dir = %settings.config_dir,
        http_port = settings.http_port,
        metrics_port = settings.metrics_port,
        reload_interval_ms = settings.reload_interval_ms,
        auth_headers = ?settings.auth_headers(),
        "resolved settings"
    );

    let paths = ReloadPaths {
        routes: settings.routes_path(),
        tokens: settings.tokens_path(),
        users: settings.users_path(),
        roles: settings.roles_path(),
    };

    // Initial load is synchronous and fatal on failure — the server must
    // not begin listening without a snapshot.
    let handle = initial_load(&paths).map_err(|e| {
        error!(error = %e, "initial config load failed, aborting startup");
        e
    })?;
    info!(config_dir = %settings.config_dir, "initial config loaded");

    let reloader = Arc::new(Reloader::new(paths, handle.clone()));
    let reload_interval = std::time::Duration::from_millis(settings.reload_interval_ms);
    tokio::spawn(Arc::clone(&reloader).run(reload_interval));

    let metrics = Arc::new(MetricsSink::new()?);

    let dispatcher = Arc::new(Dispatcher::new(
        handle,
        settings.auth_headers(),
        Arc::new(ReqwestForwarder::new()),
        Arc::clone(&metrics),
    ));

    let proxy_addr = SocketAddr::from(([0, 0, 0, 0], settings.http_port));
    let metrics_addr = SocketAddr::from(([0, 0, 0, 0], settings.metrics_port));

    let serving = tokio::spawn(serve_proxy(dispatcher, proxy_addr));
    let observing = tokio::spawn(proxy_observability::server::serve(metrics, metrics_addr));

    info!(proxy_addr = %proxy_addr, metrics_addr = %metrics_addr, "token-gate is ready — serving traffic");

    setup_signal_handler();
    while !SHUTDOWN.load(Ordering::Relaxed) {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }

    info!("shutdown signal received, stopping");
    serving.abort();
    observing.abort();

    Ok(())
}

async fn serve_proxy(dispatcher: Arc<Dispatcher>, addr: SocketAddr) -> anyhow::Result<()> {
    let app = AxumRouter::new()
        .fallback(any(proxy_handler))
        .with_state(dispatcher);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

async fn proxy_handler(
    State(dispatcher): State<Arc<Dispatcher>>,
    ConnectInfo(client_addr): ConnectInfo<SocketAddr>,
    req: Request<Body>,
) -> Response {
    dispatcher.dispatch(req, client_addr.ip().to_string()).await
}

fn setup_signal_handler() {
    // SIGTERM (docker stop) + SIGINT (Ctrl+C)
    for sig in [libc::SIGTERM, libc::SIGINT] {
        unsafe {
            libc::signal(sig, signal_handler as libc::sighandler_t);
        }
    }
}

extern "C" fn signal_handler(_sig: libc::c_int) {
    SHUTDOWN.store(true, Ordering::Relaxed);
}

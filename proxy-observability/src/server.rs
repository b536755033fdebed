use crate::metrics::MetricsSink;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router as AxumRouter;
use std::sync::Arc;
use tracing::info;

/// The secondary HTTP server on `metricsPort`. `/ready` answers a
/// liveness probe; every other path returns the current metrics snapshot.
pub async fn serve(sink: Arc<MetricsSink>, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = AxumRouter::new()
        .route("/ready", get(ready_handler))
        .fallback(get(metrics_handler))
        .with_state(sink);

    info!(%addr, "starting metrics server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn ready_handler() -> impl IntoResponse {
    (StatusCode::OK, "Ready")
}

async fn metrics_handler(State(sink): State<Arc<MetricsSink>>) -> impl IntoResponse {
    sink.gather_text()
}

//! Server lifecycle: bind, serve, and drain background work on shutdown.

use std::future::Future;
use std::net::SocketAddr;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use crate::app::build_app;
use crate::state::AppState;

/// Bind `0.0.0.0:port` and serve until Ctrl-C or SIGTERM.
pub async fn run(port: u16, state: AppState) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    serve(listener, state, wait_for_shutdown_signal()).await
}

/// Serve on `listener` until `shutdown` resolves.
///
/// In-flight requests are allowed to finish, then every task still held by
/// the supervisor is awaited before returning.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    let supervisor = state.supervisor.clone();
    info!(addr = %addr, env = %state.env, "starting server");

    axum::serve(listener, build_app(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("server error")?;

    info!(
        addr = %addr,
        outstanding = supervisor.outstanding(),
        "completing background tasks"
    );
    supervisor.await_all().await;

    info!(addr = %addr, "stopped server");
    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "cannot listen for SIGTERM; Ctrl-C only");
            let _ = tokio::signal::ctrl_c().await;
            info!(signal = "SIGINT", "shutting down server");
            return;
        }
    };

    let signal = tokio::select! {
        _ = tokio::signal::ctrl_c() => "SIGINT",
        _ = sigterm.recv() => "SIGTERM",
    };
    info!(signal, "shutting down server");
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!(signal = "SIGINT", "shutting down server");
}

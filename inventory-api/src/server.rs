use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use eyre::{eyre, Result, WrapErr};
use tokio::net::TcpListener;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::handlers;
use crate::store::ProductStore;

/// Returns a future that resolves once SIGTERM or SIGINT is received.
///
/// Handlers are registered at call time, before the future is first polled,
/// so a signal arriving during the rest of startup is buffered rather than
/// lost.
pub fn shutdown_signal() -> Result<impl Future<Output = ()> + Send + 'static> {
    let mut term =
        signal(SignalKind::terminate()).wrap_err("failed to register SIGTERM handler")?;
    let mut interrupt =
        signal(SignalKind::interrupt()).wrap_err("failed to register SIGINT handler")?;

    Ok(async move {
        tokio::select! {
            _ = term.recv() => tracing::info!("received SIGTERM"),
            _ = interrupt.recv() => tracing::info!("received SIGINT"),
        }
    })
}

/// Run the inventory API on `listener` until `shutdown` resolves or the
/// server fails.
///
/// The accept loop runs on a background task and always reports its final
/// result on a single-slot channel, so it never blocks on a receiver that has
/// already gone away. If the server fails first this returns the error
/// without attempting a drain; there is nothing left to drain. Once
/// `shutdown` resolves the server stops accepting and in-flight requests get
/// `config.shutdown_timeout_secs` to finish; past that deadline the server
/// task is aborted, which drops the listener and abandons whatever remains.
pub async fn serve<F>(
    config: &Config,
    listener: TcpListener,
    store: Arc<dyn ProductStore>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener
        .local_addr()
        .wrap_err("listener has no local address")?;
    let app = handlers::app(store);

    let drain = CancellationToken::new();
    let (result_tx, mut result_rx) = mpsc::channel::<Result<()>>(1);

    let server = tokio::spawn({
        let drain = drain.clone();
        async move {
            tracing::info!(%addr, "API listening");

            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move { drain.cancelled().await })
                .await
                .map_err(eyre::Report::new);

            // Buffered channel: if serve has already bailed out, this send
            // fails immediately instead of blocking the accept task.
            result_tx.send(result).await.ok();
        }
    });

    tokio::select! {
        result = result_rx.recv() => {
            return match result {
                Some(Err(e)) => Err(e.wrap_err("error listening and serving")),
                _ => Err(eyre!("server exited before shutdown was requested")),
            };
        }
        _ = shutdown => {
            tracing::info!("shutdown requested, draining in-flight requests");
        }
    }

    drain.cancel();

    let grace = Duration::from_secs(config.shutdown_timeout_secs);
    match tokio::time::timeout(grace, result_rx.recv()).await {
        Ok(Some(Ok(()))) => {
            tracing::info!("graceful shutdown complete");
            Ok(())
        }
        Ok(Some(Err(e))) => Err(e.wrap_err("server error while draining")),
        Ok(None) => Err(eyre!("server task exited without reporting a result")),
        Err(_) => {
            tracing::warn!(
                timeout_secs = config.shutdown_timeout_secs,
                "graceful shutdown did not complete in time, closing by force"
            );

            server.abort();

            match server.await {
                Ok(()) => {
                    tracing::info!("forced close complete");
                    Ok(())
                }
                Err(e) if e.is_cancelled() => {
                    tracing::info!("forced close complete");
                    Ok(())
                }
                Err(e) => Err(eyre!("could not stop server: {}", e)),
            }
        }
    }
}

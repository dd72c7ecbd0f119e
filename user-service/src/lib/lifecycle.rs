//! Serving the HTTP router and draining it on shutdown.

use std::future::Future;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Serve `router` until `shutdown` resolves, then drain.
///
/// After the shutdown signal no new connections are accepted and in-flight
/// requests get up to `drain_timeout` to finish. Whatever is still running
/// after that is aborted. Returns early if the server itself fails.
pub async fn serve<F>(
    listener: TcpListener,
    router: Router,
    shutdown: F,
    drain_timeout: Duration,
) -> Result<(), anyhow::Error>
where
    F: Future<Output = ()> + Send,
{
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let mut server = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = stop_rx.await;
            })
            .await
    });

    tokio::select! {
        result = &mut server => {
            return match result {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(e.into()),
                Err(e) => Err(e.into()),
            };
        }
        _ = shutdown => {
            tracing::info!(
                drain_timeout_secs = drain_timeout.as_secs(),
                "Shutdown requested, draining in-flight requests"
            );
            let _ = stop_tx.send(());
        }
    }

    match tokio::time::timeout(drain_timeout, &mut server).await {
        Ok(Ok(Ok(()))) => tracing::info!("All in-flight requests completed"),
        Ok(Ok(Err(e))) => tracing::error!(error = %e, "Server error while draining"),
        Ok(Err(e)) => tracing::error!(error = %e, "Server task failed while draining"),
        Err(_) => {
            tracing::warn!("Drain timeout elapsed, abandoning outstanding requests");
            server.abort();
        }
    }

    Ok(())
}

/// Resolves on Ctrl+C, or on SIGTERM where that exists.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }
}

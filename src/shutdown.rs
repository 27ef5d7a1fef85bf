//! Cooperative shutdown signal
//!
//! A `watch` channel carrying `true` once the operator asked to stop. Every
//! suspension point in the monitor races against `wait`.

use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;

/// Create a shutdown pair, initially not signalled
pub fn channel() -> (watch::Sender<bool>, watch::Receiver<bool>) {
    watch::channel(false)
}

/// Receiver that flips to `true` on Ctrl-C
pub fn on_ctrl_c() -> watch::Receiver<bool> {
    let (tx, rx) = channel();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            return;
        }
        tracing::info!("Received shutdown signal");
        let _ = tx.send(true);
        // Keep the sender alive so receivers never observe a closed channel
        std::future::pending::<()>().await;
    });
    rx
}

/// Whether shutdown has been requested
pub fn is_requested(shutdown: &watch::Receiver<bool>) -> bool {
    *shutdown.borrow()
}

/// Resolves once shutdown is requested; never resolves if the sender is gone
pub async fn wait(shutdown: &mut watch::Receiver<bool>) {
    let closed = shutdown.wait_for(|stop| *stop).await.is_err();
    if closed {
        std::future::pending::<()>().await;
    }
}

/// Drive `fut` to completion unless shutdown is requested first
pub async fn or_shutdown<F: Future>(
    fut: F,
    shutdown: &mut watch::Receiver<bool>,
) -> Option<F::Output> {
    if is_requested(shutdown) {
        return None;
    }
    tokio::select! {
        output = fut => Some(output),
        _ = wait(shutdown) => None,
    }
}

/// Returns false if shutdown interrupted the sleep
pub async fn sleep_or_shutdown(duration: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    or_shutdown(tokio::time::sleep(duration), shutdown)
        .await
        .is_some()
}

//! Shutdown coordination for the server.

use tokio::sync::broadcast;

/// Coordinator for graceful shutdown.
///
/// Clones share one broadcast channel; any of them can trigger it.
#[derive(Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Resolves once `trigger` is called or the process receives Ctrl+C.
    pub fn signalled(&self) -> impl std::future::Future<Output = ()> + Send + 'static {
        let mut rx = self.subscribe();
        async move {
            tokio::select! {
                _ = rx.recv() => {
                    tracing::info!("Shutdown triggered");
                }
                result = tokio::signal::ctrl_c() => match result {
                    Ok(()) => tracing::info!("Shutdown signal received"),
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                        let _ = rx.recv().await;
                    }
                },
            }
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

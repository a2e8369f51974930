//! Cooperative cancellation

use tokio_util::sync::CancellationToken;

/// Shutdown signal shared by everything taking part in one process run
///
/// Monotonic: once requested it stays requested. Clones observe the same
/// state. Transfers poll it between files and between chunks of a copy.
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    token: CancellationToken,
}

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn request(&self) {
        if !self.token.is_cancelled() {
            tracing::info!("cancellation requested");
        }
        self.token.cancel();
    }

    pub fn is_requested(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once cancellation has been requested
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    /// Request cancellation on Ctrl+C, and on SIGTERM where available
    ///
    /// Must be called from within a tokio runtime.
    pub fn install_signal_handlers(&self) {
        let cancel = self.clone();
        tokio::spawn(async move {
            wait_for_shutdown_signal().await;
            eprintln!();
            eprintln!("Shutdown requested, stopping after the current step...");
            cancel.request();
        });
    }
}

async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

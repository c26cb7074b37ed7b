use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::app::coordinator::LifecycleCoordinator;
use crate::app::publish_loop::PublishLoop;
use crate::app::sweep_loop::SweepLoop;
use crate::config::MarqueeConfig;

/// Background loop handle.
/// - `shutdown_tx` を drop するとループ全体が止まる
/// - `shutdown_and_join()` で両ループの終了を待てる
pub struct Background {
    shutdown_tx: watch::Sender<bool>,
    joins: Vec<JoinHandle<()>>,
}

impl Background {
    /// Spawn the sweep and publish loops.
    pub fn spawn(coordinator: Arc<LifecycleCoordinator>, config: &MarqueeConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let sweep = SweepLoop::new(Arc::clone(&coordinator), config.sweep_interval());
        let publish = PublishLoop::new(coordinator, config);
        let joins = vec![
            tokio::spawn(sweep.run(shutdown_rx.clone())),
            tokio::spawn(publish.run(shutdown_rx)),
        ];
        tracing::info!(
            sweep_secs = config.sweep_interval_secs,
            publish_secs = config.publish_interval_secs,
            "background loops started"
        );

        Self { shutdown_tx, joins }
    }

    /// Request shutdown. An in-flight tick finishes first.
    pub fn request_shutdown(&self) {
        // receivers may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        for join in self.joins {
            if let Err(err) = join.await {
                tracing::error!(error = %err, "background loop panicked");
            }
        }
    }
}

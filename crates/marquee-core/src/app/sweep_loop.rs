//! SweepLoop - 予定時刻が来た項目を Archive へ移す
//!
//! # フロー
//! 1. Clock から now を取る
//! 2. `LifecycleCoordinator::sweep(now)` が告知と移動を行う
//! 3. 失敗はログに残して次の tick へ（取りこぼした分は追わない）

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::app::coordinator::LifecycleCoordinator;
use crate::domain::{ArchiveEntry, MarqueeError};

pub struct SweepLoop {
    coordinator: Arc<LifecycleCoordinator>,
    interval: Duration,
}

impl SweepLoop {
    pub fn new(coordinator: Arc<LifecycleCoordinator>, interval: Duration) -> Self {
        Self {
            coordinator,
            interval,
        }
    }

    /// 1 回分の sweep
    pub async fn tick(&self) -> Result<Vec<ArchiveEntry>, MarqueeError> {
        let now = self.coordinator.now();
        self.coordinator.sweep(now).await
    }

    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            if *shutdown_rx.borrow() {
                break;
            }
            tokio::select! {
                changed = shutdown_rx.changed() => {
                    // sender dropped
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
                _ = ticker.tick() => {}
            }
            match self.tick().await {
                Ok(archived) if !archived.is_empty() => {
                    tracing::info!(count = archived.len(), "sweep archived due entries")
                }
                Ok(_) => {}
                Err(err) => tracing::warn!(error = %err, "sweep tick failed"),
            }
        }
        tracing::debug!("sweep loop stopped");
    }
}

//! PublishLoop - リストの要約を表示チャネルに反映する
//!
//! # フロー（1 tick = 1 リスト）
//! 1. 対象リストをストアから読み直す（他プロセスの変更を拾う）
//! 2. ロック下でスナップショットを取り、カードに描画
//! 3. 直近 `lookback` 件の中で自分の最新メッセージを編集、なければ新規投稿
//! 4. 成功したら次のリストへ（Catalog → Schedule → Archive → ...）
//!
//! 失敗した tick は状態を変えず、同じリストを次の tick で再試行する。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::app::coordinator::LifecycleCoordinator;
use crate::config::MarqueeConfig;
use crate::domain::{ListKind, MarqueeError, MessageId};
use crate::ports::ChannelError;
use crate::render::summary_card;

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error(transparent)]
    Lists(#[from] MarqueeError),
}

/// tick の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Published {
    Edited { view: ListKind, id: MessageId },
    Posted { view: ListKind, id: MessageId },
}

pub struct PublishLoop {
    coordinator: Arc<LifecycleCoordinator>,
    interval: Duration,
    lookback: usize,
    archive_recent: usize,
    next: ListKind,
}

impl PublishLoop {
    pub fn new(coordinator: Arc<LifecycleCoordinator>, config: &MarqueeConfig) -> Self {
        Self {
            coordinator,
            interval: config.publish_interval(),
            lookback: config.publish_lookback,
            archive_recent: config.publish_recent_n,
            next: ListKind::Catalog,
        }
    }

    /// 次の tick で描画するリスト
    pub fn next_view(&self) -> ListKind {
        self.next
    }

    pub async fn tick(&mut self) -> Result<Published, PublishError> {
        let view = self.next;
        self.coordinator.reload(view).await?;
        let snapshot = self.coordinator.view(view, self.archive_recent).await?;
        let card = summary_card(&snapshot);

        let channel = self.coordinator.channel();
        let latest = channel
            .recent_own_messages(self.lookback)
            .await?
            .into_iter()
            .next();

        let published = match latest {
            Some(message) => match channel.edit(message.id, &card).await {
                Ok(()) => Published::Edited {
                    view,
                    id: message.id,
                },
                Err(ChannelError::MessageGone(_)) => Published::Posted {
                    view,
                    id: channel.post(&card).await?,
                },
                Err(err) => return Err(err.into()),
            },
            None => Published::Posted {
                view,
                id: channel.post(&card).await?,
            },
        };

        self.next = view.next();
        tracing::debug!(?published, "summary published");
        Ok(published)
    }

    pub async fn run(mut self, mut shutdown_rx: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
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
            if let Err(err) = self.tick().await {
                tracing::warn!(view = %self.next, error = %err, "publish tick skipped");
            }
        }
        tracing::debug!("publish loop stopped");
    }
}

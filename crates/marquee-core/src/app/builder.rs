//! MarqueeBuilder - アプリケーションの構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）：ポート不足・設定不正・ストア読み込み失敗は build() で返す

use std::sync::Arc;
use std::time::Duration;

use crate::app::background::Background;
use crate::app::commands::CommandService;
use crate::app::coordinator::LifecycleCoordinator;
use crate::config::{ConfigError, MarqueeConfig};
use crate::domain::MarqueeError;
use crate::lists::{ArchiveList, CatalogList, ListCell, ScheduleList, TimezoneBook, TimezoneTable};
use crate::ports::{Clock, Confirmer, DisplayChannel, DocumentStore, MovieLookup, SystemClock};

/// MarqueeBuilder は ports と設定からアプリケーションを組み立てる
///
/// # 使用例
/// ```ignore
/// let app = MarqueeBuilder::new()
///     .config(config)
///     .store(Arc::new(JsonFileStore::new("./data")))
///     .lookup(lookup)
///     .confirmer(confirmer)
///     .channel(channel)
///     .build()
///     .await?;
/// ```
pub struct MarqueeBuilder {
    config: MarqueeConfig,
    store: Option<Arc<dyn DocumentStore>>,
    lookup: Option<Arc<dyn MovieLookup>>,
    confirmer: Option<Arc<dyn Confirmer>>,
    channel: Option<Arc<dyn DisplayChannel>>,
    clock: Arc<dyn Clock>,
    confirm_timeout: Option<Duration>,
}

/// BuildError はアプリケーション構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("missing port: {0}. Call the matching builder method before build().")]
    MissingPort(&'static str),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("initial load failed: {0}")]
    Store(#[from] MarqueeError),
}

impl MarqueeBuilder {
    pub fn new() -> Self {
        Self {
            config: MarqueeConfig::default(),
            store: None,
            lookup: None,
            confirmer: None,
            channel: None,
            clock: Arc::new(SystemClock),
            confirm_timeout: None,
        }
    }

    pub fn config(mut self, config: MarqueeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn lookup(mut self, lookup: Arc<dyn MovieLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    pub fn confirmer(mut self, confirmer: Arc<dyn Confirmer>) -> Self {
        self.confirmer = Some(confirmer);
        self
    }

    pub fn channel(mut self, channel: Arc<dyn DisplayChannel>) -> Self {
        self.channel = Some(channel);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// 設定値より細かい確認タイムアウト（テスト用）
    pub fn confirm_timeout(mut self, timeout: Duration) -> Self {
        self.confirm_timeout = Some(timeout);
        self
    }

    /// コーディネータだけを組み立てる
    ///
    /// # 検証
    /// - 設定値の妥当性
    /// - 必須ポート（store / lookup / confirmer / channel）が揃っているか
    /// - 各文書がストアから読めるか
    pub async fn build_coordinator(self) -> Result<LifecycleCoordinator, BuildError> {
        self.config.validate()?;
        let store = self.store.ok_or(BuildError::MissingPort("store"))?;
        let lookup = self.lookup.ok_or(BuildError::MissingPort("lookup"))?;
        let confirmer = self.confirmer.ok_or(BuildError::MissingPort("confirmer"))?;
        let channel = self.channel.ok_or(BuildError::MissingPort("channel"))?;
        let refresh = self.config.shared_store;

        let catalog = ListCell::open(
            CatalogList::new(self.config.catalog_capacity),
            store.clone(),
            refresh,
        )
        .await?;
        let schedule = ListCell::open(ScheduleList::new(), store.clone(), refresh).await?;
        let archive = ListCell::open(ArchiveList::new(), store.clone(), refresh).await?;
        let timezones = TimezoneBook::new(
            ListCell::open(TimezoneTable::new(), store, refresh).await?,
            self.config.default_timezone.clone(),
        );

        tracing::debug!(
            capacity = self.config.catalog_capacity,
            shared_store = refresh,
            "lists loaded"
        );
        Ok(LifecycleCoordinator::new(
            catalog,
            schedule,
            archive,
            timezones,
            lookup,
            confirmer,
            channel,
            self.clock,
            self.confirm_timeout
                .unwrap_or_else(|| self.config.confirm_timeout()),
        ))
    }

    /// App を構築
    pub async fn build(self) -> Result<App, BuildError> {
        let config = self.config.clone();
        let coordinator = Arc::new(self.build_coordinator().await?);
        let commands = CommandService::new(coordinator.clone(), &config);
        Ok(App {
            coordinator,
            commands,
            config,
        })
    }
}

impl Default for MarqueeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// App はアプリケーション本体
pub struct App {
    pub coordinator: Arc<LifecycleCoordinator>,
    pub commands: CommandService,
    pub config: MarqueeConfig,
}

impl App {
    /// sweep / publish ループを起動
    pub fn spawn_background(&self) -> Background {
        Background::spawn(self.coordinator.clone(), &self.config)
    }
}

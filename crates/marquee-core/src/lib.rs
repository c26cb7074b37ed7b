//! marquee-core
//!
//! Core building blocks for the Marquee movie-night engine.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, item, list, card, errors）
//! - **ports**: 抽象化レイヤー（DocumentStore, MovieLookup, Confirmer, DisplayChannel, Clock）
//! - **lists**: 3 つのリスト（Catalog, Schedule, Archive）とタイムゾーン表
//! - **app**: アプリケーションロジック（builder, coordinator, commands, sweep_loop, publish_loop）
//! - **impls**: 実装（JsonFileStore と、テスト・開発用の in-memory 実装）
//! - **render**: カード描画
//! - **config**: 実行時設定（YAML）
//! - **observability**: tracing の初期化

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod lists;
pub mod observability;
pub mod ports;
pub mod render;

pub use crate::app::{App, Command, CommandContext, LifecycleCoordinator, MarqueeBuilder, Reply};
pub use crate::config::MarqueeConfig;
pub use crate::domain::{ActorId, ListKind, MarqueeError};

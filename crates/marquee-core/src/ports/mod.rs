//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は外部の協調者（永続化ストア, 作品検索, 確認 UI, 表示チャネル）への
//! インターフェースを提供し、実装の詳細を隠蔽します。
//!
//! # 設計原則
//! - DocumentStore が source of truth（正本）
//! - メモリ上のリストはキャッシュで、保存に成功した変更だけが適用される
//! - 時刻は Clock から取る（テストで固定できるように）

pub mod clock;
pub mod confirm;
pub mod display;
pub mod lookup;
pub mod store;

// 主要な trait を再エクスポート
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::confirm::{Confirmation, Confirmer};
pub use self::display::{ChannelError, DisplayChannel, PostedMessage};
pub use self::lookup::{LookupError, LookupRecord, MovieLookup};
pub use self::store::{DocumentStore, StoreError, TimezoneMap};

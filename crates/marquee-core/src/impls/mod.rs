//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **JsonFileStore**: ディレクトリ上の JSON 文書（本番用の正本）
//! - **InMemoryStore**: テスト用の正本（障害注入つき）
//! - **InMemoryChannel**: テスト用の表示チャネル
//! - **StaticLookup / ScriptedConfirmer**: 検索・確認の固定実装
//!
//! 実際のチャットプラットフォームや作品データベースへの接続は
//! このクレートの外で ports を実装する。

pub mod inmem_channel;
pub mod inmem_store;
pub mod json_store;
pub mod static_lookup;

// 主要な型を再エクスポート
pub use self::inmem_channel::{ChannelMessage, InMemoryChannel};
pub use self::inmem_store::InMemoryStore;
pub use self::json_store::JsonFileStore;
pub use self::static_lookup::{ScriptedConfirmer, StaticLookup};

//! App - アプリケーション層
//!
//! このモジュールは、ports と lists を組み合わせてアプリケーションロジックを実装します。
//!
//! # 主要コンポーネント
//! - **MarqueeBuilder**: アプリケーションの構築とワイヤリング
//! - **LifecycleCoordinator**: リストをまたぐ遷移（推薦, 予定, 視聴済み, sweep）
//! - **CommandService**: コマンド面（権限判定と返信への変換）
//! - **SweepLoop**: 予定時刻が来た項目の移動
//! - **PublishLoop**: 表示チャネルへの要約の反映
//! - **Background**: 2 つのループの起動と停止

pub mod background;
pub mod builder;
pub mod commands;
pub mod coordinator;
pub mod publish_loop;
pub mod sweep_loop;

// 主要な型を再エクスポート
pub use self::background::Background;
pub use self::builder::{App, BuildError, MarqueeBuilder};
pub use self::commands::{Command, CommandContext, CommandService, Reply};
pub use self::coordinator::{LifecycleCoordinator, Proposed, Watched, WatchedFrom};
pub use self::publish_loop::{PublishError, PublishLoop, Published};
pub use self::sweep_loop::SweepLoop;

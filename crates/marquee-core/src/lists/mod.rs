//! Lists - 3 つのリストとタイムゾーン表
//!
//! 各リストは `ListCell` に包まれ、専用のロックの下でのみ読み書きされる。
//! リスト単体のルール（容量, 投票, 重複, 時刻）はここで守り、
//! リストをまたぐ遷移は `app::LifecycleCoordinator` が担う。

pub mod archive;
pub mod catalog;
pub mod cell;
pub mod schedule;
pub mod timezones;

pub use self::archive::{Archive, ArchiveList};
pub use self::catalog::{Catalog, CatalogList, DEFAULT_CAPACITY, Proposal};
pub use self::cell::{ListCell, ListDocument, ListGuard, commit_pair};
pub use self::schedule::{Schedule, ScheduleList, TIME_FORMAT, parse_local_time, parse_timezone};
pub use self::timezones::{TimezoneBook, TimezoneTable};

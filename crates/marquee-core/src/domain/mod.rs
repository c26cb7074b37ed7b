//! Domain model (ids, items, list kinds, cards, errors).
//!
//! I/O を持たない純粋な型だけを置く。

pub mod card;
pub mod errors;
pub mod ids;
pub mod item;
pub mod list;

pub use self::card::{Card, CardField};
pub use self::errors::{ErrorKind, MarqueeError};
pub use self::ids::{ActorId, MessageId};
pub use self::item::{ArchiveEntry, CatalogEntry, Item, ScheduleEntry, same_title};
pub use self::list::ListKind;

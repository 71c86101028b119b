pub mod prelude;

pub mod pool;
pub mod entry;
pub mod exclude;
pub mod wishlist_item;

mod manual;

pub use manual::missing_relations::{DrawTargetLink, ExcludedEntriesLink, ExcludingEntriesLink};

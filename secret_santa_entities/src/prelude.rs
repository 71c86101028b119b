pub use crate::domain::{
    entity::{LoadEntity, PoolEntity},
    entry::{Entry, EntryError, WishlistChange},
    pool::Pool,
    wishlist_item::WishlistItem,
};
pub use crate::validation::{EntryField, EntryValidator, ValidationGroup, Violation};

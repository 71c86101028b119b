pub mod entity;
pub mod pool;
pub mod entry;
pub mod wishlist_item;

pub use entity::{PoolEntity, LoadEntity};

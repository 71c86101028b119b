pub use super::entry::Entity as Entry;
pub use super::exclude::Entity as Exclude;
pub use super::pool::Entity as Pool;
pub use super::wishlist_item::Entity as WishlistItem;

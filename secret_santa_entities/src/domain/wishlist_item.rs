use itertools::Itertools;
use sea_orm::{prelude::*, QueryOrder};
use secret_santa_macros::SimpleEntity;
use serde::{Serialize, Deserialize};

use crate::schema;


/// One line of a participant's wishlist. Items are shown ordered by `rank`.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Default, SimpleEntity)]
#[module_path = "crate::schema::wishlist_item"]
#[get_many_pools_func = "get_many_pools_of_items"]
pub struct WishlistItem {
    pub id: Option<i32>,
    pub entry_id: Option<i32>,
    pub rank: i32,
    pub description: String,
}

impl WishlistItem {
    pub fn new(rank: i32, description: impl Into<String>) -> Self {
        WishlistItem {
            id: None,
            entry_id: None,
            rank,
            description: description.into(),
        }
    }

    /// Two saved items are matched by id. If either side is unsaved, rank and description
    /// decide, so a copy taken before the save still matches the stored item.
    /// The owning entry is never part of the comparison.
    pub fn is_same_item(&self, other: &WishlistItem) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            _ => self.rank == other.rank && self.description == other.description,
        }
    }

    pub async fn get_all_for_entry<C>(db: &C, entry_id: i32) -> Result<Vec<WishlistItem>, DbErr> where C: ConnectionTrait {
        let items = schema::wishlist_item::Entity::find()
            .filter(schema::wishlist_item::Column::EntryId.eq(entry_id))
            .order_by_asc(schema::wishlist_item::Column::Rank)
            .order_by_asc(schema::wishlist_item::Column::Id)
            .all(db).await?;
        Ok(items.into_iter().map(Self::from_model).collect())
    }

    async fn get_many_pools_of_items<C>(db: &C, entities: &Vec<&Self>) -> Result<Vec<Option<i32>>, DbErr> where C: ConnectionTrait {
        let entry_ids = entities.iter().filter_map(|item| item.entry_id).unique().collect_vec();
        let entries = schema::entry::Entity::find()
            .filter(schema::entry::Column::Id.is_in(entry_ids))
            .all(db).await?;

        Ok(entities.iter().map(|item| {
            item.entry_id.and_then(|entry_id| {
                entries.iter().find(|entry| entry.id == entry_id).map(|entry| entry.pool_id)
            })
        }).collect())
    }
}


#[test]
fn test_saved_items_are_compared_by_id() {
    let a = WishlistItem { id: Some(1), entry_id: Some(5), rank: 1, description: "Socks".into() };
    let b = WishlistItem { id: Some(1), entry_id: None, rank: 3, description: "Warm socks".into() };
    let c = WishlistItem { id: Some(2), entry_id: Some(5), rank: 1, description: "Socks".into() };

    assert!(a.is_same_item(&b));
    assert!(!a.is_same_item(&c));
}

#[test]
fn test_unsaved_items_are_compared_by_content() {
    let a = WishlistItem::new(1, "Book");
    let mut b = WishlistItem::new(1, "Book");
    b.entry_id = Some(4);

    assert!(a.is_same_item(&b));
    assert!(!a.is_same_item(&WishlistItem::new(2, "Book")));
}

#[test]
fn test_unsaved_copy_matches_saved_item() {
    let copy = WishlistItem::new(1, "Book");
    let saved = WishlistItem { id: Some(9), entry_id: Some(4), ..copy.clone() };

    assert!(copy.is_same_item(&saved));
    assert!(saved.is_same_item(&copy));
    assert!(!saved.is_same_item(&WishlistItem::new(1, "Other book")));
}

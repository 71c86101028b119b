use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use itertools::Itertools;
use sea_orm::{prelude::*, sea_query::Expr, ActiveValue, Condition, QueryOrder, TransactionTrait};
use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::{schema, utilities::{generate_access_token, BatchLoad}};

use super::{entity::LoadEntity, wishlist_item::WishlistItem, PoolEntity};


#[derive(Debug, Error)]
pub enum EntryError {
    #[error(transparent)]
    DbErr(#[from] DbErr),
    #[error("Entry {0} does not exist")]
    EntryDoesNotExist(i32),
    #[error("Pool {0} does not exist")]
    PoolDoesNotExist(i32),
}

/// Result of replacing the wishlist text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WishlistChange {
    Changed,
    Unchanged,
}

impl WishlistChange {
    pub fn is_changed(&self) -> bool {
        *self == WishlistChange::Changed
    }
}

/// A participant of a pool.
///
/// Relations to other entries are kept as ids: `draw_target_id` is the entry this participant
/// gives a present to, `excluded_entries` are the entries they must not draw.
///
/// `wishlist_updated` is raised by every change to the wishlist text or to the set of wishlist
/// items. Only [`Entry::acknowledge_wishlist_update`] (or an explicit
/// [`Entry::set_wishlist_updated`]) lowers it again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    id: Option<i32>,
    pool_id: i32,
    name: String,
    email: String,
    draw_target_id: Option<i32>,
    excluded_entries: BTreeSet<i32>,
    wishlist: Option<String>,
    wishlist_updated: bool,
    wishlist_items: Vec<WishlistItem>,
    /// Items removed since the entry was constructed or loaded. Never persisted.
    #[serde(skip)]
    removed_wishlist_items: Vec<WishlistItem>,
    viewdate: Option<DateTime>,
    view_reminder_sent_time: Option<DateTime>,
    update_wishlist_reminder_sent_time: Option<DateTime>,
    url: Option<String>,
    pool_admin: bool,
    ip: Option<String>,
}

impl Entry {
    pub fn new(pool_id: i32, name: impl Into<String>, email: impl Into<String>) -> Self {
        let mut entry = Entry {
            id: None,
            pool_id,
            name: name.into(),
            email: email.into(),
            draw_target_id: None,
            excluded_entries: BTreeSet::new(),
            wishlist: None,
            wishlist_updated: false,
            wishlist_items: vec![],
            removed_wishlist_items: vec![],
            viewdate: None,
            view_reminder_sent_time: None,
            update_wishlist_reminder_sent_time: None,
            url: None,
            pool_admin: false,
            ip: None,
        };
        entry.on_load();
        entry
    }

    /// The administrator entry created together with a pool.
    pub fn new_pool_admin(pool_id: i32, name: impl Into<String>, email: impl Into<String>) -> Self {
        let mut entry = Self::new(pool_id, name, email);
        entry.pool_admin = true;
        entry.generate_url();
        entry
    }

    #[cfg(test)]
    pub(crate) fn with_id(mut self, id: i32) -> Self {
        self.id = Some(id);
        self
    }

    /// Runs after construction and after every load from the database.
    pub fn on_load(&mut self) {
        self.removed_wishlist_items = vec![];
    }

    pub fn id(&self) -> Option<i32> {
        self.id
    }

    pub fn pool_id(&self) -> i32 {
        self.pool_id
    }

    pub fn set_pool_id(&mut self, pool_id: i32) -> &mut Self {
        self.pool_id = pool_id;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn set_email(&mut self, email: impl Into<String>) -> &mut Self {
        self.email = email.into();
        self
    }

    pub fn draw_target_id(&self) -> Option<i32> {
        self.draw_target_id
    }

    pub fn set_draw_target_id(&mut self, draw_target_id: Option<i32>) -> &mut Self {
        self.draw_target_id = draw_target_id;
        self
    }

    pub fn excluded_entries(&self) -> &BTreeSet<i32> {
        &self.excluded_entries
    }

    pub fn add_excluded_entry(&mut self, entry_id: i32) -> &mut Self {
        self.excluded_entries.insert(entry_id);
        self
    }

    pub fn remove_excluded_entry(&mut self, entry_id: i32) -> &mut Self {
        self.excluded_entries.remove(&entry_id);
        self
    }

    pub fn wishlist(&self) -> Option<&str> {
        self.wishlist.as_deref()
    }

    /// Stores the new text. If it differs from the stored one the wishlist is flagged as updated.
    pub fn set_wishlist(&mut self, wishlist: Option<String>) -> WishlistChange {
        let change = if self.wishlist != wishlist {
            self.mark_wishlist_updated();
            WishlistChange::Changed
        }
        else {
            WishlistChange::Unchanged
        };

        self.wishlist = wishlist;
        change
    }

    pub fn wishlist_updated(&self) -> bool {
        self.wishlist_updated
    }

    pub fn set_wishlist_updated(&mut self, wishlist_updated: bool) -> &mut Self {
        self.wishlist_updated = wishlist_updated;
        self
    }

    pub fn mark_wishlist_updated(&mut self) -> &mut Self {
        self.wishlist_updated = true;
        self
    }

    /// Called once the giver of this entry has been told about the new wishlist.
    pub fn acknowledge_wishlist_update(&mut self, notified_at: DateTime) -> &mut Self {
        self.wishlist_updated = false;
        self.update_wishlist_reminder_sent_time = Some(notified_at);
        self
    }

    /// Wishlist items, ordered by rank.
    pub fn wishlist_items(&self) -> &[WishlistItem] {
        &self.wishlist_items
    }

    pub fn set_wishlist_items(&mut self, mut wishlist_items: Vec<WishlistItem>) -> &mut Self {
        wishlist_items.sort_by_key(|item| item.rank);
        self.wishlist_items = wishlist_items;
        self
    }

    pub fn removed_wishlist_items(&self) -> &[WishlistItem] {
        &self.removed_wishlist_items
    }

    /// Adds the item (replacing an equal one) and cancels a pending removal of it.
    ///
    /// The back-reference is set to this entry's id. For unsaved entries it stays empty
    /// until the entry is saved.
    pub fn add_wishlist_item(&mut self, mut item: WishlistItem) -> &mut Self {
        if item.id.is_none() {
            item.id = self.removed_wishlist_items.iter()
                .chain(self.wishlist_items.iter())
                .filter(|other| other.is_same_item(&item))
                .find_map(|other| other.id);
        }

        self.removed_wishlist_items.retain(|removed| !removed.is_same_item(&item));
        item.entry_id = self.id;

        self.wishlist_items.retain(|existing| !existing.is_same_item(&item));
        let position = self.wishlist_items.partition_point(|existing| existing.rank <= item.rank);
        self.wishlist_items.insert(position, item);

        self.mark_wishlist_updated()
    }

    /// Detaches the item. Saved items are deleted on the next save.
    /// Items that are not part of the wishlist leave the entry untouched.
    pub fn remove_wishlist_item(&mut self, item: &WishlistItem) -> &mut Self {
        let Some(position) = self.wishlist_items.iter().position(|existing| existing.is_same_item(item)) else {
            return self;
        };

        let mut removed = self.wishlist_items.remove(position);
        removed.entry_id = None;
        if !self.removed_wishlist_items.iter().any(|other| other.is_same_item(&removed)) {
            self.removed_wishlist_items.push(removed);
        }

        self.mark_wishlist_updated()
    }

    pub fn viewdate(&self) -> Option<DateTime> {
        self.viewdate
    }

    pub fn set_viewdate(&mut self, viewdate: Option<DateTime>) -> &mut Self {
        self.viewdate = viewdate;
        self
    }

    pub fn view_reminder_sent_time(&self) -> Option<DateTime> {
        self.view_reminder_sent_time
    }

    pub fn set_view_reminder_sent_time(&mut self, view_reminder_sent_time: Option<DateTime>) -> &mut Self {
        self.view_reminder_sent_time = view_reminder_sent_time;
        self
    }

    pub fn update_wishlist_reminder_sent_time(&self) -> Option<DateTime> {
        self.update_wishlist_reminder_sent_time
    }

    pub fn set_update_wishlist_reminder_sent_time(&mut self, update_wishlist_reminder_sent_time: Option<DateTime>) -> &mut Self {
        self.update_wishlist_reminder_sent_time = update_wishlist_reminder_sent_time;
        self
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn set_url(&mut self, url: Option<String>) -> &mut Self {
        self.url = url;
        self
    }

    /// Replaces the access token with a fresh random one.
    pub fn generate_url(&mut self) -> &mut Self {
        self.url = Some(generate_access_token());
        self
    }

    /// Personal link of the participant. `base` should end with a slash.
    pub fn access_link(&self, base: &Url) -> Option<Url> {
        self.url.as_ref().and_then(|token| base.join(&format!("entry/{}", token)).ok())
    }

    pub fn is_pool_admin(&self) -> bool {
        self.pool_admin
    }

    pub fn set_pool_admin(&mut self, pool_admin: bool) -> &mut Self {
        self.pool_admin = pool_admin;
        self
    }

    pub fn ip(&self) -> Option<&str> {
        self.ip.as_deref()
    }

    pub fn set_ip(&mut self, ip: Option<String>) -> &mut Self {
        self.ip = ip;
        self
    }
}

impl Entry {
    pub async fn get_all_in_pool<C>(db: &C, pool_id: i32) -> Result<Vec<Entry>, DbErr> where C: ConnectionTrait {
        let entries = schema::entry::Entity::find()
            .filter(schema::entry::Column::PoolId.eq(pool_id))
            .order_by_asc(schema::entry::Column::Id)
            .all(db).await?;
        Self::load_entries(db, entries).await
    }

    pub async fn get_by_url<C>(db: &C, url: &str) -> Result<Option<Entry>, DbErr> where C: ConnectionTrait {
        let entry = schema::entry::Entity::find()
            .filter(schema::entry::Column::Url.eq(url))
            .one(db).await?;

        match entry {
            Some(entry) => Ok(Self::load_entries(db, vec![entry]).await?.pop()),
            None => Ok(None)
        }
    }

    pub async fn get_draw_target<C>(&self, db: &C) -> Result<Option<Entry>, DbErr> where C: ConnectionTrait {
        let Some(id) = self.id else {
            return Ok(None);
        };
        let target = schema::entry::Entity::find_by_id(id)
            .find_also_linked(schema::DrawTargetLink)
            .one(db).await?
            .and_then(|(_, target)| target);

        match target {
            Some(target) => Ok(Self::load_entries(db, vec![target]).await?.pop()),
            None => Ok(None)
        }
    }

    /// The entry that has drawn this one.
    pub async fn get_giver<C>(&self, db: &C) -> Result<Option<Entry>, DbErr> where C: ConnectionTrait {
        let Some(id) = self.id else {
            return Ok(None);
        };
        let giver = schema::entry::Entity::find()
            .filter(schema::entry::Column::EntryId.eq(id))
            .one(db).await?;

        match giver {
            Some(giver) => Ok(Self::load_entries(db, vec![giver]).await?.pop()),
            None => Ok(None)
        }
    }

    /// Entries this one excludes, as currently stored in the database.
    pub async fn get_excluded_entries<C>(&self, db: &C) -> Result<Vec<Entry>, DbErr> where C: ConnectionTrait {
        self.load_linked(db, schema::ExcludedEntriesLink).await
    }

    /// Entries that exclude this one, as currently stored in the database.
    pub async fn get_excluding_entries<C>(&self, db: &C) -> Result<Vec<Entry>, DbErr> where C: ConnectionTrait {
        self.load_linked(db, schema::ExcludingEntriesLink).await
    }

    async fn load_linked<C, L>(&self, db: &C, link: L) -> Result<Vec<Entry>, DbErr> where C: ConnectionTrait, L: sea_orm::Linked<FromEntity = schema::entry::Entity, ToEntity = schema::entry::Entity> + Send {
        let Some(id) = self.id else {
            return Ok(vec![]);
        };
        let Some(model) = schema::entry::Entity::find_by_id(id).one(db).await? else {
            return Ok(vec![]);
        };

        let linked = model.find_linked(link)
            .order_by_asc(schema::entry::Column::Id)
            .all(db).await?;
        Self::load_entries(db, linked).await
    }

    pub(crate) async fn load_entries<C>(db: &C, entries: Vec<schema::entry::Model>) -> Result<Vec<Entry>, DbErr> where C: ConnectionTrait {
        let ids = entries.iter().map(|e| e.id).collect_vec();

        let mut excludes = schema::exclude::Entity::find()
            .filter(schema::exclude::Column::EntryId.is_in(ids.clone()))
            .all(db).await?
            .into_iter()
            .map(|e| (e.entry_id, e))
            .into_group_map();

        let mut items = schema::wishlist_item::Entity::find()
            .filter(schema::wishlist_item::Column::EntryId.is_in(ids))
            .order_by_asc(schema::wishlist_item::Column::Rank)
            .order_by_asc(schema::wishlist_item::Column::Id)
            .all(db).await?
            .into_iter()
            .filter_map(|item| item.entry_id.map(|entry_id| (entry_id, item)))
            .into_group_map();

        Ok(entries.into_iter().map(|entry| {
            let entry_excludes = excludes.remove(&entry.id).unwrap_or_default();
            let entry_items = items.remove(&entry.id).unwrap_or_default();
            Self::from_rows(entry, entry_excludes, entry_items)
        }).collect())
    }

    fn from_rows(entry: schema::entry::Model, excludes: Vec<schema::exclude::Model>, items: Vec<schema::wishlist_item::Model>) -> Self {
        let mut out = Entry {
            id: Some(entry.id),
            pool_id: entry.pool_id,
            name: entry.name,
            email: entry.email,
            draw_target_id: entry.entry_id,
            excluded_entries: excludes.into_iter().map(|e| e.excluded_entry_id).collect(),
            wishlist: entry.wishlist,
            wishlist_updated: entry.wishlist_updated.unwrap_or(false),
            wishlist_items: items.into_iter().map(WishlistItem::from_model).sorted_by_key(|item| item.rank).collect(),
            removed_wishlist_items: vec![],
            viewdate: entry.viewdate,
            view_reminder_sent_time: entry.view_reminder_sent_time,
            update_wishlist_reminder_sent_time: entry.update_wishlist_reminder_sent_time,
            url: entry.url,
            pool_admin: entry.pool_admin,
            ip: entry.ip,
        };
        out.on_load();
        out
    }

    fn to_active_model(&self) -> schema::entry::ActiveModel {
        schema::entry::ActiveModel {
            id: match self.id {
                Some(id) => ActiveValue::Unchanged(id),
                None => ActiveValue::NotSet
            },
            pool_id: ActiveValue::Set(self.pool_id),
            name: ActiveValue::Set(self.name.clone()),
            email: ActiveValue::Set(self.email.clone()),
            entry_id: ActiveValue::Set(self.draw_target_id),
            wishlist: ActiveValue::Set(self.wishlist.clone()),
            viewdate: ActiveValue::Set(self.viewdate),
            view_reminder_sent_time: ActiveValue::Set(self.view_reminder_sent_time),
            url: ActiveValue::Set(self.url.clone()),
            wishlist_updated: ActiveValue::Set(Some(self.wishlist_updated)),
            update_wishlist_reminder_sent_time: ActiveValue::Set(self.update_wishlist_reminder_sent_time),
            pool_admin: ActiveValue::Set(self.pool_admin),
            ip: ActiveValue::Set(self.ip.clone()),
        }
    }

    /// Deletes the entry together with its exclusions and wishlist items.
    /// Entries that have drawn it lose their draw target.
    pub async fn delete<C>(db: &C, id: i32) -> Result<(), EntryError> where C: ConnectionTrait + TransactionTrait {
        let transaction = db.begin().await?;

        if schema::entry::Entity::find_by_id(id).one(&transaction).await?.is_none() {
            return Err(EntryError::EntryDoesNotExist(id));
        }
        Self::delete_rows(&transaction, vec![id]).await?;

        transaction.commit().await?;
        info!(entry_id = id, "Deleted entry");

        Ok(())
    }

    /// Runs inside the caller's transaction.
    pub(crate) async fn delete_rows<C>(db: &C, ids: Vec<i32>) -> Result<(), DbErr> where C: ConnectionTrait {
        if ids.is_empty() {
            return Ok(());
        }

        schema::entry::Entity::update_many()
            .col_expr(schema::entry::Column::EntryId, Expr::value(Option::<i32>::None))
            .filter(schema::entry::Column::EntryId.is_in(ids.clone()))
            .exec(db).await?;

        schema::exclude::Entity::delete_many()
            .filter(
                Condition::any()
                    .add(schema::exclude::Column::EntryId.is_in(ids.clone()))
                    .add(schema::exclude::Column::ExcludedEntryId.is_in(ids.clone()))
            )
            .exec(db).await?;

        schema::wishlist_item::Entity::delete_many()
            .filter(schema::wishlist_item::Column::EntryId.is_in(ids.clone()))
            .exec(db).await?;

        schema::entry::Entity::delete_many()
            .filter(schema::entry::Column::Id.is_in(ids))
            .exec(db).await?;

        Ok(())
    }
}

#[async_trait]
impl LoadEntity for Entry {
    async fn try_get_many<C>(db: &C, ids: Vec<i32>) -> Result<Vec<Option<Self>>, DbErr> where C: ConnectionTrait {
        let entries = schema::entry::Entity::batch_load(db, ids.clone()).await?;
        let loaded = Self::load_entries(db, entries.into_iter().flatten().collect()).await?;
        let mut loaded : HashMap<i32, Entry> = loaded.into_iter().filter_map(|e| e.id.map(|id| (id, e))).collect();

        Ok(ids.into_iter().map(|id| loaded.remove(&id)).collect())
    }
}

#[async_trait]
impl PoolEntity for Entry {
    async fn save<C>(&mut self, db: &C) -> Result<(), DbErr> where C: ConnectionTrait + TransactionTrait {
        let transaction = db.begin().await?;

        let model = self.to_active_model();
        let saved = match self.id {
            Some(_) => model.update(&transaction).await?,
            None => model.insert(&transaction).await?
        };
        let id = saved.id;

        let existing_excludes : BTreeSet<i32> = schema::exclude::Entity::find()
            .filter(schema::exclude::Column::EntryId.eq(id))
            .all(&transaction).await?
            .into_iter()
            .map(|e| e.excluded_entry_id)
            .collect();

        let deleted_excludes = existing_excludes.difference(&self.excluded_entries).cloned().collect_vec();
        if !deleted_excludes.is_empty() {
            schema::exclude::Entity::delete_many()
                .filter(schema::exclude::Column::EntryId.eq(id))
                .filter(schema::exclude::Column::ExcludedEntryId.is_in(deleted_excludes))
                .exec(&transaction).await?;
        }

        let new_excludes = self.excluded_entries.difference(&existing_excludes).map(|excluded_entry_id| {
            schema::exclude::ActiveModel {
                entry_id: ActiveValue::Set(id),
                excluded_entry_id: ActiveValue::Set(*excluded_entry_id),
            }
        }).collect_vec();
        if !new_excludes.is_empty() {
            schema::exclude::Entity::insert_many(new_excludes).exec(&transaction).await?;
        }

        let removed_item_ids = self.removed_wishlist_items.iter().filter_map(|item| item.id).collect_vec();
        if !removed_item_ids.is_empty() {
            schema::wishlist_item::Entity::delete_many()
                .filter(schema::wishlist_item::Column::Id.is_in(removed_item_ids))
                .exec(&transaction).await?;
        }

        let mut items = self.wishlist_items.clone();
        for item in items.iter_mut() {
            item.entry_id = Some(id);
            item.save(&transaction).await?;
        }

        transaction.commit().await?;

        self.id = Some(id);
        self.wishlist_items = items;
        self.removed_wishlist_items.clear();

        debug!(entry_id = id, pool_id = self.pool_id, num_items = self.wishlist_items.len(), "Saved entry");

        Ok(())
    }

    async fn get_many_pools<C>(_db: &C, entities: &Vec<&Self>) -> Result<Vec<Option<i32>>, DbErr> where C: ConnectionTrait {
        Ok(entities.iter().map(|entry| Some(entry.pool_id)).collect())
    }
}

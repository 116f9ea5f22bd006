use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, watch};
use tracing::{debug, warn};

use traxlio_types::{
    Activity, ActivityAction, BoxUpdate, InventoryDocument, Item, ItemUpdate, NewBox, NewItem,
    NewRoom, ResourceKind, Room, RoomUpdate, Share, StorageBox,
};

use crate::activity;
use crate::backend::{BackendKind, InventoryBackend};
use crate::error::{InventoryError, Result};
use crate::moves::{self, MoveOutcome, MoveTarget};
use crate::search::{self, SearchHit};
use crate::share::{self, MAX_TOKEN_ATTEMPTS, SharedView};
use crate::sort::{self, Direction, RoomSort};
use crate::stats::InventoryStats;
use crate::validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Uninitialized,
    Loading,
    Ready,
}

struct Cache {
    state: LoadState,
    doc: InventoryDocument,
    /// Ticket of the load whose result `doc` reflects.
    applied: u64,
}

/// Inventory facade: one backend for writes, one cached document for reads.
///
/// Every mutation writes through the backend, appends an activity record,
/// patches the cache right away and then reloads the whole document. Loads
/// are ticketed so a slow earlier load never replaces a newer result.
pub struct Inventory {
    backend: Arc<dyn InventoryBackend>,
    cache: RwLock<Cache>,
    next_ticket: AtomicU64,
    updates: watch::Sender<Arc<InventoryDocument>>,
}

impl Inventory {
    pub fn new(backend: Arc<dyn InventoryBackend>) -> Self {
        let (updates, _) = watch::channel(Arc::new(InventoryDocument::default()));
        Self {
            backend,
            cache: RwLock::new(Cache {
                state: LoadState::Uninitialized,
                doc: InventoryDocument::default(),
                applied: 0,
            }),
            next_ticket: AtomicU64::new(0),
            updates,
        }
    }

    /// Build and load in one step.
    pub async fn open(backend: Arc<dyn InventoryBackend>) -> Result<Self> {
        let inventory = Self::new(backend);
        inventory.load().await?;
        Ok(inventory)
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    pub async fn state(&self) -> LoadState {
        self.cache.read().await.state
    }

    /// Receives a fresh copy of the document after every load and mutation.
    pub fn subscribe(&self) -> watch::Receiver<Arc<InventoryDocument>> {
        self.updates.subscribe()
    }

    /// Fetch the full document and replace the cache.
    pub async fn load(&self) -> Result<()> {
        let ticket = self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut cache = self.cache.write().await;
            if cache.state == LoadState::Uninitialized {
                cache.state = LoadState::Loading;
            }
        }

        let result = self.backend.load().await;

        let mut cache = self.cache.write().await;
        let doc = match result {
            Ok(doc) => doc,
            Err(e) => {
                if cache.state == LoadState::Loading {
                    cache.state = LoadState::Uninitialized;
                }
                return Err(e);
            }
        };
        if ticket <= cache.applied {
            debug!(ticket, applied = cache.applied, "Discarding stale load");
            return Ok(());
        }

        cache.doc = doc;
        cache.applied = ticket;
        cache.state = LoadState::Ready;
        self.updates.send_replace(Arc::new(cache.doc.clone()));
        debug!(ticket, "Inventory cache replaced");
        Ok(())
    }

    /// Reload after a write that already succeeded; a failure keeps the
    /// patched cache.
    async fn refresh(&self) {
        if let Err(e) = self.load().await {
            warn!("Reload after write failed: {}", e);
        }
    }

    /// Log `activity`, patch the cache with `f`, then reconcile.
    async fn commit<F>(&self, activity: Option<Activity>, f: F) -> Result<()>
    where
        F: FnOnce(&mut InventoryDocument) + Send,
    {
        if let Some(activity) = &activity {
            self.backend.record_activity(activity.clone()).await?;
        }
        {
            let mut cache = self.cache.write().await;
            f(&mut cache.doc);
            if let Some(activity) = activity {
                cache.doc.push_activity(activity);
            }
            self.updates.send_replace(Arc::new(cache.doc.clone()));
        }
        self.refresh().await;
        Ok(())
    }

    async fn read<T>(&self, f: impl FnOnce(&InventoryDocument) -> T) -> T {
        f(&self.cache.read().await.doc)
    }

    // -- Reads --

    pub async fn snapshot(&self) -> InventoryDocument {
        self.read(|doc| doc.clone()).await
    }

    pub async fn rooms(&self) -> Vec<Room> {
        self.read(|doc| doc.rooms.clone()).await
    }

    pub async fn room(&self, id: &str) -> Option<Room> {
        self.read(|doc| doc.room(id).cloned()).await
    }

    pub async fn storage_box(&self, id: &str) -> Option<StorageBox> {
        self.read(|doc| doc.storage_box(id).cloned()).await
    }

    pub async fn item(&self, id: &str) -> Option<Item> {
        self.read(|doc| doc.item(id).cloned()).await
    }

    pub async fn boxes_in_room(&self, room_id: &str) -> Vec<StorageBox> {
        self.read(|doc| doc.boxes_in_room(room_id).cloned().collect())
            .await
    }

    pub async fn items_in_box(&self, box_id: &str) -> Vec<Item> {
        self.read(|doc| doc.items_in_box(box_id).cloned().collect())
            .await
    }

    /// Newest first, at most `limit`.
    pub async fn recent_activities(&self, limit: usize) -> Vec<Activity> {
        self.read(|doc| doc.activities.iter().take(limit).cloned().collect())
            .await
    }

    pub async fn stats(&self) -> InventoryStats {
        self.read(InventoryStats::of).await
    }

    pub async fn search(&self, query: &str) -> Vec<SearchHit> {
        self.read(|doc| search::search(doc, query)).await
    }

    pub async fn filter_rooms(
        &self,
        query: &str,
        sort: RoomSort,
        direction: Direction,
    ) -> Vec<Room> {
        self.read(|doc| sort::filter_rooms(doc, query, sort, direction))
            .await
    }

    pub async fn move_targets(&self, current_box_id: &str) -> Vec<MoveTarget> {
        self.read(|doc| moves::move_targets(doc, current_box_id))
            .await
    }

    // -- Rooms --

    pub async fn create_room(&self, draft: NewRoom) -> Result<Room> {
        let draft = validate::new_room(draft)?;
        let room = self.backend.create_room(draft).await?;

        let entry = activity::record(
            ActivityAction::Create,
            ResourceKind::Room,
            &room.id,
            &room.name,
            None,
            Utc::now(),
        );
        let cached = room.clone();
        self.commit(Some(entry), move |doc| doc.rooms.push(cached))
            .await?;
        Ok(room)
    }

    /// Returns the room as cached afterwards; `None` if it is unknown.
    pub async fn update_room(&self, id: &str, update: RoomUpdate) -> Result<Option<Room>> {
        let update = validate::room_update(update)?;
        let previous = self.room(id).await;
        self.backend.update_room(id, update.clone()).await?;

        let now = Utc::now();
        let entry = previous.map(|prev| {
            let name = update.name.as_deref().unwrap_or(&prev.name);
            activity::record(ActivityAction::Update, ResourceKind::Room, id, name, None, now)
        });
        let target = id.to_string();
        self.commit(entry, move |doc| {
            if let Some(room) = doc.room_mut(&target) {
                update.apply(room, now);
            }
        })
        .await?;
        Ok(self.room(id).await)
    }

    /// Deletes the room with its boxes and their items.
    pub async fn delete_room(&self, id: &str) -> Result<()> {
        let previous = self.room(id).await;
        self.backend.delete_room(id).await?;

        let entry = previous.map(|prev| {
            activity::record(
                ActivityAction::Delete,
                ResourceKind::Room,
                id,
                &prev.name,
                None,
                Utc::now(),
            )
        });
        let target = id.to_string();
        self.commit(entry, move |doc| {
            doc.remove_room(&target);
        })
        .await
    }

    // -- Boxes --

    pub async fn create_box(&self, draft: NewBox) -> Result<StorageBox> {
        let draft = validate::new_box(draft)?;
        let room = self
            .room(&draft.room_id)
            .await
            .ok_or_else(|| InventoryError::not_found(ResourceKind::Room, &draft.room_id))?;
        let storage_box = self.backend.create_box(draft).await?;

        let entry = activity::record(
            ActivityAction::Create,
            ResourceKind::Box,
            &storage_box.id,
            &storage_box.name,
            Some(room.name),
            Utc::now(),
        );
        let cached = storage_box.clone();
        self.commit(Some(entry), move |doc| doc.boxes.push(cached))
            .await?;
        Ok(storage_box)
    }

    pub async fn update_box(&self, id: &str, update: BoxUpdate) -> Result<Option<StorageBox>> {
        let update = validate::box_update(update)?;
        if let Some(room_id) = &update.room_id {
            if self.room(room_id).await.is_none() {
                return Err(InventoryError::not_found(ResourceKind::Room, room_id));
            }
        }
        let (previous, parent) = self
            .read(|doc| {
                let previous = doc.storage_box(id).cloned();
                let parent = previous
                    .as_ref()
                    .and_then(|b| activity::box_parent(doc, b, update.room_id.as_deref()));
                (previous, parent)
            })
            .await;
        self.backend.update_box(id, update.clone()).await?;

        let now = Utc::now();
        let entry = previous.map(|prev| {
            let name = update.name.as_deref().unwrap_or(&prev.name);
            activity::record(ActivityAction::Update, ResourceKind::Box, id, name, parent, now)
        });
        let target = id.to_string();
        self.commit(entry, move |doc| {
            if let Some(storage_box) = doc.storage_box_mut(&target) {
                update.apply(storage_box, now);
            }
        })
        .await?;
        Ok(self.storage_box(id).await)
    }

    /// Deletes the box and its items.
    pub async fn delete_box(&self, id: &str) -> Result<()> {
        let (previous, parent) = self
            .read(|doc| {
                let previous = doc.storage_box(id).cloned();
                let parent = previous
                    .as_ref()
                    .and_then(|b| activity::room_name(doc, &b.room_id));
                (previous, parent)
            })
            .await;
        self.backend.delete_box(id).await?;

        let entry = previous.map(|prev| {
            activity::record(
                ActivityAction::Delete,
                ResourceKind::Box,
                id,
                &prev.name,
                parent,
                Utc::now(),
            )
        });
        let target = id.to_string();
        self.commit(entry, move |doc| {
            doc.remove_box(&target);
        })
        .await
    }

    // -- Items --

    pub async fn create_item(&self, box_id: &str, draft: NewItem) -> Result<Item> {
        let draft = validate::new_item(draft)?;
        let parent = self
            .storage_box(box_id)
            .await
            .ok_or_else(|| InventoryError::not_found(ResourceKind::Box, box_id))?;
        let item = self.backend.create_item(box_id, draft).await?;

        let entry = activity::record(
            ActivityAction::Create,
            ResourceKind::Item,
            &item.id,
            &item.name,
            Some(parent.name),
            Utc::now(),
        );
        let cached = item.clone();
        self.commit(Some(entry), move |doc| doc.items.push(cached))
            .await?;
        Ok(item)
    }

    /// A changed `box_id` is logged as a move naming the target box; any
    /// other change as an update.
    pub async fn update_item(&self, id: &str, update: ItemUpdate) -> Result<Option<Item>> {
        let update = validate::item_update(update)?;
        if let Some(box_id) = &update.box_id {
            if self.storage_box(box_id).await.is_none() {
                return Err(InventoryError::not_found(ResourceKind::Box, box_id));
            }
        }
        let (previous, classified) = self
            .read(|doc| {
                let previous = doc.item(id).cloned();
                let classified = previous.as_ref().map(|item| {
                    activity::classify_item_update(doc, item, update.box_id.as_deref())
                });
                (previous, classified)
            })
            .await;
        self.backend.update_item(id, update.clone()).await?;

        let now = Utc::now();
        let entry = previous.zip(classified).map(|(prev, (action, parent))| {
            let name = update.name.as_deref().unwrap_or(&prev.name);
            activity::record(action, ResourceKind::Item, id, name, parent, now)
        });
        let target = id.to_string();
        self.commit(entry, move |doc| {
            if let Some(item) = doc.item_mut(&target) {
                update.apply(item, now);
            }
        })
        .await?;
        Ok(self.item(id).await)
    }

    pub async fn delete_item(&self, id: &str) -> Result<()> {
        let (previous, parent) = self
            .read(|doc| {
                let previous = doc.item(id).cloned();
                let parent = previous
                    .as_ref()
                    .and_then(|i| activity::box_name(doc, &i.box_id));
                (previous, parent)
            })
            .await;
        self.backend.delete_item(id).await?;

        let entry = previous.map(|prev| {
            activity::record(
                ActivityAction::Delete,
                ResourceKind::Item,
                id,
                &prev.name,
                parent,
                Utc::now(),
            )
        });
        let target = id.to_string();
        self.commit(entry, move |doc| {
            doc.remove_item(&target);
        })
        .await
    }

    // -- Moves --

    pub async fn move_item(&self, item_id: &str, target_box_id: &str) -> Result<Option<Item>> {
        self.update_item(item_id, ItemUpdate::move_to(target_box_id))
            .await
    }

    /// Moves each item in turn. Failures are reported per item and do not
    /// stop or undo the rest of the batch.
    pub async fn bulk_move(&self, item_ids: &[String], target_box_id: &str) -> Vec<MoveOutcome> {
        let mut outcomes = Vec::with_capacity(item_ids.len());
        for item_id in item_ids {
            let result = self.move_item(item_id, target_box_id).await.map(|_| ());
            if let Err(e) = &result {
                warn!(item = %item_id, "Move failed: {}", e);
            }
            outcomes.push(MoveOutcome {
                item_id: item_id.clone(),
                result,
            });
        }
        outcomes
    }

    // -- Shares --

    pub async fn create_share(
        &self,
        kind: ResourceKind,
        resource_id: &str,
        is_public: bool,
    ) -> Result<Share> {
        self.create_expiring_share(kind, resource_id, is_public, None)
            .await
    }

    pub async fn create_expiring_share(
        &self,
        kind: ResourceKind,
        resource_id: &str,
        is_public: bool,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<Share> {
        let exists = self
            .read(|doc| match kind {
                ResourceKind::Room => doc.room(resource_id).is_some(),
                ResourceKind::Box => doc.storage_box(resource_id).is_some(),
                ResourceKind::Item => doc.item(resource_id).is_some(),
            })
            .await;
        if !exists {
            return Err(InventoryError::not_found(kind, resource_id));
        }

        let share = Share {
            id: self.unused_token().await?,
            kind,
            resource_id: resource_id.to_string(),
            is_public,
            created_at: Utc::now(),
            expires_at,
        };
        let stored = self.backend.create_share(share).await?;

        let cached = stored.clone();
        self.commit(None, move |doc| doc.shares.push(cached)).await?;
        Ok(stored)
    }

    async fn unused_token(&self) -> Result<String> {
        for _ in 0..MAX_TOKEN_ATTEMPTS {
            let token = share::generate_token();
            let cached = self.read(|doc| doc.share(&token).is_some()).await;
            if !cached && self.backend.find_share(&token).await?.is_none() {
                return Ok(token);
            }
            debug!("Share token collision, retrying");
        }
        Err(InventoryError::TokenExhausted {
            attempts: MAX_TOKEN_ATTEMPTS,
        })
    }

    /// Lookup without expiry checks: the cache first, then the backend.
    pub async fn share(&self, id: &str) -> Result<Option<Share>> {
        if let Some(share) = self.read(|doc| doc.share(id).cloned()).await {
            return Ok(Some(share));
        }
        self.backend.find_share(id).await
    }

    pub async fn delete_share(&self, id: &str) -> Result<()> {
        self.backend.delete_share(id).await?;
        let target = id.to_string();
        self.commit(None, move |doc| {
            doc.remove_share(&target);
        })
        .await
    }

    /// The view a share link opens, or `None` for unknown, expired or
    /// dangling shares.
    pub async fn resolve_share(&self, id: &str, now: DateTime<Utc>) -> Result<Option<SharedView>> {
        let Some(share) = self.share(id).await? else {
            return Ok(None);
        };
        Ok(self.read(|doc| share::resolve(doc, &share, now)).await)
    }
}

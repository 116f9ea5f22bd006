use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use traxlio_db::LocalStore;
use traxlio_types::{
    Activity, BoxUpdate, InventoryDocument, Item, ItemUpdate, NewBox, NewItem, NewRoom, Room,
    RoomUpdate, Share, StorageBox,
};

use super::{BackendKind, InventoryBackend};
use crate::error::Result;

/// The document store on this device. SQLite calls run on the blocking pool.
#[derive(Clone)]
pub struct LocalBackend {
    store: Arc<LocalStore>,
}

impl LocalBackend {
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self { store }
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&LocalStore) -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.store.clone();
        Ok(tokio::task::spawn_blocking(move || f(&store)).await??)
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[async_trait]
impl InventoryBackend for LocalBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    async fn load(&self) -> Result<InventoryDocument> {
        let doc = self.blocking(|store| Ok(store.read())).await?;
        debug!(
            rooms = doc.rooms.len(),
            boxes = doc.boxes.len(),
            items = doc.items.len(),
            "Loaded local inventory"
        );
        Ok(doc)
    }

    async fn create_room(&self, draft: NewRoom) -> Result<Room> {
        let now = Utc::now();
        let room = Room {
            id: new_id(),
            name: draft.name,
            description: draft.description,
            created_at: now,
            updated_at: now,
        };
        let stored = room.clone();
        self.blocking(move |store| store.add_room(stored)).await?;
        Ok(room)
    }

    async fn update_room(&self, id: &str, update: RoomUpdate) -> Result<()> {
        let id = id.to_string();
        self.blocking(move |store| store.update_room(&id, &update).map(|_| ()))
            .await
    }

    async fn delete_room(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.blocking(move |store| store.remove_room(&id).map(|_| ()))
            .await
    }

    async fn create_box(&self, draft: NewBox) -> Result<StorageBox> {
        let now = Utc::now();
        let storage_box = StorageBox {
            id: new_id(),
            room_id: draft.room_id,
            name: draft.name,
            description: draft.description,
            image: draft.image,
            created_at: now,
            updated_at: now,
        };
        let stored = storage_box.clone();
        self.blocking(move |store| store.add_box(stored)).await?;
        Ok(storage_box)
    }

    async fn update_box(&self, id: &str, update: BoxUpdate) -> Result<()> {
        let id = id.to_string();
        self.blocking(move |store| store.update_box(&id, &update).map(|_| ()))
            .await
    }

    async fn delete_box(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.blocking(move |store| store.remove_box(&id).map(|_| ()))
            .await
    }

    async fn create_item(&self, box_id: &str, draft: NewItem) -> Result<Item> {
        let now = Utc::now();
        let item = Item {
            id: new_id(),
            box_id: box_id.to_string(),
            name: draft.name,
            description: draft.description,
            quantity: draft.quantity,
            images: draft.images,
            tags: draft.tags,
            notes: draft.notes,
            created_at: now,
            updated_at: now,
        };
        let stored = item.clone();
        self.blocking(move |store| store.add_item(stored)).await?;
        Ok(item)
    }

    async fn update_item(&self, id: &str, update: ItemUpdate) -> Result<()> {
        let id = id.to_string();
        self.blocking(move |store| store.update_item(&id, &update).map(|_| ()))
            .await
    }

    async fn delete_item(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.blocking(move |store| store.remove_item(&id).map(|_| ()))
            .await
    }

    async fn create_share(&self, share: Share) -> Result<Share> {
        let stored = share.clone();
        self.blocking(move |store| store.add_share(stored)).await?;
        Ok(share)
    }

    async fn find_share(&self, id: &str) -> Result<Option<Share>> {
        let id = id.to_string();
        self.blocking(move |store| Ok(store.share(&id))).await
    }

    async fn delete_share(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.blocking(move |store| store.remove_share(&id).map(|_| ()))
            .await
    }

    async fn record_activity(&self, activity: Activity) -> Result<()> {
        self.blocking(move |store| store.add_activity(activity)).await
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use traxlio_db::LocalStore;
use traxlio_remote::RemoteStore;
use traxlio_types::{
    Activity, BoxUpdate, InventoryDocument, Item, ItemUpdate, NewBox, NewItem, NewRoom, Room,
    RoomUpdate, Share, StorageBox,
};

use super::{BackendKind, InventoryBackend};
use crate::error::Result;

/// The hosted backend, with the local store as the read fallback.
pub struct RemoteBackend {
    remote: RemoteStore,
    fallback: Arc<LocalStore>,
}

impl RemoteBackend {
    pub fn new(remote: RemoteStore, fallback: Arc<LocalStore>) -> Self {
        Self { remote, fallback }
    }

    async fn read_fallback(&self) -> Result<InventoryDocument> {
        let store = self.fallback.clone();
        Ok(tokio::task::spawn_blocking(move || store.read()).await?)
    }
}

#[async_trait]
impl InventoryBackend for RemoteBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }

    async fn load(&self) -> Result<InventoryDocument> {
        match self.remote.fetch_document().await {
            Ok(doc) => {
                debug!(
                    rooms = doc.rooms.len(),
                    boxes = doc.boxes.len(),
                    items = doc.items.len(),
                    "Loaded remote inventory"
                );
                Ok(doc)
            }
            Err(e) => {
                warn!("Remote load failed, reading local store instead: {}", e);
                self.read_fallback().await
            }
        }
    }

    async fn create_room(&self, draft: NewRoom) -> Result<Room> {
        Ok(self.remote.insert_room(&draft).await?)
    }

    async fn update_room(&self, id: &str, update: RoomUpdate) -> Result<()> {
        Ok(self.remote.update_room(id, &update).await?)
    }

    async fn delete_room(&self, id: &str) -> Result<()> {
        Ok(self.remote.delete_room(id).await?)
    }

    async fn create_box(&self, draft: NewBox) -> Result<StorageBox> {
        Ok(self.remote.insert_box(&draft).await?)
    }

    async fn update_box(&self, id: &str, update: BoxUpdate) -> Result<()> {
        Ok(self.remote.update_box(id, &update).await?)
    }

    async fn delete_box(&self, id: &str) -> Result<()> {
        Ok(self.remote.delete_box(id).await?)
    }

    async fn create_item(&self, box_id: &str, draft: NewItem) -> Result<Item> {
        Ok(self.remote.insert_item(box_id, &draft).await?)
    }

    async fn update_item(&self, id: &str, update: ItemUpdate) -> Result<()> {
        Ok(self.remote.update_item(id, &update).await?)
    }

    async fn delete_item(&self, id: &str) -> Result<()> {
        Ok(self.remote.delete_item(id).await?)
    }

    async fn create_share(&self, share: Share) -> Result<Share> {
        Ok(self.remote.insert_share(&share).await?)
    }

    /// Shares made before signing in only exist locally, so a miss (or a
    /// failed lookup) falls through to the local store.
    async fn find_share(&self, id: &str) -> Result<Option<Share>> {
        match self.remote.find_share(id).await {
            Ok(Some(share)) => return Ok(Some(share)),
            Ok(None) => {}
            Err(e) => warn!("Remote share lookup failed: {}", e),
        }
        let store = self.fallback.clone();
        let id = id.to_string();
        Ok(tokio::task::spawn_blocking(move || store.share(&id)).await?)
    }

    async fn delete_share(&self, id: &str) -> Result<()> {
        Ok(self.remote.delete_share(id).await?)
    }

    /// Best effort: a failed insert is logged and the mutation stands.
    async fn record_activity(&self, activity: Activity) -> Result<()> {
        if let Err(e) = self.remote.insert_activity(&activity).await {
            warn!(
                action = %activity.action,
                resource = %activity.resource_id,
                "Failed to log activity: {}", e
            );
        }
        Ok(())
    }
}

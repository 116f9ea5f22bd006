//! Storage strategies behind the inventory facade.

mod local;
mod remote;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use traxlio_db::LocalStore;
use traxlio_remote::{RemoteConfig, RemoteStore, Session};
use traxlio_types::{
    Activity, BoxUpdate, InventoryDocument, Item, ItemUpdate, NewBox, NewItem, NewRoom, Room,
    RoomUpdate, Share, StorageBox,
};

use crate::error::Result;

pub use local::LocalBackend;
pub use remote::RemoteBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Local,
    Remote,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Remote => f.write_str("remote"),
        }
    }
}

/// Where inventory writes go. Inputs arrive already validated; updates and
/// deletes of unknown ids are no-ops.
#[async_trait]
pub trait InventoryBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// The full document. Implementations recover from read failures.
    async fn load(&self) -> Result<InventoryDocument>;

    async fn create_room(&self, draft: NewRoom) -> Result<Room>;
    async fn update_room(&self, id: &str, update: RoomUpdate) -> Result<()>;
    /// Removes the room, its boxes and their items.
    async fn delete_room(&self, id: &str) -> Result<()>;

    async fn create_box(&self, draft: NewBox) -> Result<StorageBox>;
    async fn update_box(&self, id: &str, update: BoxUpdate) -> Result<()>;
    /// Removes the box and its items.
    async fn delete_box(&self, id: &str) -> Result<()>;

    async fn create_item(&self, box_id: &str, draft: NewItem) -> Result<Item>;
    async fn update_item(&self, id: &str, update: ItemUpdate) -> Result<()>;
    async fn delete_item(&self, id: &str) -> Result<()>;

    async fn create_share(&self, share: Share) -> Result<Share>;
    async fn find_share(&self, id: &str) -> Result<Option<Share>>;
    async fn delete_share(&self, id: &str) -> Result<()>;

    async fn record_activity(&self, activity: Activity) -> Result<()>;
}

/// Picks the backend for a facade: remote only when a session exists, the
/// remote config is usable and the client can be built.
pub struct BackendSelector {
    local: Arc<LocalStore>,
}

impl BackendSelector {
    pub fn new(local: Arc<LocalStore>) -> Self {
        Self { local }
    }

    pub fn select(
        &self,
        config: &RemoteConfig,
        session: Option<Session>,
    ) -> Arc<dyn InventoryBackend> {
        let Some(session) = session else {
            return self.local();
        };
        if !config.is_configured() {
            info!("Remote backend not configured; using local storage");
            return self.local();
        }

        match RemoteStore::new(config, session) {
            Ok(remote) => {
                info!(user = remote.user_id(), "Using remote backend");
                Arc::new(RemoteBackend::new(remote, self.local.clone()))
            }
            Err(e) => {
                warn!("Remote backend unavailable, using local storage: {}", e);
                self.local()
            }
        }
    }

    fn local(&self) -> Arc<dyn InventoryBackend> {
        Arc::new(LocalBackend::new(self.local.clone()))
    }
}

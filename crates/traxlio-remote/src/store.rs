use chrono::Utc;
use tracing::debug;

use traxlio_types::{
    Activity, BoxUpdate, InventoryDocument, Item, ItemUpdate, NewBox, NewItem, NewRoom, Room,
    RoomUpdate, Share, StorageBox,
};

use crate::client::RemoteClient;
use crate::config::{RemoteConfig, Session};
use crate::convert;
use crate::error::RemoteError;
use crate::rows::{ActivityRow, BoxRow, IdRow, ItemRow, RoomRow, ShareRow, Table};

/// Entity-level view of the hosted backend: the same five kinds the local
/// store holds, translated to and from remote rows.
#[derive(Clone)]
pub struct RemoteStore {
    client: RemoteClient,
}

impl RemoteStore {
    pub fn new(config: &RemoteConfig, session: Session) -> Result<Self, RemoteError> {
        Ok(Self {
            client: RemoteClient::new(config, session)?,
        })
    }

    pub fn user_id(&self) -> &str {
        self.client.user_id()
    }

    /// Fetch all five collections concurrently.
    pub async fn fetch_document(&self) -> Result<InventoryDocument, RemoteError> {
        let (rooms, boxes, items, shares, activities) = tokio::try_join!(
            self.client.list::<RoomRow>(Table::Rooms),
            self.client.list::<BoxRow>(Table::Boxes),
            self.client.list::<ItemRow>(Table::Items),
            self.client.list::<ShareRow>(Table::Shares),
            self.client.list::<ActivityRow>(Table::Activities),
        )?;

        Ok(InventoryDocument {
            rooms: rooms.into_iter().map(Room::from).collect(),
            boxes: boxes.into_iter().map(StorageBox::from).collect(),
            items: items.into_iter().map(Item::from).collect(),
            shares: shares.into_iter().map(Share::from).collect(),
            activities: activities.into_iter().map(Activity::from).collect(),
        })
    }

    // -- Rooms --

    pub async fn insert_room(&self, draft: &NewRoom) -> Result<Room, RemoteError> {
        let body = convert::room_insert(self.user_id(), draft);
        let row: RoomRow = self.client.insert(Table::Rooms, &body).await?;
        Ok(row.into())
    }

    pub async fn update_room(&self, id: &str, update: &RoomUpdate) -> Result<(), RemoteError> {
        let body = convert::room_patch(update, Utc::now());
        self.client.update(Table::Rooms, id, &body).await
    }

    /// Delete a room, its boxes and their items.
    pub async fn delete_room(&self, id: &str) -> Result<(), RemoteError> {
        let boxes: Vec<IdRow> = self.client.list_where(Table::Boxes, "room_id", id).await?;
        let box_ids: Vec<String> = boxes.into_iter().map(|b| b.id).collect();
        debug!(room = id, boxes = box_ids.len(), "Cascading room delete");

        self.client.delete_where(Table::Items, "box_id", &box_ids).await?;
        self.client.delete_where(Table::Boxes, "id", &box_ids).await?;
        self.client.delete(Table::Rooms, id).await
    }

    // -- Boxes --

    pub async fn insert_box(&self, draft: &NewBox) -> Result<StorageBox, RemoteError> {
        let body = convert::box_insert(self.user_id(), draft);
        let row: BoxRow = self.client.insert(Table::Boxes, &body).await?;
        Ok(row.into())
    }

    pub async fn update_box(&self, id: &str, update: &BoxUpdate) -> Result<(), RemoteError> {
        let body = convert::box_patch(update, Utc::now());
        self.client.update(Table::Boxes, id, &body).await
    }

    /// Delete a box and its items.
    pub async fn delete_box(&self, id: &str) -> Result<(), RemoteError> {
        self.client
            .delete_where(Table::Items, "box_id", &[id.to_string()])
            .await?;
        self.client.delete(Table::Boxes, id).await
    }

    // -- Items --

    pub async fn insert_item(&self, box_id: &str, draft: &NewItem) -> Result<Item, RemoteError> {
        let body = convert::item_insert(self.user_id(), box_id, draft);
        let row: ItemRow = self.client.insert(Table::Items, &body).await?;
        Ok(row.into())
    }

    pub async fn update_item(&self, id: &str, update: &ItemUpdate) -> Result<(), RemoteError> {
        let body = convert::item_patch(update, Utc::now());
        self.client.update(Table::Items, id, &body).await
    }

    pub async fn delete_item(&self, id: &str) -> Result<(), RemoteError> {
        self.client.delete(Table::Items, id).await
    }

    // -- Shares --

    pub async fn insert_share(&self, share: &Share) -> Result<Share, RemoteError> {
        let body = convert::share_insert(self.user_id(), share);
        let row: ShareRow = self.client.insert(Table::Shares, &body).await?;
        Ok(row.into())
    }

    pub async fn find_share(&self, id: &str) -> Result<Option<Share>, RemoteError> {
        let row: Option<ShareRow> = self.client.find(Table::Shares, id).await?;
        Ok(row.map(Share::from))
    }

    pub async fn delete_share(&self, id: &str) -> Result<(), RemoteError> {
        self.client.delete(Table::Shares, id).await
    }

    // -- Activity log --

    /// The backend assigns the id and timestamp.
    pub async fn insert_activity(&self, activity: &Activity) -> Result<(), RemoteError> {
        let body = convert::activity_insert(self.user_id(), activity);
        self.client.insert_minimal(Table::Activities, &body).await
    }
}

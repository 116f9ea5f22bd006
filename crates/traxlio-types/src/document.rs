use serde::{Deserialize, Serialize};

use crate::models::{Activity, Item, Room, Share, StorageBox};

/// Most recent activities kept; older entries are dropped first.
pub const ACTIVITY_LOG_LIMIT: usize = 50;

/// The whole inventory as one value. This is what the local store persists
/// under a single key and what the facade caches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryDocument {
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub boxes: Vec<StorageBox>,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub shares: Vec<Share>,
    /// Newest first.
    #[serde(default)]
    pub activities: Vec<Activity>,
}

impl InventoryDocument {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
            && self.boxes.is_empty()
            && self.items.is_empty()
            && self.shares.is_empty()
            && self.activities.is_empty()
    }

    pub fn room(&self, id: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == id)
    }

    pub fn storage_box(&self, id: &str) -> Option<&StorageBox> {
        self.boxes.iter().find(|b| b.id == id)
    }

    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn share(&self, id: &str) -> Option<&Share> {
        self.shares.iter().find(|s| s.id == id)
    }

    pub fn room_mut(&mut self, id: &str) -> Option<&mut Room> {
        self.rooms.iter_mut().find(|r| r.id == id)
    }

    pub fn storage_box_mut(&mut self, id: &str) -> Option<&mut StorageBox> {
        self.boxes.iter_mut().find(|b| b.id == id)
    }

    pub fn item_mut(&mut self, id: &str) -> Option<&mut Item> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    pub fn boxes_in_room(&self, room_id: &str) -> impl Iterator<Item = &StorageBox> {
        self.boxes.iter().filter(move |b| b.room_id == room_id)
    }

    pub fn items_in_box(&self, box_id: &str) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(move |i| i.box_id == box_id)
    }

    /// Remove a room with its boxes and their items. Returns false if the room
    /// did not exist; orphaned boxes carrying the id are removed either way.
    pub fn remove_room(&mut self, id: &str) -> bool {
        let before = self.rooms.len();
        self.rooms.retain(|r| r.id != id);

        let box_ids: Vec<String> = self.boxes_in_room(id).map(|b| b.id.clone()).collect();
        self.boxes.retain(|b| b.room_id != id);
        self.items.retain(|i| !box_ids.contains(&i.box_id));

        self.rooms.len() != before
    }

    /// Remove a box and its items.
    pub fn remove_box(&mut self, id: &str) -> bool {
        let before = self.boxes.len();
        self.boxes.retain(|b| b.id != id);
        self.items.retain(|i| i.box_id != id);
        self.boxes.len() != before
    }

    pub fn remove_item(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        self.items.len() != before
    }

    pub fn remove_share(&mut self, id: &str) -> bool {
        let before = self.shares.len();
        self.shares.retain(|s| s.id != id);
        self.shares.len() != before
    }

    /// Prepend an activity and trim the log to [`ACTIVITY_LOG_LIMIT`].
    pub fn push_activity(&mut self, activity: Activity) {
        self.activities.insert(0, activity);
        self.activities.truncate(ACTIVITY_LOG_LIMIT);
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dates;
use crate::models::{Item, Room, StorageBox};

// -- Drafts --

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewRoom {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewBox {
    pub room_id: String,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub name: String,
    pub description: Option<String>,
    pub quantity: u32,
    pub images: Vec<String>,
    pub tags: Vec<String>,
    pub notes: Option<String>,
}

impl Default for NewItem {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: None,
            quantity: 1,
            images: Vec::new(),
            tags: Vec::new(),
            notes: None,
        }
    }
}

// -- Partial updates --
//
// `None` leaves a field untouched. Nullable fields use `Option<Option<_>>`
// so that `Some(None)` clears them.

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoomUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoxUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub room_id: Option<String>,
    pub image: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub quantity: Option<u32>,
    pub images: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub notes: Option<Option<String>>,
    pub box_id: Option<String>,
}

/// `updatedAt` never moves backwards, even if the wall clock does.
fn touch(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    now.max(previous)
}

impl RoomUpdate {
    pub fn apply(&self, room: &mut Room, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            room.name = name.clone();
        }
        if let Some(description) = &self.description {
            room.description = description.clone();
        }
        room.updated_at = touch(room.updated_at, now);
    }
}

impl BoxUpdate {
    pub fn apply(&self, storage_box: &mut StorageBox, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            storage_box.name = name.clone();
        }
        if let Some(description) = &self.description {
            storage_box.description = description.clone();
        }
        if let Some(room_id) = &self.room_id {
            storage_box.room_id = room_id.clone();
        }
        if let Some(image) = &self.image {
            storage_box.image = image.clone();
        }
        storage_box.updated_at = touch(storage_box.updated_at, now);
    }
}

impl ItemUpdate {
    /// Move-only update.
    pub fn move_to(box_id: impl Into<String>) -> Self {
        Self {
            box_id: Some(box_id.into()),
            ..Default::default()
        }
    }

    pub fn apply(&self, item: &mut Item, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            item.name = name.clone();
        }
        if let Some(description) = &self.description {
            item.description = description.clone();
        }
        if let Some(quantity) = self.quantity {
            item.quantity = quantity;
        }
        if let Some(images) = &self.images {
            item.images = images.clone();
        }
        if let Some(tags) = &self.tags {
            item.tags = tags.clone();
        }
        if let Some(notes) = &self.notes {
            item.notes = notes.clone();
        }
        if let Some(box_id) = &self.box_id {
            item.box_id = box_id.clone();
        }
        item.updated_at = touch(item.updated_at, now);
    }
}

// -- Export / import --

pub const EXPORT_VERSION: &str = "1.0";

/// Backup file: `{version, exportedAt, data: {rooms, boxes, items}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFile {
    #[serde(default)]
    pub version: String,
    #[serde(default, deserialize_with = "dates::flexible_opt")]
    pub exported_at: Option<DateTime<Utc>>,
    pub data: ExportData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportData {
    pub rooms: Vec<Room>,
    pub boxes: Vec<StorageBox>,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Keep existing records; add only ids not already present.
    Merge,
    /// Wipe the local document, then insert every record from the file.
    Replace,
}

/// Records added by an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub rooms: usize,
    pub boxes: usize,
    pub items: usize,
}

use chrono::{DateTime, Utc};

use traxlio_types::{
    Activity, BoxUpdate, Item, ItemUpdate, NewBox, NewItem, NewRoom, Room, RoomUpdate, Share,
    StorageBox,
};

use crate::rows::{
    ActivityInsert, ActivityRow, BoxInsert, BoxPatch, BoxRow, ItemInsert, ItemPatch, ItemRow,
    RoomInsert, RoomPatch, RoomRow, ShareInsert, ShareRow,
};

// -- Row -> entity --

impl From<RoomRow> for Room {
    fn from(row: RoomRow) -> Self {
        Room {
            id: row.id,
            name: row.name,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<BoxRow> for StorageBox {
    fn from(row: BoxRow) -> Self {
        StorageBox {
            id: row.id,
            room_id: row.room_id,
            name: row.name,
            description: row.description,
            image: row.image,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Item {
            id: row.id,
            box_id: row.box_id,
            name: row.name,
            description: row.description,
            quantity: row.quantity,
            images: row.images.unwrap_or_default(),
            tags: row.tags.unwrap_or_default(),
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<ShareRow> for Share {
    fn from(row: ShareRow) -> Self {
        Share {
            id: row.id,
            kind: row.kind,
            resource_id: row.resource_id,
            is_public: row.is_public,
            created_at: row.created_at,
            expires_at: row.expires_at,
        }
    }
}

impl From<ActivityRow> for Activity {
    fn from(row: ActivityRow) -> Self {
        Activity {
            id: row.id,
            action: row.action,
            kind: row.kind,
            resource_id: row.resource_id,
            resource_name: row.resource_name,
            parent_name: row.parent_name,
            timestamp: row.created_at,
        }
    }
}

// -- Entity -> insert body --

pub fn room_insert(user_id: &str, draft: &NewRoom) -> RoomInsert {
    RoomInsert {
        user_id: user_id.to_string(),
        name: draft.name.clone(),
        description: draft.description.clone(),
    }
}

pub fn box_insert(user_id: &str, draft: &NewBox) -> BoxInsert {
    BoxInsert {
        user_id: user_id.to_string(),
        room_id: draft.room_id.clone(),
        name: draft.name.clone(),
        description: draft.description.clone(),
        image: draft.image.clone(),
    }
}

pub fn item_insert(user_id: &str, box_id: &str, draft: &NewItem) -> ItemInsert {
    ItemInsert {
        user_id: user_id.to_string(),
        box_id: box_id.to_string(),
        name: draft.name.clone(),
        description: draft.description.clone(),
        quantity: draft.quantity,
        images: draft.images.clone(),
        tags: draft.tags.clone(),
        notes: draft.notes.clone(),
    }
}

pub fn share_insert(user_id: &str, share: &Share) -> ShareInsert {
    ShareInsert {
        id: share.id.clone(),
        user_id: user_id.to_string(),
        kind: share.kind,
        resource_id: share.resource_id.clone(),
        is_public: share.is_public,
        expires_at: share.expires_at,
    }
}

pub fn activity_insert(user_id: &str, activity: &Activity) -> ActivityInsert {
    ActivityInsert {
        user_id: user_id.to_string(),
        action: activity.action,
        kind: activity.kind,
        resource_id: activity.resource_id.clone(),
        resource_name: activity.resource_name.clone(),
        parent_name: activity.parent_name.clone(),
    }
}

// -- Partial update -> patch body --

pub fn room_patch(update: &RoomUpdate, now: DateTime<Utc>) -> RoomPatch {
    RoomPatch {
        name: update.name.clone(),
        description: update.description.clone(),
        updated_at: now,
    }
}

pub fn box_patch(update: &BoxUpdate, now: DateTime<Utc>) -> BoxPatch {
    BoxPatch {
        name: update.name.clone(),
        description: update.description.clone(),
        room_id: update.room_id.clone(),
        image: update.image.clone(),
        updated_at: now,
    }
}

pub fn item_patch(update: &ItemUpdate, now: DateTime<Utc>) -> ItemPatch {
    ItemPatch {
        name: update.name.clone(),
        description: update.description.clone(),
        quantity: update.quantity,
        images: update.images.clone(),
        tags: update.tags.clone(),
        notes: update.notes.clone(),
        box_id: update.box_id.clone(),
        updated_at: now,
    }
}

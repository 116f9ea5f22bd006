use chrono::{DateTime, Utc};
use uuid::Uuid;

use traxlio_types::{Activity, ActivityAction, InventoryDocument, Item, ResourceKind, StorageBox};

/// Build a log record with a fresh id. Remote backends assign their own id
/// and timestamp on insert.
pub fn record(
    action: ActivityAction,
    kind: ResourceKind,
    resource_id: &str,
    resource_name: &str,
    parent_name: Option<String>,
    now: DateTime<Utc>,
) -> Activity {
    Activity {
        id: Uuid::new_v4().to_string(),
        action,
        kind,
        resource_id: resource_id.to_string(),
        resource_name: resource_name.to_string(),
        parent_name,
        timestamp: now,
    }
}

pub fn room_name(doc: &InventoryDocument, room_id: &str) -> Option<String> {
    doc.room(room_id).map(|r| r.name.clone())
}

pub fn box_name(doc: &InventoryDocument, box_id: &str) -> Option<String> {
    doc.storage_box(box_id).map(|b| b.name.clone())
}

/// How an item update is logged: a changed `boxId` is a move and names the
/// target box, anything else is an update naming the current box.
pub fn classify_item_update(
    doc: &InventoryDocument,
    previous: &Item,
    target_box: Option<&str>,
) -> (ActivityAction, Option<String>) {
    match target_box {
        Some(target) if target != previous.box_id => {
            (ActivityAction::Move, box_name(doc, target))
        }
        _ => (ActivityAction::Update, box_name(doc, &previous.box_id)),
    }
}

/// Parent room name for a box after `room_id` is applied.
pub fn box_parent(
    doc: &InventoryDocument,
    previous: &StorageBox,
    room_id: Option<&str>,
) -> Option<String> {
    room_name(doc, room_id.unwrap_or(&previous.room_id))
}

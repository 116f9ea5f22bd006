//! Share tokens and the read-only views they unlock.

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;
use serde::Serialize;

use traxlio_types::{InventoryDocument, Item, ResourceKind, Room, Share, StorageBox};

pub const TOKEN_LEN: usize = 24;

/// Collisions are astronomically unlikely; the bound only stops a broken RNG
/// from spinning forever.
pub const MAX_TOKEN_ATTEMPTS: usize = 8;

/// Random alphanumeric token from the thread-local CSPRNG.
pub fn generate_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

pub fn share_url(base: &str, token: &str) -> String {
    format!("{}/share/{}", base.trim_end_matches('/'), token)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxSummary {
    #[serde(flatten)]
    pub storage_box: StorageBox,
    pub item_count: usize,
}

/// What a share link shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SharedView {
    Room {
        room: Room,
        boxes: Vec<BoxSummary>,
    },
    Box {
        #[serde(rename = "box")]
        storage_box: StorageBox,
        room: Option<Room>,
        items: Vec<Item>,
    },
    Item {
        item: Item,
        #[serde(rename = "box")]
        storage_box: Option<StorageBox>,
        room: Option<Room>,
    },
}

impl SharedView {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Room { .. } => ResourceKind::Room,
            Self::Box { .. } => ResourceKind::Box,
            Self::Item { .. } => ResourceKind::Item,
        }
    }
}

/// Build the view for `share`, or `None` if it has expired or its resource
/// no longer exists.
pub fn resolve(doc: &InventoryDocument, share: &Share, now: DateTime<Utc>) -> Option<SharedView> {
    if share.is_expired(now) {
        return None;
    }

    match share.kind {
        ResourceKind::Room => {
            let room = doc.room(&share.resource_id)?.clone();
            let boxes = doc
                .boxes_in_room(&room.id)
                .map(|b| BoxSummary {
                    storage_box: b.clone(),
                    item_count: doc.items_in_box(&b.id).count(),
                })
                .collect();
            Some(SharedView::Room { room, boxes })
        }
        ResourceKind::Box => {
            let storage_box = doc.storage_box(&share.resource_id)?.clone();
            let room = doc.room(&storage_box.room_id).cloned();
            let items = doc.items_in_box(&storage_box.id).cloned().collect();
            Some(SharedView::Box {
                storage_box,
                room,
                items,
            })
        }
        ResourceKind::Item => {
            let item = doc.item(&share.resource_id)?.clone();
            let storage_box = doc.storage_box(&item.box_id).cloned();
            let room = storage_box
                .as_ref()
                .and_then(|b| doc.room(&b.room_id))
                .cloned();
            Some(SharedView::Item {
                item,
                storage_box,
                room,
            })
        }
    }
}

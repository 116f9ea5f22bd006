use anyhow::Result;
use chrono::Utc;
use tracing::{debug, warn};

use traxlio_types::{
    Activity, BoxUpdate, InventoryDocument, Item, ItemUpdate, ReminderFrequency, Room, RoomUpdate,
    Settings, Share, StorageBox,
};

use crate::queries::{query_value, upsert_value};
use crate::{Database, StorageScope};

/// Key holding the serialized inventory document.
pub const INVENTORY_KEY: &str = "traxlio_inventory";
pub const SETTINGS_NOTIFICATIONS_KEY: &str = "settings_notifications";
pub const SETTINGS_FREQUENCY_KEY: &str = "settings_frequency";

/// The whole inventory stored as one JSON document under [`INVENTORY_KEY`].
///
/// Every entity operation reads the full document, changes one sequence in
/// memory and writes the full document back. Reads never fail: a missing or
/// unreadable document is an empty inventory.
pub struct LocalStore {
    db: Database,
}

impl LocalStore {
    pub fn open(scope: &StorageScope) -> Result<Self> {
        Ok(Self {
            db: Database::open(scope)?,
        })
    }

    pub fn read(&self) -> InventoryDocument {
        match self.db.get_value(INVENTORY_KEY) {
            Ok(raw) => decode(raw),
            Err(e) => {
                warn!("Failed to read inventory document: {}", e);
                InventoryDocument::default()
            }
        }
    }

    /// Overwrite the stored document in full.
    pub fn write(&self, doc: &InventoryDocument) -> Result<()> {
        let json = doc.to_json()?;
        self.db.put_value(INVENTORY_KEY, &json)?;
        debug!(bytes = json.len(), "Inventory document written");
        Ok(())
    }

    /// Read-modify-write under the connection lock.
    fn modify<T>(&self, f: impl FnOnce(&mut InventoryDocument) -> T) -> Result<T> {
        self.db.with_conn(|conn| {
            let mut doc = decode(query_value(conn, INVENTORY_KEY)?);
            let out = f(&mut doc);
            upsert_value(conn, INVENTORY_KEY, &doc.to_json()?)?;
            Ok(out)
        })
    }

    // -- Rooms --

    pub fn add_room(&self, room: Room) -> Result<()> {
        self.modify(|doc| doc.rooms.push(room))
    }

    /// Returns the updated room, or `None` if no room has this id.
    pub fn update_room(&self, id: &str, update: &RoomUpdate) -> Result<Option<Room>> {
        self.modify(|doc| {
            doc.room_mut(id).map(|room| {
                update.apply(room, Utc::now());
                room.clone()
            })
        })
    }

    /// Remove a room together with its boxes and their items.
    pub fn remove_room(&self, id: &str) -> Result<bool> {
        self.modify(|doc| doc.remove_room(id))
    }

    // -- Boxes --

    pub fn add_box(&self, storage_box: StorageBox) -> Result<()> {
        self.modify(|doc| doc.boxes.push(storage_box))
    }

    pub fn update_box(&self, id: &str, update: &BoxUpdate) -> Result<Option<StorageBox>> {
        self.modify(|doc| {
            doc.storage_box_mut(id).map(|storage_box| {
                update.apply(storage_box, Utc::now());
                storage_box.clone()
            })
        })
    }

    /// Remove a box together with its items.
    pub fn remove_box(&self, id: &str) -> Result<bool> {
        self.modify(|doc| doc.remove_box(id))
    }

    // -- Items --

    pub fn add_item(&self, item: Item) -> Result<()> {
        self.modify(|doc| doc.items.push(item))
    }

    pub fn update_item(&self, id: &str, update: &ItemUpdate) -> Result<Option<Item>> {
        self.modify(|doc| {
            doc.item_mut(id).map(|item| {
                update.apply(item, Utc::now());
                item.clone()
            })
        })
    }

    pub fn remove_item(&self, id: &str) -> Result<bool> {
        self.modify(|doc| doc.remove_item(id))
    }

    // -- Shares --

    pub fn add_share(&self, share: Share) -> Result<()> {
        self.modify(|doc| doc.shares.push(share))
    }

    pub fn share(&self, id: &str) -> Option<Share> {
        self.read().share(id).cloned()
    }

    pub fn remove_share(&self, id: &str) -> Result<bool> {
        self.modify(|doc| doc.remove_share(id))
    }

    // -- Activity log --

    pub fn add_activity(&self, activity: Activity) -> Result<()> {
        self.modify(|doc| doc.push_activity(activity))
    }

    pub fn recent_activities(&self, limit: usize) -> Vec<Activity> {
        let mut activities = self.read().activities;
        activities.truncate(limit);
        activities
    }

    /// Drop the inventory document. Settings are kept.
    pub fn clear_all(&self) -> Result<()> {
        if self.db.delete_value(INVENTORY_KEY)? {
            debug!("Inventory document cleared");
        }
        Ok(())
    }

    // -- Settings --

    pub fn settings(&self) -> Settings {
        let mut settings = Settings::default();

        match self.db.get_value(SETTINGS_NOTIFICATIONS_KEY) {
            Ok(Some(raw)) => settings.notifications_enabled = raw == "true",
            Ok(None) => {}
            Err(e) => warn!("Failed to read notification setting: {}", e),
        }

        match self.db.get_value(SETTINGS_FREQUENCY_KEY) {
            Ok(Some(raw)) => match raw.parse::<ReminderFrequency>() {
                Ok(frequency) => settings.reminder_frequency = frequency,
                Err(e) => warn!("Ignoring stored reminder frequency: {}", e),
            },
            Ok(None) => {}
            Err(e) => warn!("Failed to read reminder frequency: {}", e),
        }

        settings
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        self.db.with_conn(|conn| {
            upsert_value(
                conn,
                SETTINGS_NOTIFICATIONS_KEY,
                if settings.notifications_enabled { "true" } else { "false" },
            )?;
            upsert_value(conn, SETTINGS_FREQUENCY_KEY, settings.reminder_frequency.as_str())
        })
    }
}

fn decode(raw: Option<String>) -> InventoryDocument {
    let Some(raw) = raw else {
        return InventoryDocument::default();
    };

    InventoryDocument::from_json(&raw).unwrap_or_else(|e| {
        warn!("Discarding unreadable inventory document: {}", e);
        InventoryDocument::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use traxlio_types::{ACTIVITY_LOG_LIMIT, ActivityAction, ResourceKind};

    fn session_store() -> LocalStore {
        LocalStore::open(&StorageScope::Session).unwrap()
    }

    fn room(id: &str, name: &str) -> Room {
        let now = Utc::now();
        Room {
            id: id.into(),
            name: name.into(),
            description: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn storage_box(id: &str, room_id: &str) -> StorageBox {
        let now = Utc::now();
        StorageBox {
            id: id.into(),
            room_id: room_id.into(),
            name: id.into(),
            description: None,
            image: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn item(id: &str, box_id: &str) -> Item {
        let now = Utc::now();
        Item {
            id: id.into(),
            box_id: box_id.into(),
            name: id.into(),
            description: None,
            quantity: 1,
            images: vec![],
            tags: vec![],
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn empty_store_reads_as_empty_document() {
        let store = session_store();
        assert!(store.read().is_empty());
    }

    #[test]
    fn persistent_store_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let scope = StorageScope::Persistent(dir.path().join("inventory.db"));

        {
            let store = LocalStore::open(&scope).unwrap();
            store.add_room(room("r1", "Garage")).unwrap();
        }

        let store = LocalStore::open(&scope).unwrap();
        let doc = store.read();
        assert_eq!(doc.rooms.len(), 1);
        assert_eq!(doc.rooms[0].name, "Garage");
    }

    #[test]
    fn unreadable_document_is_swallowed() {
        let store = session_store();
        store.db.put_value(INVENTORY_KEY, "{not json").unwrap();
        assert!(store.read().is_empty());

        // The next write replaces the broken document.
        store.add_room(room("r1", "Attic")).unwrap();
        assert_eq!(store.read().rooms.len(), 1);
    }

    #[test]
    fn legacy_tagged_dates_are_rewritten_in_plain_form() {
        let store = session_store();
        let legacy = r#"{"rooms":[{"id":"r1","name":"Garage",
            "createdAt":{"__type":"Date","value":"2023-11-05T08:00:00.000Z"},
            "updatedAt":{"__type":"Date","value":"2023-11-05T08:00:00.000Z"}}],
            "boxes":[],"items":[],"shares":[],"activities":[]}"#;
        store.db.put_value(INVENTORY_KEY, legacy).unwrap();

        assert_eq!(store.read().rooms[0].name, "Garage");

        store.add_box(storage_box("b1", "r1")).unwrap();
        let raw = store.db.get_value(INVENTORY_KEY).unwrap().unwrap();
        assert!(!raw.contains("__type"));

        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value["rooms"][0]["createdAt"].is_string());
    }

    #[test]
    fn update_changes_fields_and_refreshes_timestamp() {
        let store = session_store();
        let original = room("r1", "Garage");
        store.add_room(original.clone()).unwrap();

        let updated = store
            .update_room(
                "r1",
                &RoomUpdate {
                    description: Some(Some("cold".into())),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();

        assert_eq!(updated.name, "Garage");
        assert_eq!(updated.description.as_deref(), Some("cold"));
        assert!(updated.updated_at >= original.updated_at);
        assert_eq!(store.read().rooms[0], updated);
    }

    #[test]
    fn box_update_moves_between_rooms_and_keeps_other_fields() {
        let store = session_store();
        store.add_room(room("r1", "Garage")).unwrap();
        store.add_room(room("r2", "Attic")).unwrap();
        let mut tools = storage_box("b1", "r1");
        tools.description = Some("red lid".into());
        store.add_box(tools.clone()).unwrap();

        let updated = store
            .update_box(
                "b1",
                &BoxUpdate {
                    room_id: Some("r2".into()),
                    image: Some(Some("data:image/png;base64,AA==".into())),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();

        assert_eq!(updated.room_id, "r2");
        assert_eq!(updated.name, "b1");
        assert_eq!(updated.description.as_deref(), Some("red lid"));
        assert!(updated.image.is_some());
        assert!(updated.updated_at >= tools.updated_at);
        assert_eq!(store.read().boxes[0], updated);

        assert!(
            store
                .update_box("missing", &BoxUpdate::default())
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn update_of_unknown_id_is_a_no_op() {
        let store = session_store();
        let result = store.update_item("nope", &ItemUpdate::move_to("b1")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn deleting_a_room_cascades() {
        let store = session_store();
        store.add_room(room("r1", "Garage")).unwrap();
        store.add_room(room("r2", "Attic")).unwrap();
        store.add_box(storage_box("b1", "r1")).unwrap();
        store.add_box(storage_box("b2", "r2")).unwrap();
        store.add_item(item("i1", "b1")).unwrap();
        store.add_item(item("i2", "b2")).unwrap();

        assert!(store.remove_room("r1").unwrap());

        let doc = store.read();
        assert_eq!(doc.rooms.len(), 1);
        assert!(doc.storage_box("b1").is_none());
        assert!(doc.items_in_box("b1").next().is_none());
        assert!(doc.item("i2").is_some());
    }

    #[test]
    fn deleting_a_box_cascades_to_items() {
        let store = session_store();
        store.add_box(storage_box("b1", "r1")).unwrap();
        store.add_item(item("i1", "b1")).unwrap();
        store.add_item(item("i2", "b1")).unwrap();

        assert!(store.remove_box("b1").unwrap());
        assert!(store.read().items.is_empty());
    }

    #[test]
    fn activity_log_keeps_newest_fifty() {
        let store = session_store();
        for n in 0..(ACTIVITY_LOG_LIMIT + 5) {
            store
                .add_activity(Activity {
                    id: format!("a{}", n),
                    action: ActivityAction::Update,
                    kind: ResourceKind::Item,
                    resource_id: "i1".into(),
                    resource_name: "Drill".into(),
                    parent_name: None,
                    timestamp: Utc::now(),
                })
                .unwrap();
        }

        assert_eq!(store.read().activities.len(), ACTIVITY_LOG_LIMIT);
        let recent = store.recent_activities(3);
        let ids: Vec<_> = recent.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["a54", "a53", "a52"]);
    }

    #[test]
    fn clear_all_keeps_settings() {
        let store = session_store();
        store.add_room(room("r1", "Garage")).unwrap();
        store
            .save_settings(&Settings {
                notifications_enabled: false,
                reminder_frequency: ReminderFrequency::Weekly,
            })
            .unwrap();

        store.clear_all().unwrap();

        assert!(store.read().is_empty());
        let settings = store.settings();
        assert!(!settings.notifications_enabled);
        assert_eq!(settings.reminder_frequency, ReminderFrequency::Weekly);
    }

    #[test]
    fn settings_default_when_absent() {
        assert_eq!(session_store().settings(), Settings::default());
    }

    #[test]
    fn shares_are_found_and_removed() {
        let store = session_store();
        store
            .add_share(Share {
                id: "tok".into(),
                kind: ResourceKind::Room,
                resource_id: "r1".into(),
                is_public: true,
                created_at: Utc::now(),
                expires_at: None,
            })
            .unwrap();

        assert_eq!(store.share("tok").unwrap().resource_id, "r1");
        assert!(store.remove_share("tok").unwrap());
        assert!(store.share("tok").is_none());
    }
}

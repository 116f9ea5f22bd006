use serde::Serialize;

use traxlio_types::InventoryDocument;

use crate::error::InventoryError;

/// A box an item can be moved into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveTarget {
    pub box_id: String,
    pub box_name: String,
    pub room_name: Option<String>,
}

/// Result of one item in a bulk move. Earlier successes are not rolled back
/// when a later item fails.
#[derive(Debug)]
pub struct MoveOutcome {
    pub item_id: String,
    pub result: Result<(), InventoryError>,
}

impl MoveOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Every box except `current_box_id`, in document order.
pub fn move_targets(doc: &InventoryDocument, current_box_id: &str) -> Vec<MoveTarget> {
    doc.boxes
        .iter()
        .filter(|b| b.id != current_box_id)
        .map(|b| MoveTarget {
            box_id: b.id.clone(),
            box_name: b.name.clone(),
            room_name: doc.room(&b.room_id).map(|r| r.name.clone()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use traxlio_types::{Room, StorageBox};

    #[test]
    fn excludes_the_current_box() {
        let now = Utc::now();
        let mut doc = InventoryDocument::default();
        doc.rooms.push(Room {
            id: "r1".into(),
            name: "Garage".into(),
            description: None,
            created_at: now,
            updated_at: now,
        });
        for (id, room_id) in [("b1", "r1"), ("b2", "r1"), ("b3", "gone")] {
            doc.boxes.push(StorageBox {
                id: id.into(),
                room_id: room_id.into(),
                name: id.to_uppercase(),
                description: None,
                image: None,
                created_at: now,
                updated_at: now,
            });
        }

        let targets = move_targets(&doc, "b1");
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].box_id, "b2");
        assert_eq!(targets[0].room_name.as_deref(), Some("Garage"));
        assert_eq!(targets[1].room_name, None);
    }
}

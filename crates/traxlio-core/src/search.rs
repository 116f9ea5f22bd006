use serde::Serialize;

use traxlio_types::{InventoryDocument, ResourceKind};

/// Queries shorter than this (after trimming) return nothing.
pub const MIN_QUERY_LEN: usize = 2;
pub const MAX_RESULTS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Room of a box, box of an item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

pub(crate) fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

pub(crate) fn contains_opt(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| contains(h, needle))
}

/// Case-insensitive substring search over boxes, then items.
pub fn search(doc: &InventoryDocument, query: &str) -> Vec<SearchHit> {
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_LEN {
        return Vec::new();
    }
    let needle = query.to_lowercase();

    let boxes = doc
        .boxes
        .iter()
        .filter(|b| {
            contains(&b.name, &needle) || contains_opt(b.description.as_deref(), &needle)
        })
        .map(|b| {
            let room = doc.room(&b.room_id);
            SearchHit {
                kind: ResourceKind::Box,
                id: b.id.clone(),
                name: b.name.clone(),
                description: b.description.clone(),
                parent_name: room.map(|r| r.name.clone()),
                parent_id: room.map(|r| r.id.clone()),
                tags: Vec::new(),
            }
        });

    let items = doc
        .items
        .iter()
        .filter(|i| {
            contains(&i.name, &needle)
                || contains_opt(i.description.as_deref(), &needle)
                || i.tags.iter().any(|t| contains(t, &needle))
                || contains_opt(i.notes.as_deref(), &needle)
        })
        .map(|i| {
            let parent = doc.storage_box(&i.box_id);
            SearchHit {
                kind: ResourceKind::Item,
                id: i.id.clone(),
                name: i.name.clone(),
                description: i.description.clone(),
                parent_name: parent.map(|b| b.name.clone()),
                parent_id: parent.map(|b| b.id.clone()),
                tags: i.tags.clone(),
            }
        });

    boxes.chain(items).take(MAX_RESULTS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use traxlio_types::{Item, Room, StorageBox};

    fn doc() -> InventoryDocument {
        let now = Utc::now();
        let mut doc = InventoryDocument::default();
        doc.rooms.push(Room {
            id: "r1".into(),
            name: "Garage".into(),
            description: None,
            created_at: now,
            updated_at: now,
        });
        doc.boxes.push(StorageBox {
            id: "b1".into(),
            room_id: "r1".into(),
            name: "Power tools".into(),
            description: None,
            image: None,
            created_at: now,
            updated_at: now,
        });
        doc.items.push(Item {
            id: "i1".into(),
            box_id: "b1".into(),
            name: "Drill".into(),
            description: None,
            quantity: 1,
            images: vec![],
            tags: vec!["Power".into()],
            notes: None,
            created_at: now,
            updated_at: now,
        });
        doc.items.push(Item {
            id: "i2".into(),
            box_id: "b1".into(),
            name: "Saw".into(),
            description: None,
            quantity: 1,
            images: vec![],
            tags: vec![],
            notes: Some("blade needs sharpening".into()),
            created_at: now,
            updated_at: now,
        });
        doc
    }

    #[test]
    fn short_queries_find_nothing() {
        assert!(search(&doc(), " p ").is_empty());
        assert!(search(&doc(), "").is_empty());
    }

    #[test]
    fn boxes_come_before_items() {
        let hits = search(&doc(), "POWER");
        let kinds: Vec<_> = hits.iter().map(|h| (h.kind, h.id.as_str())).collect();
        assert_eq!(kinds, [(ResourceKind::Box, "b1"), (ResourceKind::Item, "i1")]);
        assert_eq!(hits[0].parent_name.as_deref(), Some("Garage"));
        assert_eq!(hits[1].parent_id.as_deref(), Some("b1"));
    }

    #[test]
    fn notes_are_searched() {
        let hits = search(&doc(), "sharpen");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Saw");
    }

    #[test]
    fn results_are_capped() {
        let mut doc = doc();
        let template = doc.items[0].clone();
        for n in 0..20 {
            let mut item = template.clone();
            item.id = format!("x{}", n);
            doc.items.push(item);
        }
        assert_eq!(search(&doc, "drill").len(), MAX_RESULTS);
    }
}

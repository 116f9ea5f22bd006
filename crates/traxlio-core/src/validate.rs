//! Input normalization applied before anything reaches a backend.

use traxlio_types::{BoxUpdate, ItemUpdate, NewBox, NewItem, NewRoom, RoomUpdate};

use crate::error::{InventoryError, Result};

fn name(value: &str, what: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(InventoryError::Validation(format!("{} name is required", what)));
    }
    Ok(trimmed.to_string())
}

/// Blank optional text is stored as absent.
fn text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn quantity(value: u32) -> Result<u32> {
    if value == 0 {
        return Err(InventoryError::Validation(
            "quantity must be at least 1".into(),
        ));
    }
    Ok(value)
}

/// Trim, drop blanks and drop repeats, keeping first-seen order.
pub fn tags(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for tag in values {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

pub fn new_room(draft: NewRoom) -> Result<NewRoom> {
    Ok(NewRoom {
        name: name(&draft.name, "Room")?,
        description: text(draft.description),
    })
}

pub fn new_box(draft: NewBox) -> Result<NewBox> {
    Ok(NewBox {
        name: name(&draft.name, "Box")?,
        description: text(draft.description),
        ..draft
    })
}

pub fn new_item(draft: NewItem) -> Result<NewItem> {
    Ok(NewItem {
        name: name(&draft.name, "Item")?,
        description: text(draft.description),
        quantity: quantity(draft.quantity)?,
        images: draft.images,
        tags: tags(draft.tags),
        notes: text(draft.notes),
    })
}

pub fn room_update(update: RoomUpdate) -> Result<RoomUpdate> {
    Ok(RoomUpdate {
        name: update.name.map(|n| name(&n, "Room")).transpose()?,
        description: update.description.map(text),
    })
}

pub fn box_update(update: BoxUpdate) -> Result<BoxUpdate> {
    Ok(BoxUpdate {
        name: update.name.map(|n| name(&n, "Box")).transpose()?,
        description: update.description.map(text),
        ..update
    })
}

pub fn item_update(update: ItemUpdate) -> Result<ItemUpdate> {
    Ok(ItemUpdate {
        name: update.name.map(|n| name(&n, "Item")).transpose()?,
        description: update.description.map(text),
        quantity: update.quantity.map(quantity).transpose()?,
        tags: update.tags.map(tags),
        notes: update.notes.map(text),
        ..update
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_trimmed_and_required() {
        let room = new_room(NewRoom {
            name: "  Garage ".into(),
            description: Some("   ".into()),
        })
        .unwrap();
        assert_eq!(room.name, "Garage");
        assert!(room.description.is_none());

        let err = new_room(NewRoom {
            name: " \t".into(),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, InventoryError::Validation(_)));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let err = new_item(NewItem {
            name: "Drill".into(),
            quantity: 0,
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: quantity must be at least 1");

        let err = item_update(ItemUpdate {
            quantity: Some(0),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, InventoryError::Validation(_)));
    }

    #[test]
    fn tags_behave_as_an_ordered_set() {
        let out = tags(vec![
            "tools".into(),
            " power ".into(),
            "tools".into(),
            "".into(),
            "power".into(),
        ]);
        assert_eq!(out, ["tools", "power"]);
    }

    #[test]
    fn clearing_description_stays_a_clear() {
        let update = room_update(RoomUpdate {
            description: Some(None),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(update.description, Some(None));
    }
}

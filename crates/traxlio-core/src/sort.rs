//! Filtering and ordering for room and item listings.

use std::cmp::Ordering;
use std::str::FromStr;

use traxlio_types::{InventoryDocument, Item, Room};

use crate::search::{contains, contains_opt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("unknown direction `{}`", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoomSort {
    #[default]
    Name,
    Created,
    Updated,
    BoxCount,
}

impl FromStr for RoomSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "created" => Ok(Self::Created),
            "updated" => Ok(Self::Updated),
            "boxes" | "box-count" => Ok(Self::BoxCount),
            other => Err(format!("unknown room sort `{}`", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemSort {
    #[default]
    Name,
    Created,
    Updated,
    Quantity,
}

impl FromStr for ItemSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "created" => Ok(Self::Created),
            "updated" => Ok(Self::Updated),
            "quantity" => Ok(Self::Quantity),
            other => Err(format!("unknown item sort `{}`", other)),
        }
    }
}

fn by_name(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

/// Rooms whose name or description contains `query`, ordered by `sort`.
/// An empty query keeps every room.
pub fn filter_rooms(
    doc: &InventoryDocument,
    query: &str,
    sort: RoomSort,
    direction: Direction,
) -> Vec<Room> {
    let needle = query.trim().to_lowercase();
    let box_count = |room: &Room| doc.boxes_in_room(&room.id).count();

    let mut rooms: Vec<Room> = doc
        .rooms
        .iter()
        .filter(|r| {
            contains(&r.name, &needle) || contains_opt(r.description.as_deref(), &needle)
        })
        .cloned()
        .collect();

    rooms.sort_by(|a, b| {
        let ordering = match sort {
            RoomSort::Name => by_name(&a.name, &b.name),
            RoomSort::Created => a.created_at.cmp(&b.created_at),
            RoomSort::Updated => a.updated_at.cmp(&b.updated_at),
            RoomSort::BoxCount => box_count(a).cmp(&box_count(b)),
        };
        direction.apply(ordering)
    });
    rooms
}

/// Items whose name, description or tags contain `query`, ordered by `sort`.
pub fn filter_items(
    items: &[Item],
    query: &str,
    sort: ItemSort,
    direction: Direction,
) -> Vec<Item> {
    let needle = query.trim().to_lowercase();

    let mut out: Vec<Item> = items
        .iter()
        .filter(|i| {
            contains(&i.name, &needle)
                || contains_opt(i.description.as_deref(), &needle)
                || i.tags.iter().any(|t| contains(t, &needle))
        })
        .cloned()
        .collect();

    out.sort_by(|a, b| {
        let ordering = match sort {
            ItemSort::Name => by_name(&a.name, &b.name),
            ItemSort::Created => a.created_at.cmp(&b.created_at),
            ItemSort::Updated => a.updated_at.cmp(&b.updated_at),
            ItemSort::Quantity => a.quantity.cmp(&b.quantity),
        };
        direction.apply(ordering)
    });
    out
}

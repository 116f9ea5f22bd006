use serde::Serialize;

use traxlio_types::InventoryDocument;

/// Dashboard counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryStats {
    pub rooms: usize,
    pub boxes: usize,
    pub items: usize,
    /// Sum of item quantities.
    pub total_quantity: u64,
    pub shares: usize,
}

impl InventoryStats {
    pub fn of(doc: &InventoryDocument) -> Self {
        Self {
            rooms: doc.rooms.len(),
            boxes: doc.boxes.len(),
            items: doc.items.len(),
            total_quantity: doc.items.iter().map(|i| u64::from(i.quantity)).sum(),
            shares: doc.shares.len(),
        }
    }
}

//! Traxlio shared types.
//!
//! Entity models as they appear in the local document, the partial-update
//! and draft types used by every backend, and the export file format.

pub mod api;
pub mod dates;
pub mod document;
pub mod models;

pub use api::{
    BoxUpdate, EXPORT_VERSION, ExportData, ExportFile, ImportMode, ImportSummary, ItemUpdate,
    NewBox, NewItem, NewRoom, RoomUpdate,
};
pub use document::{ACTIVITY_LOG_LIMIT, InventoryDocument};
pub use models::{
    Activity, ActivityAction, Item, ReminderFrequency, ResourceKind, Room, Settings, Share,
    StorageBox,
};

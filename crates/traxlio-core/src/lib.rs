//! Inventory data layer: the facade over local and remote storage, plus the
//! search, sharing, moving and backup features built on its cached document.

pub mod activity;
pub mod backend;
pub mod error;
pub mod moves;
pub mod search;
pub mod service;
pub mod share;
pub mod sort;
pub mod stats;
pub mod transfer;
pub mod validate;

pub use backend::{BackendKind, BackendSelector, InventoryBackend, LocalBackend, RemoteBackend};
pub use error::{InventoryError, Result};
pub use moves::{MoveOutcome, MoveTarget};
pub use search::SearchHit;
pub use service::{Inventory, LoadState};
pub use share::{SharedView, share_url};
pub use sort::{Direction, ItemSort, RoomSort};
pub use stats::InventoryStats;

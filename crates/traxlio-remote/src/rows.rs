//! Row types as the backend stores them: snake_case columns, server-issued
//! ids and timestamps. Distinct from the entity models in traxlio-types so
//! the wire format can change without touching the document format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use traxlio_types::{ActivityAction, ResourceKind};

/// Remote tables, one per entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Rooms,
    Boxes,
    Items,
    Shares,
    Activities,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rooms => "rooms",
            Self::Boxes => "boxes",
            Self::Items => "items",
            Self::Shares => "shares",
            Self::Activities => "activities",
        }
    }

    /// Column a full listing is ordered by, newest first.
    pub fn order_column(&self) -> Option<&'static str> {
        match self {
            Self::Rooms | Self::Boxes | Self::Items => Some("updated_at"),
            Self::Activities => Some("created_at"),
            Self::Shares => None,
        }
    }

    pub fn list_limit(&self) -> Option<usize> {
        match self {
            Self::Activities => Some(traxlio_types::ACTIVITY_LOG_LIMIT),
            _ => None,
        }
    }
}

// -- Rows read back from the backend --

#[derive(Debug, Clone, Deserialize)]
pub struct RoomRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoxRow {
    pub id: String,
    pub room_id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemRow {
    pub id: String,
    pub box_id: String,
    pub name: String,
    pub description: Option<String>,
    pub quantity: u32,
    pub images: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShareRow {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub resource_id: String,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActivityRow {
    pub id: String,
    pub action: ActivityAction,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub resource_id: String,
    pub resource_name: String,
    pub parent_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Projection used when only ids are needed (cascade lookups).
#[derive(Debug, Clone, Deserialize)]
pub struct IdRow {
    pub id: String,
}

// -- Insert bodies --

#[derive(Debug, Clone, Serialize)]
pub struct RoomInsert {
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoxInsert {
    pub user_id: String,
    pub room_id: String,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemInsert {
    pub user_id: String,
    pub box_id: String,
    pub name: String,
    pub description: Option<String>,
    pub quantity: u32,
    pub images: Vec<String>,
    pub tags: Vec<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShareInsert {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub resource_id: String,
    pub is_public: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityInsert {
    pub user_id: String,
    pub action: ActivityAction,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub resource_id: String,
    pub resource_name: String,
    pub parent_name: Option<String>,
}

// -- Patch bodies --
//
// Absent fields are omitted from the JSON; `Some(None)` sends an explicit null.

#[derive(Debug, Clone, Serialize)]
pub struct RoomPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoxPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Option<String>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub box_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

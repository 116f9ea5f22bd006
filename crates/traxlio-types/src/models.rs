use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dates;

/// The three kinds of inventory resource. Serialized as the `type` tag on
/// shares and activities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Room,
    Box,
    Item,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Room => "room",
            Self::Box => "box",
            Self::Item => "item",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "room" => Ok(Self::Room),
            "box" => Ok(Self::Box),
            "item" => Ok(Self::Item),
            other => Err(format!("unknown resource type `{}`", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityAction {
    Create,
    Update,
    Delete,
    Move,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Move => "move",
        }
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(deserialize_with = "dates::flexible")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "dates::flexible")]
    pub updated_at: DateTime<Utc>,
}

/// A box inside a room. Named `StorageBox` to stay clear of `std::boxed::Box`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageBox {
    pub id: String,
    pub room_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Single image as a data URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(deserialize_with = "dates::flexible")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "dates::flexible")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub box_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub quantity: u32,
    /// Images as data URIs, in display order.
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(deserialize_with = "dates::flexible")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "dates::flexible")]
    pub updated_at: DateTime<Utc>,
}

/// A capability token granting read access to one room, box or item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Share {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub resource_id: String,
    pub is_public: bool,
    #[serde(deserialize_with = "dates::flexible")]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        deserialize_with = "dates::flexible_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Share {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires| expires <= now)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub action: ActivityAction,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub resource_id: String,
    pub resource_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
    #[serde(deserialize_with = "dates::flexible")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderFrequency {
    #[default]
    Daily,
    Weekly,
}

impl ReminderFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
        }
    }
}

impl FromStr for ReminderFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            other => Err(format!("unknown reminder frequency `{}`", other)),
        }
    }
}

/// User preferences kept beside the inventory document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub notifications_enabled: bool,
    pub reminder_frequency: ReminderFrequency,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            notifications_enabled: true,
            reminder_frequency: ReminderFrequency::Daily,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn item_reads_document_json() {
        let json = r#"{
            "id": "i1",
            "boxId": "b1",
            "name": "Drill",
            "quantity": 2,
            "tags": ["tools"],
            "createdAt": "2024-05-01T10:00:00.000Z",
            "updatedAt": {"__type": "Date", "value": "2024-05-02T10:00:00.000Z"}
        }"#;

        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.box_id, "b1");
        assert_eq!(item.quantity, 2);
        assert!(item.images.is_empty());
        assert_eq!(item.updated_at, Utc.with_ymd_and_hms(2024, 5, 2, 10, 0, 0).unwrap());
    }

    #[test]
    fn share_uses_type_tag_and_skips_missing_expiry() {
        let share = Share {
            id: "tok".into(),
            kind: ResourceKind::Box,
            resource_id: "b1".into(),
            is_public: true,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            expires_at: None,
        };

        let value = serde_json::to_value(&share).unwrap();
        assert_eq!(value["type"], "box");
        assert_eq!(value["resourceId"], "b1");
        assert!(value.get("expiresAt").is_none());
    }

    #[test]
    fn expiry_is_inclusive() {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let share = Share {
            id: "tok".into(),
            kind: ResourceKind::Room,
            resource_id: "r1".into(),
            is_public: true,
            created_at: at,
            expires_at: Some(at),
        };
        assert!(share.is_expired(at));
        assert!(!share.is_expired(at - chrono::Duration::seconds(1)));
    }

    #[test]
    fn resource_kind_parses_its_own_display() {
        for kind in [ResourceKind::Room, ResourceKind::Box, ResourceKind::Item] {
            assert_eq!(kind.to_string().parse::<ResourceKind>().unwrap(), kind);
        }
        assert!("shelf".parse::<ResourceKind>().is_err());
    }
}

//! Backup export and import against the local store.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::info;

use traxlio_db::LocalStore;
use traxlio_types::{
    EXPORT_VERSION, ExportData, ExportFile, ImportMode, ImportSummary, InventoryDocument,
};

use crate::error::{InventoryError, Result};

const INVALID_FORMAT: &str = "Invalid file format. Please select a valid Traxlio backup file.";

/// `traxlio-backup-YYYY-MM-DD.json`
pub fn backup_file_name(now: DateTime<Utc>) -> String {
    format!("traxlio-backup-{}.json", now.format("%Y-%m-%d"))
}

/// Rooms, boxes and items of the local store. Shares and activity are not
/// part of a backup.
pub fn export(store: &LocalStore, now: DateTime<Utc>) -> ExportFile {
    let doc = store.read();
    ExportFile {
        version: EXPORT_VERSION.to_string(),
        exported_at: Some(now),
        data: ExportData {
            rooms: doc.rooms,
            boxes: doc.boxes,
            items: doc.items,
        },
    }
}

/// Check the envelope shape, then decode the records.
pub fn parse_export(text: &str) -> Result<ExportFile> {
    let value: Value = serde_json::from_str(text).map_err(|_| {
        InventoryError::InvalidImport(
            "Failed to read file. Please ensure it's a valid JSON file.".into(),
        )
    })?;

    let data = value.get("data");
    let is_array = |key: &str| data.and_then(|d| d.get(key)).is_some_and(Value::is_array);
    if !(is_array("rooms") && is_array("boxes") && is_array("items")) {
        return Err(InventoryError::InvalidImport(INVALID_FORMAT.into()));
    }

    serde_json::from_value(value)
        .map_err(|e| InventoryError::InvalidImport(format!("{} ({})", INVALID_FORMAT, e)))
}

/// Record counts in a backup, shown before importing.
pub fn preview(file: &ExportFile) -> ImportSummary {
    ImportSummary {
        rooms: file.data.rooms.len(),
        boxes: file.data.boxes.len(),
        items: file.data.items.len(),
    }
}

/// Apply `file` to the local store in one write. Merge keeps existing
/// records and adds only unseen ids; replace starts from an empty document.
pub fn import(store: &LocalStore, file: ExportFile, mode: ImportMode) -> Result<ImportSummary> {
    let (doc, summary) = match mode {
        ImportMode::Replace => {
            let summary = preview(&file);
            let doc = InventoryDocument {
                rooms: file.data.rooms,
                boxes: file.data.boxes,
                items: file.data.items,
                ..Default::default()
            };
            (doc, summary)
        }
        ImportMode::Merge => merge(store.read(), file.data),
    };

    store.write(&doc)?;
    info!(
        ?mode,
        rooms = summary.rooms,
        boxes = summary.boxes,
        items = summary.items,
        "Backup imported"
    );
    Ok(summary)
}

fn merge(mut doc: InventoryDocument, data: ExportData) -> (InventoryDocument, ImportSummary) {
    let mut summary = ImportSummary::default();

    let mut seen: HashSet<String> = doc.rooms.iter().map(|r| r.id.clone()).collect();
    for room in data.rooms {
        if seen.insert(room.id.clone()) {
            doc.rooms.push(room);
            summary.rooms += 1;
        }
    }

    let mut seen: HashSet<String> = doc.boxes.iter().map(|b| b.id.clone()).collect();
    for storage_box in data.boxes {
        if seen.insert(storage_box.id.clone()) {
            doc.boxes.push(storage_box);
            summary.boxes += 1;
        }
    }

    let mut seen: HashSet<String> = doc.items.iter().map(|i| i.id.clone()).collect();
    for item in data.items {
        if seen.insert(item.id.clone()) {
            doc.items.push(item);
            summary.items += 1;
        }
    }

    (doc, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn file_name_uses_utc_date() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 23, 59, 0).unwrap();
        assert_eq!(backup_file_name(now), "traxlio-backup-2024-03-09.json");
    }

    #[test]
    fn rejects_non_json() {
        let err = parse_export("not json").unwrap_err();
        assert!(matches!(err, InventoryError::InvalidImport(_)));
    }

    #[test]
    fn rejects_missing_arrays() {
        for text in [
            r#"{"version":"1.0"}"#,
            r#"{"data":{"rooms":[],"boxes":[]}}"#,
            r#"{"data":{"rooms":{},"boxes":[],"items":[]}}"#,
        ] {
            let err = parse_export(text).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("Invalid backup file: {}", INVALID_FORMAT)
            );
        }
    }

    #[test]
    fn accepts_minimal_envelope() {
        let file = parse_export(r#"{"data":{"rooms":[],"boxes":[],"items":[]}}"#).unwrap();
        assert!(file.version.is_empty());
        assert!(file.exported_at.is_none());
        assert_eq!(preview(&file), ImportSummary::default());
    }

    #[test]
    fn malformed_records_are_invalid_imports() {
        let text = r#"{"data":{"rooms":[{"id":"r1"}],"boxes":[],"items":[]}}"#;
        assert!(matches!(
            parse_export(text),
            Err(InventoryError::InvalidImport(_))
        ));
    }
}

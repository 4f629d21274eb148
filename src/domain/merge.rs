//! Upsert-merge rules for a tree cell
//!
//! Every upsert is a full replacement of the cell's record, except for the
//! photo list: the stored images are the client's still-existing subset
//! followed by the newly uploaded ones.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::domain::Cell;

/// Client-supplied state for one cell.
///
/// `None` and empty strings are equivalent: both are written as empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeFields {
    pub variety: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
    /// Previously stored images the client still wants to keep.
    pub existing_images: Vec<String>,
    /// Public paths of images uploaded with this request.
    pub new_images: Vec<String>,
    pub harvest_info: Vec<Value>,
}

impl TreeFields {
    /// Build the record that replaces whatever the cell held before.
    pub fn into_record(self, cell: Cell) -> TreeRecord {
        TreeRecord {
            cell,
            variety: self.variety.unwrap_or_default(),
            status: self.status.unwrap_or_default(),
            notes: self.notes.unwrap_or_default(),
            images: merge_images(self.existing_images, self.new_images),
            harvest_info: self.harvest_info,
        }
    }
}

/// Complete replacement state of a cell, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeRecord {
    pub cell: Cell,
    pub variety: String,
    pub status: String,
    pub notes: String,
    pub images: Vec<String>,
    pub harvest_info: Vec<Value>,
}

/// Kept images first, then new uploads, each in the order given.
pub fn merge_images(existing: Vec<String>, uploaded: Vec<String>) -> Vec<String> {
    let mut images = existing;
    images.extend(uploaded);
    images
}

/// Parse a JSON-encoded list, downgrading anything malformed to an empty list.
pub fn lenient_list<T: DeserializeOwned>(raw: &str) -> Vec<T> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Vec<T>>(raw) {
        Ok(items) => items,
        Err(e) => {
            warn!("ignoring malformed list payload: {}", e);
            Vec::new()
        }
    }
}

/// List field that accepts a JSON array or a JSON-encoded string of one.
///
/// Malformed input deserializes to an empty list instead of an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LenientList<T>(pub Vec<T>);

impl<T> Default for LenientList<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> LenientList<T> {
    pub fn into_inner(self) -> Vec<T> {
        self.0
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for LenientList<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let items = match value {
            Value::Null => Vec::new(),
            Value::String(raw) => lenient_list(&raw),
            array @ Value::Array(_) => serde_json::from_value(array).unwrap_or_else(|e| {
                warn!("ignoring malformed list payload: {}", e);
                Vec::new()
            }),
            other => {
                warn!("ignoring list payload of unexpected shape: {}", other);
                Vec::new()
            }
        };
        Ok(Self(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn given_missing_scalars_when_building_record_then_writes_empty() {
        let record = TreeFields {
            variety: Some("Ri6".into()),
            ..Default::default()
        }
        .into_record(Cell::new(2, 3));

        assert_eq!(record.cell, Cell::new(2, 3));
        assert_eq!(record.variety, "Ri6");
        assert_eq!(record.status, "");
        assert_eq!(record.notes, "");
        assert!(record.images.is_empty());
        assert!(record.harvest_info.is_empty());
    }

    #[test]
    fn given_kept_and_new_images_when_merging_then_kept_come_first() {
        let images = merge_images(
            vec!["/uploads/a.png".into(), "/uploads/c.png".into()],
            vec!["/uploads/1-b.png".into()],
        );
        assert_eq!(
            images,
            vec!["/uploads/a.png", "/uploads/c.png", "/uploads/1-b.png"]
        );
    }

    #[test]
    fn given_malformed_json_when_parsing_leniently_then_empty() {
        assert!(lenient_list::<String>("[\"a\",").is_empty());
        assert!(lenient_list::<String>("{\"a\": 1}").is_empty());
        assert!(lenient_list::<String>("").is_empty());
        assert_eq!(lenient_list::<String>(r#"["a","b"]"#), vec!["a", "b"]);
    }

    #[test]
    fn given_string_or_array_when_deserializing_lenient_list_then_accepts_both() {
        #[derive(Deserialize)]
        struct Body {
            #[serde(default)]
            items: LenientList<Value>,
        }

        let from_array: Body = serde_json::from_value(json!({"items": [{"kg": 12}]})).unwrap();
        assert_eq!(from_array.items.0, vec![json!({"kg": 12})]);

        let from_string: Body =
            serde_json::from_value(json!({"items": "[{\"kg\": 3}]"})).unwrap();
        assert_eq!(from_string.items.0, vec![json!({"kg": 3})]);

        let malformed: Body = serde_json::from_value(json!({"items": "not json"})).unwrap();
        assert!(malformed.items.0.is_empty());

        let wrong_shape: Body = serde_json::from_value(json!({"items": 42})).unwrap();
        assert!(wrong_shape.items.0.is_empty());

        let missing: Body = serde_json::from_value(json!({})).unwrap();
        assert!(missing.items.0.is_empty());
    }
}

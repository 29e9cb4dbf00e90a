//! The record abstraction every list operation is generic over.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{FieldValue, ModelError, RecordId};

/// Name of the identity member in map-backed records.
pub const ID_FIELD: &str = "id";

/// A record flowing through a list view.
///
/// Identity is the only structural requirement; every other field is looked
/// up by name at runtime so one engine serves every screen.
pub trait Record {
    fn id(&self) -> RecordId;

    /// Value of `name`, or `None` when the record has no such field.
    fn field(&self, name: &str) -> Option<FieldValue>;
}

/// Map-backed record, the shape produced by JSON backends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "serde_json::Map<String, serde_json::Value>",
    into = "serde_json::Map<String, serde_json::Value>"
)]
pub struct DynRecord {
    id: RecordId,
    fields: BTreeMap<String, FieldValue>,
}

impl DynRecord {
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field setter.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Set a field. Setting `id` through here is ignored; identity is fixed.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        let name = name.into();
        if name == ID_FIELD {
            return;
        }
        self.fields.insert(name, value.into());
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    /// Build a record from a parsed JSON value.
    pub fn from_json(value: serde_json::Value) -> Result<Self, ModelError> {
        match value {
            serde_json::Value::Object(map) => Self::try_from(map),
            _ => Err(ModelError::NotAnObject),
        }
    }
}

impl Record for DynRecord {
    fn id(&self) -> RecordId {
        self.id.clone()
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        if name == ID_FIELD {
            return Some(self.id.as_field_value());
        }
        self.fields.get(name).cloned()
    }
}

impl TryFrom<serde_json::Map<String, serde_json::Value>> for DynRecord {
    type Error = ModelError;

    fn try_from(mut map: serde_json::Map<String, serde_json::Value>) -> Result<Self, Self::Error> {
        let raw_id = map
            .remove(ID_FIELD)
            .ok_or(ModelError::MissingId { field: ID_FIELD })?;
        let id = match raw_id {
            serde_json::Value::String(value) => RecordId::Text(value),
            serde_json::Value::Number(number) => match number.as_i64() {
                Some(value) => RecordId::Int(value),
                None => {
                    return Err(ModelError::InvalidId {
                        value: number.to_string(),
                    });
                }
            },
            other => {
                return Err(ModelError::InvalidId {
                    value: other.to_string(),
                });
            }
        };
        let fields = map
            .into_iter()
            .map(|(name, value)| (name, FieldValue::from(value)))
            .collect();
        Ok(Self { id, fields })
    }
}

impl From<DynRecord> for serde_json::Map<String, serde_json::Value> {
    fn from(record: DynRecord) -> Self {
        let mut map = serde_json::Map::new();
        let id = match record.id {
            RecordId::Int(value) => serde_json::Value::from(value),
            RecordId::Text(value) => serde_json::Value::String(value),
        };
        map.insert(ID_FIELD.to_string(), id);
        for (name, value) in record.fields {
            map.insert(name, value.into());
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_id_from_json() {
        let record: DynRecord =
            serde_json::from_str(r#"{"id": 7, "status": "New", "amount": 12.5}"#).unwrap();
        assert_eq!(record.id(), RecordId::Int(7));
        assert_eq!(record.field("status"), Some(FieldValue::text("New")));
        assert_eq!(record.field("amount"), Some(FieldValue::Number(12.5)));
        assert_eq!(record.field("id"), Some(FieldValue::Number(7.0)));
        assert_eq!(record.field("missing"), None);
    }

    #[test]
    fn rejects_records_without_identity() {
        let err = DynRecord::from_json(serde_json::json!({"status": "New"})).unwrap_err();
        assert_eq!(err, ModelError::MissingId { field: "id" });
        let err = DynRecord::from_json(serde_json::json!({"id": true})).unwrap_err();
        assert!(matches!(err, ModelError::InvalidId { .. }));
    }

    #[test]
    fn identity_cannot_be_overwritten() {
        let record = DynRecord::new(1).with("id", "other").with("name", "Acme");
        assert_eq!(record.id(), RecordId::Int(1));
        assert_eq!(record.fields().len(), 1);
    }
}

#![deny(unsafe_code)]

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::FieldValue;

/// Stable identity of a record.
///
/// Backends hand out either integer keys or opaque string keys; both are kept
/// verbatim so `1` and `"1"` stay distinct identities.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl RecordId {
    pub fn as_field_value(&self) -> FieldValue {
        match self {
            Self::Int(value) => FieldValue::Number(*value as f64),
            Self::Text(value) => FieldValue::Text(value.clone()),
        }
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for RecordId {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Parses integers as [`RecordId::Int`] and everything else as text.
impl FromStr for RecordId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Ok(match trimmed.parse::<i64>() {
            Ok(value) => Self::Int(value),
            Err(_) => Self::Text(trimmed.to_string()),
        })
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_integers_and_text() {
        assert_eq!("42".parse::<RecordId>().unwrap(), RecordId::Int(42));
        assert_eq!(
            " lead-7 ".parse::<RecordId>().unwrap(),
            RecordId::Text("lead-7".to_string())
        );
    }

    #[test]
    fn json_keeps_integer_and_string_ids_apart() {
        let int: RecordId = serde_json::from_str("1").unwrap();
        let text: RecordId = serde_json::from_str("\"1\"").unwrap();
        assert_eq!(int, RecordId::Int(1));
        assert_eq!(text, RecordId::Text("1".to_string()));
        assert_ne!(int, text);
    }
}

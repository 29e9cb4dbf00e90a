//! Per-screen list configuration.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use listview_model::DEFAULT_PAGE_SIZE;
use serde::{Deserialize, Serialize};

/// How a field's values compare when sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Case-folded lexicographic order.
    Text,
    /// Numeric order; text values are parsed.
    Number,
    /// Chronological order; text values are parsed as timestamps.
    Date,
}

impl FromStr for FieldKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "string" => Ok(Self::Text),
            "number" | "numeric" => Ok(Self::Number),
            "date" | "datetime" | "timestamp" => Ok(Self::Date),
            other => Err(format!("unknown field kind: {other}")),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Date => "date",
        })
    }
}

/// Field configuration for one list screen.
///
/// Field names are supplied here rather than compiled into the engine, so the
/// same pipeline serves leads, companies, products, and so on.
///
/// # Example
///
/// ```
/// use listview_query::{FieldKind, ListConfig};
///
/// let config = ListConfig::new()
///     .with_searchable_fields(["name", "email"])
///     .with_timestamp_field("createdAt")
///     .with_field_kind("amount", FieldKind::Number)
///     .with_default_page_size(20);
/// assert_eq!(config.field_kind("createdAt"), Some(FieldKind::Date));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    /// Fields matched by free-text search.
    pub searchable_fields: Vec<String>,
    /// Field the date-range filter applies to.
    pub timestamp_field: Option<String>,
    /// Explicit comparison kinds; unlisted fields infer from their values.
    pub field_kinds: BTreeMap<String, FieldKind>,
    /// Page size for a freshly mounted screen.
    pub default_page_size: usize,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            searchable_fields: Vec::new(),
            timestamp_field: None,
            field_kinds: BTreeMap::new(),
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ListConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_searchable_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.searchable_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Set the timestamp field. It is also registered as a date field unless
    /// a kind was already given for it.
    #[must_use]
    pub fn with_timestamp_field(mut self, field: impl Into<String>) -> Self {
        let field = field.into();
        self.field_kinds
            .entry(field.clone())
            .or_insert(FieldKind::Date);
        self.timestamp_field = Some(field);
        self
    }

    #[must_use]
    pub fn with_field_kind(mut self, field: impl Into<String>, kind: FieldKind) -> Self {
        self.field_kinds.insert(field.into(), kind);
        self
    }

    #[must_use]
    pub fn with_default_page_size(mut self, page_size: usize) -> Self {
        self.default_page_size = page_size.max(1);
        self
    }

    pub fn field_kind(&self, field: &str) -> Option<FieldKind> {
        self.field_kinds.get(field).copied()
    }
}

//! Per-screen TOML configuration.
//!
//! ```toml
//! module = "leads"
//! searchable = ["name", "email"]
//! timestamp_field = "createdAt"
//! page_size = 20
//!
//! [fields]
//! amount = "number"
//!
//! [[columns]]
//! key = "id"
//! label = "ID"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use tracing::debug;

use listview_export::ExportColumn;
use listview_model::DEFAULT_PAGE_SIZE;
use listview_query::{FieldKind, ListConfig};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScreenConfig {
    /// Used in export file names and audit entries.
    pub module: String,
    #[serde(default)]
    pub searchable: Vec<String>,
    #[serde(default)]
    pub timestamp_field: Option<String>,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Comparison kind per field, `text`, `number`, or `date`.
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    #[serde(default)]
    pub columns: Vec<ExportColumn>,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl ScreenConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("read screen config {}", path.display()))?;
        let config = Self::parse(&contents)
            .with_context(|| format!("parse screen config {}", path.display()))?;
        debug!(path = %path.display(), module = %config.module, "screen config loaded");
        Ok(config)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        if config.module.trim().is_empty() {
            bail!("`module` must not be empty");
        }
        Ok(config)
    }

    pub fn list_config(&self) -> Result<ListConfig> {
        let mut config = ListConfig::new()
            .with_searchable_fields(self.searchable.iter().cloned())
            .with_default_page_size(self.page_size);
        if let Some(field) = &self.timestamp_field {
            config = config.with_timestamp_field(field.clone());
        }
        for (field, kind) in &self.fields {
            let kind: FieldKind = kind
                .parse()
                .map_err(|err| anyhow!("field `{field}`: {err}"))?;
            config = config.with_field_kind(field.clone(), kind);
        }
        Ok(config)
    }

    /// Export columns; every field in the store when none are configured.
    pub fn export_columns<'a>(&self, fields: impl IntoIterator<Item = &'a str>) -> Vec<ExportColumn> {
        if !self.columns.is_empty() {
            return self.columns.clone();
        }
        let mut columns = vec![ExportColumn::new("id", "id")];
        columns.extend(
            fields
                .into_iter()
                .filter(|field| *field != "id")
                .map(|field| ExportColumn::new(field, field)),
        );
        columns
    }
}

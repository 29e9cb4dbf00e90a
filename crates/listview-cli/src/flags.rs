//! Query flags shared by every subcommand.

use std::str::FromStr;

use chrono::NaiveDate;
use clap::Args;

use listview_model::{DateRange, FieldValue, Record, RecordId, SortOrder, SortSpec};
use listview_query::ListView;

/// `--filter status=New,Won`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterArg {
    pub field: String,
    pub values: Vec<String>,
}

impl FromStr for FilterArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, values) = s
            .split_once('=')
            .ok_or_else(|| format!("expected FIELD=VALUE[,VALUE...], got `{s}`"))?;
        let field = field.trim();
        if field.is_empty() {
            return Err(format!("missing field name in `{s}`"));
        }
        let values: Vec<String> = values
            .split(',')
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect();
        if values.is_empty() {
            return Err(format!("no values given for `{field}`"));
        }
        Ok(Self {
            field: field.to_string(),
            values,
        })
    }
}

/// `--sort createdAt:desc`; a bare field sorts ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortArg {
    pub key: String,
    pub order: SortOrder,
}

impl FromStr for SortArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, order) = match s.rsplit_once(':') {
            Some((key, order)) => (key, order.parse()?),
            None => (s, SortOrder::Asc),
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(format!("missing sort field in `{s}`"));
        }
        Ok(Self {
            key: key.to_string(),
            order,
        })
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct QueryArgs {
    /// Free-text search over the screen's searchable fields.
    #[arg(long)]
    pub search: Option<String>,

    /// Keep records whose FIELD equals one of the values (repeatable).
    #[arg(long = "filter", value_name = "FIELD=V1,V2")]
    pub filters: Vec<FilterArg>,

    #[arg(long, value_name = "FIELD[:asc|desc]")]
    pub sort: Option<SortArg>,

    /// First day of the date range (inclusive).
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub from: Option<NaiveDate>,

    /// Last day of the date range (inclusive).
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub to: Option<NaiveDate>,

    #[arg(long, default_value_t = 1)]
    pub page: usize,

    #[arg(long = "page-size", value_name = "N")]
    pub page_size: Option<usize>,

    /// Mark a record as selected (repeatable).
    #[arg(long = "select", value_name = "ID")]
    pub select: Vec<RecordId>,
}

impl QueryArgs {
    /// Apply the flags in the order a user would: anything that resets the
    /// page goes first, the page index last.
    pub fn apply<R: Record + Clone>(&self, view: &mut ListView<R>) {
        if let Some(page_size) = self.page_size {
            view.set_page_size(page_size);
        }
        for filter in &self.filters {
            let values = filter.values.iter().map(FieldValue::text).collect();
            view.set_filter(filter.field.clone(), values);
        }
        if let Some(search) = &self.search {
            view.set_search_text(search.clone());
        }
        if self.from.is_some() || self.to.is_some() {
            view.set_date_range(Some(DateRange::from_days(self.from, self.to)));
        }
        if let Some(sort) = &self.sort {
            view.set_sort(SortSpec::new(sort.key.clone(), sort.order));
        }
        view.set_page_index(self.page);
        for id in &self.select {
            view.toggle_row(id.clone(), true);
        }
    }
}

//! Query descriptor: the serializable search/filter/sort/paging state of one list.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::FieldValue;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascend" | "ascending" => Ok(Self::Asc),
            "desc" | "descend" | "descending" => Ok(Self::Desc),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        })
    }
}

/// Sort key and direction. Sorting applies only when both are set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: Option<String>,
    pub order: Option<SortOrder>,
}

impl SortSpec {
    pub fn new(key: impl Into<String>, order: SortOrder) -> Self {
        Self {
            key: Some(key.into()),
            order: Some(order),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    /// Key and order when the sort is active.
    pub fn active(&self) -> Option<(&str, SortOrder)> {
        match (&self.key, self.order) {
            (Some(key), Some(order)) => Some((key.as_str(), order)),
            _ => None,
        }
    }
}

/// Inclusive timestamp window; a missing bound leaves that side open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// Whole calendar days: `start` at midnight through the last instant of `end`.
    pub fn from_days(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self {
            start: start
                .and_then(|day| day.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc()),
            end: end
                .and_then(|day| day.and_hms_nano_opt(23, 59, 59, 999_999_999))
                .map(|naive| naive.and_utc()),
        }
    }

    /// True when neither bound is set; such a range constrains nothing.
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start.is_none_or(|start| instant >= start) && self.end.is_none_or(|end| instant <= end)
    }
}

/// Complete description of which subset, order, and page of records to show.
///
/// Fields are private so the paging invariants hold: `page_index` and
/// `page_size` are at least 1, and changing the result set (page size,
/// filters, search text, date range) moves back to the first page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawQuery")]
pub struct QueryDescriptor {
    page_index: usize,
    page_size: usize,
    sort: SortSpec,
    search_text: String,
    filters: BTreeMap<String, Vec<FieldValue>>,
    date_range: Option<DateRange>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawQuery {
    page_index: usize,
    page_size: usize,
    sort: SortSpec,
    search_text: String,
    filters: BTreeMap<String, Vec<FieldValue>>,
    date_range: Option<DateRange>,
}

impl Default for RawQuery {
    fn default() -> Self {
        Self {
            page_index: 1,
            page_size: DEFAULT_PAGE_SIZE,
            sort: SortSpec::default(),
            search_text: String::new(),
            filters: BTreeMap::new(),
            date_range: None,
        }
    }
}

impl From<RawQuery> for QueryDescriptor {
    fn from(raw: RawQuery) -> Self {
        Self {
            page_index: raw.page_index.max(1),
            page_size: raw.page_size.max(1),
            sort: raw.sort,
            search_text: raw.search_text,
            filters: raw.filters,
            date_range: raw.date_range,
        }
    }
}

impl Default for QueryDescriptor {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl QueryDescriptor {
    pub fn new(page_size: usize) -> Self {
        RawQuery {
            page_size,
            ..RawQuery::default()
        }
        .into()
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn filters(&self) -> &BTreeMap<String, Vec<FieldValue>> {
        &self.filters
    }

    pub fn date_range(&self) -> Option<&DateRange> {
        self.date_range.as_ref()
    }

    /// Zero-based offset of the first row on the current page.
    pub fn offset(&self) -> usize {
        (self.page_index - 1).saturating_mul(self.page_size)
    }

    /// Move to `page_index` (values below 1 become 1).
    pub fn set_page_index(&mut self, page_index: usize) {
        self.page_index = page_index.max(1);
    }

    /// Change the page size; returns to page 1 when the size actually changes.
    pub fn set_page_size(&mut self, page_size: usize) {
        let page_size = page_size.max(1);
        if page_size != self.page_size {
            self.page_size = page_size;
            self.page_index = 1;
        }
    }

    /// Change the sort. The page position is kept.
    pub fn set_sort(&mut self, sort: SortSpec) {
        self.sort = sort;
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text != self.search_text {
            self.search_text = text;
            self.page_index = 1;
        }
    }

    /// Replace the accepted values for `field`. An empty list removes the constraint.
    pub fn set_filter(&mut self, field: impl Into<String>, values: Vec<FieldValue>) {
        let field = field.into();
        let changed = if values.is_empty() {
            self.filters.remove(&field).is_some_and(|old| !old.is_empty())
        } else if self.filters.get(&field) == Some(&values) {
            false
        } else {
            self.filters.insert(field, values);
            true
        };
        if changed {
            self.page_index = 1;
        }
    }

    pub fn clear_filters(&mut self) {
        let had_constraints = self.filters.values().any(|values| !values.is_empty());
        self.filters.clear();
        if had_constraints {
            self.page_index = 1;
        }
    }

    pub fn set_date_range(&mut self, range: Option<DateRange>) {
        if range != self.date_range {
            self.date_range = range;
            self.page_index = 1;
        }
    }

    /// Number of pages needed for `total` rows (at least 1).
    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size).max(1)
    }

    /// Pull `page_index` back onto the last page when `total` no longer reaches it.
    ///
    /// Returns true when the page index changed.
    pub fn clamp_page(&mut self, total: usize) -> bool {
        let last = self.page_count(total);
        if self.page_index > last {
            self.page_index = last;
            return true;
        }
        false
    }
}

//! Filter-sort-paginate pipeline.
//!
//! A pure function from `(records, query, config)` to a page. Stages run in a
//! fixed order because each one assumes the previous stages already narrowed
//! the set:
//!
//! 1. date range on the configured timestamp field
//! 2. field filters (AND across fields, OR within one field)
//! 3. free-text search over the configured searchable fields
//! 4. stable sort
//! 5. pagination
//!
//! Malformed queries never fail: unknown fields, empty filter lists, and page
//! indices past the end all degrade to an empty or unconstrained result.

use std::cmp::Ordering;

use listview_model::{DateRange, FieldValue, QueryDescriptor, Record, RecordId, SortOrder};
use tracing::debug;

use crate::config::{FieldKind, ListConfig};

/// Output of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult<R> {
    /// Rows on the requested page.
    pub page_data: Vec<R>,
    /// Number of rows after filtering, before slicing.
    pub total: usize,
    /// Every filtered row in display order, used for export.
    pub all_filtered_and_sorted: Vec<R>,
}

impl<R> Default for QueryResult<R> {
    fn default() -> Self {
        Self {
            page_data: Vec::new(),
            total: 0,
            all_filtered_and_sorted: Vec::new(),
        }
    }
}

impl<R: Record> QueryResult<R> {
    /// Identities of the rows on the current page, in display order.
    pub fn page_ids(&self) -> Vec<RecordId> {
        self.page_data.iter().map(Record::id).collect()
    }
}

/// Run every stage against `records`.
///
/// The input is never modified; the result holds clones.
pub fn run_query<R>(records: &[R], query: &QueryDescriptor, config: &ListConfig) -> QueryResult<R>
where
    R: Record + Clone,
{
    let mut rows: Vec<&R> = records.iter().collect();
    let input = rows.len();

    if let Some(range) = query.date_range() {
        rows = filter_date_range(rows, range, config);
    }
    let after_dates = rows.len();

    rows = filter_fields(rows, query);
    let after_filters = rows.len();

    rows = filter_search(rows, query.search_text(), config);
    let after_search = rows.len();

    if let Some((key, order)) = query.sort().active() {
        rows = sort_rows(rows, key, order, config);
    }

    let all_filtered_and_sorted: Vec<R> = rows.into_iter().cloned().collect();
    let total = all_filtered_and_sorted.len();
    let page_data = paginate(&all_filtered_and_sorted, query);

    debug!(
        input,
        after_dates,
        after_filters,
        after_search,
        total,
        page_index = query.page_index(),
        page_rows = page_data.len(),
        "list query evaluated"
    );

    QueryResult {
        page_data,
        total,
        all_filtered_and_sorted,
    }
}

/// Slice `[(page_index-1)*page_size, page_index*page_size)` out of `rows`.
pub fn paginate<R: Clone>(rows: &[R], query: &QueryDescriptor) -> Vec<R> {
    let start = query.offset();
    if start >= rows.len() {
        return Vec::new();
    }
    let end = start.saturating_add(query.page_size()).min(rows.len());
    rows[start..end].to_vec()
}

fn filter_date_range<'a, R: Record>(
    rows: Vec<&'a R>,
    range: &DateRange,
    config: &ListConfig,
) -> Vec<&'a R> {
    if range.is_unbounded() {
        return rows;
    }
    let Some(field) = config.timestamp_field.as_deref() else {
        debug!("date range ignored: no timestamp field configured");
        return rows;
    };
    rows.into_iter()
        .filter(|record| {
            record
                .field(field)
                .and_then(|value| value.as_instant())
                .is_some_and(|instant| range.contains(instant))
        })
        .collect()
}

fn filter_fields<'a, R: Record>(rows: Vec<&'a R>, query: &QueryDescriptor) -> Vec<&'a R> {
    let active: Vec<(&String, &Vec<FieldValue>)> = query
        .filters()
        .iter()
        .filter(|(_, accepted)| !accepted.is_empty())
        .collect();
    if active.is_empty() {
        return rows;
    }
    rows.into_iter()
        .filter(|record| {
            active.iter().all(|(field, accepted)| {
                let value = record.field(field).unwrap_or_default();
                accepted.iter().any(|candidate| value.matches(candidate))
            })
        })
        .collect()
}

fn filter_search<'a, R: Record>(
    rows: Vec<&'a R>,
    search_text: &str,
    config: &ListConfig,
) -> Vec<&'a R> {
    let needle = fold(search_text.trim());
    if needle.is_empty() {
        return rows;
    }
    rows.into_iter()
        .filter(|record| {
            config.searchable_fields.iter().any(|field| {
                record
                    .field(field)
                    .is_some_and(|value| fold(&value.display_text()).contains(&needle))
            })
        })
        .collect()
}

fn sort_rows<'a, R: Record>(
    rows: Vec<&'a R>,
    key: &str,
    order: SortOrder,
    config: &ListConfig,
) -> Vec<&'a R> {
    let kind = config.field_kind(key);
    let mut keyed: Vec<(Option<FieldValue>, &R)> = rows
        .into_iter()
        .map(|record| (record.field(key).filter(|value| !value.is_null()), record))
        .collect();
    // `sort_by` is stable, so equal keys keep their filtered order.
    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => {
            let ordering = compare_values(a, b, kind);
            match order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        }
    });
    keyed.into_iter().map(|(_, record)| record).collect()
}

/// Compare two present values under `kind`, inferring the kind when unset.
pub fn compare_values(a: &FieldValue, b: &FieldValue, kind: Option<FieldKind>) -> Ordering {
    let kind = kind.unwrap_or_else(|| infer_kind(a, b));
    match kind {
        FieldKind::Number => compare_parsed(a.as_number(), b.as_number(), a, b, f64::total_cmp),
        FieldKind::Date => compare_parsed(a.as_instant(), b.as_instant(), a, b, |x, y| x.cmp(y)),
        FieldKind::Text => compare_text(a, b),
    }
}

fn infer_kind(a: &FieldValue, b: &FieldValue) -> FieldKind {
    match (a, b) {
        (FieldValue::Number(_), FieldValue::Number(_)) => FieldKind::Number,
        (FieldValue::Date(_), FieldValue::Date(_)) => FieldKind::Date,
        _ => FieldKind::Text,
    }
}

/// Parsed values order before unparseable ones; two unparseable values
/// fall back to text order.
fn compare_parsed<T>(
    left: Option<T>,
    right: Option<T>,
    a: &FieldValue,
    b: &FieldValue,
    cmp: impl Fn(&T, &T) -> Ordering,
) -> Ordering {
    match (left, right) {
        (Some(x), Some(y)) => cmp(&x, &y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => compare_text(a, b),
    }
}

fn compare_text(a: &FieldValue, b: &FieldValue) -> Ordering {
    fold(&a.display_text()).cmp(&fold(&b.display_text()))
}

fn fold(value: &str) -> String {
    value.to_lowercase()
}

//! Per-screen list engine.
//!
//! # Architecture
//!
//! Each mounted screen owns one [`ListView`]: its configuration, query,
//! record collection, selection, and the last pipeline result. Every change
//! to the query or the collection re-runs the pipeline synchronously, so the
//! cached result is never stale relative to the inputs.
//!
//! Reloads are tagged with a [`RefreshTicket`]. A response replaces the
//! collection only if no newer reload is still outstanding and none has been
//! applied; otherwise it is reported as [`RefreshApplied::Stale`] and dropped.
//! A reload that fails must be handed back with [`ListView::abandon_refresh`]
//! so that it stops shadowing older responses still in flight.

use std::collections::BTreeSet;

use listview_model::{DateRange, FieldValue, QueryDescriptor, Record, RecordId, SortSpec};
use tracing::{debug, info};

use crate::config::ListConfig;
use crate::pipeline::{QueryResult, paginate, run_query};
use crate::selection::{SelectionSet, VisibleSelection};

/// Sequence tag for one list reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RefreshTicket(u64);

impl RefreshTicket {
    pub fn sequence(self) -> u64 {
        self.0
    }
}

/// Outcome of offering a reload response to the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshApplied {
    /// The collection was replaced. Holds the selected identities that no
    /// longer exist.
    Applied { dropped_selection: Vec<RecordId> },
    /// A newer reload is still outstanding or has already been applied; the
    /// response was ignored and the newer one decides the collection.
    Stale,
}

#[derive(Debug, Clone)]
pub struct ListView<R> {
    config: ListConfig,
    query: QueryDescriptor,
    records: Vec<R>,
    selection: SelectionSet,
    result: QueryResult<R>,
    last_issued: u64,
    last_applied: u64,
    /// Tickets issued but neither applied nor abandoned.
    outstanding: BTreeSet<u64>,
}

impl<R: Record + Clone> ListView<R> {
    /// Mount an empty list using the configured default page size.
    pub fn new(config: ListConfig) -> Self {
        let query = QueryDescriptor::new(config.default_page_size);
        Self {
            config,
            query,
            records: Vec::new(),
            selection: SelectionSet::new(),
            result: QueryResult::default(),
            last_issued: 0,
            last_applied: 0,
            outstanding: BTreeSet::new(),
        }
    }

    pub fn with_records(config: ListConfig, records: Vec<R>) -> Self {
        let mut view = Self::new(config);
        view.records = records;
        view.recompute();
        view
    }

    pub fn config(&self) -> &ListConfig {
        &self.config
    }

    pub fn query(&self) -> &QueryDescriptor {
        &self.query
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn result(&self) -> &QueryResult<R> {
        &self.result
    }

    pub fn page(&self) -> &[R] {
        &self.result.page_data
    }

    pub fn total(&self) -> usize {
        self.result.total
    }

    pub fn page_count(&self) -> usize {
        self.query.page_count(self.result.total)
    }

    /// Every filtered row in display order; the export snapshot source.
    pub fn all_filtered_and_sorted(&self) -> &[R] {
        &self.result.all_filtered_and_sorted
    }

    // -------------------------------------------------------------------------
    // Query
    // -------------------------------------------------------------------------

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.query.set_search_text(text);
        self.recompute();
    }

    pub fn set_filter(&mut self, field: impl Into<String>, values: Vec<FieldValue>) {
        self.query.set_filter(field, values);
        self.recompute();
    }

    pub fn clear_filters(&mut self) {
        self.query.clear_filters();
        self.recompute();
    }

    pub fn set_date_range(&mut self, range: Option<DateRange>) {
        self.query.set_date_range(range);
        self.recompute();
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        self.query.set_sort(sort);
        self.recompute();
    }

    pub fn set_page_index(&mut self, page_index: usize) {
        self.query.set_page_index(page_index);
        self.recompute();
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.query.set_page_size(page_size);
        self.recompute();
    }

    /// Replace the whole query, e.g. when restoring a saved screen state.
    pub fn replace_query(&mut self, query: QueryDescriptor) {
        self.query = query;
        self.recompute();
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    pub fn toggle_row(&mut self, id: RecordId, checked: bool) {
        self.selection.toggle_row(id, checked);
    }

    /// Check or uncheck every row on the current page.
    pub fn toggle_visible(&mut self, checked: bool) {
        let visible = self.result.page_ids();
        self.selection.toggle_visible(checked, &visible);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn is_selected(&self, id: &RecordId) -> bool {
        self.selection.is_selected(id)
    }

    pub fn visible_selection(&self) -> VisibleSelection {
        self.selection.visible_state(&self.result.page_ids())
    }

    /// Selected records from the current collection, in collection order.
    pub fn selected_records(&self) -> Vec<R> {
        self.records
            .iter()
            .filter(|record| self.selection.is_selected(&record.id()))
            .cloned()
            .collect()
    }

    // -------------------------------------------------------------------------
    // Collection
    // -------------------------------------------------------------------------

    /// Replace the collection directly, reconciling selection and page.
    ///
    /// Returns the selected identities that no longer exist.
    pub fn replace_records(&mut self, records: Vec<R>) -> Vec<RecordId> {
        self.records = records;
        let current: Vec<RecordId> = self.records.iter().map(Record::id).collect();
        let dropped = self.selection.reconcile(&current);
        if !dropped.is_empty() {
            debug!(dropped = dropped.len(), "selection reconciled after reload");
        }
        self.recompute();
        dropped
    }

    /// Reserve a ticket for a reload about to be issued.
    pub fn issue_refresh(&mut self) -> RefreshTicket {
        self.last_issued += 1;
        self.outstanding.insert(self.last_issued);
        RefreshTicket(self.last_issued)
    }

    /// Offer a reload response.
    pub fn apply_refresh(&mut self, ticket: RefreshTicket, records: Vec<R>) -> RefreshApplied {
        self.outstanding.remove(&ticket.0);
        let newer_outstanding = self.outstanding.range(ticket.0 + 1..).next().copied();
        if ticket.0 < self.last_applied || newer_outstanding.is_some() {
            info!(
                ticket = ticket.0,
                last_applied = self.last_applied,
                newer_outstanding,
                "discarding stale list response"
            );
            return RefreshApplied::Stale;
        }
        self.last_applied = ticket.0;
        let dropped_selection = self.replace_records(records);
        RefreshApplied::Applied { dropped_selection }
    }

    /// Give up on a reload whose fetch failed.
    pub fn abandon_refresh(&mut self, ticket: RefreshTicket) {
        if self.outstanding.remove(&ticket.0) {
            debug!(ticket = ticket.0, "list reload abandoned");
        }
    }

    fn recompute(&mut self) {
        self.result = run_query(&self.records, &self.query, &self.config);
        if self.query.clamp_page(self.result.total) {
            debug!(
                page_index = self.query.page_index(),
                total = self.result.total,
                "page index clamped"
            );
            self.result.page_data = paginate(&self.result.all_filtered_and_sorted, &self.query);
        }
    }
}

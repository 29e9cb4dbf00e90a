//! Identity-keyed multi-selection that survives paging and sorting.

use std::collections::BTreeSet;

use listview_model::RecordId;
use serde::{Deserialize, Serialize};

/// How much of the visible page is selected, for a tri-state header checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibleSelection {
    None,
    Partial,
    All,
}

/// Set of selected record identities.
///
/// Only identities are held, never record snapshots, so the record collection
/// can be replaced freely. The set is cleared only through [`SelectionSet::clear`];
/// paging and re-sorting leave it alone. After a reload, [`SelectionSet::reconcile`]
/// drops identities that vanished from the collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSet {
    ids: BTreeSet<RecordId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or remove a single identity.
    pub fn toggle_row(&mut self, id: RecordId, checked: bool) {
        if checked {
            self.ids.insert(id);
        } else {
            self.ids.remove(&id);
        }
    }

    /// Check or uncheck every visible row.
    ///
    /// Unchecking removes exactly the visible identities; selections made on
    /// other pages stay.
    pub fn toggle_visible<'a, I>(&mut self, checked: bool, visible: I)
    where
        I: IntoIterator<Item = &'a RecordId>,
    {
        for id in visible {
            if checked {
                self.ids.insert(id.clone());
            } else {
                self.ids.remove(id);
            }
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn is_selected(&self, id: &RecordId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecordId> {
        self.ids.iter()
    }

    /// Keep only identities present in `current`; returns the ones dropped.
    pub fn reconcile<'a, I>(&mut self, current: I) -> Vec<RecordId>
    where
        I: IntoIterator<Item = &'a RecordId>,
    {
        let current: BTreeSet<&RecordId> = current.into_iter().collect();
        let dropped: Vec<RecordId> = self
            .ids
            .iter()
            .filter(|id| !current.contains(id))
            .cloned()
            .collect();
        for id in &dropped {
            self.ids.remove(id);
        }
        dropped
    }

    /// Selection state of the visible rows.
    pub fn visible_state<'a, I>(&self, visible: I) -> VisibleSelection
    where
        I: IntoIterator<Item = &'a RecordId>,
    {
        let mut seen = 0usize;
        let mut selected = 0usize;
        for id in visible {
            seen += 1;
            if self.ids.contains(id) {
                selected += 1;
            }
        }
        match selected {
            0 => VisibleSelection::None,
            n if n == seen => VisibleSelection::All,
            _ => VisibleSelection::Partial,
        }
    }
}

impl<'a> IntoIterator for &'a SelectionSet {
    type Item = &'a RecordId;
    type IntoIter = std::collections::btree_set::Iter<'a, RecordId>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter()
    }
}

//! The authoritative record collection behind a list.

use std::future::Future;

use listview_model::{Record, RecordId};

use crate::error::SourceError;
use crate::outcome::MutationOutcome;

/// One full listing. The engine filters and pages client side, so `records`
/// is the whole eligible set.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<R> {
    pub records: Vec<R>,
    /// Count reported by the source, when it reports one.
    pub total: Option<usize>,
}

impl<R> Listing<R> {
    pub fn new(records: Vec<R>) -> Self {
        Self {
            records,
            total: None,
        }
    }

    #[must_use]
    pub fn with_total(mut self, total: usize) -> Self {
        self.total = Some(total);
        self
    }
}

/// Backing store for one record type.
///
/// Mutations never fail with an `Err`; every failure is folded into a
/// [`MutationOutcome`] so the coordinator can classify it.
pub trait RecordSource {
    type Record: Record + Clone;
    type Payload;

    fn list(&self) -> impl Future<Output = Result<Listing<Self::Record>, SourceError>>;

    fn create(&self, payload: Self::Payload) -> impl Future<Output = MutationOutcome>;

    fn update(&self, payload: Self::Payload) -> impl Future<Output = MutationOutcome>;

    fn delete(&self, id: RecordId) -> impl Future<Output = MutationOutcome>;
}

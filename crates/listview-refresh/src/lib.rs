//! Mutation-refresh coordination.
//!
//! A [`RefreshCoordinator`] sits between a screen's [`ListView`] and its
//! [`RecordSource`]. It performs create, update, and delete calls, tells the
//! user what happened through a [`Notifier`], and reloads the list after
//! every success.
//!
//! [`ListView`]: listview_query::ListView
//! [`Notifier`]: listview_model::Notifier

mod coordinator;
mod error;
mod outcome;
mod source;

pub use coordinator::{
    BulkDelete, GENERIC_FAILURE_TEXT, REFRESH_FAILURE_TEXT, RefreshCoordinator, Settled,
};
pub use error::{Result, SourceError};
pub use outcome::{MutationKind, MutationOutcome};
pub use source::{Listing, RecordSource};

pub use listview_model::{Notification, NotificationKind, Notifier};
pub use listview_query::{RefreshApplied, RefreshTicket};

//! Binds "a mutation succeeded" to "reload the list from the source".
//!
//! There is no optimistic local patching: after every successful create,
//! update, or delete the whole listing is fetched again and handed to the
//! [`ListView`], which reconciles the selection and clamps the page. The
//! query itself survives untouched.
//!
//! The view is shared through a [`RefCell`] and only borrowed between awaits,
//! so a screen may keep editing its query while a request is in flight.
//! Every refetch takes a ticket before awaiting the source; a response that
//! arrives after a newer refetch was issued is discarded.

use std::cell::RefCell;

use tracing::{info, warn};

use listview_model::{Notification, Notifier, RecordId};
use listview_query::{ListView, RefreshApplied};

use crate::error::SourceError;
use crate::outcome::{MutationKind, MutationOutcome};
use crate::source::{Listing, RecordSource};

/// Shown for transport failures, whose details are logged instead.
pub const GENERIC_FAILURE_TEXT: &str = "Something went wrong. Please try again.";

/// Shown when the list could not be reloaded.
pub const REFRESH_FAILURE_TEXT: &str = "Could not refresh the list. Please try again.";

/// How a mutation outcome was handled.
#[derive(Debug, Clone, PartialEq)]
pub enum Settled {
    /// The mutation succeeded and the list was reloaded (or the reload lost
    /// the race to a newer one).
    Refreshed {
        affected_id: Option<RecordId>,
        applied: RefreshApplied,
    },
    /// The mutation succeeded but the reload failed; the previous records
    /// are still shown.
    RefreshFailed {
        affected_id: Option<RecordId>,
        error: SourceError,
    },
    Rejected { message: String },
    TransportFailed,
}

/// Result of deleting every selected record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkDelete {
    pub deleted: Vec<RecordId>,
    pub failed: Vec<RecordId>,
    /// Outcome of the single reload, when at least one delete succeeded.
    pub refresh: Option<Result<RefreshApplied, SourceError>>,
}

#[derive(Debug)]
pub struct RefreshCoordinator<S, N> {
    source: S,
    notifier: N,
}

impl<S, N> RefreshCoordinator<S, N>
where
    S: RecordSource,
    N: Notifier,
{
    pub fn new(source: S, notifier: N) -> Self {
        Self { source, notifier }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub async fn create(
        &self,
        view: &RefCell<ListView<S::Record>>,
        payload: S::Payload,
    ) -> Settled {
        let outcome = self.source.create(payload).await;
        self.settle(view, Some(MutationKind::Create), outcome).await
    }

    pub async fn update(
        &self,
        view: &RefCell<ListView<S::Record>>,
        payload: S::Payload,
    ) -> Settled {
        let outcome = self.source.update(payload).await;
        self.settle(view, Some(MutationKind::Update), outcome).await
    }

    pub async fn delete(&self, view: &RefCell<ListView<S::Record>>, id: RecordId) -> Settled {
        let outcome = self.source.delete(id).await;
        self.settle(view, Some(MutationKind::Delete), outcome).await
    }

    /// Apply the refresh policy to an outcome obtained elsewhere.
    pub async fn handle_outcome(
        &self,
        view: &RefCell<ListView<S::Record>>,
        outcome: MutationOutcome,
    ) -> Settled {
        self.settle(view, None, outcome).await
    }

    /// Fetch the listing and hand it to the view.
    ///
    /// A failure leaves the current records in place and notifies once.
    pub async fn reload(
        &self,
        view: &RefCell<ListView<S::Record>>,
    ) -> Result<RefreshApplied, SourceError> {
        let ticket = view.borrow_mut().issue_refresh();
        let listing = match self.source.list().await {
            Ok(listing) => listing,
            Err(err) => {
                view.borrow_mut().abandon_refresh(ticket);
                warn!(ticket = ticket.sequence(), error = %err, "list refresh failed");
                self.notifier.notify(Notification::error(REFRESH_FAILURE_TEXT));
                return Err(err);
            }
        };
        let Listing { records, total } = listing;
        if let Some(reported) = total.filter(|reported| *reported != records.len()) {
            warn!(
                reported,
                received = records.len(),
                "listing total disagrees with record count"
            );
        }
        let received = records.len();
        let applied = view.borrow_mut().apply_refresh(ticket, records);
        if let RefreshApplied::Applied { dropped_selection } = &applied {
            info!(
                ticket = ticket.sequence(),
                records = received,
                dropped_selection = dropped_selection.len(),
                "list refreshed"
            );
        }
        Ok(applied)
    }

    /// Delete every selected record, in selection order, then reload once.
    pub async fn delete_selected(&self, view: &RefCell<ListView<S::Record>>) -> BulkDelete {
        let ids: Vec<RecordId> = view.borrow().selection().iter().cloned().collect();
        let mut report = BulkDelete::default();
        if ids.is_empty() {
            self.notifier
                .notify(Notification::info("No records selected"));
            return report;
        }

        for id in ids {
            match self.source.delete(id.clone()).await {
                MutationOutcome::Success { .. } => report.deleted.push(id),
                MutationOutcome::BusinessError { message } => {
                    warn!(id = %id, %message, "delete rejected");
                    self.notifier.notify(Notification::error(message));
                    report.failed.push(id);
                }
                MutationOutcome::TransportError { message } => {
                    warn!(id = %id, message = message.as_deref().unwrap_or(""), "delete failed");
                    self.notifier.notify(Notification::error(GENERIC_FAILURE_TEXT));
                    report.failed.push(id);
                }
            }
        }

        if !report.deleted.is_empty() {
            let text = match report.deleted.len() {
                1 => "Deleted 1 record".to_string(),
                count => format!("Deleted {count} records"),
            };
            self.notifier.notify(Notification::success(text));
            report.refresh = Some(self.reload(view).await);
        }
        report
    }

    async fn settle(
        &self,
        view: &RefCell<ListView<S::Record>>,
        kind: Option<MutationKind>,
        outcome: MutationOutcome,
    ) -> Settled {
        match outcome {
            MutationOutcome::Success { affected_id } => {
                info!(?kind, affected_id = ?affected_id, "mutation succeeded");
                let text = kind.map_or("Changes saved", MutationKind::success_text);
                self.notifier.notify(Notification::success(text));
                match self.reload(view).await {
                    Ok(applied) => Settled::Refreshed {
                        affected_id,
                        applied,
                    },
                    Err(error) => Settled::RefreshFailed { affected_id, error },
                }
            }
            MutationOutcome::BusinessError { message } => {
                warn!(?kind, %message, "mutation rejected");
                self.notifier.notify(Notification::error(message.clone()));
                Settled::Rejected { message }
            }
            MutationOutcome::TransportError { message } => {
                warn!(
                    ?kind,
                    message = message.as_deref().unwrap_or(""),
                    "mutation transport failure"
                );
                self.notifier.notify(Notification::error(GENERIC_FAILURE_TEXT));
                Settled::TransportFailed
            }
        }
    }
}

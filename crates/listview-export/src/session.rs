//! Reason-gated export state machine.
//!
//! ```text
//! Idle ──request──▶ ReasonPending ──submit──▶ Submitting ──audit ok──▶ Serializing ──saved──▶ Idle
//!   ▲                  │   ▲                      │
//!   └──────cancel──────┘   └──── audit failed ────┘
//! ```
//!
//! The audit submission and the serialization are strictly sequential: no
//! CSV byte is produced before the audit log has accepted the reason. A
//! request with nothing to export never leaves `Idle`.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use listview_model::{Notification, Notifier, Record};

use crate::error::{ExportError, Result};
use crate::job::{ExportJob, ExportStatus, validate_reason};
use crate::traits::{AuditLog, FileSaver};
use crate::writer::{ExportColumn, ExportFile, export_file_name, write_csv};

/// Current phase of the export flow.
///
/// `Submitting` and `Serializing` are only observed while
/// [`ExportSession::submit`] is in flight. The job itself lives in that future:
/// dropping the future discards it and puts the session back to `Idle`.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportPhase<R> {
    Idle,
    ReasonPending {
        job: ExportJob<R>,
        /// Last validation or audit error, shown next to the reason field.
        error: Option<String>,
    },
    Submitting,
    Serializing,
}

impl<R> Default for ExportPhase<R> {
    fn default() -> Self {
        Self::Idle
    }
}

/// Result of asking for an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// The filtered set was empty; the user was told and nothing changed.
    NothingToExport,
    /// A fresh job is waiting for the user's reason.
    AwaitingReason,
}

#[derive(Debug, Clone)]
pub struct ExportSession<R> {
    phase: ExportPhase<R>,
}

impl<R> Default for ExportSession<R> {
    fn default() -> Self {
        Self {
            phase: ExportPhase::Idle,
        }
    }
}

impl<R: Record> ExportSession<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &ExportPhase<R> {
        &self.phase
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, ExportPhase::Idle)
    }

    pub fn pending_job(&self) -> Option<&ExportJob<R>> {
        match &self.phase {
            ExportPhase::ReasonPending { job, .. } => Some(job),
            _ => None,
        }
    }

    /// Reason text to pre-fill after a failed attempt.
    pub fn pending_reason(&self) -> Option<&str> {
        self.pending_job().map(|job| job.reason.as_str())
    }

    pub fn pending_error(&self) -> Option<&str> {
        match &self.phase {
            ExportPhase::ReasonPending { error, .. } => error.as_deref(),
            _ => None,
        }
    }

    /// Start an export of `rows`, a snapshot of the filtered and sorted set.
    ///
    /// Any previous attempt is discarded.
    pub fn request<N: Notifier>(
        &mut self,
        rows: Vec<R>,
        module_name: &str,
        columns: Vec<ExportColumn>,
        today: NaiveDate,
        notifier: &N,
    ) -> Result<RequestOutcome> {
        if columns.is_empty() {
            return Err(ExportError::NoColumns);
        }
        self.phase = ExportPhase::Idle;
        if rows.is_empty() {
            notifier.notify(Notification::info("Nothing to export"));
            return Ok(RequestOutcome::NothingToExport);
        }
        let file_name = export_file_name(module_name, today);
        info!(
            module = module_name,
            file = %file_name,
            rows = rows.len(),
            "export requested"
        );
        self.phase = ExportPhase::ReasonPending {
            job: ExportJob::new(module_name, file_name, rows, columns),
            error: None,
        };
        Ok(RequestOutcome::AwaitingReason)
    }

    /// Close the reason dialog without exporting.
    pub fn cancel(&mut self) {
        if !self.is_idle() {
            info!("export cancelled");
        }
        self.phase = ExportPhase::Idle;
    }

    /// Validate `reason`, record it with the audit log, then serialize and save.
    ///
    /// A validation error keeps the job pending and produces no notification;
    /// it is reported inline through [`ExportSession::pending_error`]. An audit
    /// failure notifies once and returns to the reason prompt with the text
    /// preserved. Serialization or save failures notify once and drop the job.
    pub async fn submit<A, F, N>(
        &mut self,
        reason: &str,
        audit: &A,
        saver: &F,
        notifier: &N,
    ) -> Result<ExportFile>
    where
        A: AuditLog,
        F: FileSaver,
        N: Notifier,
    {
        let mut job = match std::mem::take(&mut self.phase) {
            ExportPhase::ReasonPending { job, .. } => job,
            other => {
                self.phase = other;
                return Err(ExportError::NotAwaitingReason);
            }
        };

        job.reason = reason.to_string();
        match validate_reason(reason) {
            Ok(valid) => job.reason = valid,
            Err(err) => {
                self.phase = ExportPhase::ReasonPending {
                    job,
                    error: Some(err.to_string()),
                };
                return Err(err);
            }
        }

        job.status = ExportStatus::Submitting;
        let mut phase = PhaseGuard::new(&mut self.phase, ExportPhase::Submitting);
        let submission = job.submission();
        if let Err(err) = audit.submit_reason(&submission).await {
            warn!(module = %job.module_name, error = %err, "export reason rejected");
            job.status = ExportStatus::Failed;
            notifier.notify(Notification::error(format!(
                "Export was not recorded: {err}"
            )));
            let error = Some(err.to_string());
            phase.settle(ExportPhase::ReasonPending { job, error });
            return Err(err.into());
        }

        phase.set(ExportPhase::Serializing);
        let result = serialize_and_save(&job, saver);
        phase.settle(ExportPhase::Idle);
        match result {
            Ok(file) => {
                job.status = ExportStatus::Succeeded;
                info!(
                    module = %job.module_name,
                    file = %file.file_name,
                    rows = file.row_count,
                    sha256 = %file.sha256,
                    "export completed"
                );
                notifier.notify(Notification::success(format!(
                    "Exported {} records to {}",
                    file.row_count, file.file_name
                )));
                Ok(file)
            }
            Err(err) => {
                warn!(module = %job.module_name, error = %err, "export failed");
                notifier.notify(Notification::error(format!("Export failed: {err}")));
                Err(err)
            }
        }
    }
}

/// Holds the session phase while `submit` awaits; resets it to `Idle` if the
/// future is dropped before the phase is settled.
struct PhaseGuard<'a, R> {
    phase: &'a mut ExportPhase<R>,
    settled: bool,
}

impl<'a, R> PhaseGuard<'a, R> {
    fn new(phase: &'a mut ExportPhase<R>, initial: ExportPhase<R>) -> Self {
        *phase = initial;
        Self {
            phase,
            settled: false,
        }
    }

    fn set(&mut self, next: ExportPhase<R>) {
        *self.phase = next;
    }

    fn settle(mut self, last: ExportPhase<R>) {
        *self.phase = last;
        self.settled = true;
    }
}

impl<R> Drop for PhaseGuard<'_, R> {
    fn drop(&mut self) {
        if !self.settled {
            debug!("export submit dropped mid-flight");
            *self.phase = ExportPhase::Idle;
        }
    }
}

fn serialize_and_save<R: Record, F: FileSaver>(job: &ExportJob<R>, saver: &F) -> Result<ExportFile> {
    let bytes = write_csv(&job.rows, &job.columns)?;
    let file = ExportFile::new(job.file_name.clone(), bytes, job.rows.len());
    saver.save(&file).map_err(|source| ExportError::Save {
        file_name: file.file_name.clone(),
        source,
    })?;
    Ok(file)
}

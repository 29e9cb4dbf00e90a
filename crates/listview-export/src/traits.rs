//! Collaborators the export flow talks to.

use std::future::Future;
use std::io;

use crate::error::AuditError;
use crate::job::ReasonSubmission;
use crate::writer::ExportFile;

/// Audit trail that records why data left the system.
pub trait AuditLog {
    fn submit_reason(
        &self,
        submission: &ReasonSubmission,
    ) -> impl Future<Output = Result<(), AuditError>>;
}

/// Hands a finished file to the user (browser download, save dialog, disk).
pub trait FileSaver {
    fn save(&self, file: &ExportFile) -> io::Result<()>;
}

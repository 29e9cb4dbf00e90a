//! Error types for export operations.

use thiserror::Error;

/// Failure reported by the audit-log collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuditError {
    /// The audit service answered but refused the submission.
    #[error("{message}")]
    Rejected { message: String },

    /// The audit service could not be reached.
    #[error("audit log unavailable: {message}")]
    Transport { message: String },
}

/// Errors that can occur while running an export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Reason shorter than the audit minimum.
    #[error("reason must be at least {min} characters (got {actual})")]
    ReasonTooShort { min: usize, actual: usize },

    /// Reason longer than the audit maximum.
    #[error("reason must be at most {max} characters (got {actual})")]
    ReasonTooLong { max: usize, actual: usize },

    /// No column mapping was supplied.
    #[error("export needs at least one column")]
    NoColumns,

    /// `submit` was called without a pending export.
    #[error("no export is waiting for a reason")]
    NotAwaitingReason,

    /// The audit log refused or failed the reason submission.
    #[error("export reason was not recorded: {0}")]
    Audit(#[from] AuditError),

    /// CSV encoding failed.
    #[error("failed to encode CSV: {0}")]
    Csv(#[from] csv::Error),

    /// The file could not be handed to the saver.
    #[error("failed to save {file_name}: {source}")]
    Save {
        file_name: String,
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    /// True for errors caught before any I/O, shown inline next to the reason field.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ReasonTooShort { .. } | Self::ReasonTooLong { .. })
    }

    /// True for errors `ExportSession::submit` has already shown through the notifier.
    pub fn was_notified(&self) -> bool {
        matches!(self, Self::Audit(_) | Self::Csv(_) | Self::Save { .. })
    }
}

/// Result type alias for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

//! Export job data and reason validation.

use serde::{Deserialize, Serialize};

use crate::error::ExportError;
use crate::writer::ExportColumn;

pub const MIN_REASON_CHARS: usize = 10;
pub const MAX_REASON_CHARS: usize = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportStatus {
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

/// Payload sent to the audit log before any data leaves the screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasonSubmission {
    pub reason: String,
    pub module_name: String,
    pub file_name: String,
}

/// State of one export attempt.
///
/// Created fresh by every export request and dropped on completion or
/// cancellation; a job is never reused. `rows` is a snapshot copy taken when
/// the export was requested.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportJob<R> {
    pub reason: String,
    pub module_name: String,
    pub file_name: String,
    pub rows: Vec<R>,
    pub columns: Vec<ExportColumn>,
    pub status: ExportStatus,
}

impl<R> ExportJob<R> {
    pub fn new(
        module_name: impl Into<String>,
        file_name: impl Into<String>,
        rows: Vec<R>,
        columns: Vec<ExportColumn>,
    ) -> Self {
        Self {
            reason: String::new(),
            module_name: module_name.into(),
            file_name: file_name.into(),
            rows,
            columns,
            status: ExportStatus::Idle,
        }
    }

    pub fn submission(&self) -> ReasonSubmission {
        ReasonSubmission {
            reason: self.reason.clone(),
            module_name: self.module_name.clone(),
            file_name: self.file_name.clone(),
        }
    }
}

/// Validate a justification and return it trimmed.
///
/// Length is counted in characters, not bytes, after trimming.
pub fn validate_reason(reason: &str) -> Result<String, ExportError> {
    let trimmed = reason.trim();
    let actual = trimmed.chars().count();
    if actual < MIN_REASON_CHARS {
        return Err(ExportError::ReasonTooShort {
            min: MIN_REASON_CHARS,
            actual,
        });
    }
    if actual > MAX_REASON_CHARS {
        return Err(ExportError::ReasonTooLong {
            max: MAX_REASON_CHARS,
            actual,
        });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_bounds_are_inclusive() {
        assert!(validate_reason(&"a".repeat(10)).is_ok());
        assert!(validate_reason(&"a".repeat(255)).is_ok());
        assert!(matches!(
            validate_reason(&"a".repeat(256)),
            Err(ExportError::ReasonTooLong { actual: 256, .. })
        ));
        assert!(matches!(
            validate_reason("short"),
            Err(ExportError::ReasonTooShort { actual: 5, .. })
        ));
    }

    #[test]
    fn reason_is_trimmed_and_counted_in_chars() {
        assert!(validate_reason("   short    ").is_err());
        assert_eq!(validate_reason("  quarterly audit ").unwrap(), "quarterly audit");
        assert!(validate_reason("éééééééééé").is_ok());
    }
}

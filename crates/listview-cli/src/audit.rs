//! Append-only JSON Lines audit log.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use listview_export::{AuditError, AuditLog, ReasonSubmission};

/// One line of the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub recorded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub submission: ReasonSubmission,
}

#[derive(Debug, Clone)]
pub struct FileAuditLog {
    path: PathBuf,
}

impl FileAuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse every entry written so far.
    pub fn entries(&self) -> Result<Vec<AuditEntry>, AuditError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(transport(&err)),
        };
        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(|err| transport(&err)))
            .collect()
    }

    fn append(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| transport(&err))?;
        }
        let mut line = serde_json::to_string(entry).map_err(|err| transport(&err))?;
        line.push('\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|err| transport(&err))?;
        file.write_all(line.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|err| transport(&err))
    }
}

fn transport(err: &dyn std::fmt::Display) -> AuditError {
    AuditError::Transport {
        message: err.to_string(),
    }
}

impl AuditLog for FileAuditLog {
    async fn submit_reason(&self, submission: &ReasonSubmission) -> Result<(), AuditError> {
        let entry = AuditEntry {
            recorded_at: Utc::now(),
            submission: submission.clone(),
        };
        self.append(&entry)?;
        info!(
            path = %self.path.display(),
            module = %submission.module_name,
            file = %submission.file_name,
            "export reason recorded"
        );
        Ok(())
    }
}

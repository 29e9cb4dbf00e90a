//! Reason-gated CSV export.
//!
//! Exporting a list is a two-phase commit: the user's justification is first
//! recorded with an audit log, and only after that succeeds is the filtered
//! set serialized and handed to a file saver.
//!
//! # Example
//!
//! ```
//! use listview_export::{ExportColumn, write_csv};
//! use listview_model::DynRecord;
//!
//! let rows = vec![DynRecord::new(1).with("name", "Acme, Inc.")];
//! let columns = vec![ExportColumn::new("id", "ID"), ExportColumn::new("name", "Name")];
//! let bytes = write_csv(&rows, &columns).unwrap();
//! assert!(bytes.ends_with(b"1,\"Acme, Inc.\"\n"));
//! ```

mod error;
pub mod job;
mod session;
mod traits;
pub mod writer;

pub use error::{AuditError, ExportError, Result};
pub use job::{
    ExportJob, ExportStatus, MAX_REASON_CHARS, MIN_REASON_CHARS, ReasonSubmission,
    validate_reason,
};
pub use session::{ExportPhase, ExportSession, RequestOutcome};
pub use traits::{AuditLog, FileSaver};
pub use writer::{ExportColumn, ExportFile, UTF8_BOM, export_file_name, sha256_hex, write_csv};

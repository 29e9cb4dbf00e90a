//! List query engine: the filter-sort-paginate pipeline, cross-page
//! selection, and the per-screen [`ListView`] that ties them together.
//!
//! # Example
//!
//! ```
//! use listview_model::{DynRecord, FieldValue, RecordId};
//! use listview_query::{ListConfig, ListView};
//!
//! let records = vec![
//!     DynRecord::new(1).with("status", "New"),
//!     DynRecord::new(2).with("status", "Won"),
//! ];
//! let mut view = ListView::with_records(ListConfig::new(), records);
//! view.set_filter("status", vec![FieldValue::text("Won")]);
//! assert_eq!(view.total(), 1);
//! assert_eq!(view.result().page_ids(), vec![RecordId::Int(2)]);
//! ```

pub mod config;
pub mod pipeline;
pub mod selection;
pub mod view;

pub use config::{FieldKind, ListConfig};
pub use pipeline::{QueryResult, compare_values, paginate, run_query};
pub use selection::{SelectionSet, VisibleSelection};
pub use view::{ListView, RefreshApplied, RefreshTicket};

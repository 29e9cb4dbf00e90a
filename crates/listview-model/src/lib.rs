//! Data model shared by every list view: records, identities, field values,
//! the query descriptor, and the notification sink.

pub mod error;
pub mod ids;
pub mod notify;
pub mod query;
pub mod record;
pub mod value;

pub use error::ModelError;
pub use ids::RecordId;
pub use notify::{Notification, NotificationKind, Notifier, TracingNotifier};
pub use query::{DEFAULT_PAGE_SIZE, DateRange, QueryDescriptor, SortOrder, SortSpec};
pub use record::{DynRecord, ID_FIELD, Record};
pub use value::{FieldValue, parse_instant};

/// Data model for TransportAudit.
///
/// Re-exports the record, record-set, and workload-bucket types.
pub mod bucket;
pub mod format;
pub mod record;
pub mod record_set;

pub use bucket::{BucketKey, HourlyInequality, WorkloadBucket};
pub use record::{DurationStatus, TransportRecord};
pub use record_set::{Diagnostics, RecordSet};

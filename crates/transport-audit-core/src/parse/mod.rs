/// Parsing of free-text transport log fields.
pub mod timestamp;

pub use timestamp::{parse_timestamp, DateOrder, TimestampParser};

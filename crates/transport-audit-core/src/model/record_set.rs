/// An ordered, immutable snapshot of transport records plus the
/// data-quality diagnostics gathered while deriving them.
///
/// Analyses only ever borrow a `RecordSet`, so independent analyses can run
/// concurrently against the same snapshot without any locking.
use super::record::{DurationStatus, TransportRecord};
use serde::Serialize;
use tracing::info;

/// Counters for records that some analysis will have to skip.
///
/// None of these are errors: affected records are excluded only from the
/// computations that need the missing value.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    /// Rows offered to the record set (before any filtering).
    pub total_rows: u64,
    /// Records whose start or end instant is absent or unparseable.
    pub unparseable_timestamps: u64,
    /// Records whose end precedes their start (duration clamped to 0).
    pub negative_durations: u64,
    /// Records without a transporter id.
    pub missing_worker: u64,
    /// Records dropped by the maximum-duration filter.
    pub filtered_long: u64,
    /// Records dropped by field-value filters.
    pub filtered_by_value: u64,
}

impl Diagnostics {
    fn tally(&mut self, records: &[TransportRecord]) {
        for rec in records {
            match rec.duration {
                DurationStatus::Unavailable => self.unparseable_timestamps += 1,
                DurationStatus::ClampedNegative { .. } => self.negative_durations += 1,
                DurationStatus::Valid { .. } => {}
            }
            if rec.transporter_id.is_none() {
                self.missing_worker += 1;
            }
        }
    }
}

/// The record snapshot handed to every analysis.
#[derive(Debug, Default, Clone)]
pub struct RecordSet {
    records: Vec<TransportRecord>,
    diagnostics: Diagnostics,
}

impl RecordSet {
    /// Build a record set, tallying diagnostics over `records`.
    pub fn from_records(records: Vec<TransportRecord>) -> Self {
        let mut diagnostics = Diagnostics {
            total_rows: records.len() as u64,
            ..Diagnostics::default()
        };
        diagnostics.tally(&records);
        Self {
            records,
            diagnostics,
        }
    }

    /// Keep only records for which `keep` returns `true`.
    ///
    /// The per-record counters are recounted over the survivors, so they
    /// always describe the records actually analysed. `total_rows` and
    /// `filtered_long` are unchanged; the number removed is added to
    /// `filtered_by_value`.
    pub fn retain_matching(mut self, keep: impl FnMut(&TransportRecord) -> bool) -> Self {
        let before = self.records.len();
        self.records.retain(keep);
        let d = &mut self.diagnostics;
        d.filtered_by_value += (before - self.records.len()) as u64;
        d.unparseable_timestamps = 0;
        d.negative_durations = 0;
        d.missing_worker = 0;
        d.tally(&self.records);
        self
    }

    /// Drop records whose usable duration exceeds `max_minutes`.
    ///
    /// Records without a usable duration are kept — they still count in
    /// distributions that do not need a duration. The number removed is
    /// added to `filtered_long`.
    pub fn without_longer_than(mut self, max_minutes: f64) -> Self {
        let before = self.records.len();
        self.records
            .retain(|rec| rec.duration_minutes().map_or(true, |m| m <= max_minutes));
        let removed = (before - self.records.len()) as u64;
        self.diagnostics.filtered_long += removed;

        info!(
            "Filtered out {removed} transports longer than {max_minutes} minutes; {} remain",
            self.records.len()
        );
        self
    }

    #[inline]
    pub fn records(&self) -> &[TransportRecord] {
        &self.records
    }

    #[inline]
    pub fn diagnostics(&self) -> Diagnostics {
        self.diagnostics
    }

    /// Iterate all records in input order.
    pub fn iter(&self) -> std::slice::Iter<'_, TransportRecord> {
        self.records.iter()
    }

    /// Iterate `(record, minutes)` for records with a usable duration.
    pub fn with_duration(&self) -> impl Iterator<Item = (&TransportRecord, f64)> {
        self.records
            .iter()
            .filter_map(|rec| rec.duration_minutes().map(|m| (rec, m)))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Vec<TransportRecord>> for RecordSet {
    fn from(records: Vec<TransportRecord>) -> Self {
        Self::from_records(records)
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a TransportRecord;
    type IntoIter = std::slice::Iter<'a, TransportRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

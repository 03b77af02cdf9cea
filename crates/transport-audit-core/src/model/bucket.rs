/// Workload buckets — one per observed time window.
///
/// A bucket is fully determined by the records that fall into its window;
/// there is no way to mutate one after the workload engine builds it.
use chrono::NaiveDateTime;
use compact_str::CompactString;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque, totally ordered time-window label.
///
/// Wraps the window's start instant; ordering is chronological and the
/// display form is `YYYY-MM-DD HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BucketKey(pub NaiveDateTime);

impl BucketKey {
    #[inline]
    pub fn start(self) -> NaiveDateTime {
        self.0
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M"))
    }
}

impl Serialize for BucketKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Per-window workload shares and the inequality metrics derived from them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkloadBucket {
    pub bucket_key: BucketKey,
    /// Hour-of-day (0–23) of the window start.
    pub hour: u32,
    /// Worker id → percentage of the bucket's total duration.
    /// Values sum to 100 whenever `total_duration_minutes > 0`.
    pub workload_details: BTreeMap<CompactString, f64>,
    pub total_duration_minutes: f64,
    pub num_workers: usize,
    /// `100 / num_workers`.
    pub expected_equal_share: f64,
    /// Population standard deviation of the shares.
    pub std_dev: f64,
    /// `std_dev / expected_equal_share`; 0 for single-worker buckets.
    pub relative_inequality: f64,
    /// Gini coefficient of the shares, in `[0, (n-1)/n]`.
    pub gini: f64,
    /// Largest share minus smallest share.
    pub range_percent: f64,
}

/// Inequality metrics averaged over every bucket that starts in one
/// hour-of-day, regardless of calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HourlyInequality {
    pub hour: u32,
    pub avg_std_dev: f64,
    pub avg_relative_inequality: f64,
    pub avg_gini: f64,
    pub avg_workers: f64,
    pub avg_range: f64,
    /// Number of buckets that contributed; 0 means every metric is 0.
    pub bucket_count: usize,
}

impl HourlyInequality {
    pub fn empty(hour: u32) -> Self {
        Self {
            hour,
            avg_std_dev: 0.0,
            avg_relative_inequality: 0.0,
            avg_gini: 0.0,
            avg_workers: 0.0,
            avg_range: 0.0,
            bucket_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn bucket_key_display_and_json() {
        let key = BucketKey(
            NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        );
        assert_eq!(key.to_string(), "2024-01-15 09:00");
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"2024-01-15 09:00\"");
    }

    #[test]
    fn bucket_keys_order_chronologically() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let early = BucketKey(day.and_hms_opt(9, 0, 0).unwrap());
        let late = BucketKey(day.and_hms_opt(10, 0, 0).unwrap());
        assert!(early < late);
    }
}

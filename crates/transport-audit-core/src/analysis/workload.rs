/// Workload-inequality engine.
///
/// Records are grouped by time window × transporter. Within each window every
/// transporter's summed duration becomes a percentage share of the window's
/// total, and three inequality metrics are derived from those shares:
/// population standard deviation, relative inequality (`std / (100 / n)`),
/// and the Gini coefficient.
///
/// Buckets are keyed by a `BTreeMap`, so output order is chronological and
/// identical input always yields identical output.
use super::categories::HOURS_PER_DAY;
use super::stats;
use crate::model::{BucketKey, HourlyInequality, RecordSet, WorkloadBucket};
use chrono::{NaiveDateTime, NaiveTime, Timelike};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::num::NonZeroU32;
use tracing::{debug, info};

const MINUTES_PER_DAY: u32 = 24 * 60;

/// How records are grouped into time windows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketWindow {
    /// One bucket per calendar hour of the start time.
    #[default]
    Hourly,
    /// One bucket per calendar day.
    Daily,
    /// Fixed windows of N minutes, aligned to midnight.
    Minutes(NonZeroU32),
}

impl BucketWindow {
    /// Window length in minutes.
    pub fn minutes(self) -> u32 {
        match self {
            Self::Hourly => 60,
            Self::Daily => MINUTES_PER_DAY,
            Self::Minutes(m) => m.get(),
        }
    }

    /// The window containing `start`.
    pub fn key_for(self, start: NaiveDateTime) -> BucketKey {
        let since_midnight = start.hour() * 60 + start.minute();
        let window = self.minutes();
        let floored = (since_midnight / window) * window;
        let time = NaiveTime::from_num_seconds_from_midnight_opt(floored * 60, 0)
            .unwrap_or(NaiveTime::MIN);
        BucketKey(start.date().and_time(time))
    }
}

/// Group records into windows and compute per-bucket inequality metrics.
///
/// Only records with a start time, a usable duration, and a transporter id
/// take part. The result is ordered by `bucket_key` ascending.
pub fn compute_workload_buckets(records: &RecordSet, window: BucketWindow) -> Vec<WorkloadBucket> {
    let mut windows: BTreeMap<BucketKey, BTreeMap<CompactString, f64>> = BTreeMap::new();
    let mut skipped = 0usize;

    for rec in records {
        let (Some(start), Some(minutes), Some(worker)) =
            (rec.start_time, rec.duration_minutes(), &rec.transporter_id)
        else {
            skipped += 1;
            continue;
        };
        *windows
            .entry(window.key_for(start))
            .or_default()
            .entry(worker.clone())
            .or_insert(0.0) += minutes;
    }

    if skipped > 0 {
        debug!("Workload: skipped {skipped} records without start time, duration, or transporter");
    }

    let buckets: Vec<WorkloadBucket> = windows
        .into_iter()
        .map(|(key, per_worker)| build_bucket(key, per_worker))
        .collect();

    info!(
        "Workload: {} buckets from {} records",
        buckets.len(),
        records.len() - skipped
    );
    buckets
}

/// Derive shares and metrics from per-worker minute totals.
fn build_bucket(key: BucketKey, per_worker: BTreeMap<CompactString, f64>) -> WorkloadBucket {
    let total: f64 = per_worker.values().sum();
    let num_workers = per_worker.len();

    let workload_details: BTreeMap<CompactString, f64> = per_worker
        .into_iter()
        .map(|(worker, minutes)| {
            let share = if total > 0.0 { minutes / total * 100.0 } else { 0.0 };
            (worker, share)
        })
        .collect();
    let shares: Vec<f64> = workload_details.values().copied().collect();

    let expected_equal_share = if num_workers > 0 {
        100.0 / num_workers as f64
    } else {
        0.0
    };
    let std_dev = stats::population_std_dev(&shares);
    let relative_inequality = if num_workers <= 1 || expected_equal_share == 0.0 {
        0.0
    } else {
        std_dev / expected_equal_share
    };
    let range_percent = match (
        shares.iter().copied().reduce(f64::max),
        shares.iter().copied().reduce(f64::min),
    ) {
        (Some(max), Some(min)) => max - min,
        _ => 0.0,
    };

    WorkloadBucket {
        bucket_key: key,
        hour: key.start().hour(),
        workload_details,
        total_duration_minutes: total,
        num_workers,
        expected_equal_share,
        std_dev,
        relative_inequality,
        gini: stats::gini(&shares),
        range_percent,
    }
}

/// Average each metric over all buckets that start in the same hour-of-day.
///
/// Always returns 24 entries; hours without buckets are all-zero.
pub fn hourly_inequality(buckets: &[WorkloadBucket]) -> Vec<HourlyInequality> {
    (0..HOURS_PER_DAY)
        .map(|hour| {
            let in_hour: Vec<&WorkloadBucket> = buckets.iter().filter(|b| b.hour == hour).collect();
            if in_hour.is_empty() {
                return HourlyInequality::empty(hour);
            }
            let n = in_hour.len() as f64;
            let avg = |metric: fn(&WorkloadBucket) -> f64| in_hour.iter().map(|b| metric(b)).sum::<f64>() / n;
            HourlyInequality {
                hour,
                avg_std_dev: avg(|b| b.std_dev),
                avg_relative_inequality: avg(|b| b.relative_inequality),
                avg_gini: avg(|b| b.gini),
                avg_workers: avg(|b| b.num_workers as f64),
                avg_range: avg(|b| b.range_percent),
                bucket_count: in_hour.len(),
            }
        })
        .collect()
}

/// Deterministic selection of the most, least, and most typical unequal
/// periods.
///
/// Ties on the metric are always broken by `bucket_key` ascending, so the
/// same buckets rank identically on every run.
use crate::model::WorkloadBucket;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// The metric that drives ranking. `gini` accompanies every selected bucket
/// regardless of which metric ranks it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InequalityMetric {
    #[default]
    RelativeInequality,
    StdDev,
    Gini,
}

impl InequalityMetric {
    #[inline]
    pub fn of(self, bucket: &WorkloadBucket) -> f64 {
        match self {
            Self::RelativeInequality => bucket.relative_inequality,
            Self::StdDev => bucket.std_dev,
            Self::Gini => bucket.gini,
        }
    }
}

/// Which end of the ranking to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankMode {
    /// Descending by metric.
    Highest,
    /// Ascending by metric.
    Lowest,
    /// The window of ranks centred on the median, in ascending order.
    Median,
}

impl fmt::Display for RankMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Highest => "highest",
            Self::Lowest => "lowest",
            Self::Median => "median",
        })
    }
}

/// Select up to `limit` buckets by `metric`.
///
/// `Median` returns the `limit` consecutive ranks closest to the median
/// rank of the full ascending order (lower window on an exact tie); when
/// fewer than `limit` buckets exist all of them are returned.
///
/// # Panics
///
/// If any bucket's metric is NaN. Buckets built by the workload engine never
/// are, so this signals a caller bug.
pub fn rank_buckets(
    buckets: &[WorkloadBucket],
    metric: InequalityMetric,
    limit: usize,
    mode: RankMode,
) -> Vec<WorkloadBucket> {
    assert!(
        buckets.iter().all(|b| !metric.of(b).is_nan()),
        "cannot rank buckets with a NaN {metric:?}"
    );

    let ascending = |a: &&WorkloadBucket, b: &&WorkloadBucket| -> Ordering {
        metric
            .of(a)
            .total_cmp(&metric.of(b))
            .then_with(|| a.bucket_key.cmp(&b.bucket_key))
    };

    let mut ranked: Vec<&WorkloadBucket> = buckets.iter().collect();
    let window = match mode {
        RankMode::Highest => {
            ranked.sort_by(|a, b| {
                metric
                    .of(b)
                    .total_cmp(&metric.of(a))
                    .then_with(|| a.bucket_key.cmp(&b.bucket_key))
            });
            &ranked[..limit.min(ranked.len())]
        }
        RankMode::Lowest => {
            ranked.sort_by(ascending);
            &ranked[..limit.min(ranked.len())]
        }
        RankMode::Median => {
            ranked.sort_by(ascending);
            let n = ranked.len();
            if n <= limit {
                &ranked[..]
            } else {
                let start = (n - limit) / 2;
                &ranked[start..start + limit]
            }
        }
    };

    window.iter().map(|&b| b.clone()).collect()
}

/// The three drill-down lists shown together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSelection {
    pub metric: InequalityMetric,
    pub highest: Vec<WorkloadBucket>,
    pub typical: Vec<WorkloadBucket>,
    /// Drawn only from buckets with more than one worker; a lone worker is
    /// trivially "equal" and would crowd out meaningful periods.
    pub lowest: Vec<WorkloadBucket>,
}

/// Build highest / typical / lowest lists of `limit` buckets each.
pub fn select_periods(
    buckets: &[WorkloadBucket],
    metric: InequalityMetric,
    limit: usize,
) -> PeriodSelection {
    let shared: Vec<WorkloadBucket> = buckets
        .iter()
        .filter(|b| b.num_workers > 1)
        .cloned()
        .collect();

    PeriodSelection {
        metric,
        highest: rank_buckets(buckets, metric, limit, RankMode::Highest),
        typical: rank_buckets(buckets, metric, limit, RankMode::Median),
        lowest: rank_buckets(&shared, metric, limit, RankMode::Lowest),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BucketKey;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn bucket(hour: u32, relative: f64, workers: usize) -> WorkloadBucket {
        WorkloadBucket {
            bucket_key: BucketKey(
                NaiveDate::from_ymd_opt(2024, 1, 15)
                    .unwrap()
                    .and_hms_opt(hour, 0, 0)
                    .unwrap(),
            ),
            hour,
            workload_details: BTreeMap::new(),
            total_duration_minutes: 60.0,
            num_workers: workers,
            expected_equal_share: 100.0 / workers as f64,
            std_dev: relative * 10.0,
            relative_inequality: relative,
            gini: relative / 2.0,
            range_percent: 0.0,
        }
    }

    fn hours(list: &[WorkloadBucket]) -> Vec<u32> {
        list.iter().map(|b| b.hour).collect()
    }

    // ── rank_buckets ─────────────────────────────────────────────────────

    /// [0.1, 0.9, 0.5], limit 2, highest → 0.9 then 0.5.
    #[test]
    fn highest_two() {
        let buckets = vec![bucket(8, 0.1, 2), bucket(9, 0.9, 2), bucket(10, 0.5, 2)];
        let top = rank_buckets(&buckets, InequalityMetric::RelativeInequality, 2, RankMode::Highest);
        assert_eq!(hours(&top), vec![9, 10]);
    }

    #[test]
    fn lowest_two() {
        let buckets = vec![bucket(8, 0.1, 2), bucket(9, 0.9, 2), bucket(10, 0.5, 2)];
        let low = rank_buckets(&buckets, InequalityMetric::RelativeInequality, 2, RankMode::Lowest);
        assert_eq!(hours(&low), vec![8, 10]);
    }

    /// Equal metrics fall back to bucket_key ascending in both directions.
    #[test]
    fn ties_break_by_key() {
        let buckets = vec![bucket(11, 0.5, 2), bucket(9, 0.5, 2), bucket(10, 0.5, 2)];
        let top = rank_buckets(&buckets, InequalityMetric::RelativeInequality, 3, RankMode::Highest);
        assert_eq!(hours(&top), vec![9, 10, 11]);
        let low = rank_buckets(&buckets, InequalityMetric::RelativeInequality, 3, RankMode::Lowest);
        assert_eq!(hours(&low), vec![9, 10, 11]);
    }

    #[test]
    fn median_window_is_centred() {
        let buckets: Vec<WorkloadBucket> =
            (0..5).map(|h| bucket(h, h as f64 / 10.0, 2)).collect();
        let mid = rank_buckets(&buckets, InequalityMetric::RelativeInequality, 3, RankMode::Median);
        assert_eq!(hours(&mid), vec![1, 2, 3]);

        let one = rank_buckets(&buckets, InequalityMetric::RelativeInequality, 1, RankMode::Median);
        assert_eq!(hours(&one), vec![2]);
    }

    #[test]
    fn median_even_length_takes_central_pair() {
        let buckets: Vec<WorkloadBucket> =
            (0..6).map(|h| bucket(h, h as f64 / 10.0, 2)).collect();
        let mid = rank_buckets(&buckets, InequalityMetric::RelativeInequality, 2, RankMode::Median);
        assert_eq!(hours(&mid), vec![2, 3]);
    }

    #[test]
    fn short_list_returns_everything() {
        let buckets = vec![bucket(9, 0.4, 2), bucket(8, 0.2, 2)];
        for mode in [RankMode::Highest, RankMode::Lowest, RankMode::Median] {
            let out = rank_buckets(&buckets, InequalityMetric::RelativeInequality, 5, mode);
            assert_eq!(out.len(), 2, "mode {mode}");
        }
    }

    #[test]
    fn zero_limit_is_empty() {
        let buckets = vec![bucket(9, 0.4, 2)];
        assert!(rank_buckets(&buckets, InequalityMetric::Gini, 0, RankMode::Highest).is_empty());
        assert!(rank_buckets(&buckets, InequalityMetric::Gini, 0, RankMode::Median).is_empty());
    }

    #[test]
    fn ranks_by_selected_metric() {
        let mut a = bucket(8, 0.9, 2);
        a.gini = 0.1;
        let mut b = bucket(9, 0.1, 2);
        b.gini = 0.4;
        let top = rank_buckets(&[a, b], InequalityMetric::Gini, 1, RankMode::Highest);
        assert_eq!(hours(&top), vec![9]);
    }

    #[test]
    #[should_panic(expected = "NaN")]
    fn nan_metric_is_a_contract_violation() {
        rank_buckets(&[bucket(9, f64::NAN, 2)], InequalityMetric::RelativeInequality, 1, RankMode::Highest);
    }

    // ── select_periods ───────────────────────────────────────────────────

    #[test]
    fn lowest_list_ignores_single_worker_buckets() {
        let buckets = vec![bucket(8, 0.0, 1), bucket(9, 0.2, 3), bucket(10, 0.7, 2)];
        let sel = select_periods(&buckets, InequalityMetric::RelativeInequality, 5);
        assert_eq!(hours(&sel.lowest), vec![9, 10]);
        assert_eq!(hours(&sel.highest), vec![10, 9, 8]);
        assert_eq!(sel.typical.len(), 3);
    }
}

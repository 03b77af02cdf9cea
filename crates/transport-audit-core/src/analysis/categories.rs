/// Count/percentage distributions over a single record field.
///
/// Two ordering policies:
/// - hour-of-day always covers the fixed domain `0..24` in ascending order,
///   so quiet hours appear with a count of 0;
/// - every other field is ordered by descending count, ties broken
///   lexicographically by label.
///
/// Records with no value for the selected field are excluded from both the
/// counts and the percentage denominator.
use crate::model::{RecordSet, TransportRecord};
use compact_str::CompactString;
use serde::Serialize;
use std::collections::BTreeMap;

/// Number of hours in the hour-of-day domain.
pub const HOURS_PER_DAY: u32 = 24;

/// Parallel label / count / percentage vectors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryDistribution<L> {
    pub labels: Vec<L>,
    pub counts: Vec<u64>,
    /// `count / total × 100`, relative to the full non-null total even when
    /// the lists have been truncated.
    pub percentages: Vec<f64>,
    /// Number of records with a value for the field.
    pub total: u64,
}

impl<L> CategoryDistribution<L> {
    fn from_counts(entries: Vec<(L, u64)>, total: u64) -> Self {
        let mut labels = Vec::with_capacity(entries.len());
        let mut counts = Vec::with_capacity(entries.len());
        let mut percentages = Vec::with_capacity(entries.len());
        for (label, count) in entries {
            labels.push(label);
            counts.push(count);
            percentages.push(percent_of(count, total));
        }
        Self {
            labels,
            counts,
            percentages,
            total,
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// `count / total × 100`, or 0 when `total` is 0.
#[inline]
pub(crate) fn percent_of(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// Which categorical field to aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryField {
    TransportType,
    Priority,
    StartLocation,
    EndLocation,
    /// `"{start_location} → {end_location}"`.
    Route,
}

impl CategoryField {
    /// The record's value for this field, if any.
    pub fn value_of(self, rec: &TransportRecord) -> Option<CompactString> {
        match self {
            Self::TransportType => rec.transport_type.clone(),
            Self::Priority => rec.priority.clone(),
            Self::StartLocation => rec.start_location.clone(),
            Self::EndLocation => rec.end_location.clone(),
            Self::Route => rec.route(),
        }
    }
}

/// Parameters for a frequency-ranked category analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryParams {
    /// Keep only the N most frequent labels. Percentages are still relative
    /// to the full total.
    pub top_n: Option<usize>,
}

/// A frequency-ranked distribution with its extremes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedDistribution {
    #[serde(flatten)]
    pub distribution: CategoryDistribution<CompactString>,
    /// Highest count; ties → lexicographically smallest label.
    pub most_common: Option<CompactString>,
    /// Lowest count; ties → lexicographically smallest label.
    /// Computed before truncation.
    pub least_common: Option<CompactString>,
}

/// Hour-of-day activity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyActivity {
    /// Labels are always `0..24`.
    #[serde(flatten)]
    pub distribution: CategoryDistribution<u32>,
    /// Busiest hour; ties → smallest hour. `None` when no record has a start time.
    pub peak_hour: Option<u32>,
    /// Quietest hour with at least one transport; ties → smallest hour.
    pub slowest_hour: Option<u32>,
}

/// Start locations, end locations, and routes, each truncated to top-N.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationFrequency {
    pub start_locations: RankedDistribution,
    pub end_locations: RankedDistribution,
    pub routes: RankedDistribution,
}

/// Priority mix overall and within each hour-of-day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriorityDistribution {
    #[serde(flatten)]
    pub overall: RankedDistribution,
    /// Only hours with at least one prioritised, timed record appear.
    pub hourly_distribution: BTreeMap<u32, CategoryDistribution<CompactString>>,
}

/// Count transports per hour-of-day of their start time.
pub fn hourly_activity(records: &RecordSet) -> HourlyActivity {
    let mut counts = [0u64; HOURS_PER_DAY as usize];
    for hour in records.iter().filter_map(TransportRecord::start_hour) {
        counts[hour as usize] += 1;
    }
    let total: u64 = counts.iter().sum();

    let mut peak_hour = None;
    let mut slowest_hour = None;
    for (hour, &count) in counts.iter().enumerate() {
        if count == 0 {
            continue;
        }
        let hour = hour as u32;
        if peak_hour.map_or(true, |p: u32| count > counts[p as usize]) {
            peak_hour = Some(hour);
        }
        if slowest_hour.map_or(true, |s: u32| count < counts[s as usize]) {
            slowest_hour = Some(hour);
        }
    }

    let entries = (0..HOURS_PER_DAY).zip(counts).collect();
    HourlyActivity {
        distribution: CategoryDistribution::from_counts(entries, total),
        peak_hour,
        slowest_hour,
    }
}

/// Frequency-ranked distribution of one categorical field.
pub fn run_category_analysis(
    records: &RecordSet,
    field: CategoryField,
    params: &CategoryParams,
) -> RankedDistribution {
    ranked(records.iter().filter_map(|rec| field.value_of(rec)), params.top_n)
}

/// Start/end location and route frequencies.
pub fn location_frequency(records: &RecordSet, top_n: usize) -> LocationFrequency {
    let params = CategoryParams { top_n: Some(top_n) };
    LocationFrequency {
        start_locations: run_category_analysis(records, CategoryField::StartLocation, &params),
        end_locations: run_category_analysis(records, CategoryField::EndLocation, &params),
        routes: run_category_analysis(records, CategoryField::Route, &params),
    }
}

/// Overall priority mix plus the mix within each hour.
pub fn priority_distribution(records: &RecordSet) -> PriorityDistribution {
    let overall = run_category_analysis(records, CategoryField::Priority, &CategoryParams::default());

    let mut by_hour: BTreeMap<u32, Vec<CompactString>> = BTreeMap::new();
    for rec in records {
        if let (Some(hour), Some(priority)) = (rec.start_hour(), &rec.priority) {
            by_hour.entry(hour).or_default().push(priority.clone());
        }
    }
    let hourly_distribution = by_hour
        .into_iter()
        .map(|(hour, values)| (hour, ranked(values.into_iter(), None).distribution))
        .collect();

    PriorityDistribution {
        overall,
        hourly_distribution,
    }
}

/// Count labels, order by descending count then label, optionally truncate.
fn ranked(values: impl Iterator<Item = CompactString>, top_n: Option<usize>) -> RankedDistribution {
    // BTreeMap iteration is lexicographic; the stable sort below keeps that
    // order among equal counts.
    let mut tally: BTreeMap<CompactString, u64> = BTreeMap::new();
    for value in values {
        *tally.entry(value).or_insert(0) += 1;
    }
    let total: u64 = tally.values().sum();

    let mut entries: Vec<(CompactString, u64)> = tally.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));

    let most_common = entries.first().map(|(label, _)| label.clone());
    let least_common = entries.last().and_then(|&(_, min)| {
        entries
            .iter()
            .find(|(_, count)| *count == min)
            .map(|(label, _)| label.clone())
    });

    if let Some(n) = top_n {
        entries.truncate(n);
    }

    RankedDistribution {
        distribution: CategoryDistribution::from_counts(entries, total),
        most_common,
        least_common,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(h: u32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(h, 0, 0)
    }

    fn typed(h: u32, kind: &str) -> TransportRecord {
        TransportRecord::new(at(h), at(h)).with_transport_type(kind)
    }

    fn pct_sum<L>(d: &CategoryDistribution<L>) -> f64 {
        d.percentages.iter().sum()
    }

    // ── hourly_activity ──────────────────────────────────────────────────

    /// Hours [9, 9, 10]: full 0..24 domain, counts at 9 and 10, peak 9.
    #[test]
    fn hourly_covers_full_domain() {
        let set = RecordSet::from_records(vec![
            TransportRecord::new(at(9), None),
            TransportRecord::new(at(9), None),
            TransportRecord::new(at(10), None),
        ]);
        let hourly = hourly_activity(&set);

        assert_eq!(hourly.distribution.labels, (0..24).collect::<Vec<u32>>());
        assert_eq!(hourly.distribution.counts[9], 2);
        assert_eq!(hourly.distribution.counts[10], 1);
        assert_eq!(hourly.distribution.counts.iter().sum::<u64>(), 3);
        assert_eq!(hourly.peak_hour, Some(9));
        assert_eq!(hourly.slowest_hour, Some(10));
        assert!((pct_sum(&hourly.distribution) - 100.0).abs() < 0.01);
    }

    #[test]
    fn hourly_peak_ties_pick_smallest_hour() {
        let set = RecordSet::from_records(vec![
            TransportRecord::new(at(14), None),
            TransportRecord::new(at(7), None),
        ]);
        let hourly = hourly_activity(&set);
        assert_eq!(hourly.peak_hour, Some(7));
        assert_eq!(hourly.slowest_hour, Some(7));
    }

    /// Empty input: 24 zero buckets, no peak, no error.
    #[test]
    fn hourly_empty_is_all_zero() {
        let hourly = hourly_activity(&RecordSet::default());
        assert_eq!(hourly.distribution.len(), 24);
        assert!(hourly.distribution.counts.iter().all(|&c| c == 0));
        assert!(hourly.distribution.percentages.iter().all(|&p| p == 0.0));
        assert_eq!(hourly.peak_hour, None);
        assert_eq!(hourly.distribution.total, 0);
    }

    #[test]
    fn hourly_skips_records_without_start() {
        let set = RecordSet::from_records(vec![
            TransportRecord::new(None, at(9)),
            TransportRecord::new(at(9), None),
        ]);
        assert_eq!(hourly_activity(&set).distribution.total, 1);
    }

    // ── run_category_analysis ────────────────────────────────────────────

    #[test]
    fn categories_sorted_by_count_then_label() {
        let set = RecordSet::from_records(vec![
            typed(9, "Säng"),
            typed(9, "Rullstol"),
            typed(9, "Säng"),
            typed(9, "Gående"),
            typed(9, "Rullstol"),
            typed(9, "Bår"),
        ]);
        let dist = run_category_analysis(&set, CategoryField::TransportType, &CategoryParams::default());

        let labels: Vec<&str> = dist.distribution.labels.iter().map(|l| l.as_str()).collect();
        assert_eq!(labels, vec!["Rullstol", "Säng", "Bår", "Gående"]);
        assert_eq!(dist.distribution.counts, vec![2, 2, 1, 1]);
        assert_eq!(dist.most_common.as_deref(), Some("Rullstol"));
        assert_eq!(dist.least_common.as_deref(), Some("Bår"));
        assert!((pct_sum(&dist.distribution) - 100.0).abs() < 0.01);
    }

    /// Null values are excluded from numerator and denominator.
    #[test]
    fn categories_exclude_nulls() {
        let set = RecordSet::from_records(vec![
            typed(9, "Säng"),
            TransportRecord::new(at(9), at(9)),
        ]);
        let dist = run_category_analysis(&set, CategoryField::TransportType, &CategoryParams::default());
        assert_eq!(dist.distribution.total, 1);
        assert_eq!(dist.distribution.percentages, vec![100.0]);
    }

    /// Truncation keeps percentages relative to the full total.
    #[test]
    fn truncated_percentages_use_full_total() {
        let set = RecordSet::from_records(vec![
            typed(9, "A"),
            typed(9, "A"),
            typed(9, "B"),
            typed(9, "C"),
        ]);
        let params = CategoryParams { top_n: Some(1) };
        let dist = run_category_analysis(&set, CategoryField::TransportType, &params);
        assert_eq!(dist.distribution.labels.len(), 1);
        assert_eq!(dist.distribution.total, 4);
        assert_eq!(dist.distribution.percentages, vec![50.0]);
        assert_eq!(dist.least_common.as_deref(), Some("B"));
    }

    #[test]
    fn empty_categories_have_no_extremes() {
        let dist = run_category_analysis(
            &RecordSet::default(),
            CategoryField::Priority,
            &CategoryParams::default(),
        );
        assert!(dist.distribution.is_empty());
        assert_eq!(dist.most_common, None);
        assert_eq!(dist.least_common, None);
    }

    // ── locations / priority ─────────────────────────────────────────────

    #[test]
    fn location_frequency_builds_routes() {
        let set = RecordSet::from_records(vec![
            TransportRecord::new(at(9), at(9)).with_locations("Akuten", "Röntgen"),
            TransportRecord::new(at(9), at(9)).with_locations("Akuten", "Röntgen"),
            TransportRecord::new(at(9), at(9)).with_locations("Avd 12", "Akuten"),
        ]);
        let loc = location_frequency(&set, 10);

        assert_eq!(loc.routes.most_common.as_deref(), Some("Akuten → Röntgen"));
        assert_eq!(loc.routes.distribution.counts, vec![2, 1]);
        assert_eq!(loc.start_locations.most_common.as_deref(), Some("Akuten"));
        assert_eq!(loc.end_locations.distribution.total, 3);
    }

    #[test]
    fn priority_by_hour() {
        let set = RecordSet::from_records(vec![
            TransportRecord::new(at(9), None).with_priority("Akut"),
            TransportRecord::new(at(9), None).with_priority("Normal"),
            TransportRecord::new(at(9), None).with_priority("Normal"),
            TransportRecord::new(at(14), None).with_priority("Akut"),
            TransportRecord::new(None, None).with_priority("Akut"),
        ]);
        let prio = priority_distribution(&set);

        assert_eq!(prio.overall.distribution.total, 5);
        assert_eq!(prio.overall.most_common.as_deref(), Some("Akut"));
        assert_eq!(prio.hourly_distribution.len(), 2);
        let nine = &prio.hourly_distribution[&9];
        assert_eq!(nine.labels[0].as_str(), "Normal");
        assert_eq!(nine.total, 3);
        assert_eq!(prio.hourly_distribution[&14].counts, vec![1]);
    }
}

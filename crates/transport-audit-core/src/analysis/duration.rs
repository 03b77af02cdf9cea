/// Transport duration statistics and a fixed-width histogram.
///
/// Only records with a usable duration take part (clamped negative
/// durations count as 0). Every statistic is 0 on empty input.
use super::stats;
use crate::model::RecordSet;
use serde::Serialize;

/// Most bins a histogram will hold beyond the first.
pub const MAX_HISTOGRAM_BINS: usize = 10_000;

/// Histogram and "long transport" settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationParams {
    /// Width of each bin in minutes. Must be positive and finite.
    pub bin_width: f64,
    /// Lower edge of the final, open-ended bin, rounded down to a multiple
    /// of `bin_width` (30 with width 7 gives a last edge of 28). `None`
    /// derives it from the largest observed duration. Either way the edge
    /// is capped at `MAX_HISTOGRAM_BINS` widths.
    pub upper_edge: Option<f64>,
    /// Durations at or above this are "long".
    pub long_threshold_minutes: f64,
}

impl Default for DurationParams {
    fn default() -> Self {
        Self {
            bin_width: 5.0,
            upper_edge: Some(30.0),
            long_threshold_minutes: 30.0,
        }
    }
}

/// Fixed-width histogram starting at 0.
///
/// A value lands in bin `i` when `bin_edges[i] <= v < bin_edges[i + 1]`,
/// and in the last bin when `v >= bin_edges[last]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub bin_width: f64,
    /// Lower edge of each bin, ascending.
    pub bin_edges: Vec<f64>,
    pub bin_counts: Vec<u64>,
}

impl Histogram {
    /// Build the bins and count `values` into them.
    ///
    /// # Panics
    ///
    /// If `bin_width` is not a positive finite number.
    pub fn build(values: &[f64], bin_width: f64, upper_edge: Option<f64>) -> Self {
        assert!(
            bin_width.is_finite() && bin_width > 0.0,
            "histogram bin width must be positive, got {bin_width}"
        );

        let top = upper_edge
            .unwrap_or_else(|| values.iter().copied().fold(0.0, f64::max))
            .max(0.0);
        let last_index = (top / bin_width).floor().min(MAX_HISTOGRAM_BINS as f64) as usize;
        let bin_edges: Vec<f64> = (0..=last_index).map(|i| i as f64 * bin_width).collect();
        let mut bin_counts = vec![0u64; bin_edges.len()];

        for &v in values {
            let idx = ((v.max(0.0) / bin_width).floor() as usize).min(last_index);
            bin_counts[idx] += 1;
        }

        Self {
            bin_width,
            bin_edges,
            bin_counts,
        }
    }
}

/// Central tendency, spread, and distribution of transport durations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationSummary {
    /// Records with a usable duration.
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation.
    pub std: f64,
    pub long_threshold_minutes: f64,
    /// Durations `>= long_threshold_minutes`.
    pub long_count: usize,
    pub histogram: Histogram,
}

/// Summarise durations across the record set.
pub fn run_duration_analysis(
    records: &RecordSet,
    params: &DurationParams,
) -> DurationSummary {
    let mut durations: Vec<f64> = records.with_duration().map(|(_, m)| m).collect();
    durations.sort_unstable_by(f64::total_cmp);

    let histogram = Histogram::build(&durations, params.bin_width, params.upper_edge);
    let long_count = durations
        .iter()
        .filter(|&&m| m >= params.long_threshold_minutes)
        .count();

    DurationSummary {
        count: durations.len(),
        min: durations.first().copied().unwrap_or(0.0),
        max: durations.last().copied().unwrap_or(0.0),
        mean: stats::mean(&durations),
        median: stats::median_sorted(&durations),
        std: stats::population_std_dev(&durations),
        long_threshold_minutes: params.long_threshold_minutes,
        long_count,
        histogram,
    }
}

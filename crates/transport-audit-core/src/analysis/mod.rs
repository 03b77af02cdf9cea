/// Analysis modules and the registry that dispatches between them.
///
/// Every analysis is a pure function of a [`RecordSet`] and an
/// [`EngineConfig`]; [`run_all`] fans them out over a rayon pool.
pub mod categories;
pub mod duration;
pub mod ranking;
pub mod stats;
pub mod transporters;
pub mod workload;

pub use categories::{
    hourly_activity, location_frequency, priority_distribution, run_category_analysis,
    CategoryDistribution, CategoryField, CategoryParams, HourlyActivity, LocationFrequency,
    PriorityDistribution, RankedDistribution,
};
pub use duration::{run_duration_analysis, DurationParams, DurationSummary, Histogram};
pub use ranking::{rank_buckets, select_periods, InequalityMetric, PeriodSelection, RankMode};
pub use transporters::{transporter_summary, TransporterSummary};
pub use workload::{compute_workload_buckets, hourly_inequality, BucketWindow};

use crate::config::EngineConfig;
use crate::model::{HourlyInequality, RecordSet, WorkloadBucket};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

/// The closed set of analyses the engine can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    HourlyActivity,
    TransportTypes,
    LocationFrequency,
    TransportDuration,
    PriorityAnalysis,
    WorkloadInequality,
    TransporterSummary,
}

impl AnalysisKind {
    /// Every kind, in report order.
    pub const ALL: [AnalysisKind; 7] = [
        Self::HourlyActivity,
        Self::TransportTypes,
        Self::LocationFrequency,
        Self::TransportDuration,
        Self::PriorityAnalysis,
        Self::WorkloadInequality,
        Self::TransporterSummary,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::HourlyActivity => "hourly_activity",
            Self::TransportTypes => "transport_types",
            Self::LocationFrequency => "location_frequency",
            Self::TransportDuration => "transport_duration",
            Self::PriorityAnalysis => "priority_analysis",
            Self::WorkloadInequality => "workload_inequality",
            Self::TransporterSummary => "transporter_summary",
        }
    }

    /// Human-readable title for text reports.
    pub fn title(self) -> &'static str {
        match self {
            Self::HourlyActivity => "Hourly activity",
            Self::TransportTypes => "Transport types",
            Self::LocationFrequency => "Location frequency",
            Self::TransportDuration => "Transport duration",
            Self::PriorityAnalysis => "Priority analysis",
            Self::WorkloadInequality => "Workload inequality",
            Self::TransporterSummary => "Transporter summary",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An analysis name that matches no [`AnalysisKind`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown analysis `{name}` (expected one of: {expected})")]
pub struct UnknownAnalysis {
    pub name: String,
    expected: String,
}

impl FromStr for AnalysisKind {
    type Err = UnknownAnalysis;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownAnalysis {
                name: s.to_owned(),
                expected: Self::ALL.map(AnalysisKind::name).join(", "),
            })
    }
}

/// Workload buckets with their hour-of-day aggregation and drill-down lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkloadInequality {
    pub window_minutes: u32,
    /// Chronological.
    pub buckets: Vec<WorkloadBucket>,
    /// Always 24 entries, hour 0 first.
    pub hourly_stats: Vec<HourlyInequality>,
    pub periods: PeriodSelection,
}

/// The typed output of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "analysis", content = "result", rename_all = "snake_case")]
pub enum AnalysisResult {
    HourlyActivity(HourlyActivity),
    TransportTypes(RankedDistribution),
    LocationFrequency(LocationFrequency),
    TransportDuration(DurationSummary),
    PriorityAnalysis(PriorityDistribution),
    WorkloadInequality(WorkloadInequality),
    TransporterSummary(Vec<TransporterSummary>),
}

impl AnalysisResult {
    pub fn kind(&self) -> AnalysisKind {
        match self {
            Self::HourlyActivity(_) => AnalysisKind::HourlyActivity,
            Self::TransportTypes(_) => AnalysisKind::TransportTypes,
            Self::LocationFrequency(_) => AnalysisKind::LocationFrequency,
            Self::TransportDuration(_) => AnalysisKind::TransportDuration,
            Self::PriorityAnalysis(_) => AnalysisKind::PriorityAnalysis,
            Self::WorkloadInequality(_) => AnalysisKind::WorkloadInequality,
            Self::TransporterSummary(_) => AnalysisKind::TransporterSummary,
        }
    }
}

/// Run one analysis.
pub fn run_analysis(records: &RecordSet, kind: AnalysisKind, config: &EngineConfig) -> AnalysisResult {
    let started = Instant::now();
    let result = match kind {
        AnalysisKind::HourlyActivity => AnalysisResult::HourlyActivity(hourly_activity(records)),
        AnalysisKind::TransportTypes => AnalysisResult::TransportTypes(run_category_analysis(
            records,
            CategoryField::TransportType,
            &CategoryParams::default(),
        )),
        AnalysisKind::LocationFrequency => {
            AnalysisResult::LocationFrequency(location_frequency(records, config.location_top_n))
        }
        AnalysisKind::TransportDuration => {
            AnalysisResult::TransportDuration(run_duration_analysis(records, &config.duration_params()))
        }
        AnalysisKind::PriorityAnalysis => {
            AnalysisResult::PriorityAnalysis(priority_distribution(records))
        }
        AnalysisKind::WorkloadInequality => {
            let buckets = compute_workload_buckets(records, config.bucket_window);
            let hourly_stats = hourly_inequality(&buckets);
            let periods = select_periods(&buckets, config.ranking_metric, config.ranking_limit);
            AnalysisResult::WorkloadInequality(WorkloadInequality {
                window_minutes: config.bucket_window.minutes(),
                buckets,
                hourly_stats,
                periods,
            })
        }
        AnalysisKind::TransporterSummary => {
            AnalysisResult::TransporterSummary(transporter_summary(records))
        }
    };
    debug!(analysis = %kind, elapsed = ?started.elapsed(), "Analysis finished");
    result
}

/// Run every analysis in parallel. Results come back in [`AnalysisKind::ALL`]
/// order regardless of which finishes first.
pub fn run_all(records: &RecordSet, config: &EngineConfig) -> Vec<AnalysisResult> {
    let threads = config.effective_threads();
    let run = || -> Vec<AnalysisResult> {
        AnalysisKind::ALL
            .par_iter()
            .map(|&kind| run_analysis(records, kind, config))
            .collect()
    };

    let started = Instant::now();
    let results = match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(run),
        Err(e) => {
            warn!("Could not build a {threads}-thread pool ({e}), using the global pool");
            run()
        }
    };
    info!(
        "Ran {} analyses over {} records on {threads} threads in {:.2?}",
        results.len(),
        records.len(),
        started.elapsed()
    );
    results
}

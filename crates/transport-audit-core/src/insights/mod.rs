/// Insight generation — fixed-threshold findings and recommendations.
///
/// Each rule reads one [`AnalysisResult`] and emits plain sentences. Nothing
/// here computes new statistics beyond simple shares; the thresholds are
/// constants so the same result always yields the same text.
use crate::analysis::{
    AnalysisResult, DurationSummary, HourlyActivity, LocationFrequency, PriorityDistribution,
    RankedDistribution, TransporterSummary, WorkloadInequality,
};
use crate::model::format::{format_count, format_hour, format_minutes, format_percent};
use serde::Serialize;

/// Peak hour share that warrants extra staff at that hour.
pub const PEAK_HOUR_SHARE: f64 = 15.0;
/// Share of the most common transport type that warrants a resource review.
pub const DOMINANT_TYPE_SHARE: f64 = 50.0;
/// Share of the top route that warrants a dedicated transporter.
pub const DOMINANT_ROUTE_SHARE: f64 = 10.0;
/// Share of long transports that warrants investigation.
pub const LONG_TRANSPORT_SHARE: f64 = 10.0;
/// Share of high-priority transports that warrants prioritisation staffing.
pub const HIGH_PRIORITY_SHARE: f64 = 30.0;
/// Mean relative inequality that warrants rebalancing.
pub const REBALANCE_RELATIVE_INEQUALITY: f64 = 0.5;

/// Findings and recommendations derived from one or more results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InsightStatement {
    pub findings: Vec<String>,
    pub recommendations: Vec<String>,
}

impl InsightStatement {
    fn no_data(what: &str) -> Self {
        Self {
            findings: vec![format!("No data available for {what}.")],
            recommendations: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty() && self.recommendations.is_empty()
    }

    /// Append `other`'s statements after this one's.
    pub fn merge(&mut self, other: InsightStatement) {
        self.findings.extend(other.findings);
        self.recommendations.extend(other.recommendations);
    }
}

/// Coarse parts of the day used to summarise hourly volume. Discriminants
/// follow [`DayPart::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayPart {
    /// 06–11
    Morning,
    /// 12–17
    Afternoon,
    /// 18–21
    Evening,
    /// 22–05, wrapping midnight.
    Night,
}

impl DayPart {
    pub const ALL: [DayPart; 4] = [Self::Morning, Self::Afternoon, Self::Evening, Self::Night];

    pub fn of(hour: u32) -> Self {
        match hour {
            6..=11 => Self::Morning,
            12..=17 => Self::Afternoon,
            18..=21 => Self::Evening,
            _ => Self::Night,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Morning => "Morning (06-11)",
            Self::Afternoon => "Afternoon (12-17)",
            Self::Evening => "Evening (18-21)",
            Self::Night => "Night (22-05)",
        }
    }
}

/// Insights for a single analysis result.
pub fn generate_insights(result: &AnalysisResult) -> InsightStatement {
    match result {
        AnalysisResult::HourlyActivity(r) => hourly_insights(r),
        AnalysisResult::TransportTypes(r) => type_insights(r),
        AnalysisResult::LocationFrequency(r) => location_insights(r),
        AnalysisResult::TransportDuration(r) => duration_insights(r),
        AnalysisResult::PriorityAnalysis(r) => priority_insights(r),
        AnalysisResult::WorkloadInequality(r) => workload_insights(r),
        AnalysisResult::TransporterSummary(r) => transporter_insights(r),
    }
}

/// Insights for every result given, in order. Analyses that were not run
/// contribute nothing.
pub fn combined_insights(results: &[AnalysisResult]) -> InsightStatement {
    results
        .iter()
        .map(generate_insights)
        .fold(InsightStatement::default(), |mut acc, next| {
            acc.merge(next);
            acc
        })
}

fn hourly_insights(r: &HourlyActivity) -> InsightStatement {
    let dist = &r.distribution;
    let Some(peak) = r.peak_hour.filter(|_| dist.total > 0) else {
        return InsightStatement::no_data("hourly activity");
    };
    let mut out = InsightStatement::default();

    let peak_share = dist.percentages[peak as usize];
    out.findings.push(format!(
        "Peak hour is {} with {} transports ({} of the total).",
        format_hour(peak),
        format_count(dist.counts[peak as usize]),
        format_percent(peak_share)
    ));
    if let Some(slow) = r.slowest_hour {
        out.findings.push(format!(
            "Quietest active hour is {} with {} transports.",
            format_hour(slow),
            format_count(dist.counts[slow as usize])
        ));
    }

    let mut part_counts = [0u64; 4];
    for (hour, &count) in dist.labels.iter().zip(&dist.counts) {
        part_counts[DayPart::of(*hour) as usize] += count;
    }
    for (part, &count) in DayPart::ALL.iter().zip(&part_counts) {
        out.findings.push(format!(
            "{}: {} of transports.",
            part.label(),
            format_percent(share(count, dist.total))
        ));
    }

    // Earliest part wins a tie.
    let mut busiest = 0;
    for (i, &count) in part_counts.iter().enumerate() {
        if count > part_counts[busiest] {
            busiest = i;
        }
    }
    out.recommendations.push(format!(
        "Concentrate transporter staffing in the {} period, which carries the most transports.",
        DayPart::ALL[busiest].label()
    ));
    if peak_share >= PEAK_HOUR_SHARE {
        out.recommendations.push(format!(
            "Schedule extra transporters around {}; that hour alone carries {} of the volume.",
            format_hour(peak),
            format_percent(peak_share)
        ));
    }
    out
}

fn type_insights(r: &RankedDistribution) -> InsightStatement {
    let dist = &r.distribution;
    let Some(top) = r.most_common.as_ref().filter(|_| dist.total > 0) else {
        return InsightStatement::no_data("transport types");
    };
    let top_share = dist.percentages.first().copied().unwrap_or(0.0);
    let mut out = InsightStatement::default();

    out.findings.push(format!(
        "Most common transport type is {top} ({} of transports).",
        format_percent(top_share)
    ));
    out.findings
        .push(format!("{} distinct transport types were used.", dist.len()));
    if let Some(least) = &r.least_common {
        if least != top {
            out.findings.push(format!("Least common transport type is {least}."));
        }
    }
    if top_share >= DOMINANT_TYPE_SHARE {
        out.recommendations.push(format!(
            "Review resource allocation for {top} transports, which make up {} of all transports.",
            format_percent(top_share)
        ));
    }
    out
}

fn location_insights(r: &LocationFrequency) -> InsightStatement {
    if r.start_locations.distribution.total == 0 && r.routes.distribution.total == 0 {
        return InsightStatement::no_data("locations");
    }
    let mut out = InsightStatement::default();

    if let Some(start) = &r.start_locations.most_common {
        out.findings.push(format!(
            "Most frequent start location is {start} ({} of transports).",
            format_percent(r.start_locations.distribution.percentages.first().copied().unwrap_or(0.0))
        ));
    }
    if let Some(end) = &r.end_locations.most_common {
        out.findings.push(format!("Most frequent destination is {end}."));
    }
    if let Some(route) = &r.routes.most_common {
        let route_share = r.routes.distribution.percentages.first().copied().unwrap_or(0.0);
        out.findings.push(format!(
            "Most frequent route is {route} ({} of routes).",
            format_percent(route_share)
        ));
        if route_share >= DOMINANT_ROUTE_SHARE {
            out.recommendations.push(format!(
                "Consider a dedicated transporter for the {route} route."
            ));
        }
    }
    out
}

fn duration_insights(r: &DurationSummary) -> InsightStatement {
    if r.count == 0 {
        return InsightStatement::no_data("transport durations");
    }
    let mut out = InsightStatement::default();
    let long_share = share(r.long_count as u64, r.count as u64);

    out.findings.push(format!(
        "Average transport takes {} (median {}).",
        format_minutes(r.mean),
        format_minutes(r.median)
    ));
    out.findings.push(format!(
        "Durations range from {} to {}.",
        format_minutes(r.min),
        format_minutes(r.max)
    ));
    out.findings.push(format!(
        "{} of transports take {} or longer.",
        format_percent(long_share),
        format_minutes(r.long_threshold_minutes)
    ));
    if long_share >= LONG_TRANSPORT_SHARE {
        out.recommendations.push(format!(
            "Investigate the causes of transports lasting {} or more.",
            format_minutes(r.long_threshold_minutes)
        ));
    }
    out
}

/// `true` for labels that denote high priority: a case-insensitive
/// "high" / "hög" substring, or exactly "akut".
pub fn is_high_priority(label: &str) -> bool {
    let lower = label.trim().to_lowercase();
    lower.contains("high") || lower.contains("hög") || lower == "akut"
}

fn priority_insights(r: &PriorityDistribution) -> InsightStatement {
    let dist = &r.overall.distribution;
    if dist.total == 0 {
        return InsightStatement::no_data("priorities");
    }
    let mut out = InsightStatement::default();

    if let Some(top) = &r.overall.most_common {
        out.findings.push(format!(
            "Most common priority is {top} ({} of transports).",
            format_percent(dist.percentages.first().copied().unwrap_or(0.0))
        ));
    }

    let high: Vec<(&str, u64)> = dist
        .labels
        .iter()
        .zip(&dist.counts)
        .filter(|(label, _)| is_high_priority(label))
        .map(|(label, &count)| (label.as_str(), count))
        .collect();
    if high.is_empty() {
        out.findings
            .push("No high-priority category found; high-priority share is not applicable.".into());
        return out;
    }

    let high_share = share(high.iter().map(|&(_, c)| c).sum(), dist.total);
    let names: Vec<&str> = high.iter().map(|&(label, _)| label).collect();
    out.findings.push(format!(
        "High-priority transports ({}) make up {} of the total.",
        names.join(", "),
        format_percent(high_share)
    ));
    if high_share >= HIGH_PRIORITY_SHARE {
        out.recommendations.push(
            "Reserve transporters for high-priority requests during peak periods.".into(),
        );
    }
    out
}

fn workload_insights(r: &WorkloadInequality) -> InsightStatement {
    if r.buckets.is_empty() {
        return InsightStatement::no_data("workload inequality");
    }
    let mut out = InsightStatement::default();
    let n = r.buckets.len() as f64;
    let avg_gini = r.buckets.iter().map(|b| b.gini).sum::<f64>() / n;
    let avg_relative = r.buckets.iter().map(|b| b.relative_inequality).sum::<f64>() / n;

    out.findings.push(format!(
        "Across {} periods the average Gini coefficient is {avg_gini:.2} and the average relative inequality is {avg_relative:.2}.",
        r.buckets.len()
    ));
    if let Some(worst) = r.periods.highest.first() {
        out.findings.push(format!(
            "Most unequal period is {} with {} transporters (relative inequality {:.2}, Gini {:.2}).",
            worst.bucket_key, worst.num_workers, worst.relative_inequality, worst.gini
        ));
    }

    let mut worst_hour: Option<(u32, f64)> = None;
    for stat in r.hourly_stats.iter().filter(|s| s.bucket_count > 0) {
        if worst_hour.map_or(true, |(_, g)| stat.avg_gini > g) {
            worst_hour = Some((stat.hour, stat.avg_gini));
        }
    }
    if let Some((hour, gini)) = worst_hour {
        out.findings.push(format!(
            "Workload is most unevenly shared around {} (average Gini {gini:.2}).",
            format_hour(hour)
        ));
    }

    if avg_relative >= REBALANCE_RELATIVE_INEQUALITY {
        out.recommendations.push(
            "Rebalance transport assignments; workload is unevenly distributed between transporters."
                .into(),
        );
    }
    out
}

fn transporter_insights(r: &[TransporterSummary]) -> InsightStatement {
    let Some(busiest) = r.first() else {
        return InsightStatement::no_data("transporters");
    };
    let total: u64 = r.iter().map(|s| s.total_transports).sum();
    let mut out = InsightStatement::default();
    out.findings.push(format!(
        "{} transporters handled {} transports.",
        r.len(),
        format_count(total)
    ));
    out.findings.push(format!(
        "Busiest transporter is {} with {} transports ({} of the total).",
        busiest.transporter_id,
        format_count(busiest.total_transports),
        format_percent(share(busiest.total_transports, total))
    ));
    out
}

#[inline]
fn share(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

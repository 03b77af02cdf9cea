/// Report assembly and rendering.
///
/// A [`Report`] bundles the data summary, diagnostics, each analysis result
/// with its own insights, and the merged insights. It renders either as one
/// JSON document or as plain-text sections.
use crate::cli::Selection;
use serde::Serialize;
use std::fmt;
use transport_audit_core::analysis::{
    run_all, run_analysis, AnalysisResult, CategoryDistribution, DurationSummary,
    HourlyActivity, PriorityDistribution, RankedDistribution, TransporterSummary,
    WorkloadInequality,
};
use transport_audit_core::ingest::{DataSummary, LoadedData};
use transport_audit_core::model::format::{format_count, format_hour, format_minutes, format_percent};
use transport_audit_core::model::Diagnostics;
use transport_audit_core::{combined_insights, generate_insights, EngineConfig, InsightStatement};

/// Rows shown per list in text output.
const TEXT_LIST_LIMIT: usize = 10;

/// One analysis with the insights drawn from it.
#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    /// Serialises as `"analysis"` and `"result"` keys.
    #[serde(flatten)]
    pub result: AnalysisResult,
    pub insights: InsightStatement,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub summary: DataSummary,
    pub diagnostics: Diagnostics,
    pub results: Vec<ReportEntry>,
    pub combined_insights: InsightStatement,
}

impl Report {
    /// Run the selected analyses over loaded data.
    pub fn build(data: LoadedData, selection: Selection, config: &EngineConfig) -> Self {
        let results = match selection {
            Selection::All => run_all(&data.records, config),
            Selection::One(kind) => vec![run_analysis(&data.records, kind, config)],
        };
        let combined = combined_insights(&results);
        let results = results
            .into_iter()
            .map(|result| ReportEntry {
                insights: generate_insights(&result),
                result,
            })
            .collect();

        Self {
            diagnostics: data.records.diagnostics(),
            summary: data.summary,
            results,
            combined_insights: combined,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn text(&self) -> TextReport<'_> {
        TextReport(self)
    }
}

/// Plain-text view of a [`Report`].
pub struct TextReport<'a>(pub &'a Report);

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        let s = &report.summary;
        let d = &report.diagnostics;

        writeln!(f, "TransportAudit report")?;
        writeln!(f, "=====================")?;
        writeln!(
            f,
            "{} transports analysed ({} rows read, {} columns, delimiter {:?})",
            format_count(s.row_count as u64),
            format_count(d.total_rows),
            s.column_count,
            s.delimiter
        )?;
        if let Some(reason) = &s.filtered_reason {
            writeln!(f, "{reason}: {} rows", format_count(s.filtered_count))?;
        }
        if !s.value_filters.is_empty() {
            writeln!(
                f,
                "Filtered to {}: {} rows removed",
                s.value_filters.join(", "),
                format_count(d.filtered_by_value)
            )?;
        }
        writeln!(
            f,
            "Unparseable timestamps: {}  Negative durations: {}  Missing transporter: {}",
            d.unparseable_timestamps, d.negative_durations, d.missing_worker
        )?;

        for entry in &report.results {
            writeln!(f)?;
            let title = entry.result.kind().title();
            writeln!(f, "{title}")?;
            writeln!(f, "{}", "-".repeat(title.chars().count()))?;
            match &entry.result {
                AnalysisResult::HourlyActivity(r) => write_hourly(f, r)?,
                AnalysisResult::TransportTypes(r) => write_ranked(f, r)?,
                AnalysisResult::LocationFrequency(r) => {
                    writeln!(f, "Start locations:")?;
                    write_ranked(f, &r.start_locations)?;
                    writeln!(f, "Destinations:")?;
                    write_ranked(f, &r.end_locations)?;
                    writeln!(f, "Routes:")?;
                    write_ranked(f, &r.routes)?;
                }
                AnalysisResult::TransportDuration(r) => write_duration(f, r)?,
                AnalysisResult::PriorityAnalysis(r) => write_priority(f, r)?,
                AnalysisResult::WorkloadInequality(r) => write_workload(f, r)?,
                AnalysisResult::TransporterSummary(r) => write_transporters(f, r)?,
            }
            write_insights(f, &entry.insights)?;
        }

        if report.results.len() > 1 {
            writeln!(f)?;
            writeln!(f, "Summary of recommendations")?;
            writeln!(f, "--------------------------")?;
            if report.combined_insights.recommendations.is_empty() {
                writeln!(f, "  (none)")?;
            }
            for rec in &report.combined_insights.recommendations {
                writeln!(f, "  * {rec}")?;
            }
        }
        Ok(())
    }
}

fn write_distribution<L: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    dist: &CategoryDistribution<L>,
) -> fmt::Result {
    for ((label, count), pct) in dist
        .labels
        .iter()
        .zip(&dist.counts)
        .zip(&dist.percentages)
        .take(TEXT_LIST_LIMIT)
    {
        writeln!(f, "  {label:<32} {:>8}  {:>6}", format_count(*count), format_percent(*pct))?;
    }
    if dist.len() > TEXT_LIST_LIMIT {
        writeln!(f, "  ... {} more", dist.len() - TEXT_LIST_LIMIT)?;
    }
    Ok(())
}

fn write_ranked(f: &mut fmt::Formatter<'_>, r: &RankedDistribution) -> fmt::Result {
    if r.distribution.is_empty() {
        return writeln!(f, "  (no values)");
    }
    write_distribution(f, &r.distribution)
}

fn write_hourly(f: &mut fmt::Formatter<'_>, r: &HourlyActivity) -> fmt::Result {
    let dist = &r.distribution;
    for ((hour, count), pct) in dist.labels.iter().zip(&dist.counts).zip(&dist.percentages) {
        if *count > 0 {
            writeln!(f, "  {}  {:>8}  {:>6}", format_hour(*hour), format_count(*count), format_percent(*pct))?;
        }
    }
    Ok(())
}

fn write_priority(f: &mut fmt::Formatter<'_>, r: &PriorityDistribution) -> fmt::Result {
    write_ranked(f, &r.overall)?;
    if r.hourly_distribution.is_empty() {
        return Ok(());
    }
    writeln!(f, "By hour:")?;
    for (hour, dist) in &r.hourly_distribution {
        let shares: Vec<String> = dist
            .labels
            .iter()
            .zip(&dist.percentages)
            .map(|(label, pct)| format!("{label} {}", format_percent(*pct)))
            .collect();
        writeln!(f, "  {}  {}", format_hour(*hour), shares.join(", "))?;
    }
    Ok(())
}

fn write_duration(f: &mut fmt::Formatter<'_>, r: &DurationSummary) -> fmt::Result {
    writeln!(
        f,
        "  count {}  mean {}  median {}  std {}  min {}  max {}",
        format_count(r.count as u64),
        format_minutes(r.mean),
        format_minutes(r.median),
        format_minutes(r.std),
        format_minutes(r.min),
        format_minutes(r.max)
    )?;
    let h = &r.histogram;
    for (i, (edge, count)) in h.bin_edges.iter().zip(&h.bin_counts).enumerate() {
        if i + 1 == h.bin_edges.len() {
            writeln!(f, "  {edge:>5}+       {count:>8}")?;
        } else {
            writeln!(f, "  {edge:>5}-{:<5}  {count:>8}", edge + h.bin_width)?;
        }
    }
    Ok(())
}

fn write_workload(f: &mut fmt::Formatter<'_>, r: &WorkloadInequality) -> fmt::Result {
    writeln!(
        f,
        "  {} periods of {} minutes ranked by {:?}",
        r.buckets.len(),
        r.window_minutes,
        r.periods.metric
    )?;
    for (label, list) in [
        ("Most unequal", &r.periods.highest),
        ("Typical", &r.periods.typical),
        ("Most equal", &r.periods.lowest),
    ] {
        writeln!(f, "  {label}:")?;
        for b in list {
            writeln!(
                f,
                "    {}  workers {:>2}  relative {:.2}  gini {:.2}  std {:.1}",
                b.bucket_key, b.num_workers, b.relative_inequality, b.gini, b.std_dev
            )?;
        }
    }
    Ok(())
}

fn write_transporters(f: &mut fmt::Formatter<'_>, r: &[TransporterSummary]) -> fmt::Result {
    for s in r.iter().take(TEXT_LIST_LIMIT) {
        writeln!(
            f,
            "  {:<24} {:>6} transports  {:>12} total  {:>10} avg  busiest {}",
            s.transporter_id.as_str(),
            format_count(s.total_transports),
            format_minutes(s.total_minutes),
            format_minutes(s.avg_duration),
            s.busiest_hour.map_or_else(|| "-".to_owned(), format_hour)
        )?;
    }
    if r.len() > TEXT_LIST_LIMIT {
        writeln!(f, "  ... {} more", r.len() - TEXT_LIST_LIMIT)?;
    }
    Ok(())
}

fn write_insights(f: &mut fmt::Formatter<'_>, insights: &InsightStatement) -> fmt::Result {
    for finding in &insights.findings {
        writeln!(f, "  - {finding}")?;
    }
    for rec in &insights.recommendations {
        writeln!(f, "  * {rec}")?;
    }
    Ok(())
}

/// Command-line arguments.
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use transport_audit_core::ingest::RecordField;
use transport_audit_core::AnalysisKind;

/// Report rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable sections (default)
    Text,
    /// One JSON document for machine consumption
    Json,
}

/// Which analyses to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    All,
    One(AnalysisKind),
}

impl Selection {
    pub fn kinds(self) -> Vec<AnalysisKind> {
        match self {
            Self::All => AnalysisKind::ALL.to_vec(),
            Self::One(kind) => vec![kind],
        }
    }
}

fn parse_selection(s: &str) -> Result<Selection, String> {
    if s.trim().eq_ignore_ascii_case("all") {
        return Ok(Selection::All);
    }
    s.parse::<AnalysisKind>()
        .map(Selection::One)
        .map_err(|e| e.to_string())
}

/// A `field=header` column override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnOverride {
    pub field: RecordField,
    pub header: String,
}

fn parse_column(s: &str) -> Result<ColumnOverride, String> {
    let (field, header) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=HEADER, got `{s}`"))?;
    let header = header.trim();
    if header.is_empty() {
        return Err(format!("empty header name for `{}`", field.trim()));
    }
    Ok(ColumnOverride {
        field: field.parse()?,
        header: header.to_owned(),
    })
}

/// A `field=value` record filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueFilter {
    pub field: RecordField,
    pub value: String,
}

fn parse_filter(s: &str) -> Result<ValueFilter, String> {
    let (field, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got `{s}`"))?;
    let value = value.trim();
    if value.is_empty() {
        return Err(format!("empty filter value for `{}`", field.trim()));
    }
    Ok(ValueFilter {
        field: field.parse()?,
        value: value.to_owned(),
    })
}

#[derive(Parser, Debug)]
#[command(name = "transport-audit")]
#[command(version)]
#[command(
    about = "Descriptive statistics and workload-fairness metrics for patient-transport logs",
    long_about = None
)]
pub struct Cli {
    /// CSV export to analyse (`;`, `,` or tab separated)
    #[arg(value_name = "CSV")]
    pub input: PathBuf,

    /// Analysis to run: all, hourly_activity, transport_types,
    /// location_frequency, transport_duration, priority_analysis,
    /// workload_inequality, transporter_summary
    #[arg(short, long, value_name = "KIND", default_value = "all", value_parser = parse_selection)]
    pub analysis: Selection,

    /// JSON engine configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Map a record field to a CSV header, e.g. `--column transporter=Bärare`
    /// (repeatable; overrides auto-detection)
    #[arg(long = "column", value_name = "FIELD=HEADER", value_parser = parse_column)]
    pub columns: Vec<ColumnOverride>,

    /// Analyse only records whose field equals the value, e.g.
    /// `--filter transport_type=Säng` (repeatable; all must match)
    #[arg(long = "filter", value_name = "FIELD=VALUE", value_parser = parse_filter)]
    pub filters: Vec<ValueFilter>,

    /// List the distinct values of a field instead of running analyses
    #[arg(long, value_name = "FIELD")]
    pub values: Option<RecordField>,

    /// Size of the highest / typical / lowest period lists
    #[arg(short, long, value_name = "N")]
    pub limit: Option<usize>,

    /// Worker threads when running all analyses (0 = one per CPU)
    #[arg(long, value_name = "N")]
    pub threads: Option<usize>,

    /// Log at DEBUG level (per-record diagnostics)
    #[arg(short, long)]
    pub verbose: bool,
}

/// TransportAudit CLI — argument parsing, config loading, and report output.
///
/// Business logic lives in `transport-audit-core`; this crate only wires
/// files and flags to it.
pub mod cli;
pub mod report;

pub use cli::{Cli, ColumnOverride, OutputFormat, Selection, ValueFilter};
pub use report::{Report, ReportEntry, TextReport};

use anyhow::{Context, Result};
use tracing::info;
use transport_audit_core::ingest::{load_records, RecordField};
use transport_audit_core::EngineConfig;

/// Resolve the engine config: file (if any), then command-line overrides.
pub fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(limit) = cli.limit {
        config.ranking_limit = limit;
    }
    if let Some(threads) = cli.threads {
        config.threads = threads;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Load the input, run the selected analyses, and render the report.
pub fn run(cli: &Cli) -> Result<String> {
    let config = load_config(cli)?;
    let overrides: Vec<(RecordField, String)> = cli
        .columns
        .iter()
        .map(|c| (c.field, c.header.clone()))
        .collect();

    let mut data = load_records(&cli.input, &overrides, &config)
        .with_context(|| format!("loading {}", cli.input.display()))?;
    for filter in &cli.filters {
        data = data.filtered(filter.field, &filter.value);
    }

    if let Some(field) = cli.values {
        let values: Vec<String> = data
            .records
            .distinct_values(field)
            .into_iter()
            .map(String::from)
            .collect();
        return render_values(&values, cli.format);
    }

    info!(
        "Running {} analyses over {} records",
        cli.analysis.kinds().len(),
        data.records.len()
    );

    let report = Report::build(data, cli.analysis, &config);
    let rendered = match cli.format {
        OutputFormat::Json => report.to_json().context("serialising report")?,
        OutputFormat::Text => report.text().to_string(),
    };
    Ok(rendered)
}

/// Distinct values of one field: one per line, or a JSON array.
fn render_values(values: &[String], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(values).context("serialising values"),
        OutputFormat::Text => Ok(values.join("\n")),
    }
}

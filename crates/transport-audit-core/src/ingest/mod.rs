/// CSV ingestion — from a delimited export on disk to a [`RecordSet`].
///
/// Loading is the only fallible stage of the pipeline. Once the table is
/// read and the time columns are mapped, every data problem is recorded in
/// [`Diagnostics`](crate::model::Diagnostics) rather than raised.
pub mod columns;
pub mod csv_loader;

pub use columns::{ColumnIndices, ColumnMapping, RecordField};
pub use csv_loader::{load_table, read_table, sniff_delimiter, RawTable};

use crate::config::EngineConfig;
use crate::model::{RecordSet, TransportRecord};
use crate::parse::TimestampParser;
use compact_str::CompactString;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Failure to turn a file into records.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("the file has no header row")]
    Empty,

    #[error("no column found for required field `{field}`; map one explicitly")]
    MissingColumn { field: RecordField },

    #[error("column `{header}` mapped to `{field}` does not exist in the file")]
    UnknownColumn { field: RecordField, header: String },
}

/// Shape of the loaded data, reported alongside analysis results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSummary {
    /// Records kept after the duration and value filters.
    pub row_count: usize,
    pub column_count: usize,
    pub columns: Vec<String>,
    pub delimiter: String,
    pub mapping: ColumnMapping,
    /// Rows removed by the maximum-duration filter.
    pub filtered_count: u64,
    pub filtered_reason: Option<String>,
    /// Applied value filters, as `field = value`.
    pub value_filters: Vec<String>,
}

/// A loaded record set and a description of where it came from.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub records: RecordSet,
    pub summary: DataSummary,
}

impl LoadedData {
    /// Restrict the records to those whose `field` equals `value`.
    pub fn filtered(mut self, field: RecordField, value: &str) -> Self {
        self.records = self.records.filtered(field, value);
        self.summary.row_count = self.records.len();
        self.summary
            .value_filters
            .push(format!("{field} = {}", value.trim()));
        self
    }
}

impl RecordSet {
    /// Keep records whose `field` is exactly `value` (surrounding
    /// whitespace ignored). Records with no value for `field` never match.
    pub fn filtered(self, field: RecordField, value: &str) -> Self {
        let wanted = value.trim();
        let set = self.retain_matching(|rec| field.value_of(rec).is_some_and(|v| v == wanted));
        info!("Filter {field} = {wanted:?}: {} transports remain", set.len());
        set
    }

    /// Distinct values of `field` in first-seen order, nulls excluded.
    pub fn distinct_values(&self, field: RecordField) -> Vec<CompactString> {
        let mut seen = HashSet::new();
        self.iter()
            .filter_map(|rec| field.value_of(rec))
            .filter(|v| seen.insert(v.clone()))
            .collect()
    }

    /// Derive records from raw rows and apply the optional duration cap.
    pub fn from_rows(
        rows: &[csv::StringRecord],
        columns: &ColumnIndices,
        parser: TimestampParser,
        max_duration_minutes: Option<f64>,
    ) -> Self {
        let text = |row: &csv::StringRecord, idx: Option<usize>| {
            RawTable::cell(row, idx).map(CompactString::from)
        };

        let records: Vec<TransportRecord> = rows
            .iter()
            .map(|row| {
                let start = RawTable::cell(row, columns.start_time).and_then(|t| parser.parse(t));
                let end = RawTable::cell(row, columns.end_time).and_then(|t| parser.parse(t));
                TransportRecord {
                    start_location: text(row, columns.start_location),
                    end_location: text(row, columns.end_location),
                    transport_type: text(row, columns.transport_type),
                    priority: text(row, columns.priority),
                    transporter_id: text(row, columns.transporter_id),
                    ..TransportRecord::new(start, end)
                }
            })
            .collect();

        let set = Self::from_records(records);
        match max_duration_minutes {
            Some(max) => set.without_longer_than(max),
            None => set,
        }
    }
}

/// Load `path`, map its columns, and derive the record set.
///
/// `overrides` replace auto-detected headers field by field.
pub fn load_records(
    path: &Path,
    overrides: &[(RecordField, String)],
    config: &EngineConfig,
) -> Result<LoadedData, IngestError> {
    let table = load_table(path)?;
    build_records(table, overrides, config)
}

/// Same as [`load_records`] for an already-read table.
pub fn build_records(
    table: RawTable,
    overrides: &[(RecordField, String)],
    config: &EngineConfig,
) -> Result<LoadedData, IngestError> {
    let mut mapping = ColumnMapping::detect(&table.headers);
    for (field, header) in overrides {
        mapping.set(*field, header.clone());
    }
    let columns = mapping.resolve(&table.headers)?;
    if columns.transporter_id.is_none() {
        warn!("No transporter column mapped; workload inequality will be empty");
    }

    let records = RecordSet::from_rows(
        &table.rows,
        &columns,
        config.timestamp_parser(),
        config.max_duration_minutes,
    );
    let diagnostics = records.diagnostics();
    info!(
        rows = diagnostics.total_rows,
        kept = records.len(),
        unparseable = diagnostics.unparseable_timestamps,
        negative = diagnostics.negative_durations,
        "Derived transport records"
    );

    let filtered_reason = config
        .max_duration_minutes
        .filter(|_| diagnostics.filtered_long > 0)
        .map(|max| format!("Removed transports with duration > {max} minutes"));

    let summary = DataSummary {
        row_count: records.len(),
        column_count: table.headers.len(),
        columns: table.headers,
        delimiter: (table.delimiter as char).to_string(),
        mapping,
        filtered_count: diagnostics.filtered_long,
        filtered_reason,
        value_filters: Vec::new(),
    };
    Ok(LoadedData { records, summary })
}

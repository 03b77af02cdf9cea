/// TransportAudit Core — ingestion, analysis, and data model.
///
/// This crate contains all business logic with zero UI dependencies.
/// Every analysis is a pure function over an immutable [`model::RecordSet`],
/// so the same engine serves the CLI today and any other frontend later.
///
/// # Modules
///
/// - [`model`] — Transport records, record sets, workload buckets, formatting.
/// - [`parse`] — Heterogeneous timestamp parsing.
/// - [`ingest`] — CSV loading, delimiter sniffing, and column mapping.
/// - [`analysis`] — Category distributions, duration statistics, workload
///   inequality, period ranking, and the analysis registry.
/// - [`insights`] — Threshold-driven findings and recommendations.
/// - [`config`] — Engine configuration with JSON loading.
pub mod analysis;
pub mod config;
pub mod ingest;
pub mod insights;
pub mod model;
pub mod parse;

pub use analysis::{run_all, run_analysis, AnalysisKind, AnalysisResult, UnknownAnalysis};
pub use config::{ConfigError, EngineConfig};
pub use insights::{combined_insights, generate_insights, InsightStatement};
pub use model::{RecordSet, TransportRecord};
pub use parse::{parse_timestamp, DateOrder, TimestampParser};

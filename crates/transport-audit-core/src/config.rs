/// Engine configuration.
///
/// Every field has a default, so an empty JSON object (or no config file at
/// all) yields the standard behaviour. Values are checked by
/// [`EngineConfig::validate`] before any analysis runs.
use crate::analysis::duration::{DurationParams, MAX_HISTOGRAM_BINS};
use crate::analysis::ranking::InequalityMetric;
use crate::analysis::workload::BucketWindow;
use crate::parse::{DateOrder, TimestampParser};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure to load or validate an [`EngineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Resolution of ambiguous `NN-NN-YYYY` dates.
    pub date_order: DateOrder,
    /// Drop records longer than this at load time; `None` keeps everything.
    pub max_duration_minutes: Option<f64>,
    pub histogram_bin_width: f64,
    /// Lower edge of the final histogram bin, rounded down to a multiple of
    /// the bin width; `None` follows the data.
    pub histogram_upper_edge: Option<f64>,
    pub long_transport_minutes: f64,
    pub location_top_n: usize,
    pub ranking_limit: usize,
    pub ranking_metric: InequalityMetric,
    pub bucket_window: BucketWindow,
    /// Worker threads for "run all"; 0 means one per logical CPU.
    pub threads: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            date_order: DateOrder::DayFirst,
            max_duration_minutes: Some(30.0),
            histogram_bin_width: 5.0,
            histogram_upper_edge: Some(30.0),
            long_transport_minutes: 30.0,
            location_top_n: 10,
            ranking_limit: 5,
            ranking_metric: InequalityMetric::RelativeInequality,
            bucket_window: BucketWindow::Hourly,
            threads: 0,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a config from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a JSON config file.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Reject values that would make an analysis meaningless or panic.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let width = self.histogram_bin_width;
        if !(width.is_finite() && width > 0.0) {
            return Err(ConfigError::Invalid {
                field: "histogram_bin_width",
                reason: format!("must be a positive number, got {width}"),
            });
        }
        if let Some(edge) = self.histogram_upper_edge {
            if !edge.is_finite() || edge < 0.0 || edge / width > MAX_HISTOGRAM_BINS as f64 {
                return Err(ConfigError::Invalid {
                    field: "histogram_upper_edge",
                    reason: format!("must be between 0 and {} bins wide, got {edge}", MAX_HISTOGRAM_BINS),
                });
            }
        }
        if let Some(max) = self.max_duration_minutes {
            if !(max.is_finite() && max >= 0.0) {
                return Err(ConfigError::Invalid {
                    field: "max_duration_minutes",
                    reason: format!("must be a non-negative number, got {max}"),
                });
            }
        }
        if !self.long_transport_minutes.is_finite() {
            return Err(ConfigError::Invalid {
                field: "long_transport_minutes",
                reason: "must be finite".into(),
            });
        }
        if self.location_top_n == 0 {
            return Err(ConfigError::Invalid {
                field: "location_top_n",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    pub fn timestamp_parser(&self) -> TimestampParser {
        TimestampParser::new(self.date_order)
    }

    pub fn duration_params(&self) -> DurationParams {
        DurationParams {
            bin_width: self.histogram_bin_width,
            upper_edge: self.histogram_upper_edge,
            long_threshold_minutes: self.long_transport_minutes,
        }
    }

    /// Resolved worker-thread count.
    pub fn effective_threads(&self) -> usize {
        if self.threads == 0 {
            num_cpus::get()
        } else {
            self.threads
        }
    }
}

/// A single observed patient transport.
///
/// Records are derived once (timestamps parsed, duration computed) and are
/// never mutated afterwards. Nullable fields stay `None` rather than being
/// replaced with sentinels, so each analysis can decide for itself which
/// records it can use.
use chrono::{NaiveDateTime, Timelike};
use compact_str::{format_compact, CompactString};
use serde::Serialize;
use tracing::warn;

/// Outcome of deriving a duration from the two timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DurationStatus {
    /// Both instants parsed and `end >= start`.
    Valid { minutes: f64 },
    /// Both instants parsed but `end < start`. The usable duration is 0;
    /// the raw negative value is kept for diagnostics.
    ClampedNegative { raw_minutes: f64 },
    /// At least one instant is missing or unparseable.
    Unavailable,
}

impl DurationStatus {
    /// Derive the status from two optional instants.
    pub fn between(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Self {
        match (start, end) {
            (Some(start), Some(end)) => {
                let minutes = (end - start).num_milliseconds() as f64 / 60_000.0;
                if minutes < 0.0 {
                    warn!("Negative duration of {minutes:.2} minutes ({start} -> {end}); clamped to 0");
                    Self::ClampedNegative {
                        raw_minutes: minutes,
                    }
                } else {
                    Self::Valid { minutes }
                }
            }
            _ => Self::Unavailable,
        }
    }

    /// Usable duration: the valid value, 0 for a clamped record, `None`
    /// when it cannot be computed.
    #[inline]
    pub fn minutes(self) -> Option<f64> {
        match self {
            Self::Valid { minutes } => Some(minutes),
            Self::ClampedNegative { .. } => Some(0.0),
            Self::Unavailable => None,
        }
    }
}

/// One transport event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransportRecord {
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub start_location: Option<CompactString>,
    pub end_location: Option<CompactString>,
    pub transport_type: Option<CompactString>,
    pub priority: Option<CompactString>,
    /// Identifies the transporter (worker) who carried out the transport.
    pub transporter_id: Option<CompactString>,
    /// Derived from `start_time` / `end_time` at construction.
    pub duration: DurationStatus,
}

impl TransportRecord {
    /// Create a record from its two instants; all categorical fields start empty.
    pub fn new(start_time: Option<NaiveDateTime>, end_time: Option<NaiveDateTime>) -> Self {
        Self {
            start_time,
            end_time,
            start_location: None,
            end_location: None,
            transport_type: None,
            priority: None,
            transporter_id: None,
            duration: DurationStatus::between(start_time, end_time),
        }
    }

    pub fn with_transporter(mut self, id: impl Into<CompactString>) -> Self {
        self.transporter_id = Some(id.into());
        self
    }

    pub fn with_transport_type(mut self, kind: impl Into<CompactString>) -> Self {
        self.transport_type = Some(kind.into());
        self
    }

    pub fn with_priority(mut self, priority: impl Into<CompactString>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    pub fn with_locations(
        mut self,
        start: impl Into<CompactString>,
        end: impl Into<CompactString>,
    ) -> Self {
        self.start_location = Some(start.into());
        self.end_location = Some(end.into());
        self
    }

    /// Usable duration in minutes (see [`DurationStatus::minutes`]).
    #[inline]
    pub fn duration_minutes(&self) -> Option<f64> {
        self.duration.minutes()
    }

    /// `true` if the record carries a data-quality anomaly (negative duration).
    #[inline]
    pub fn is_anomaly(&self) -> bool {
        matches!(self.duration, DurationStatus::ClampedNegative { .. })
    }

    /// Hour-of-day (0–23) of the start instant.
    #[inline]
    pub fn start_hour(&self) -> Option<u32> {
        self.start_time.map(|t| t.hour())
    }

    /// Route key `"{start} → {end}"`; `None` unless both locations are known.
    pub fn route(&self) -> Option<CompactString> {
        match (&self.start_location, &self.end_location) {
            (Some(start), Some(end)) => Some(format_compact!("{start} → {end}")),
            _ => None,
        }
    }
}

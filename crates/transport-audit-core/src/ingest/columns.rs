/// Column mapping — which CSV header feeds which record field.
///
/// Hospital exports name their columns in Swedish and vary between
/// systems, so [`ColumnMapping::detect`] guesses from header keywords and
/// the caller can override any field by name.
use super::IngestError;
use crate::model::TransportRecord;
use chrono::NaiveDateTime;
use compact_str::{format_compact, CompactString};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A record field that can be sourced from a CSV column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordField {
    StartTime,
    EndTime,
    StartLocation,
    EndLocation,
    TransportType,
    Priority,
    Transporter,
}

impl RecordField {
    pub const ALL: [RecordField; 7] = [
        Self::StartTime,
        Self::EndTime,
        Self::StartLocation,
        Self::EndLocation,
        Self::TransportType,
        Self::Priority,
        Self::Transporter,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::StartTime => "start_time",
            Self::EndTime => "end_time",
            Self::StartLocation => "start_location",
            Self::EndLocation => "end_location",
            Self::TransportType => "transport_type",
            Self::Priority => "priority",
            Self::Transporter => "transporter_id",
        }
    }

    /// The record's value for this field as text. Instants render as
    /// `YYYY-MM-DD HH:MM:SS`.
    pub fn value_of(self, rec: &TransportRecord) -> Option<CompactString> {
        let instant = |t: Option<NaiveDateTime>| {
            t.map(|t| format_compact!("{}", t.format(INSTANT_FORMAT)))
        };
        match self {
            Self::StartTime => instant(rec.start_time),
            Self::EndTime => instant(rec.end_time),
            Self::StartLocation => rec.start_location.clone(),
            Self::EndLocation => rec.end_location.clone(),
            Self::TransportType => rec.transport_type.clone(),
            Self::Priority => rec.priority.clone(),
            Self::Transporter => rec.transporter_id.clone(),
        }
    }
}

const INSTANT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RecordField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        // "transporter" and "worker" are accepted as friendlier aliases.
        if wanted.eq_ignore_ascii_case("transporter") || wanted.eq_ignore_ascii_case("worker") {
            return Ok(Self::Transporter);
        }
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                format!(
                    "unknown record field `{s}` (expected one of: {})",
                    Self::ALL.map(RecordField::name).join(", ")
                )
            })
    }
}

const PREFERRED_START: &str = "Uppdrag Starttid";
const PREFERRED_END: &str = "Uppdrag Sluttid";
const PREFERRED_WORKER: &str = "Sekundär Servicepersonal Id";

/// Header name per record field. `None` means the field stays null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnMapping {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub start_location: Option<String>,
    pub end_location: Option<String>,
    pub transport_type: Option<String>,
    pub priority: Option<String>,
    pub transporter_id: Option<String>,
}

impl ColumnMapping {
    /// Guess a mapping from header keywords (case-insensitive).
    ///
    /// Exact well-known export headers win over keyword matches; otherwise
    /// the first matching header in file order is used.
    pub fn detect<S: AsRef<str>>(headers: &[S]) -> Self {
        let headers: Vec<&str> = headers.iter().map(AsRef::as_ref).collect();
        let first = |pred: &dyn Fn(&str) -> bool| -> Option<String> {
            headers
                .iter()
                .find(|h| pred(h.to_lowercase().as_str()))
                .map(|h| h.to_string())
        };
        let exact = |name: &str| headers.iter().find(|h| **h == name).map(|h| h.to_string());

        Self {
            start_time: exact(PREFERRED_START).or_else(|| {
                first(&|h| {
                    !h.contains("önskad")
                        && (h.contains("starttid") || (h.contains("start") && h.contains("tid")))
                })
            }),
            end_time: exact(PREFERRED_END).or_else(|| {
                first(&|h| (h.contains("slut") || h.contains("stop")) && h.contains("tid"))
            }),
            start_location: first(&|h| h.contains("startplats") && !h.contains("id")),
            end_location: first(&|h| h.contains("slutplats") && !h.contains("id")),
            transport_type: first(&|h| {
                h.contains("transportmedel")
                    || (h.contains("transport") && h.contains("typ"))
                    || h.contains("uppdragstyp")
            }),
            priority: first(&|h| h.contains("prioritet") || h.contains("priority")),
            transporter_id: exact(PREFERRED_WORKER)
                .or_else(|| first(&|h| h.contains("personal") || h.contains("transporter"))),
        }
    }

    pub fn get(&self, field: RecordField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    /// Point `field` at `header`, replacing whatever was detected.
    pub fn set(&mut self, field: RecordField, header: impl Into<String>) {
        *self.slot_mut(field) = Some(header.into());
    }

    fn slot(&self, field: RecordField) -> &Option<String> {
        match field {
            RecordField::StartTime => &self.start_time,
            RecordField::EndTime => &self.end_time,
            RecordField::StartLocation => &self.start_location,
            RecordField::EndLocation => &self.end_location,
            RecordField::TransportType => &self.transport_type,
            RecordField::Priority => &self.priority,
            RecordField::Transporter => &self.transporter_id,
        }
    }

    fn slot_mut(&mut self, field: RecordField) -> &mut Option<String> {
        match field {
            RecordField::StartTime => &mut self.start_time,
            RecordField::EndTime => &mut self.end_time,
            RecordField::StartLocation => &mut self.start_location,
            RecordField::EndLocation => &mut self.end_location,
            RecordField::TransportType => &mut self.transport_type,
            RecordField::Priority => &mut self.priority,
            RecordField::Transporter => &mut self.transporter_id,
        }
    }

    /// Turn header names into column indices.
    ///
    /// Start and end time are required. Any mapped header that does not
    /// exist in `headers` is an error, so a typo in an override is caught
    /// instead of silently producing null fields.
    pub fn resolve<S: AsRef<str>>(&self, headers: &[S]) -> Result<ColumnIndices, IngestError> {
        let mut indices = ColumnIndices::default();
        for field in RecordField::ALL {
            let Some(name) = self.get(field) else {
                if matches!(field, RecordField::StartTime | RecordField::EndTime) {
                    return Err(IngestError::MissingColumn { field });
                }
                continue;
            };
            let idx = headers
                .iter()
                .position(|h| h.as_ref() == name)
                .ok_or_else(|| IngestError::UnknownColumn {
                    field,
                    header: name.to_owned(),
                })?;
            *indices.slot_mut(field) = Some(idx);
        }
        Ok(indices)
    }
}

/// Column positions resolved against a concrete header row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnIndices {
    pub start_time: Option<usize>,
    pub end_time: Option<usize>,
    pub start_location: Option<usize>,
    pub end_location: Option<usize>,
    pub transport_type: Option<usize>,
    pub priority: Option<usize>,
    pub transporter_id: Option<usize>,
}

impl ColumnIndices {
    fn slot_mut(&mut self, field: RecordField) -> &mut Option<usize> {
        match field {
            RecordField::StartTime => &mut self.start_time,
            RecordField::EndTime => &mut self.end_time,
            RecordField::StartLocation => &mut self.start_location,
            RecordField::EndLocation => &mut self.end_location,
            RecordField::TransportType => &mut self.transport_type,
            RecordField::Priority => &mut self.priority,
            RecordField::Transporter => &mut self.transporter_id,
        }
    }
}

/// Timestamp normalisation for heterogeneous hospital export formats.
///
/// A fixed list of explicit patterns is tried in order; the first one that
/// both matches and yields a calendrically valid instant wins. Only when
/// every explicit pattern fails does the parser fall back to a small set of
/// locale-agnostic ISO-style layouts. Failure is a typed absence (`None`),
/// never an error.
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How to read an ambiguous `NN-NN-YYYY` date.
///
/// Resolution is purely by pattern order, not by inspecting the digits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOrder {
    /// `31-12-2023` — the layout used by Swedish hospital exports.
    #[default]
    DayFirst,
    /// `12-31-2023`.
    MonthFirst,
}

const DAY_FIRST_PATTERNS: [&str; 5] = [
    "%d-%m-%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
];

const MONTH_FIRST_PATTERNS: [&str; 5] = [
    "%m-%d-%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
];

/// Generic fallback layouts, tried after RFC 3339.
const FALLBACK_PATTERNS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

/// Stateless, copyable timestamp parser.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimestampParser {
    order: DateOrder,
}

impl TimestampParser {
    pub const fn new(order: DateOrder) -> Self {
        Self { order }
    }

    pub fn order(self) -> DateOrder {
        self.order
    }

    /// Dashed date without seconds, read in the configured order.
    fn dashed_without_seconds(self) -> &'static str {
        match self.order {
            DateOrder::DayFirst => "%d-%m-%Y %H:%M",
            DateOrder::MonthFirst => "%m-%d-%Y %H:%M",
        }
    }

    /// The explicit patterns in the order they are attempted.
    pub fn explicit_patterns(self) -> &'static [&'static str; 5] {
        match self.order {
            DateOrder::DayFirst => &DAY_FIRST_PATTERNS,
            DateOrder::MonthFirst => &MONTH_FIRST_PATTERNS,
        }
    }

    /// Parse `text` into a naive wall-clock instant.
    ///
    /// Leading/trailing whitespace is ignored; blank input is `None`.
    pub fn parse(self, text: &str) -> Option<NaiveDateTime> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        for pattern in self.explicit_patterns() {
            if let Ok(instant) = NaiveDateTime::parse_from_str(text, pattern) {
                return Some(instant);
            }
        }

        let parsed = parse_generic(text).or_else(|| {
            NaiveDateTime::parse_from_str(text, self.dashed_without_seconds()).ok()
        });
        if parsed.is_none() {
            debug!("Could not parse timestamp: {text:?}");
        }
        parsed
    }
}

/// Locale-agnostic fallback: RFC 3339, ISO-style layouts, then a bare date.
///
/// Dashed `NN-NN-YYYY` layouts are order-dependent and never tried here.
fn parse_generic(text: &str) -> Option<NaiveDateTime> {
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(text) {
        return Some(with_offset.naive_local());
    }

    FALLBACK_PATTERNS
        .iter()
        .find_map(|pattern| NaiveDateTime::parse_from_str(text, pattern).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Parse with the default day-first pattern order.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    TimestampParser::default().parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn ymd_hms(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    // ── explicit patterns ────────────────────────────────────────────────

    #[test]
    fn parses_day_first_dashes() {
        assert_eq!(
            parse_timestamp("31-12-2023 22:36:16"),
            Some(ymd_hms(2023, 12, 31, 22, 36, 16))
        );
    }

    #[test]
    fn parses_iso_like() {
        assert_eq!(
            parse_timestamp("2023-12-31 22:36:16"),
            Some(ymd_hms(2023, 12, 31, 22, 36, 16))
        );
    }

    #[test]
    fn parses_us_slashes_with_and_without_seconds() {
        assert_eq!(
            parse_timestamp("12/31/2023 22:36:16"),
            Some(ymd_hms(2023, 12, 31, 22, 36, 16))
        );
        assert_eq!(
            parse_timestamp("12/31/2023 22:36"),
            Some(ymd_hms(2023, 12, 31, 22, 36, 0))
        );
    }

    #[test]
    fn parses_dotted_european() {
        assert_eq!(
            parse_timestamp("31.12.2023 08:05:00"),
            Some(ymd_hms(2023, 12, 31, 8, 5, 0))
        );
    }

    /// `02-03-2024` is 2 March under the default order and 3 February
    /// when month-first is configured.
    #[test]
    fn ambiguous_dashes_follow_configured_order() {
        let day_first = TimestampParser::new(DateOrder::DayFirst)
            .parse("02-03-2024 10:00:00")
            .unwrap();
        assert_eq!((day_first.month(), day_first.day()), (3, 2));

        let month_first = TimestampParser::new(DateOrder::MonthFirst)
            .parse("02-03-2024 10:00:00")
            .unwrap();
        assert_eq!((month_first.month(), month_first.day()), (2, 3));
    }

    /// Dropping the seconds must not flip the day and month.
    #[test]
    fn dashes_without_seconds_follow_configured_order() {
        let month_first = TimestampParser::new(DateOrder::MonthFirst);
        assert_eq!(
            month_first.parse("02-03-2024 10:00"),
            Some(ymd_hms(2024, 2, 3, 10, 0, 0))
        );
        assert_eq!(
            month_first.parse("02-03-2024 10:00").map(|t| t.date()),
            month_first.parse("02-03-2024 10:00:00").map(|t| t.date())
        );
        assert_eq!(
            parse_timestamp("02-03-2024 10:00"),
            Some(ymd_hms(2024, 3, 2, 10, 0, 0))
        );
        assert_eq!(month_first.parse("31-12-2023 10:00"), None);
    }

    // ── fallback ─────────────────────────────────────────────────────────

    /// A day-first slashed date is not a valid `MM/DD` date, so it reaches
    /// the generic layouts.
    #[test]
    fn day_first_slashes_reach_fallback() {
        assert_eq!(
            parse_timestamp("31/12/2023 22:36:16"),
            Some(ymd_hms(2023, 12, 31, 22, 36, 16))
        );
    }

    #[test]
    fn parses_rfc3339_as_wall_clock() {
        let parsed = parse_timestamp("2024-01-15T09:30:00+01:00").unwrap();
        assert_eq!(parsed.hour(), 9);
        assert_eq!(parsed.minute(), 30);
    }

    #[test]
    fn parses_bare_date_as_midnight() {
        assert_eq!(
            parse_timestamp("2024-01-15"),
            Some(ymd_hms(2024, 1, 15, 0, 0, 0))
        );
    }

    // ── failures ─────────────────────────────────────────────────────────

    #[test]
    fn calendrically_invalid_is_none() {
        assert_eq!(parse_timestamp("31-02-2024 10:00:00"), None);
    }

    #[test]
    fn garbage_and_blank_are_none() {
        assert_eq!(parse_timestamp("not a date"), None);
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("   "), None);
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(
            parse_timestamp("  2023-12-31 22:36:16 "),
            Some(ymd_hms(2023, 12, 31, 22, 36, 16))
        );
    }
}

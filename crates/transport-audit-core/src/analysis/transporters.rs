/// Per-transporter totals — who moved how many patients, for how long,
/// and when they were busiest.
use super::categories::HOURS_PER_DAY;
use crate::model::RecordSet;
use compact_str::CompactString;
use serde::Serialize;
use std::collections::BTreeMap;

/// One transporter's totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransporterSummary {
    pub transporter_id: CompactString,
    /// Every record attributed to the transporter.
    pub total_transports: u64,
    /// Sum of usable durations.
    pub total_minutes: f64,
    /// Mean over records with a usable duration; 0 when there are none.
    pub avg_duration: f64,
    /// Hour-of-day with the most starts; ties → smallest hour.
    pub busiest_hour: Option<u32>,
}

#[derive(Default)]
struct Tally {
    transports: u64,
    timed: u64,
    minutes: f64,
    by_hour: [u64; HOURS_PER_DAY as usize],
}

/// Summaries ordered by transport count descending, then id ascending.
pub fn transporter_summary(records: &RecordSet) -> Vec<TransporterSummary> {
    let mut tallies: BTreeMap<CompactString, Tally> = BTreeMap::new();
    for rec in records {
        let Some(id) = &rec.transporter_id else {
            continue;
        };
        let tally = tallies.entry(id.clone()).or_default();
        tally.transports += 1;
        if let Some(minutes) = rec.duration_minutes() {
            tally.timed += 1;
            tally.minutes += minutes;
        }
        if let Some(hour) = rec.start_hour() {
            tally.by_hour[hour as usize] += 1;
        }
    }

    let mut summaries: Vec<TransporterSummary> = tallies
        .into_iter()
        .map(|(transporter_id, tally)| {
            let busiest_hour = tally
                .by_hour
                .iter()
                .enumerate()
                .filter(|&(_, &count)| count > 0)
                .fold(None, |best: Option<(usize, u64)>, (hour, &count)| match best {
                    Some((_, top)) if top >= count => best,
                    _ => Some((hour, count)),
                })
                .map(|(hour, _)| hour as u32);
            TransporterSummary {
                transporter_id,
                total_transports: tally.transports,
                total_minutes: tally.minutes,
                avg_duration: if tally.timed == 0 {
                    0.0
                } else {
                    tally.minutes / tally.timed as f64
                },
                busiest_hour,
            }
        })
        .collect();

    // Stable sort keeps the BTreeMap's id order among equal counts.
    summaries.sort_by(|a, b| b.total_transports.cmp(&a.total_transports));
    summaries
}

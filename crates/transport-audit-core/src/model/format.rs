/// Display formatting for minutes, percentages, hours, and counts.
///
/// All internal values stay as raw `f64` minutes / percentages. Formatting
/// happens only at the text boundary (insights and the CLI's text output).

/// Format a duration in minutes: `"12.5 min"` below an hour, `"1 h 05 min"` above.
pub fn format_minutes(minutes: f64) -> String {
    if minutes < 60.0 {
        return format!("{minutes:.1} min");
    }
    let total = minutes.round() as u64;
    format!("{} h {:02} min", total / 60, total % 60)
}

/// Format a percentage with one decimal place.
pub fn format_percent(percent: f64) -> String {
    format!("{percent:.1}%")
}

/// Format an hour-of-day as `"HH:00"`.
pub fn format_hour(hour: u32) -> String {
    format!("{hour:02}:00")
}

/// Format a count with thousand separators.
pub fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

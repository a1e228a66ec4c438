//! Human-readable renderings used by the reports.
use chrono::TimeDelta;

/// Formats the magnitude of `delta` as `Dd Hh Mm Ss`, always showing every unit.
pub fn format_dhms(delta: TimeDelta) -> String {
    let total = delta.num_seconds().unsigned_abs();
    let days = total / 86_400;
    let hours = total % 86_400 / 3_600;
    let mins = total % 3_600 / 60;
    let secs = total % 60;
    format!("{days}d {hours}h {mins}m {secs}s")
}

/// Groups decimal digits in threes: `1234567` becomes `1,234,567`.
pub fn with_commas(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn with_commas_signed(value: i64) -> String {
    if value < 0 {
        format!("-{}", with_commas(value.unsigned_abs()))
    } else {
        with_commas(value.unsigned_abs())
    }
}

//! Time handling for the `since` field.
//!
//! `since` terms are ages in seconds. A record matches a term when its
//! `updated` timestamp is at most that many seconds before "now".

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

/// Seconds per unit accepted in `since:` search tokens.
const AGE_UNITS: [(&str, u64); 7] = [
    ("sec", 1),
    ("min", 60),
    ("hour", 60 * 60),
    ("day", 24 * 60 * 60),
    ("week", 7 * 24 * 60 * 60),
    ("month", 30 * 24 * 60 * 60),
    ("year", 365 * 24 * 60 * 60),
];

/// Parses an `updated` timestamp.
///
/// Accepts RFC 3339 (with offset), and naive date-times or bare dates which
/// are read as UTC. Returns `None` for anything else.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Returns `true` if `updated` is no older than `max_age_secs` at `now`.
///
/// The boundary is inclusive and compared to the nanosecond. Timestamps
/// after `now` always qualify.
pub fn within_age(updated: DateTime<Utc>, now: DateTime<Utc>, max_age_secs: f64) -> bool {
    let age = now.signed_duration_since(updated);
    if age <= Duration::zero() {
        return true;
    }
    let whole_secs = age.num_seconds();
    let limit_secs = max_age_secs.trunc();
    if whole_secs as f64 != limit_secs {
        return (whole_secs as f64) < limit_secs;
    }
    let age_nanos = (age - Duration::seconds(whole_secs))
        .num_nanoseconds()
        .unwrap_or(0);
    let limit_nanos = ((max_age_secs - limit_secs) * 1e9).round() as i64;
    age_nanos <= limit_nanos
}

/// Parses an age expression such as `90`, `5min` or `2Week` into seconds.
///
/// The unit defaults to seconds. Returns `None` for malformed input.
pub fn parse_age(expr: &str) -> Option<u64> {
    let expr = expr.trim().to_lowercase();
    let digits_end = expr
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(expr.len());
    if digits_end == 0 {
        return None;
    }
    let (amount, unit) = expr.split_at(digits_end);
    let amount: u64 = amount.parse().ok()?;
    let scale = if unit.is_empty() {
        1
    } else {
        AGE_UNITS
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, secs)| *secs)?
    };
    amount.checked_mul(scale)
}

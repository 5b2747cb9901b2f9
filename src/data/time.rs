use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};

// ---------------------------------------------------------------------------
// Reference instant and validity window
// ---------------------------------------------------------------------------

pub const DEFAULT_BACK_HOURS: f64 = 24.0;
pub const DEFAULT_FORWARD_HOURS: f64 = 6.0;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Window used to shape upstream queries around a reference instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// The default query window: 24 h before `target` to 6 h after it.
    pub fn around(target: DateTime<Utc>) -> Self {
        build_time_window(target, DEFAULT_BACK_HOURS, DEFAULT_FORWARD_HOURS)
    }
}

/// Move `instant` by a (possibly negative or fractional) number of hours.
///
/// The shift is rounded to whole milliseconds and saturates at the limits of
/// the representable range.
pub fn shift_by_hours(instant: DateTime<Utc>, hours: f64) -> DateTime<Utc> {
    let millis = (hours * MILLIS_PER_HOUR).round() as i64;
    TimeDelta::try_milliseconds(millis)
        .and_then(|delta| instant.checked_add_signed(delta))
        .unwrap_or(if millis < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        })
}

/// "Now", shifted by `offset_hours`.
pub fn offset_to_instant(offset_hours: f64) -> DateTime<Utc> {
    shift_by_hours(Utc::now(), offset_hours)
}

pub fn build_time_window(target: DateTime<Utc>, back_hours: f64, forward_hours: f64) -> TimeWindow {
    TimeWindow {
        start: shift_by_hours(target, -back_hours),
        end: shift_by_hours(target, forward_hours),
    }
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// ISO-8601 with millisecond precision and a `Z` suffix, as the upstream API expects.
pub fn format_instant_for_query(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Slider label: `Now`, `+3h`, `-12h`.
pub fn format_offset_label(offset_hours: f64) -> String {
    if offset_hours == 0.0 {
        return "Now".to_string();
    }
    let sign = if offset_hours > 0.0 { "+" } else { "" };
    format!("{sign}{offset_hours}h")
}

pub fn format_range_for_display(window: &TimeWindow) -> String {
    fn short(instant: DateTime<Utc>) -> String {
        let iso = format_instant_for_query(instant);
        match iso.strip_suffix(":00.000Z") {
            Some(trimmed) => format!("{trimmed}Z"),
            None => iso,
        }
    }
    format!("{} → {}", short(window.start), short(window.end))
}

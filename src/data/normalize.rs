use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value as JsonValue;

use super::model::Properties;

// ---------------------------------------------------------------------------
// Alias families
// ---------------------------------------------------------------------------
//
// Upstream products report the same quantity under different names. Each list
// is scanned front to back and the first usable value wins, so the order is
// the precedence between schemas and must not be rearranged.

/// Altitude floor, feet MSL.
pub const FLOOR_ALIASES: &[&str] = &["min_ft", "floor", "base", "minAltFt"];

/// Altitude ceiling, feet MSL.
pub const CEILING_ALIASES: &[&str] = &["max_ft", "ceiling", "top", "maxAltFt"];

pub const VALID_FROM_ALIASES: &[&str] = &["validTimeFrom", "valid_time_from", "valid_from"];

pub const VALID_TO_ALIASES: &[&str] = &["validTimeTo", "valid_time_to", "valid_to"];

// ---------------------------------------------------------------------------
// Single-value readers
// ---------------------------------------------------------------------------

/// Interpret one property value as a finite number.
///
/// Numbers are taken as is; strings must be non-empty after trimming and parse
/// to a finite `f64`. Anything else is unusable.
fn as_finite_number(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        JsonValue::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            s.parse::<f64>().ok().filter(|v| v.is_finite())
        }
        _ => None,
    }
}

/// Resolve a number from the first alias that carries a usable value.
///
/// `fallback` is returned when no alias is usable; pass `None` to get strict
/// absence semantics. A missing property bag yields `None` whatever the fallback.
pub fn read_numeric_prop(props: Option<&Properties>, aliases: &[&str], fallback: Option<f64>) -> Option<f64> {
    let props = props?;
    aliases
        .iter()
        .filter_map(|name| props.get(*name))
        .find_map(as_finite_number)
        .or(fallback)
}

/// Resolve an instant from the first alias whose string value parses as a timestamp.
pub fn read_temporal_prop(props: Option<&Properties>, aliases: &[&str]) -> Option<DateTime<Utc>> {
    let props = props?;
    aliases
        .iter()
        .filter_map(|name| props.get(*name))
        .filter_map(JsonValue::as_str)
        .find_map(parse_timestamp)
}

/// First non-empty textual value among `aliases`. Numbers are rendered as text.
pub fn read_text_prop(props: Option<&Properties>, aliases: &[&str]) -> Option<String> {
    let props = props?;
    aliases
        .iter()
        .filter_map(|name| props.get(*name))
        .find_map(|value| match value {
            JsonValue::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            JsonValue::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse the timestamp spellings seen in advisory feeds.
///
/// Offset-less date-times and bare dates are taken as UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(&Utc));
    }

    let naive = text
        .strip_suffix('Z')
        .or_else(|| text.strip_suffix('z'))
        .unwrap_or(text);
    if let Some(dt) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(naive, fmt).ok())
    {
        return Some(dt.and_utc());
    }

    NaiveDate::parse_from_str(naive, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

// ---------------------------------------------------------------------------
// AdvisoryFields – canonical view of a feature's properties
// ---------------------------------------------------------------------------

/// The canonical altitude and validity fields of one advisory, resolved once
/// from its property bag. `None` means no alias carried a usable value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AdvisoryFields {
    pub floor_ft: Option<f64>,
    pub ceiling_ft: Option<f64>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_to: Option<DateTime<Utc>>,
}

impl AdvisoryFields {
    pub fn from_properties(props: &Properties) -> Self {
        let props = Some(props);
        AdvisoryFields {
            floor_ft: read_numeric_prop(props, FLOOR_ALIASES, None),
            ceiling_ft: read_numeric_prop(props, CEILING_ALIASES, None),
            valid_from: read_temporal_prop(props, VALID_FROM_ALIASES),
            valid_to: read_temporal_prop(props, VALID_TO_ALIASES),
        }
    }

    /// Floor and ceiling, with a missing bound replaced by the query bound on
    /// the same side. An advisory without altitude data spans any query band.
    pub fn altitude_band(&self, query_min: f64, query_max: f64) -> (f64, f64) {
        (
            self.floor_ft.unwrap_or(query_min),
            self.ceiling_ft.unwrap_or(query_max),
        )
    }

    /// Validity interval, only when both ends are known.
    pub fn validity(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        Some((self.valid_from?, self.valid_to?))
    }
}

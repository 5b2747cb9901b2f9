use super::model::{Product, Properties, WeatherFeature};
use super::normalize::{read_numeric_prop, read_text_prop};

// Filter families plus the upstream AIR SIGMET names, lowest priority. Display only.
const FLOOR_TEXT_ALIASES: &[&str] = &["min_ft", "floor", "base", "minAltFt", "altitudeLow1"];
const CEILING_TEXT_ALIASES: &[&str] = &["max_ft", "ceiling", "top", "maxAltFt", "altitudeHi1"];
const HAZARD_ALIASES: &[&str] = &["hazard", "phenomenon", "event"];
const VALID_FROM_TEXT_ALIASES: &[&str] = &["validTimeFrom", "valid_time_from", "valid_from", "issueTime"];
const VALID_TO_TEXT_ALIASES: &[&str] = &["validTimeTo", "valid_time_to", "valid_to"];
const RAW_TEXT_ALIASES: &[&str] = &["raw_text", "rawText", "raw", "rawSigmet", "rawAirSigmet"];

const UNKNOWN: &str = "Unknown";

/// Hazard name of an advisory, if it carries one.
pub fn hazard_label(props: Option<&Properties>) -> Option<String> {
    read_text_prop(props, HAZARD_ALIASES)
}

/// Human-readable digest of one advisory, shown when it is selected on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct AdvisorySummary {
    pub product: Product,
    pub hazard: String,
    pub altitude: String,
    pub valid_from: String,
    pub valid_to: String,
    pub raw_text: Option<String>,
}

impl AdvisorySummary {
    pub fn from_feature(product: Product, feature: &WeatherFeature) -> Self {
        let props = feature.properties.as_ref();

        let bound = |aliases: &[&str]| {
            read_numeric_prop(props, aliases, None)
                .map(|ft| ft.to_string())
                .unwrap_or_else(|| UNKNOWN.to_string())
        };
        let text = |aliases: &[&str]| read_text_prop(props, aliases).unwrap_or_else(|| UNKNOWN.to_string());

        AdvisorySummary {
            product,
            hazard: hazard_label(props).unwrap_or_else(|| product.label().to_string()),
            altitude: format!("{} to {} ft", bound(FLOOR_TEXT_ALIASES), bound(CEILING_TEXT_ALIASES)),
            valid_from: text(VALID_FROM_TEXT_ALIASES),
            valid_to: text(VALID_TO_TEXT_ALIASES),
            raw_text: read_text_prop(props, RAW_TEXT_ALIASES),
        }
    }

    /// Label/value rows in display order.
    pub fn rows(&self) -> [(&'static str, &str); 4] {
        [
            ("Hazard", self.hazard.as_str()),
            ("Altitude", self.altitude.as_str()),
            ("Valid From", self.valid_from.as_str()),
            ("Valid To", self.valid_to.as_str()),
        ]
    }
}

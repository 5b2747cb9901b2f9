use chrono::{DateTime, Utc};

use super::model::{WeatherFeature, WeatherFeatureCollection};
use super::normalize::AdvisoryFields;

// ---------------------------------------------------------------------------
// Filter parameters
// ---------------------------------------------------------------------------

/// Altitude band (feet, `altitude_min <= altitude_max`) and reference instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterParams {
    pub altitude_min: f64,
    pub altitude_max: f64,
    pub target_time: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// Whether a single advisory should be shown for `params`.
///
/// * No geometry → never shown.
/// * No property bag → no altitude band, never shown.
/// * Altitude: missing floor/ceiling take the query bounds, then the band must
///   overlap `[altitude_min, altitude_max]` (touching edges count).
/// * Time: only checked when both validity ends are known; the target must lie
///   inside the closed interval. Otherwise the advisory is treated as always valid.
pub fn feature_passes(feature: &WeatherFeature, params: &FilterParams) -> bool {
    if feature.geometry.is_none() {
        return false;
    }

    let Some(props) = feature.properties.as_ref() else {
        return false;
    };
    let fields = AdvisoryFields::from_properties(props);

    let (floor, ceiling) = fields.altitude_band(params.altitude_min, params.altitude_max);
    if ceiling < params.altitude_min || floor > params.altitude_max {
        return false;
    }

    match fields.validity() {
        Some((start, end)) => start <= params.target_time && params.target_time <= end,
        None => true,
    }
}

/// Indices of the advisories passing `params`, in collection order.
pub fn filtered_indices(collection: &WeatherFeatureCollection, params: &FilterParams) -> Vec<usize> {
    collection
        .features
        .iter()
        .enumerate()
        .filter(|(_, feature)| feature_passes(feature, params))
        .map(|(i, _)| i)
        .collect()
}

/// A new collection holding only the passing advisories. The input is left
/// untouched and the collection-level members are carried over.
pub fn filter_features(collection: &WeatherFeatureCollection, params: &FilterParams) -> WeatherFeatureCollection {
    let features = filtered_indices(collection, params)
        .into_iter()
        .map(|i| collection.features[i].clone())
        .collect();
    collection.with_features(features)
}

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

/// Open attribute bag attached to every feature.
pub type Properties = Map<String, JsonValue>;

pub const FEATURE_COLLECTION: &str = "FeatureCollection";
pub const FEATURE: &str = "Feature";

// ---------------------------------------------------------------------------
// Product – which upstream polygon source a collection came from
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Product {
    /// International SIGMETs.
    Sigmet,
    /// Domestic AIR SIGMETs (AIRMETs and convective SIGMETs).
    AirSigmet,
}

impl Product {
    pub const ALL: [Product; 2] = [Product::Sigmet, Product::AirSigmet];

    /// Path segment of the upstream data endpoint.
    pub fn endpoint(self) -> &'static str {
        match self {
            Product::Sigmet => "isigmet",
            Product::AirSigmet => "airsigmet",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Product::Sigmet => "SIGMET",
            Product::AirSigmet => "AIR SIGMET",
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// WeatherFeature – one advisory polygon
// ---------------------------------------------------------------------------

fn feature_tag() -> String {
    FEATURE.to_string()
}

/// A single hazard advisory. Properties carry no fixed schema; the same
/// quantity may appear under several names (see [`super::normalize`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherFeature {
    #[serde(rename = "type", default = "feature_tag")]
    pub kind: String,
    /// `null` and a missing key both end up as `None`.
    #[serde(default)]
    pub geometry: Option<geojson::Geometry>,
    #[serde(default)]
    pub properties: Option<Properties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<JsonValue>,
    #[serde(flatten)]
    pub foreign_members: Properties,
}

impl WeatherFeature {
    #[cfg(test)]
    pub fn new(geometry: Option<geojson::Geometry>, properties: Properties) -> Self {
        WeatherFeature {
            kind: feature_tag(),
            geometry,
            properties: Some(properties),
            id: None,
            foreign_members: Properties::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// WeatherFeatureCollection
// ---------------------------------------------------------------------------

/// An ordered set of advisories sharing the collection-level `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherFeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub features: Vec<WeatherFeature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,
    #[serde(flatten)]
    pub foreign_members: Properties,
}

impl Default for WeatherFeatureCollection {
    fn default() -> Self {
        Self::from_features(Vec::new())
    }
}

impl WeatherFeatureCollection {
    pub fn from_features(features: Vec<WeatherFeature>) -> Self {
        WeatherFeatureCollection {
            kind: FEATURE_COLLECTION.to_string(),
            features,
            bbox: None,
            foreign_members: Properties::new(),
        }
    }

    /// Same collection-level tag, bbox and foreign members, different features.
    pub fn with_features(&self, features: Vec<WeatherFeature>) -> Self {
        WeatherFeatureCollection {
            kind: self.kind.clone(),
            features,
            bbox: self.bbox.clone(),
            foreign_members: self.foreign_members.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Parsing / shape validation
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a FeatureCollection, found {}", .0.as_deref().unwrap_or("no type"))]
    UnexpectedType(Option<String>),
}

/// Parse a GeoJSON document that must be a feature collection.
pub fn parse_collection(text: &str) -> Result<WeatherFeatureCollection, CollectionError> {
    let value: JsonValue = serde_json::from_str(text)?;
    collection_from_value(value)
}

pub fn collection_from_value(value: JsonValue) -> Result<WeatherFeatureCollection, CollectionError> {
    match value.get("type").and_then(JsonValue::as_str) {
        Some(FEATURE_COLLECTION) => Ok(serde_json::from_value(value)?),
        other => Err(CollectionError::UnexpectedType(other.map(str::to_string))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_and_missing_geometry_parse_as_none() {
        let collection = collection_from_value(json!({
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "geometry": null, "properties": { "hazard": "ICE" } },
                { "type": "Feature", "properties": { "hazard": "TURB" } },
                {
                    "type": "Feature",
                    "geometry": { "type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]] },
                    "properties": null
                }
            ]
        }))
        .unwrap();

        assert_eq!(collection.len(), 3);
        assert!(collection.features[0].geometry.is_none());
        assert!(collection.features[1].geometry.is_none());
        assert!(collection.features[2].geometry.is_some());
        assert!(collection.features[2].properties.is_none());
    }

    #[test]
    fn rejects_other_top_level_types() {
        let err = parse_collection(r#"{"type":"Feature","geometry":null,"properties":{}}"#).unwrap_err();
        assert!(matches!(err, CollectionError::UnexpectedType(Some(ref t)) if t == "Feature"));

        let err = parse_collection(r#"[1, 2, 3]"#).unwrap_err();
        assert!(matches!(err, CollectionError::UnexpectedType(None)));

        let err = parse_collection("{ not json").unwrap_err();
        assert!(matches!(err, CollectionError::Json(_)));
    }

    #[test]
    fn keeps_collection_level_members() {
        let collection = parse_collection(
            r#"{"type":"FeatureCollection","features":[],"bbox":[-130.0,20.0,-60.0,55.0],"generated":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(collection.bbox, Some(vec![-130.0, 20.0, -60.0, 55.0]));
        assert_eq!(collection.foreign_members.get("generated"), Some(&json!("2024-01-01T00:00:00Z")));
        assert!(!collection.foreign_members.contains_key("type"));
    }

    #[test]
    fn product_endpoints() {
        assert_eq!(Product::Sigmet.endpoint(), "isigmet");
        assert_eq!(Product::AirSigmet.endpoint(), "airsigmet");
        assert_eq!(Product::AirSigmet.to_string(), "AIR SIGMET");
    }
}

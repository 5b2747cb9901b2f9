/// Data layer: advisory model, fetching/loading, normalization and filtering.
///
/// Architecture:
/// ```text
///  AWC data API  /  .geojson file
///        │
///        ▼
///   ┌──────────────┐
///   │ awc / loader │  HTTP or disk → WeatherFeatureCollection
///   └──────────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ normalize │  alias lists → AdvisoryFields (floor, ceiling, validity)
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter  │  altitude overlap + time containment → filtered collection
///   └──────────┘
/// ```
///
/// `time` builds the reference instant and query window, `summary` turns one
/// advisory into display rows.

pub mod awc;
pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod summary;
pub mod time;

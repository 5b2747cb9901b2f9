use std::path::Path;

use anyhow::{bail, Context, Result};

use super::model::{parse_collection, WeatherFeatureCollection};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an advisory feature collection from a local file. Dispatch by extension.
///
/// Supported formats:
/// * `.geojson` / `.json` – a GeoJSON `FeatureCollection`, e.g. a saved response
///   of the upstream `isigmet` / `airsigmet` endpoints
pub fn load_file(path: &Path) -> Result<WeatherFeatureCollection> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "geojson" | "json" => load_geojson(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

fn load_geojson(path: &Path) -> Result<WeatherFeatureCollection> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let collection = parse_collection(&text)
        .with_context(|| format!("parsing GeoJSON from {}", path.display()))?;
    Ok(collection)
}

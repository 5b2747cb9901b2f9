use eframe::egui::{Color32, Stroke, Ui};
use egui_plot::{Line, Plot, PlotPoints, Polygon};

use crate::color::{product_style, with_opacity, ColorMode};
use crate::data::model::{Product, WeatherFeature};
use crate::data::summary::hazard_label;
use crate::state::AppState;

// Initial framing: contiguous United States.
const LON_RANGE: (f64, f64) = (-128.0, -64.0);
const LAT_RANGE: (f64, f64) = (22.0, 52.0);

// ---------------------------------------------------------------------------
// Geometry → drawable shapes
// ---------------------------------------------------------------------------

/// Drawable pieces of a geometry, in lon/lat.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Outer ring of a polygon.
    Ring(Vec<[f64; 2]>),
    /// Open line.
    Path(Vec<[f64; 2]>),
}

fn to_points(positions: &[Vec<f64>]) -> Vec<[f64; 2]> {
    positions
        .iter()
        .filter_map(|p| match (p.first(), p.get(1)) {
            (Some(&lon), Some(&lat)) => Some([lon, lat]),
            _ => None,
        })
        .collect()
}

/// Holes and points are not drawn.
pub fn shapes(geometry: &geojson::Geometry) -> Vec<Shape> {
    use geojson::Value;

    match &geometry.value {
        Value::Polygon(rings) => rings
            .first()
            .map(|outer| vec![Shape::Ring(to_points(outer))])
            .unwrap_or_default(),
        Value::MultiPolygon(polygons) => polygons
            .iter()
            .filter_map(|rings| rings.first())
            .map(|outer| Shape::Ring(to_points(outer)))
            .collect(),
        Value::LineString(line) => vec![Shape::Path(to_points(line))],
        Value::MultiLineString(lines) => lines.iter().map(|l| Shape::Path(to_points(l))).collect(),
        Value::GeometryCollection(members) => members.iter().flat_map(shapes).collect(),
        Value::Point(_) | Value::MultiPoint(_) => Vec::new(),
    }
}

/// Even-odd ray cast against a closed or open ring.
pub fn ring_contains(ring: &[[f64; 2]], lon: f64, lat: f64) -> bool {
    if ring.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let [xi, yi] = ring[i];
        let [xj, yj] = ring[j];
        if (yi > lat) != (yj > lat) && lon < (xj - xi) * (lat - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn feature_contains(feature: &WeatherFeature, lon: f64, lat: f64) -> bool {
    feature.geometry.as_ref().is_some_and(|g| {
        shapes(g).iter().any(|shape| match shape {
            Shape::Ring(ring) => ring_contains(ring, lon, lat),
            Shape::Path(_) => false,
        })
    })
}

/// Topmost visible advisory under a lon/lat position. Layers are drawn
/// SIGMET first, so AIR SIGMETs win ties.
pub fn advisory_at(state: &AppState, lon: f64, lat: f64) -> Option<(Product, usize)> {
    Product::ALL.iter().rev().find_map(|&product| {
        let layer = state.layer(product);
        if !layer.visible {
            return None;
        }
        layer
            .filtered
            .features
            .iter()
            .rposition(|f| feature_contains(f, lon, lat))
            .map(|i| (product, i))
    })
}

// ---------------------------------------------------------------------------
// Advisory map (central panel)
// ---------------------------------------------------------------------------

fn feature_colors(state: &AppState, product: Product, feature: &WeatherFeature) -> (Color32, Color32) {
    let style = product_style(product);
    match state.color_mode {
        ColorMode::Product => (style.fill, style.stroke),
        ColorMode::Hazard => {
            let color = hazard_label(feature.properties.as_ref())
                .map(|h| state.hazard_colors.color_for(&h))
                .unwrap_or(style.stroke);
            (with_opacity(color, 0.3), color)
        }
    }
}

/// Render the advisory polygons in the central panel. Clicking a polygon
/// selects it.
pub fn advisory_map(ui: &mut Ui, state: &mut AppState) {
    let response = Plot::new("advisory_map")
        .legend(egui_plot::Legend::default())
        .data_aspect(1.0)
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .include_x(LON_RANGE.0)
        .include_x(LON_RANGE.1)
        .include_y(LAT_RANGE.0)
        .include_y(LAT_RANGE.1)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for product in Product::ALL {
                let layer = state.layer(product);
                if !layer.visible {
                    continue;
                }
                for feature in &layer.filtered.features {
                    let Some(geometry) = &feature.geometry else {
                        continue;
                    };
                    let (fill, stroke) = feature_colors(state, product, feature);
                    let name = match state.color_mode {
                        ColorMode::Product => product.label().to_string(),
                        ColorMode::Hazard => hazard_label(feature.properties.as_ref())
                            .unwrap_or_else(|| product.label().to_string()),
                    };

                    for shape in shapes(geometry) {
                        match shape {
                            Shape::Ring(ring) => plot_ui.polygon(
                                Polygon::new(PlotPoints::from(ring))
                                    .fill_color(fill)
                                    .stroke(Stroke::new(1.2, stroke))
                                    .name(&name),
                            ),
                            Shape::Path(path) => plot_ui.line(
                                Line::new(PlotPoints::from(path))
                                    .color(stroke)
                                    .width(1.5)
                                    .name(&name),
                            ),
                        }
                    }
                }
            }
            plot_ui.pointer_coordinate()
        });

    if response.response.clicked() {
        state.selected = None;
        if let Some(pos) = response.inner {
            if let Some((product, index)) = advisory_at(state, pos.x, pos.y) {
                state.select(product, index);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Properties, WeatherFeatureCollection};
    use chrono::TimeZone;

    fn square(x: f64, y: f64, size: f64) -> Vec<Vec<f64>> {
        vec![
            vec![x, y],
            vec![x + size, y],
            vec![x + size, y + size],
            vec![x, y + size],
            vec![x, y],
        ]
    }

    #[test]
    fn ring_containment() {
        let ring = to_points(&square(0.0, 0.0, 2.0));
        assert!(ring_contains(&ring, 1.0, 1.0));
        assert!(!ring_contains(&ring, 3.0, 1.0));
        assert!(!ring_contains(&ring, 1.0, -0.5));
        assert!(!ring_contains(&ring[..2], 1.0, 1.0));
    }

    #[test]
    fn shapes_use_outer_rings_and_skip_points() {
        let multi = geojson::Geometry::new(geojson::Value::MultiPolygon(vec![
            vec![square(0.0, 0.0, 1.0), square(0.2, 0.2, 0.1)],
            vec![square(5.0, 5.0, 1.0)],
        ]));
        let found = shapes(&multi);
        assert_eq!(found.len(), 2);
        assert!(matches!(&found[1], Shape::Ring(r) if r[0] == [5.0, 5.0]));

        let point = geojson::Geometry::new(geojson::Value::Point(vec![1.0, 2.0]));
        assert!(shapes(&point).is_empty());

        let line = geojson::Geometry::new(geojson::Value::LineString(vec![vec![0.0, 0.0], vec![1.0, 1.0]]));
        assert_eq!(shapes(&line), vec![Shape::Path(vec![[0.0, 0.0], [1.0, 1.0]])]);
    }

    #[test]
    fn picks_topmost_visible_advisory() {
        let now = chrono::Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut state = AppState::new(now);
        let polygon = |x| {
            WeatherFeature::new(
                Some(geojson::Geometry::new(geojson::Value::Polygon(vec![square(x, 0.0, 2.0)]))),
                Properties::new(),
            )
        };
        state.set_collection(
            Product::Sigmet,
            WeatherFeatureCollection::from_features(vec![polygon(0.0), polygon(10.0)]),
        );
        state.set_collection(Product::AirSigmet, WeatherFeatureCollection::from_features(vec![polygon(1.0)]));

        assert_eq!(advisory_at(&state, 1.5, 1.0), Some((Product::AirSigmet, 0)));
        assert_eq!(advisory_at(&state, 0.5, 1.0), Some((Product::Sigmet, 0)));
        assert_eq!(advisory_at(&state, 11.0, 1.0), Some((Product::Sigmet, 1)));
        assert_eq!(advisory_at(&state, 50.0, 1.0), None);

        state.air_sigmets.visible = false;
        assert_eq!(advisory_at(&state, 1.5, 1.0), Some((Product::Sigmet, 0)));
    }
}

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::color::{ColorMap, ColorMode};
use crate::data::filter::{filter_features, FilterParams};
use crate::data::model::{Product, WeatherFeatureCollection};
use crate::data::summary::{hazard_label, AdvisorySummary};
use crate::data::time::{offset_to_instant, shift_by_hours, TimeWindow};
use crate::worker::FetchOutcome;

pub const ALTITUDE_LIMIT_FT: f64 = 48_000.0;
pub const ALTITUDE_STEP_FT: f64 = 500.0;
pub const OFFSET_MIN_HOURS: f64 = -24.0;
pub const OFFSET_MAX_HOURS: f64 = 6.0;

fn clamp_altitude(value: f64) -> f64 {
    value.clamp(0.0, ALTITUDE_LIMIT_FT)
}

// ---------------------------------------------------------------------------
// Per-product layer
// ---------------------------------------------------------------------------

/// Raw and filtered advisories of one product.
#[derive(Debug, Clone)]
pub struct ProductLayer {
    pub product: Product,
    pub raw: WeatherFeatureCollection,
    pub filtered: WeatherFeatureCollection,
    pub visible: bool,
}

impl ProductLayer {
    fn new(product: Product) -> Self {
        Self {
            product,
            raw: WeatherFeatureCollection::default(),
            filtered: WeatherFeatureCollection::default(),
            visible: true,
        }
    }

    fn refilter(&mut self, params: &FilterParams) {
        self.filtered = filter_features(&self.raw, params);
        log::debug!(
            "{}: {} of {} advisories pass",
            self.product,
            self.filtered.len(),
            self.raw.len()
        );
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub sigmets: ProductLayer,
    pub air_sigmets: ProductLayer,

    /// Selected altitude band in feet, `0 <= min <= max <= ALTITUDE_LIMIT_FT`.
    pub altitude_range: (f64, f64),

    /// Hours relative to the moment the offset was last chosen.
    pub time_offset_hours: f64,

    /// Reference instant for filtering and fetching.
    pub target_time: DateTime<Utc>,

    pub color_mode: ColorMode,

    /// Hazard colours across both products (rebuilt when data changes).
    pub hazard_colors: ColorMap,

    /// Advisory picked on the map.
    pub selected: Option<AdvisorySummary>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether a fetch is in progress.
    pub loading: bool,

    /// Generation of the latest fetch request; older outcomes are dropped.
    latest_generation: Option<u64>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(offset_to_instant(0.0))
    }
}

impl AppState {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            sigmets: ProductLayer::new(Product::Sigmet),
            air_sigmets: ProductLayer::new(Product::AirSigmet),
            altitude_range: (0.0, ALTITUDE_LIMIT_FT),
            time_offset_hours: 0.0,
            target_time: now,
            color_mode: ColorMode::default(),
            hazard_colors: ColorMap::new(&BTreeSet::new()),
            selected: None,
            status_message: None,
            loading: false,
            latest_generation: None,
        }
    }

    pub fn layer(&self, product: Product) -> &ProductLayer {
        match product {
            Product::Sigmet => &self.sigmets,
            Product::AirSigmet => &self.air_sigmets,
        }
    }

    pub fn layer_mut(&mut self, product: Product) -> &mut ProductLayer {
        match product {
            Product::Sigmet => &mut self.sigmets,
            Product::AirSigmet => &mut self.air_sigmets,
        }
    }

    pub fn filter_params(&self) -> FilterParams {
        FilterParams {
            altitude_min: self.altitude_range.0,
            altitude_max: self.altitude_range.1,
            target_time: self.target_time,
        }
    }

    pub fn time_window(&self) -> TimeWindow {
        TimeWindow::around(self.target_time)
    }

    /// Advisories currently drawn (visible layers only).
    pub fn visible_count(&self) -> usize {
        Product::ALL
            .iter()
            .map(|p| self.layer(*p))
            .filter(|layer| layer.visible)
            .map(|layer| layer.filtered.len())
            .sum()
    }

    /// Whether either product holds any advisory, filtered or not.
    pub fn has_advisories(&self) -> bool {
        Product::ALL.iter().any(|p| !self.layer(*p).raw.is_empty())
    }

    /// Re-run the filter for both products.
    pub fn refilter(&mut self) {
        let params = self.filter_params();
        self.sigmets.refilter(&params);
        self.air_sigmets.refilter(&params);
        self.selected = None;
    }

    // -- filter parameters --

    /// Move the lower bound; it never passes the upper one.
    pub fn set_altitude_min(&mut self, value: f64) {
        let max = self.altitude_range.1;
        self.set_altitude_range(value.min(max), max);
    }

    /// Move the upper bound; it never passes the lower one.
    pub fn set_altitude_max(&mut self, value: f64) {
        let min = self.altitude_range.0;
        self.set_altitude_range(min, value.max(min));
    }

    pub fn set_altitude_range(&mut self, min: f64, max: f64) {
        let (min, max) = (clamp_altitude(min), clamp_altitude(max));
        let range = if min <= max { (min, max) } else { (max, min) };
        if range != self.altitude_range {
            self.altitude_range = range;
            self.refilter();
        }
    }

    /// Choose a new time offset relative to `now`. Returns `true` when the
    /// reference instant changed and a new fetch is due.
    pub fn set_time_offset(&mut self, offset_hours: f64, now: DateTime<Utc>) -> bool {
        let offset_hours = offset_hours.clamp(OFFSET_MIN_HOURS, OFFSET_MAX_HOURS);
        if offset_hours == self.time_offset_hours {
            return false;
        }
        self.time_offset_hours = offset_hours;
        self.target_time = shift_by_hours(now, offset_hours);
        self.refilter();
        true
    }

    /// Back to the full altitude band, offset 0 and both layers shown.
    /// Returns `true` when a new fetch is due.
    pub fn reset_filters(&mut self, now: DateTime<Utc>) -> bool {
        self.sigmets.visible = true;
        self.air_sigmets.visible = true;
        self.set_altitude_range(0.0, ALTITUDE_LIMIT_FT);
        self.set_time_offset(0.0, now)
    }

    // -- collections --

    /// Replace one product's advisories wholesale.
    pub fn set_collection(&mut self, product: Product, collection: WeatherFeatureCollection) {
        let params = self.filter_params();
        let layer = self.layer_mut(product);
        layer.raw = collection;
        layer.refilter(&params);
        self.selected = None;
        self.rebuild_hazard_colors();
    }

    pub fn rebuild_hazard_colors(&mut self) {
        let hazards: BTreeSet<String> = Product::ALL
            .iter()
            .flat_map(|p| self.layer(*p).raw.features.iter())
            .filter_map(|f| hazard_label(f.properties.as_ref()))
            .collect();
        self.hazard_colors = ColorMap::new(&hazards);
    }

    pub fn select(&mut self, product: Product, index: usize) {
        self.selected = self
            .layer(product)
            .filtered
            .features
            .get(index)
            .map(|f| AdvisorySummary::from_feature(product, f));
    }

    // -- fetch lifecycle --

    /// Record that fetch `generation` has been requested.
    pub fn begin_fetch(&mut self, generation: u64) {
        self.latest_generation = Some(generation);
        self.loading = true;
        self.status_message = None;
    }

    /// A fetch could not be issued at all; nothing is pending.
    pub fn fetch_unavailable(&mut self, reason: &str) {
        self.loading = false;
        self.status_message = Some(format!("Error: {reason}"));
    }

    /// Apply a worker outcome. Outcomes from superseded requests are ignored;
    /// returns whether the outcome was applied.
    pub fn apply_fetch_outcome(&mut self, outcome: FetchOutcome) -> bool {
        if Some(outcome.generation()) != self.latest_generation {
            log::debug!("dropping stale fetch outcome (generation {})", outcome.generation());
            return false;
        }
        self.loading = false;

        match outcome {
            FetchOutcome::Loaded { sigmets, air_sigmets, .. } => {
                self.set_collection(Product::Sigmet, sigmets);
                self.set_collection(Product::AirSigmet, air_sigmets);
            }
            FetchOutcome::Failed { error, .. } => {
                self.status_message = Some(error);
                self.set_collection(Product::Sigmet, WeatherFeatureCollection::default());
                self.set_collection(Product::AirSigmet, WeatherFeatureCollection::default());
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Properties, WeatherFeature};
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn advisory(hazard: &str, floor: f64, ceiling: f64) -> WeatherFeature {
        let geometry = geojson::Geometry::new(geojson::Value::Polygon(vec![vec![
            vec![-100.0, 40.0],
            vec![-99.0, 40.0],
            vec![-99.0, 41.0],
            vec![-100.0, 40.0],
        ]]));
        let mut props = Properties::new();
        props.insert("hazard".to_string(), json!(hazard));
        props.insert("min_ft".to_string(), json!(floor));
        props.insert("max_ft".to_string(), json!(ceiling));
        WeatherFeature::new(Some(geometry), props)
    }

    fn loaded(generation: u64) -> FetchOutcome {
        FetchOutcome::Loaded {
            generation,
            sigmets: WeatherFeatureCollection::from_features(vec![
                advisory("TURB", 10000.0, 20000.0),
                advisory("ICE", 30000.0, 40000.0),
            ]),
            air_sigmets: WeatherFeatureCollection::from_features(vec![advisory("IFR", 0.0, 8000.0)]),
        }
    }

    #[test]
    fn has_advisories_tracks_raw_collections() {
        let mut state = AppState::new(now());
        assert!(!state.has_advisories());

        state.begin_fetch(1);
        state.apply_fetch_outcome(loaded(1));
        state.set_altitude_range(45000.0, 48000.0);
        assert_eq!(state.visible_count(), 0);
        assert!(state.has_advisories());

        state.begin_fetch(2);
        state.apply_fetch_outcome(FetchOutcome::Failed { generation: 2, error: "boom".to_string() });
        assert!(!state.has_advisories());
    }

    #[test]
    fn unavailable_fetch_does_not_stay_loading() {
        let mut state = AppState::new(now());
        state.fetch_unavailable("advisory fetcher is not running");
        assert!(!state.loading);
        assert_eq!(
            state.status_message.as_deref(),
            Some("Error: advisory fetcher is not running")
        );
    }

    #[test]
    fn altitude_bounds_are_clamped_and_ordered() {
        let mut state = AppState::new(now());
        state.set_altitude_min(60000.0);
        assert_eq!(state.altitude_range, (ALTITUDE_LIMIT_FT, ALTITUDE_LIMIT_FT));

        state.set_altitude_range(0.0, 48000.0);
        state.set_altitude_max(-10.0);
        assert_eq!(state.altitude_range, (0.0, 0.0));

        state.set_altitude_range(30000.0, 5000.0);
        assert_eq!(state.altitude_range, (5000.0, 30000.0));

        state.set_altitude_max(2000.0);
        assert_eq!(state.altitude_range, (5000.0, 5000.0));
    }

    #[test]
    fn parameter_changes_refilter_both_products() {
        let mut state = AppState::new(now());
        state.begin_fetch(1);
        assert!(state.apply_fetch_outcome(loaded(1)));
        assert_eq!(state.visible_count(), 3);

        state.set_altitude_range(5000.0, 25000.0);
        assert_eq!(state.sigmets.filtered.len(), 1);
        assert_eq!(state.air_sigmets.filtered.len(), 1);

        state.air_sigmets.visible = false;
        assert_eq!(state.visible_count(), 1);
    }

    #[test]
    fn stale_outcomes_are_dropped() {
        let mut state = AppState::new(now());
        state.begin_fetch(1);
        state.begin_fetch(2);

        assert!(!state.apply_fetch_outcome(loaded(1)));
        assert!(state.loading);
        assert!(state.sigmets.raw.is_empty());

        assert!(state.apply_fetch_outcome(loaded(2)));
        assert!(!state.loading);
        assert_eq!(state.sigmets.raw.len(), 2);

        // a late duplicate of an older generation changes nothing
        let failed = FetchOutcome::Failed { generation: 1, error: "boom".to_string() };
        assert!(!state.apply_fetch_outcome(failed));
        assert_eq!(state.status_message, None);
    }

    #[test]
    fn failure_clears_collections_and_reports() {
        let mut state = AppState::new(now());
        state.begin_fetch(1);
        state.apply_fetch_outcome(loaded(1));

        state.begin_fetch(2);
        let failed = FetchOutcome::Failed { generation: 2, error: "Request failed (500)".to_string() };
        assert!(state.apply_fetch_outcome(failed));
        assert_eq!(state.status_message.as_deref(), Some("Request failed (500)"));
        assert!(state.sigmets.raw.is_empty());
        assert!(state.air_sigmets.filtered.is_empty());

        state.begin_fetch(3);
        assert_eq!(state.status_message, None);
    }

    #[test]
    fn time_offset_moves_target_and_requests_fetch() {
        let mut state = AppState::new(now());
        assert!(!state.set_time_offset(0.0, now()));

        assert!(state.set_time_offset(-6.0, now()));
        assert_eq!(state.target_time, Utc.with_ymd_and_hms(2024, 1, 1, 6, 0, 0).unwrap());
        assert_eq!(state.time_window().end, now());

        assert!(state.set_time_offset(40.0, now()));
        assert_eq!(state.time_offset_hours, OFFSET_MAX_HOURS);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut state = AppState::new(now());
        state.set_altitude_range(1000.0, 2000.0);
        state.set_time_offset(-3.0, now());
        state.sigmets.visible = false;

        assert!(state.reset_filters(now()));
        assert_eq!(state.altitude_range, (0.0, ALTITUDE_LIMIT_FT));
        assert_eq!(state.time_offset_hours, 0.0);
        assert_eq!(state.target_time, now());
        assert!(state.sigmets.visible && state.air_sigmets.visible);

        assert!(!state.reset_filters(now()));
    }

    #[test]
    fn hazard_colors_and_selection_follow_data() {
        let mut state = AppState::new(now());
        state.begin_fetch(1);
        state.apply_fetch_outcome(loaded(1));

        let legend: Vec<String> = state.hazard_colors.legend_entries().into_iter().map(|(h, _)| h).collect();
        assert_eq!(legend, vec!["ICE", "IFR", "TURB"]);

        state.select(Product::Sigmet, 1);
        assert_eq!(state.selected.as_ref().map(|s| s.hazard.as_str()), Some("ICE"));
        state.set_altitude_range(0.0, 1000.0);
        assert!(state.selected.is_none());
    }
}

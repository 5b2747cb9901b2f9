use chrono::Utc;
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::color::{product_style, ColorMode};
use crate::data::model::Product;
use crate::data::time::{format_offset_label, format_range_for_display};
use crate::state::{AppState, ALTITUDE_LIMIT_FT, ALTITUDE_STEP_FT, OFFSET_MAX_HOURS, OFFSET_MIN_HOURS};

/// `48000` → `48,000 ft`.
pub fn format_feet(feet: f64) -> String {
    let digits = (feet.round() as i64).abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if feet.round() < 0.0 { "-" } else { "" };
    format!("{sign}{grouped} ft")
}

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel. Returns `true` when the reference time
/// changed and the advisories have to be fetched again.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) -> bool {
    let mut refetch = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Layers ----
            ui.heading("Layers");
            for product in Product::ALL {
                let count = state.layer(product).filtered.len();
                let color = product_style(product).stroke;
                let layer = state.layer_mut(product);
                ui.checkbox(
                    &mut layer.visible,
                    RichText::new(format!("{product}  ({count})")).color(color),
                );
            }

            ui.horizontal(|ui: &mut Ui| {
                ui.label("Color by");
                egui::ComboBox::from_id_salt("color_by")
                    .selected_text(state.color_mode.label())
                    .show_ui(ui, |ui: &mut Ui| {
                        for mode in [ColorMode::Product, ColorMode::Hazard] {
                            ui.selectable_value(&mut state.color_mode, mode, mode.label());
                        }
                    });
            });
            ui.separator();

            // ---- Altitude ----
            ui.strong("Altitude Range");
            ui.label(format!("0 - {}", format_feet(ALTITUDE_LIMIT_FT)));

            let (mut min, mut max) = state.altitude_range;
            let min_changed = ui
                .add(
                    egui::Slider::new(&mut min, 0.0..=ALTITUDE_LIMIT_FT)
                        .step_by(ALTITUDE_STEP_FT)
                        .text("min"),
                )
                .changed();
            let max_changed = ui
                .add(
                    egui::Slider::new(&mut max, 0.0..=ALTITUDE_LIMIT_FT)
                        .step_by(ALTITUDE_STEP_FT)
                        .text("max"),
                )
                .changed();
            if min_changed {
                state.set_altitude_min(min);
            }
            if max_changed {
                state.set_altitude_max(max);
            }
            ui.label(format!(
                "{} – {}",
                format_feet(state.altitude_range.0),
                format_feet(state.altitude_range.1)
            ));
            ui.separator();

            // ---- Time ----
            ui.strong("Time Filter");
            ui.label("Slide -24h to +6h from now");
            let mut offset = state.time_offset_hours;
            let offset_changed = ui
                .add(
                    egui::Slider::new(&mut offset, OFFSET_MIN_HOURS..=OFFSET_MAX_HOURS)
                        .step_by(1.0)
                        .custom_formatter(|v, _| format_offset_label(v)),
                )
                .changed();
            if offset_changed && state.set_time_offset(offset, Utc::now()) {
                refetch = true;
            }
            ui.label(format!(
                "Current time: {}",
                state.target_time.format("%Y-%m-%d %H:%M UTC")
            ));
            ui.separator();

            if ui.button("Reset filters").clicked() && state.reset_filters(Utc::now()) {
                refetch = true;
            }
            ui.separator();

            // ---- Legend & status ----
            ui.strong("Legend & status");
            if state.color_mode == ColorMode::Hazard {
                for (hazard, color) in state.hazard_colors.legend_entries() {
                    ui.label(RichText::new(hazard).color(color));
                }
            }
            if !state.has_advisories() && !state.loading {
                ui.label(RichText::new("No advisories loaded").weak());
            }
            ui.label(format!("Total visible: {}", state.visible_count()));
            ui.label(format!(
                "Time window: {}",
                format_range_for_display(&state.time_window())
            ));
            ui.label(RichText::new("Click a polygon for details").weak());

            // ---- Selected advisory ----
            if let Some(summary) = &state.selected {
                ui.separator();
                ui.label(
                    RichText::new(format!("{} · {}", summary.product, summary.hazard))
                        .strong()
                        .color(product_style(summary.product).stroke),
                );
                egui::Grid::new("selected_advisory")
                    .num_columns(2)
                    .show(ui, |ui: &mut Ui| {
                        for (label, value) in summary.rows() {
                            ui.label(RichText::new(label).strong());
                            ui.label(value);
                            ui.end_row();
                        }
                    });
                if let Some(raw) = &summary.raw_text {
                    ui.label(RichText::new(raw).monospace().small());
                }
            }
        });

    refetch
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar. Returns `true` when a refresh was requested.
pub fn top_bar(ui: &mut Ui, state: &mut AppState, online: bool) -> bool {
    let mut refresh = false;

    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            for product in Product::ALL {
                if ui.button(format!("Open {product} GeoJSON…")).clicked() {
                    open_file_dialog(state, product);
                    ui.close_menu();
                }
            }
        });

        ui.separator();

        let label = if state.loading { "Refreshing…" } else { "Refresh now" };
        if ui
            .add_enabled(online && !state.loading, egui::Button::new(label))
            .clicked()
        {
            refresh = true;
        }
        if state.loading {
            ui.spinner();
        }

        ui.separator();

        ui.label(format!(
            "{} – {}  ·  {}",
            format_feet(state.altitude_range.0),
            format_feet(state.altitude_range.1),
            format_offset_label(state.time_offset_hours)
        ));

        if !online {
            ui.separator();
            ui.label(RichText::new("offline").weak());
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });

    refresh
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState, product: Product) {
    let file = rfd::FileDialog::new()
        .set_title(format!("Open {product} advisories"))
        .add_filter("GeoJSON", &["geojson", "json"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(collection) => {
                log::info!("Loaded {} {product} advisories from {}", collection.len(), path.display());
                state.set_collection(product, collection);
                state.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feet_are_grouped_by_thousands() {
        assert_eq!(format_feet(0.0), "0 ft");
        assert_eq!(format_feet(500.0), "500 ft");
        assert_eq!(format_feet(12500.0), "12,500 ft");
        assert_eq!(format_feet(48000.0), "48,000 ft");
        assert_eq!(format_feet(1_234_567.0), "1,234,567 ft");
        assert_eq!(format_feet(-1500.0), "-1,500 ft");
    }
}

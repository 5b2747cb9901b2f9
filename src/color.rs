use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::Product;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.5);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

/// Translucent variant of `color` for polygon fills.
pub fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

// ---------------------------------------------------------------------------
// Per-product styling
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// One colour per upstream product.
    #[default]
    Product,
    /// One colour per hazard type, across products.
    Hazard,
}

impl ColorMode {
    pub fn label(self) -> &'static str {
        match self {
            ColorMode::Product => "Product",
            ColorMode::Hazard => "Hazard",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProductStyle {
    pub fill: Color32,
    pub stroke: Color32,
}

pub fn product_style(product: Product) -> ProductStyle {
    match product {
        Product::Sigmet => ProductStyle {
            fill: with_opacity(Color32::from_rgb(0xef, 0x44, 0x44), 0.28),
            stroke: Color32::from_rgb(0xb9, 0x1c, 0x1c),
        },
        Product::AirSigmet => ProductStyle {
            fill: with_opacity(Color32::from_rgb(0x38, 0xbd, 0xf8), 0.22),
            stroke: Color32::from_rgb(0x02, 0x84, 0xc7),
        },
    }
}

// ---------------------------------------------------------------------------
// Color mapping: hazard name → Color32
// ---------------------------------------------------------------------------

/// Maps hazard names to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    pub fn new(hazards: &BTreeSet<String>) -> Self {
        let palette = generate_palette(hazards.len());
        let mapping = hazards.iter().cloned().zip(palette).collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    pub fn color_for(&self, hazard: &str) -> Color32 {
        self.mapping
            .get(hazard)
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Return the legend entries (hazard → colour) for the UI.
    pub fn legend_entries(&self) -> Vec<(String, Color32)> {
        self.mapping
            .iter()
            .map(|(h, c)| (h.clone(), *c))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_is_distinct() {
        assert!(generate_palette(0).is_empty());
        let colors = generate_palette(6);
        assert_eq!(colors.len(), 6);
        let unique: BTreeSet<[u8; 4]> = colors.iter().map(|c| c.to_array()).collect();
        assert_eq!(unique.len(), 6);
    }

    #[test]
    fn hazard_lookup_with_default() {
        let hazards: BTreeSet<String> = ["ICE", "TURB"].iter().map(|s| s.to_string()).collect();
        let map = ColorMap::new(&hazards);
        assert_ne!(map.color_for("ICE"), map.color_for("TURB"));
        assert_eq!(map.color_for("ASH"), Color32::GRAY);
        assert_eq!(map.legend_entries().len(), 2);
        assert_eq!(map.legend_entries()[0].0, "ICE");
    }

    #[test]
    fn opacity_only_touches_alpha() {
        let c = with_opacity(Color32::from_rgb(10, 20, 30), 0.5);
        assert_eq!(c.a(), 128);
        assert_eq!(product_style(Product::Sigmet).fill.a(), 71);
    }
}

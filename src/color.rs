use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Categorical palette
// ---------------------------------------------------------------------------

/// The dashboard's twelve series colours, one per key when all twelve keys
/// are shown.
pub const CATEGORICAL: [Color32; 12] = [
    Color32::from_rgb(0x00, 0xE6, 0x76),
    Color32::from_rgb(0x64, 0x95, 0xED),
    Color32::from_rgb(0xE6, 0x86, 0x00),
    Color32::from_rgb(0xE6, 0x03, 0x00),
    Color32::from_rgb(0x76, 0x00, 0xE6),
    Color32::from_rgb(0xE6, 0x00, 0x70),
    Color32::from_rgb(0xE6, 0x00, 0xE3),
    Color32::from_rgb(0x00, 0xE3, 0xE6),
    Color32::from_rgb(0xFF, 0xD0, 0x00),
    Color32::from_rgb(0x00, 0x2F, 0xFF),
    Color32::from_rgb(0xAF, 0xFF, 0x00),
    Color32::from_rgb(0x00, 0xFF, 0xD0),
];

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

/// `n` series colours: the fixed palette first, generated hues after it.
pub fn series_palette(n: usize) -> Vec<Color32> {
    let mut colors: Vec<Color32> = CATEGORICAL.iter().copied().take(n).collect();
    if n > CATEGORICAL.len() {
        colors.extend(generate_palette(n - CATEGORICAL.len()));
    }
    colors
}

// ---------------------------------------------------------------------------
// Color mapping: series label → Color32
// ---------------------------------------------------------------------------

/// Maps series labels to distinct colours, in the order the labels are given.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut order: Vec<String> = Vec::new();
        for label in labels {
            let label = label.into();
            if !order.contains(&label) {
                order.push(label);
            }
        }
        let mapping = order
            .iter()
            .cloned()
            .zip(series_palette(order.len()))
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a series label.
    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_palette_starts_with_fixed_colours() {
        let colors = series_palette(14);
        assert_eq!(colors.len(), 14);
        assert_eq!(&colors[..12], &CATEGORICAL[..]);
        assert_eq!(series_palette(3), CATEGORICAL[..3].to_vec());
        assert!(series_palette(0).is_empty());
    }

    #[test]
    fn color_map_keeps_given_order() {
        let map = ColorMap::new(["Minor", "Major", "Minor"]);
        assert_eq!(map.color_for("Minor"), CATEGORICAL[0]);
        assert_eq!(map.color_for("Major"), CATEGORICAL[1]);
        assert_eq!(map.color_for("Dorian"), Color32::GRAY);
    }
}

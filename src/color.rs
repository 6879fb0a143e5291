use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Color palette generators
// ---------------------------------------------------------------------------

fn hsl_palette(n: usize, saturation: f32, lightness: f32) -> Vec<Color32> {
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let rgb: Srgb = Hsl::new(hue, saturation, lightness).into_color();
            let rgb = rgb.into_format::<u8>();
            Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
        })
        .collect()
}

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    hsl_palette(n, 0.75, 0.55)
}

/// Soft variant of [`generate_palette`] for filled boxes.
pub fn pastel_palette(n: usize) -> Vec<Color32> {
    hsl_palette(n, 0.6, 0.8)
}

/// White → red ramp used by the heatmap; `t` is clamped to `[0, 1]`.
pub fn heat_color(t: f64) -> Color32 {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) as f32 } else { 0.0 };
    let white: LinSrgb = Srgb::new(1.0f32, 1.0, 1.0).into_linear();
    let red: LinSrgb = Srgb::new(1.0f32, 0.0, 0.0).into_linear();
    let rgb = Srgb::<f32>::from_linear(white.mix(red, t)).into_format::<u8>();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

/// Position of `value` inside `[min, max]`; a flat range maps to full intensity.
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    if span.abs() < f64::EPSILON {
        1.0
    } else {
        (value - min) / span
    }
}

// ---------------------------------------------------------------------------
// Category colours: label → Color32
// ---------------------------------------------------------------------------

/// Stable colours for a set of category labels (e.g. every street in the
/// dataset), so a street keeps its colour while filters change.
#[derive(Debug, Clone, Default)]
pub struct CategoryColors {
    mapping: BTreeMap<String, Color32>,
}

impl CategoryColors {
    pub fn new<'a>(labels: impl IntoIterator<Item = &'a String>) -> Self {
        let labels: Vec<&String> = labels.into_iter().collect();
        let mapping = labels
            .iter()
            .zip(generate_palette(labels.len()))
            .map(|(label, color)| ((*label).clone(), color))
            .collect();
        CategoryColors { mapping }
    }

    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping.get(label).copied().unwrap_or(Color32::GRAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heat_ramp_runs_white_to_red() {
        assert_eq!(heat_color(0.0), Color32::WHITE);
        assert_eq!(heat_color(1.0), Color32::from_rgb(255, 0, 0));
        assert_eq!(heat_color(7.0), heat_color(1.0));
        let mid = heat_color(0.5);
        assert_eq!(mid.r(), 255);
        assert!(mid.g() > 0 && mid.g() < 255);
    }

    #[test]
    fn normalize_handles_flat_range() {
        assert_eq!(normalize(5.0, 0.0, 10.0), 0.5);
        assert_eq!(normalize(3.0, 3.0, 3.0), 1.0);
    }

    #[test]
    fn categories_get_distinct_colours() {
        let streets = vec!["Rua A".to_string(), "Rua B".to_string()];
        let colors = CategoryColors::new(&streets);
        assert_ne!(colors.color_for("Rua A"), colors.color_for("Rua B"));
        assert_eq!(colors.color_for("unknown"), Color32::GRAY);
    }
}

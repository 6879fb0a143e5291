use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, StrokeKind, Ui};

use crate::color::{heat_color, normalize};
use crate::data::aggregate::Heatmap;

const LABEL_WIDTH: f32 = 170.0;
const LEGEND_WIDTH: f32 = 90.0;
const AXIS_HEIGHT: f32 = 36.0;
const CELL_HEIGHT: f32 = 28.0;
const LEGEND_STEPS: usize = 32;

/// Heatmap tab: mean vehicles per minute by hour (x) and street (y).
pub fn show(ui: &mut Ui, heatmap: &Heatmap) {
    ui.heading("Traffic pattern analysis");
    ui.strong("Congestion heatmap (hour vs. street)");
    ui.add_space(4.0);

    let Some((min, max)) = heatmap.value_range() else {
        ui.label("No measurements for the current selection.");
        return;
    };

    ui.label(egui::RichText::new("Congestion by hour and location").strong());
    heat_grid(ui, heatmap, min, max);

    ui.add_space(6.0);
    ui.label("Hover over the chart for details.");
    ui.label("• Colour scale: white (light traffic) → red (heavy traffic).");
}

/// Row/column of the cell under `pos`, if any.
fn cell_at(grid: Rect, n_rows: usize, n_cols: usize, pos: Pos2) -> Option<(usize, usize)> {
    if !grid.contains(pos) || n_rows == 0 || n_cols == 0 {
        return None;
    }
    let col = ((pos.x - grid.min.x) / grid.width() * n_cols as f32) as usize;
    let row = ((pos.y - grid.min.y) / grid.height() * n_rows as f32) as usize;
    Some((row.min(n_rows - 1), col.min(n_cols - 1)))
}

fn heat_grid(ui: &mut Ui, heatmap: &Heatmap, min: f64, max: f64) {
    let n_rows = heatmap.streets.len();
    let n_cols = heatmap.hours.len();

    let width = ui.available_width().max(LABEL_WIDTH + LEGEND_WIDTH + 120.0);
    let height = n_rows as f32 * CELL_HEIGHT + AXIS_HEIGHT;
    let (response, painter) = ui.allocate_painter(egui::vec2(width, height), Sense::hover());

    let outer = response.rect;
    let grid = Rect::from_min_max(
        Pos2::new(outer.min.x + LABEL_WIDTH, outer.min.y),
        Pos2::new(outer.max.x - LEGEND_WIDTH, outer.max.y - AXIS_HEIGHT),
    );
    let cell_w = grid.width() / n_cols.max(1) as f32;
    let text_color = ui.visuals().text_color();
    let font = FontId::proportional(12.0);
    let border = Stroke::new(0.5, Color32::BLACK);

    for (r, street) in heatmap.streets.iter().enumerate() {
        let y = grid.min.y + r as f32 * CELL_HEIGHT;
        painter.text(
            Pos2::new(grid.min.x - 6.0, y + CELL_HEIGHT / 2.0),
            Align2::RIGHT_CENTER,
            street,
            font.clone(),
            text_color,
        );

        for c in 0..n_cols {
            let cell = Rect::from_min_size(
                Pos2::new(grid.min.x + c as f32 * cell_w, y),
                egui::vec2(cell_w, CELL_HEIGHT),
            );
            if let Some(v) = heatmap.cell(r, c) {
                painter.rect_filled(cell, 0.0, heat_color(normalize(v, min, max)));
                painter.rect_stroke(cell, 0.0, border, StrokeKind::Inside);
            }
        }
    }

    for (c, hour) in heatmap.hours.iter().enumerate() {
        painter.text(
            Pos2::new(grid.min.x + (c as f32 + 0.5) * cell_w, grid.max.y + 4.0),
            Align2::CENTER_TOP,
            hour,
            font.clone(),
            text_color,
        );
    }
    painter.text(
        Pos2::new(grid.center().x, outer.max.y),
        Align2::CENTER_BOTTOM,
        "Hour of day",
        font.clone(),
        text_color,
    );

    // Vertical colour legend, max at the top.
    let legend = Rect::from_min_size(
        Pos2::new(grid.max.x + 16.0, grid.min.y),
        egui::vec2(14.0, grid.height().min(200.0)),
    );
    let step_h = legend.height() / LEGEND_STEPS as f32;
    for i in 0..LEGEND_STEPS {
        let t = 1.0 - i as f64 / (LEGEND_STEPS - 1) as f64;
        let slice = Rect::from_min_size(
            Pos2::new(legend.min.x, legend.min.y + i as f32 * step_h),
            egui::vec2(legend.width(), step_h + 0.5),
        );
        painter.rect_filled(slice, 0.0, heat_color(t));
    }
    painter.rect_stroke(legend, 0.0, border, StrokeKind::Outside);
    painter.text(
        Pos2::new(legend.max.x + 4.0, legend.min.y),
        Align2::LEFT_TOP,
        format!("{max:.1}"),
        font.clone(),
        text_color,
    );
    painter.text(
        Pos2::new(legend.max.x + 4.0, legend.max.y),
        Align2::LEFT_BOTTOM,
        format!("{min:.1}"),
        font,
        text_color,
    );

    let hovered = response
        .hover_pos()
        .and_then(|pos| cell_at(grid, n_rows, n_cols, pos))
        .and_then(|(r, c)| heatmap.cell(r, c).map(|v| (r, c, v)));
    if let Some((r, c, v)) = hovered {
        response.on_hover_text_at_pointer(format!(
            "Hour: {}\nLocation: {}\nMean vehicles: {v:.2}",
            heatmap.hours[c], heatmap.streets[r]
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_maps_to_cell() {
        let grid = Rect::from_min_size(Pos2::new(100.0, 0.0), egui::vec2(300.0, 60.0));
        assert_eq!(cell_at(grid, 2, 3, Pos2::new(105.0, 5.0)), Some((0, 0)));
        assert_eq!(cell_at(grid, 2, 3, Pos2::new(399.0, 59.0)), Some((1, 2)));
        assert_eq!(cell_at(grid, 2, 3, Pos2::new(50.0, 5.0)), None);
        assert_eq!(cell_at(grid, 0, 3, Pos2::new(105.0, 5.0)), None);
    }
}

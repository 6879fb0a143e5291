use eframe::egui::{Color32, Stroke, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{uniform_grid_spacer, BoxElem, BoxPlot, BoxSpread, MarkerShape, Plot, Points};

use crate::color::pastel_palette;
use crate::data::aggregate::{DashboardSummary, PivotTable, RainfallBox};
use crate::ui::category_label;

/// Climate and vehicle tab: boxplot per rainfall bucket plus the pivot table.
pub fn show(ui: &mut Ui, summary: &DashboardSummary) {
    ui.heading("Breakdown by weather and vehicle type");

    ui.add_space(4.0);
    ui.strong("Traffic distribution by weather condition");
    rainfall_boxplot(ui, &summary.rainfall_boxes);
    ui.label(
        "This boxplot shows the traffic variation (median, quartiles and outliers) \
         for each weather condition.",
    );

    ui.add_space(12.0);
    ui.strong("Mean vehicles by type and weather");
    pivot_table(ui, &summary.pivot);
}

fn rainfall_boxplot(ui: &mut Ui, boxes: &[RainfallBox]) {
    let labels: Vec<String> = boxes.iter().map(|b| b.rainfall.clone()).collect();
    let colors = pastel_palette(boxes.len());

    let mut elems = Vec::new();
    let mut outliers: Vec<[f64; 2]> = Vec::new();
    for (i, (b, fill)) in boxes.iter().zip(colors).enumerate() {
        let Some(stats) = &b.stats else {
            continue;
        };
        let x = i as f64;
        elems.push(
            BoxElem::new(
                x,
                BoxSpread::new(
                    stats.lower_whisker,
                    stats.q1,
                    stats.median,
                    stats.q3,
                    stats.upper_whisker,
                ),
            )
            .name(&b.rainfall)
            .fill(fill)
            .stroke(Stroke::new(1.5, Color32::DARK_GRAY))
            .box_width(0.6)
            .whisker_width(0.3),
        );
        outliers.extend(stats.outliers.iter().map(|&v| [x, v]));
    }

    let plot = BoxPlot::new(elems).element_formatter(Box::new(|elem: &BoxElem, _plot: &BoxPlot| {
        format!(
            "{}\nMax: {:.2}\nQ3: {:.2}\nMedian: {:.2}\nQ1: {:.2}\nMin: {:.2}",
            elem.name,
            elem.spread.upper_whisker,
            elem.spread.quartile3,
            elem.spread.median,
            elem.spread.quartile1,
            elem.spread.lower_whisker,
        )
    }));

    Plot::new("rainfall_boxplot")
        .height(340.0)
        .x_axis_label("Weather condition")
        .y_axis_label("Vehicles per minute")
        .x_grid_spacer(uniform_grid_spacer(|_| [1.0, 1.0, 1.0]))
        .x_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.box_plot(plot);
            if !outliers.is_empty() {
                plot_ui.points(
                    Points::new(outliers)
                        .shape(MarkerShape::Diamond)
                        .radius(3.0)
                        .color(Color32::DARK_GRAY)
                        .name("Outliers"),
                );
            }
        });
}

fn pivot_table(ui: &mut Ui, pivot: &PivotTable) {
    ui.push_id("vehicle_rainfall_pivot", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .column(Column::auto().at_least(140.0))
            .columns(Column::auto().at_least(110.0), pivot.columns.len())
            .header(20.0, |mut header| {
                header.col(|ui| {
                    ui.strong("Vehicle type");
                });
                for rain in &pivot.columns {
                    header.col(|ui| {
                        ui.strong(rain.as_str());
                    });
                }
            })
            .body(|mut body| {
                for (r, vehicle) in pivot.rows.iter().enumerate() {
                    body.row(18.0, |mut row| {
                        row.col(|ui| {
                            ui.label(vehicle.as_str());
                        });
                        for c in 0..pivot.columns.len() {
                            row.col(|ui| {
                                ui.label(format!("{:.2}", pivot.cell_or_zero(r, c)));
                            });
                        }
                    });
                }
            });
    });
}

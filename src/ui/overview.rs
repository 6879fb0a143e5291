use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{uniform_grid_spacer, Bar, BarChart, Plot};

use crate::color::CategoryColors;
use crate::data::aggregate::{DashboardSummary, GroupMean};
use crate::ui::category_label;

/// Overview tab: busiest streets, critical hours and the hour ranking.
pub fn show(ui: &mut Ui, summary: &DashboardSummary, colors: &CategoryColors) {
    ui.heading("Congestion overview");

    ui.add_space(4.0);
    ui.strong("Streets with the highest congestion");
    street_bar_chart(ui, &summary.by_street, colors);
    ui.label("The chart above shows the mean vehicles per minute on the selected streets.");

    ui.add_space(12.0);
    ui.strong("Critical hours");
    metric_cards(ui, summary.top_hours());

    ui.add_space(8.0);
    ui.label("Hour ranking by congestion:");
    hour_ranking_table(ui, &summary.by_hour);
}

fn street_bar_chart(ui: &mut Ui, by_street: &[GroupMean], colors: &CategoryColors) {
    let labels: Vec<String> = by_street.iter().map(|g| g.key.clone()).collect();

    let bars: Vec<Bar> = by_street
        .iter()
        .enumerate()
        .map(|(i, g)| {
            Bar::new(i as f64, g.mean)
                .name(&g.key)
                .fill(colors.color_for(&g.key))
                .width(0.8)
        })
        .collect();

    let chart = BarChart::new(bars).element_formatter(Box::new(|bar: &Bar, _chart: &BarChart| {
        format!("Location: {}\nMean vehicles: {:.2}", bar.name, bar.value)
    }));

    Plot::new("street_bar_chart")
        .height(320.0)
        .x_axis_label("Street / avenue")
        .y_axis_label("Mean vehicles per minute")
        .x_grid_spacer(uniform_grid_spacer(|_| [1.0, 1.0, 1.0]))
        .x_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(false)
        .allow_zoom(true)
        .show(ui, |plot_ui| plot_ui.bar_chart(chart));
}

fn ordinal(rank: usize) -> String {
    match rank {
        1 => "1st".to_string(),
        2 => "2nd".to_string(),
        3 => "3rd".to_string(),
        n => format!("{n}th"),
    }
}

/// One card per top hour; fewer hours leave the remaining columns empty.
fn metric_cards(ui: &mut Ui, top: &[GroupMean]) {
    ui.columns(3, |cols: &mut [Ui]| {
        for (rank, (col, hour)) in cols.iter_mut().zip(top).enumerate() {
            egui::Frame::group(col.style()).show(col, |ui: &mut Ui| {
                ui.set_min_width(ui.available_width());
                ui.label(RichText::new(format!("{} - {}", ordinal(rank + 1), hour.key)).weak());
                ui.label(
                    RichText::new(format!("{:.2} veh/min", hour.mean))
                        .size(26.0)
                        .strong(),
                );
            });
        }
    });
}

fn hour_ranking_table(ui: &mut Ui, by_hour: &[GroupMean]) {
    ui.push_id("hour_ranking", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .column(Column::auto().at_least(120.0))
            .column(Column::remainder())
            .header(20.0, |mut header| {
                header.col(|ui| {
                    ui.strong("Hour");
                });
                header.col(|ui| {
                    ui.strong("Mean vehicles per minute");
                });
            })
            .body(|mut body| {
                for g in by_hour {
                    body.row(18.0, |mut row| {
                        row.col(|ui| {
                            ui.label(g.key.as_str());
                        });
                        row.col(|ui| {
                            ui.label(format!("{:.2}", g.mean));
                        });
                    });
                }
            });
    });
}

#[cfg(test)]
mod tests {
    use super::ordinal;

    #[test]
    fn ordinals() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(4), "4th");
    }
}

use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::data::model::Dimension;
use crate::state::{AppState, Tab, View};
use crate::ui::{breakdown, heatmap, overview};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Interactive filters");
    ui.separator();

    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };

    // Edit a copy; the state only recomputes when something changed.
    let mut filters = state.filters.clone();
    let mut reset = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for dim in Dimension::ALL {
                let options = dataset.options(dim);
                let header_text = format!(
                    "{dim}  ({}/{})",
                    filters.selected_count(dim),
                    options.len()
                );

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(dim.column())
                    .default_open(dim != Dimension::Hour)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                filters.select_all(dataset, dim);
                            }
                            if ui.small_button("None").clicked() {
                                filters.select_none(dim);
                            }
                        });

                        for value in options {
                            let mut checked = filters.is_selected(dim, value);
                            let label = if value.is_empty() { "<empty>" } else { value.as_str() };
                            if ui.checkbox(&mut checked, label).changed() {
                                filters.set(dim, value, checked);
                            }
                        }
                    });
            }

            ui.add_space(8.0);
            if ui.button("Reset filters").clicked() {
                reset = true;
            }

            ui.separator();
            ui.label(
                RichText::new(
                    "Dashboard built around the urban mobility analysis requirements.",
                )
                .italics()
                .weak(),
            );
        });

    if reset {
        state.reset_filters();
    } else {
        state.refilter(filters);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{}: {} observations loaded, {} visible",
                state.data_path.display(),
                ds.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(ui.visuals().error_fg_color));
        }
    });
}

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Title, then the error, the empty-selection warning, or the tabbed charts.
pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Interactive Urban Mobility Dashboard");
    ui.label("Use the filters in the sidebar to explore the data.");
    ui.add_space(6.0);

    match state.view() {
        View::NoData(msg) => {
            ui.colored_label(ui.visuals().error_fg_color, msg);
            ui.colored_label(
                ui.visuals().error_fg_color,
                "The data could not be loaded. The dashboard cannot be displayed.",
            );
            return;
        }
        View::Empty => {
            ui.colored_label(
                ui.visuals().warn_fg_color,
                "No data found for the selected filters. Please adjust your selection.",
            );
            return;
        }
        View::Dashboard(_) => {}
    }

    ui.horizontal(|ui: &mut Ui| {
        for tab in Tab::ALL {
            ui.selectable_value(&mut state.active_tab, tab, tab.title());
        }
    });
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| match state.active_tab {
            Tab::Overview => overview::show(ui, &state.summary, &state.street_colors),
            Tab::Heatmap => heatmap::show(ui, &state.summary.heatmap),
            Tab::ClimateVehicle => breakdown::show(ui, &state.summary),
        });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open mobility data")
        .add_filter("Supported files", &["csv", "parquet", "pq", "json"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        log::info!("Opening {}", path.display());
        state.load(&path);
    }
}

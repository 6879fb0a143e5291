use std::path::{Path, PathBuf};

use crate::color::CategoryColors;
use crate::data::aggregate::DashboardSummary;
use crate::data::filter::{filtered_indices, FilterState};
use crate::data::loader::{self, LoadError};
use crate::data::model::{Dimension, MobilityDataset};

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Overview,
    Heatmap,
    ClimateVehicle,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Overview, Tab::Heatmap, Tab::ClimateVehicle];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Heatmap => "Congestion heatmap",
            Tab::ClimateVehicle => "Climate and vehicle analysis",
        }
    }
}

/// What the central panel should show.
#[derive(Debug)]
pub enum View<'a> {
    /// The dataset could not be loaded; the message explains why.
    NoData(&'a str),
    /// Filters exclude every row.
    Empty,
    Dashboard(&'a DashboardSummary),
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Debug, Default)]
pub struct AppState {
    /// Path of the current (or last attempted) data file.
    pub data_path: PathBuf,

    /// Loaded dataset, cached for the whole session.
    pub dataset: Option<MobilityDataset>,

    /// Per-dimension filter selections.
    pub filters: FilterState,

    /// Indices of observations passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Aggregations over `visible_indices` (cached).
    pub summary: DashboardSummary,

    /// One colour per street, stable across filter changes.
    pub street_colors: CategoryColors,

    pub active_tab: Tab,

    /// Error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Load `path` and make it the session dataset.  On failure the previous
    /// dataset (if any) is dropped and the error is kept for display.
    pub fn load(&mut self, path: &Path) {
        self.data_path = path.to_path_buf();
        match loader::load_file(path) {
            Ok(dataset) => self.set_dataset(dataset),
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.dataset = None;
                self.visible_indices.clear();
                self.summary = DashboardSummary::default();
                self.status_message = Some(describe_load_error(&e));
            }
        }
    }

    /// Re-read the current data file.
    pub fn reload(&mut self) {
        let path = self.data_path.clone();
        self.load(&path);
    }

    /// Ingest a newly loaded dataset with every filter value selected.
    pub fn set_dataset(&mut self, dataset: MobilityDataset) {
        if dataset.is_empty() {
            log::warn!("{} has a header but no observations", self.data_path.display());
        }
        self.filters = FilterState::all_selected(&dataset);
        self.street_colors = CategoryColors::new(&dataset.options.streets);
        self.dataset = Some(dataset);
        self.status_message = None;
        self.recompute();
    }

    fn recompute(&mut self) {
        if let Some(ds) = &self.dataset {
            self.visible_indices = filtered_indices(ds, &self.filters);
            self.summary = DashboardSummary::compute(ds, &self.visible_indices);
            log::debug!(
                "{} of {} observations visible",
                self.visible_indices.len(),
                ds.len()
            );
        }
    }

    /// Apply an edited filter state; aggregations are only recomputed when
    /// the selection actually changed.
    pub fn refilter(&mut self, filters: FilterState) {
        if filters != self.filters {
            self.filters = filters;
            self.recompute();
        }
    }

    /// Toggle a single value in a dimension's filter.
    pub fn toggle_filter_value(&mut self, dimension: Dimension, value: &str) {
        let mut filters = self.filters.clone();
        filters.toggle(dimension, value);
        self.refilter(filters);
    }

    /// Select all values of a dimension.
    pub fn select_all(&mut self, dimension: Dimension) {
        if let Some(ds) = &self.dataset {
            let mut filters = self.filters.clone();
            filters.select_all(ds, dimension);
            self.refilter(filters);
        }
    }

    /// Deselect all values of a dimension.
    pub fn select_none(&mut self, dimension: Dimension) {
        let mut filters = self.filters.clone();
        filters.select_none(dimension);
        self.refilter(filters);
    }

    /// Back to "everything selected".
    pub fn reset_filters(&mut self) {
        if let Some(ds) = &self.dataset {
            let filters = FilterState::all_selected(ds);
            self.refilter(filters);
        }
    }

    pub fn view(&self) -> View<'_> {
        match (&self.dataset, &self.status_message) {
            (None, Some(msg)) => View::NoData(msg),
            (None, None) => View::NoData("No dataset loaded."),
            (Some(_), _) if self.summary.is_empty() => View::Empty,
            (Some(_), _) => View::Dashboard(&self.summary),
        }
    }
}

fn describe_load_error(e: &LoadError) -> String {
    if e.is_not_found() {
        format!("Error: {e}. Make sure it is in the same folder the dashboard is started from.")
    } else {
        format!("Error: {e}")
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn csv_file(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "rua/avenida,hora,chuva,tipo_de_veículo,veículos_por_minuto").unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn missing_file_shows_error_view() {
        let mut state = AppState::default();
        state.load(Path::new("nowhere/mobilidade_urbana_processada.csv"));
        match state.view() {
            View::NoData(msg) => {
                assert!(msg.contains("mobilidade_urbana_processada.csv"));
                assert!(msg.contains("same folder"));
            }
            other => panic!("unexpected view: {other:?}"),
        }
    }

    #[test]
    fn deselecting_everything_shows_warning_view() {
        let file = csv_file("Rua A,08:00,Tempo seco,Carro,10\nRua B,09:00,Chuva leve,Moto,4\n");
        let mut state = AppState::default();
        state.load(file.path());
        assert!(matches!(state.view(), View::Dashboard(s) if s.row_count == 2));

        state.select_none(Dimension::Street);
        assert!(matches!(state.view(), View::Empty));

        state.toggle_filter_value(Dimension::Street, "Rua B");
        match state.view() {
            View::Dashboard(summary) => {
                assert_eq!(summary.row_count, 1);
                assert_eq!(summary.by_street[0].key, "Rua B");
            }
            other => panic!("unexpected view: {other:?}"),
        }

        state.reset_filters();
        assert_eq!(state.visible_indices, vec![0, 1]);
    }

    #[test]
    fn header_only_file_shows_warning_view() {
        let file = csv_file("");
        let mut state = AppState::default();
        state.load(file.path());
        assert!(state.dataset.as_ref().is_some_and(MobilityDataset::is_empty));
        assert!(state.status_message.is_none());
        assert!(matches!(state.view(), View::Empty));
    }

    #[test]
    fn failed_reload_drops_cached_dataset() {
        let file = csv_file("Rua A,08:00,Tempo seco,Carro,10\n");
        let mut state = AppState::default();
        state.load(file.path());
        assert!(state.dataset.is_some());

        let path = file.path().to_path_buf();
        drop(file);
        state.reload();
        assert_eq!(state.data_path, path);
        assert!(state.dataset.is_none());
        assert!(matches!(state.view(), View::NoData(_)));
    }
}

use std::collections::{BTreeMap, BTreeSet};

use super::model::{Dimension, MobilityDataset, Observation};

// ---------------------------------------------------------------------------
// Filter predicate: which values are selected per dimension
// ---------------------------------------------------------------------------

/// Per-dimension selection state.
///
/// Every dimension is always present.  An empty set means nothing is
/// selected for that dimension, so no observation passes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    selected: BTreeMap<Dimension, BTreeSet<String>>,
}

impl FilterState {
    /// All values of every dimension selected (i.e., show everything).
    pub fn all_selected(dataset: &MobilityDataset) -> Self {
        let selected = Dimension::ALL
            .iter()
            .map(|&dim| (dim, dataset.options(dim).iter().cloned().collect()))
            .collect();
        FilterState { selected }
    }

    pub fn is_selected(&self, dimension: Dimension, value: &str) -> bool {
        self.selected
            .get(&dimension)
            .is_some_and(|set| set.contains(value))
    }

    pub fn selected_count(&self, dimension: Dimension) -> usize {
        self.selected.get(&dimension).map_or(0, BTreeSet::len)
    }

    /// Flip one value; returns whether it is selected afterwards.
    pub fn toggle(&mut self, dimension: Dimension, value: &str) -> bool {
        let set = self.selected.entry(dimension).or_default();
        if set.remove(value) {
            false
        } else {
            set.insert(value.to_string());
            true
        }
    }

    pub fn set(&mut self, dimension: Dimension, value: &str, on: bool) {
        let set = self.selected.entry(dimension).or_default();
        if on {
            set.insert(value.to_string());
        } else {
            set.remove(value);
        }
    }

    pub fn select_all(&mut self, dataset: &MobilityDataset, dimension: Dimension) {
        self.selected.insert(
            dimension,
            dataset.options(dimension).iter().cloned().collect(),
        );
    }

    pub fn select_none(&mut self, dimension: Dimension) {
        self.selected.insert(dimension, BTreeSet::new());
    }

    /// Conjunction over the four dimensions.
    pub fn matches(&self, obs: &Observation) -> bool {
        Dimension::ALL
            .iter()
            .all(|&dim| self.is_selected(dim, obs.value(dim)))
    }
}

/// Return indices of observations that pass all four filters, in dataset order.
pub fn filtered_indices(dataset: &MobilityDataset, filters: &FilterState) -> Vec<usize> {
    dataset
        .observations
        .iter()
        .enumerate()
        .filter(|(_, obs)| filters.matches(obs))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> MobilityDataset {
        let rows = [
            ("Av. Paulista", "08:00", "Tempo seco", "Carro", 10.0),
            ("Av. Paulista", "18:00", "Chuva leve", "Moto", 6.0),
            ("Rua Augusta", "08:00", "Chuva intensa", "Carro", 4.0),
            ("Rua Augusta", "18:00", "Tempo seco", "Ônibus", 2.0),
        ];
        MobilityDataset::from_observations(
            rows.iter()
                .map(|&(s, h, r, v, n)| Observation {
                    street: s.into(),
                    hour: h.into(),
                    rainfall: r.into(),
                    vehicle_type: v.into(),
                    vehicles_per_minute: n,
                })
                .collect(),
        )
    }

    #[test]
    fn everything_selected_keeps_all_rows() {
        let ds = dataset();
        let filters = FilterState::all_selected(&ds);
        assert_eq!(filtered_indices(&ds, &filters), vec![0, 1, 2, 3]);
    }

    #[test]
    fn filters_combine_by_conjunction() {
        let ds = dataset();
        let mut filters = FilterState::all_selected(&ds);
        filters.toggle(Dimension::Street, "Rua Augusta");
        filters.select_none(Dimension::Hour);
        filters.set(Dimension::Hour, "08:00", true);
        assert_eq!(filtered_indices(&ds, &filters), vec![0]);

        filters.toggle(Dimension::VehicleType, "Carro");
        assert!(filtered_indices(&ds, &filters).is_empty());
    }

    #[test]
    fn empty_selection_hides_everything() {
        let ds = dataset();
        let mut filters = FilterState::all_selected(&ds);
        filters.select_none(Dimension::Rainfall);
        assert!(filtered_indices(&ds, &filters).is_empty());
        assert_eq!(filters.selected_count(Dimension::Rainfall), 0);

        filters.select_all(&ds, Dimension::Rainfall);
        assert_eq!(filtered_indices(&ds, &filters).len(), 4);
    }

    #[test]
    fn toggle_reports_new_state() {
        let ds = dataset();
        let mut filters = FilterState::all_selected(&ds);
        assert!(!filters.toggle(Dimension::Street, "Av. Paulista"));
        assert!(!filters.is_selected(Dimension::Street, "Av. Paulista"));
        assert!(filters.toggle(Dimension::Street, "Av. Paulista"));
        assert_eq!(filters.selected_count(Dimension::Street), 2);
    }
}

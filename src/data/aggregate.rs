//! Group-by aggregations feeding the dashboard panels.
//!
//! Every function takes the dataset plus the indices that survived the
//! filters, so one filtered view can feed all panels without copying rows.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::model::{hour_cmp, rainfall_cmp, MobilityDataset, Observation, RAINFALL_ORDER};

/// Number of metric cards in the overview.
pub const TOP_HOURS: usize = 3;

// ---------------------------------------------------------------------------
// MeanAccumulator
// ---------------------------------------------------------------------------

/// Running mean that ignores missing (`NaN`) measurements.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeanAccumulator {
    sum: f64,
    count: usize,
}

impl MeanAccumulator {
    pub fn push(&mut self, value: f64) {
        if value.is_finite() {
            self.sum += value;
            self.count += 1;
        }
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// One group key with its mean measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMean {
    pub key: String,
    pub mean: f64,
}

fn rows<'a>(
    dataset: &'a MobilityDataset,
    indices: &'a [usize],
) -> impl Iterator<Item = &'a Observation> + 'a {
    indices.iter().filter_map(|&i| dataset.observations.get(i))
}

/// Mean per key, sorted by mean descending; ties (and the initial order)
/// follow `key_cmp`.  Groups without a single measurement are dropped.
fn ranked_means<K, C>(
    dataset: &MobilityDataset,
    indices: &[usize],
    key: K,
    key_cmp: C,
) -> Vec<GroupMean>
where
    K: Fn(&Observation) -> &str,
    C: Fn(&str, &str) -> Ordering,
{
    let mut groups: BTreeMap<&str, MeanAccumulator> = BTreeMap::new();
    for obs in rows(dataset, indices) {
        groups
            .entry(key(obs))
            .or_default()
            .push(obs.vehicles_per_minute);
    }

    let mut ranking: Vec<GroupMean> = groups
        .into_iter()
        .filter_map(|(k, acc)| {
            acc.mean().map(|mean| GroupMean {
                key: k.to_string(),
                mean,
            })
        })
        .collect();
    ranking.sort_by(|a, b| {
        b.mean
            .total_cmp(&a.mean)
            .then_with(|| key_cmp(&a.key, &b.key))
    });
    ranking
}

/// Mean vehicles per minute by street, busiest first.
pub fn mean_by_street(dataset: &MobilityDataset, indices: &[usize]) -> Vec<GroupMean> {
    ranked_means(dataset, indices, |o| o.street.as_str(), |a, b| a.cmp(b))
}

/// Mean vehicles per minute by hour, busiest first.
pub fn mean_by_hour(dataset: &MobilityDataset, indices: &[usize]) -> Vec<GroupMean> {
    ranked_means(dataset, indices, |o| o.hour.as_str(), hour_cmp)
}

/// The first `n` entries of a ranking (fewer if the ranking is shorter).
pub fn top_hours(ranking: &[GroupMean], n: usize) -> &[GroupMean] {
    &ranking[..n.min(ranking.len())]
}

// ---------------------------------------------------------------------------
// Heatmap: hour x street
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Heatmap {
    /// Column labels (x axis), in hour order.
    pub hours: Vec<String>,
    /// Row labels (y axis), ascending.
    pub streets: Vec<String>,
    /// `cells[street][hour]`; `None` where no measurement exists.
    pub cells: Vec<Vec<Option<f64>>>,
}

impl Heatmap {
    pub fn compute(dataset: &MobilityDataset, indices: &[usize]) -> Self {
        let mut groups: BTreeMap<(&str, &str), MeanAccumulator> = BTreeMap::new();
        for obs in rows(dataset, indices) {
            groups
                .entry((obs.street.as_str(), obs.hour.as_str()))
                .or_default()
                .push(obs.vehicles_per_minute);
        }

        let mut streets: Vec<String> = Vec::new();
        let mut hours: Vec<String> = Vec::new();
        for (street, hour) in groups.keys() {
            if streets.last().map(String::as_str) != Some(*street) {
                streets.push(street.to_string());
            }
            if !hours.iter().any(|h| h == hour) {
                hours.push(hour.to_string());
            }
        }
        hours.sort_by(|a, b| hour_cmp(a, b));

        let cells = streets
            .iter()
            .map(|street| {
                hours
                    .iter()
                    .map(|hour| {
                        groups
                            .get(&(street.as_str(), hour.as_str()))
                            .and_then(MeanAccumulator::mean)
                    })
                    .collect()
            })
            .collect();

        Heatmap {
            hours,
            streets,
            cells,
        }
    }

    pub fn cell(&self, street: usize, hour: usize) -> Option<f64> {
        self.cells.get(street)?.get(hour).copied().flatten()
    }

    /// Smallest and largest cell value, if any cell is present.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.cells
            .iter()
            .flatten()
            .flatten()
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

// ---------------------------------------------------------------------------
// Box plot statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
    pub count: usize,
}

/// Linear-interpolated percentile of sorted data, `p` in `[0, 1]`.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

impl BoxStats {
    /// Quartiles, 1.5 IQR whiskers and outliers.  `None` without data.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let q1 = percentile(&sorted, 0.25);
        let median = percentile(&sorted, 0.5);
        let q3 = percentile(&sorted, 0.75);
        let iqr = q3 - q1;
        let low_fence = q1 - 1.5 * iqr;
        let high_fence = q3 + 1.5 * iqr;

        // Whiskers reach the most extreme data inside the fences, never into the box.
        let lower_whisker = sorted
            .iter()
            .copied()
            .find(|&v| v >= low_fence)
            .map_or(q1, |v| v.min(q1));
        let upper_whisker = sorted
            .iter()
            .rev()
            .copied()
            .find(|&v| v <= high_fence)
            .map_or(q3, |v| v.max(q3));
        let outliers = sorted
            .iter()
            .copied()
            .filter(|&v| v < lower_whisker || v > upper_whisker)
            .collect();

        Some(BoxStats {
            lower_whisker,
            q1,
            median,
            q3,
            upper_whisker,
            outliers,
            count: sorted.len(),
        })
    }
}

/// One box per rainfall bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct RainfallBox {
    pub rainfall: String,
    pub stats: Option<BoxStats>,
}

/// Boxes for [`RAINFALL_ORDER`] in that order; buckets outside it are not drawn.
pub fn rainfall_boxplots(dataset: &MobilityDataset, indices: &[usize]) -> Vec<RainfallBox> {
    RAINFALL_ORDER
        .iter()
        .map(|&label| {
            let values: Vec<f64> = rows(dataset, indices)
                .filter(|o| o.rainfall == label)
                .map(|o| o.vehicles_per_minute)
                .collect();
            RainfallBox {
                rainfall: label.to_string(),
                stats: BoxStats::from_values(&values),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Pivot: vehicle type x rainfall
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PivotTable {
    /// Vehicle types, ascending.
    pub rows: Vec<String>,
    /// Rainfall buckets in rainfall order, unknown labels last (not alphabetical).
    pub columns: Vec<String>,
    pub cells: Vec<Vec<Option<f64>>>,
}

impl PivotTable {
    pub fn vehicle_by_rainfall(dataset: &MobilityDataset, indices: &[usize]) -> Self {
        let mut groups: BTreeMap<(&str, &str), MeanAccumulator> = BTreeMap::new();
        let mut columns: Vec<String> = Vec::new();
        for obs in rows(dataset, indices) {
            groups
                .entry((obs.vehicle_type.as_str(), obs.rainfall.as_str()))
                .or_default()
                .push(obs.vehicles_per_minute);
            if !columns.iter().any(|c| *c == obs.rainfall) {
                columns.push(obs.rainfall.clone());
            }
        }
        columns.sort_by(|a, b| rainfall_cmp(a, b));

        let mut row_labels: Vec<String> = groups.keys().map(|(v, _)| v.to_string()).collect();
        row_labels.dedup();

        let cells = row_labels
            .iter()
            .map(|vehicle| {
                columns
                    .iter()
                    .map(|rain| {
                        groups
                            .get(&(vehicle.as_str(), rain.as_str()))
                            .and_then(MeanAccumulator::mean)
                    })
                    .collect()
            })
            .collect();

        PivotTable {
            rows: row_labels,
            columns,
            cells,
        }
    }

    /// Cell value with missing combinations filled with 0.
    pub fn cell_or_zero(&self, row: usize, column: usize) -> f64 {
        self.cells
            .get(row)
            .and_then(|r| r.get(column).copied().flatten())
            .unwrap_or(0.0)
    }
}

// ---------------------------------------------------------------------------
// DashboardSummary – everything one render needs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardSummary {
    pub row_count: usize,
    pub by_street: Vec<GroupMean>,
    pub by_hour: Vec<GroupMean>,
    pub heatmap: Heatmap,
    pub rainfall_boxes: Vec<RainfallBox>,
    pub pivot: PivotTable,
}

impl DashboardSummary {
    pub fn compute(dataset: &MobilityDataset, indices: &[usize]) -> Self {
        DashboardSummary {
            row_count: indices.len(),
            by_street: mean_by_street(dataset, indices),
            by_hour: mean_by_hour(dataset, indices),
            heatmap: Heatmap::compute(dataset, indices),
            rainfall_boxes: rainfall_boxplots(dataset, indices),
            pivot: PivotTable::vehicle_by_rainfall(dataset, indices),
        }
    }

    /// No rows survived the filters: show the warning instead of charts.
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    pub fn top_hours(&self) -> &[GroupMean] {
        top_hours(&self.by_hour, TOP_HOURS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(street: &str, hour: &str, rain: &str, vehicle: &str, v: f64) -> Observation {
        Observation {
            street: street.into(),
            hour: hour.into(),
            rainfall: rain.into(),
            vehicle_type: vehicle.into(),
            vehicles_per_minute: v,
        }
    }

    fn dataset() -> MobilityDataset {
        MobilityDataset::from_observations(vec![
            obs("Rua A", "08:00", "Tempo seco", "Carro", 10.0),
            obs("Rua A", "08:00", "Chuva leve", "Carro", 14.0),
            obs("Rua A", "18:00", "Chuva intensa", "Moto", 6.0),
            obs("Rua B", "08:00", "Tempo seco", "Ônibus", 2.0),
            obs("Rua B", "18:00", "Chuva leve", "Carro", 20.0),
            obs("Rua B", "12:00", "Tempo seco", "Moto", f64::NAN),
        ])
    }

    fn all(ds: &MobilityDataset) -> Vec<usize> {
        (0..ds.len()).collect()
    }

    #[test]
    fn mean_skips_missing_values() {
        let mut acc = MeanAccumulator::default();
        assert_eq!(acc.mean(), None);
        acc.push(1.0);
        acc.push(f64::NAN);
        acc.push(3.0);
        assert_eq!(acc.mean(), Some(2.0));
    }

    #[test]
    fn street_means_sorted_descending() {
        let ds = dataset();
        let ranking = mean_by_street(&ds, &all(&ds));
        assert_eq!(
            ranking,
            vec![
                GroupMean { key: "Rua B".into(), mean: 11.0 },
                GroupMean { key: "Rua A".into(), mean: 10.0 },
            ]
        );
    }

    #[test]
    fn hour_ranking_drops_groups_without_measurements() {
        let ds = dataset();
        let ranking = mean_by_hour(&ds, &all(&ds));
        let keys: Vec<&str> = ranking.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["18:00", "08:00"]);
        assert!((ranking[1].mean - 26.0 / 3.0).abs() < 1e-12);
        assert_eq!(top_hours(&ranking, 3).len(), 2);
        assert_eq!(top_hours(&ranking, 1)[0].key, "18:00");
    }

    #[test]
    fn aggregations_respect_filtered_indices() {
        let ds = dataset();
        let ranking = mean_by_street(&ds, &[0, 1]);
        assert_eq!(ranking, vec![GroupMean { key: "Rua A".into(), mean: 12.0 }]);
    }

    #[test]
    fn heatmap_grid_is_hour_by_street() {
        let ds = dataset();
        let hm = Heatmap::compute(&ds, &all(&ds));
        assert_eq!(hm.hours, vec!["08:00", "12:00", "18:00"]);
        assert_eq!(hm.streets, vec!["Rua A", "Rua B"]);
        assert_eq!(hm.cell(0, 0), Some(12.0));
        assert_eq!(hm.cell(0, 1), None);
        assert_eq!(hm.cell(1, 1), None);
        assert_eq!(hm.cell(1, 2), Some(20.0));
        assert_eq!(hm.value_range(), Some((2.0, 20.0)));
    }

    #[test]
    fn box_stats_use_linear_quartiles() {
        let stats = BoxStats::from_values(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0]).unwrap();
        assert_eq!(stats.q1, 2.25);
        assert_eq!(stats.median, 3.5);
        assert_eq!(stats.q3, 4.75);
        assert_eq!(stats.lower_whisker, 1.0);
        assert_eq!(stats.upper_whisker, 5.0);
        assert_eq!(stats.outliers, vec![100.0]);
        assert_eq!(stats.count, 6);
        assert!(BoxStats::from_values(&[f64::NAN]).is_none());
    }

    #[test]
    fn rainfall_boxes_follow_fixed_order() {
        let ds = dataset();
        let boxes = rainfall_boxplots(&ds, &[0, 3]);
        let labels: Vec<&str> = boxes.iter().map(|b| b.rainfall.as_str()).collect();
        assert_eq!(labels, RAINFALL_ORDER.to_vec());
        assert_eq!(boxes[0].stats.as_ref().map(|s| s.median), Some(6.0));
        assert!(boxes[1].stats.is_none());
        assert!(boxes[2].stats.is_none());
    }

    #[test]
    fn pivot_fills_missing_cells_with_zero() {
        let ds = dataset();
        let pivot = PivotTable::vehicle_by_rainfall(&ds, &all(&ds));
        assert_eq!(pivot.rows, vec!["Carro", "Moto", "Ônibus"]);
        assert_eq!(pivot.columns, RAINFALL_ORDER.to_vec());
        assert_eq!(pivot.cell_or_zero(0, 0), 10.0);
        assert_eq!(pivot.cell_or_zero(0, 1), 17.0);
        assert_eq!(pivot.cell_or_zero(0, 2), 0.0);
        assert_eq!(pivot.cell_or_zero(1, 2), 6.0);
        // Moto under "Tempo seco" only has a missing measurement.
        assert_eq!(pivot.cells[1][0], None);
        assert_eq!(pivot.cell_or_zero(2, 0), 2.0);
    }

    #[test]
    fn pivot_columns_follow_rainfall_order() {
        let ds = MobilityDataset::from_observations(vec![
            obs("Rua A", "08:00", "Granizo", "Carro", 1.0),
            obs("Rua A", "08:00", "Chuva intensa", "Carro", 2.0),
            obs("Rua A", "08:00", "Tempo seco", "Carro", 3.0),
        ]);
        let pivot = PivotTable::vehicle_by_rainfall(&ds, &all(&ds));
        assert_eq!(pivot.columns, vec!["Tempo seco", "Chuva intensa", "Granizo"]);
        assert_eq!(pivot.cells[0], vec![Some(3.0), Some(2.0), Some(1.0)]);
    }

    #[test]
    fn summary_reports_empty_selection() {
        let ds = dataset();
        let summary = DashboardSummary::compute(&ds, &[]);
        assert!(summary.is_empty());
        assert!(summary.by_street.is_empty());
        assert!(summary.heatmap.value_range().is_none());

        let summary = DashboardSummary::compute(&ds, &all(&ds));
        assert!(!summary.is_empty());
        assert_eq!(summary.row_count, 6);
        assert_eq!(summary.top_hours().len(), 2);
    }
}

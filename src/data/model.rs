use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

// ---------------------------------------------------------------------------
// Column names of the pre-processed mobility table
// ---------------------------------------------------------------------------

/// Numeric measurement column.
pub const MEASURE_COLUMN: &str = "veículos_por_minuto";

/// Display order of the rainfall buckets (driest first).
pub const RAINFALL_ORDER: [&str; 3] = ["Tempo seco", "Chuva leve", "Chuva intensa"];

// ---------------------------------------------------------------------------
// Dimension – one of the four categorical filter columns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dimension {
    Street,
    Hour,
    Rainfall,
    VehicleType,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Street,
        Dimension::Hour,
        Dimension::Rainfall,
        Dimension::VehicleType,
    ];

    /// Header of the source column holding this dimension.
    pub fn column(self) -> &'static str {
        match self {
            Dimension::Street => "rua/avenida",
            Dimension::Hour => "hora",
            Dimension::Rainfall => "chuva",
            Dimension::VehicleType => "tipo_de_veículo",
        }
    }

    /// Label shown above the filter widget.
    pub fn label(self) -> &'static str {
        match self {
            Dimension::Street => "Street / avenue",
            Dimension::Hour => "Hour",
            Dimension::Rainfall => "Weather condition",
            Dimension::VehicleType => "Vehicle type",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Orderings
// ---------------------------------------------------------------------------

/// Order hour labels: numeric labels numerically, numbers before text,
/// text lexicographically (`"07:00" < "10:00"`).
pub fn hour_cmp(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
        (Ok(x), Ok(y)) => x.total_cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

fn rainfall_rank(label: &str) -> usize {
    RAINFALL_ORDER
        .iter()
        .position(|known| *known == label)
        .unwrap_or(RAINFALL_ORDER.len())
}

/// Known rainfall buckets in [`RAINFALL_ORDER`], anything else after them.
pub fn rainfall_cmp(a: &str, b: &str) -> Ordering {
    rainfall_rank(a)
        .cmp(&rainfall_rank(b))
        .then_with(|| a.cmp(b))
}

// ---------------------------------------------------------------------------
// Observation – one row of the table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub street: String,
    pub hour: String,
    pub rainfall: String,
    pub vehicle_type: String,
    /// `NaN` when the cell was empty; skipped by every mean.
    pub vehicles_per_minute: f64,
}

impl Observation {
    pub fn value(&self, dimension: Dimension) -> &str {
        match dimension {
            Dimension::Street => &self.street,
            Dimension::Hour => &self.hour,
            Dimension::Rainfall => &self.rainfall,
            Dimension::VehicleType => &self.vehicle_type,
        }
    }
}

// ---------------------------------------------------------------------------
// DimensionOptions – distinct values offered by each filter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DimensionOptions {
    pub streets: Vec<String>,
    pub hours: Vec<String>,
    pub rainfall: Vec<String>,
    pub vehicle_types: Vec<String>,
}

impl DimensionOptions {
    pub fn get(&self, dimension: Dimension) -> &[String] {
        match dimension {
            Dimension::Street => &self.streets,
            Dimension::Hour => &self.hours,
            Dimension::Rainfall => &self.rainfall,
            Dimension::VehicleType => &self.vehicle_types,
        }
    }

    fn get_mut(&mut self, dimension: Dimension) -> &mut Vec<String> {
        match dimension {
            Dimension::Street => &mut self.streets,
            Dimension::Hour => &mut self.hours,
            Dimension::Rainfall => &mut self.rainfall,
            Dimension::VehicleType => &mut self.vehicle_types,
        }
    }
}

// ---------------------------------------------------------------------------
// MobilityDataset – the complete loaded table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct MobilityDataset {
    pub observations: Vec<Observation>,
    pub options: DimensionOptions,
}

impl MobilityDataset {
    /// Build the filter options from the loaded rows.
    ///
    /// Streets, rainfall and vehicle types keep first-appearance order;
    /// hours are sorted with [`hour_cmp`].
    pub fn from_observations(observations: Vec<Observation>) -> Self {
        let mut options = DimensionOptions::default();

        for dim in Dimension::ALL {
            let mut seen: BTreeSet<&str> = BTreeSet::new();
            let values = options.get_mut(dim);
            for obs in &observations {
                let v = obs.value(dim);
                if seen.insert(v) {
                    values.push(v.to_string());
                }
            }
        }
        options.hours.sort_by(|a, b| hour_cmp(a, b));

        MobilityDataset {
            observations,
            options,
        }
    }

    pub fn options(&self, dimension: Dimension) -> &[String] {
        self.options.get(dimension)
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
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

    #[test]
    fn hours_sort_numerically_when_possible() {
        let mut hours = vec!["10", "8", "text", "9.5", "18"];
        hours.sort_by(|a, b| hour_cmp(a, b));
        assert_eq!(hours, vec!["8", "9.5", "10", "18", "text"]);
    }

    #[test]
    fn rainfall_known_labels_come_first() {
        let mut labels = vec!["Granizo", "Chuva intensa", "Tempo seco", "Chuva leve"];
        labels.sort_by(|a, b| rainfall_cmp(a, b));
        assert_eq!(
            labels,
            vec!["Tempo seco", "Chuva leve", "Chuva intensa", "Granizo"]
        );
    }

    #[test]
    fn options_keep_first_appearance_except_hours() {
        let ds = MobilityDataset::from_observations(vec![
            obs("Rua B", "18:00", "Chuva leve", "Moto", 3.0),
            obs("Rua A", "07:00", "Tempo seco", "Carro", 5.0),
            obs("Rua B", "08:00", "Chuva leve", "Carro", 4.0),
        ]);
        assert_eq!(ds.options(Dimension::Street), ["Rua B", "Rua A"]);
        assert_eq!(ds.options(Dimension::Hour), ["07:00", "08:00", "18:00"]);
        assert_eq!(ds.options(Dimension::Rainfall), ["Chuva leve", "Tempo seco"]);
        assert_eq!(ds.options(Dimension::VehicleType), ["Moto", "Carro"]);
        assert_eq!(ds.len(), 3);
    }
}

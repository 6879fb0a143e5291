use std::path::{Path, PathBuf};

use arrow::array::{Array, ArrayRef, Float64Array, StringArray};
use arrow::compute::{can_cast_types, cast_with_options, CastOptions};
use arrow::datatypes::DataType;
use arrow::error::ArrowError;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::errors::ParquetError;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{Dimension, MobilityDataset, Observation, MEASURE_COLUMN};

/// File looked up in the working directory when no path is configured.
pub const DEFAULT_DATA_FILE: &str = "mobilidade_urbana_processada.csv";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file '{}' was not found", .0.display())]
    NotFound(PathBuf),

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("missing column '{0}'")]
    MissingColumn(String),

    #[error("row {row}: '{value}' is not a number")]
    InvalidNumber { row: usize, value: String },

    #[error("column '{column}' has unsupported type {data_type}")]
    UnsupportedColumnType { column: String, data_type: String },

    #[error("expected a JSON array of records")]
    NotRecords,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),
}

impl LoadError {
    /// The data file is absent (as opposed to present but unreadable).
    pub fn is_not_found(&self) -> bool {
        matches!(self, LoadError::NotFound(_))
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the mobility table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the five named columns (primary format)
/// * `.parquet` – same columns; hour and measure may be numeric
/// * `.json`    – `[{ "rua/avenida": ..., "hora": ..., ... }, ...]`
pub fn load_file(path: &Path) -> Result<MobilityDataset, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        "json" => load_json(path)?,
        other => return Err(LoadError::UnsupportedExtension(other.to_string())),
    };

    log::info!(
        "Loaded {} observations from {} ({} streets, {} hours)",
        dataset.len(),
        path.display(),
        dataset.options.streets.len(),
        dataset.options.hours.len()
    );
    Ok(dataset)
}

/// Parse a measurement cell.  Empty cells are missing values (`NaN`).
fn parse_measure(raw: &str, row: usize) -> Result<f64, LoadError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(f64::NAN);
    }
    raw.parse::<f64>().map_err(|_| LoadError::InvalidNumber {
        row,
        value: raw.to_string(),
    })
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Column positions of the five known fields in a header row.
struct ColumnIndex {
    street: usize,
    hour: usize,
    rainfall: usize,
    vehicle_type: usize,
    measure: usize,
}

impl ColumnIndex {
    fn locate<F>(mut position: F) -> Result<Self, LoadError>
    where
        F: FnMut(&str) -> Option<usize>,
    {
        let mut find = |name: &str| {
            position(name).ok_or_else(|| LoadError::MissingColumn(name.to_string()))
        };
        Ok(ColumnIndex {
            street: find(Dimension::Street.column())?,
            hour: find(Dimension::Hour.column())?,
            rainfall: find(Dimension::Rainfall.column())?,
            vehicle_type: find(Dimension::VehicleType.column())?,
            measure: find(MEASURE_COLUMN)?,
        })
    }
}

fn load_csv(path: &Path) -> Result<MobilityDataset, LoadError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let cols = ColumnIndex::locate(|name| headers.iter().position(|h| h.trim() == name))?;

    let mut observations = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result?;
        let cell = |i: usize| record.get(i).unwrap_or("").to_string();

        observations.push(Observation {
            street: cell(cols.street),
            hour: cell(cols.hour),
            rainfall: cell(cols.rainfall),
            vehicle_type: cell(cols.vehicle_type),
            vehicles_per_minute: parse_measure(record.get(cols.measure).unwrap_or(""), row_no)?,
        });
    }

    Ok(MobilityDataset::from_observations(observations))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, as written by `df.to_json(orient='records')`.
fn load_json(path: &Path) -> Result<MobilityDataset, LoadError> {
    let text = std::fs::read_to_string(path)?;
    let root: JsonValue = serde_json::from_str(&text)?;
    let records = root.as_array().ok_or(LoadError::NotRecords)?;

    let mut observations = Vec::with_capacity(records.len());
    for (row, rec) in records.iter().enumerate() {
        let obj = rec.as_object().ok_or(LoadError::NotRecords)?;

        let vehicles_per_minute = match json_field(obj, MEASURE_COLUMN)? {
            JsonValue::Number(n) => n.as_f64().unwrap_or(f64::NAN),
            JsonValue::Null => f64::NAN,
            JsonValue::String(s) => parse_measure(s, row)?,
            other => {
                return Err(LoadError::InvalidNumber {
                    row,
                    value: other.to_string(),
                })
            }
        };

        observations.push(Observation {
            street: json_text(json_field(obj, Dimension::Street.column())?),
            hour: json_text(json_field(obj, Dimension::Hour.column())?),
            rainfall: json_text(json_field(obj, Dimension::Rainfall.column())?),
            vehicle_type: json_text(json_field(obj, Dimension::VehicleType.column())?),
            vehicles_per_minute,
        });
    }

    Ok(MobilityDataset::from_observations(observations))
}

fn json_field<'a>(
    obj: &'a serde_json::Map<String, JsonValue>,
    name: &str,
) -> Result<&'a JsonValue, LoadError> {
    obj.get(name)
        .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
}

fn json_text(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Works with files written by both Pandas (`df.to_parquet()`) and Polars.
///
/// Each located column is cast once per batch: the four categorical columns
/// to `Utf8` (dictionary-encoded `category` columns included), the measure
/// to `Float64`.
fn load_parquet(path: &Path) -> Result<MobilityDataset, LoadError> {
    let file = std::fs::File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    let schema = builder.schema().clone();
    let cols = ColumnIndex::locate(|name| schema.index_of(name).ok())?;
    let reader = builder.build()?;

    let mut observations = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        let text = |i: usize| cast_column(schema.field(i).name(), batch.column(i), DataType::Utf8);

        let street = text(cols.street)?;
        let hour = text(cols.hour)?;
        let rainfall = text(cols.rainfall)?;
        let vehicle_type = text(cols.vehicle_type)?;
        let measure = cast_column(
            schema.field(cols.measure).name(),
            batch.column(cols.measure),
            DataType::Float64,
        )?;

        let street = as_text(&street)?;
        let hour = as_text(&hour)?;
        let rainfall = as_text(&rainfall)?;
        let vehicle_type = as_text(&vehicle_type)?;
        let measure = measure
            .as_any()
            .downcast_ref::<Float64Array>()
            .ok_or_else(|| unsupported(MEASURE_COLUMN, &measure))?;

        for row in 0..batch.num_rows() {
            observations.push(Observation {
                street: text_cell(street, row),
                hour: text_cell(hour, row),
                rainfall: text_cell(rainfall, row),
                vehicle_type: text_cell(vehicle_type, row),
                vehicles_per_minute: if measure.is_null(row) {
                    f64::NAN
                } else {
                    measure.value(row)
                },
            });
        }
    }
    log::debug!("Read {} parquet rows from {}", observations.len(), path.display());

    Ok(MobilityDataset::from_observations(observations))
}

fn unsupported(name: &str, col: &ArrayRef) -> LoadError {
    LoadError::UnsupportedColumnType {
        column: name.to_string(),
        data_type: format!("{:?}", col.data_type()),
    }
}

/// Cast a column to `to`; values that do not convert fail instead of turning null.
fn cast_column(name: &str, col: &ArrayRef, to: DataType) -> Result<ArrayRef, LoadError> {
    if !can_cast_types(col.data_type(), &to) {
        return Err(unsupported(name, col));
    }
    let options = CastOptions {
        safe: false,
        ..Default::default()
    };
    cast_with_options(col, &to, &options).map_err(|e| {
        log::warn!("Casting column '{name}' to {to:?} failed: {e}");
        unsupported(name, col)
    })
}

fn as_text(col: &ArrayRef) -> Result<&StringArray, LoadError> {
    col.as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| unsupported("<text>", col))
}

/// Nulls become empty text.
fn text_cell(col: &StringArray, row: usize) -> String {
    if col.is_null(row) {
        String::new()
    } else {
        col.value(row).to_string()
    }
}

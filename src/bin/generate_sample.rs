//! Writes a synthetic urban mobility table for trying out the dashboard.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

use mobility_dashboard::data::loader::DEFAULT_DATA_FILE;
use mobility_dashboard::data::model::{Dimension, MEASURE_COLUMN, RAINFALL_ORDER};

/// Generate a deterministic sample mobility dataset.
#[derive(Debug, Parser)]
#[command(name = "generate_sample", about)]
struct Args {
    /// Output file; `.csv` or `.parquet`.
    #[arg(default_value = DEFAULT_DATA_FILE)]
    output: PathBuf,

    /// PRNG seed.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

#[derive(Debug, Serialize)]
struct Row {
    #[serde(rename = "rua/avenida")]
    street: String,
    #[serde(rename = "hora")]
    hour: String,
    #[serde(rename = "chuva")]
    rainfall: String,
    #[serde(rename = "tipo_de_veículo")]
    vehicle_type: String,
    #[serde(rename = "veículos_por_minuto")]
    vehicles_per_minute: f64,
}

/// Base flow of a street, relative weight of a vehicle type.
const STREETS: [(&str, f64); 5] = [
    ("Av. Paulista", 42.0),
    ("Av. Brigadeiro Faria Lima", 36.0),
    ("Rua Augusta", 24.0),
    ("Av. Rebouças", 31.0),
    ("Rua da Consolação", 27.0),
];
const VEHICLES: [(&str, f64); 4] = [
    ("Carro", 1.0),
    ("Moto", 0.45),
    ("Ônibus", 0.12),
    ("Caminhão", 0.08),
];
/// Rush-hour multiplier per hour of day.
fn hour_factor(hour: u32) -> f64 {
    match hour {
        7..=9 => 1.6,
        17..=19 => 1.8,
        12..=13 => 1.2,
        0..=5 | 22..=23 => 0.3,
        _ => 1.0,
    }
}

/// Rain slows traffic down.
fn rain_factor(rainfall: &str) -> f64 {
    match rainfall {
        "Chuva leve" => 0.85,
        "Chuva intensa" => 0.6,
        _ => 1.0,
    }
}

fn generate(rng: &mut SimpleRng) -> Vec<Row> {
    let mut rows = Vec::new();
    for &(street, base) in &STREETS {
        for hour in 6..=22u32 {
            for rainfall in RAINFALL_ORDER {
                for &(vehicle, weight) in &VEHICLES {
                    let mean = base * weight * hour_factor(hour) * rain_factor(rainfall);
                    let value = rng.gauss(mean, mean * 0.15).max(0.0);
                    rows.push(Row {
                        street: street.to_string(),
                        hour: format!("{hour:02}:00"),
                        rainfall: rainfall.to_string(),
                        vehicle_type: vehicle.to_string(),
                        vehicles_per_minute: (value * 100.0).round() / 100.0,
                    });
                }
            }
        }
    }
    rows
}

fn write_csv(path: &Path, rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV writer")?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[Row]) -> Result<()> {
    let text_column = |f: fn(&Row) -> &str| -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new(Dimension::Street.column(), DataType::Utf8, false),
        Field::new(Dimension::Hour.column(), DataType::Utf8, false),
        Field::new(Dimension::Rainfall.column(), DataType::Utf8, false),
        Field::new(Dimension::VehicleType.column(), DataType::Utf8, false),
        Field::new(MEASURE_COLUMN, DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            text_column(|r| r.street.as_str()),
            text_column(|r| r.hour.as_str()),
            text_column(|r| r.rainfall.as_str()),
            text_column(|r| r.vehicle_type.as_str()),
            Arc::new(Float64Array::from(
                rows.iter().map(|r| r.vehicles_per_minute).collect::<Vec<_>>(),
            )) as ArrayRef,
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let Args { output: output_path, seed } = Args::parse();

    let mut rng = SimpleRng::new(seed);
    let rows = generate(&mut rng);

    let ext = output_path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "csv" => write_csv(&output_path, &rows)?,
        "parquet" | "pq" => write_parquet(&output_path, &rows)?,
        other => bail!("Unsupported output extension: .{other}"),
    }

    log::info!("Wrote {} rows to {}", rows.len(), output_path.display());
    println!("Wrote {} observations to {}", rows.len(), output_path.display());
    Ok(())
}

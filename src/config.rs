use std::path::PathBuf;

use clap::Parser;

use crate::data::loader::DEFAULT_DATA_FILE;

/// Interactive dashboard over a pre-processed urban mobility table.
#[derive(Debug, Clone, Parser)]
#[command(name = "mobility-dashboard", version, about)]
pub struct Config {
    /// Data file to load (.csv, .parquet or .json).
    #[arg(short, long, env = "MOBILITY_DATA", default_value = DEFAULT_DATA_FILE)]
    pub data: PathBuf,

    /// Initial window width in points.
    #[arg(long, default_value_t = 1280.0)]
    pub width: f32,

    /// Initial window height in points.
    #[arg(long, default_value_t = 860.0)]
    pub height: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_working_directory_file() {
        let config = Config::try_parse_from(["mobility-dashboard"]).unwrap();
        assert_eq!(config.data, PathBuf::from(DEFAULT_DATA_FILE));
        assert_eq!(config.width, 1280.0);
    }

    #[test]
    fn data_path_can_be_overridden() {
        let config =
            Config::try_parse_from(["mobility-dashboard", "--data", "other.parquet"]).unwrap();
        assert_eq!(config.data, PathBuf::from("other.parquet"));
    }
}

use std::path::PathBuf;

use clap::Parser;

use crate::data::aggregate::DEFAULT_TOP_N;

/// Key and tonality dashboard for music track datasets.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Config {
    /// Dataset to open at startup (.csv, .csv.gz, .json, .json.gz, .parquet).
    #[arg(short, long, default_value = "data/keys_spotify_data-25.csv.gz")]
    pub data: PathBuf,

    /// Number of rows in the "Detailed Data" table.
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    pub top_n: usize,

    /// Initial window width in points.
    #[arg(long, default_value_t = 1400.0)]
    pub width: f32,

    /// Initial window height in points.
    #[arg(long, default_value_t = 900.0)]
    pub height: f32,
}

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_INPUT: &str = "benchmark_results.csv";
pub const DEFAULT_OUTPUT_DIR: &str = "graphs";
/// 8x6 inches at 100 dpi
pub const DEFAULT_SIZE: (u32, u32) = (800, 600);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// Benchmark results CSV
    pub input: PathBuf,
    /// Directory the charts are written to, created with its parents if missing
    pub output_dir: PathBuf,
    pub width: u32,
    pub height: u32,
    /// Also write the series of every chart to `plot_data/<chart>.json`
    pub dump_plot_data: bool,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            width: DEFAULT_SIZE.0,
            height: DEFAULT_SIZE.1,
            dump_plot_data: false,
        }
    }
}

impl PlotConfig {
    pub fn with_paths(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
            ..Default::default()
        }
    }
}

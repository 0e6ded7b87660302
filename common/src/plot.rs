use std::{
    fs,
    path::{Path, PathBuf},
};

use eyre::{Context, Result};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    bench::{BenchmarkRecord, load_records},
    config::PlotConfig,
    util::save_png,
};

/// A benchmark quantity that gets its own pair of charts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Speedup,
    Efficiency,
    Throughput,
    LatencyPerTask,
}

impl Metric {
    /// Charts are generated in this order
    pub const ALL: [Metric; 4] = [
        Metric::Speedup,
        Metric::Efficiency,
        Metric::Throughput,
        Metric::LatencyPerTask,
    ];

    /// Column name in the results CSV, also the prefix of the chart files
    pub fn key(&self) -> &'static str {
        match self {
            Metric::Speedup => "speedup",
            Metric::Efficiency => "efficiency",
            Metric::Throughput => "throughput",
            Metric::LatencyPerTask => "latency_per_task",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Speedup => "Speedup",
            Metric::Efficiency => "Efficiency",
            Metric::Throughput => "Throughput",
            Metric::LatencyPerTask => "Latency per Task (s)",
        }
    }

    pub fn value(&self, record: &BenchmarkRecord) -> f64 {
        match self {
            Metric::Speedup => record.speedup,
            Metric::Efficiency => record.efficiency,
            Metric::Throughput => record.throughput,
            Metric::LatencyPerTask => record.latency_per_task,
        }
    }
}

/// Which column goes on the x axis, the other one splits the rows into series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    /// One series per matrix size, thread count on the x axis
    VsThreads,
    /// One series per thread count, matrix size on the x axis
    VsSize,
}

impl ChartKind {
    pub const ALL: [ChartKind; 2] = [ChartKind::VsThreads, ChartKind::VsSize];

    fn group_key(&self, record: &BenchmarkRecord) -> u64 {
        match self {
            ChartKind::VsThreads => record.n,
            ChartKind::VsSize => record.num_threads,
        }
    }

    fn x(&self, record: &BenchmarkRecord) -> u64 {
        match self {
            ChartKind::VsThreads => record.num_threads,
            ChartKind::VsSize => record.n,
        }
    }

    fn series_label(&self, key: u64) -> String {
        match self {
            ChartKind::VsThreads => format!("Size {key}x{key}"),
            ChartKind::VsSize => format!("{key} Threads"),
        }
    }

    pub fn x_label(&self) -> &'static str {
        match self {
            ChartKind::VsThreads => "Number of Threads",
            ChartKind::VsSize => "Matrix Size (n = m = k)",
        }
    }

    pub fn title(&self, metric: Metric) -> String {
        match self {
            ChartKind::VsThreads => format!("{} vs Number of Threads", metric.label()),
            ChartKind::VsSize => format!("{} vs Matrix Size", metric.label()),
        }
    }

    pub fn file_stem(&self, metric: Metric) -> String {
        match self {
            ChartKind::VsThreads => format!("{}_vs_threads", metric.key()),
            ChartKind::VsSize => format!("{}_vs_size", metric.key()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub label: String,
    /// Sorted by x ascending. Points with x = 0 have no place on the log axis
    /// and are left out, the series itself still shows up in the legend.
    pub points: Vec<(f64, f64)>,
}

/// Everything needed to draw one chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub file_name: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Ordered by the grouping value ascending, which is also the legend order
    pub series: Vec<Series>,
}

pub fn build_chart(records: &[BenchmarkRecord], metric: Metric, kind: ChartKind) -> ChartSpec {
    let series = records
        .iter()
        .into_group_map_by(|record| kind.group_key(record))
        .into_iter()
        .sorted_by_key(|(key, _)| *key)
        .map(|(key, rows)| Series {
            label: kind.series_label(key),
            points: rows
                .into_iter()
                .map(|record| (kind.x(record), metric.value(record)))
                .filter(|(x, _)| *x > 0)
                .sorted_by_key(|(x, _)| *x)
                .map(|(x, y)| (x as f64, y))
                .collect(),
        })
        .collect();

    ChartSpec {
        file_name: format!("{}.png", kind.file_stem(metric)),
        title: kind.title(metric),
        x_label: kind.x_label().to_owned(),
        y_label: metric.label().to_owned(),
        series,
    }
}

/// All charts for a table, in the order they are written
pub fn build_charts(records: &[BenchmarkRecord]) -> Vec<ChartSpec> {
    Metric::ALL
        .into_iter()
        .flat_map(|metric| {
            ChartKind::ALL
                .into_iter()
                .map(move |kind| build_chart(records, metric, kind))
        })
        .collect()
}

/// Reads `csv_path` and writes the eight metric charts into `output_dir`
pub fn generate(csv_path: &Path, output_dir: &Path) -> Result<Vec<PathBuf>> {
    generate_with(&PlotConfig::with_paths(csv_path, output_dir))
}

/// Returns the paths of the written charts in the order they were written.
///
/// The input is fully loaded and validated before the output directory is
/// touched, so a bad CSV leaves the filesystem untouched.
pub fn generate_with(config: &PlotConfig) -> Result<Vec<PathBuf>> {
    let records = load_records(&config.input)?;
    let charts = build_charts(&records);

    fs::create_dir_all(&config.output_dir)
        .wrap_err_with(|| format!("Create output directory {:?}", config.output_dir))?;
    let plot_data_dir = config.output_dir.join("plot_data");
    if config.dump_plot_data {
        fs::create_dir_all(&plot_data_dir)
            .wrap_err_with(|| format!("Create plot data directory {plot_data_dir:?}"))?;
    }

    let mut written = Vec::with_capacity(charts.len());
    for chart in &charts {
        let path = config.output_dir.join(&chart.file_name);
        save_png(&path, chart, (config.width, config.height))?;
        debug!("Wrote {path:?} with {} series", chart.series.len());

        if config.dump_plot_data {
            let data_path = plot_data_dir.join(&chart.file_name).with_extension("json");
            fs::write(&data_path, serde_json::to_string(chart)?)
                .wrap_err_with(|| format!("Write plot data {data_path:?}"))?;
        }
        written.push(path);
    }

    info!(
        "Wrote {} charts from {} rows to {:?}",
        written.len(),
        records.len(),
        config.output_dir
    );
    Ok(written)
}

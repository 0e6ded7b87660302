use std::{fs, path::Path};

use common::{
    bench::DataError,
    config::PlotConfig,
    generate, generate_with,
    plot::{ChartSpec, Metric},
};
use tempfile::TempDir;

const HEADER: &str = "n,num_threads,speedup,efficiency,throughput,latency_per_task";

fn write_csv(dir: &Path, rows: &[&str]) -> std::path::PathBuf {
    let path = dir.join("benchmark_results.csv");
    let mut body = format!("{HEADER}\n");
    for row in rows {
        body.push_str(row);
        body.push('\n');
    }
    fs::write(&path, body).unwrap();
    path
}

fn sample_rows() -> Vec<&'static str> {
    vec![
        "256,4,3.1,0.775,31.0,0.032",
        "128,4,3.5,0.875,35.0,0.028",
        "128,8,6.0,0.75,60.0,0.016",
        "128,1,1.0,1.0,10.0,0.1",
        "256,1,1.0,1.0,8.0,0.125",
        "64,2,1.7,0.85,120.0,0.008",
    ]
}

fn png_names(dir: &Path) -> Vec<String> {
    let mut names = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".png"))
        .collect::<Vec<_>>();
    names.sort();
    names
}

#[test]
fn writes_eight_pngs_with_fixed_names() {
    let tmp = TempDir::new().unwrap();
    let csv = write_csv(tmp.path(), &sample_rows());
    let out = tmp.path().join("nested").join("graphs");

    let written = generate(&csv, &out).unwrap();
    assert_eq!(written.len(), 8);

    let mut expected = Metric::ALL
        .iter()
        .flat_map(|m| {
            [
                format!("{}_vs_threads.png", m.key()),
                format!("{}_vs_size.png", m.key()),
            ]
        })
        .collect::<Vec<_>>();
    expected.sort();
    assert_eq!(png_names(&out), expected);
    assert_eq!(fs::read_dir(&out).unwrap().count(), 8);

    for path in &written {
        let bytes = fs::read(path).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n", "{path:?}");
    }
}

#[test]
fn rerun_overwrites_and_keeps_chart_content() {
    let tmp = TempDir::new().unwrap();
    let csv = write_csv(tmp.path(), &sample_rows());
    let config = PlotConfig {
        dump_plot_data: true,
        ..PlotConfig::with_paths(&csv, tmp.path().join("graphs"))
    };

    let read_dump = || {
        Metric::ALL
            .iter()
            .map(|m| {
                let path = config
                    .output_dir
                    .join("plot_data")
                    .join(format!("{}_vs_size.json", m.key()));
                serde_json::from_str::<ChartSpec>(&fs::read_to_string(path).unwrap()).unwrap()
            })
            .collect::<Vec<_>>()
    };

    let first_paths = generate_with(&config).unwrap();
    let first = read_dump();
    let second_paths = generate_with(&config).unwrap();
    let second = read_dump();

    assert_eq!(first_paths, second_paths);
    assert_eq!(first, second);
    assert_eq!(png_names(&config.output_dir).len(), 8);

    let speedup = &first[0];
    let labels = speedup
        .series
        .iter()
        .map(|s| s.label.as_str())
        .collect::<Vec<_>>();
    assert_eq!(labels, ["1 Threads", "2 Threads", "4 Threads", "8 Threads"]);
    assert_eq!(speedup.series[2].points, vec![(128.0, 3.5), (256.0, 3.1)]);
}

#[test]
fn missing_column_fails_before_anything_is_written() {
    let tmp = TempDir::new().unwrap();
    let csv = tmp.path().join("benchmark_results.csv");
    fs::write(
        &csv,
        "num_threads,speedup,efficiency,throughput,latency_per_task\n4,3.5,0.875,35.0,0.028\n",
    )
    .unwrap();
    let out = tmp.path().join("graphs");

    let err = generate(&csv, &out).unwrap_err();
    let data_err = err.downcast_ref::<DataError>().unwrap();
    assert!(matches!(
        data_err,
        DataError::MissingColumn { column: "n", .. }
    ));
    assert!(!out.exists());
}

#[test]
fn missing_input_names_the_file() {
    let tmp = TempDir::new().unwrap();
    let csv = tmp.path().join("nope.csv");

    let err = generate(&csv, &tmp.path().join("graphs")).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DataError>(),
        Some(DataError::Open { .. })
    ));
    assert!(format!("{err}").contains("nope.csv"));
}

#[test]
fn single_row_table_still_produces_every_chart() {
    let tmp = TempDir::new().unwrap();
    let csv = write_csv(tmp.path(), &["512,8,7.0,0.875,70.0,0.014"]);
    let out = tmp.path().join("graphs");

    let written = generate(&csv, &out).unwrap();
    assert_eq!(written.len(), 8);
    assert_eq!(png_names(&out).len(), 8);
}

#[test]
fn header_only_table_writes_eight_empty_charts() {
    let tmp = TempDir::new().unwrap();
    let csv = write_csv(tmp.path(), &[]);
    let config = PlotConfig {
        dump_plot_data: true,
        ..PlotConfig::with_paths(&csv, tmp.path().join("graphs"))
    };

    let written = generate_with(&config).unwrap();
    assert_eq!(written.len(), 8);
    assert_eq!(png_names(&config.output_dir).len(), 8);

    let dump = fs::read_to_string(
        config
            .output_dir
            .join("plot_data")
            .join("speedup_vs_threads.json"),
    )
    .unwrap();
    let chart = serde_json::from_str::<ChartSpec>(&dump).unwrap();
    assert!(chart.series.is_empty());
}

#[test]
fn zero_thread_row_is_masked_not_rejected() {
    let tmp = TempDir::new().unwrap();
    let csv = write_csv(
        tmp.path(),
        &["128,0,1.0,1.0,10.0,0.1", "128,4,3.5,0.875,35.0,0.028"],
    );
    let config = PlotConfig {
        dump_plot_data: true,
        ..PlotConfig::with_paths(&csv, tmp.path().join("graphs"))
    };

    let written = generate_with(&config).unwrap();
    assert_eq!(written.len(), 8);
    assert_eq!(png_names(&config.output_dir).len(), 8);

    let dump = fs::read_to_string(
        config
            .output_dir
            .join("plot_data")
            .join("speedup_vs_threads.json"),
    )
    .unwrap();
    let chart = serde_json::from_str::<ChartSpec>(&dump).unwrap();
    assert_eq!(chart.series.len(), 1);
    assert_eq!(chart.series[0].points, vec![(4.0, 3.5)]);
}

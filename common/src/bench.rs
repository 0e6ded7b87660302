use std::{
    fs::File,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Columns that must be present in the header of a benchmark results file
pub const REQUIRED_COLUMNS: &[&str] = &[
    "n",
    "num_threads",
    "speedup",
    "efficiency",
    "throughput",
    "latency_per_task",
];

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Could not open benchmark results {path:?}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Could not read header of {path:?}: {source}")]
    Header { path: PathBuf, source: csv::Error },
    #[error("Missing column {column} in {path:?}")]
    MissingColumn { path: PathBuf, column: &'static str },
    #[error("Malformed row at line {line} of {path:?}: {source}")]
    Malformed {
        path: PathBuf,
        line: u64,
        source: csv::Error,
    },
    #[error("Value of {column} at line {line} is not finite")]
    NonFinite { line: u64, column: &'static str },
}

/// One row of the matrix multiplication benchmark results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    /// Matrix dimension, all three of n, m and k
    pub n: u64,
    pub num_threads: u64,
    pub speedup: f64,
    pub efficiency: f64,
    pub throughput: f64,
    pub latency_per_task: f64,
}

impl BenchmarkRecord {
    fn validate(&self, line: u64) -> Result<(), DataError> {
        for (column, value) in [
            ("speedup", self.speedup),
            ("efficiency", self.efficiency),
            ("throughput", self.throughput),
            ("latency_per_task", self.latency_per_task),
        ] {
            if !value.is_finite() {
                return Err(DataError::NonFinite { line, column });
            }
        }
        Ok(())
    }
}

/// Reads every row of a benchmark results CSV.
///
/// The header is checked for [`REQUIRED_COLUMNS`] before any row is parsed,
/// extra columns are ignored.
pub fn load_records(path: &Path) -> Result<Vec<BenchmarkRecord>, DataError> {
    let file = File::open(path).map_err(|source| DataError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    read_records(file, path)
}

fn read_records<R: std::io::Read>(
    reader: R,
    path: &Path,
) -> Result<Vec<BenchmarkRecord>, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers().map_err(|source| DataError::Header {
        path: path.to_path_buf(),
        source,
    })?;
    if let Some(column) = REQUIRED_COLUMNS
        .iter()
        .copied()
        .find(|column| !headers.iter().any(|h| h == *column))
    {
        return Err(DataError::MissingColumn {
            path: path.to_path_buf(),
            column,
        });
    }

    let mut records = Vec::new();
    for (idx, row) in reader.deserialize::<BenchmarkRecord>().enumerate() {
        // header is line 1
        let line = idx as u64 + 2;
        let record = row.map_err(|source| DataError::Malformed {
            path: path.to_path_buf(),
            line,
            source,
        })?;
        record.validate(line)?;
        records.push(record);
    }

    debug!("Loaded {} benchmark rows from {path:?}", records.len());
    Ok(records)
}

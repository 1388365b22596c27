//! Error types for device-table loading and analysis.
//!
//! Loading and validation failures are fatal: commands surface them through
//! `anyhow` and abort the run. [`AnalysisError::InsufficientData`] is the one
//! recoverable case; the pipeline catches it and degrades to an unclustered
//! report instead of failing.

use std::path::PathBuf;
use thiserror::Error;

/// Failures raised while loading or analyzing a device table.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The input table could not be opened at all.
    #[error("device table not found or unreadable: {}", path.display())]
    MissingInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input table header lacks a column the pipeline needs.
    #[error("device table {} is missing required column '{column}'", path.display())]
    MissingColumn { path: PathBuf, column: String },

    /// A data row failed to parse as a device record.
    #[error("malformed device record at {}:{line}", path.display())]
    InvalidRecord {
        path: PathBuf,
        line: u64,
        #[source]
        source: csv::Error,
    },

    /// Too few suspicious records to form the requested clusters.
    #[error("{records} suspicious records cannot fill {clusters} clusters")]
    InsufficientData { records: usize, clusters: usize },
}

impl AnalysisError {
    /// True for errors the pipeline recovers from by skipping clustering.
    #[allow(dead_code)]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AnalysisError::InsufficientData { .. })
    }
}

//! End-to-end pipeline: generate telemetry if needed, then analyze it.
//!
//! Convenience wrapper for demos and local testing. When the device
//! table is missing (or `--regenerate` is passed) a synthetic table is
//! written first with the same seed the clusterer uses, so a whole run
//! is reproducible from a single flag.
//!
//! # Usage
//!
//! ```bash
//! # First run generates data/device_data.csv, later runs reuse it
//! farm-audit run
//!
//! # Fresh table every time
//! farm-audit run --regenerate --devices 5000
//! ```

use crate::analysis::config::AnalysisConfig;
use crate::commands::{analyze, generate};
use anyhow::Result;
use std::path::Path;

pub fn run(
    table: &str,
    output_dir: &str,
    regenerate: bool,
    devices: usize,
    config: &AnalysisConfig,
    top: usize,
) -> Result<()> {
    if regenerate || !Path::new(table).exists() {
        if !regenerate {
            eprintln!("Device table {} not found; generating it", table);
        }
        generate::run(table, devices, config.seed)?;
        eprintln!();
    }

    analyze::run(table, output_dir, config, top)
}

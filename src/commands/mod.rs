//! Command implementations for device-farm fraud detection.
//!
//! Each module in this package implements one subcommand of the
//! `farm-audit` binary.
//!
//! ## Commands
//!
//! - [`analyze`] - Run the detection pipeline over a device table and
//!   write the result tables
//! - [`generate`] - Produce a synthetic device table with planted farms
//! - [`run`] - Generate a table when needed, then analyze it
//! - [`summary`] - Re-print the report from previously written result
//!   tables

pub mod analyze;
pub mod generate;
pub mod run;
pub mod summary;

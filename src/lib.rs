//! # Farm Audit Tools
//!
//! Command-line tools for detecting coordinated device farms in mobile
//! trading telemetry, with compressed table support and deterministic
//! clustering.
//!
//! ## Overview
//!
//! This crate analyzes batch exports of per-device telemetry (screen
//! time, trade frequency, trade amount, app switching) together with
//! network placement (IP, subnet). It flags devices packed into dense
//! subnets or stacked behind shared egress IPs, clusters their behavior
//! with k-means, splits the clusters into leader candidates and drones,
//! and confirms leaders by their IP churn. Farms operate many cheap
//! handsets behind few IPs, and their operators trade less often but in
//! larger amounts than the drone devices they script.
//!
//! ## Features
//!
//! - **Suspicion filter** - Dense-subnet and shared-IP screens over the
//!   raw device table
//! - **Behavioral clustering** - Seeded, restarted k-means over
//!   standardized features, identical output on every run
//! - **Role classification** - Leader-candidate and drone rules derived
//!   from cluster-level trading profiles
//! - **Leader confirmation** - Leader candidates are confirmed when the
//!   same IMEI appears on more than one IP
//! - **Group aggregation** - Per-IP group sizes and trading averages,
//!   largest groups first
//! - **Synthetic data generator** - Plants three farms with known
//!   leaders for end-to-end testing
//! - **Compressed table support** - Direct analysis of `.gz` and `.zst`
//!   device tables
//! - **Shell completion** for bash, zsh, fish, powershell, and elvish
//!
//! ## Architecture
//!
//! The crate is organized into several key modules:
//!
//! - [`telemetry`] - Device table parsing and result table I/O
//! - [`analysis`] - Suspicion filter, clusterer, role rules, group
//!   aggregation, and the pipeline that ties them together
//! - [`commands`] - Subcommand implementations
//! - [`utils`] - Shared utilities (formatting, progress, table readers)
//! - [`error`] - Typed analysis errors
//!
//! ## Example Usage
//!
//! ```bash
//! # Generate a synthetic table and analyze it in one step
//! farm-audit run
//!
//! # Analyze a production export
//! farm-audit analyze exports/device_data.csv.gz --output-dir results
//!
//! # Loosen thresholds for a small district export
//! farm-audit analyze district.csv --subnet-threshold 5 --clusters 2
//!
//! # Re-print the report from existing result tables
//! farm-audit summary --output-dir results --top 25
//! ```

pub mod analysis;
pub mod commands;
pub mod error;
pub mod telemetry;
pub mod utils;

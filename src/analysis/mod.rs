//! The detection pipeline: filter, cluster, classify, aggregate.
//!
//! [`pipeline::analyze_devices`] wires the stages together; each stage is
//! also usable on its own:
//!
//! - [`suspicion`] - dense-subnet and shared-IP filter
//! - [`cluster`] - standardization and seeded k-means
//! - [`roles`] - cluster profiles and fraud-role rules
//! - [`groups`] - per-IP group aggregation
//! - [`config`] - every tunable in one struct

pub mod cluster;
pub mod config;
pub mod groups;
pub mod pipeline;
pub mod roles;
pub mod suspicion;

//! Tunable thresholds and clustering controls for the pipeline.

use serde::{Deserialize, Serialize};

/// Every knob the pipeline reads, in one place.
///
/// Defaults mirror the production run: subnets turn dense above 20
/// observations, an IP counts as shared above 1, and flagged devices are
/// split into three behavior clusters seeded at 42 with ten restarts.
/// Commands override individual fields from CLI flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Observations per subnet above which the subnet is dense
    pub subnet_threshold: usize,
    /// Observations per IP above which the IP counts as shared
    pub ip_share_threshold: usize,
    /// Number of behavior clusters (k)
    pub clusters: usize,
    /// Base RNG seed; restart i derives seed + i
    pub seed: u64,
    /// Independent k-means restarts scored by inertia
    pub restarts: usize,
    /// Lloyd iteration cap per restart
    pub max_iterations: usize,
    /// Half-width of the drone trade-frequency band around the median
    /// cluster mean
    pub drone_freq_band: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            subnet_threshold: 20,
            ip_share_threshold: 1,
            clusters: 3,
            seed: 42,
            restarts: 10,
            max_iterations: 300,
            drone_freq_band: 2.0,
        }
    }
}

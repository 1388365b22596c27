//! Cluster profiling and fraud-role assignment.
//!
//! Roles are rule-based on top of the clustering: thresholds come from the
//! cluster-profile table, then each flagged device is labeled
//! individually. Aggregating over profile rows instead of raw devices
//! means every cluster weighs equally regardless of its size; that is the
//! production rule set, kept as is.

use crate::analysis::config::AnalysisConfig;
use crate::telemetry::types::{ClusterProfile, DeviceRecord, RoleLabel, FEATURE_COUNT};
use std::collections::{HashMap, HashSet};

/// Builds mean behavioral profiles for non-empty clusters, ordered by
/// cluster id. Empty clusters simply do not appear.
pub fn cluster_profiles(
    records: &[DeviceRecord],
    assignments: &[usize],
    clusters: usize,
) -> Vec<ClusterProfile> {
    let mut sums = vec![[0.0; FEATURE_COUNT]; clusters];
    let mut counts = vec![0usize; clusters];
    for (record, &cluster) in records.iter().zip(assignments) {
        counts[cluster] += 1;
        let features = record.features();
        for i in 0..FEATURE_COUNT {
            sums[cluster][i] += features[i];
        }
    }

    (0..clusters)
        .filter(|&cluster| counts[cluster] > 0)
        .map(|cluster| {
            let n = counts[cluster] as f64;
            ClusterProfile {
                cluster,
                devices: counts[cluster],
                screen_time: sums[cluster][0] / n,
                trade_freq: sums[cluster][1] / n,
                trade_amount: sums[cluster][2] / n,
                app_switches: sums[cluster][3] / n,
            }
        })
        .collect()
}

/// Role thresholds derived from the cluster-profile table.
#[derive(Debug, Clone, Copy)]
pub struct RoleThresholds {
    /// Mean of cluster-mean trade frequencies
    pub freq_mean: f64,
    /// Median of cluster-mean trade frequencies
    pub freq_median: f64,
    /// Mean of cluster-mean trade amounts
    pub amount_mean: f64,
}

/// Derives classification thresholds from cluster profiles.
pub fn role_thresholds(profiles: &[ClusterProfile]) -> RoleThresholds {
    let freqs: Vec<f64> = profiles.iter().map(|p| p.trade_freq).collect();
    let amounts: Vec<f64> = profiles.iter().map(|p| p.trade_amount).collect();
    RoleThresholds {
        freq_mean: mean(&freqs),
        freq_median: median(&freqs),
        amount_mean: mean(&amounts),
    }
}

/// Labels every flagged device against the derived thresholds.
pub fn classify_roles(
    records: &[DeviceRecord],
    thresholds: &RoleThresholds,
    config: &AnalysisConfig,
) -> Vec<RoleLabel> {
    records
        .iter()
        .map(|record| classify_device(record, thresholds, config))
        .collect()
}

fn classify_device(
    record: &DeviceRecord,
    thresholds: &RoleThresholds,
    config: &AnalysisConfig,
) -> RoleLabel {
    if record.trade_freq < thresholds.freq_mean && record.trade_amount > thresholds.amount_mean {
        RoleLabel::LeaderCandidate
    } else if (record.trade_freq - thresholds.freq_median).abs() < config.drone_freq_band
        && record.trade_amount < thresholds.amount_mean
    {
        RoleLabel::Drone
    } else {
        RoleLabel::Unclassified
    }
}

/// Distinct flagged IPs per imei. A leader candidate with spread over
/// more than one IP is a confirmed leader.
pub fn ip_diversity(records: &[DeviceRecord]) -> HashMap<String, usize> {
    let mut ips: HashMap<&str, HashSet<&str>> = HashMap::new();
    for record in records {
        ips.entry(record.imei.as_str())
            .or_default()
            .insert(record.ip.as_str());
    }
    ips.into_iter()
        .map(|(imei, set)| (imei.to_string(), set.len()))
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

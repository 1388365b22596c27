//! Suspicion filter: dense subnets and shared IPs.
//!
//! Device farms concentrate hardware behind a handful of /24 prefixes and
//! NAT many devices through single egress IPs. Both signals are cheap
//! counts over the raw table, and their union is the input to everything
//! downstream.

use crate::analysis::config::AnalysisConfig;
use crate::telemetry::types::DeviceRecord;
use std::collections::{HashMap, HashSet};

/// Outcome of the suspicion filter over one device table.
#[derive(Debug, Clone)]
pub struct SuspicionReport {
    /// Flagged observations, deduplicated by (imei, ip). Dense-subnet rows
    /// come first, then shared-IP rows not already present, each in table
    /// order.
    pub records: Vec<DeviceRecord>,
    /// Subnets with more observations than the threshold, sorted
    pub dense_subnets: Vec<String>,
    /// IPs carrying more observations than the threshold, sorted
    pub shared_ips: Vec<String>,
}

/// Flags every observation sitting in a dense subnet or on a shared IP.
///
/// Thresholds are strict: a subnet with exactly `subnet_threshold`
/// observations is not dense, an IP with exactly `ip_share_threshold`
/// is not shared.
pub fn flag_suspicious(records: &[DeviceRecord], config: &AnalysisConfig) -> SuspicionReport {
    let mut subnet_counts: HashMap<&str, usize> = HashMap::new();
    let mut ip_counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        *subnet_counts.entry(record.subnet.as_str()).or_insert(0) += 1;
        *ip_counts.entry(record.ip.as_str()).or_insert(0) += 1;
    }

    let dense: HashSet<&str> = subnet_counts
        .iter()
        .filter(|&(_, &count)| count > config.subnet_threshold)
        .map(|(&subnet, _)| subnet)
        .collect();
    let shared: HashSet<&str> = ip_counts
        .iter()
        .filter(|&(_, &count)| count > config.ip_share_threshold)
        .map(|(&ip, _)| ip)
        .collect();

    // Union of both signals. The same device observed twice on one IP is
    // the same evidence, so (imei, ip) pairs appear once.
    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let mut flagged = Vec::new();
    for record in records {
        if dense.contains(record.subnet.as_str()) && seen.insert(record.identity()) {
            flagged.push(record.clone());
        }
    }
    for record in records {
        if shared.contains(record.ip.as_str()) && seen.insert(record.identity()) {
            flagged.push(record.clone());
        }
    }

    let mut dense_subnets: Vec<String> = dense.into_iter().map(String::from).collect();
    dense_subnets.sort();
    let mut shared_ips: Vec<String> = shared.into_iter().map(String::from).collect();
    shared_ips.sort();

    SuspicionReport {
        records: flagged,
        dense_subnets,
        shared_ips,
    }
}

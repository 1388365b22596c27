//! End-to-end analysis over a loaded device table.
//!
//! Stages run in a fixed order: suspicion filter, behavioral clustering,
//! role classification, leader confirmation, group aggregation. The one
//! recoverable failure is a suspicious set too small to cluster; the run
//! then degrades to cluster -1 / UNCLASSIFIED for every flagged row and
//! the report says so.

use crate::analysis::cluster::cluster_records;
use crate::analysis::config::AnalysisConfig;
use crate::analysis::groups::summarize_groups;
use crate::analysis::roles::{classify_roles, cluster_profiles, ip_diversity, role_thresholds};
use crate::analysis::suspicion::flag_suspicious;
use crate::telemetry::types::{
    ClusterProfile, DeviceRecord, FlaggedDevice, GroupSummary, RoleLabel,
};

/// Everything one analysis run produces.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    /// Records in the input table
    pub input_records: usize,
    /// Flagged observations with cluster and role, filter order
    pub flagged: Vec<FlaggedDevice>,
    /// Confirmed leaders: LEADER_CANDIDATE rows with IP churn
    pub leaders: Vec<FlaggedDevice>,
    /// Per-IP groups, largest first
    pub groups: Vec<GroupSummary>,
    /// Mean profiles of non-empty clusters, by cluster id
    pub profiles: Vec<ClusterProfile>,
    /// Subnets the filter found dense, sorted
    pub dense_subnets: Vec<String>,
    /// IPs the filter found shared, sorted
    pub shared_ips: Vec<String>,
    /// True when the suspicious set was too small to cluster
    pub clustering_skipped: bool,
}

impl AnalysisReport {
    /// Flagged devices carrying the given role.
    pub fn role_count(&self, role: RoleLabel) -> usize {
        self.flagged
            .iter()
            .filter(|device| device.group_type == role)
            .count()
    }
}

/// Runs the full pipeline over an already-loaded table.
pub fn analyze_devices(records: &[DeviceRecord], config: &AnalysisConfig) -> AnalysisReport {
    let suspicion = flag_suspicious(records, config);
    let suspicious = suspicion.records;

    let (labels, clusters, profiles, skipped) = match cluster_records(&suspicious, config) {
        Ok(clustering) => {
            let profiles = cluster_profiles(&suspicious, &clustering.assignments, config.clusters);
            let thresholds = role_thresholds(&profiles);
            let labels = classify_roles(&suspicious, &thresholds, config);
            let clusters: Vec<i32> = clustering
                .assignments
                .iter()
                .map(|&cluster| cluster as i32)
                .collect();
            (labels, clusters, profiles, false)
        }
        // The only clustering failure is an undersized suspicious set
        Err(_) => (
            vec![RoleLabel::Unclassified; suspicious.len()],
            vec![-1; suspicious.len()],
            Vec::new(),
            true,
        ),
    };

    let spread = ip_diversity(&suspicious);
    let groups = summarize_groups(&suspicious);

    let flagged: Vec<FlaggedDevice> = suspicious
        .into_iter()
        .zip(clusters)
        .zip(labels)
        .map(|((record, cluster), group_type)| {
            let ip_count = spread.get(record.imei.as_str()).copied().unwrap_or(0);
            FlaggedDevice {
                record,
                cluster,
                group_type,
                ip_count,
            }
        })
        .collect();

    let leaders: Vec<FlaggedDevice> = flagged
        .iter()
        .filter(|device| device.is_confirmed_leader())
        .cloned()
        .collect();

    AnalysisReport {
        input_records: records.len(),
        flagged,
        leaders,
        groups,
        profiles,
        dense_subnets: suspicion.dense_subnets,
        shared_ips: suspicion.shared_ips,
        clustering_skipped: skipped,
    }
}

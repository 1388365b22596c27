//! Data structures representing device telemetry rows and analysis results.
//!
//! These types mirror the columns of exported device tables, enabling
//! typed deserialization with serde, plus the result rows the pipeline
//! writes back out.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of behavioral features per record.
pub const FEATURE_COUNT: usize = 4;

/// Behavioral feature columns fed to the clusterer, in model order.
#[allow(dead_code)]
pub const FEATURE_COLUMNS: [&str; FEATURE_COUNT] =
    ["screen_time", "trade_freq", "trade_amount", "app_switches"];

/// Columns every device table must provide.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "imei",
    "ip",
    "subnet",
    "screen_time",
    "trade_freq",
    "trade_amount",
    "app_switches",
];

/// One observation of a device in a telemetry export.
///
/// A device (imei) can appear multiple times, typically under different
/// IPs. Tables may carry extra columns (a generator's ground-truth `role`,
/// for example); the loader ignores anything not listed in
/// [`REQUIRED_COLUMNS`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DeviceRecord {
    /// Device hardware identifier
    pub imei: String,
    /// IP address the device was observed on
    pub ip: String,
    /// /24 prefix of the IP, as exported (e.g. "192.168.1")
    pub subnet: String,
    /// Daily screen-on time in hours
    pub screen_time: f64,
    /// Trades per day
    pub trade_freq: f64,
    /// Average trade amount
    pub trade_amount: f64,
    /// App foreground switches per day
    pub app_switches: f64,
}

impl DeviceRecord {
    /// Behavioral features in [`FEATURE_COLUMNS`] order.
    pub fn features(&self) -> [f64; FEATURE_COUNT] {
        [
            self.screen_time,
            self.trade_freq,
            self.trade_amount,
            self.app_switches,
        ]
    }

    /// Identity key for deduplication: one device seen on one IP.
    pub fn identity(&self) -> (&str, &str) {
        (&self.imei, &self.ip)
    }
}

/// Fraud role assigned to a flagged device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum RoleLabel {
    /// Low trade frequency but high amounts: likely directing the farm
    #[serde(rename = "LEADER_CANDIDATE")]
    LeaderCandidate,
    /// Trade frequency near the norm with low amounts: volume worker
    #[serde(rename = "DRONE")]
    Drone,
    /// Flagged but matching neither role rule
    #[serde(rename = "UNCLASSIFIED")]
    Unclassified,
}

impl RoleLabel {
    /// Wire string written to result tables.
    pub const fn as_str(self) -> &'static str {
        match self {
            RoleLabel::LeaderCandidate => "LEADER_CANDIDATE",
            RoleLabel::Drone => "DRONE",
            RoleLabel::Unclassified => "UNCLASSIFIED",
        }
    }

    /// Parses a wire string back into a label.
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "LEADER_CANDIDATE" => Some(RoleLabel::LeaderCandidate),
            "DRONE" => Some(RoleLabel::Drone),
            "UNCLASSIFIED" => Some(RoleLabel::Unclassified),
            _ => None,
        }
    }
}

impl fmt::Display for RoleLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A suspicious observation with its cluster assignment and role.
#[derive(Debug, Clone, PartialEq)]
pub struct FlaggedDevice {
    pub record: DeviceRecord,
    /// Cluster index, or -1 when clustering was skipped
    pub cluster: i32,
    pub group_type: RoleLabel,
    /// Distinct IPs this imei was flagged under
    pub ip_count: usize,
}

impl FlaggedDevice {
    /// A leader candidate is confirmed once it shows IP churn.
    pub fn is_confirmed_leader(&self) -> bool {
        self.group_type == RoleLabel::LeaderCandidate && self.ip_count > 1
    }
}

/// Mean behavioral profile of one cluster over its members.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterProfile {
    pub cluster: usize,
    /// Flagged devices assigned to this cluster
    pub devices: usize,
    pub screen_time: f64,
    pub trade_freq: f64,
    pub trade_amount: f64,
    pub app_switches: f64,
}

impl ClusterProfile {
    /// Profile means in [`FEATURE_COLUMNS`] order.
    #[allow(dead_code)]
    pub fn features(&self) -> [f64; FEATURE_COUNT] {
        [
            self.screen_time,
            self.trade_freq,
            self.trade_amount,
            self.app_switches,
        ]
    }
}

/// Per-IP aggregate over the suspicious set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub ip: String,
    /// Mean trades per day across the group
    pub trade_freq: f64,
    /// Mean trade amount across the group
    pub trade_amount: f64,
    /// Flagged observations on this IP
    pub group_size: usize,
}

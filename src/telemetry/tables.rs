//! Result-table writers and readers.
//!
//! The pipeline persists three CSV tables per run:
//!
//! - `suspicious_devices.csv` - every flagged observation with cluster and role
//! - `group_leaders.csv` - confirmed leaders (same columns)
//! - `group_analysis.csv` - per-IP group aggregates
//!
//! Writers emit explicit headers and stringified rows; readers rebuild the
//! typed rows so `summary` and tests can consume a previous run unchanged.

use crate::telemetry::types::{DeviceRecord, FlaggedDevice, GroupSummary, RoleLabel};
use crate::utils::reader::open_table;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::path::Path;

/// File name for the flagged-device table.
pub const SUSPICIOUS_DEVICES_FILE: &str = "suspicious_devices.csv";
/// File name for the confirmed-leader table.
pub const GROUP_LEADERS_FILE: &str = "group_leaders.csv";
/// File name for the per-IP group table.
pub const GROUP_ANALYSIS_FILE: &str = "group_analysis.csv";

const FLAGGED_HEADER: [&str; 10] = [
    "imei",
    "ip",
    "subnet",
    "screen_time",
    "trade_freq",
    "trade_amount",
    "app_switches",
    "cluster",
    "group_type",
    "ip_count",
];

const GROUP_HEADER: [&str; 4] = ["ip", "trade_freq", "trade_amount", "group_size"];

/// Writes flagged observations (used for both the suspicious-device and
/// leader tables, which share columns).
pub fn write_flagged_table(path: impl AsRef<Path>, rows: &[FlaggedDevice]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("Failed to create result table: {}", path.display()))?;
    let mut writer = csv::Writer::from_writer(file);

    writer.write_record(FLAGGED_HEADER)?;
    for row in rows {
        let record = &row.record;
        writer.write_record([
            record.imei.as_str(),
            record.ip.as_str(),
            record.subnet.as_str(),
            &record.screen_time.to_string(),
            &record.trade_freq.to_string(),
            &record.trade_amount.to_string(),
            &record.app_switches.to_string(),
            &row.cluster.to_string(),
            row.group_type.as_str(),
            &row.ip_count.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes the per-IP group table, preserving the order it was handed.
pub fn write_group_table(path: impl AsRef<Path>, groups: &[GroupSummary]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("Failed to create result table: {}", path.display()))?;
    let mut writer = csv::Writer::from_writer(file);

    writer.write_record(GROUP_HEADER)?;
    for group in groups {
        writer.write_record([
            group.ip.as_str(),
            &group.trade_freq.to_string(),
            &group.trade_amount.to_string(),
            &group.group_size.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

#[derive(Debug, Deserialize)]
struct FlaggedRow {
    imei: String,
    ip: String,
    subnet: String,
    screen_time: f64,
    trade_freq: f64,
    trade_amount: f64,
    app_switches: f64,
    cluster: i32,
    group_type: String,
    ip_count: usize,
}

/// Reads a flagged-device table back into typed rows.
pub fn read_flagged_table(path: impl AsRef<Path>) -> Result<Vec<FlaggedDevice>> {
    let path = path.as_ref();
    let reader = open_table(path)
        .with_context(|| format!("Failed to open result table: {}", path.display()))?;
    let mut csv_reader = csv::Reader::from_reader(reader);

    let mut rows = Vec::new();
    for row in csv_reader.deserialize() {
        let row: FlaggedRow =
            row.with_context(|| format!("Malformed row in {}", path.display()))?;
        let group_type = RoleLabel::parse(&row.group_type).ok_or_else(|| {
            anyhow!(
                "Unknown group_type '{}' in {}",
                row.group_type,
                path.display()
            )
        })?;
        rows.push(FlaggedDevice {
            record: DeviceRecord {
                imei: row.imei,
                ip: row.ip,
                subnet: row.subnet,
                screen_time: row.screen_time,
                trade_freq: row.trade_freq,
                trade_amount: row.trade_amount,
                app_switches: row.app_switches,
            },
            cluster: row.cluster,
            group_type,
            ip_count: row.ip_count,
        });
    }

    Ok(rows)
}

/// Reads a per-IP group table back into typed rows.
pub fn read_group_table(path: impl AsRef<Path>) -> Result<Vec<GroupSummary>> {
    let path = path.as_ref();
    let reader = open_table(path)
        .with_context(|| format!("Failed to open result table: {}", path.display()))?;
    let mut csv_reader = csv::Reader::from_reader(reader);

    let mut groups = Vec::new();
    for row in csv_reader.deserialize() {
        let group: GroupRow =
            row.with_context(|| format!("Malformed row in {}", path.display()))?;
        groups.push(GroupSummary {
            ip: group.ip,
            trade_freq: group.trade_freq,
            trade_amount: group.trade_amount,
            group_size: group.group_size,
        });
    }

    Ok(groups)
}

#[derive(Debug, Deserialize)]
struct GroupRow {
    ip: String,
    trade_freq: f64,
    trade_amount: f64,
    group_size: usize,
}

//! Re-reads result tables from an earlier analysis and prints a report.
//!
//! Useful when the tables were produced on another machine or an
//! earlier run and only the printed view is needed. Reads the three
//! CSV tables back, no re-analysis happens.
//!
//! # Usage
//!
//! ```bash
//! farm-audit summary
//! farm-audit summary --output-dir results/2026-08-21 --top 25
//! ```

use crate::telemetry::tables::{
    read_flagged_table, read_group_table, GROUP_ANALYSIS_FILE, GROUP_LEADERS_FILE,
    SUSPICIOUS_DEVICES_FILE,
};
use crate::telemetry::types::{FlaggedDevice, RoleLabel};
use crate::utils::format::{format_amount, format_number};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

pub fn run(output_dir: &str, top: usize) -> Result<()> {
    let output_dir = Path::new(output_dir);

    let flagged_path = output_dir.join(SUSPICIOUS_DEVICES_FILE);
    let flagged = read_flagged_table(&flagged_path)
        .with_context(|| format!("Failed to read {}", flagged_path.display()))?;
    let leaders_path = output_dir.join(GROUP_LEADERS_FILE);
    let leaders = read_flagged_table(&leaders_path)
        .with_context(|| format!("Failed to read {}", leaders_path.display()))?;
    let groups_path = output_dir.join(GROUP_ANALYSIS_FILE);
    let groups = read_group_table(&groups_path)
        .with_context(|| format!("Failed to read {}", groups_path.display()))?;

    println!("\n{}", "=".repeat(80));
    println!("Device Farm Analysis Summary");
    println!("{}", "=".repeat(80));
    println!("\nResults directory:  {}", output_dir.display());
    println!("Suspicious devices: {}", format_number(flagged.len()));

    println!("\nRole breakdown:");
    for role in [
        RoleLabel::LeaderCandidate,
        RoleLabel::Drone,
        RoleLabel::Unclassified,
    ] {
        let count = flagged.iter().filter(|d| d.group_type == role).count();
        println!("  {:<17} {}", role.as_str(), format_number(count));
    }

    let clusters = cluster_sizes(&flagged);
    if !clusters.is_empty() {
        println!("\nCluster sizes:");
        for (cluster, count) in &clusters {
            if *cluster < 0 {
                println!("  {:<10} {}", "unassigned", format_number(*count));
            } else {
                println!("  cluster {:<2} {}", cluster, format_number(*count));
            }
        }
    }

    println!(
        "\nConfirmed group leaders: {}",
        format_number(leaders.len())
    );
    if !leaders.is_empty() {
        println!("{}", "-".repeat(80));
        println!(
            "{:<17} {:<16} {:>8} {:>11} {:>14}",
            "IMEI", "IP", "IPs Used", "Trade Freq", "Trade Amount"
        );
        println!("{}", "-".repeat(80));
        for leader in &leaders {
            println!(
                "{:<17} {:<16} {:>8} {:>11.2} {:>14}",
                leader.record.imei,
                leader.record.ip,
                leader.ip_count,
                leader.record.trade_freq,
                format_amount(leader.record.trade_amount)
            );
        }
    }

    if !groups.is_empty() {
        let shown = top.min(groups.len());
        println!("\nTop {} groups by size:", shown);
        println!("{}", "-".repeat(80));
        println!(
            "{:<16} {:>10} {:>12} {:>14}",
            "IP", "Devices", "Avg Freq", "Avg Amount"
        );
        println!("{}", "-".repeat(80));
        for group in groups.iter().take(top) {
            println!(
                "{:<16} {:>10} {:>12.2} {:>14}",
                group.ip,
                format_number(group.group_size),
                group.trade_freq,
                format_amount(group.trade_amount)
            );
        }
    }

    println!("\n{}", "=".repeat(80));
    Ok(())
}

/// Counts flagged devices per cluster, ordered by cluster id.
fn cluster_sizes(flagged: &[FlaggedDevice]) -> Vec<(i32, usize)> {
    let mut counts: HashMap<i32, usize> = HashMap::new();
    for device in flagged {
        *counts.entry(device.cluster).or_insert(0) += 1;
    }
    let mut sizes: Vec<(i32, usize)> = counts.into_iter().collect();
    sizes.sort_by_key(|&(cluster, _)| cluster);
    sizes
}

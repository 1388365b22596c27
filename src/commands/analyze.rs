//! Device-table fraud analysis.
//!
//! Loads a telemetry table, runs the full detection pipeline (suspicion
//! filter, behavioral clustering, role classification, leader
//! confirmation, group aggregation) and writes the result tables plus a
//! JSON run summary.
//!
//! # Usage
//!
//! ```bash
//! # Analyze a table with production thresholds
//! farm-audit analyze data/device_data.csv
//!
//! # Compressed tables work unchanged
//! farm-audit analyze exports/device_data.csv.zst --output-dir results
//!
//! # Loosen the filter for a small district export
//! farm-audit analyze district.csv --subnet-threshold 5 --clusters 2
//! ```
//!
//! # Output
//!
//! Writes four files into the output directory:
//! - `suspicious_devices.csv` - every flagged observation with cluster and role
//! - `group_leaders.csv` - confirmed leaders (leader candidates with IP churn)
//! - `group_analysis.csv` - per-IP groups, largest first
//! - `analysis_summary.json` - run metadata, config echo, and tallies
//!
//! The printed report shows cluster profiles, role breakdown, confirmed
//! leaders, and the top groups by size.

use crate::analysis::config::AnalysisConfig;
use crate::analysis::pipeline::{analyze_devices, AnalysisReport};
use crate::analysis::roles::role_thresholds;
use crate::telemetry::loader::load_device_table;
use crate::telemetry::tables::{
    write_flagged_table, write_group_table, GROUP_ANALYSIS_FILE, GROUP_LEADERS_FILE,
    SUSPICIOUS_DEVICES_FILE,
};
use crate::telemetry::types::RoleLabel;
use crate::utils::format::{format_amount, format_number};
use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// File name for the JSON run summary.
pub const RUN_SUMMARY_FILE: &str = "analysis_summary.json";

/// Run metadata written next to the result tables.
#[derive(Debug, Serialize)]
struct RunSummary<'a> {
    generated_at: String,
    table: &'a str,
    config: &'a AnalysisConfig,
    input_records: usize,
    suspicious_devices: usize,
    dense_subnets: &'a [String],
    shared_ips: usize,
    clustering_skipped: bool,
    leader_candidates: usize,
    drones: usize,
    unclassified: usize,
    confirmed_leaders: usize,
    groups: usize,
}

pub fn run(table: &str, output_dir: &str, config: &AnalysisConfig, top: usize) -> Result<()> {
    eprintln!("Reading device table: {}", table);
    let records = load_device_table(table)?;
    eprintln!("Loaded {} device records", format_number(records.len()));

    let report = analyze_devices(&records, config);

    if report.flagged.is_empty() {
        eprintln!("[WARN] No suspicious devices found; result tables will be empty");
    } else if report.clustering_skipped {
        eprintln!(
            "[WARN] Only {} suspicious devices for {} clusters; skipping clustering",
            report.flagged.len(),
            config.clusters
        );
    }
    if !report.flagged.is_empty() && report.leaders.is_empty() {
        eprintln!("[WARN] No confirmed group leaders: no leader candidate shows IP churn");
    }

    let output_dir = Path::new(output_dir);
    std::fs::create_dir_all(output_dir).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            output_dir.display()
        )
    })?;

    write_flagged_table(output_dir.join(SUSPICIOUS_DEVICES_FILE), &report.flagged)?;
    write_flagged_table(output_dir.join(GROUP_LEADERS_FILE), &report.leaders)?;
    write_group_table(output_dir.join(GROUP_ANALYSIS_FILE), &report.groups)?;
    write_run_summary(output_dir, table, config, &report)?;

    print_report(&report, top);

    println!("\nDone. Results written to: {}", output_dir.display());
    Ok(())
}

fn write_run_summary(
    output_dir: &Path,
    table: &str,
    config: &AnalysisConfig,
    report: &AnalysisReport,
) -> Result<()> {
    let summary = RunSummary {
        generated_at: Utc::now().to_rfc3339(),
        table,
        config,
        input_records: report.input_records,
        suspicious_devices: report.flagged.len(),
        dense_subnets: &report.dense_subnets,
        shared_ips: report.shared_ips.len(),
        clustering_skipped: report.clustering_skipped,
        leader_candidates: report.role_count(RoleLabel::LeaderCandidate),
        drones: report.role_count(RoleLabel::Drone),
        unclassified: report.role_count(RoleLabel::Unclassified),
        confirmed_leaders: report.leaders.len(),
        groups: report.groups.len(),
    };

    let path = output_dir.join(RUN_SUMMARY_FILE);
    let file = File::create(&path)
        .with_context(|| format!("Failed to create run summary: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    let json =
        serde_json::to_string_pretty(&summary).context("Failed to serialize run summary")?;
    writer.write_all(json.as_bytes())?;
    writer.flush()?;

    Ok(())
}

/// Prints the human-readable report for one analysis run.
fn print_report(report: &AnalysisReport, top: usize) {
    println!("\n{}", "=".repeat(80));
    println!("Device Farm Analysis");
    println!("{}", "=".repeat(80));

    println!("\nInput records:      {}", format_number(report.input_records));
    println!("Suspicious devices: {}", format_number(report.flagged.len()));

    if !report.dense_subnets.is_empty() {
        println!("\nDense subnets ({}):", report.dense_subnets.len());
        for subnet in &report.dense_subnets {
            println!("  {}.0/24", subnet);
        }
    }
    if !report.shared_ips.is_empty() {
        println!("Shared IPs: {}", format_number(report.shared_ips.len()));
    }

    if !report.profiles.is_empty() {
        println!("\nCluster profiles (means over members):");
        println!("{}", "-".repeat(80));
        println!(
            "{:>7} {:>8} {:>12} {:>11} {:>14} {:>12}",
            "Cluster", "Devices", "Screen Time", "Trade Freq", "Trade Amount", "App Switches"
        );
        println!("{}", "-".repeat(80));
        for profile in &report.profiles {
            println!(
                "{:>7} {:>8} {:>12.2} {:>11.2} {:>14} {:>12.2}",
                profile.cluster,
                format_number(profile.devices),
                profile.screen_time,
                profile.trade_freq,
                format_amount(profile.trade_amount),
                profile.app_switches
            );
        }

        let thresholds = role_thresholds(&report.profiles);
        println!(
            "\nRole thresholds over cluster means: freq mean {:.2}, freq median {:.2}, amount mean {}",
            thresholds.freq_mean,
            thresholds.freq_median,
            format_amount(thresholds.amount_mean)
        );
    }

    println!("\nRole breakdown:");
    for role in [
        RoleLabel::LeaderCandidate,
        RoleLabel::Drone,
        RoleLabel::Unclassified,
    ] {
        println!(
            "  {:<17} {}",
            role.as_str(),
            format_number(report.role_count(role))
        );
    }

    println!(
        "\nConfirmed group leaders: {}",
        format_number(report.leaders.len())
    );
    if !report.leaders.is_empty() {
        println!("{}", "-".repeat(80));
        println!(
            "{:<17} {:<16} {:>8} {:>11} {:>14}",
            "IMEI", "IP", "IPs Used", "Trade Freq", "Trade Amount"
        );
        println!("{}", "-".repeat(80));
        for leader in &report.leaders {
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

    if !report.groups.is_empty() {
        let shown = top.min(report.groups.len());
        println!("\nTop {} groups by size:", shown);
        println!("{}", "-".repeat(80));
        println!(
            "{:<16} {:>10} {:>12} {:>14}",
            "IP", "Devices", "Avg Freq", "Avg Amount"
        );
        println!("{}", "-".repeat(80));
        for group in report.groups.iter().take(top) {
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
}

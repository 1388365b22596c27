//! Synthetic device-table generator.
//!
//! Builds a telemetry table with three known device farms plus diffuse
//! normal traffic, for demos and end-to-end testing. Every draw comes
//! from one seeded RNG, so a given seed always produces the same table.
//!
//! # Usage
//!
//! ```bash
//! # Default population: 1000 devices, seed 42
//! farm-audit generate --output data/device_data.csv
//!
//! # Smaller table with a different seed
//! farm-audit generate --output /tmp/devices.csv --devices 200 --seed 7
//! ```
//!
//! # Output
//!
//! A CSV table with every pipeline column plus a ground-truth `role`
//! column (`leader_group_N`, `drone_group_N`, `normal`) that the loader
//! ignores and tests verify against.
//!
//! Farm devices make up 70% of the population, split 40/35/25 across the
//! three farms. About 5% of each farm are leaders; a leader is observed
//! 2 to 4 times under distinct IPs from its farm's pool, so one device
//! showing IP churn is a real signal in generated data. Drones and
//! normal devices are observed once.

use crate::telemetry::types::DeviceRecord;
use crate::utils::format::format_number;
use crate::utils::progress::ProgressBar;
use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::path::Path;

struct FeatureRanges {
    screen_time: (f64, f64),
    trade_freq: (f64, f64),
    trade_amount: (f64, f64),
    app_switches: (f64, f64),
}

struct FarmProfile {
    subnet: &'static str,
    /// Egress IPs the farm rotates through
    ip_pool: usize,
    /// Percent of all farm devices
    share_percent: usize,
    leader: FeatureRanges,
    drone: FeatureRanges,
}

/// Three farms with distinct behavioral fingerprints. Leaders trade
/// rarely but big; drones grind small trades all day.
const FARMS: [FarmProfile; 3] = [
    FarmProfile {
        subnet: "192.168.1",
        ip_pool: 8,
        share_percent: 40,
        leader: FeatureRanges {
            screen_time: (0.3, 1.5),
            trade_freq: (1.0, 3.0),
            trade_amount: (8000.0, 15000.0),
            app_switches: (5.0, 20.0),
        },
        drone: FeatureRanges {
            screen_time: (4.0, 7.0),
            trade_freq: (10.0, 15.0),
            trade_amount: (100.0, 800.0),
            app_switches: (60.0, 90.0),
        },
    },
    FarmProfile {
        subnet: "172.16.10",
        ip_pool: 6,
        share_percent: 35,
        leader: FeatureRanges {
            screen_time: (0.5, 2.0),
            trade_freq: (2.0, 4.0),
            trade_amount: (10000.0, 20000.0),
            app_switches: (8.0, 25.0),
        },
        drone: FeatureRanges {
            screen_time: (3.0, 6.0),
            trade_freq: (8.0, 12.0),
            trade_amount: (200.0, 1000.0),
            app_switches: (50.0, 80.0),
        },
    },
    FarmProfile {
        subnet: "10.0.0",
        ip_pool: 4,
        share_percent: 25,
        leader: FeatureRanges {
            screen_time: (0.2, 1.0),
            trade_freq: (1.0, 2.0),
            trade_amount: (12000.0, 25000.0),
            app_switches: (10.0, 30.0),
        },
        drone: FeatureRanges {
            screen_time: (5.0, 8.0),
            trade_freq: (12.0, 18.0),
            trade_amount: (150.0, 600.0),
            app_switches: (70.0, 100.0),
        },
    },
];

/// Percent of the population belonging to farms.
const FARM_PERCENT: usize = 70;
/// Percent of each farm acting as leaders.
const LEADER_PERCENT: usize = 5;

pub fn run(output: &str, devices: usize, seed: u64) -> Result<()> {
    eprintln!(
        "Generating {} devices across {} farm subnets (seed {})",
        format_number(devices),
        FARMS.len(),
        seed
    );

    let rows = generate_rows(devices, seed);

    let leaders = rows.iter().filter(|(_, role)| role.starts_with("leader")).count();
    let drones = rows.iter().filter(|(_, role)| role.starts_with("drone")).count();
    let normal = rows.iter().filter(|(_, role)| role == "normal").count();

    if let Some(parent) = Path::new(output).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }

    eprintln!("Writing device table: {}", output);
    let file = File::create(output)
        .with_context(|| format!("Failed to create device table: {}", output))?;
    let mut writer = csv::Writer::from_writer(file);

    writer.write_record([
        "imei",
        "ip",
        "subnet",
        "screen_time",
        "trade_freq",
        "trade_amount",
        "app_switches",
        "role",
    ])?;

    let progress = ProgressBar::new(rows.len(), "Writing");
    for (record, role) in &rows {
        writer.write_record([
            record.imei.as_str(),
            record.ip.as_str(),
            record.subnet.as_str(),
            &record.screen_time.to_string(),
            &record.trade_freq.to_string(),
            &record.trade_amount.to_string(),
            &record.app_switches.to_string(),
            role,
        ])?;
        progress.inc();
    }
    writer.flush()?;
    progress.finish_with_message("Table written");

    println!(
        "Generated {} observations: {} leader, {} drone, {} normal",
        format_number(rows.len()),
        format_number(leaders),
        format_number(drones),
        format_number(normal)
    );
    println!("Device table written to: {}", output);

    Ok(())
}

/// Builds the full observation list. Farm rows come first (leaders, then
/// drones, per farm), then normal devices, matching how real exports
/// cluster by collection batch.
fn generate_rows(devices: usize, seed: u64) -> Vec<(DeviceRecord, String)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rows = Vec::with_capacity(devices + devices / 10);
    let farm_total = devices * FARM_PERCENT / 100;

    for (farm_index, farm) in FARMS.iter().enumerate() {
        let group = farm_index + 1;
        let pool = ip_pool(farm, &mut rng);

        let farm_devices = farm_total * farm.share_percent / 100;
        let leader_count = (farm_devices * LEADER_PERCENT / 100).max(1);
        let drone_count = farm_devices.saturating_sub(leader_count);

        for _ in 0..leader_count {
            let imei = random_imei(&mut rng);
            // Leaders rotate IPs; 2-4 observations under distinct pool IPs
            let observations = rng.gen_range(2..=4.min(pool.len()));
            let ips: Vec<&String> = pool.choose_multiple(&mut rng, observations).collect();
            for ip in ips {
                rows.push((
                    draw_record(&imei, ip, farm.subnet, &farm.leader, &mut rng),
                    format!("leader_group_{group}"),
                ));
            }
        }

        for _ in 0..drone_count {
            let imei = random_imei(&mut rng);
            let ip = pool
                .choose(&mut rng)
                .cloned()
                .unwrap_or_else(|| format!("{}.1", farm.subnet));
            rows.push((
                draw_record(&imei, &ip, farm.subnet, &farm.drone, &mut rng),
                format!("drone_group_{group}"),
            ));
        }
    }

    let placed: usize = FARMS
        .iter()
        .map(|farm| farm_total * farm.share_percent / 100)
        .sum();
    let normal_devices = devices.saturating_sub(placed);

    for _ in 0..normal_devices {
        let subnet = format!(
            "{}.{}.{}",
            rng.gen_range(1..=223),
            rng.gen_range(0..=255),
            rng.gen_range(0..=255)
        );
        let ip = format!("{}.{}", subnet, rng.gen_range(1..=254));
        let imei = random_imei(&mut rng);
        let ranges = FeatureRanges {
            screen_time: (1.0, 10.0),
            trade_freq: (0.5, 10.0),
            trade_amount: (50.0, 10000.0),
            app_switches: (20.0, 150.0),
        };
        rows.push((
            draw_record(&imei, &ip, &subnet, &ranges, &mut rng),
            "normal".to_string(),
        ));
    }

    rows
}

/// Distinct egress IPs for one farm, sampled from the subnet's host range.
fn ip_pool(farm: &FarmProfile, rng: &mut StdRng) -> Vec<String> {
    let octets: Vec<u16> = (1..=254).collect();
    octets
        .choose_multiple(rng, farm.ip_pool)
        .map(|octet| format!("{}.{}", farm.subnet, octet))
        .collect()
}

fn random_imei(rng: &mut StdRng) -> String {
    (0..15).map(|_| char::from(b'0' + rng.gen_range(0..10))).collect()
}

fn draw_record(
    imei: &str,
    ip: &str,
    subnet: &str,
    ranges: &FeatureRanges,
    rng: &mut StdRng,
) -> DeviceRecord {
    DeviceRecord {
        imei: imei.to_string(),
        ip: ip.to_string(),
        subnet: subnet.to_string(),
        screen_time: rng.gen_range(ranges.screen_time.0..ranges.screen_time.1),
        trade_freq: rng.gen_range(ranges.trade_freq.0..ranges.trade_freq.1),
        trade_amount: rng.gen_range(ranges.trade_amount.0..ranges.trade_amount.1),
        app_switches: rng.gen_range(ranges.app_switches.0..ranges.app_switches.1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    #[test]
    fn test_generation_is_deterministic() {
        let first = generate_rows(300, 42);
        let second = generate_rows(300, 42);
        assert_eq!(first.len(), second.len());
        for ((a, role_a), (b, role_b)) in first.iter().zip(&second) {
            assert_eq!(a, b);
            assert_eq!(role_a, role_b);
        }
    }

    #[test]
    fn test_seed_changes_table() {
        let first = generate_rows(300, 42);
        let second = generate_rows(300, 43);
        let first_imeis: Vec<&str> = first.iter().map(|(r, _)| r.imei.as_str()).collect();
        let second_imeis: Vec<&str> = second.iter().map(|(r, _)| r.imei.as_str()).collect();
        assert_ne!(first_imeis, second_imeis);
    }

    #[test]
    fn test_population_mix() {
        let devices = 1000;
        let rows = generate_rows(devices, 42);

        let normal = rows.iter().filter(|(_, role)| role == "normal").count();
        let drones = rows
            .iter()
            .filter(|(_, role)| role.starts_with("drone"))
            .count();
        let leader_rows = rows
            .iter()
            .filter(|(_, role)| role.starts_with("leader"))
            .count();

        // 280 + 245 + 175 farm devices, the remainder is normal traffic
        assert_eq!(normal, 300);
        let leader_devices: HashSet<&str> = rows
            .iter()
            .filter(|(_, role)| role.starts_with("leader"))
            .map(|(r, _)| r.imei.as_str())
            .collect();
        assert_eq!(leader_devices.len() + drones, 700);
        // Leaders are observed at least twice
        assert!(leader_rows >= leader_devices.len() * 2);
    }

    #[test]
    fn test_leaders_hop_across_distinct_ips() {
        let rows = generate_rows(500, 42);
        let mut leader_ips: HashMap<&str, HashSet<&str>> = HashMap::new();
        for (record, role) in &rows {
            if role.starts_with("leader") {
                leader_ips
                    .entry(record.imei.as_str())
                    .or_default()
                    .insert(record.ip.as_str());
            }
        }

        assert!(!leader_ips.is_empty());
        for ips in leader_ips.values() {
            assert!(ips.len() >= 2, "leader stuck on a single IP");
            assert!(ips.len() <= 4);
        }
    }

    #[test]
    fn test_farm_rows_stay_in_their_subnet() {
        let rows = generate_rows(400, 42);
        for (record, role) in &rows {
            if role.ends_with("group_1") {
                assert_eq!(record.subnet, "192.168.1");
                assert!(record.ip.starts_with("192.168.1."));
            } else if role.ends_with("group_2") {
                assert_eq!(record.subnet, "172.16.10");
            } else if role.ends_with("group_3") {
                assert_eq!(record.subnet, "10.0.0");
            }
        }
    }

    #[test]
    fn test_leader_features_match_their_band() {
        let rows = generate_rows(600, 42);
        for (record, role) in &rows {
            if role == "leader_group_1" {
                assert!(record.trade_freq >= 1.0 && record.trade_freq < 3.0);
                assert!(record.trade_amount >= 8000.0 && record.trade_amount < 15000.0);
            }
            if role == "drone_group_3" {
                assert!(record.trade_freq >= 12.0 && record.trade_freq < 18.0);
                assert!(record.trade_amount >= 150.0 && record.trade_amount < 600.0);
            }
        }
    }

    #[test]
    fn test_imeis_are_fifteen_digits() {
        let rows = generate_rows(100, 42);
        for (record, _) in &rows {
            assert_eq!(record.imei.len(), 15);
            assert!(record.imei.chars().all(|c| c.is_ascii_digit()));
        }
    }
}

//! Per-IP group aggregation over the suspicious set.

use crate::telemetry::types::{DeviceRecord, GroupSummary};
use std::collections::HashMap;

/// Aggregates flagged observations per IP, largest groups first.
///
/// `group_size` counts flagged observations; after the filter's
/// (imei, ip) dedup that equals the number of distinct devices on the IP.
pub fn summarize_groups(records: &[DeviceRecord]) -> Vec<GroupSummary> {
    let mut totals: HashMap<&str, (usize, f64, f64)> = HashMap::new();
    for record in records {
        let entry = totals.entry(record.ip.as_str()).or_insert((0, 0.0, 0.0));
        entry.0 += 1;
        entry.1 += record.trade_freq;
        entry.2 += record.trade_amount;
    }

    let mut groups: Vec<GroupSummary> = totals
        .into_iter()
        .map(|(ip, (size, freq_sum, amount_sum))| GroupSummary {
            ip: ip.to_string(),
            trade_freq: freq_sum / size as f64,
            trade_amount: amount_sum / size as f64,
            group_size: size,
        })
        .collect();

    // Largest first; the IP breaks ties so output order is stable
    groups.sort_by(|a, b| {
        b.group_size
            .cmp(&a.group_size)
            .then_with(|| a.ip.cmp(&b.ip))
    });
    groups
}

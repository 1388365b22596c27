//! Behavioral clustering: feature standardization plus seeded k-means.
//!
//! Flagged devices are clustered on their four behavioral features so the
//! role classifier can reason about cluster-level behavior instead of raw
//! rows. Every run is reproducible: restart `i` derives its own RNG from
//! `seed + i`, restarts fan out across rayon workers, and the winner is
//! selected after collection so scheduling never changes the result.

use crate::analysis::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::telemetry::types::{DeviceRecord, FEATURE_COUNT};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// Result of one clustering run over the suspicious set.
#[derive(Debug, Clone)]
pub struct Clustering {
    /// Cluster index per input record
    pub assignments: Vec<usize>,
    /// Final centroids in standardized feature space
    #[allow(dead_code)]
    pub centroids: Vec<[f64; FEATURE_COUNT]>,
    /// Sum of squared distances from each point to its centroid
    pub inertia: f64,
}

/// Standardizes feature rows to zero mean and unit variance per column.
///
/// Uses population variance. A constant column keeps scale 1.0 so it
/// contributes zero distance instead of NaNs.
pub fn standardize(rows: &[[f64; FEATURE_COUNT]]) -> Vec<[f64; FEATURE_COUNT]> {
    if rows.is_empty() {
        return Vec::new();
    }
    let n = rows.len() as f64;

    let mut means = [0.0; FEATURE_COUNT];
    for row in rows {
        for i in 0..FEATURE_COUNT {
            means[i] += row[i];
        }
    }
    for mean in &mut means {
        *mean /= n;
    }

    let mut scales = [0.0; FEATURE_COUNT];
    for row in rows {
        for i in 0..FEATURE_COUNT {
            let delta = row[i] - means[i];
            scales[i] += delta * delta;
        }
    }
    for scale in &mut scales {
        *scale = (*scale / n).sqrt();
        if *scale == 0.0 {
            *scale = 1.0;
        }
    }

    rows.iter()
        .map(|row| {
            let mut out = [0.0; FEATURE_COUNT];
            for i in 0..FEATURE_COUNT {
                out[i] = (row[i] - means[i]) / scales[i];
            }
            out
        })
        .collect()
}

/// Clusters flagged devices on standardized behavioral features.
///
/// Runs `config.restarts` independent k-means fits and keeps the one with
/// the lowest inertia; ties go to the earliest restart. Returns
/// [`AnalysisError::InsufficientData`] when the set cannot fill
/// `config.clusters` clusters, which callers treat as "skip clustering",
/// not as a failed run.
pub fn cluster_records(
    records: &[DeviceRecord],
    config: &AnalysisConfig,
) -> Result<Clustering, AnalysisError> {
    if config.clusters == 0 || records.len() < config.clusters {
        return Err(AnalysisError::InsufficientData {
            records: records.len(),
            clusters: config.clusters,
        });
    }

    let raw: Vec<[f64; FEATURE_COUNT]> = records.iter().map(DeviceRecord::features).collect();
    let points = standardize(&raw);
    let restarts = config.restarts.max(1);

    let runs: Vec<Clustering> = (0..restarts)
        .into_par_iter()
        .map(|restart| {
            let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(restart as u64));
            run_kmeans(&points, config.clusters, config.max_iterations, &mut rng)
        })
        .collect();

    // Strict < keeps the earliest restart on inertia ties, so the winner
    // is independent of worker scheduling
    let best = runs
        .into_iter()
        .reduce(|best, run| if run.inertia < best.inertia { run } else { best })
        .expect("at least one restart runs");

    Ok(best)
}

fn run_kmeans(
    points: &[[f64; FEATURE_COUNT]],
    k: usize,
    max_iterations: usize,
    rng: &mut StdRng,
) -> Clustering {
    let mut centroids = seed_centroids(points, k, rng);
    let mut assignments = assign_points(points, &centroids);

    for _ in 0..max_iterations {
        update_centroids(points, &assignments, &mut centroids);
        let refreshed = assign_points(points, &centroids);
        if refreshed == assignments {
            break;
        }
        assignments = refreshed;
    }

    let inertia = points
        .iter()
        .zip(&assignments)
        .map(|(point, &cluster)| squared_distance(point, &centroids[cluster]))
        .sum();

    Clustering {
        assignments,
        centroids,
        inertia,
    }
}

/// k-means++ seeding: later centroids are sampled proportional to their
/// squared distance from the nearest already-chosen centroid.
fn seed_centroids(
    points: &[[f64; FEATURE_COUNT]],
    k: usize,
    rng: &mut StdRng,
) -> Vec<[f64; FEATURE_COUNT]> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.gen_range(0..points.len())]);

    let mut nearest_sq: Vec<f64> = points
        .iter()
        .map(|point| squared_distance(point, &centroids[0]))
        .collect();

    while centroids.len() < k {
        let total: f64 = nearest_sq.iter().sum();
        let index = if total > 0.0 {
            let mut target = rng.gen::<f64>() * total;
            let mut chosen = points.len() - 1;
            for (i, &weight) in nearest_sq.iter().enumerate() {
                if target < weight {
                    chosen = i;
                    break;
                }
                target -= weight;
            }
            chosen
        } else {
            // Every point already coincides with a centroid
            rng.gen_range(0..points.len())
        };

        let centroid = points[index];
        for (i, point) in points.iter().enumerate() {
            let distance = squared_distance(point, &centroid);
            if distance < nearest_sq[i] {
                nearest_sq[i] = distance;
            }
        }
        centroids.push(centroid);
    }

    centroids
}

fn assign_points(
    points: &[[f64; FEATURE_COUNT]],
    centroids: &[[f64; FEATURE_COUNT]],
) -> Vec<usize> {
    points
        .iter()
        .map(|point| nearest_centroid(point, centroids))
        .collect()
}

/// Strict < resolves distance ties to the lowest cluster index.
fn nearest_centroid(point: &[f64; FEATURE_COUNT], centroids: &[[f64; FEATURE_COUNT]]) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (index, centroid) in centroids.iter().enumerate() {
        let distance = squared_distance(point, centroid);
        if distance < best_distance {
            best_distance = distance;
            best = index;
        }
    }
    best
}

fn update_centroids(
    points: &[[f64; FEATURE_COUNT]],
    assignments: &[usize],
    centroids: &mut [[f64; FEATURE_COUNT]],
) {
    let k = centroids.len();
    let mut sums = vec![[0.0; FEATURE_COUNT]; k];
    let mut counts = vec![0usize; k];
    for (point, &cluster) in points.iter().zip(assignments) {
        counts[cluster] += 1;
        for i in 0..FEATURE_COUNT {
            sums[cluster][i] += point[i];
        }
    }

    for cluster in 0..k {
        if counts[cluster] == 0 {
            // Relocate an empty cluster onto the point farthest from its
            // current centroid
            let relocation = farthest_point(points, assignments, centroids);
            centroids[cluster] = points[relocation];
        } else {
            for i in 0..FEATURE_COUNT {
                centroids[cluster][i] = sums[cluster][i] / counts[cluster] as f64;
            }
        }
    }
}

fn farthest_point(
    points: &[[f64; FEATURE_COUNT]],
    assignments: &[usize],
    centroids: &[[f64; FEATURE_COUNT]],
) -> usize {
    let mut farthest = 0;
    let mut farthest_distance = -1.0;
    for (index, (point, &cluster)) in points.iter().zip(assignments).enumerate() {
        let distance = squared_distance(point, &centroids[cluster]);
        if distance > farthest_distance {
            farthest_distance = distance;
            farthest = index;
        }
    }
    farthest
}

fn squared_distance(a: &[f64; FEATURE_COUNT], b: &[f64; FEATURE_COUNT]) -> f64 {
    let mut sum = 0.0;
    for i in 0..FEATURE_COUNT {
        let delta = a[i] - b[i];
        sum += delta * delta;
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(imei: &str, features: [f64; FEATURE_COUNT]) -> DeviceRecord {
        DeviceRecord {
            imei: imei.to_string(),
            ip: "10.0.0.1".to_string(),
            subnet: "10.0.0".to_string(),
            screen_time: features[0],
            trade_freq: features[1],
            trade_amount: features[2],
            app_switches: features[3],
        }
    }

    fn config(clusters: usize) -> AnalysisConfig {
        AnalysisConfig {
            clusters,
            restarts: 4,
            max_iterations: 100,
            ..AnalysisConfig::default()
        }
    }

    #[test]
    fn test_standardize_centers_and_scales() {
        let rows = vec![
            [1.0, 10.0, 100.0, 5.0],
            [3.0, 20.0, 100.0, 5.0],
            [5.0, 30.0, 100.0, 5.0],
        ];
        let scaled = standardize(&rows);

        for i in 0..FEATURE_COUNT {
            let mean: f64 = scaled.iter().map(|row| row[i]).sum::<f64>() / 3.0;
            assert!(mean.abs() < 1e-12);
        }
        // Constant columns collapse to zero rather than NaN
        for row in &scaled {
            assert_eq!(row[2], 0.0);
            assert_eq!(row[3], 0.0);
        }
        // Population std of [1, 3, 5] is sqrt(8/3)
        let expected = 2.0 / (8.0f64 / 3.0).sqrt();
        assert!((scaled[2][0] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_standardize_empty() {
        assert!(standardize(&[]).is_empty());
    }

    #[test]
    fn test_two_exact_blobs_split_cleanly() {
        // Zero spread within each blob: k-means++ cannot seed both
        // centroids in one blob, so the split is exact
        let mut records = Vec::new();
        for i in 0..4 {
            records.push(record(&format!("low{i}"), [2.0, 8.0, 15000.0, 30.0]));
        }
        for i in 0..4 {
            records.push(record(&format!("high{i}"), [22.0, 150.0, 50.0, 480.0]));
        }

        let clustering = cluster_records(&records, &config(2)).unwrap();
        assert!(clustering.inertia < 1e-18);
        let low = clustering.assignments[0];
        let high = clustering.assignments[4];
        assert_ne!(low, high);
        assert!(clustering.assignments[..4].iter().all(|&c| c == low));
        assert!(clustering.assignments[4..].iter().all(|&c| c == high));
    }

    #[test]
    fn test_jittered_blobs_stay_together() {
        let mut records = Vec::new();
        for i in 0..5 {
            let jitter = i as f64 * 0.1;
            records.push(record(
                &format!("low{i}"),
                [2.0 + jitter, 8.0 + jitter, 15000.0 + jitter, 30.0 + jitter],
            ));
        }
        for i in 0..5 {
            let jitter = i as f64 * 0.1;
            records.push(record(
                &format!("high{i}"),
                [22.0 + jitter, 150.0 + jitter, 50.0 + jitter, 480.0 + jitter],
            ));
        }

        let clustering = cluster_records(&records, &config(2)).unwrap();
        let low = clustering.assignments[0];
        let high = clustering.assignments[5];
        assert_ne!(low, high);
        assert!(clustering.assignments[..5].iter().all(|&c| c == low));
        assert!(clustering.assignments[5..].iter().all(|&c| c == high));
    }

    #[test]
    fn test_clustering_is_deterministic() {
        let records: Vec<DeviceRecord> = (0..30)
            .map(|i| {
                let f = i as f64;
                record(
                    &format!("dev{i}"),
                    [f % 7.0, f * 3.1, 10000.0 - f * 13.0, (f * f) % 97.0],
                )
            })
            .collect();

        let first = cluster_records(&records, &config(3)).unwrap();
        let second = cluster_records(&records, &config(3)).unwrap();
        assert_eq!(first.assignments, second.assignments);
        assert_eq!(first.inertia, second.inertia);
        assert_eq!(first.centroids, second.centroids);
    }

    #[test]
    fn test_single_cluster() {
        let records = vec![
            record("a", [1.0, 2.0, 3.0, 4.0]),
            record("b", [2.0, 3.0, 4.0, 5.0]),
            record("c", [9.0, 9.0, 9.0, 9.0]),
        ];

        let clustering = cluster_records(&records, &config(1)).unwrap();
        assert!(clustering.assignments.iter().all(|&c| c == 0));
        assert_eq!(clustering.centroids.len(), 1);
    }

    #[test]
    fn test_identical_points_do_not_panic() {
        let records: Vec<DeviceRecord> = (0..6)
            .map(|i| record(&format!("dup{i}"), [5.0, 5.0, 5.0, 5.0]))
            .collect();

        let clustering = cluster_records(&records, &config(2)).unwrap();
        assert!(clustering.inertia < 1e-18);
        assert_eq!(clustering.assignments.len(), 6);
    }

    #[test]
    fn test_insufficient_records() {
        let records = vec![
            record("a", [1.0, 2.0, 3.0, 4.0]),
            record("b", [2.0, 3.0, 4.0, 5.0]),
        ];

        let err = cluster_records(&records, &config(3)).unwrap_err();
        match err {
            AnalysisError::InsufficientData { records, clusters } => {
                assert_eq!(records, 2);
                assert_eq!(clusters, 3);
            }
            other => panic!("expected InsufficientData, got {other:?}"),
        }
    }

    #[test]
    fn test_exactly_k_records_cluster() {
        let records = vec![
            record("a", [0.0, 0.0, 0.0, 0.0]),
            record("b", [10.0, 10.0, 10.0, 10.0]),
            record("c", [20.0, 20.0, 20.0, 20.0]),
        ];

        let clustering = cluster_records(&records, &config(3)).unwrap();
        // Three distinct points into three clusters: perfect fit
        assert_eq!(clustering.inertia, 0.0);
        let mut sorted = clustering.assignments.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2]);
    }
}

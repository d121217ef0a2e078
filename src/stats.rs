use std::collections::HashSet;

use crate::candidates::Candidate;
use crate::settings::PlacedSensor;

/// Coverage percentages over the full sample set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverageStats {
    pub coverage_pct: f64,
    pub k_coverage_pct: f64,
}

/// `coverage_pct` is the fraction of samples seen by at least one selected
/// sensor; `k_coverage_pct` the fraction seen by at least `k_required`.
/// Zero samples yields zero percentages rather than dividing by zero.
pub fn compute_stats(
    candidates: &[Candidate],
    selected: &[usize],
    total_samples: usize,
    k_required: u32,
) -> CoverageStats {
    if total_samples == 0 {
        return CoverageStats {
            coverage_pct: 0.0,
            k_coverage_pct: 0.0,
        };
    }

    let mut cover_count = vec![0u32; total_samples];
    for &idx in selected {
        for &p in &candidates[idx].covered_points {
            cover_count[p] += 1;
        }
    }

    let covered = cover_count.iter().filter(|&&c| c >= 1).count();
    let k_covered = cover_count.iter().filter(|&&c| c >= k_required).count();

    CoverageStats {
        coverage_pct: covered as f64 / total_samples as f64,
        k_coverage_pct: k_covered as f64 / total_samples as f64,
    }
}

/// Deduplicates selected sensors by rounded `(x, z)` position (first
/// occurrence wins), then caps the list at `max_sensors`, appending a
/// warning if anything was dropped.
pub fn dedup_and_cap(
    positions: Vec<PlacedSensor>,
    max_sensors: usize,
    warnings: &mut Vec<String>,
) -> Vec<PlacedSensor> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for p in positions {
        let key = ((p.x * 10000.0).round() as i64, (p.z * 10000.0).round() as i64);
        if seen.insert(key) {
            out.push(p);
        }
    }
    if out.len() > max_sensors {
        out.truncate(max_sensors);
        warnings.push(format!(
            "selected sensor count exceeded max_sensors={}, truncated",
            max_sensors
        ));
    }
    out
}

use std::collections::HashMap;

use crate::candidates::Candidate;
use crate::sampler::SamplePoint;
use crate::settings::{PlannerSettings, SensorModel};
use crate::solver::{invert, requirement_vec};

/// Greedy, deterministic redundancy removal: iterates selected candidates
/// in ascending index order, tentatively drops each one, and commits the
/// drop if every original constraint still holds over the reduced set.
/// Single pass, no backtracking — running this twice is a fixed point.
pub fn prune(
    selected_indices: &[usize],
    candidates: &[Candidate],
    samples: &[SamplePoint],
    settings: &PlannerSettings,
) -> Vec<usize> {
    let total_n = samples.len();
    let by_sample = invert(candidates, total_n);
    let requirement = requirement_vec(settings, samples, &by_sample);

    let mut kept: Vec<usize> = selected_indices.to_vec();
    kept.sort_unstable();

    let mut cover_count = vec![0u32; total_n];
    for &idx in &kept {
        for &p in &candidates[idx].covered_points {
            cover_count[p] += 1;
        }
    }

    let mut i = 0;
    while i < kept.len() {
        let idx = kept[i];
        let mut trial = cover_count.clone();
        for &p in &candidates[idx].covered_points {
            trial[p] -= 1;
        }
        let still_satisfied = requirement
            .iter()
            .enumerate()
            .all(|(p, req)| req.map(|r| trial[p] >= r).unwrap_or(true));

        if still_satisfied {
            cover_count = trial;
            kept.remove(i);
        } else {
            i += 1;
        }
    }
    kept
}

fn pos_key(x: f64, z: f64) -> (i64, i64) {
    ((x * 10000.0).round() as i64, (z * 10000.0).round() as i64)
}

/// Picks the best yaw at each selected position by looking across *all*
/// candidate variants sharing that position (not just the selected one)
/// and choosing whichever has the largest coverage set; ties go to the
/// first-encountered variant. A no-op for dome/360 sensors, which have a
/// single fixed yaw per position.
pub fn refine_yaws(
    selected_indices: &[usize],
    all_candidates: &[Candidate],
    model: &SensorModel,
) -> Vec<f64> {
    if !model.needs_yaw_variants() {
        return selected_indices
            .iter()
            .map(|&i| all_candidates[i].yaw_deg)
            .collect();
    }

    let mut groups: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    for c in all_candidates {
        groups.entry(pos_key(c.x, c.z)).or_default().push(c.index);
    }

    selected_indices
        .iter()
        .map(|&sel_idx| {
            let sel = &all_candidates[sel_idx];
            let key = pos_key(sel.x, sel.z);
            let group = groups.get(&key).expect("candidate must belong to its own position group");
            let mut best_idx = group[0];
            let mut best_len = all_candidates[best_idx].covered_points.len();
            for &gi in group.iter().skip(1) {
                let len = all_candidates[gi].covered_points.len();
                if len > best_len {
                    best_len = len;
                    best_idx = gi;
                }
            }
            all_candidates[best_idx].yaw_deg
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::OverlapMode;

    fn candidate(index: usize, x: f64, z: f64, yaw: f64, covered: Vec<usize>) -> Candidate {
        Candidate {
            index,
            x,
            z,
            yaw_deg: yaw,
            covered_points: covered,
        }
    }

    fn sample(index: usize) -> SamplePoint {
        SamplePoint {
            index,
            x: index as f64,
            z: 0.0,
            is_critical: false,
        }
    }

    #[test]
    fn prune_drops_truly_redundant_candidate() {
        // both candidates cover sample 0 and 1, k=1 -> one is redundant
        let candidates = vec![
            candidate(0, 0.0, 0.0, 0.0, vec![0, 1]),
            candidate(1, 1.0, 0.0, 0.0, vec![0, 1]),
        ];
        let samples = vec![sample(0), sample(1)];
        let mut settings = PlannerSettings::default();
        settings.overlap_mode = OverlapMode::Everywhere;
        settings.k_required = 1;

        let pruned = prune(&[0, 1], &candidates, &samples, &settings);
        assert_eq!(pruned.len(), 1);
    }

    #[test]
    fn prune_keeps_candidates_required_for_k_coverage() {
        let candidates = vec![
            candidate(0, 0.0, 0.0, 0.0, vec![0, 1]),
            candidate(1, 1.0, 0.0, 0.0, vec![0, 1]),
        ];
        let samples = vec![sample(0), sample(1)];
        let mut settings = PlannerSettings::default();
        settings.overlap_mode = OverlapMode::Everywhere;
        settings.k_required = 2;

        let pruned = prune(&[0, 1], &candidates, &samples, &settings);
        assert_eq!(pruned.len(), 2);
    }

    #[test]
    fn prune_is_idempotent() {
        let candidates = vec![
            candidate(0, 0.0, 0.0, 0.0, vec![0, 1]),
            candidate(1, 1.0, 0.0, 0.0, vec![0, 1]),
            candidate(2, 2.0, 0.0, 0.0, vec![0]),
        ];
        let samples = vec![sample(0), sample(1)];
        let mut settings = PlannerSettings::default();
        settings.overlap_mode = OverlapMode::Everywhere;
        settings.k_required = 1;

        let once = prune(&[0, 1, 2], &candidates, &samples, &settings);
        let twice = prune(&once, &candidates, &samples, &settings);
        assert_eq!(once, twice);
    }

    #[test]
    fn yaw_refiner_picks_widest_coverage_variant_at_shared_position() {
        let candidates = vec![
            candidate(0, 0.0, 0.0, 0.0, vec![0]),
            candidate(1, 0.0, 0.0, 90.0, vec![0, 1, 2]),
        ];
        let model = SensorModel {
            hfov_deg: 90.0,
            vfov_deg: 60.0,
            range_m: 10.0,
            dome_mode: false,
        };
        let yaws = refine_yaws(&[0], &candidates, &model);
        assert_eq!(yaws, vec![90.0]);
    }

    #[test]
    fn yaw_refiner_is_noop_for_dome_sensors() {
        let candidates = vec![candidate(0, 0.0, 0.0, 0.0, vec![0])];
        let model = SensorModel {
            hfov_deg: 360.0,
            vfov_deg: 30.0,
            range_m: 10.0,
            dome_mode: true,
        };
        let yaws = refine_yaws(&[0], &candidates, &model);
        assert_eq!(yaws, vec![0.0]);
    }
}

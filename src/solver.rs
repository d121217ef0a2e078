use std::time::{Duration, Instant};

use rand::{rngs::SmallRng, seq::SliceRandom, SeedableRng};

use crate::candidates::Candidate;
use crate::sampler::SamplePoint;
use crate::settings::{OverlapMode, PlannerSettings};

/// Result of the k-coverage solve: which candidate indices were selected
/// and a CP-SAT-style status string ("OPTIMAL" | "FEASIBLE" | "INFEASIBLE").
pub struct SolveOutcome {
    pub selected: Vec<usize>,
    pub status: &'static str,
}

/// Per-sample requirement (minimum cover count), `None` for samples no
/// candidate can reach at all (uncoverable samples are excluded from
/// constraints rather than making the problem vacuously infeasible).
pub(crate) fn requirement_vec(
    settings: &PlannerSettings,
    samples: &[SamplePoint],
    by_sample: &[Vec<usize>],
) -> Vec<Option<u32>> {
    samples
        .iter()
        .map(|p| {
            if by_sample[p.index].is_empty() {
                return None;
            }
            let req = match settings.overlap_mode {
                OverlapMode::Everywhere => settings.k_required,
                OverlapMode::CriticalOnly => {
                    if p.is_critical {
                        settings.k_required
                    } else {
                        1
                    }
                }
                OverlapMode::PercentTarget => 1,
            };
            Some(req)
        })
        .collect()
}

pub(crate) fn invert(candidates: &[Candidate], n_samples: usize) -> Vec<Vec<usize>> {
    let mut by_sample = vec![Vec::new(); n_samples];
    for c in candidates {
        for &p in &c.covered_points {
            by_sample[p].push(c.index);
        }
    }
    by_sample
}

/// Greedy set cover: repeatedly selects the unselected candidate that
/// reduces the largest total remaining deficit (ties broken by ascending
/// candidate index, guaranteed by iterating `candidates` in index order
/// and only replacing the current best on a strictly greater reduction).
/// Returns false if some candidate pass makes no further progress while
/// deficit remains (infeasible).
fn greedy_construct(
    candidates: &[Candidate],
    requirement: &[Option<u32>],
    selected: &mut [bool],
    cover_count: &mut [u32],
) -> bool {
    loop {
        let total_deficit: i64 = requirement
            .iter()
            .enumerate()
            .filter_map(|(p, req)| req.map(|r| (r as i64 - cover_count[p] as i64).max(0)))
            .sum();
        if total_deficit == 0 {
            return true;
        }

        let mut best_idx: Option<usize> = None;
        let mut best_reduction: i64 = 0;
        for c in candidates {
            if selected[c.index] {
                continue;
            }
            let reduction: i64 = c
                .covered_points
                .iter()
                .filter(|&&p| {
                    requirement[p]
                        .map(|r| (r as i64 - cover_count[p] as i64) > 0)
                        .unwrap_or(false)
                })
                .count() as i64;
            if reduction > best_reduction {
                best_reduction = reduction;
                best_idx = Some(c.index);
            }
        }

        match best_idx {
            Some(idx) if best_reduction > 0 => {
                selected[idx] = true;
                for &p in &candidates[idx].covered_points {
                    cover_count[p] += 1;
                }
            }
            _ => return false,
        }
    }
}

/// `percent_target`'s extra requirement: at least `floor(overlap_target_pct
/// * total_n)` samples must reach `k_required` cover. `y_p` is derived
/// directly from the realized cover count rather than modeled as a free
/// variable (see DESIGN.md's Open Question 2 note) — it is true iff the
/// sample's current cover count already meets `k_required`.
fn percent_target_phase(
    candidates: &[Candidate],
    settings: &PlannerSettings,
    total_n: usize,
    selected: &mut [bool],
    cover_count: &mut [u32],
) -> bool {
    let target = (settings.overlap_target_pct * total_n as f64).floor() as usize;
    loop {
        let satisfied = cover_count
            .iter()
            .filter(|&&c| c >= settings.k_required)
            .count();
        if satisfied >= target {
            return true;
        }

        let mut best_idx: Option<usize> = None;
        let mut best_gain: i64 = 0;
        for c in candidates {
            if selected[c.index] {
                continue;
            }
            let gain = c
                .covered_points
                .iter()
                .filter(|&&p| cover_count[p] + 1 == settings.k_required)
                .count() as i64;
            if gain > best_gain {
                best_gain = gain;
                best_idx = Some(c.index);
            }
        }

        match best_idx {
            Some(idx) if best_gain > 0 => {
                selected[idx] = true;
                for &p in &candidates[idx].covered_points {
                    cover_count[p] += 1;
                }
            }
            _ => return false,
        }
    }
}

fn constraints_satisfied(
    settings: &PlannerSettings,
    requirement: &[Option<u32>],
    cover_count: &[u32],
    total_n: usize,
) -> bool {
    for (p, req) in requirement.iter().enumerate() {
        if let Some(r) = req {
            if cover_count[p] < *r {
                return false;
            }
        }
    }
    if settings.overlap_mode == OverlapMode::PercentTarget {
        let target = (settings.overlap_target_pct * total_n as f64).floor() as usize;
        let satisfied = cover_count
            .iter()
            .filter(|&&c| c >= settings.k_required)
            .count();
        if satisfied < target {
            return false;
        }
    }
    true
}

/// Time-boxed local search: repeatedly shuffles the currently selected
/// candidates (seeded, so deterministic for a fixed seed), tries removing
/// one at a time and reconstructing around the resulting deficit, and
/// keeps the change only if it strictly reduces the selected count.
/// Returns "OPTIMAL" if a full pass finds no further reduction before the
/// time budget runs out, "FEASIBLE" if the budget runs out first.
fn improve(
    candidates: &[Candidate],
    settings: &PlannerSettings,
    requirement: &[Option<u32>],
    total_n: usize,
    selected: &mut Vec<bool>,
    cover_count: &mut Vec<u32>,
) -> &'static str {
    let mut rng = SmallRng::seed_from_u64(settings.seed);
    let start = Instant::now();
    let limit = Duration::from_secs_f64(settings.solver_time_limit.max(0.0));

    loop {
        if start.elapsed() >= limit {
            return "FEASIBLE";
        }

        let mut order: Vec<usize> = (0..candidates.len()).filter(|&i| selected[i]).collect();
        order.shuffle(&mut rng);

        let mut improved_this_pass = false;

        for idx in order {
            if start.elapsed() >= limit {
                return "FEASIBLE";
            }

            let snapshot_selected = selected.clone();
            let snapshot_cover = cover_count.clone();
            let count_before = snapshot_selected.iter().filter(|&&s| s).count();

            selected[idx] = false;
            for &p in &candidates[idx].covered_points {
                cover_count[p] -= 1;
            }

            let primary_ok = greedy_construct(candidates, requirement, selected, cover_count);
            let feasible = primary_ok
                && (settings.overlap_mode != OverlapMode::PercentTarget
                    || percent_target_phase(candidates, settings, total_n, selected, cover_count));

            let count_after = selected.iter().filter(|&&s| s).count();

            if feasible
                && count_after < count_before
                && constraints_satisfied(settings, requirement, cover_count, total_n)
            {
                tracing::debug!(
                    candidate = idx,
                    before = count_before,
                    after = count_after,
                    "solver improve: accepted removal"
                );
                improved_this_pass = true;
            } else {
                tracing::debug!(candidate = idx, "solver improve: rejected removal");
                *selected = snapshot_selected;
                *cover_count = snapshot_cover;
            }
        }

        if !improved_this_pass {
            return "OPTIMAL";
        }
    }
}

/// Solves the k-coverage placement problem: selects the minimum-count
/// subset of candidates satisfying the overlap-mode constraints, within
/// `settings.solver_time_limit`. Deterministic for a fixed seed.
pub fn solve_k_coverage(
    candidates: &[Candidate],
    samples: &[SamplePoint],
    settings: &PlannerSettings,
) -> SolveOutcome {
    let total_n = samples.len();
    let by_sample = invert(candidates, total_n);
    let requirement = requirement_vec(settings, samples, &by_sample);

    let mut selected = vec![false; candidates.len()];
    let mut cover_count = vec![0u32; total_n];

    let primary_ok = greedy_construct(candidates, &requirement, &mut selected, &mut cover_count);
    let percent_ok = primary_ok
        && (settings.overlap_mode != OverlapMode::PercentTarget
            || percent_target_phase(candidates, settings, total_n, &mut selected, &mut cover_count));

    if !percent_ok {
        return SolveOutcome {
            selected: Vec::new(),
            status: "INFEASIBLE",
        };
    }

    let status = improve(
        candidates,
        settings,
        &requirement,
        total_n,
        &mut selected,
        &mut cover_count,
    );

    let selected_indices: Vec<usize> = selected
        .iter()
        .enumerate()
        .filter(|(_, &s)| s)
        .map(|(i, _)| i)
        .collect();

    SolveOutcome {
        selected: selected_indices,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate_covering(index: usize, covered: Vec<usize>) -> Candidate {
        Candidate {
            index,
            x: index as f64,
            z: 0.0,
            yaw_deg: 0.0,
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
    fn solves_trivial_everywhere_k1() {
        // one candidate covers both samples
        let candidates = vec![candidate_covering(0, vec![0, 1])];
        let samples = vec![sample(0), sample(1)];
        let mut settings = PlannerSettings::default();
        settings.k_required = 1;
        settings.overlap_mode = OverlapMode::Everywhere;
        settings.solver_time_limit = 0.0;

        let outcome = solve_k_coverage(&candidates, &samples, &settings);
        assert_eq!(outcome.selected, vec![0]);
        assert_ne!(outcome.status, "INFEASIBLE");
    }

    #[test]
    fn reports_infeasible_when_no_candidate_covers_a_required_sample() {
        let candidates = vec![candidate_covering(0, vec![0])];
        let samples = vec![sample(0), sample(1)];
        let mut settings = PlannerSettings::default();
        settings.k_required = 1;
        settings.overlap_mode = OverlapMode::Everywhere;

        // sample 1 has no covering candidate at all -> by_sample empty ->
        // requirement is None for it, so it's excluded and this is
        // actually feasible. Use k_required=2 on sample 0 with only one
        // covering candidate to force genuine infeasibility instead.
        settings.k_required = 2;
        let outcome = solve_k_coverage(&candidates, &samples, &settings);
        assert_eq!(outcome.status, "INFEASIBLE");
    }

    #[test]
    fn deterministic_for_fixed_seed() {
        let candidates = vec![
            candidate_covering(0, vec![0, 1]),
            candidate_covering(1, vec![1, 2]),
            candidate_covering(2, vec![0, 2]),
        ];
        let samples = vec![sample(0), sample(1), sample(2)];
        let mut settings = PlannerSettings::default();
        settings.k_required = 1;
        settings.overlap_mode = OverlapMode::Everywhere;
        settings.seed = 7;
        settings.solver_time_limit = 0.01;

        let a = solve_k_coverage(&candidates, &samples, &settings);
        let b = solve_k_coverage(&candidates, &samples, &settings);
        assert_eq!(a.selected, b.selected);
        assert_eq!(a.status, b.status);
    }

    #[test]
    fn percent_target_respects_target_fraction() {
        let candidates = vec![
            candidate_covering(0, vec![0, 1, 2, 3]),
            candidate_covering(1, vec![0, 1]),
        ];
        let samples = (0..4).map(sample).collect::<Vec<_>>();
        let mut settings = PlannerSettings::default();
        settings.overlap_mode = OverlapMode::PercentTarget;
        settings.k_required = 2;
        settings.overlap_target_pct = 0.5;
        settings.solver_time_limit = 0.01;

        let outcome = solve_k_coverage(&candidates, &samples, &settings);
        assert_ne!(outcome.status, "INFEASIBLE");
        assert!(outcome.selected.contains(&0));
        assert!(outcome.selected.contains(&1));
    }
}

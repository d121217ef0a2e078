pub mod candidates;
pub mod coverage;
pub mod error;
pub mod geometry;
pub mod occupancy;
pub mod refine;
pub mod sampler;
pub mod settings;
pub mod solver;
pub mod stats;

pub use error::PlacementError;
pub use settings::{
    OverlapMode, PlacedSensor, PlannerSettings, SensorModel, SolveRequest, SolveResponse,
};

use std::time::Instant;

use candidates::generate_candidates;
use coverage::build_coverage_sets;
use occupancy::OccupancyGrid;
use refine::{prune, refine_yaws};
use sampler::{mark_critical, obstacle_region, sample_points};
use solver::solve_k_coverage;
use stats::{compute_stats, dedup_and_cap};

fn solve_inner(request: &SolveRequest) -> Result<SolveResponse, PlacementError> {
    let mut warnings = Vec::new();

    if !geometry::is_valid_polygon(&request.roi_polygon) {
        return Err(PlacementError::InvalidRoi);
    }

    let obstacle_union = obstacle_region(&request.obstacles, &mut warnings);
    let mut samples = sample_points(
        &request.roi_polygon,
        request.settings.sample_spacing,
        request.settings.seed,
        &obstacle_union,
    );
    if samples.is_empty() {
        return Err(PlacementError::NoSamplePoints);
    }
    mark_critical(&mut samples, &request.critical_polygon);

    let mut candidates = generate_candidates(
        &request.roi_polygon,
        &request.obstacles,
        request.settings.candidate_spacing,
        request.settings.keepout_distance,
        &request.model,
        request.settings.yaw_step,
        &mut warnings,
    );
    if candidates.is_empty() {
        return Err(PlacementError::NoCandidates);
    }

    let r_eff = request.model.effective_radius(request.settings.mount_y);

    let grid: Option<OccupancyGrid> = if request.settings.los_enabled && !request.obstacles.is_empty()
    {
        OccupancyGrid::build(
            &request.roi_polygon,
            &request.obstacles,
            request.settings.los_cell,
            &mut warnings,
        )
    } else {
        None
    };

    build_coverage_sets(
        &mut candidates,
        &samples,
        &request.model,
        r_eff,
        request.settings.los_enabled,
        grid.as_ref(),
    );

    let mut effective_settings = request.settings;
    let mut outcome = solve_k_coverage(&candidates, &samples, &effective_settings);

    if outcome.status == "INFEASIBLE" {
        warnings.push(
            "solver infeasible under requested constraints, retrying with k_required=1 and overlap_mode=everywhere"
                .to_string(),
        );
        effective_settings.overlap_mode = OverlapMode::Everywhere;
        effective_settings.k_required = 1;
        outcome = solve_k_coverage(&candidates, &samples, &effective_settings);

        if outcome.status == "INFEASIBLE" {
            return Err(PlacementError::SolverFailed(outcome.status.to_string()));
        }
    }

    let pruned = prune(&outcome.selected, &candidates, &samples, &effective_settings);
    let yaws = refine_yaws(&pruned, &candidates, &request.model);

    let stats = compute_stats(
        &candidates,
        &pruned,
        samples.len(),
        request.settings.k_required,
    );

    let positions: Vec<PlacedSensor> = pruned
        .iter()
        .zip(yaws.iter())
        .map(|(&idx, &yaw)| PlacedSensor {
            x: candidates[idx].x,
            z: candidates[idx].z,
            yaw,
        })
        .collect();
    let positions = dedup_and_cap(positions, request.settings.max_sensors, &mut warnings);

    Ok(SolveResponse {
        success: true,
        num_sensors: positions.len(),
        selected_positions: positions,
        coverage_pct: stats.coverage_pct,
        k_coverage_pct: stats.k_coverage_pct,
        overlap_mode: request.settings.overlap_mode.as_str().to_string(),
        k_required: request.settings.k_required,
        warnings,
        seed: request.settings.seed,
        solver_status: outcome.status.to_string(),
        total_sample_points: samples.len(),
        total_candidates: candidates.len(),
        effective_radius_m: r_eff,
        error: None,
    })
}

/// Computes an optimal-or-near-optimal LiDAR sensor placement for the
/// given region, obstacles, and sensor model. Never panics on bad input:
/// invalid requests come back as `success: false` with a descriptive
/// `error`, same as a solver failure.
pub fn solve(request: &SolveRequest) -> SolveResponse {
    let start = Instant::now();
    tracing::info!(seed = request.settings.seed, "solve: starting");
    let result = match solve_inner(request) {
        Ok(response) => response,
        Err(err) => SolveResponse::failure(err.to_string(), request.settings.seed, Vec::new()),
    };
    tracing::info!(
        success = result.success,
        num_sensors = result.num_sensors,
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "solve: finished"
    );
    result
}

use crate::candidates::Candidate;
use crate::occupancy::OccupancyGrid;
use crate::sampler::SamplePoint;
use crate::settings::SensorModel;

/// Smallest unsigned angular difference between two angles in degrees,
/// in `[0, 180]`. Commutative and invariant under +-360 on either
/// argument.
pub fn smallest_angle_diff(a: f64, b: f64) -> f64 {
    ((a - b + 180.0).rem_euclid(360.0) - 180.0).abs()
}

/// Fills in `covered_points` for every candidate: for each candidate and
/// each sample, the sample's index is included iff range, FOV, and (if
/// enabled) line-of-sight all permit it. `covered_points` ends up sorted
/// ascending by construction (samples are iterated in index order).
pub fn build_coverage_sets(
    candidates: &mut [Candidate],
    samples: &[SamplePoint],
    model: &SensorModel,
    r_eff: f64,
    los_enabled: bool,
    grid: Option<&OccupancyGrid>,
) {
    use crate::geometry::Point;

    for c in candidates.iter_mut() {
        let mut covered = Vec::new();
        let c_pos = Point::new(c.x, c.z);
        for p in samples {
            let p_pos = Point::new(p.x, p.z);
            let dist = c_pos.dist(&p_pos);
            if dist > r_eff {
                continue;
            }
            if model.needs_yaw_variants() {
                let bearing = (p.z - c.z).atan2(p.x - c.x).to_degrees();
                if smallest_angle_diff(bearing, c.yaw_deg) > model.hfov_deg / 2.0 {
                    continue;
                }
            }
            if los_enabled {
                if let Some(grid) = grid {
                    if grid.blocked(c_pos, p_pos) {
                        continue;
                    }
                }
            }
            covered.push(p.index);
        }
        c.covered_points = covered;
    }
}

use crate::geometry::{bounding_box, contains, Point};
use crate::sampler::buffered_union;
use crate::settings::SensorModel;

/// A candidate sensor placement: a position plus one yaw angle. For
/// dome/360 sensors yaw is fixed at 0 and there is exactly one candidate
/// per position; for partial-FOV sensors one candidate is emitted per
/// discrete yaw in the configured yaw set.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub index: usize,
    pub x: f64,
    pub z: f64,
    pub yaw_deg: f64,
    pub covered_points: Vec<usize>,
}

/// Yaw angles to try at each candidate position: `{0}` for dome/360
/// sensors, otherwise `{0, yaw_step, 2*yaw_step, ...}` covering [0, 360).
pub fn yaw_set(model: &SensorModel, yaw_step: f64) -> Vec<f64> {
    if !model.needs_yaw_variants() {
        return vec![0.0];
    }
    let step = if yaw_step <= 0.0 { 30.0 } else { yaw_step };
    let mut yaws = Vec::new();
    let mut yaw = 0.0;
    while yaw < 360.0 {
        yaws.push(yaw);
        yaw += step;
    }
    if yaws.is_empty() {
        yaws.push(0.0);
    }
    yaws
}

/// Generates the candidate grid: positions on a `candidate_spacing` grid
/// inside the ROI and outside the keepout-buffered obstacle union, each
/// paired with every yaw in `yaw_set`. Candidates carry empty
/// `covered_points` until the coverage builder fills them in.
pub fn generate_candidates(
    roi: &[Point],
    obstacles: &[Vec<Point>],
    spacing: f64,
    keepout: f64,
    model: &SensorModel,
    yaw_step: f64,
    warnings: &mut Vec<String>,
) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    let Some(bbox) = bounding_box(roi) else {
        return candidates;
    };
    let forbidden = buffered_union(obstacles, keepout, warnings);
    let yaws = yaw_set(model, yaw_step);

    let x0 = bbox.min_x + spacing / 2.0;
    let z0 = bbox.min_z + spacing / 2.0;

    let mut x = x0;
    while x <= bbox.max_x {
        let mut z = z0;
        while z <= bbox.max_z {
            let p = Point::new(x, z);
            if contains(roi, p) && !forbidden.contains(p) {
                for &yaw in &yaws {
                    candidates.push(Candidate {
                        index: candidates.len(),
                        x,
                        z,
                        yaw_deg: yaw,
                        covered_points: Vec::new(),
                    });
                }
            }
            z += spacing;
        }
        x += spacing;
    }
    candidates
}

use rand::{rngs::SmallRng, Rng, SeedableRng};

use crate::geometry::{bounding_box, buffer, contains, is_valid_polygon, Point, Region};

/// A ground sample point the planner must try to cover.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    pub index: usize,
    pub x: f64,
    pub z: f64,
    pub is_critical: bool,
}

/// Builds the obstacle union region used by both the sampler and the
/// candidate generator, skipping degenerate polygons with a warning.
pub fn obstacle_region(obstacles: &[Vec<Point>], warnings: &mut Vec<String>) -> Region {
    let mut valid = Vec::new();
    for (i, poly) in obstacles.iter().enumerate() {
        if is_valid_polygon(poly) {
            valid.push(poly.clone());
        } else {
            warnings.push(format!(
                "obstacle {} has fewer than 3 distinct vertices, skipped",
                i
            ));
        }
    }
    if valid.is_empty() {
        Region::empty()
    } else {
        Region::union(valid)
    }
}

/// Jittered-grid sample points inside `roi` minus the obstacle region.
/// Deterministic for a fixed `(roi, spacing, seed, obstacles)`: scans
/// positions x-major then z-major, draws x-jitter then z-jitter per cell
/// from the seeded RNG, and assigns indices in acceptance order.
pub fn sample_points(
    roi: &[Point],
    spacing: f64,
    seed: u64,
    obstacles: &Region,
) -> Vec<SamplePoint> {
    let mut points = Vec::new();
    let Some(bbox) = bounding_box(roi) else {
        return points;
    };
    let mut rng = SmallRng::seed_from_u64(seed);

    let jitter = spacing * 0.25;
    let x0 = bbox.min_x + spacing / 2.0;
    let z0 = bbox.min_z + spacing / 2.0;

    let mut x = x0;
    while x <= bbox.max_x {
        let mut z = z0;
        while z <= bbox.max_z {
            let jx: f64 = rng.gen_range(-jitter..=jitter);
            let jz: f64 = rng.gen_range(-jitter..=jitter);
            let px = x + jx;
            let pz = z + jz;
            let p = Point::new(px, pz);
            if contains(roi, p) && !obstacles.contains(p) {
                points.push(SamplePoint {
                    index: points.len(),
                    x: px,
                    z: pz,
                    is_critical: false,
                });
            }
            z += spacing;
        }
        x += spacing;
    }
    points
}

/// Marks every sample point falling inside `critical_polygon` as critical.
/// Only meaningful in `critical_only` overlap mode; a no-op if the polygon
/// is absent or degenerate.
pub fn mark_critical(points: &mut [SamplePoint], critical_polygon: &[Point]) {
    if !is_valid_polygon(critical_polygon) {
        return;
    }
    for p in points.iter_mut() {
        if contains(critical_polygon, Point::new(p.x, p.z)) {
            p.is_critical = true;
        }
    }
}

/// Convenience re-export used by candidate generation, which buffers
/// obstacles by a keepout distance rather than using them raw.
pub fn buffered_union(obstacles: &[Vec<Point>], distance: f64, warnings: &mut Vec<String>) -> Region {
    let mut valid = Vec::new();
    for (i, poly) in obstacles.iter().enumerate() {
        if is_valid_polygon(poly) {
            valid.push(buffer(poly, distance));
        } else {
            warnings.push(format!(
                "obstacle {} has fewer than 3 distinct vertices, skipped",
                i
            ));
        }
    }
    if valid.is_empty() {
        Region::empty()
    } else {
        Region::union(valid)
    }
}

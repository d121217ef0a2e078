use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

// Floor-plane polygon primitives: everything below operates in the x/z
// floor plane used by the placement pipeline (y is the vertical axis and
// never appears here) — point-in-polygon, Minkowski buffering, and union.

/// A point in the floor plane, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub z: f64,
}

impl Point {
    pub const fn new(x: f64, z: f64) -> Self {
        Point { x, z }
    }

    pub fn dist(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.z - other.z).powi(2)).sqrt()
    }
}

/// A closed polygon: vertices in order, edges wrap last->first.
pub type Polygon = Vec<Point>;

/// Bounding box of a polygon, `None` if the polygon has no vertices.
#[derive(Debug, Clone, Copy)]
pub struct BBox {
    pub min_x: f64,
    pub min_z: f64,
    pub max_x: f64,
    pub max_z: f64,
}

pub fn bounding_box(polygon: &[Point]) -> Option<BBox> {
    let mut iter = polygon.iter();
    let first = iter.next()?;
    let mut bbox = BBox {
        min_x: first.x,
        min_z: first.z,
        max_x: first.x,
        max_z: first.z,
    };
    for p in iter {
        bbox.min_x = bbox.min_x.min(p.x);
        bbox.min_z = bbox.min_z.min(p.z);
        bbox.max_x = bbox.max_x.max(p.x);
        bbox.max_z = bbox.max_z.max(p.z);
    }
    Some(bbox)
}

/// A polygon is usable by the pipeline only if it has at least 3 distinct
/// vertices. Callers skip and warn on anything less, rather than aborting.
pub fn is_valid_polygon(polygon: &[Point]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    // at least 3 *distinct* vertices
    let mut distinct = 0usize;
    for (i, p) in polygon.iter().enumerate() {
        if !polygon[..i].iter().any(|q| q == p) {
            distinct += 1;
        }
    }
    distinct >= 3
}

/// Ray-casting point-in-polygon test. Points exactly on an edge have
/// unspecified but deterministic membership.
pub fn contains(polygon: &[Point], point: Point) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = polygon[i];
        let pj = polygon[j];
        let intersects = ((pi.z > point.z) != (pj.z > point.z))
            && (point.x < (pj.x - pi.x) * (point.z - pi.z) / (pj.z - pi.z) + pi.x);
        if intersects {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Number of points sampled per rounded arc when joining offset edges at a
/// convex corner during `buffer`.
const ARC_STEP_DEG: f64 = 15.0;

/// Inflates a polygon outward by `distance` (Minkowski sum with a disk of
/// that radius), implemented as an arc-joined offset polygon: each edge is
/// pushed outward along its normal, and consecutive offset edges are joined
/// by a circular arc around the shared original vertex so convex corners get
/// a rounded cap instead of a sharp miter.
pub fn buffer(polygon: &[Point], distance: f64) -> Polygon {
    let n = polygon.len();
    if n < 3 || distance <= 0.0 {
        return polygon.to_vec();
    }

    // signed area to detect winding; ray-casting `contains` above doesn't
    // care about winding, but normal direction (which side is "outward")
    // does.
    let signed_area: f64 = (0..n)
        .map(|i| {
            let a = polygon[i];
            let b = polygon[(i + 1) % n];
            a.x * b.z - b.x * a.z
        })
        .sum::<f64>()
        / 2.0;
    let ccw = signed_area > 0.0;

    let mut out = Vec::new();
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        let (nx, nz) = edge_outward_normal(a, b, ccw);
        let a_off = Point::new(a.x + nx * distance, a.z + nz * distance);
        let b_off = Point::new(b.x + nx * distance, b.z + nz * distance);

        if i > 0 {
            let prev = polygon[(i + n - 1) % n];
            let (pnx, pnz) = edge_outward_normal(prev, a, ccw);
            let prev_end = Point::new(a.x + pnx * distance, a.z + pnz * distance);
            out.extend(arc_points(a, prev_end, a_off, distance));
        }
        out.push(a_off);
        out.push(b_off);
    }
    // close the loop: arc between the last edge's end and the first edge's start
    let prev = polygon[n - 1];
    let first = polygon[0];
    let (pnx, pnz) = edge_outward_normal(prev, first, ccw);
    let prev_end = Point::new(first.x + pnx * distance, first.z + pnz * distance);
    let (fnx, fnz) = edge_outward_normal(first, polygon[1 % n], ccw);
    let first_start = Point::new(first.x + fnx * distance, first.z + fnz * distance);
    out.extend(arc_points(first, prev_end, first_start, distance));

    out
}

fn edge_outward_normal(a: Point, b: Point, ccw: bool) -> (f64, f64) {
    let dx = b.x - a.x;
    let dz = b.z - a.z;
    let len = (dx * dx + dz * dz).sqrt();
    if len < 1e-12 {
        return (0.0, 0.0);
    }
    // rotate the edge direction by -90deg for a CW polygon's outward normal,
    // +90deg for CCW, so "outward" always points away from the interior.
    if ccw {
        (dz / len, -dx / len)
    } else {
        (-dz / len, dx / len)
    }
}

/// Points along the arc from `start` to `end`, centered at `center`,
/// sampled every `ARC_STEP_DEG` degrees (excludes `start` to avoid
/// duplicating the previous edge's endpoint).
fn arc_points(center: Point, start: Point, end: Point, radius: f64) -> Vec<Point> {
    let a0 = (start.z - center.z).atan2(start.x - center.x);
    let mut a1 = (end.z - center.z).atan2(end.x - center.x);
    // walk the short way around from a0 to a1
    let mut diff = a1 - a0;
    while diff > PI {
        diff -= 2.0 * PI;
    }
    while diff < -PI {
        diff += 2.0 * PI;
    }
    a1 = a0 + diff;
    let _ = a1;

    let steps = (diff.abs() / ARC_STEP_DEG.to_radians()).ceil().max(1.0) as usize;
    let mut pts = Vec::with_capacity(steps);
    for i in 1..=steps {
        let t = i as f64 / steps as f64;
        let a = a0 + diff * t;
        pts.push(Point::new(
            center.x + radius * a.cos(),
            center.z + radius * a.sin(),
        ));
    }
    pts
}

/// A geometric union of possibly-overlapping polygons, as a membership
/// test rather than a materialized boundary: a point is inside the region
/// iff it is inside at least one member polygon.
pub struct Region {
    members: Vec<Polygon>,
}

impl Region {
    pub fn union(polygons: Vec<Polygon>) -> Self {
        Region { members: polygons }
    }

    pub fn empty() -> Self {
        Region { members: Vec::new() }
    }

    pub fn contains(&self, point: Point) -> bool {
        self.members.iter().any(|poly| contains(poly, point))
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod polygon_tests {
    use super::*;

    fn square(min: f64, max: f64) -> Polygon {
        vec![
            Point::new(min, min),
            Point::new(max, min),
            Point::new(max, max),
            Point::new(min, max),
        ]
    }

    #[test]
    fn contains_inside_and_outside() {
        let sq = square(0.0, 10.0);
        assert!(contains(&sq, Point::new(5.0, 5.0)));
        assert!(!contains(&sq, Point::new(15.0, 5.0)));
        assert!(!contains(&sq, Point::new(-1.0, 5.0)));
    }

    #[test]
    fn is_valid_polygon_rejects_degenerate() {
        assert!(!is_valid_polygon(&[]));
        assert!(!is_valid_polygon(&[Point::new(0.0, 0.0), Point::new(1.0, 0.0)]));
        assert!(!is_valid_polygon(&[
            Point::new(0.0, 0.0),
            Point::new(0.0, 0.0),
            Point::new(0.0, 0.0),
        ]));
        assert!(is_valid_polygon(&square(0.0, 1.0)));
    }

    #[test]
    fn buffer_grows_the_interior() {
        let sq = square(2.0, 8.0);
        let buffered = buffer(&sq, 1.0);
        // a point just outside the original square, within the buffer distance,
        // must now be contained.
        assert!(contains(&buffered, Point::new(1.5, 5.0)));
        // a point far outside the buffer distance must still be excluded.
        assert!(!contains(&buffered, Point::new(-5.0, 5.0)));
        // the original interior must remain contained.
        assert!(contains(&buffered, Point::new(5.0, 5.0)));
    }

    #[test]
    fn union_is_true_if_any_member_contains() {
        let a = square(0.0, 5.0);
        let b = square(10.0, 15.0);
        let region = Region::union(vec![a, b]);
        assert!(region.contains(Point::new(2.0, 2.0)));
        assert!(region.contains(Point::new(12.0, 12.0)));
        assert!(!region.contains(Point::new(7.0, 7.0)));
    }

    #[test]
    fn empty_region_contains_nothing() {
        let region = Region::empty();
        assert!(!region.contains(Point::new(0.0, 0.0)));
        assert!(region.is_empty());
    }
}

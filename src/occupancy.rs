use crate::geometry::{bounding_box, contains, is_valid_polygon, Point};

/// Boolean occupancy grid over the ROI bounding box, used only for
/// line-of-sight ray-marching. Built once, read-only.
pub struct OccupancyGrid {
    cells: Vec<Vec<bool>>,
    min_x: f64,
    min_z: f64,
    cell_size: f64,
    rows: usize,
    cols: usize,
}

impl OccupancyGrid {
    /// Rasterizes the valid obstacle polygons into a boolean grid covering
    /// the ROI bounding box. A cell is true iff its center lies inside any
    /// valid obstacle. Degenerate obstacles are skipped with a warning.
    pub fn build(
        roi: &[Point],
        obstacles: &[Vec<Point>],
        cell_size: f64,
        warnings: &mut Vec<String>,
    ) -> Option<Self> {
        let bbox = bounding_box(roi)?;
        let dx = bbox.max_x - bbox.min_x;
        let dz = bbox.max_z - bbox.min_z;
        let cols = (dx / cell_size).ceil() as usize + 1;
        let rows = (dz / cell_size).ceil() as usize + 1;

        let valid: Vec<&Vec<Point>> = obstacles
            .iter()
            .enumerate()
            .filter_map(|(i, poly)| {
                if is_valid_polygon(poly) {
                    Some(poly)
                } else {
                    warnings.push(format!(
                        "obstacle {} has fewer than 3 distinct vertices, skipped",
                        i
                    ));
                    None
                }
            })
            .collect();

        let mut cells = vec![vec![false; cols]; rows];
        for r in 0..rows {
            for c in 0..cols {
                let cx = bbox.min_x + (c as f64 + 0.5) * cell_size;
                let cz = bbox.min_z + (r as f64 + 0.5) * cell_size;
                let center = Point::new(cx, cz);
                cells[r][c] = valid.iter().any(|poly| contains(poly, center));
            }
        }

        Some(OccupancyGrid {
            cells,
            min_x: bbox.min_x,
            min_z: bbox.min_z,
            cell_size,
            rows,
            cols,
        })
    }

    fn cell_of(&self, p: Point) -> (isize, isize) {
        let c = ((p.x - self.min_x) / self.cell_size).floor() as isize;
        let r = ((p.z - self.min_z) / self.cell_size).floor() as isize;
        (r, c)
    }

    fn occupied_at(&self, r: isize, c: isize) -> bool {
        if r < 0 || c < 0 || r as usize >= self.rows || c as usize >= self.cols {
            return false;
        }
        self.cells[r as usize][c as usize]
    }

    /// Ray-marches between `a` and `b`, returning true iff an occupied cell
    /// lies strictly between the two endpoints. Endpoints themselves are
    /// excluded so a sensor or sample point is never self-occluding.
    pub fn blocked(&self, a: Point, b: Point) -> bool {
        let d = a.dist(&b);
        if d < 0.01 {
            return false;
        }
        let n = (d / (0.5 * self.cell_size)).floor() as usize + 1;
        for i in 1..n {
            let t = i as f64 / n as f64;
            let x = a.x + (b.x - a.x) * t;
            let z = a.z + (b.z - a.z) * t;
            let (r, c) = self.cell_of(Point::new(x, z));
            if self.occupied_at(r, c) {
                return true;
            }
        }
        false
    }
}

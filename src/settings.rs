use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Coverage constraint regime selecting how `k_required` is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapMode {
    Everywhere,
    CriticalOnly,
    PercentTarget,
}

impl Default for OverlapMode {
    fn default() -> Self {
        OverlapMode::Everywhere
    }
}

impl OverlapMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverlapMode::Everywhere => "everywhere",
            OverlapMode::CriticalOnly => "critical_only",
            OverlapMode::PercentTarget => "percent_target",
        }
    }
}

/// Immutable sensor model: field of view, range, and mount geometry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorModel {
    pub hfov_deg: f64,
    pub vfov_deg: f64,
    pub range_m: f64,
    pub dome_mode: bool,
}

impl Default for SensorModel {
    fn default() -> Self {
        SensorModel {
            hfov_deg: 360.0,
            vfov_deg: 30.0,
            range_m: 10.0,
            dome_mode: true,
        }
    }
}

impl SensorModel {
    /// Effective floor radius: for a dome (or hfov >= 360) sensor this is
    /// 90% of range; otherwise it's bounded by how far the vertical FOV
    /// reaches the floor from the mount height.
    pub fn effective_radius(&self, mount_y: f64) -> f64 {
        if self.dome_mode || self.hfov_deg >= 360.0 {
            self.range_m * 0.9
        } else {
            let half_vfov = self.vfov_deg.to_radians() / 2.0;
            self.range_m.min(mount_y * half_vfov.tan())
        }
    }

    /// Whether this sensor needs per-position yaw variants (anything short
    /// of full 360 degree horizontal coverage).
    pub fn needs_yaw_variants(&self) -> bool {
        !self.dome_mode && self.hfov_deg < 360.0
    }
}

/// Planner configuration. Every field has a documented default mirroring
/// the original service, and every field accepts omission via
/// `#[serde(default)]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerSettings {
    pub mount_y: f64,
    pub sample_spacing: f64,
    pub candidate_spacing: f64,
    pub keepout_distance: f64,
    pub overlap_mode: OverlapMode,
    pub k_required: u32,
    pub overlap_target_pct: f64,
    pub los_enabled: bool,
    pub los_cell: f64,
    pub yaw_step: f64,
    pub max_sensors: usize,
    pub solver_time_limit: f64,
    pub seed: u64,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        PlannerSettings {
            mount_y: 3.0,
            sample_spacing: 0.75,
            candidate_spacing: 2.0,
            keepout_distance: 0.5,
            overlap_mode: OverlapMode::Everywhere,
            k_required: 2,
            overlap_target_pct: 0.8,
            los_enabled: false,
            los_cell: 0.25,
            yaw_step: 30.0,
            max_sensors: 50,
            solver_time_limit: 10.0,
            seed: 42,
        }
    }
}

/// Request body for `solve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SolveRequest {
    pub roi_polygon: Vec<Point>,
    pub obstacles: Vec<Vec<Point>>,
    pub critical_polygon: Vec<Point>,
    pub model: SensorModel,
    pub settings: PlannerSettings,
}

impl Default for SolveRequest {
    fn default() -> Self {
        SolveRequest {
            roi_polygon: Vec::new(),
            obstacles: Vec::new(),
            critical_polygon: Vec::new(),
            model: SensorModel::default(),
            settings: PlannerSettings::default(),
        }
    }
}

/// A single selected sensor placement in the response.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlacedSensor {
    pub x: f64,
    pub z: f64,
    pub yaw: f64,
}

/// Response body of `solve`. Always JSON-serializable regardless of
/// success, so the HTTP/CLI transports never need a separate error shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveResponse {
    pub success: bool,
    pub selected_positions: Vec<PlacedSensor>,
    pub num_sensors: usize,
    pub coverage_pct: f64,
    pub k_coverage_pct: f64,
    pub overlap_mode: String,
    pub k_required: u32,
    pub warnings: Vec<String>,
    pub seed: u64,
    pub solver_status: String,
    pub total_sample_points: usize,
    pub total_candidates: usize,
    pub effective_radius_m: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SolveResponse {
    pub fn failure(error: impl Into<String>, seed: u64, warnings: Vec<String>) -> Self {
        SolveResponse {
            success: false,
            selected_positions: Vec::new(),
            num_sensors: 0,
            coverage_pct: 0.0,
            k_coverage_pct: 0.0,
            overlap_mode: String::new(),
            k_required: 0,
            warnings,
            seed,
            solver_status: "INFEASIBLE".to_string(),
            total_sample_points: 0,
            total_candidates: 0,
            effective_radius_m: 0.0,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_radius_dome() {
        let model = SensorModel {
            hfov_deg: 360.0,
            vfov_deg: 30.0,
            range_m: 10.0,
            dome_mode: true,
        };
        assert_approx_eq::assert_approx_eq!(model.effective_radius(3.0), 9.0, 1e-9);
    }

    #[test]
    fn effective_radius_partial_fov() {
        let model = SensorModel {
            hfov_deg: 90.0,
            vfov_deg: 60.0,
            range_m: 20.0,
            dome_mode: false,
        };
        // mount=3, vfov=60 -> 3 * tan(30deg) ~= 1.732
        assert_approx_eq::assert_approx_eq!(model.effective_radius(3.0), 1.7320508, 1e-4);
    }

    #[test]
    fn defaults_match_documented_values() {
        let settings = PlannerSettings::default();
        assert_eq!(settings.k_required, 2);
        assert_eq!(settings.overlap_mode, OverlapMode::Everywhere);
        assert_approx_eq::assert_approx_eq!(settings.sample_spacing, 0.75, 1e-9);
    }
}

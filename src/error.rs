#[derive(Debug, thiserror::Error)]
pub enum PlacementError {
    #[error("ROI polygon must have at least 3 vertices")]
    InvalidRoi,
    #[error("no sample points generated inside ROI")]
    NoSamplePoints,
    #[error("no candidate positions generated")]
    NoCandidates,
    #[error("solver failed: {0}")]
    SolverFailed(String),
}

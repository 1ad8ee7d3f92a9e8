use serde::{Deserialize, Serialize};

/// Candidate-mask strategy for defect detection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefectMethod {
    /// Absolute residual against a median-blur local background.
    #[default]
    Threshold,
    /// Canny edges, thresholds derived from `threshold`.
    Canny,
}

/// Configuration for the defect detector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefectParams {
    pub method: DefectMethod,
    /// Residual threshold (Threshold method) or Canny high threshold seed.
    pub threshold: u8,
    /// Minimum defect pixel area; also the NG verdict threshold.
    pub min_area: usize,
    /// Shrink the ROI by this many pixels before detection.
    pub erode_px: u32,
}

impl Default for DefectParams {
    fn default() -> Self {
        Self {
            method: DefectMethod::Threshold,
            threshold: 128,
            min_area: 20,
            erode_px: 0,
        }
    }
}

//! Foreign-material defect detection within a segmented unit.
//!
//! The detector consumes a unit's gray crop plus its (exclusion-adjusted)
//! segmentation mask, builds a candidate anomaly mask — residual against a
//! median-blur background, or Canny edges — restricted to the ROI, and keeps
//! only candidate components whose pixel area falls in a plausible band.

mod detect;
mod params;

pub use detect::detect;
pub use params::{DefectMethod, DefectParams};

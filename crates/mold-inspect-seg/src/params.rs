use serde::{Deserialize, Serialize};

/// Thresholding strategy for foreground segmentation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegMethod {
    /// Global Otsu threshold, inverse binary: darker structure is foreground.
    #[default]
    Otsu,
    /// Gaussian-weighted local mean threshold, inverse binary.
    Adaptive,
}

/// Configuration for the segmentation stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentationParams {
    pub method: SegMethod,
    /// Gaussian pre-blur kernel size in pixels; even values are bumped to
    /// the next odd size, 0 disables the blur.
    pub gaussian_blur: u32,
    /// Elliptical structuring element size for the close/open pass;
    /// 0 or 1 disables morphology.
    pub morph_kernel: u32,
    /// Adaptive method block size; forced odd and at least 3.
    pub adapt_block: u32,
    /// Adaptive method offset subtracted from the local mean.
    pub adapt_c: i32,
}

impl Default for SegmentationParams {
    fn default() -> Self {
        Self {
            method: SegMethod::Otsu,
            gaussian_blur: 3,
            morph_kernel: 3,
            adapt_block: 51,
            adapt_c: 10,
        }
    }
}

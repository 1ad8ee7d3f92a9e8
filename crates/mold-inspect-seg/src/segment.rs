use image::{GrayImage, Luma};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};
use imageproc::distance_transform::Norm;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::{close, open};
use mold_inspect_core::fill_internal_holes;

use crate::params::{SegMethod, SegmentationParams};

/// Sigma for a given odd kernel size, matching the classic automatic rule
/// used by the capture tooling this pipeline replaces.
fn kernel_sigma(k: u32) -> f32 {
    0.3 * ((k as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

fn force_odd(k: u32) -> u32 {
    if k % 2 == 0 {
        k + 1
    } else {
        k
    }
}

/// Segment a unit-sized gray crop into a binary foreground mask.
///
/// Steps, in order: optional Gaussian blur, inverse-binary threshold (Otsu
/// or adaptive local mean), morphological close then open with an elliptical
/// element, internal hole fill. The output always has the input's shape and
/// only the values 0 and 255.
pub fn segment(gray: &GrayImage, params: &SegmentationParams) -> GrayImage {
    if gray.width() == 0 || gray.height() == 0 {
        return gray.clone();
    }

    // A constant crop carries no separable structure; the inverse-binary
    // convention would flag the whole crop as foreground, so report an
    // empty mask instead.
    let min = gray.pixels().map(|p| p[0]).min().unwrap_or(0);
    let max = gray.pixels().map(|p| p[0]).max().unwrap_or(0);
    if min == max {
        return GrayImage::new(gray.width(), gray.height());
    }

    let blurred = if params.gaussian_blur > 0 {
        gaussian_blur_f32(gray, kernel_sigma(force_odd(params.gaussian_blur)))
    } else {
        gray.clone()
    };

    let mut mask = match params.method {
        SegMethod::Otsu => {
            let level = otsu_level(&blurred);
            threshold(&blurred, level, ThresholdType::BinaryInverted)
        }
        SegMethod::Adaptive => {
            adaptive_threshold_inv(&blurred, params.adapt_block, params.adapt_c)
        }
    };

    // close first (fill small internal gaps), then open (drop speckle);
    // the reverse order is not equivalent
    let radius = (params.morph_kernel / 2) as u8;
    if radius > 0 {
        mask = close(&mask, Norm::L2, radius);
        mask = open(&mask, Norm::L2, radius);
    }

    fill_internal_holes(&mask)
}

/// Inverse-binary adaptive threshold against a Gaussian-weighted local mean.
fn adaptive_threshold_inv(img: &GrayImage, block: u32, c: i32) -> GrayImage {
    let block = force_odd(block.max(3));
    let local_mean = gaussian_blur_f32(img, kernel_sigma(block));
    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        let t = local_mean.get_pixel(x, y)[0] as i32 - c;
        if (img.get_pixel(x, y)[0] as i32) > t {
            Luma([0])
        } else {
            Luma([255])
        }
    })
}

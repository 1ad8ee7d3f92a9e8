use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::filter::median_filter;
use imageproc::morphology::{erode, open};
use log::{debug, warn};
use mold_inspect_core::{binarize, label_components, largest_component};

use crate::params::{DefectMethod, DefectParams};

/// Median-blur background kernel: 21x21, i.e. radius 10.
const BACKGROUND_RADIUS: u32 = 10;

/// A candidate covering nearly the whole ROI is a segmentation artifact,
/// not a localized defect.
const MAX_ROI_FRACTION: f64 = 0.98;

/// Detect foreign-material defects in a unit crop.
///
/// Returns `None` when no defect is found or when the inputs are degenerate
/// (empty ROI, mismatched shapes); a batch caller treats both the same way
/// and moves on to the next unit.
pub fn detect(gray: &GrayImage, seg_mask: &GrayImage, params: &DefectParams) -> Option<GrayImage> {
    if gray.width() == 0
        || gray.height() == 0
        || gray.dimensions() != seg_mask.dimensions()
    {
        return None;
    }

    let roi = prepare_roi(seg_mask, params.erode_px)?;
    let roi_area = roi.1;
    let roi = roi.0;

    let candidate = match params.method {
        DefectMethod::Threshold => residual_candidate(gray, &roi, params.threshold),
        DefectMethod::Canny => {
            let low = (params.threshold / 2).max(1) as f32;
            let high = params.threshold.max(2) as f32;
            mask_and(&canny(gray, low, high), &roi)
        }
    };

    filter_components(&candidate, params.min_area, roi_area)
}

/// Binarize and optionally erode the segmentation mask, then keep only its
/// largest 8-connected component. Holes punched by exclusions stay holes;
/// they are not refilled here.
fn prepare_roi(seg_mask: &GrayImage, erode_px: u32) -> Option<(GrayImage, usize)> {
    let mut roi = binarize(seg_mask);
    if erode_px > 0 {
        // LInf ball of radius k == k iterations of the default 3x3 kernel
        roi = erode(&roi, Norm::LInf, erode_px.min(255) as u8);
    }
    let info = largest_component(&roi)?;
    debug!("roi area {} after erode {}", info.area, erode_px);
    Some((info.mask, info.area))
}

/// Residual-anomaly candidate: absolute difference from a median-blur
/// background, thresholded, restricted to the ROI, then opened to drop
/// 1-2 px noise.
fn residual_candidate(gray: &GrayImage, roi: &GrayImage, thr: u8) -> GrayImage {
    let background = median_filter(gray, BACKGROUND_RADIUS, BACKGROUND_RADIUS);
    let mut mask = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let a = gray.get_pixel(x, y)[0];
        let b = background.get_pixel(x, y)[0];
        let resid = a.abs_diff(b);
        Luma([if resid > thr { 255 } else { 0 }])
    });
    mask = mask_and(&mask, roi);
    open(&mask, Norm::L2, 1)
}

fn mask_and(a: &GrayImage, b: &GrayImage) -> GrayImage {
    GrayImage::from_fn(a.width(), a.height(), |x, y| {
        if a.get_pixel(x, y)[0] > 0 && b.get_pixel(x, y)[0] > 0 {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Keep candidate components with `min_area <= area <= max_area`, where
/// `max_area` rejects near-whole-ROI artifacts. Components failing only the
/// upper bound are logged so an oversized detection is diagnosable.
fn filter_components(candidate: &GrayImage, min_area: usize, roi_area: usize) -> Option<GrayImage> {
    let labeled = label_components(candidate);
    let max_area = min_area.max((roi_area as f64 * MAX_ROI_FRACTION) as usize);

    let mut keep = vec![false; labeled.areas.len()];
    let mut any = false;
    for (i, &area) in labeled.areas.iter().enumerate() {
        if area >= min_area && area <= max_area {
            keep[i] = true;
            any = true;
        } else if area > max_area {
            warn!("skipping near-whole-roi candidate: area {area} > max {max_area}");
        }
    }
    if !any {
        return None;
    }

    let mut out = GrayImage::new(candidate.width(), candidate.height());
    for (x, y, p) in labeled.labels.enumerate_pixels() {
        if p[0] > 0 && keep[p[0] as usize - 1] {
            out.put_pixel(x, y, Luma([255]));
        }
    }
    Some(out)
}

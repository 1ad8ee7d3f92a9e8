//! Exclusion alignment: anchor unit-local exclusion shapes to the segmented
//! surface through the centroid of its largest foreground component.

use std::collections::BTreeMap;

use image::GrayImage;
use log::debug;
use mold_inspect_core::largest_component;
use mold_inspect_grid::{Exclusion, RefCentroid};

/// Per-unit centroid anchors recorded on the reference image.
pub type ReferenceCentroidMap = BTreeMap<usize, RefCentroid>;

/// Record centroid anchors for every unit of the reference image.
///
/// `masks` are the unit-indexed *pre-exclusion* segmentation masks. Only
/// units with a non-empty mask get an entry; the map is rebuilt from
/// scratch on every reference segmentation run, never merged.
pub fn reference_centroids(masks: &[Option<GrayImage>]) -> ReferenceCentroidMap {
    let mut map = ReferenceCentroidMap::new();
    for (index, mask) in masks.iter().enumerate() {
        let Some(mask) = mask else { continue };
        if let Some(info) = largest_component(mask) {
            map.insert(
                index,
                RefCentroid {
                    cx: info.centroid_x,
                    cy: info.centroid_y,
                },
            );
        }
    }
    map
}

/// Estimate the XY shift of a unit against its reference anchor.
///
/// The shift is the rounded difference between the largest-component
/// centroid of `mask` (pre-exclusion) and the recorded reference centroid.
/// Missing anchor or empty mask falls back to `(0, 0)`: exclusions then
/// apply at their nominal position rather than corrupting the mask.
pub fn centroid_shift(
    refs: &ReferenceCentroidMap,
    unit_index: usize,
    mask: &GrayImage,
) -> (i32, i32) {
    let Some(anchor) = refs.get(&unit_index) else {
        return (0, 0);
    };
    let Some(info) = largest_component(mask) else {
        return (0, 0);
    };
    let dx = (info.centroid_x - anchor.cx).round() as i32;
    let dy = (info.centroid_y - anchor.cy).round() as i32;
    if dx != 0 || dy != 0 {
        debug!("unit {unit_index}: exclusion shift ({dx}, {dy})");
    }
    (dx, dy)
}

/// Subtract every exclusion from the mask, shifted by `(dx, dy)` and then
/// clipped to the unit bounds.
pub fn apply_exclusions(mask: &mut GrayImage, exclusions: &[Exclusion], dx: i32, dy: i32) {
    for exclusion in exclusions {
        subtract(mask, exclusion.translated(dx, dy));
    }
}

fn subtract(mask: &mut GrayImage, exclusion: Exclusion) {
    let (w, h) = (mask.width() as i32, mask.height() as i32);
    match exclusion {
        Exclusion::Rect {
            x,
            y,
            w: ew,
            h: eh,
        } => {
            let x0 = x.max(0);
            let y0 = y.max(0);
            let x1 = (x + ew as i32).min(w);
            let y1 = (y + eh as i32).min(h);
            for yy in y0..y1 {
                for xx in x0..x1 {
                    mask.put_pixel(xx as u32, yy as u32, image::Luma([0]));
                }
            }
        }
        Exclusion::Circle { cx, cy, r } => {
            if r == 0 {
                return;
            }
            let r2 = (r as i64) * (r as i64);
            let x0 = (cx - r as i32).max(0);
            let y0 = (cy - r as i32).max(0);
            let x1 = (cx + r as i32 + 1).min(w);
            let y1 = (cy + r as i32 + 1).min(h);
            for yy in y0..y1 {
                for xx in x0..x1 {
                    let ddx = (xx - cx) as i64;
                    let ddy = (yy - cy) as i64;
                    if ddx * ddx + ddy * ddy <= r2 {
                        mask.put_pixel(xx as u32, yy as u32, image::Luma([0]));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use image::Luma;

    fn full_mask(w: u32, h: u32) -> GrayImage {
        GrayImage::from_pixel(w, h, Luma([255]))
    }

    fn blob_at(cx: u32, cy: u32) -> GrayImage {
        // 3x3 blob centered at (cx, cy) in a 32x32 unit
        let mut m = GrayImage::new(32, 32);
        for y in cy - 1..=cy + 1 {
            for x in cx - 1..=cx + 1 {
                m.put_pixel(x, y, Luma([255]));
            }
        }
        m
    }

    #[test]
    fn reference_map_skips_empty_masks() {
        let masks = vec![Some(blob_at(10, 10)), None, Some(GrayImage::new(8, 8))];
        let map = reference_centroids(&masks);
        assert_eq!(map.len(), 1);
        assert_relative_eq!(map[&0].cx, 10.0);
        assert_relative_eq!(map[&0].cy, 10.0);
    }

    #[test]
    fn shift_tracks_blob_translation() {
        let refs = reference_centroids(&[Some(blob_at(10, 10))]);
        let shifted = blob_at(13, 8);
        assert_eq!(centroid_shift(&refs, 0, &shifted), (3, -2));
    }

    #[test]
    fn shift_uses_largest_component_only() {
        let refs = reference_centroids(&[Some(blob_at(10, 10))]);
        let mut current = blob_at(13, 8);
        // secondary speck must not bias the centroid
        current.put_pixel(30, 30, Luma([255]));
        assert_eq!(centroid_shift(&refs, 0, &current), (3, -2));
    }

    #[test]
    fn missing_anchor_falls_back_to_zero_shift() {
        let refs = ReferenceCentroidMap::new();
        assert_eq!(centroid_shift(&refs, 5, &blob_at(10, 10)), (0, 0));
    }

    #[test]
    fn empty_current_mask_falls_back_to_zero_shift() {
        let refs = reference_centroids(&[Some(blob_at(10, 10))]);
        assert_eq!(centroid_shift(&refs, 0, &GrayImage::new(32, 32)), (0, 0));
    }

    #[test]
    fn shifted_rect_exclusion_is_translated_then_clipped() {
        // rect {0,0,10,10} at shift (3,-2): zeroes x in [3,13), y in [0,8)
        let mut mask = full_mask(20, 20);
        apply_exclusions(
            &mut mask,
            &[Exclusion::Rect {
                x: 0,
                y: 0,
                w: 10,
                h: 10,
            }],
            3,
            -2,
        );
        for y in 0..20 {
            for x in 0..20 {
                let expect_zero = (3..13).contains(&x) && (0..8).contains(&y);
                assert_eq!(
                    mask.get_pixel(x, y)[0],
                    if expect_zero { 0 } else { 255 },
                    "pixel ({x},{y})"
                );
            }
        }
    }

    #[test]
    fn circle_exclusion_is_inclusive_of_boundary() {
        let mut mask = full_mask(16, 16);
        apply_exclusions(
            &mut mask,
            &[Exclusion::Circle {
                cx: 8,
                cy: 8,
                r: 3,
            }],
            0,
            0,
        );
        assert_eq!(mask.get_pixel(8, 8)[0], 0);
        assert_eq!(mask.get_pixel(11, 8)[0], 0); // exactly r away
        assert_eq!(mask.get_pixel(12, 8)[0], 255);
        assert_eq!(mask.get_pixel(11, 11)[0], 255); // sqrt(18) > r
    }
}

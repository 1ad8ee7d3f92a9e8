//! Batch inspection over the unit grid.

use image::GrayImage;
use log::{debug, info};
use mold_inspect_core::{crop_unit, mask_stats};
use mold_inspect_defect::{detect, DefectParams};
use mold_inspect_grid::{Exclusion, UnitRect};
use mold_inspect_seg::{
    apply_exclusions, centroid_shift, reference_centroids, segment, ReferenceCentroidMap,
    SegmentationParams,
};

use crate::error::StateError;
use crate::state::{ImageState, UnitResult, Verdict};

/// Runs segmentation and defect detection over every unit of a capture.
///
/// The runner owns the unit layout, the stage parameters and the reference
/// centroid anchors; per-capture masks and verdicts live in [`ImageState`].
pub struct InspectionRunner {
    units: Vec<UnitRect>,
    pub seg_params: SegmentationParams,
    pub defect_params: DefectParams,
    /// Unit-local exclusion shapes, shared by every unit.
    pub exclusions: Vec<Exclusion>,
    ref_centroids: ReferenceCentroidMap,
}

impl InspectionRunner {
    pub fn new(units: Vec<UnitRect>) -> Self {
        Self {
            units,
            seg_params: SegmentationParams::default(),
            defect_params: DefectParams::default(),
            exclusions: Vec::new(),
            ref_centroids: ReferenceCentroidMap::new(),
        }
    }

    pub fn units(&self) -> &[UnitRect] {
        &self.units
    }

    pub fn ref_centroids(&self) -> &ReferenceCentroidMap {
        &self.ref_centroids
    }

    /// Adopt anchors persisted in a grid document.
    pub fn set_ref_centroids(&mut self, anchors: ReferenceCentroidMap) {
        self.ref_centroids = anchors;
    }

    /// Segment every unit crop of a capture. Units whose rectangle falls
    /// outside the frame stay `None`.
    pub fn segment_units(&self, gray: &GrayImage) -> Vec<Option<GrayImage>> {
        self.units
            .iter()
            .map(|u| crop_unit(gray, u.x, u.y, u.w, u.h).map(|c| segment(&c, &self.seg_params)))
            .collect()
    }

    /// Run a full inspection pass over one capture.
    ///
    /// Units lacking a segmentation mask are segmented first. When the
    /// capture is the designated reference, the centroid anchors are rebuilt
    /// from the fresh masks before any exclusion is applied; the stored
    /// masks then have their exclusions zeroed out, so exports see the
    /// adjusted rasters. Units without a usable crop or mask are omitted
    /// from the results; the whole run fails only when no unit segmented at
    /// all. Defect masks are overwritten, never merged with a previous run.
    pub fn inspect<'a>(
        &mut self,
        state: &'a mut ImageState,
        is_reference: bool,
    ) -> Result<&'a [UnitResult], StateError> {
        if state.seg_masks.len() != self.units.len() {
            state.seg_masks = self.segment_units(&state.gray);
        } else {
            for (i, unit) in self.units.iter().enumerate() {
                if state.seg_masks[i].is_none() {
                    state.seg_masks[i] = crop_unit(&state.gray, unit.x, unit.y, unit.w, unit.h)
                        .map(|c| segment(&c, &self.seg_params));
                }
            }
        }

        if is_reference {
            self.ref_centroids = reference_centroids(&state.seg_masks)
                .into_iter()
                .map(|(pos, c)| (self.units[pos].index, c))
                .collect();
        }

        if state.seg_masks.iter().all(Option::is_none) {
            return Err(StateError::Unavailable);
        }

        state.defect_masks = vec![None; self.units.len()];
        state.results.clear();
        for (i, unit) in self.units.iter().enumerate() {
            let Some(crop) = crop_unit(&state.gray, unit.x, unit.y, unit.w, unit.h) else {
                continue;
            };
            let Some(mut mask) = state.seg_masks[i].take() else {
                continue;
            };

            // shift comes from the pre-exclusion centroid; the subtraction
            // is then kept in the stored mask
            if !self.exclusions.is_empty() {
                let (dx, dy) = centroid_shift(&self.ref_centroids, unit.index, &mask);
                apply_exclusions(&mut mask, &self.exclusions, dx, dy);
            }

            let defect = detect(&crop, &mask, &self.defect_params);
            let area = defect.as_ref().map(|m| mask_stats(m).area).unwrap_or(0);
            let verdict = if defect.is_some() {
                Verdict::Ng
            } else {
                Verdict::Ok
            };
            debug!("unit {}: {:?}, defect area {}", unit.index, verdict, area);

            state.seg_masks[i] = Some(mask);
            state.defect_masks[i] = defect;
            state.results.push(UnitResult {
                index: unit.index,
                verdict,
                defect_area: area,
            });
        }

        let ng = state
            .results
            .iter()
            .filter(|r| r.verdict == Verdict::Ng)
            .count();
        info!("inspected {} units, {} NG", state.results.len(), ng);
        Ok(&state.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    // one flat-gray unit with a dark disk in the middle; dark = foreground
    fn unit_surface(w: u32, h: u32, defect: bool) -> GrayImage {
        let mut img = GrayImage::from_pixel(w, h, Luma([200]));
        for y in 3..h - 3 {
            for x in 3..w - 3 {
                img.put_pixel(x, y, Luma([50]));
            }
        }
        if defect {
            for y in 10..15 {
                for x in 10..15 {
                    img.put_pixel(x, y, Luma([240]));
                }
            }
        }
        img
    }

    fn capture(defect_in_second: bool) -> GrayImage {
        let mut img = GrayImage::from_pixel(64, 32, Luma([200]));
        for (pos, defect) in [(0u32, false), (1u32, defect_in_second)] {
            let unit = unit_surface(24, 24, defect);
            let x0 = 4 + pos * 28;
            for (x, y, p) in unit.enumerate_pixels() {
                img.put_pixel(x0 + x, 4 + y, *p);
            }
        }
        img
    }

    fn two_units() -> Vec<UnitRect> {
        vec![
            UnitRect {
                index: 0,
                x: 4,
                y: 4,
                w: 24,
                h: 24,
            },
            UnitRect {
                index: 1,
                x: 32,
                y: 4,
                w: 24,
                h: 24,
            },
        ]
    }

    #[test]
    fn defective_unit_is_ng_and_clean_unit_is_ok() {
        let mut runner = InspectionRunner::new(two_units());
        // the 21x21 median window spills past the 18x18 surface into the
        // bright frame, so the threshold must exceed that contrast (150)
        runner.defect_params.threshold = 160;
        runner.defect_params.min_area = 10;
        let mut state = ImageState::new(capture(true));

        let results = runner.inspect(&mut state, true).expect("run").to_vec();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].verdict, Verdict::Ok);
        assert_eq!(results[0].defect_area, 0);
        assert_eq!(results[1].verdict, Verdict::Ng);
        assert!(results[1].defect_area >= 10);
        assert!(state.defect_masks[1].is_some());
    }

    #[test]
    fn off_frame_unit_is_omitted() {
        let mut units = two_units();
        units.push(UnitRect {
            index: 2,
            x: 200,
            y: 4,
            w: 24,
            h: 24,
        });
        let mut runner = InspectionRunner::new(units);
        runner.defect_params.threshold = 160;
        runner.defect_params.min_area = 10;
        let mut state = ImageState::new(capture(false));

        let results = runner.inspect(&mut state, true).expect("run").to_vec();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.index != 2));
        assert!(state.seg_masks[2].is_none());
    }

    #[test]
    fn run_is_unavailable_when_nothing_segments() {
        let units = vec![UnitRect {
            index: 0,
            x: 200,
            y: 200,
            w: 24,
            h: 24,
        }];
        let mut runner = InspectionRunner::new(units);
        let mut state = ImageState::new(capture(false));
        assert!(matches!(
            runner.inspect(&mut state, true),
            Err(StateError::Unavailable)
        ));
    }

    #[test]
    fn reference_run_records_anchors() {
        let mut runner = InspectionRunner::new(two_units());
        let mut state = ImageState::new(capture(false));
        runner.inspect(&mut state, true).expect("run");
        assert_eq!(runner.ref_centroids().len(), 2);

        // non-reference runs leave the anchors alone
        let before = runner.ref_centroids().clone();
        let mut other = ImageState::new(capture(true));
        runner.inspect(&mut other, false).expect("run");
        assert_eq!(runner.ref_centroids(), &before);
    }

    #[test]
    fn rerun_overwrites_defect_masks() {
        let mut runner = InspectionRunner::new(two_units());
        runner.defect_params.threshold = 160;
        runner.defect_params.min_area = 10;
        let mut state = ImageState::new(capture(true));
        runner.inspect(&mut state, true).expect("run");
        assert!(state.defect_masks[1].is_some());

        // raising the threshold past the residual clears the verdict
        runner.defect_params.threshold = 200;
        state.seg_masks.clear();
        let results = runner.inspect(&mut state, false).expect("run").to_vec();
        assert_eq!(results[1].verdict, Verdict::Ok);
        assert!(state.defect_masks[1].is_none());
    }

    #[test]
    fn stored_masks_are_exclusion_adjusted() {
        let mut runner = InspectionRunner::new(two_units());
        runner.defect_params.threshold = 160;
        runner.exclusions = vec![Exclusion::Rect {
            x: 8,
            y: 8,
            w: 4,
            h: 4,
        }];
        let mut state = ImageState::new(capture(false));
        runner.inspect(&mut state, true).expect("run");

        // exports read seg_masks, so the subtraction must be persisted
        let mask = state.seg_masks[0].as_ref().expect("mask");
        assert_eq!(mask.get_pixel(9, 9)[0], 0);
        assert_eq!(mask.get_pixel(5, 15)[0], 255);
    }
}

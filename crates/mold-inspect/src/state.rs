//! Cross-image session state.
//!
//! A session works with several captures of the same physical part. Each
//! capture keeps a full snapshot of its pipeline state, so switching between
//! captures never recomputes masks or leaks them across images.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use image::GrayImage;
use serde::Serialize;

use crate::error::StateError;

/// Verdict for one inspected unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Ok,
    Ng,
}

/// Outcome for one unit of an inspection run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct UnitResult {
    pub index: usize,
    pub verdict: Verdict,
    pub defect_area: usize,
}

/// Everything the pipeline knows about one loaded capture.
///
/// Mask vectors are indexed by unit position; `None` marks units whose
/// rectangle falls outside the frame or whose segmentation is degenerate.
#[derive(Clone, Debug)]
pub struct ImageState {
    pub gray: GrayImage,
    pub seg_masks: Vec<Option<GrayImage>>,
    pub defect_masks: Vec<Option<GrayImage>>,
    pub results: Vec<UnitResult>,
}

impl ImageState {
    pub fn new(gray: GrayImage) -> Self {
        Self {
            gray,
            seg_masks: Vec::new(),
            defect_masks: Vec::new(),
            results: Vec::new(),
        }
    }
}

/// Keyed store of per-image pipeline state.
///
/// The first inserted capture fixes the session frame size; captures with a
/// different size are refused rather than silently misaligned against the
/// grid document.
#[derive(Debug, Default)]
pub struct ImageStore {
    images: BTreeMap<PathBuf, ImageState>,
    current: Option<PathBuf>,
    reference: Option<PathBuf>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame size shared by every capture in the store.
    pub fn frame_size(&self) -> Option<(u32, u32)> {
        self.images.values().next().map(|s| s.gray.dimensions())
    }

    /// Insert a capture and make it current. Re-inserting an existing path
    /// replaces its state (a reload).
    pub fn insert(&mut self, path: impl Into<PathBuf>, gray: GrayImage) -> Result<(), StateError> {
        if let Some((w, h)) = self.frame_size() {
            if gray.dimensions() != (w, h) {
                return Err(StateError::SizeMismatch {
                    want_w: w,
                    want_h: h,
                    got_w: gray.width(),
                    got_h: gray.height(),
                });
            }
        }
        let path = path.into();
        self.images.insert(path.clone(), ImageState::new(gray));
        self.current = Some(path);
        Ok(())
    }

    /// Make a previously inserted capture current.
    pub fn switch_to(&mut self, path: &Path) -> Result<(), StateError> {
        if !self.images.contains_key(path) {
            return Err(StateError::UnknownImage {
                path: path.to_owned(),
            });
        }
        self.current = Some(path.to_owned());
        Ok(())
    }

    /// Designate the capture that anchors exclusion alignment.
    pub fn set_reference(&mut self, path: &Path) -> Result<(), StateError> {
        if !self.images.contains_key(path) {
            return Err(StateError::UnknownImage {
                path: path.to_owned(),
            });
        }
        self.reference = Some(path.to_owned());
        Ok(())
    }

    pub fn reference(&self) -> Option<&Path> {
        self.reference.as_deref()
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    pub fn is_reference_current(&self) -> bool {
        self.current.is_some() && self.current == self.reference
    }

    /// Grid and exclusion authoring only make sense on the reference
    /// capture; everything else aligns against it.
    pub fn expect_reference_current(&self) -> Result<(), StateError> {
        if self.is_reference_current() {
            Ok(())
        } else {
            Err(StateError::NotReference)
        }
    }

    pub fn current(&self) -> Option<&ImageState> {
        self.current.as_ref().and_then(|p| self.images.get(p))
    }

    pub fn current_mut(&mut self) -> Option<&mut ImageState> {
        self.current.as_ref().and_then(|p| self.images.get_mut(p))
    }

    pub fn get(&self, path: &Path) -> Option<&ImageState> {
        self.images.get(path)
    }

    pub fn get_mut(&mut self, path: &Path) -> Option<&mut ImageState> {
        self.images.get_mut(path)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.images.keys().map(PathBuf::as_path)
    }
}

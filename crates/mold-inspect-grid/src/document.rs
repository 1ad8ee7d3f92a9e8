//! Persisted grid document: layout metadata, unit boxes, exclusions and
//! the centroid anchors used for exclusion alignment.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::{Exclusion, GridParameters, UnitRect};

/// Current on-disk document version.
pub const DOCUMENT_VERSION: u32 = 2;

/// Alignment strategy tag written into `exclusion_alignment.type`.
pub const ALIGNMENT_KIND: &str = "seg_centroid_xy";

#[derive(thiserror::Error, Debug)]
pub enum DocumentError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Base64(#[from] base64::DecodeError),
    #[error("document contains no unit boxes")]
    Empty,
}

/// The base unit rectangle as drawn on the reference image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseUnit {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl BaseUnit {
    /// View the base unit as the seed rectangle for grid generation.
    pub fn as_unit_rect(&self) -> UnitRect {
        UnitRect {
            index: 0,
            x: self.x,
            y: self.y,
            w: self.w,
            h: self.h,
        }
    }
}

/// Layout metadata allowing a deterministic re-generation of the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridMetadata {
    pub image_width: u32,
    pub image_height: u32,
    #[serde(flatten)]
    pub params: GridParameters,
    pub base_unit: BaseUnit,
}

/// One persisted unit box. The index is optional on input (legacy files);
/// missing indices are synthesized sequentially.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

/// Reference centroid for one unit, unit-local float pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RefCentroid {
    pub cx: f64,
    pub cy: f64,
}

/// Centroid anchors recorded on the reference image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExclusionAlignment {
    #[serde(rename = "type")]
    pub kind: String,
    pub ref_centroids: BTreeMap<usize, RefCentroid>,
}

impl ExclusionAlignment {
    pub fn from_centroids(ref_centroids: BTreeMap<usize, RefCentroid>) -> Self {
        Self {
            kind: ALIGNMENT_KIND.to_string(),
            ref_centroids,
        }
    }
}

/// One embedded or referenced segmentation mask.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaskEntry {
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask_b64: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask_file: Option<String>,
}

fn default_version() -> u32 {
    DOCUMENT_VERSION
}

/// The persisted grid/exclusion document.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GridDocument {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<GridMetadata>,
    pub boxes: Vec<BoxEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclusions: Vec<Exclusion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusion_alignment: Option<ExclusionAlignment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub masks: Vec<MaskEntry>,
}

impl GridDocument {
    /// Build a document from a generated grid.
    pub fn new(
        metadata: GridMetadata,
        units: &[UnitRect],
        exclusions: Vec<Exclusion>,
        exclusion_alignment: Option<ExclusionAlignment>,
    ) -> Self {
        let boxes = units
            .iter()
            .map(|u| BoxEntry {
                index: Some(u.index),
                x: u.x,
                y: u.y,
                w: u.w,
                h: u.h,
            })
            .collect();
        Self {
            version: DOCUMENT_VERSION,
            metadata: Some(metadata),
            boxes,
            exclusions,
            exclusion_alignment,
            masks: Vec::new(),
        }
    }

    /// Materialize the unit rectangles, synthesizing missing indices in
    /// file order.
    pub fn units(&self) -> Vec<UnitRect> {
        self.boxes
            .iter()
            .enumerate()
            .map(|(pos, b)| UnitRect {
                index: b.index.unwrap_or(pos),
                x: b.x,
                y: b.y,
                w: b.w,
                h: b.h,
            })
            .collect()
    }

    /// Load a document from JSON on disk. Legacy array-only files are
    /// upgraded in memory (version 1, no metadata).
    ///
    /// The two shapes are tried in turn rather than through an untagged
    /// enum: untagged deserialization buffers values and loses serde_json's
    /// integer-keyed map support for the centroid anchors.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let raw = fs::read_to_string(path)?;
        let doc = match serde_json::from_str::<GridDocument>(&raw) {
            Ok(doc) => doc,
            Err(err) => match serde_json::from_str::<Vec<BoxEntry>>(&raw) {
                Ok(boxes) => GridDocument {
                    version: 1,
                    metadata: None,
                    boxes,
                    exclusions: Vec::new(),
                    exclusion_alignment: None,
                    masks: Vec::new(),
                },
                Err(_) => return Err(err.into()),
            },
        };
        if doc.boxes.is_empty() {
            return Err(DocumentError::Empty);
        }
        Ok(doc)
    }

    /// Write this document to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

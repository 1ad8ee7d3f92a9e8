//! Unit grid model for molded-array images.
//!
//! A single user-drawn base rectangle plus unit/block counts and spacings
//! deterministically expand into an indexed array of unit rectangles. The
//! layout, user-authored exclusion shapes and the centroid anchors used for
//! exclusion alignment are persisted as a JSON grid document.

mod document;
mod export;
mod generate;
mod types;

pub use document::{
    BaseUnit, BoxEntry, DocumentError, ExclusionAlignment, GridDocument, GridMetadata, MaskEntry,
    RefCentroid, ALIGNMENT_KIND, DOCUMENT_VERSION,
};
pub use export::{decode_masks, embed_masks, encode_mask_png, export_masks_csv};
pub use generate::generate;
pub use types::{Exclusion, GridParameters, UnitRect};

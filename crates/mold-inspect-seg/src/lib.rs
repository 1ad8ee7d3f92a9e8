//! Per-unit foreground segmentation and exclusion alignment.
//!
//! `segment` turns a unit-sized gray crop into a binary foreground mask
//! (threshold + morphology + hole fill). The alignment half anchors
//! user-authored exclusion shapes to the segmented surface via the centroid
//! of the largest foreground component, so exclusions stay valid under the
//! few-pixel stage jitter between captures of the same physical part.

mod align;
mod params;
mod segment;

pub use align::{
    apply_exclusions, centroid_shift, reference_centroids, ReferenceCentroidMap,
};
pub use params::{SegMethod, SegmentationParams};
pub use segment::segment;

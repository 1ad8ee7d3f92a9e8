//! Core raster and mask utilities for molded-unit inspection.
//!
//! This crate is intentionally small. It knows nothing about grids,
//! exclusions or detection policy; it only provides the gray/binary raster
//! primitives the pipeline crates are built on.

mod components;
mod gray;
mod logger;
mod mask;

pub use components::{label_components, largest_component, ComponentInfo, LabeledMask};
pub use gray::{crop_unit, to_gray};
pub use mask::{binarize, fill_internal_holes, mask_stats, MaskStats};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_logging;

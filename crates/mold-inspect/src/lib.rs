//! High-level facade crate for the `mold-inspect-*` workspace.
//!
//! This crate provides:
//! - stable re-exports of the grid, segmentation and defect crates
//! - capture loading with a plain-text numeric-array fallback
//! - a keyed per-image state store with snapshot-on-switch semantics
//! - the batch [`InspectionRunner`]
//! - a pure preview [`Session`] state machine with debounce, for host loops
//!
//! ## Quickstart
//!
//! ```no_run
//! use mold_inspect::{loader, GridDocument, ImageStore, InspectionRunner};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let doc = GridDocument::load_json("grid.json")?;
//! let mut runner = InspectionRunner::new(doc.units());
//! runner.exclusions = doc.exclusions.clone();
//!
//! let mut store = ImageStore::new();
//! store.insert("part.png", loader::load_gray("part.png")?)?;
//! store.set_reference(std::path::Path::new("part.png"))?;
//!
//! let state = store.current_mut().ok_or("no current capture")?;
//! let results = runner.inspect(state, true)?;
//! println!("inspected {} units", results.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `mold_inspect::core`: gray rasters, masks, components, logging setup.
//! - `mold_inspect::grid`: unit grid model, exclusions, JSON documents.
//! - `mold_inspect::seg`: per-unit segmentation and exclusion alignment.
//! - `mold_inspect::defect`: per-unit defect detection.

pub use mold_inspect_core as core;
pub use mold_inspect_defect as defect;
pub use mold_inspect_grid as grid;
pub use mold_inspect_seg as seg;

mod error;
pub mod loader;
mod runner;
mod session;
mod state;

pub use error::{LoadError, StateError};
pub use runner::InspectionRunner;
pub use session::{Action, Debouncer, Event, Mode, Session, DEFAULT_QUIESCENCE};
pub use state::{ImageState, ImageStore, UnitResult, Verdict};

pub use mold_inspect_defect::{DefectMethod, DefectParams};
pub use mold_inspect_grid::{Exclusion, GridDocument, GridParameters, UnitRect};
pub use mold_inspect_seg::{SegMethod, SegmentationParams};

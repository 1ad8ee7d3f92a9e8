//! Mask export variants: embedded base64 PNG buffers and the
//! one-PNG-per-unit + CSV summary layout.

use std::fmt::Write as _;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::GrayImage;
use log::warn;
use mold_inspect_core::mask_stats;

use crate::document::{DocumentError, GridDocument, MaskEntry};

/// Encode a mask as an in-memory PNG buffer.
pub fn encode_mask_png(mask: &GrayImage) -> Result<Vec<u8>, DocumentError> {
    let mut buf = Cursor::new(Vec::new());
    mask.write_to(&mut buf, image::ImageFormat::Png)?;
    Ok(buf.into_inner())
}

/// Embed per-unit masks into the document as base64 PNG buffers.
///
/// `masks` is unit-indexed; absent entries are skipped.
pub fn embed_masks(
    doc: &mut GridDocument,
    masks: &[Option<GrayImage>],
) -> Result<(), DocumentError> {
    doc.masks.clear();
    for (index, mask) in masks.iter().enumerate() {
        let Some(mask) = mask else { continue };
        let png = encode_mask_png(mask)?;
        doc.masks.push(MaskEntry {
            index,
            mask_b64: Some(BASE64.encode(png)),
            mask_file: None,
        });
    }
    Ok(())
}

/// Decode the document's mask entries back into rasters.
///
/// Accepts embedded base64 buffers or `mask_file` references resolved
/// relative to `base_dir`. Entries that fail to decode are skipped with a
/// warning; a bad mask must not sink the whole import.
pub fn decode_masks(doc: &GridDocument, base_dir: &Path) -> Vec<(usize, GrayImage)> {
    let mut out = Vec::new();
    for entry in &doc.masks {
        let decoded = decode_entry(entry, base_dir);
        match decoded {
            Ok(Some(mask)) => out.push((entry.index, mask)),
            Ok(None) => {}
            Err(err) => warn!("mask entry {}: failed to decode ({err})", entry.index),
        }
    }
    out
}

fn decode_entry(entry: &MaskEntry, base_dir: &Path) -> Result<Option<GrayImage>, DocumentError> {
    if let Some(b64) = &entry.mask_b64 {
        let raw = BASE64.decode(b64)?;
        let img = image::load_from_memory(&raw)?;
        return Ok(Some(img.to_luma8()));
    }
    if let Some(rel) = &entry.mask_file {
        let path = if Path::new(rel).is_absolute() {
            PathBuf::from(rel)
        } else {
            base_dir.join(rel)
        };
        let img = image::open(path)?;
        return Ok(Some(img.to_luma8()));
    }
    Ok(None)
}

/// Write one `mask_NNNN.png` per present mask plus a `masks_summary.csv`
/// with `index, mask, area, centroid_x, centroid_y` rows.
///
/// Returns the path of the summary file.
pub fn export_masks_csv(
    dir: &Path,
    masks: &[Option<GrayImage>],
) -> Result<PathBuf, DocumentError> {
    let mut csv = String::from("index,mask,area,centroid_x,centroid_y\n");
    for (index, mask) in masks.iter().enumerate() {
        let Some(mask) = mask else { continue };
        let fname = format!("mask_{index:04}.png");
        mask.save(dir.join(&fname))?;
        let stats = mask_stats(mask);
        let _ = writeln!(
            csv,
            "{index},{fname},{},{},{}",
            stats.area, stats.centroid_x, stats.centroid_y
        );
    }
    let csv_path = dir.join("masks_summary.csv");
    std::fs::write(&csv_path, csv)?;
    Ok(csv_path)
}

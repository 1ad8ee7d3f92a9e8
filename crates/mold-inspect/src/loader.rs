//! Capture loading with a plain-text numeric-array fallback.

use std::fs;
use std::path::Path;

use image::GrayImage;
use log::debug;
use mold_inspect_core::to_gray;

use crate::error::LoadError;

/// Load a capture as an 8-bit gray image.
///
/// Decoding goes through the `image` crate first; when that fails the file
/// is retried as a plain-text numeric array (rows of 0-255 values), a format
/// some capture rigs emit instead of a standard raster.
pub fn load_gray(path: impl AsRef<Path>) -> Result<GrayImage, LoadError> {
    let path = path.as_ref();
    match image::open(path) {
        Ok(img) => Ok(to_gray(&img)),
        Err(image::ImageError::IoError(source)) => Err(LoadError::Io {
            path: path.to_owned(),
            source,
        }),
        Err(decode) => {
            debug!(
                "decode failed for {}, retrying as numeric array: {decode}",
                path.display()
            );
            // binary content that is not valid UTF-8 was never a numeric
            // array; report the original decode failure for it
            let Ok(text) = fs::read_to_string(path) else {
                return Err(LoadError::Decode {
                    path: path.to_owned(),
                    source: decode,
                });
            };
            parse_numeric_array(&text).ok_or_else(|| LoadError::Unrecognized {
                path: path.to_owned(),
            })
        }
    }
}

/// Parse whitespace- or comma-separated rows of numbers into a gray image.
/// Rows must all have the same length; values are clamped to 0-255.
fn parse_numeric_array(text: &str) -> Option<GrayImage> {
    let mut rows: Vec<Vec<u8>> = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut row = Vec::new();
        for token in line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            let value: f64 = token.parse().ok()?;
            row.push(value.clamp(0.0, 255.0).round() as u8);
        }
        rows.push(row);
    }

    let height = rows.len();
    let width = rows.first()?.len();
    if width == 0 || rows.iter().any(|r| r.len() != width) {
        return None;
    }

    let mut img = GrayImage::new(width as u32, height as u32);
    for (y, row) in rows.iter().enumerate() {
        for (x, &v) in row.iter().enumerate() {
            img.put_pixel(x as u32, y as u32, image::Luma([v]));
        }
    }
    Some(img)
}

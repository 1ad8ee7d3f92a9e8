use image::{DynamicImage, GrayImage};

/// Convert a decoded raster into a single-channel 8-bit intensity image.
pub fn to_gray(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Crop a unit-sized region out of a full-frame gray image.
///
/// Returns `None` when the rectangle is degenerate or not fully contained in
/// the image. Units that fall off the frame carry no usable data and are
/// reported as "unknown" further up the pipeline.
pub fn crop_unit(img: &GrayImage, x: i32, y: i32, w: u32, h: u32) -> Option<GrayImage> {
    if w == 0 || h == 0 || x < 0 || y < 0 {
        return None;
    }
    let (x, y) = (x as u32, y as u32);
    if x + w > img.width() || y + h > img.height() {
        return None;
    }

    let mut out = GrayImage::new(w, h);
    for row in 0..h {
        for col in 0..w {
            out.put_pixel(col, row, *img.get_pixel(x + col, y + row));
        }
    }
    Some(out)
}

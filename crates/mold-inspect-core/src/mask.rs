use image::GrayImage;
use serde::Serialize;

/// Pixel area and intensity-free centroid of a binary mask.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MaskStats {
    pub area: usize,
    pub centroid_x: f64,
    pub centroid_y: f64,
}

/// Compute area (foreground pixel count) and centroid of a binary mask.
///
/// An empty mask reports area 0 with centroid `(0, 0)`.
pub fn mask_stats(mask: &GrayImage) -> MaskStats {
    let mut area = 0usize;
    let mut sum_x = 0f64;
    let mut sum_y = 0f64;
    for (x, y, p) in mask.enumerate_pixels() {
        if p[0] > 0 {
            area += 1;
            sum_x += x as f64;
            sum_y += y as f64;
        }
    }
    if area == 0 {
        return MaskStats {
            area: 0,
            centroid_x: 0.0,
            centroid_y: 0.0,
        };
    }
    MaskStats {
        area,
        centroid_x: sum_x / area as f64,
        centroid_y: sum_y / area as f64,
    }
}

/// Normalize any non-zero pixel to 255.
pub fn binarize(mask: &GrayImage) -> GrayImage {
    let mut out = mask.clone();
    for p in out.pixels_mut() {
        p[0] = if p[0] > 0 { 255 } else { 0 };
    }
    out
}

/// Fill internal holes of a binary mask.
///
/// A hole is a zero-valued region not reachable from the raster border
/// through zero-valued pixels (4-connected flood, matching the classic
/// border flood-fill). Holes become foreground; zero regions touching the
/// border stay background, so notches at the crop edge survive.
pub fn fill_internal_holes(mask: &GrayImage) -> GrayImage {
    let (w, h) = (mask.width() as usize, mask.height() as usize);
    if w == 0 || h == 0 {
        return mask.clone();
    }

    // reachable[i] = zero pixel connected to the border through zeros
    let mut reachable = vec![false; w * h];
    let mut stack: Vec<(usize, usize)> = Vec::new();

    let is_zero = |x: usize, y: usize| mask.get_pixel(x as u32, y as u32)[0] == 0;

    for x in 0..w {
        for y in [0, h - 1] {
            if is_zero(x, y) && !reachable[y * w + x] {
                reachable[y * w + x] = true;
                stack.push((x, y));
            }
        }
    }
    for y in 0..h {
        for x in [0, w - 1] {
            if is_zero(x, y) && !reachable[y * w + x] {
                reachable[y * w + x] = true;
                stack.push((x, y));
            }
        }
    }

    while let Some((x, y)) = stack.pop() {
        let neighbors = [
            (x.wrapping_sub(1), y),
            (x + 1, y),
            (x, y.wrapping_sub(1)),
            (x, y + 1),
        ];
        for (nx, ny) in neighbors {
            if nx < w && ny < h && is_zero(nx, ny) && !reachable[ny * w + nx] {
                reachable[ny * w + nx] = true;
                stack.push((nx, ny));
            }
        }
    }

    let mut out = mask.clone();
    for y in 0..h {
        for x in 0..w {
            if out.get_pixel(x as u32, y as u32)[0] == 0 && !reachable[y * w + x] {
                out.put_pixel(x as u32, y as u32, image::Luma([255]));
            }
        }
    }
    out
}

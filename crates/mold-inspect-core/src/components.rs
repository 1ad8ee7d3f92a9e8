use image::{GrayImage, ImageBuffer, Luma};
use imageproc::region_labelling::{connected_components, Connectivity};

/// Label image plus per-label pixel areas.
///
/// Label 0 is background; `areas[i]` is the area of label `i + 1`.
pub struct LabeledMask {
    pub labels: ImageBuffer<Luma<u32>, Vec<u32>>,
    pub areas: Vec<usize>,
}

/// Largest 8-connected foreground component of a binary mask.
#[derive(Clone, Debug)]
pub struct ComponentInfo {
    pub mask: GrayImage,
    pub area: usize,
    pub centroid_x: f64,
    pub centroid_y: f64,
}

/// 8-connected component labelling of a binary mask.
pub fn label_components(mask: &GrayImage) -> LabeledMask {
    let labels = connected_components(mask, Connectivity::Eight, Luma([0u8]));
    let max_label = labels.pixels().map(|p| p[0]).max().unwrap_or(0) as usize;
    let mut areas = vec![0usize; max_label];
    for p in labels.pixels() {
        if p[0] > 0 {
            areas[p[0] as usize - 1] += 1;
        }
    }
    LabeledMask { labels, areas }
}

/// Isolate the largest 8-connected foreground component.
///
/// Secondary specks are discarded; holes inside the winning component are
/// left as-is. Returns `None` for an empty mask.
pub fn largest_component(mask: &GrayImage) -> Option<ComponentInfo> {
    let labeled = label_components(mask);
    let (best_idx, &area) = labeled
        .areas
        .iter()
        .enumerate()
        .max_by_key(|(_, &a)| a)?;
    if area == 0 {
        return None;
    }
    let target = best_idx as u32 + 1;

    let mut out = GrayImage::new(mask.width(), mask.height());
    let mut sum_x = 0f64;
    let mut sum_y = 0f64;
    for (x, y, p) in labeled.labels.enumerate_pixels() {
        if p[0] == target {
            out.put_pixel(x, y, Luma([255]));
            sum_x += x as f64;
            sum_y += y as f64;
        }
    }
    Some(ComponentInfo {
        mask: out,
        area,
        centroid_x: sum_x / area as f64,
        centroid_y: sum_y / area as f64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_with_two_blobs() -> GrayImage {
        let mut m = GrayImage::new(12, 6);
        // 3x3 blob
        for y in 1..4 {
            for x in 1..4 {
                m.put_pixel(x, y, Luma([255]));
            }
        }
        // single-pixel speck far away
        m.put_pixel(10, 5, Luma([255]));
        m
    }

    #[test]
    fn labels_count_all_components() {
        let labeled = label_components(&mask_with_two_blobs());
        let mut areas = labeled.areas.clone();
        areas.sort_unstable();
        assert_eq!(areas, vec![1, 9]);
    }

    #[test]
    fn largest_component_ignores_specks() {
        let info = largest_component(&mask_with_two_blobs()).expect("component");
        assert_eq!(info.area, 9);
        assert_eq!((info.centroid_x, info.centroid_y), (2.0, 2.0));
        assert_eq!(info.mask.get_pixel(10, 5)[0], 0);
    }

    #[test]
    fn empty_mask_has_no_component() {
        assert!(largest_component(&GrayImage::new(4, 4)).is_none());
    }

    #[test]
    fn diagonal_pixels_are_one_component() {
        let mut m = GrayImage::new(4, 4);
        m.put_pixel(0, 0, Luma([255]));
        m.put_pixel(1, 1, Luma([255]));
        m.put_pixel(2, 2, Luma([255]));
        let info = largest_component(&m).expect("component");
        assert_eq!(info.area, 3);
    }
}

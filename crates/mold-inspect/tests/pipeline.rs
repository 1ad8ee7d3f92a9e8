//! End-to-end pipeline: generate a grid, persist it, reload it and inspect
//! a synthetic capture of a two-unit array.

use image::{GrayImage, Luma};
use mold_inspect::grid::{generate, BaseUnit, ExclusionAlignment, GridMetadata};
use mold_inspect::{
    loader, DefectParams, GridDocument, GridParameters, ImageStore, InspectionRunner, UnitRect,
    Verdict,
};

const UNIT: u32 = 24;

fn layout() -> (UnitRect, GridParameters) {
    let base = UnitRect {
        index: 0,
        x: 4,
        y: 4,
        w: UNIT,
        h: UNIT,
    };
    let params = GridParameters {
        units_x: 2,
        units_y: 1,
        blocks_x: 1,
        blocks_y: 1,
        unit_space_x: 4,
        unit_space_y: 0,
        block_space_x: 0,
        block_space_y: 0,
    };
    (base, params)
}

/// Bright frame, two dark molded surfaces, an optional bright defect speck
/// on the second unit.
fn capture(defect_in_second: bool) -> GrayImage {
    let mut img = GrayImage::from_pixel(64, 32, Luma([200]));
    for (unit, x0) in [(0u32, 4u32), (1, 32)] {
        for y in 7..25 {
            for x in x0 + 3..x0 + 21 {
                img.put_pixel(x, y, Luma([50]));
            }
        }
        if unit == 1 && defect_in_second {
            for y in 13..18 {
                for x in x0 + 9..x0 + 14 {
                    img.put_pixel(x, y, Luma([240]));
                }
            }
        }
    }
    img
}

fn detector() -> DefectParams {
    // the median background window spills past the dark surface into the
    // bright frame, so the threshold sits above that contrast (150)
    DefectParams {
        threshold: 160,
        min_area: 10,
        ..DefectParams::default()
    }
}

#[test]
fn document_round_trip_preserves_the_grid() {
    let (base, params) = layout();
    let units = generate(base, &params);
    assert_eq!(units.len(), 2);

    let metadata = GridMetadata {
        image_width: 64,
        image_height: 32,
        params,
        base_unit: BaseUnit {
            x: base.x,
            y: base.y,
            w: base.w,
            h: base.h,
        },
    };
    let doc = GridDocument::new(metadata, &units, Vec::new(), None);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grid.json");
    doc.write_json(&path).unwrap();

    let loaded = GridDocument::load_json(&path).unwrap();
    assert_eq!(loaded.units(), units);
    assert_eq!(loaded.metadata.unwrap().params, params);
}

#[test]
fn inspection_from_a_persisted_document_flags_the_defect() {
    let (base, params) = layout();
    let units = generate(base, &params);
    let metadata = GridMetadata {
        image_width: 64,
        image_height: 32,
        params,
        base_unit: BaseUnit {
            x: base.x,
            y: base.y,
            w: base.w,
            h: base.h,
        },
    };

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grid.json");
    GridDocument::new(metadata, &units, Vec::new(), None)
        .write_json(&path)
        .unwrap();

    let doc = GridDocument::load_json(&path).unwrap();
    let mut runner = InspectionRunner::new(doc.units());
    runner.defect_params = detector();

    let mut store = ImageStore::new();
    store.insert("ref.png", capture(false)).unwrap();
    store.set_reference(std::path::Path::new("ref.png")).unwrap();
    {
        let state = store.current_mut().unwrap();
        let results = runner.inspect(state, true).unwrap();
        assert!(results.iter().all(|r| r.verdict == Verdict::Ok));
    }
    assert_eq!(runner.ref_centroids().len(), 2);

    store.insert("part.png", capture(true)).unwrap();
    let state = store.current_mut().unwrap();
    let results = runner.inspect(state, false).unwrap().to_vec();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].verdict, Verdict::Ok);
    assert_eq!(results[1].verdict, Verdict::Ng);
    assert!(results[1].defect_area >= 10);

    // anchors recorded on the reference survive in the exported document
    let mut exported = doc.clone();
    exported.exclusion_alignment = Some(ExclusionAlignment::from_centroids(
        runner.ref_centroids().clone(),
    ));
    let out = dir.path().join("out.json");
    exported.write_json(&out).unwrap();
    let reloaded = GridDocument::load_json(&out).unwrap();
    let alignment = reloaded.exclusion_alignment.unwrap();
    assert_eq!(alignment.kind, "seg_centroid_xy");
    assert_eq!(alignment.ref_centroids.len(), 2);
}

#[test]
fn numeric_array_capture_feeds_the_pipeline() {
    // a tiny capture written as a text array loads and segments
    let img = capture(false);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("capture.txt");
    let mut text = String::new();
    for y in 0..img.height() {
        for x in 0..img.width() {
            if x > 0 {
                text.push(' ');
            }
            text.push_str(&img.get_pixel(x, y)[0].to_string());
        }
        text.push('\n');
    }
    std::fs::write(&path, text).unwrap();

    let loaded = loader::load_gray(&path).unwrap();
    assert_eq!(loaded, img);

    let (base, params) = layout();
    let mut runner = InspectionRunner::new(generate(base, &params));
    runner.defect_params = detector();
    let mut store = ImageStore::new();
    store.insert(&path, loaded).unwrap();
    let state = store.current_mut().unwrap();
    let results = runner.inspect(state, true).unwrap();
    assert!(results.iter().all(|r| r.verdict == Verdict::Ok));
}

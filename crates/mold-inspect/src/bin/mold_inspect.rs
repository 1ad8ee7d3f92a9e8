//! Command-line inspection driver: load a grid document and a capture, run
//! segmentation + defect inspection, print per-unit verdicts and optionally
//! export masks.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;

use mold_inspect::core::init_logging;
use mold_inspect::grid::{embed_masks, export_masks_csv, ExclusionAlignment, GridDocument};
use mold_inspect::{loader, ImageStore, InspectionRunner, Verdict};

/// Grid-indexed segmentation and defect inspection for molded-unit arrays.
#[derive(Parser, Debug)]
#[command(name = "mold-inspect", version, about)]
struct Args {
    /// Capture to inspect.
    image: PathBuf,

    /// Grid document (JSON) with unit boxes and exclusions.
    #[arg(long)]
    grid: PathBuf,

    /// Reference capture anchoring exclusion alignment. Without it the
    /// inspected capture anchors itself.
    #[arg(long)]
    reference: Option<PathBuf>,

    /// Write per-unit mask PNGs and a summary CSV into this directory.
    #[arg(long, value_name = "DIR")]
    export_masks: Option<PathBuf>,

    /// Write a combined grid+masks JSON document to this path.
    #[arg(long, value_name = "FILE")]
    export_json: Option<PathBuf>,

    /// Residual threshold for defect detection.
    #[arg(long)]
    threshold: Option<u8>,

    /// Minimum defect area in pixels (also the NG threshold).
    #[arg(long)]
    min_area: Option<usize>,

    /// Enable per-unit debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let _ = init_logging(level);

    match run(&args) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(1),
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
    }
}

fn run(args: &Args) -> Result<usize, Box<dyn std::error::Error>> {
    let doc = GridDocument::load_json(&args.grid)?;
    let mut runner = InspectionRunner::new(doc.units());
    runner.exclusions = doc.exclusions.clone();
    if let Some(alignment) = &doc.exclusion_alignment {
        runner.set_ref_centroids(alignment.ref_centroids.clone());
    }
    if let Some(threshold) = args.threshold {
        runner.defect_params.threshold = threshold;
    }
    if let Some(min_area) = args.min_area {
        runner.defect_params.min_area = min_area;
    }

    let mut store = ImageStore::new();
    if let Some(reference) = &args.reference {
        store.insert(reference, loader::load_gray(reference)?)?;
        store.set_reference(reference)?;
        let state = store.current_mut().ok_or("reference capture not stored")?;
        runner.inspect(state, true)?;
    }

    store.insert(&args.image, loader::load_gray(&args.image)?)?;
    let self_anchored = store.reference().is_none();
    let state = store.current_mut().ok_or("capture not stored")?;
    let results = runner.inspect(state, self_anchored)?.to_vec();

    for result in &results {
        let verdict = match result.verdict {
            Verdict::Ng => "NG",
            Verdict::Ok => "OK",
        };
        println!(
            "unit {:4}  {}  area {}",
            result.index, verdict, result.defect_area
        );
    }
    let ng = results.iter().filter(|r| r.verdict == Verdict::Ng).count();
    println!("{} units inspected, {} NG", results.len(), ng);

    if let Some(dir) = &args.export_masks {
        std::fs::create_dir_all(dir)?;
        let state = store.current().ok_or("capture not stored")?;
        let csv = export_masks_csv(dir, &state.seg_masks)?;
        println!("wrote {}", csv.display());
    }
    if let Some(path) = &args.export_json {
        let mut out = doc.clone();
        out.exclusion_alignment = Some(ExclusionAlignment::from_centroids(
            runner.ref_centroids().clone(),
        ));
        let state = store.current().ok_or("capture not stored")?;
        embed_masks(&mut out, &state.seg_masks)?;
        out.write_json(path)?;
        println!("wrote {}", path.display());
    }

    Ok(ng)
}

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use veridoc_core::compare;
use veridoc_core::{
    FaceProvider, MatchPolicy, OnnxFaceProvider, RxingBarcodeProvider, Verifier, VerifyRequest,
};

mod config;
mod report;

/// Verify that a live selfie matches the photo on a DNI and read the PDF417
/// barcode on its back.
#[derive(Parser)]
#[command(name = "veridoc", version)]
struct Cli {
    /// Image of the document front (the printed photo).
    dni_front: PathBuf,

    /// Live selfie image to compare against the document photo.
    selfie: PathBuf,

    /// Image of the document back (PDF417 barcode).
    dni_back: Option<PathBuf>,

    /// Directory containing the ONNX model files.
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Distance cutoff below which the faces count as a match.
    #[arg(long)]
    match_threshold: Option<f32>,

    /// Distance at which match confidence reaches zero.
    #[arg(long)]
    distance_normalizer: Option<f32>,

    /// Skip barcode decoding even when a back image is given.
    #[arg(long)]
    no_barcode: bool,

    /// Emit the report as JSON instead of the text summary.
    #[arg(long)]
    json: bool,

    /// Crop the largest face from the document front and write it here.
    #[arg(long, value_name = "PATH")]
    save_face: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Insufficient or malformed arguments terminate before any processing.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            process::exit(1);
        }
    };

    let cfg = config::Config::from_env();
    let model_dir = cli.model_dir.unwrap_or(cfg.model_dir);
    let policy = MatchPolicy {
        distance_normalizer: cli.distance_normalizer.unwrap_or(cfg.distance_normalizer),
        match_threshold: cli.match_threshold.unwrap_or(cfg.match_threshold),
    };
    tracing::info!(
        model_dir = %model_dir.display(),
        match_threshold = policy.match_threshold,
        distance_normalizer = policy.distance_normalizer,
        "starting verification"
    );

    let mut face = OnnxFaceProvider::load(
        &config::detection_model_path(&model_dir),
        &config::embedding_model_path(&model_dir),
    )
    .context("failed to initialize the face provider")?;

    if let Some(crop_path) = &cli.save_face {
        match save_face_crop(&mut face, &cli.dni_front, crop_path) {
            Ok(()) => tracing::info!(path = %crop_path.display(), "face crop written"),
            Err(e) => tracing::warn!(error = %e, "face crop failed"),
        }
    }

    let mut verifier = Verifier::new(Box::new(face)).with_policy(policy);
    if !cli.no_barcode {
        verifier = verifier.with_barcode(Box::new(RxingBarcodeProvider::new()));
    }

    let report = verifier.verify(&VerifyRequest {
        document_front: cli.dni_front,
        selfie: Some(cli.selfie),
        document_back: cli.dni_back,
    });

    if let Some(record) = &report.barcode_data {
        for problem in veridoc_core::pdf417::validate(record) {
            tracing::warn!(problem = %problem, "barcode record failed validation");
        }
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report::render(&report));
    }

    Ok(())
}

/// Crop the largest detected face from the document front and write it to
/// `out`. Advisory: failures are logged by the caller, never fatal.
fn save_face_crop(face: &mut OnnxFaceProvider, front: &Path, out: &Path) -> Result<()> {
    let regions = face.detect(front)?;
    let region =
        compare::primary_region(&regions).context("no face detected in the document front")?;

    let image = image::open(front)
        .with_context(|| format!("failed to load {}", front.display()))?
        .to_rgb8();
    let crop = image::imageops::crop_imm(
        &image,
        region.left.max(0) as u32,
        region.top.max(0) as u32,
        region.width().max(1) as u32,
        region.height().max(1) as u32,
    )
    .to_image();
    crop.save(out).with_context(|| format!("failed to write {}", out.display()))?;
    Ok(())
}

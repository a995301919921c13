use std::path::{Path, PathBuf};

use veridoc_core::types::{DEFAULT_DISTANCE_NORMALIZER, DEFAULT_MATCH_THRESHOLD};

/// CLI configuration, loaded from environment variables. Command-line flags
/// take precedence over everything here.
pub struct Config {
    /// Directory containing the ONNX model files.
    pub model_dir: PathBuf,
    /// Distance cutoff for a positive match.
    pub match_threshold: f32,
    /// Distance at which match confidence reaches zero.
    pub distance_normalizer: f32,
}

impl Config {
    /// Load configuration from `VERIDOC_*` environment variables with
    /// defaults.
    pub fn from_env() -> Self {
        let model_dir = std::env::var("VERIDOC_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| veridoc_core::default_model_dir());

        Self {
            model_dir,
            match_threshold: env_f32("VERIDOC_MATCH_THRESHOLD", DEFAULT_MATCH_THRESHOLD),
            distance_normalizer: env_f32("VERIDOC_DISTANCE_NORMALIZER", DEFAULT_DISTANCE_NORMALIZER),
        }
    }
}

/// Path to the SCRFD detection model.
pub fn detection_model_path(model_dir: &Path) -> PathBuf {
    model_dir.join("det_10g.onnx")
}

/// Path to the ArcFace embedding model.
pub fn embedding_model_path(model_dir: &Path) -> PathBuf {
    model_dir.join("w600k_r50.onnx")
}

fn env_f32(key: &str, default: f32) -> f32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

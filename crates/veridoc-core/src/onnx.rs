//! ONNX-backed face capability provider.

use std::path::Path;

use image::RgbImage;

use crate::detector::FaceDetector;
use crate::embedder::FaceEmbedder;
use crate::provider::{FaceProvider, ProviderError};
use crate::types::{Embedding, FaceRegion};

/// Couples the SCRFD detector and ArcFace embedder behind [`FaceProvider`].
pub struct OnnxFaceProvider {
    detector: FaceDetector,
    embedder: FaceEmbedder,
}

impl OnnxFaceProvider {
    /// Load both models. Fails fast if either file is missing.
    pub fn load(detection_model: &Path, embedding_model: &Path) -> Result<Self, ProviderError> {
        Ok(Self {
            detector: FaceDetector::load(detection_model)?,
            embedder: FaceEmbedder::load(embedding_model)?,
        })
    }
}

fn load_rgb(path: &Path) -> Result<RgbImage, ProviderError> {
    let image = image::open(path).map_err(|e| ProviderError::ImageLoad {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(image.to_rgb8())
}

impl FaceProvider for OnnxFaceProvider {
    fn detect(&mut self, path: &Path) -> Result<Vec<FaceRegion>, ProviderError> {
        let image = load_rgb(path)?;
        self.detector.detect(&image)
    }

    fn embeddings(&mut self, path: &Path) -> Result<Vec<Embedding>, ProviderError> {
        let image = load_rgb(path)?;
        let regions = self.detector.detect(&image)?;
        tracing::debug!(path = %path.display(), faces = regions.len(), "extracting embeddings");
        regions.iter().map(|region| self.embedder.extract(&image, region)).collect()
    }
}

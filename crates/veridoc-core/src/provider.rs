//! Capability interfaces for the external vision and barcode engines.
//!
//! The orchestration layer only ever talks to these traits; concrete
//! implementations live in [`crate::onnx`] and [`crate::scanner`].

use std::path::Path;

use thiserror::Error;

use crate::types::{Embedding, FaceRegion};

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("failed to load image {path}: {reason}")]
    ImageLoad { path: String, reason: String },
    #[error("model file not found: {0}")]
    ModelNotFound(String),
    #[error("inference failed: {0}")]
    InferenceFailed(String),
    #[error("barcode scan failed: {0}")]
    ScanFailed(String),
    #[error("ort: {0}")]
    Ort(#[from] ort::Error),
}

/// Face capability provider: region detection and embedding extraction.
///
/// The two operations are independent calls into the provider;
/// [`embeddings`](FaceProvider::embeddings) re-detects internally and
/// returns results in the provider's own detection order, which is not
/// guaranteed to agree with any selection applied to
/// [`detect`](FaceProvider::detect) output.
///
/// Implementations may hold inference sessions, hence `&mut self`.
pub trait FaceProvider {
    /// Detect face regions in the image at `path`.
    fn detect(&mut self, path: &Path) -> Result<Vec<FaceRegion>, ProviderError>;

    /// Extract one embedding per detected face, in detection order.
    fn embeddings(&mut self, path: &Path) -> Result<Vec<Embedding>, ProviderError>;
}

/// Barcode symbologies this system distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Pdf417,
    QrCode,
    Code128,
    Other,
}

/// One decoded barcode symbol: symbology tag plus raw payload bytes.
#[derive(Debug, Clone)]
pub struct BarcodeSymbol {
    pub kind: SymbolKind,
    pub payload: Vec<u8>,
}

/// Barcode capability provider: symbol localization and payload decoding.
pub trait BarcodeProvider {
    /// Scan the image at `path` for barcode symbols, in the provider's own
    /// discovery order. An image with no decodable symbols yields an empty
    /// list, not an error.
    fn scan(&mut self, path: &Path) -> Result<Vec<BarcodeSymbol>, ProviderError>;
}

//! veridoc-core — Document/selfie identity verification engine.
//!
//! Compares the photo printed on a DNI front against a live selfie using
//! SCRFD face detection and ArcFace embeddings via ONNX Runtime, and reads
//! the PDF417 barcode on the document back through rxing. The orchestration
//! layer talks to both engines through narrow capability traits and is
//! testable with stub providers.

pub mod compare;
pub mod detector;
pub mod embedder;
pub mod onnx;
pub mod pdf417;
pub mod provider;
pub mod scanner;
pub mod types;
pub mod verifier;

pub use onnx::OnnxFaceProvider;
pub use provider::{BarcodeProvider, FaceProvider, ProviderError};
pub use scanner::RxingBarcodeProvider;
pub use types::{
    BarcodeRecord, ComparisonResult, Embedding, FaceRegion, MatchPolicy, VerificationReport,
};
pub use verifier::{Verifier, VerifyRequest};

use std::path::PathBuf;

/// Default directory for the ONNX model files.
pub fn default_model_dir() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local/share")
        })
        .join("veridoc/models")
}

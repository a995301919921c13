//! Verification orchestrator: sequences the barcode and face steps and
//! aggregates their outcomes into a single report.

use std::path::PathBuf;

use crate::compare;
use crate::pdf417;
use crate::provider::{BarcodeProvider, FaceProvider};
use crate::types::{MatchPolicy, VerificationReport};

/// Inputs for one verification run.
#[derive(Debug, Clone)]
pub struct VerifyRequest {
    pub document_front: PathBuf,
    pub selfie: Option<PathBuf>,
    pub document_back: Option<PathBuf>,
}

/// Sequences the capability providers over one document/selfie set.
///
/// Built once per configuration; each [`verify`](Verifier::verify) call is
/// independent and holds no state across runs. A failing sub-step appends
/// one message and the run continues — the barcode and face outcomes never
/// short-circuit each other.
pub struct Verifier {
    face: Box<dyn FaceProvider>,
    barcode: Option<Box<dyn BarcodeProvider>>,
    policy: MatchPolicy,
}

impl Verifier {
    pub fn new(face: Box<dyn FaceProvider>) -> Self {
        Self { face, barcode: None, policy: MatchPolicy::default() }
    }

    /// Enable barcode decoding for document backs.
    pub fn with_barcode(mut self, provider: Box<dyn BarcodeProvider>) -> Self {
        self.barcode = Some(provider);
        self
    }

    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn verify(&mut self, request: &VerifyRequest) -> VerificationReport {
        let mut report = VerificationReport {
            success: false,
            face_match: None,
            barcode_data: None,
            errors: Vec::new(),
        };

        if let (Some(provider), Some(back)) =
            (self.barcode.as_deref_mut(), request.document_back.as_deref())
        {
            if back.exists() {
                tracing::info!(path = %back.display(), "decoding document back");
                match pdf417::extract_record(provider, back) {
                    Ok(record) => {
                        tracing::info!(document = %record.document_number, "PDF417 decoded");
                        report.barcode_data = Some(record);
                    }
                    Err(error) => {
                        tracing::warn!(error = %error, "barcode step failed");
                        report.errors.push(format!("barcode decoding failed: {error}"));
                    }
                }
            } else {
                // A back image that never made it to disk is not an error.
                tracing::debug!(path = %back.display(), "document back not found, skipping barcode step");
            }
        }

        if let Some(selfie) = request.selfie.as_deref() {
            tracing::info!(
                document = %request.document_front.display(),
                selfie = %selfie.display(),
                "comparing faces"
            );
            let result = compare::compare_faces(
                self.face.as_mut(),
                &request.document_front,
                selfie,
                &self.policy,
            );
            if let Some(error) = &result.error {
                report.errors.push(format!("face comparison failed: {error}"));
            }
            report.face_match = Some(result);
        }

        report.success = report.errors.is_empty();
        report
    }
}

//! Fixed-format console report.

use std::fmt::Write;

use veridoc_core::VerificationReport;

const RULE: &str = "==================================================";

/// Render the verification report in the fixed text layout.
pub fn render(report: &VerificationReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "VERIFICATION RESULT");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Success: {}", report.success);

    if let Some(face) = &report.face_match {
        let _ = writeln!(out, "Face match: {}", face.is_match);
        let _ = writeln!(out, "Distance: {:.4}", face.distance);
        let _ = writeln!(out, "Confidence: {:.2}", face.confidence);
    }

    if let Some(record) = &report.barcode_data {
        let _ = writeln!(out, "Document: {}", record.document_number);
        let _ = writeln!(out, "Name: {}", record.full_name());
    }

    if !report.errors.is_empty() {
        let _ = writeln!(out, "Errors:");
        for error in &report.errors {
            let _ = writeln!(out, "  - {error}");
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use veridoc_core::{BarcodeRecord, ComparisonResult};

    fn comparison(distance: f32, confidence: f32, is_match: bool) -> ComparisonResult {
        ComparisonResult {
            success: true,
            distance,
            confidence,
            is_match,
            threshold: 0.5,
            error: None,
        }
    }

    #[test]
    fn test_render_full_report() {
        let report = VerificationReport {
            success: true,
            face_match: Some(comparison(0.3124, 0.4793, true)),
            barcode_data: Some(BarcodeRecord {
                document_number: "12345678".into(),
                first_name: "JUAN".into(),
                last_name: "PEREZ".into(),
                ..Default::default()
            }),
            errors: Vec::new(),
        };

        let text = render(&report);
        assert!(text.contains("Success: true"));
        assert!(text.contains("Face match: true"));
        assert!(text.contains("Distance: 0.3124"));
        assert!(text.contains("Confidence: 0.48"));
        assert!(text.contains("Document: 12345678"));
        assert!(text.contains("Name: JUAN PEREZ"));
        assert!(!text.contains("Errors:"));
    }

    #[test]
    fn test_render_omits_absent_sections() {
        let report = VerificationReport {
            success: true,
            face_match: None,
            barcode_data: None,
            errors: Vec::new(),
        };

        let text = render(&report);
        assert!(text.contains("Success: true"));
        assert!(!text.contains("Face match"));
        assert!(!text.contains("Document:"));
    }

    #[test]
    fn test_render_bullets_errors() {
        let report = VerificationReport {
            success: false,
            face_match: None,
            barcode_data: None,
            errors: vec!["barcode decoding failed: no PDF417 barcode found".into()],
        };

        let text = render(&report);
        assert!(text.contains("Success: false"));
        assert!(text.contains("Errors:\n  - barcode decoding failed"));
    }

    #[test]
    fn test_render_infinite_distance() {
        let report = VerificationReport {
            success: false,
            face_match: Some(ComparisonResult {
                success: false,
                distance: f32::INFINITY,
                confidence: 0.0,
                is_match: false,
                threshold: 0.5,
                error: Some("could not extract a face encoding".into()),
            }),
            barcode_data: None,
            errors: vec!["face comparison failed".into()],
        };

        let text = render(&report);
        assert!(text.contains("Distance: inf"));
        assert!(text.contains("Confidence: 0.00"));
    }
}

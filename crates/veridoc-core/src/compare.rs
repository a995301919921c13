//! Face selection and comparison policy.

use std::path::Path;

use thiserror::Error;

use crate::provider::{FaceProvider, ProviderError};
use crate::types::{ComparisonResult, Embedding, FaceRegion, MatchPolicy};

#[derive(Error, Debug)]
pub enum CompareError {
    #[error("no face encoding extracted from {0}")]
    NoEncoding(String),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Pick the region with the largest pixel area; ties keep the earlier one.
///
/// This drives face cropping only. Comparison always uses the provider's
/// first embedding, which on multi-face images may belong to a different
/// face than the one chosen here.
pub fn primary_region(regions: &[FaceRegion]) -> Option<&FaceRegion> {
    let mut best: Option<&FaceRegion> = None;
    for region in regions {
        match best {
            Some(b) if b.area() >= region.area() => {}
            _ => best = Some(region),
        }
    }
    best
}

/// Extract the provider's first embedding for the image at `path`.
fn primary_embedding(
    provider: &mut dyn FaceProvider,
    path: &Path,
) -> Result<Embedding, CompareError> {
    let mut embeddings = provider.embeddings(path)?;
    if embeddings.is_empty() {
        return Err(CompareError::NoEncoding(path.display().to_string()));
    }
    Ok(embeddings.swap_remove(0))
}

/// Compare the document photo against the live selfie.
///
/// Extraction failures are folded into a structured non-success result
/// rather than propagated; the run that called us decides what to do with
/// the message.
pub fn compare_faces(
    provider: &mut dyn FaceProvider,
    document: &Path,
    selfie: &Path,
    policy: &MatchPolicy,
) -> ComparisonResult {
    let document_embedding = primary_embedding(provider, document);
    let selfie_embedding = primary_embedding(provider, selfie);

    let (a, b) = match (document_embedding, selfie_embedding) {
        (Ok(a), Ok(b)) => (a, b),
        (document_result, selfie_result) => {
            for error in [document_result.err(), selfie_result.err()].into_iter().flatten() {
                tracing::warn!(error = %error, "embedding extraction failed");
            }
            return ComparisonResult {
                success: false,
                distance: f32::INFINITY,
                confidence: 0.0,
                is_match: false,
                threshold: policy.match_threshold,
                error: Some("could not extract a face encoding from one or both images".into()),
            };
        }
    };

    let distance = a.euclidean_distance(&b);
    let confidence = policy.confidence(distance);
    let is_match = policy.is_match(distance);
    tracing::info!(distance, confidence, is_match, "face comparison complete");

    ComparisonResult {
        success: true,
        distance,
        confidence,
        is_match,
        threshold: policy.match_threshold,
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;

    /// Stub provider returning canned embeddings keyed by path.
    struct FixedEmbeddings {
        by_path: HashMap<PathBuf, Vec<Vec<f32>>>,
    }

    impl FixedEmbeddings {
        fn new(entries: &[(&str, Vec<Vec<f32>>)]) -> Self {
            Self {
                by_path: entries
                    .iter()
                    .map(|(path, values)| (PathBuf::from(path), values.clone()))
                    .collect(),
            }
        }
    }

    impl FaceProvider for FixedEmbeddings {
        fn detect(&mut self, _path: &Path) -> Result<Vec<FaceRegion>, ProviderError> {
            Ok(Vec::new())
        }

        fn embeddings(&mut self, path: &Path) -> Result<Vec<Embedding>, ProviderError> {
            Ok(self
                .by_path
                .get(path)
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .map(|values| Embedding { values })
                .collect())
        }
    }

    struct FailingProvider;

    impl FaceProvider for FailingProvider {
        fn detect(&mut self, _path: &Path) -> Result<Vec<FaceRegion>, ProviderError> {
            Ok(Vec::new())
        }

        fn embeddings(&mut self, path: &Path) -> Result<Vec<Embedding>, ProviderError> {
            Err(ProviderError::ImageLoad {
                path: path.display().to_string(),
                reason: "unsupported format".into(),
            })
        }
    }

    fn region(top: i32, right: i32, bottom: i32, left: i32) -> FaceRegion {
        FaceRegion { top, right, bottom, left, confidence: 0.9 }
    }

    #[test]
    fn test_primary_region_largest_wins() {
        let regions = vec![region(0, 10, 10, 0), region(0, 40, 40, 0), region(0, 20, 20, 0)];
        let chosen = primary_region(&regions).unwrap();
        assert_eq!(chosen.area(), 1600);
    }

    #[test]
    fn test_primary_region_tie_keeps_first() {
        let first = region(0, 10, 10, 0);
        let second = region(100, 110, 110, 100);
        let regions = vec![first.clone(), second];
        assert_eq!(primary_region(&regions), Some(&first));
    }

    #[test]
    fn test_primary_region_empty() {
        assert!(primary_region(&[]).is_none());
    }

    #[test]
    fn test_compare_identical_embeddings() {
        let mut provider = FixedEmbeddings::new(&[
            ("front.jpg", vec![vec![0.5, 0.5, -0.2]]),
            ("selfie.jpg", vec![vec![0.5, 0.5, -0.2]]),
        ]);

        let result = compare_faces(
            &mut provider,
            Path::new("front.jpg"),
            Path::new("selfie.jpg"),
            &MatchPolicy::default(),
        );

        assert!(result.success);
        assert_eq!(result.distance, 0.0);
        assert_eq!(result.confidence, 1.0);
        assert!(result.is_match);
        assert_eq!(result.threshold, 0.5);
        assert!(result.error.is_none());
    }

    #[test]
    fn test_compare_different_faces_not_matched() {
        // Orthogonal unit vectors: distance sqrt(2), well past both cutoffs.
        let mut provider = FixedEmbeddings::new(&[
            ("front.jpg", vec![vec![1.0, 0.0]]),
            ("selfie.jpg", vec![vec![0.0, 1.0]]),
        ]);

        let result = compare_faces(
            &mut provider,
            Path::new("front.jpg"),
            Path::new("selfie.jpg"),
            &MatchPolicy::default(),
        );

        assert!(result.success);
        assert!((result.distance - std::f32::consts::SQRT_2).abs() < 1e-6);
        assert_eq!(result.confidence, 0.0);
        assert!(!result.is_match);
        assert!(result.error.is_none());
    }

    #[test]
    fn test_compare_uses_first_embedding_not_best() {
        // The selfie matches the document's SECOND embedding exactly, but
        // comparison must take index 0 of each list.
        let mut provider = FixedEmbeddings::new(&[
            ("front.jpg", vec![vec![1.0, 0.0], vec![0.0, 1.0]]),
            ("selfie.jpg", vec![vec![0.0, 1.0]]),
        ]);

        let result = compare_faces(
            &mut provider,
            Path::new("front.jpg"),
            Path::new("selfie.jpg"),
            &MatchPolicy::default(),
        );

        assert!(result.success);
        assert!(result.distance > 1.0);
        assert!(!result.is_match);
    }

    #[test]
    fn test_compare_extraction_failure() {
        // No embeddings for the selfie image.
        let mut provider =
            FixedEmbeddings::new(&[("front.jpg", vec![vec![1.0, 0.0]]), ("selfie.jpg", vec![])]);

        let result = compare_faces(
            &mut provider,
            Path::new("front.jpg"),
            Path::new("selfie.jpg"),
            &MatchPolicy::default(),
        );

        assert!(!result.success);
        assert!(result.distance.is_infinite());
        assert_eq!(result.confidence, 0.0);
        assert!(!result.is_match);
        assert!(result.error.is_some());
    }

    #[test]
    fn test_compare_provider_error() {
        let mut provider = FailingProvider;

        let result = compare_faces(
            &mut provider,
            Path::new("front.jpg"),
            Path::new("selfie.jpg"),
            &MatchPolicy::default(),
        );

        assert!(!result.success);
        assert!(result.distance.is_infinite());
        assert!(result.error.is_some());
    }

    #[test]
    fn test_compare_respects_policy_override() {
        let mut provider = FixedEmbeddings::new(&[
            ("front.jpg", vec![vec![0.0, 0.0]]),
            ("selfie.jpg", vec![vec![0.3, 0.0]]),
        ]);
        let policy = MatchPolicy { distance_normalizer: 0.6, match_threshold: 0.25 };

        let result =
            compare_faces(&mut provider, Path::new("front.jpg"), Path::new("selfie.jpg"), &policy);

        assert!(result.success);
        assert!((result.distance - 0.3).abs() < 1e-6);
        // Under the default threshold this would match; the override says no.
        assert!(!result.is_match);
        assert_eq!(result.threshold, 0.25);
    }
}

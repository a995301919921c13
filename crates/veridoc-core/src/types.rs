use serde::Serialize;

/// Default divisor mapping embedding distance onto the [0, 1] confidence scale.
pub const DEFAULT_DISTANCE_NORMALIZER: f32 = 0.6;

/// Default distance cutoff below which two faces count as the same person.
pub const DEFAULT_MATCH_THRESHOLD: f32 = 0.5;

/// Axis-aligned bounds of one detected face, in pixel coordinates of the
/// source image.
///
/// Bounds follow the (top, right, bottom, left) convention, with
/// `bottom > top` and `right > left`.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceRegion {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
    /// Detector score, carried for logging and crop selection.
    pub confidence: f32,
}

impl FaceRegion {
    /// Pixel area of the region.
    pub fn area(&self) -> i64 {
        (self.bottom - self.top) as i64 * (self.right - self.left) as i64
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

/// Face embedding vector (512-dimensional for ArcFace), opaque beyond its
/// distance metric.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    pub values: Vec<f32>,
}

impl Embedding {
    /// Compute Euclidean distance between two embeddings.
    pub fn euclidean_distance(&self, other: &Embedding) -> f32 {
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f32>()
            .sqrt()
    }
}

/// Tunable thresholds for face comparison.
#[derive(Debug, Clone, Copy)]
pub struct MatchPolicy {
    /// Distance at or beyond which confidence bottoms out at 0.0.
    pub distance_normalizer: f32,
    /// Distances strictly below this count as a match.
    pub match_threshold: f32,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            distance_normalizer: DEFAULT_DISTANCE_NORMALIZER,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }
}

impl MatchPolicy {
    /// Linear rescaling of distance onto [0, 1]: distance 0 maps to 1.0,
    /// anything at or beyond the normalizer maps to 0.0. A heuristic score,
    /// not a calibrated probability.
    pub fn confidence(&self, distance: f32) -> f32 {
        (1.0 - distance / self.distance_normalizer).clamp(0.0, 1.0)
    }

    pub fn is_match(&self, distance: f32) -> bool {
        distance < self.match_threshold
    }
}

/// Outcome of comparing the document photo against the live selfie.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub success: bool,
    /// Euclidean distance between the two embeddings; +inf when extraction
    /// failed for either image.
    pub distance: f32,
    pub confidence: f32,
    pub is_match: bool,
    pub threshold: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Identity fields recovered from the PDF417 payload on the document back.
///
/// Every field defaults to the empty string when not recoverable.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BarcodeRecord {
    pub document_number: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: String,
    pub gender: String,
    pub expiration_date: String,
    pub raw_payload: String,
}

impl BarcodeRecord {
    /// First and last name concatenated for display.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Aggregated outcome of one verification run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    pub success: bool,
    pub face_match: Option<ComparisonResult>,
    pub barcode_data: Option<BarcodeRecord>,
    pub errors: Vec<String>,
}

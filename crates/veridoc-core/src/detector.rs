//! SCRFD face detector via ONNX Runtime.
//!
//! Anchor-free decoding over three stride levels with NMS post-processing,
//! operating on RGB images loaded from disk.

use std::path::Path;

use image::RgbImage;
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;

use crate::provider::ProviderError;
use crate::types::FaceRegion;

const INPUT_SIZE: u32 = 640;
const PIXEL_MEAN: f32 = 127.5;
const PIXEL_STD: f32 = 128.0;
const SCORE_THRESHOLD: f32 = 0.5;
const NMS_IOU_THRESHOLD: f32 = 0.4;
const STRIDES: [usize; 3] = [8, 16, 32];
const ANCHORS_PER_CELL: usize = 2;

/// Candidate detection in input-tensor coordinates.
struct Candidate {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    score: f32,
}

/// SCRFD-based face detector.
pub struct FaceDetector {
    session: Session,
}

impl FaceDetector {
    /// Load the SCRFD ONNX model from the given path.
    pub fn load(model_path: &Path) -> Result<Self, ProviderError> {
        if !model_path.exists() {
            return Err(ProviderError::ModelNotFound(model_path.display().to_string()));
        }

        let session = Session::builder()?
            .with_intra_threads(2)?
            .commit_from_file(model_path)?;

        let output_names: Vec<String> =
            session.outputs().iter().map(|o| o.name().to_string()).collect();
        if output_names.len() < 2 * STRIDES.len() {
            return Err(ProviderError::InferenceFailed(format!(
                "detection model must expose score and box outputs for {} strides, got {} outputs",
                STRIDES.len(),
                output_names.len()
            )));
        }

        tracing::info!(
            path = %model_path.display(),
            outputs = ?output_names,
            "loaded face detection model"
        );

        Ok(Self { session })
    }

    /// Detect faces, returning integer pixel regions sorted by confidence
    /// descending.
    pub fn detect(&mut self, image: &RgbImage) -> Result<Vec<FaceRegion>, ProviderError> {
        let (width, height) = image.dimensions();
        let resized = image::imageops::resize(
            image,
            INPUT_SIZE,
            INPUT_SIZE,
            image::imageops::FilterType::Triangle,
        );
        let input = preprocess(&resized);

        let outputs = self.session.run(ort::inputs![TensorRef::from_array_view(input.view())?])?;

        // Output layout is positional: [0..3) scores, [3..6) boxes, one pair
        // per stride.
        let mut candidates = Vec::new();
        for (stride_pos, &stride) in STRIDES.iter().enumerate() {
            let (_, scores) = outputs[stride_pos].try_extract_tensor::<f32>().map_err(|e| {
                ProviderError::InferenceFailed(format!("scores stride {stride}: {e}"))
            })?;
            let (_, boxes) =
                outputs[stride_pos + STRIDES.len()].try_extract_tensor::<f32>().map_err(|e| {
                    ProviderError::InferenceFailed(format!("boxes stride {stride}: {e}"))
                })?;
            candidates.extend(decode_stride(scores, boxes, stride));
        }

        let kept = nms(candidates, NMS_IOU_THRESHOLD);

        // Map from tensor space back to source pixels.
        let scale_x = width as f32 / INPUT_SIZE as f32;
        let scale_y = height as f32 / INPUT_SIZE as f32;
        let mut regions: Vec<FaceRegion> = kept
            .iter()
            .filter_map(|candidate| to_region(candidate, scale_x, scale_y, width, height))
            .collect();
        regions.sort_by(|a, b| {
            b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal)
        });

        tracing::debug!(faces = regions.len(), "detection complete");
        Ok(regions)
    }
}

/// Normalize a resized RGB image into a NCHW float tensor.
fn preprocess(resized: &RgbImage) -> Array4<f32> {
    let size = INPUT_SIZE as usize;
    let mut tensor = Array4::<f32>::zeros((1, 3, size, size));
    for (x, y, pixel) in resized.enumerate_pixels() {
        for channel in 0..3 {
            tensor[[0, channel, y as usize, x as usize]] =
                (pixel[channel] as f32 - PIXEL_MEAN) / PIXEL_STD;
        }
    }
    tensor
}

/// Decode candidates for a single stride level.
///
/// Box offsets are distances from the anchor center in stride units:
/// [left, top, right, bottom].
fn decode_stride(scores: &[f32], boxes: &[f32], stride: usize) -> Vec<Candidate> {
    let grid_w = INPUT_SIZE as usize / stride;
    let grid_h = INPUT_SIZE as usize / stride;
    let num_anchors = grid_w * grid_h * ANCHORS_PER_CELL;

    let mut candidates = Vec::new();
    for idx in 0..num_anchors {
        let score = scores.get(idx).copied().unwrap_or(0.0);
        if score <= SCORE_THRESHOLD {
            continue;
        }

        let cell = idx / ANCHORS_PER_CELL;
        let anchor_cx = (cell % grid_w) as f32 * stride as f32;
        let anchor_cy = (cell / grid_w) as f32 * stride as f32;

        let off = idx * 4;
        if off + 3 >= boxes.len() {
            continue;
        }

        candidates.push(Candidate {
            x1: anchor_cx - boxes[off] * stride as f32,
            y1: anchor_cy - boxes[off + 1] * stride as f32,
            x2: anchor_cx + boxes[off + 2] * stride as f32,
            y2: anchor_cy + boxes[off + 3] * stride as f32,
            score,
        });
    }
    candidates
}

/// Non-Maximum Suppression: keep the highest-scoring candidate of each
/// overlapping cluster.
fn nms(mut candidates: Vec<Candidate>, iou_threshold: f32) -> Vec<Candidate> {
    candidates
        .sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    let mut keep: Vec<Candidate> = Vec::new();
    for candidate in candidates {
        if keep.iter().all(|kept| iou(kept, &candidate) <= iou_threshold) {
            keep.push(candidate);
        }
    }
    keep
}

fn iou(a: &Candidate, b: &Candidate) -> f32 {
    let inter_w = (a.x2.min(b.x2) - a.x1.max(b.x1)).max(0.0);
    let inter_h = (a.y2.min(b.y2) - a.y1.max(b.y1)).max(0.0);
    let inter = inter_w * inter_h;
    let union = (a.x2 - a.x1) * (a.y2 - a.y1) + (b.x2 - b.x1) * (b.y2 - b.y1) - inter;
    if union > 0.0 {
        inter / union
    } else {
        0.0
    }
}

/// Scale a candidate back to source pixels, clamping to image bounds.
/// Degenerate boxes are dropped.
fn to_region(
    candidate: &Candidate,
    scale_x: f32,
    scale_y: f32,
    width: u32,
    height: u32,
) -> Option<FaceRegion> {
    let left = ((candidate.x1 * scale_x).round() as i32).clamp(0, width as i32 - 1);
    let top = ((candidate.y1 * scale_y).round() as i32).clamp(0, height as i32 - 1);
    let right = ((candidate.x2 * scale_x).round() as i32).clamp(0, width as i32);
    let bottom = ((candidate.y2 * scale_y).round() as i32).clamp(0, height as i32);

    if right <= left || bottom <= top {
        return None;
    }
    Some(FaceRegion { top, right, bottom, left, confidence: candidate.score })
}

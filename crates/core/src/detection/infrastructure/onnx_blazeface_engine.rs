/// BlazeFace face engine using ONNX Runtime via `ort`.
///
/// Runs the short-range BlazeFace model on the detector's luma plane
/// (replicated to three channels). Produces face boxes with class id 0.
use std::path::Path;

use ndarray::{Array4, ArrayView2};

use crate::detection::domain::detection::Detection;
use crate::detection::domain::detection_engine::{DetectionEngine, EngineError};
use crate::detection::infrastructure::execution_provider::preferred_execution_providers;
use crate::detection::infrastructure::math::nms;

/// BlazeFace model input resolution.
const INPUT_SIZE: u32 = 128;

/// Default confidence threshold.
pub const DEFAULT_CONFIDENCE: f32 = 0.5;

/// NMS IoU threshold.
const NMS_IOU_THRESH: f32 = 0.3;

/// Number of BlazeFace anchors (short-range model).
const NUM_ANCHORS: usize = 896;

/// Floats per anchor in the regressor output (box + 6 keypoints).
const REGRESSOR_STRIDE: usize = 16;

pub const FACE_CLASS_ID: u32 = 0;

pub struct OnnxBlazefaceEngine {
    session: ort::session::Session,
    confidence: f32,
    anchors: Vec<[f32; 2]>,
}

impl OnnxBlazefaceEngine {
    /// Load a BlazeFace ONNX model.
    pub fn new(model_path: &Path, confidence: f32) -> Result<Self, EngineError> {
        let session = ort::session::Session::builder()?
            .with_execution_providers(preferred_execution_providers())?
            .commit_from_file(model_path)?;
        log::info!("Loaded BlazeFace model from {}", model_path.display());
        Ok(Self {
            session,
            confidence,
            anchors: generate_anchors(),
        })
    }
}

impl DetectionEngine for OnnxBlazefaceEngine {
    fn name(&self) -> &str {
        "onnx-blazeface"
    }

    fn infer(&mut self, plane: ArrayView2<'_, f32>) -> Result<Vec<Detection>, EngineError> {
        let (fh, fw) = plane.dim();
        if fw == 0 || fh == 0 {
            return Ok(Vec::new());
        }

        // 1. Preprocess: resize to 128x128, replicate luma to 3 channels, NCHW
        let input_tensor = preprocess(plane, INPUT_SIZE);

        // 2. Inference
        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;

        // BlazeFace outputs two tensors:
        // - regressors: [1, 896, 16] (box deltas + keypoints)
        // - classificators: [1, 896, 1] (confidence scores)
        if outputs.len() < 2 {
            return Err(format!("BlazeFace model expected 2 outputs, got {}", outputs.len()).into());
        }

        let regressors = outputs[0].try_extract_array::<f32>()?;
        let scores = outputs[1].try_extract_array::<f32>()?;
        let reg_data = regressors.as_slice().ok_or("Cannot get regressor slice")?;
        let score_data = scores.as_slice().ok_or("Cannot get score slice")?;

        // 3. Decode anchors
        let raw = decode(
            reg_data,
            score_data,
            &self.anchors,
            self.confidence,
            fw as f32,
            fh as f32,
        );

        // 4. NMS
        Ok(nms(raw, NMS_IOU_THRESH))
    }
}

/// Decodes anchor-relative boxes above `confidence` into plane coordinates.
fn decode(
    reg_data: &[f32],
    score_data: &[f32],
    anchors: &[[f32; 2]],
    confidence: f32,
    fw: f32,
    fh: f32,
) -> Vec<Detection> {
    let size = INPUT_SIZE as f32;
    let mut dets = Vec::new();

    for (i, &raw_score) in score_data.iter().enumerate().take(anchors.len()) {
        let score = sigmoid(raw_score);
        if score.is_nan() || score < confidence {
            continue;
        }
        let offset = i * REGRESSOR_STRIDE;
        if offset + 4 > reg_data.len() {
            break;
        }

        let anchor = anchors[i];
        let cx = anchor[0] + reg_data[offset] / size;
        let cy = anchor[1] + reg_data[offset + 1] / size;
        let w = reg_data[offset + 2] / size;
        let h = reg_data[offset + 3] / size;

        let x1 = ((cx - w / 2.0) * fw).max(0.0);
        let y1 = ((cy - h / 2.0) * fh).max(0.0);
        let x2 = ((cx + w / 2.0) * fw).min(fw);
        let y2 = ((cy + h / 2.0) * fh).min(fh);
        if x2 <= x1 || y2 <= y1 {
            continue;
        }

        dets.push(Detection::new(x1, y1, x2 - x1, y2 - y1, score).with_class_id(FACE_CLASS_ID));
    }
    dets
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

/// Nearest-neighbour resize to `size × size`, luma copied into all three
/// channels, NCHW float32.
fn preprocess(plane: ArrayView2<'_, f32>, size: u32) -> Array4<f32> {
    let (src_h, src_w) = plane.dim();
    let s = size as usize;

    let mut tensor = Array4::<f32>::zeros((1, 3, s, s));

    for y in 0..s {
        let src_y = (((y as f64 + 0.5) * src_h as f64 / s as f64) as usize).min(src_h - 1);
        for x in 0..s {
            let src_x = (((x as f64 + 0.5) * src_w as f64 / s as f64) as usize).min(src_w - 1);
            let v = plane[[src_y, src_x]];
            for c in 0..3 {
                tensor[[0, c, y, x]] = v;
            }
        }
    }

    tensor
}

// ---------------------------------------------------------------------------
// Anchor generation (BlazeFace short-range)
// ---------------------------------------------------------------------------

/// The short-range model uses two feature map sizes: 16×16 and 8×8,
/// with 2 and 6 anchors per cell respectively.
fn generate_anchors() -> Vec<[f32; 2]> {
    let strides = [(8, 2), (16, 6)]; // (stride, anchors_per_cell)
    let mut anchors = Vec::with_capacity(NUM_ANCHORS);

    for &(stride, num) in &strides {
        let grid_size = INPUT_SIZE as usize / stride;
        for y in 0..grid_size {
            for x in 0..grid_size {
                let cx = (x as f32 + 0.5) / grid_size as f32;
                let cy = (y as f32 + 0.5) / grid_size as f32;
                for _ in 0..num {
                    anchors.push([cx, cy]);
                }
            }
        }
    }

    anchors
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

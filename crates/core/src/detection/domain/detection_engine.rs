use ndarray::ArrayView2;

use crate::detection::domain::detection::Detection;

pub type EngineError = Box<dyn std::error::Error>;

/// Opaque inference backend behind a detector handle.
///
/// Receives a normalized luma plane (`[0, 1]`, shape `(height, width)`)
/// already rotated into the engine's orientation, and returns boxes in
/// that plane's coordinates. Implementations may keep scratch state,
/// hence `&mut self`.
pub trait DetectionEngine: Send {
    fn name(&self) -> &str;

    fn infer(&mut self, plane: ArrayView2<'_, f32>) -> Result<Vec<Detection>, EngineError>;
}

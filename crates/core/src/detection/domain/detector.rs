use thiserror::Error;

use crate::detection::domain::detection::Detection;
use crate::detection::domain::detection_buffer::DetectionBuffer;
use crate::detection::domain::detection_engine::{DetectionEngine, EngineError};
use crate::detection::domain::image_converter::to_luma_plane;
use crate::detection::domain::orientation::{map_to_source, rotate_plane};
use crate::detection::domain::selection::select_top;
use crate::shared::image_descriptor::{DescriptorError, ImageDescriptor};
use crate::shared::rotation::Rotation;

#[derive(Error, Debug)]
pub enum DetectError {
    #[error(transparent)]
    InvalidImage(#[from] DescriptorError),
    #[error("{engine} engine failed: {source}")]
    Engine {
        engine: String,
        #[source]
        source: EngineError,
    },
}

/// Counts reported by a successful [`Detector::detect`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DetectOutcome {
    /// Records written into the caller's buffer; never above its capacity.
    pub written: usize,
    /// Candidates the engine produced inside the image, before truncation.
    pub candidates: usize,
}

/// One configured detection engine plus its orientation setting.
///
/// The rotation is absolute: [`Detector::rotate`] replaces it, it never
/// composes with the previous value. `detect` takes `&mut self`, so one
/// handle cannot run two calls at once; separate handles are independent.
pub struct Detector {
    engine: Box<dyn DetectionEngine>,
    rotation: Rotation,
}

impl Detector {
    pub fn new(engine: Box<dyn DetectionEngine>) -> Self {
        Self {
            engine,
            rotation: Rotation::default(),
        }
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn rotate(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    /// Runs one inference pass and writes the best detections into `output`.
    ///
    /// Detections are ranked by [`select_top`] and cut to the buffer's
    /// capacity. On error nothing has been written to `output`.
    pub fn detect(
        &mut self,
        image: &ImageDescriptor<'_>,
        output: &mut DetectionBuffer<'_>,
    ) -> Result<DetectOutcome, DetectError> {
        let plane = to_luma_plane(image)?;
        let oriented = rotate_plane(plane.view(), self.rotation);

        let raw = self
            .engine
            .infer(oriented.view())
            .map_err(|source| DetectError::Engine {
                engine: self.engine.name().to_string(),
                source,
            })?;

        let (sw, sh) = (image.width as f32, image.height as f32);
        let candidates: Vec<Detection> = raw
            .iter()
            .map(|d| map_to_source(d, self.rotation, sw, sh))
            .filter_map(|d| d.clipped(sw, sh))
            .collect();
        let total = candidates.len();

        let kept = select_top(candidates, output.capacity());
        let written = output.fill(&kept);

        log::debug!(
            "{} {}x{} rot={} -> {} candidates, {} written (capacity {})",
            image.format,
            image.width,
            image.height,
            self.rotation,
            total,
            written,
            output.capacity()
        );
        Ok(DetectOutcome {
            written,
            candidates: total,
        })
    }
}

//! TinyBrodmann detector core.
//!
//! A [`Detector`] owns one inference engine and an absolute rotation
//! setting. Callers describe each frame with an [`ImageDescriptor`] and
//! receive results in a caller-owned [`DetectionBuffer`] of fixed-layout
//! records.

pub mod config;
pub mod detection;
pub mod runtime;
pub mod shared;

pub use config::{DetectorConfig, EngineKind};
pub use detection::domain::detection::{Detection, DetectionRecord};
pub use detection::domain::detection_buffer::DetectionBuffer;
pub use detection::domain::detector::{DetectError, DetectOutcome, Detector};
pub use shared::constants::PARAMS_PER_DETECTION;
pub use shared::image_descriptor::ImageDescriptor;
pub use shared::image_format::ImageFormat;
pub use shared::rotation::Rotation;

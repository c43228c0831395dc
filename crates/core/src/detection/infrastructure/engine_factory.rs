use crate::config::{DetectorConfig, EngineKind};
use crate::detection::domain::detection_engine::{DetectionEngine, EngineError};
use crate::shared::constants::BLAZEFACE_MODEL_NAME;

use super::contrast_blob_engine::ContrastBlobEngine;
use super::model_locator;
use super::onnx_blazeface_engine::OnnxBlazefaceEngine;

/// Builds the engine selected by `config`. Logs which backend is used.
pub fn create_engine(config: &DetectorConfig) -> Result<Box<dyn DetectionEngine>, EngineError> {
    match config.engine {
        EngineKind::Contrast => {
            log::info!(
                "Using contrast-blob engine (threshold={}, min_area={})",
                config.contrast_threshold,
                config.min_area
            );
            Ok(Box::new(ContrastBlobEngine::new(
                config.contrast_threshold,
                config.min_area,
            )))
        }
        EngineKind::Blazeface => {
            let path = model_locator::locate(BLAZEFACE_MODEL_NAME, config.model_path.as_deref())?;
            log::info!(
                "Using BlazeFace engine (model={}, confidence={})",
                path.display(),
                config.confidence
            );
            Ok(Box::new(OnnxBlazefaceEngine::new(&path, config.confidence)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_default_config_builds_contrast_engine() {
        let engine = create_engine(&DetectorConfig::default()).unwrap();
        assert_eq!(engine.name(), "contrast-blob");
    }

    #[test]
    fn test_contrast_engine_uses_configured_min_area() {
        let config = DetectorConfig {
            min_area: 50,
            ..DetectorConfig::default()
        };
        let mut engine = create_engine(&config).unwrap();
        let mut plane = Array2::<f32>::zeros((20, 20));
        plane[[5, 5]] = 1.0;
        plane[[5, 6]] = 1.0;
        assert!(engine.infer(plane.view()).unwrap().is_empty());
    }

    #[test]
    fn test_blazeface_without_model_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = DetectorConfig {
            engine: EngineKind::Blazeface,
            model_path: Some(dir.path().join("missing.onnx")),
            ..DetectorConfig::default()
        };
        let err = create_engine(&config).err().unwrap();
        assert!(err.to_string().contains("missing.onnx"));
    }
}

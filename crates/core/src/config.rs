use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::detection::infrastructure::contrast_blob_engine::{
    DEFAULT_CONTRAST_THRESHOLD, DEFAULT_MIN_AREA,
};
use crate::detection::infrastructure::onnx_blazeface_engine::DEFAULT_CONFIDENCE;

pub const ENV_ENGINE: &str = "BD17_ENGINE";
pub const ENV_CONTRAST_THRESHOLD: &str = "BD17_CONTRAST_THRESHOLD";
pub const ENV_MIN_AREA: &str = "BD17_MIN_AREA";
pub const ENV_CONFIDENCE: &str = "BD17_CONFIDENCE";
pub const ENV_MODEL_PATH: &str = "BD17_MODEL_PATH";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("unknown engine {0:?} (expected \"contrast\" or \"blazeface\")")]
    UnknownEngine(String),
    #[error("{key}={value:?} is not a valid number")]
    InvalidNumber { key: &'static str, value: String },
    #[error("{key}={value} is outside {min}..={max}")]
    OutOfRange {
        key: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
}

/// Which inference backend a new detector handle gets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EngineKind {
    #[default]
    Contrast,
    Blazeface,
}

impl FromStr for EngineKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "contrast" | "contrast-blob" => Ok(Self::Contrast),
            "blazeface" | "onnx" => Ok(Self::Blazeface),
            _ => Err(ConfigError::UnknownEngine(s.to_string())),
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contrast => f.write_str("contrast"),
            Self::Blazeface => f.write_str("blazeface"),
        }
    }
}

/// Settings shared by every detector handle created in this process.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectorConfig {
    pub engine: EngineKind,
    /// Minimum luma difference from the frame mean (contrast engine).
    pub contrast_threshold: f32,
    /// Minimum component size in pixels (contrast engine).
    pub min_area: usize,
    /// Minimum face score (BlazeFace engine).
    pub confidence: f32,
    /// Explicit model file; falls back to the model cache directory.
    pub model_path: Option<PathBuf>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::default(),
            contrast_threshold: DEFAULT_CONTRAST_THRESHOLD,
            min_area: DEFAULT_MIN_AREA,
            confidence: DEFAULT_CONFIDENCE,
            model_path: None,
        }
    }
}

impl DetectorConfig {
    /// Reads `BD17_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Missing or empty
    /// keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(engine) = get(ENV_ENGINE) {
            config.engine = engine.parse()?;
        }
        if let Some(value) = get(ENV_CONTRAST_THRESHOLD) {
            config.contrast_threshold = parse_number(ENV_CONTRAST_THRESHOLD, &value)?;
        }
        if let Some(value) = get(ENV_MIN_AREA) {
            config.min_area = parse_number(ENV_MIN_AREA, &value)?;
        }
        if let Some(value) = get(ENV_CONFIDENCE) {
            config.confidence = parse_number(ENV_CONFIDENCE, &value)?;
        }
        if let Some(value) = get(ENV_MODEL_PATH) {
            config.model_path = Some(PathBuf::from(value));
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unit_range(ENV_CONTRAST_THRESHOLD, self.contrast_threshold)?;
        check_unit_range(ENV_CONFIDENCE, self.confidence)?;
        Ok(())
    }
}

fn parse_number<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        key,
        value: value.to_string(),
    })
}

fn check_unit_range(key: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            key,
            value,
            min: 0.0,
            max: 1.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_empty_environment_gives_defaults() {
        let config = DetectorConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, DetectorConfig::default());
        assert_eq!(config.engine, EngineKind::Contrast);
    }

    #[test]
    fn test_all_keys_parsed() {
        let config = DetectorConfig::from_lookup(lookup(&[
            (ENV_ENGINE, "BlazeFace"),
            (ENV_CONTRAST_THRESHOLD, "0.4"),
            (ENV_MIN_AREA, "12"),
            (ENV_CONFIDENCE, " 0.75 "),
            (ENV_MODEL_PATH, "/opt/models/face.onnx"),
        ]))
        .unwrap();
        assert_eq!(config.engine, EngineKind::Blazeface);
        assert_eq!(config.contrast_threshold, 0.4);
        assert_eq!(config.min_area, 12);
        assert_eq!(config.confidence, 0.75);
        assert_eq!(config.model_path, Some(PathBuf::from("/opt/models/face.onnx")));
    }

    #[test]
    fn test_blank_values_keep_defaults() {
        let config = DetectorConfig::from_lookup(lookup(&[(ENV_ENGINE, "  "), (ENV_MIN_AREA, "")])).unwrap();
        assert_eq!(config, DetectorConfig::default());
    }

    #[test]
    fn test_unknown_engine() {
        let err = DetectorConfig::from_lookup(lookup(&[(ENV_ENGINE, "yolo")])).unwrap_err();
        assert_eq!(err, ConfigError::UnknownEngine("yolo".to_string()));
    }

    #[test]
    fn test_invalid_number() {
        let err = DetectorConfig::from_lookup(lookup(&[(ENV_MIN_AREA, "-3")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidNumber {
                key: ENV_MIN_AREA,
                value: "-3".to_string()
            }
        );
    }

    #[test]
    fn test_confidence_out_of_range() {
        let err = DetectorConfig::from_lookup(lookup(&[(ENV_CONFIDENCE, "1.5")])).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { key: ENV_CONFIDENCE, .. }));
    }

    #[test]
    fn test_engine_kind_display_parses_back() {
        for kind in [EngineKind::Contrast, EngineKind::Blazeface] {
            assert_eq!(kind.to_string().parse::<EngineKind>(), Ok(kind));
        }
    }
}

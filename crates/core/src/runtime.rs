//! Process-wide initialization state.
//!
//! [`init`] must succeed once before handles are created. It is idempotent:
//! later calls return `Ok` without reloading anything. There is no
//! teardown; process exit releases the stored configuration.

use std::sync::OnceLock;

use thiserror::Error;

use crate::config::{ConfigError, DetectorConfig, EngineKind};
use crate::detection::domain::detection_engine::EngineError;
use crate::detection::domain::detector::Detector;
use crate::detection::infrastructure::engine_factory::create_engine;
use crate::detection::infrastructure::model_locator::{self, ModelLocateError};
use crate::shared::constants::BLAZEFACE_MODEL_NAME;

#[derive(Error, Debug)]
pub enum InitError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Model(#[from] ModelLocateError),
}

#[derive(Error, Debug)]
pub enum CreateError {
    #[error("library is not initialized")]
    NotInitialized,
    #[error("failed to create {kind} engine: {source}")]
    Engine {
        kind: EngineKind,
        #[source]
        source: EngineError,
    },
}

static GLOBAL: Runtime = Runtime::new();

/// Init-once holder for the configuration every new handle is built from.
pub struct Runtime {
    config: OnceLock<DetectorConfig>,
}

impl Runtime {
    pub const fn new() -> Self {
        Self {
            config: OnceLock::new(),
        }
    }

    /// Loads and checks the configuration unless already initialized.
    ///
    /// A failed attempt stores nothing, so a later call may succeed.
    pub fn init_with<F>(&self, load: F) -> Result<(), InitError>
    where
        F: FnOnce() -> Result<DetectorConfig, ConfigError>,
    {
        if self.config.get().is_some() {
            return Ok(());
        }
        let config = load()?;
        config.validate()?;
        if config.engine == EngineKind::Blazeface {
            model_locator::locate(BLAZEFACE_MODEL_NAME, config.model_path.as_deref())?;
        }
        let engine = config.engine;
        if self.config.set(config).is_ok() {
            log::info!("Initialized with {engine} engine");
        }
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.config.get().is_some()
    }

    pub fn config(&self) -> Option<&DetectorConfig> {
        self.config.get()
    }

    /// Builds a fresh handle. Each call owns its own engine instance.
    pub fn create_detector(&self) -> Result<Detector, CreateError> {
        let config = self.config.get().ok_or(CreateError::NotInitialized)?;
        create_detector_with(config)
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

pub fn create_detector_with(config: &DetectorConfig) -> Result<Detector, CreateError> {
    let engine = create_engine(config).map_err(|source| CreateError::Engine {
        kind: config.engine,
        source,
    })?;
    Ok(Detector::new(engine))
}

pub fn global() -> &'static Runtime {
    &GLOBAL
}

/// Initializes the process-wide runtime from `BD17_*` environment variables.
pub fn init() -> Result<(), InitError> {
    GLOBAL.init_with(DetectorConfig::from_env)
}

pub fn is_ready() -> bool {
    GLOBAL.is_ready()
}

pub fn create_detector() -> Result<Detector, CreateError> {
    GLOBAL.create_detector()
}

pub mod contrast_blob_engine;
pub mod engine_factory;
pub mod execution_provider;
pub mod math;
pub mod model_locator;
pub mod onnx_blazeface_engine;

/// Floats per detection record: `[x, y, w, h, confidence, reserved, reserved]`.
pub const PARAMS_PER_DETECTION: usize = 7;

/// Byte capacity the C `debug_str` output is assumed to have, terminator included.
pub const DEBUG_STR_CAPACITY: usize = 256;

pub const BLAZEFACE_MODEL_NAME: &str = "blazeface_short_range.onnx";

/// Directory name under the platform cache/data dir holding model files.
pub const MODEL_CACHE_DIR_NAME: &str = "Brodmann17";

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

//! C-compatible interface for the TinyBrodmann detector (`libbrodmann17`).
//!
//! Mirrors the `bd17` header: `Init`, `CreateDetector`, `Rotate`,
//! `Detect`, `DestroyDetector`. Every failure is reported as `false`
//! (or a null handle); the cause is only logged.
//!
//! # Memory Ownership Rules
//!
//! - `CreateDetector()` allocates on the Rust heap, caller owns the pointer
//! - `DestroyDetector()` must be called exactly once to release it
//! - Image, record, count, class-id and debug buffers stay caller-owned and
//!   are never retained after `Detect` returns
//! - Use after destroy and double destroy are undefined behaviour
//!
//! No panic crosses the boundary: each entry point catches unwinding and
//! reports failure instead.

use std::ffi::{c_char, c_int, c_uint, c_void};
use std::panic::{self, AssertUnwindSafe};
use std::ptr;
use std::slice;

use brodmann_core::runtime;
use brodmann_core::shared::constants::DEBUG_STR_CAPACITY;
use brodmann_core::{
    DetectOutcome, DetectionBuffer, Detector, ImageDescriptor, ImageFormat, Rotation,
    PARAMS_PER_DETECTION,
};

fn guard<T>(name: &str, fallback: T, f: impl FnOnce() -> T) -> T {
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|_| {
        log::error!("{name}: panic caught at C boundary");
        fallback
    })
}

// ============================================================================
// Process initialization
// ============================================================================

/// Initialize the library. Must succeed before the first `CreateDetector`.
///
/// Reads `BD17_*` environment variables and installs `env_logger` (honours
/// `RUST_LOG`) if no logger is set yet. Safe to call repeatedly.
#[no_mangle]
pub extern "C" fn Init() -> bool {
    guard("Init", false, || {
        let _ = env_logger::try_init();
        match runtime::init() {
            Ok(()) => true,
            Err(e) => {
                log::error!("Init failed: {e}");
                false
            }
        }
    })
}

// ============================================================================
// Detector lifecycle
// ============================================================================

/// Return a new detector, or null if the library is not initialized or
/// the engine could not be built. Release with `DestroyDetector`.
#[no_mangle]
pub extern "C" fn CreateDetector() -> *mut c_void {
    guard("CreateDetector", ptr::null_mut(), || {
        match runtime::create_detector() {
            Ok(detector) => {
                log::info!("Created detector ({} engine)", detector.engine_name());
                Box::into_raw(Box::new(detector)) as *mut c_void
            }
            Err(e) => {
                log::warn!("CreateDetector failed: {e}");
                ptr::null_mut()
            }
        }
    })
}

/// Release a detector. Returns false only for a null pointer.
///
/// The pointer must come from `CreateDetector` and must not be used again.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn DestroyDetector(detector: *mut c_void) -> bool {
    if detector.is_null() {
        log::warn!("DestroyDetector: null detector");
        return false;
    }
    guard("DestroyDetector", false, || {
        unsafe {
            drop(Box::from_raw(detector as *mut Detector));
        }
        log::info!("Destroyed detector");
        true
    })
}

// ============================================================================
// Rotation
// ============================================================================

/// Set the detector orientation: 0 = 0°, 1 = 90°, 2 = 180°, 3 = 270°.
///
/// The value is absolute; calling `Rotate(d, 1)` twice leaves 90°.
/// Returns false for a null detector or an index outside `0..=3`.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn Rotate(detector: *mut c_void, rotation: c_int) -> bool {
    if detector.is_null() {
        log::warn!("Rotate: null detector");
        return false;
    }
    let rotation = match Rotation::try_from(rotation) {
        Ok(r) => r,
        Err(e) => {
            log::warn!("Rotate: {e}");
            return false;
        }
    };
    guard("Rotate", false, || {
        let detector = unsafe { &mut *(detector as *mut Detector) };
        detector.rotate(rotation);
        true
    })
}

// ============================================================================
// Detection
// ============================================================================

/// Run the detector on one image.
///
/// Writes up to `max_detections` records of `PARAMS_PER_DETECTION` floats
/// (`[x, y, w, h, confidence, pad, pad]`) into `detections_out` and the
/// number written into `detections_num`. `class_id` (array of
/// `max_detections`) and `debug_str` (at least `DEBUG_STR_CAPACITY` bytes)
/// are optional and may be null.
///
/// Returns false for a null detector, record buffer, count pointer or
/// image pointer, for non-positive dimensions, for an invalid or
/// unsupported format, and when inference fails. `detections_num` is
/// only meaningful when true is returned.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref, clippy::too_many_arguments)]
pub extern "C" fn Detect(
    detector: *mut c_void,
    detections_out: *mut f32,
    detections_num: *mut c_uint,
    max_detections: c_uint,
    image_input_data: *const c_void,
    image_width: c_int,
    image_height: c_int,
    image_format: c_int,
    class_id: *mut c_uint,
    debug_str: *mut c_char,
) -> bool {
    if detector.is_null()
        || detections_out.is_null()
        || detections_num.is_null()
        || image_input_data.is_null()
    {
        log::warn!("Detect: null argument");
        return false;
    }

    let format = match ImageFormat::try_from(image_format) {
        Ok(f) if f.is_supported() => f,
        Ok(f) => {
            log::warn!("Detect: image format {f} is not supported");
            return false;
        }
        Err(e) => {
            log::warn!("Detect: {e}");
            return false;
        }
    };
    let (Ok(width), Ok(height)) = (u32::try_from(image_width), u32::try_from(image_height)) else {
        log::warn!("Detect: invalid dimensions {image_width}x{image_height}");
        return false;
    };
    let Some(image_len) = format.required_len(width, height) else {
        log::warn!("Detect: image of {width}x{height} is too large");
        return false;
    };
    let capacity = max_detections as usize;
    let Some(record_len) = capacity.checked_mul(PARAMS_PER_DETECTION) else {
        log::warn!("Detect: max_detections {max_detections} is too large");
        return false;
    };

    guard("Detect", false, || {
        let detector = unsafe { &mut *(detector as *mut Detector) };
        let data = unsafe { slice::from_raw_parts(image_input_data as *const u8, image_len) };

        // With zero capacity the record buffer is never touched.
        let records: &mut [f32] = if capacity == 0 {
            &mut []
        } else {
            unsafe { slice::from_raw_parts_mut(detections_out, record_len) }
        };
        let mut buffer = DetectionBuffer::new(records, capacity);
        if !class_id.is_null() && capacity > 0 {
            let ids = unsafe { slice::from_raw_parts_mut(class_id, capacity) };
            buffer = buffer.with_class_ids(ids);
        }

        let image = ImageDescriptor::new(format, width, height, data);
        match detector.detect(&image, &mut buffer) {
            Ok(outcome) => {
                unsafe {
                    *detections_num = outcome.written as c_uint;
                }
                if !debug_str.is_null() {
                    let summary = debug_summary(detector, &outcome);
                    unsafe { write_debug_str(debug_str, &summary) };
                }
                true
            }
            Err(e) => {
                log::warn!("Detect failed: {e}");
                false
            }
        }
    })
}

fn debug_summary(detector: &Detector, outcome: &DetectOutcome) -> String {
    format!(
        "engine={} rotation={} candidates={} written={}",
        detector.engine_name(),
        detector.rotation().degrees(),
        outcome.candidates,
        outcome.written
    )
}

/// Copies `text` into `dst` as a NUL-terminated string, truncated to
/// `DEBUG_STR_CAPACITY - 1` bytes.
///
/// # Safety
/// `dst` must point to at least `DEBUG_STR_CAPACITY` writable bytes.
unsafe fn write_debug_str(dst: *mut c_char, text: &str) {
    let bytes = text.as_bytes();
    let n = bytes.len().min(DEBUG_STR_CAPACITY - 1);
    unsafe {
        ptr::copy_nonoverlapping(bytes.as_ptr() as *const c_char, dst, n);
        *dst.add(n) = 0;
    }
}

//! Conversion of raw caller buffers into the engine's working plane.
//!
//! Every supported format is reduced to a single normalized luma plane of
//! shape `(height, width)` with values in `[0, 1]`. Unsupported formats
//! are rejected by descriptor validation and never interpreted.

use ndarray::Array2;

use crate::shared::image_descriptor::{DescriptorError, ImageDescriptor};
use crate::shared::image_format::ImageFormat;

/// BT.601 luma weights in BGR byte order.
const LUMA_B: f32 = 0.114;
const LUMA_G: f32 = 0.587;
const LUMA_R: f32 = 0.299;

pub fn to_luma_plane(image: &ImageDescriptor<'_>) -> Result<Array2<f32>, DescriptorError> {
    let data = image.validate()?;
    let w = image.width as usize;
    let h = image.height as usize;

    let plane = match image.format {
        ImageFormat::BgrInterleavedByte => Array2::from_shape_fn((h, w), |(row, col)| {
            let i = (row * w + col) * 3;
            let luma = LUMA_B * data[i] as f32
                + LUMA_G * data[i + 1] as f32
                + LUMA_R * data[i + 2] as f32;
            luma / 255.0
        }),
        // NV21 luma is the leading full-resolution Y plane; chroma is ignored.
        ImageFormat::GrayByte | ImageFormat::Nv21Byte => {
            Array2::from_shape_fn((h, w), |(row, col)| data[row * w + col] as f32 / 255.0)
        }
        ImageFormat::GrayFloat => Array2::from_shape_fn((h, w), |(row, col)| {
            let i = (row * w + col) * 4;
            let value: f32 = bytemuck::pod_read_unaligned(&data[i..i + 4]);
            if value.is_nan() {
                0.0
            } else {
                value.clamp(0.0, 1.0)
            }
        }),
        other => return Err(DescriptorError::UnsupportedFormat(other)),
    };
    Ok(plane)
}

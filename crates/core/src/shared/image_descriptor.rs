use thiserror::Error;

use crate::shared::image_format::ImageFormat;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("image descriptor has no pixel data")]
    MissingPixelData,
    #[error("image format {0} is not supported")]
    UnsupportedFormat(ImageFormat),
    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("{format} image of {width}x{height} needs {expected} bytes, got {actual}")]
    BufferTooSmall {
        format: ImageFormat,
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// Borrowed description of one raw frame.
///
/// Lives for a single detection call; the detector never keeps a
/// reference to `data` once the call returns. `data: None` stands for a
/// null pixel pointer at the C boundary.
#[derive(Clone, Copy, Debug)]
pub struct ImageDescriptor<'a> {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub data: Option<&'a [u8]>,
}

impl<'a> ImageDescriptor<'a> {
    pub fn new(format: ImageFormat, width: u32, height: u32, data: &'a [u8]) -> Self {
        Self {
            format,
            width,
            height,
            data: Some(data),
        }
    }

    pub fn bgr(width: u32, height: u32, data: &'a [u8]) -> Self {
        Self::new(ImageFormat::BgrInterleavedByte, width, height, data)
    }

    pub fn gray(width: u32, height: u32, data: &'a [u8]) -> Self {
        Self::new(ImageFormat::GrayByte, width, height, data)
    }

    /// Checks the descriptor and returns the pixel bytes it describes,
    /// trimmed to the exact layout length.
    ///
    /// Check order: pixel data, format, dimensions, buffer length.
    pub fn validate(&self) -> Result<&'a [u8], DescriptorError> {
        let data = self.data.ok_or(DescriptorError::MissingPixelData)?;
        if !self.format.is_supported() {
            return Err(DescriptorError::UnsupportedFormat(self.format));
        }
        if self.width == 0 || self.height == 0 {
            return Err(DescriptorError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        let expected = self
            .format
            .required_len(self.width, self.height)
            .ok_or(DescriptorError::InvalidDimensions {
                width: self.width,
                height: self.height,
            })?;
        if data.len() < expected {
            return Err(DescriptorError::BufferTooSmall {
                format: self.format,
                width: self.width,
                height: self.height,
                expected,
                actual: data.len(),
            });
        }
        Ok(&data[..expected])
    }
}

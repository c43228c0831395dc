use std::fmt;

use thiserror::Error;

/// Pixel layout of a raw input buffer.
///
/// Discriminants are part of the C ABI and match `bd17_image_format_t`.
/// `FormatStart` and `FormatEnd` bound the valid range and are never
/// accepted as real formats.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    FormatStart = 0,
    /// `bgrbgr...`, one byte per channel.
    BgrInterleavedByte = 1,
    /// `yyy...`, one byte per pixel.
    GrayByte = 2,
    /// `RR..GG..BB..` as f32. Declared, not supported.
    RgbPlanarFloat = 3,
    /// `YY..UU..VV..` as f32. Declared, not supported.
    YuvPlanarFloat = 4,
    /// `yyy...` as native-endian f32.
    GrayFloat = 5,
    /// YUV420 semi-planar: full Y plane followed by interleaved VU pairs.
    Nv21Byte = 6,
    FormatEnd = 7,
}

impl ImageFormat {
    pub fn is_supported(self) -> bool {
        matches!(
            self,
            Self::BgrInterleavedByte | Self::GrayByte | Self::GrayFloat | Self::Nv21Byte
        )
    }

    pub fn is_sentinel(self) -> bool {
        matches!(self, Self::FormatStart | Self::FormatEnd)
    }

    /// Byte length of a well-formed buffer for this format, or `None` for
    /// sentinels and on overflow.
    pub fn required_len(self, width: u32, height: u32) -> Option<usize> {
        let w = width as usize;
        let h = height as usize;
        let pixels = w.checked_mul(h)?;
        let f32_size = std::mem::size_of::<f32>();
        match self {
            Self::FormatStart | Self::FormatEnd => None,
            Self::BgrInterleavedByte => pixels.checked_mul(3),
            Self::GrayByte => Some(pixels),
            Self::GrayFloat => pixels.checked_mul(f32_size),
            Self::RgbPlanarFloat | Self::YuvPlanarFloat => pixels.checked_mul(3 * f32_size),
            Self::Nv21Byte => {
                // Chroma is subsampled 2x2; odd dimensions round up.
                let chroma = w.div_ceil(2).checked_mul(h.div_ceil(2))?.checked_mul(2)?;
                pixels.checked_add(chroma)
            }
        }
    }
}

/// Raw ABI value outside the enumeration.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("unknown image format value {0}")]
pub struct UnknownImageFormat(pub i32);

impl TryFrom<i32> for ImageFormat {
    type Error = UnknownImageFormat;

    /// Accepts only real formats; the two sentinels are rejected.
    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::BgrInterleavedByte),
            2 => Ok(Self::GrayByte),
            3 => Ok(Self::RgbPlanarFloat),
            4 => Ok(Self::YuvPlanarFloat),
            5 => Ok(Self::GrayFloat),
            6 => Ok(Self::Nv21Byte),
            other => Err(UnknownImageFormat(other)),
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FormatStart => "format-start",
            Self::BgrInterleavedByte => "bgr-interleaved-byte",
            Self::GrayByte => "gray-byte",
            Self::RgbPlanarFloat => "rgb-planar-float",
            Self::YuvPlanarFloat => "yuv-planar-float",
            Self::GrayFloat => "gray-float",
            Self::Nv21Byte => "nv21-byte",
            Self::FormatEnd => "format-end",
        };
        f.write_str(name)
    }
}

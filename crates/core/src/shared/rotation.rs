use std::fmt;

use thiserror::Error;

/// Absolute orientation applied to the input before inference.
///
/// Discriminants are the ABI indices of `bd17_rotation_t`.
#[repr(i32)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Rotation {
    #[default]
    Rot0 = 0,
    Rot90 = 1,
    Rot180 = 2,
    Rot270 = 3,
}

impl Rotation {
    pub fn from_degrees(degrees: u32) -> Option<Self> {
        match degrees {
            0 => Some(Self::Rot0),
            90 => Some(Self::Rot90),
            180 => Some(Self::Rot180),
            270 => Some(Self::Rot270),
            _ => None,
        }
    }

    pub fn degrees(self) -> u32 {
        self as u32 * 90
    }

    /// True for 90 and 270, where width and height trade places.
    pub fn swaps_axes(self) -> bool {
        matches!(self, Self::Rot90 | Self::Rot270)
    }
}

/// Raw ABI index outside `0..=3`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("rotation index {0} is not one of 0..=3")]
pub struct InvalidRotation(pub i32);

impl TryFrom<i32> for Rotation {
    type Error = InvalidRotation;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Rot0),
            1 => Ok(Self::Rot90),
            2 => Ok(Self::Rot180),
            3 => Ok(Self::Rot270),
            other => Err(InvalidRotation(other)),
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

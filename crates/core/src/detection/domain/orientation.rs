use ndarray::{s, Array2, ArrayView2};

use crate::detection::domain::detection::Detection;
use crate::shared::rotation::Rotation;

/// Rotates a `(height, width)` plane clockwise by `rotation`.
pub fn rotate_plane(plane: ArrayView2<'_, f32>, rotation: Rotation) -> Array2<f32> {
    let rotated = match rotation {
        Rotation::Rot0 => plane,
        Rotation::Rot90 => plane.reversed_axes().slice_move(s![.., ..;-1]),
        Rotation::Rot180 => plane.slice_move(s![..;-1, ..;-1]),
        Rotation::Rot270 => plane.reversed_axes().slice_move(s![..;-1, ..]),
    };
    rotated.as_standard_layout().into_owned()
}

/// Maps a box found in the rotated plane back into the source image.
///
/// `source_width`/`source_height` are the unrotated image dimensions.
/// Boxes are treated as half-open pixel spans, so the inverse is exact.
pub fn map_to_source(
    det: &Detection,
    rotation: Rotation,
    source_width: f32,
    source_height: f32,
) -> Detection {
    let (x, y, width, height) = match rotation {
        Rotation::Rot0 => (det.x, det.y, det.width, det.height),
        Rotation::Rot90 => (det.y, source_height - det.x - det.width, det.height, det.width),
        Rotation::Rot180 => (
            source_width - det.x - det.width,
            source_height - det.y - det.height,
            det.width,
            det.height,
        ),
        Rotation::Rot270 => (source_width - det.y - det.height, det.x, det.height, det.width),
    };
    Detection {
        x,
        y,
        width,
        height,
        ..*det
    }
}

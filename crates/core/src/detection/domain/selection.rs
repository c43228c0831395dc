use std::cmp::Ordering;

use crate::detection::domain::detection::Detection;

/// Orders candidates for output: confidence descending, then `y`, `x`,
/// `width`, `height` ascending.
///
/// Uses `f32::total_cmp`, so the order is total (NaN included) and the
/// result is identical for identical input. Truncation keeps the prefix.
pub fn rank(detections: &mut [Detection]) {
    detections.sort_by(compare);
}

/// Ranks and keeps at most `limit` detections.
pub fn select_top(mut detections: Vec<Detection>, limit: usize) -> Vec<Detection> {
    rank(&mut detections);
    detections.truncate(limit);
    detections
}

fn compare(a: &Detection, b: &Detection) -> Ordering {
    b.confidence
        .total_cmp(&a.confidence)
        .then_with(|| a.y.total_cmp(&b.y))
        .then_with(|| a.x.total_cmp(&b.x))
        .then_with(|| a.width.total_cmp(&b.width))
        .then_with(|| a.height.total_cmp(&b.height))
}

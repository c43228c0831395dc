//! Shared math utilities for detection engines.
//!
//! Union-find for pixel component labelling and box IoU / greedy NMS
//! for decoders that emit overlapping candidates.

use crate::detection::domain::detection::Detection;

/// IoU between two boxes in `(x, y, width, height)` form.
pub fn bbox_iou(a: &Detection, b: &Detection) -> f32 {
    let x1 = a.x.max(b.x);
    let y1 = a.y.max(b.y);
    let x2 = (a.x + a.width).min(b.x + b.width);
    let y2 = (a.y + a.height).min(b.y + b.height);

    let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    if inter == 0.0 {
        return 0.0;
    }
    inter / (a.area() + b.area() - inter)
}

/// Greedy NMS: keeps the highest-scoring box of every overlapping group.
pub fn nms(mut dets: Vec<Detection>, iou_thresh: f32) -> Vec<Detection> {
    dets.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut keep: Vec<Detection> = Vec::with_capacity(dets.len());
    for det in dets {
        if keep.iter().all(|k| bbox_iou(k, &det) <= iou_thresh) {
            keep.push(det);
        }
    }
    keep
}

/// Find root of element `i` with path halving for amortized near-O(1).
pub fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

/// Merge the sets containing `a` and `b`.
pub fn union(parent: &mut [usize], a: usize, b: usize) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        parent[ra.max(rb)] = ra.min(rb);
    }
}

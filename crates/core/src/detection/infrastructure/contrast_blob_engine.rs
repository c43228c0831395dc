/// Reference detection engine: connected regions that stand out from the
/// frame's mean brightness.
///
/// Deterministic and model-free, so the full detect path can run without
/// any weights on disk. Every pixel whose luma differs from the plane mean
/// by at least the contrast threshold is foreground; foreground pixels are
/// grouped with 4-connectivity and each group large enough becomes one box.
use std::collections::BTreeMap;

use ndarray::ArrayView2;

use crate::detection::domain::detection::Detection;
use crate::detection::domain::detection_engine::{DetectionEngine, EngineError};
use crate::detection::infrastructure::math::{find, union};

pub const DEFAULT_CONTRAST_THRESHOLD: f32 = 0.25;

/// Components smaller than this many pixels are treated as noise.
pub const DEFAULT_MIN_AREA: usize = 4;

pub struct ContrastBlobEngine {
    contrast_threshold: f32,
    min_area: usize,
}

impl ContrastBlobEngine {
    pub fn new(contrast_threshold: f32, min_area: usize) -> Self {
        Self {
            contrast_threshold,
            min_area: min_area.max(1),
        }
    }
}

impl Default for ContrastBlobEngine {
    fn default() -> Self {
        Self::new(DEFAULT_CONTRAST_THRESHOLD, DEFAULT_MIN_AREA)
    }
}

#[derive(Debug)]
struct Blob {
    min_x: usize,
    min_y: usize,
    max_x: usize,
    max_y: usize,
    area: usize,
    contrast_sum: f32,
}

impl Blob {
    fn new(x: usize, y: usize) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
            area: 0,
            contrast_sum: 0.0,
        }
    }

    fn add(&mut self, x: usize, y: usize, contrast: f32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
        self.area += 1;
        self.contrast_sum += contrast;
    }

    fn to_detection(&self) -> Detection {
        Detection::new(
            self.min_x as f32,
            self.min_y as f32,
            (self.max_x - self.min_x + 1) as f32,
            (self.max_y - self.min_y + 1) as f32,
            (self.contrast_sum / self.area as f32).min(1.0),
        )
    }
}

impl DetectionEngine for ContrastBlobEngine {
    fn name(&self) -> &str {
        "contrast-blob"
    }

    fn infer(&mut self, plane: ArrayView2<'_, f32>) -> Result<Vec<Detection>, EngineError> {
        let (h, w) = plane.dim();
        let Some(mean) = plane.mean() else {
            return Ok(Vec::new());
        };

        let contrast = plane.mapv(|v| (v - mean).abs());
        let is_fg = |r: usize, c: usize| contrast[[r, c]] >= self.contrast_threshold;

        // 1. Label foreground components
        let mut parent: Vec<usize> = (0..h * w).collect();
        for r in 0..h {
            for c in 0..w {
                if !is_fg(r, c) {
                    continue;
                }
                let idx = r * w + c;
                if c > 0 && is_fg(r, c - 1) {
                    union(&mut parent, idx, idx - 1);
                }
                if r > 0 && is_fg(r - 1, c) {
                    union(&mut parent, idx, idx - w);
                }
            }
        }

        // 2. Accumulate extents per root
        let mut blobs: BTreeMap<usize, Blob> = BTreeMap::new();
        for r in 0..h {
            for c in 0..w {
                if !is_fg(r, c) {
                    continue;
                }
                let root = find(&mut parent, r * w + c);
                blobs
                    .entry(root)
                    .or_insert_with(|| Blob::new(c, r))
                    .add(c, r, contrast[[r, c]]);
            }
        }

        // 3. Drop noise
        let detections: Vec<Detection> = blobs
            .values()
            .filter(|b| b.area >= self.min_area)
            .map(Blob::to_detection)
            .collect();

        log::trace!(
            "contrast-blob: mean={mean:.3}, {} components, {} kept",
            blobs.len(),
            detections.len()
        );
        Ok(detections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{s, Array2};

    fn plane_with_blocks(w: usize, h: usize, background: f32, blocks: &[(usize, usize, usize, usize, f32)]) -> Array2<f32> {
        let mut plane = Array2::from_elem((h, w), background);
        for &(x, y, bw, bh, v) in blocks {
            plane.slice_mut(s![y..y + bh, x..x + bw]).fill(v);
        }
        plane
    }

    #[test]
    fn test_uniform_plane_has_no_detections() {
        let plane = Array2::from_elem((20, 30), 0.4f32);
        let mut engine = ContrastBlobEngine::default();
        assert!(engine.infer(plane.view()).unwrap().is_empty());
    }

    #[test]
    fn test_empty_plane_has_no_detections() {
        let plane = Array2::<f32>::zeros((0, 0));
        let mut engine = ContrastBlobEngine::default();
        assert!(engine.infer(plane.view()).unwrap().is_empty());
    }

    #[test]
    fn test_single_bright_block_exact_box() {
        let plane = plane_with_blocks(40, 30, 0.0, &[(12, 7, 6, 5, 1.0)]);
        let mut engine = ContrastBlobEngine::default();
        let dets = engine.infer(plane.view()).unwrap();
        assert_eq!(dets.len(), 1);
        assert_eq!((dets[0].x, dets[0].y, dets[0].width, dets[0].height), (12.0, 7.0, 6.0, 5.0));
        assert!(dets[0].confidence > 0.9);
    }

    #[test]
    fn test_dark_block_on_bright_background() {
        let plane = plane_with_blocks(40, 30, 1.0, &[(3, 4, 5, 5, 0.0)]);
        let mut engine = ContrastBlobEngine::default();
        let dets = engine.infer(plane.view()).unwrap();
        assert_eq!(dets.len(), 1);
        assert_eq!((dets[0].x, dets[0].y), (3.0, 4.0));
    }

    #[test]
    fn test_separate_blocks_are_separate_detections() {
        let plane = plane_with_blocks(50, 40, 0.0, &[(2, 2, 4, 4, 1.0), (30, 20, 6, 3, 1.0)]);
        let mut engine = ContrastBlobEngine::default();
        assert_eq!(engine.infer(plane.view()).unwrap().len(), 2);
    }

    #[test]
    fn test_small_speck_filtered() {
        let plane = plane_with_blocks(40, 30, 0.0, &[(5, 5, 1, 1, 1.0), (20, 10, 3, 3, 1.0)]);
        let mut engine = ContrastBlobEngine::default();
        let dets = engine.infer(plane.view()).unwrap();
        assert_eq!(dets.len(), 1);
        assert_eq!(dets[0].x, 20.0);
    }

    #[test]
    fn test_diagonal_pixels_not_connected() {
        let plane = plane_with_blocks(40, 30, 0.0, &[(10, 10, 2, 2, 1.0), (12, 12, 2, 2, 1.0)]);
        let mut engine = ContrastBlobEngine::new(DEFAULT_CONTRAST_THRESHOLD, 1);
        assert_eq!(engine.infer(plane.view()).unwrap().len(), 2);
    }

    #[test]
    fn test_confidence_is_mean_contrast() {
        // 10x10 plane, one 2x2 block of 0.5 on 0.0: mean = 2/100 = 0.02
        let plane = plane_with_blocks(10, 10, 0.0, &[(0, 0, 2, 2, 0.5)]);
        let mut engine = ContrastBlobEngine::default();
        let dets = engine.infer(plane.view()).unwrap();
        assert_relative_eq!(dets[0].confidence, 0.48, epsilon = 1e-5);
    }

    #[test]
    fn test_min_area_floor_is_one() {
        let engine = ContrastBlobEngine::new(0.1, 0);
        assert_eq!(engine.min_area, 1);
    }
}

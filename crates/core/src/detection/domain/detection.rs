use crate::shared::constants::PARAMS_PER_DETECTION;

/// ABI layout of one output entry.
pub type DetectionRecord = [f32; PARAMS_PER_DETECTION];

/// A single detected object in input-image pixel coordinates.
///
/// `(x, y)` is the top-left corner; the box covers `width` by `height`
/// pixels. `confidence` is engine-scaled, higher is more certain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detection {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
    pub class_id: u32,
}

impl Detection {
    pub fn new(x: f32, y: f32, width: f32, height: f32, confidence: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            confidence,
            class_id: 0,
        }
    }

    pub fn with_class_id(self, class_id: u32) -> Self {
        Self { class_id, ..self }
    }

    /// `[x, y, w, h, confidence, 0, 0]`. The class id travels separately.
    pub fn to_record(&self) -> DetectionRecord {
        [
            self.x,
            self.y,
            self.width,
            self.height,
            self.confidence,
            0.0,
            0.0,
        ]
    }

    pub fn from_record(record: &DetectionRecord, class_id: u32) -> Self {
        Self {
            x: record[0],
            y: record[1],
            width: record[2],
            height: record[3],
            confidence: record[4],
            class_id,
        }
    }

    /// Inclusive bottom-right corner.
    pub fn bottom_right(&self) -> (f32, f32) {
        (self.x + self.width - 1.0, self.y + self.height - 1.0)
    }

    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Clips the box to `[0, width) x [0, height)`. Returns `None` when
    /// nothing of it remains inside.
    pub fn clipped(&self, width: f32, height: f32) -> Option<Self> {
        let x1 = self.x.max(0.0);
        let y1 = self.y.max(0.0);
        let x2 = (self.x + self.width).min(width);
        let y2 = (self.y + self.height).min(height);
        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some(Self {
            x: x1,
            y: y1,
            width: x2 - x1,
            height: y2 - y1,
            ..*self
        })
    }
}

use crate::detection::domain::detection::{Detection, DetectionRecord};
use crate::shared::constants::PARAMS_PER_DETECTION;

/// Caller-owned output storage for one detection call.
///
/// Wraps a flat `f32` slice holding `PARAMS_PER_DETECTION` floats per
/// record and an optional parallel class-id slice. Capacity is the
/// smaller of `max_detections` and what the slice can hold, so writes
/// can never run past either bound. Nothing is allocated.
pub struct DetectionBuffer<'a> {
    records: &'a mut [f32],
    class_ids: Option<&'a mut [u32]>,
    capacity: usize,
    len: usize,
}

impl<'a> DetectionBuffer<'a> {
    pub fn new(records: &'a mut [f32], max_detections: usize) -> Self {
        let capacity = max_detections.min(records.len() / PARAMS_PER_DETECTION);
        Self {
            records,
            class_ids: None,
            capacity,
            len: 0,
        }
    }

    pub fn with_class_ids(mut self, class_ids: &'a mut [u32]) -> Self {
        self.class_ids = Some(class_ids);
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records written by the last `fill`.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Writes the leading `capacity` detections and returns how many were
    /// written. Class ids are written only where the class-id slice has room.
    pub fn fill(&mut self, detections: &[Detection]) -> usize {
        let count = detections.len().min(self.capacity);
        for (i, det) in detections.iter().take(count).enumerate() {
            let start = i * PARAMS_PER_DETECTION;
            self.records[start..start + PARAMS_PER_DETECTION].copy_from_slice(&det.to_record());
            if let Some(slot) = self.class_ids.as_deref_mut().and_then(|ids| ids.get_mut(i)) {
                *slot = det.class_id;
            }
        }
        self.len = count;
        count
    }

    /// Written records, in output order.
    pub fn iter(&self) -> impl Iterator<Item = DetectionRecord> + '_ {
        self.records[..self.len * PARAMS_PER_DETECTION]
            .chunks_exact(PARAMS_PER_DETECTION)
            .map(|chunk| {
                let mut record = [0.0; PARAMS_PER_DETECTION];
                record.copy_from_slice(chunk);
                record
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(x: f32, confidence: f32, class_id: u32) -> Detection {
        Detection::new(x, 0.0, 10.0, 10.0, confidence).with_class_id(class_id)
    }

    #[test]
    fn test_capacity_is_bounded_by_slice() {
        let mut storage = vec![0.0f32; PARAMS_PER_DETECTION * 2];
        let buffer = DetectionBuffer::new(&mut storage, 10);
        assert_eq!(buffer.capacity(), 2);
    }

    #[test]
    fn test_capacity_is_bounded_by_max_detections() {
        let mut storage = vec![0.0f32; PARAMS_PER_DETECTION * 10];
        let buffer = DetectionBuffer::new(&mut storage, 3);
        assert_eq!(buffer.capacity(), 3);
    }

    #[test]
    fn test_fill_writes_records_in_order() {
        let mut storage = vec![-1.0f32; PARAMS_PER_DETECTION * 2];
        let mut buffer = DetectionBuffer::new(&mut storage, 2);
        let written = buffer.fill(&[det(1.0, 0.9, 0), det(2.0, 0.8, 0)]);
        assert_eq!(written, 2);
        assert_eq!(buffer.len(), 2);
        let records: Vec<_> = buffer.iter().collect();
        assert_eq!(records[0], [1.0, 0.0, 10.0, 10.0, 0.9, 0.0, 0.0]);
        assert_eq!(records[1], [2.0, 0.0, 10.0, 10.0, 0.8, 0.0, 0.0]);
    }

    #[test]
    fn test_fill_never_writes_past_capacity() {
        let mut storage = vec![-1.0f32; PARAMS_PER_DETECTION * 3];
        let mut buffer = DetectionBuffer::new(&mut storage, 1);
        let written = buffer.fill(&[det(1.0, 0.9, 0), det(2.0, 0.8, 0), det(3.0, 0.7, 0)]);
        assert_eq!(written, 1);
        drop(buffer);
        assert!(storage[PARAMS_PER_DETECTION..].iter().all(|&v| v == -1.0));
    }

    #[test]
    fn test_zero_capacity_leaves_storage_untouched() {
        let mut storage = vec![-1.0f32; PARAMS_PER_DETECTION * 2];
        let mut buffer = DetectionBuffer::new(&mut storage, 0);
        assert_eq!(buffer.fill(&[det(1.0, 0.9, 0)]), 0);
        assert!(buffer.is_empty());
        drop(buffer);
        assert!(storage.iter().all(|&v| v == -1.0));
    }

    #[test]
    fn test_class_ids_written_in_parallel() {
        let mut storage = vec![0.0f32; PARAMS_PER_DETECTION * 2];
        let mut ids = vec![99u32; 2];
        let mut buffer = DetectionBuffer::new(&mut storage, 2).with_class_ids(&mut ids);
        buffer.fill(&[det(1.0, 0.9, 4), det(2.0, 0.8, 5)]);
        drop(buffer);
        assert_eq!(ids, vec![4, 5]);
    }

    #[test]
    fn test_short_class_id_slice_is_not_overrun() {
        let mut storage = vec![0.0f32; PARAMS_PER_DETECTION * 2];
        let mut ids = vec![99u32; 1];
        let mut buffer = DetectionBuffer::new(&mut storage, 2).with_class_ids(&mut ids);
        assert_eq!(buffer.fill(&[det(1.0, 0.9, 4), det(2.0, 0.8, 5)]), 2);
        drop(buffer);
        assert_eq!(ids, vec![4]);
    }

    #[test]
    fn test_refill_reports_latest_count() {
        let mut storage = vec![0.0f32; PARAMS_PER_DETECTION * 4];
        let mut buffer = DetectionBuffer::new(&mut storage, 4);
        buffer.fill(&[det(1.0, 0.9, 0), det(2.0, 0.8, 0), det(3.0, 0.7, 0)]);
        buffer.fill(&[det(5.0, 0.5, 0)]);
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.iter().count(), 1);
    }
}

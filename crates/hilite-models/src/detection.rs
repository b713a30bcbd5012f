//! Object detections handed over by an external detector.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::rect::PixelRect;

/// COCO class ids treated as vehicles: car, motorcycle, bus, truck.
pub const VEHICLE_CLASS_IDS: [usize; 4] = [2, 3, 5, 7];

/// Detected object with a pixel bounding box and classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ObjectDetection {
    /// Bounding box in frame pixel coordinates
    pub rect: PixelRect,
    /// COCO class ID (0 = person, 2 = car, etc.)
    pub class_id: usize,
    /// Detection confidence [0, 1]
    pub confidence: f32,
}

impl ObjectDetection {
    pub fn new(rect: PixelRect, class_id: usize, confidence: f32) -> Self {
        Self {
            rect,
            class_id,
            confidence,
        }
    }

    /// Check if this is a vehicle detection.
    pub fn is_vehicle(&self) -> bool {
        VEHICLE_CLASS_IDS.contains(&self.class_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_classes() {
        let rect = PixelRect::new(0, 0, 10, 10);
        assert!(ObjectDetection::new(rect, 2, 0.9).is_vehicle());
        assert!(ObjectDetection::new(rect, 7, 0.9).is_vehicle());
        assert!(!ObjectDetection::new(rect, 0, 0.9).is_vehicle());
        assert!(!ObjectDetection::new(rect, 6, 0.9).is_vehicle());
    }
}

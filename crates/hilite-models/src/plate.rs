//! Plate-like region candidates.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::rect::PixelRect;

/// A rectangular region inside a vehicle crop that looks like a plate.
///
/// Coordinates are in the crop's own pixel space. Candidates live for a
/// single frame and are never tracked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PlateCandidate {
    /// Padded region, clipped to the crop
    pub rect: PixelRect,
    /// Area of the unpadded contour bounding box (processing resolution)
    pub area: f64,
    /// Width / height of the unpadded bounding box
    pub aspect_ratio: f64,
    /// Fraction of non-zero gradient pixels inside the bounding box
    pub edge_density: f64,
}

impl PlateCandidate {
    /// Ranking key: larger, edge-dense regions first.
    pub fn rank_score(&self, edge_bias: f64) -> f64 {
        self.area * (self.edge_density + edge_bias)
    }
}

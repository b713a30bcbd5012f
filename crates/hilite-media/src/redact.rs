//! License plate redaction.
//!
//! Vehicles come from an external object detector; plates are searched
//! inside each vehicle box with [`PlateDetector`] and blurred in place.

use hilite_models::{ObjectDetection, PixelRect};
use image::{imageops, RgbImage};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::MediaResult;
use crate::plate::PlateDetector;

/// Object detector collaborator.
///
/// Boxes are reported in the pixel space of the image passed in.
pub trait VehicleDetector: Send + Sync {
    fn detect(&self, frame: &RgbImage) -> MediaResult<Vec<ObjectDetection>>;

    /// Detector name for logging.
    fn name(&self) -> &'static str;
}

/// Settings for plate redaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedactionConfig {
    /// Minimum vehicle detection confidence (default: 0.25)
    pub vehicle_confidence: f32,

    /// Gaussian kernel size; even values are bumped to the next odd (default: 51)
    pub blur_kernel: u32,

    /// Each vehicle box is shrunk by this fraction per side (default: 0.03)
    pub vehicle_inset_fraction: f64,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            vehicle_confidence: 0.25,
            blur_kernel: 51,
            vehicle_inset_fraction: 0.03,
        }
    }
}

impl RedactionConfig {
    /// Kernel size actually used (always odd).
    pub fn odd_kernel(&self) -> u32 {
        if self.blur_kernel % 2 == 1 {
            self.blur_kernel
        } else {
            self.blur_kernel + 1
        }
    }
}

/// Gaussian sigma for a kernel size, as image libraries derive it when
/// only the size is given.
pub fn kernel_sigma(kernel: u32) -> f32 {
    0.3 * ((kernel as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Vehicle box clipped to the frame and shrunk by `inset` per side.
fn vehicle_region(det: &ObjectDetection, width: u32, height: u32, inset: f64) -> PixelRect {
    let r = det.rect.clamp(width, height);
    let pad_x = (r.width() as f64 * inset) as u32;
    let pad_y = (r.height() as f64 * inset) as u32;
    PixelRect::new(
        r.x1 + pad_x,
        r.y1 + pad_y,
        r.x2.saturating_sub(pad_x),
        r.y2.saturating_sub(pad_y),
    )
}

/// Plate rectangles in frame coordinates for every confident vehicle.
pub fn plate_regions_in_frame(
    frame: &RgbImage,
    detections: &[ObjectDetection],
    detector: &PlateDetector,
    config: &RedactionConfig,
) -> Vec<PixelRect> {
    let (width, height) = frame.dimensions();
    let mut regions = Vec::new();

    for det in detections
        .iter()
        .filter(|d| d.is_vehicle() && d.confidence >= config.vehicle_confidence)
    {
        let vehicle = vehicle_region(det, width, height, config.vehicle_inset_fraction);
        if vehicle.is_empty() {
            continue;
        }

        let crop = imageops::crop_imm(frame, vehicle.x1, vehicle.y1, vehicle.width(), vehicle.height())
            .to_image();
        for plate in detector.detect_regions(&crop) {
            let rect = plate.translate(vehicle.x1, vehicle.y1).clamp(width, height);
            if !rect.is_empty() {
                regions.push(rect);
            }
        }
    }

    regions
}

/// Gaussian-blur each region of `frame` in place.
pub fn blur_regions(frame: &mut RgbImage, regions: &[PixelRect], kernel: u32) {
    let sigma = kernel_sigma(kernel);
    let (width, height) = frame.dimensions();

    for region in regions {
        let r = region.clamp(width, height);
        if r.is_empty() {
            continue;
        }
        let patch = imageops::crop_imm(frame, r.x1, r.y1, r.width(), r.height()).to_image();
        let blurred = imageops::blur(&patch, sigma);
        imageops::replace(frame, &blurred, r.x1 as i64, r.y1 as i64);
    }
}

/// Detect vehicles and blur their plates. Returns the number of regions blurred.
pub fn redact_frame(
    frame: &mut RgbImage,
    vehicles: &dyn VehicleDetector,
    plates: &PlateDetector,
    config: &RedactionConfig,
) -> MediaResult<usize> {
    let detections = vehicles.detect(frame)?;
    let regions = plate_regions_in_frame(frame, &detections, plates, config);

    debug!(
        detector = vehicles.name(),
        detections = detections.len(),
        plates = regions.len(),
        "Redacting frame"
    );

    blur_regions(frame, &regions, config.odd_kernel());
    Ok(regions.len())
}

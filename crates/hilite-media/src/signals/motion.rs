//! Visual motion signal.
//!
//! Motion is the mean absolute difference between consecutive sampled
//! grayscale frames. The fold keeps only the previous sampled frame, so
//! memory stays bounded by one frame regardless of video length.

use std::path::Path;

#[cfg(feature = "opencv")]
use image::GrayImage;
#[cfg(feature = "opencv")]
use opencv::{core, prelude::*};
#[cfg(feature = "opencv")]
use tracing::debug;
use tracing::warn;

use super::config::SignalConfig;
use super::Signal;
#[cfg(feature = "opencv")]
use crate::cv::gray_to_mat;
use crate::transform::MediaTransform;

#[cfg(feature = "opencv")]
fn mat_abs_diff(a: &Mat, b: &Mat) -> opencv::Result<f64> {
    let mut diff = Mat::default();
    core::absdiff(a, b, &mut diff)?;
    Ok(core::mean(&diff, &core::no_array())?[0] / 255.0)
}

/// Mean absolute pixel difference of two equal-size frames, scaled to [0, 1].
///
/// Returns `None` when the frames differ in size or are empty.
#[cfg(feature = "opencv")]
pub fn mean_abs_diff(a: &GrayImage, b: &GrayImage) -> Option<f64> {
    if a.dimensions() != b.dimensions() || a.as_raw().is_empty() {
        return None;
    }

    let diff = gray_to_mat(a).and_then(|a| mat_abs_diff(&a, &gray_to_mat(b)?));
    match diff {
        Ok(d) => Some(d),
        Err(e) => {
            debug!(error = %e, "Frame difference failed");
            None
        }
    }
}

/// Forward-only frame-difference accumulator.
#[cfg(feature = "opencv")]
pub struct MotionAccumulator {
    step: usize,
    /// Previous sampled frame and its dimensions
    prev: Option<(Mat, (u32, u32))>,
    samples: Vec<f64>,
}

#[cfg(feature = "opencv")]
impl std::fmt::Debug for MotionAccumulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MotionAccumulator")
            .field("step", &self.step)
            .field("prev", &self.prev.as_ref().map(|(_, dims)| *dims))
            .field("samples", &self.samples.len())
            .finish()
    }
}

#[cfg(feature = "opencv")]
impl MotionAccumulator {
    /// Create an accumulator sampling every `step`th frame.
    pub fn new(step: usize) -> Self {
        Self {
            step: step.max(1),
            prev: None,
            samples: Vec::new(),
        }
    }

    /// Feed the frame at `index` (0-based position in the source).
    ///
    /// Frames off the sampling grid are ignored. The first sampled frame has
    /// no predecessor and contributes no sample.
    pub fn push(&mut self, index: usize, frame: GrayImage) {
        if index % self.step != 0 {
            return;
        }

        if frame.as_raw().is_empty() {
            self.prev = None;
            return;
        }

        let dims = frame.dimensions();
        let mat = match gray_to_mat(&frame) {
            Ok(m) => m,
            Err(e) => {
                debug!(index, error = %e, "Frame conversion failed, restarting motion fold");
                self.prev = None;
                return;
            }
        };

        if let Some((prev, prev_dims)) = &self.prev {
            if *prev_dims != dims {
                debug!(index, "Frame size changed, restarting motion fold");
            } else {
                match mat_abs_diff(prev, &mat) {
                    Ok(diff) => self.samples.push(diff),
                    Err(e) => debug!(index, error = %e, "Frame difference failed"),
                }
            }
        }

        self.prev = Some((mat, dims));
    }

    /// Number of motion samples gathered so far.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Raw (unnormalized) motion samples.
    pub fn finish(self) -> Vec<f64> {
        self.samples
    }
}

/// Extract the normalized motion signal of `path`.
///
/// Decode errors after some frames were read keep the samples gathered so
/// far; a video that yields no samples gets the neutral fallback.
#[cfg(feature = "opencv")]
pub async fn extract_motion_signal(
    transform: &dyn MediaTransform,
    path: &Path,
    config: &SignalConfig,
) -> Signal {
    let fallback = Signal::neutral(config.fallback_value, config.fallback_hop_seconds);

    let mut frames = match transform.open_gray_frames(path).await {
        Ok(f) => f,
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "Video decode failed, using neutral motion signal"
            );
            return fallback;
        }
    };

    let step = config.motion_step.max(1);
    let mut acc = MotionAccumulator::new(step);
    let mut index = 0usize;

    loop {
        match frames.next_frame().await {
            Ok(Some(frame)) => {
                acc.push(index, frame);
                index += 1;
            }
            Ok(None) => break,
            Err(e) => {
                warn!(
                    path = %path.display(),
                    frame = index,
                    error = %e,
                    "Frame decode failed, stopping motion analysis"
                );
                break;
            }
        }
    }

    if acc.is_empty() {
        warn!(
            path = %path.display(),
            frames = index,
            "No motion samples, using neutral motion signal"
        );
        return fallback;
    }

    let hop_seconds = frames
        .frame_rate()
        .map(|fps| step as f64 / fps)
        .unwrap_or(config.fallback_hop_seconds);

    debug!(
        frames = index,
        samples = acc.len(),
        "Computed motion signal"
    );

    Signal::new(acc.finish(), hop_seconds).normalized()
}

/// Without OpenCV there is no frame differencing; motion is always neutral.
#[cfg(not(feature = "opencv"))]
pub async fn extract_motion_signal(
    _transform: &dyn MediaTransform,
    path: &Path,
    config: &SignalConfig,
) -> Signal {
    warn!(
        path = %path.display(),
        "Built without OpenCV, using neutral motion signal"
    );
    Signal::neutral(config.fallback_value, config.fallback_hop_seconds)
}

#[cfg(all(test, feature = "opencv"))]
mod tests {
    use super::*;
    use image::Luma;

    fn flat(value: u8) -> GrayImage {
        GrayImage::from_pixel(8, 6, Luma([value]))
    }

    #[test]
    fn test_mean_abs_diff() {
        let diff = mean_abs_diff(&flat(0), &flat(255)).unwrap();
        assert!((diff - 1.0).abs() < 1e-9);
        assert_eq!(mean_abs_diff(&flat(40), &flat(40)), Some(0.0));
        assert!(mean_abs_diff(&flat(0), &GrayImage::new(4, 4)).is_none());
    }

    #[test]
    fn test_first_frame_contributes_nothing() {
        let mut acc = MotionAccumulator::new(1);
        acc.push(0, flat(0));
        assert!(acc.is_empty());
        acc.push(1, flat(51));
        assert_eq!(acc.len(), 1);
        assert!((acc.finish()[0] - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_subsampling_skips_off_grid_frames() {
        let mut acc = MotionAccumulator::new(10);
        for i in 0..25 {
            // Off-grid frames are wildly different and must be ignored.
            let value = if i % 10 == 0 { (i * 5) as u8 } else { 255 };
            acc.push(i, flat(value));
        }
        let samples = acc.finish();
        // Sampled frames: 0, 10, 20 -> two differences of 50/255.
        assert_eq!(samples.len(), 2);
        for s in samples {
            assert!((s - 50.0 / 255.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_size_change_restarts_fold() {
        let mut acc = MotionAccumulator::new(1);
        acc.push(0, flat(0));
        acc.push(1, GrayImage::new(3, 3));
        acc.push(2, GrayImage::from_pixel(3, 3, Luma([255])));
        assert_eq!(acc.finish(), vec![1.0]);
    }
}

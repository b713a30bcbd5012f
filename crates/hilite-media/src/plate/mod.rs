//! Plate region detection.
//!
//! A classical OpenCV cascade over a vehicle crop: bilateral smoothing,
//! horizontal gradient, Otsu binarization, morphology, external contours and
//! shape filtering. Dense vertical strokes arranged in a wide band (plate
//! characters) survive; most other structure does not.
//!
//! A crop without a plate yields an empty result, and so does any OpenCV
//! failure (logged at `warn`).

pub mod filters;

use hilite_models::{PixelRect, PlateCandidate};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(feature = "opencv")]
use opencv::{
    core::{self, Point, Rect, Scalar, Size, Vector},
    imgproc,
    prelude::*,
};
#[cfg(feature = "opencv")]
use tracing::warn;

#[cfg(feature = "opencv")]
use crate::cv::{cv_error, rgb_to_mat};
use crate::error::MediaResult;

use self::filters::{
    aspect_within, edge_density_at_least, fill_within, min_size, FilterCascade, RegionMeasure,
};

/// Tunables for [`PlateDetector`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlateDetectorConfig {
    // === Preprocessing ===
    /// Crops are resized to this width before analysis (default: 640)
    pub processing_width: u32,

    /// Bilateral filter diameter (default: 7)
    pub bilateral_diameter: u32,

    /// Bilateral filter range sigma (default: 50.0)
    pub bilateral_sigma_color: f64,

    /// Bilateral filter spatial sigma (default: 50.0)
    pub bilateral_sigma_space: f64,

    // === Morphology ===
    /// Closing kernel as (width, height) (default: 17x3)
    pub close_kernel: (u32, u32),

    /// Closing iterations (default: 2)
    pub close_iterations: u32,

    /// Opening kernel as (width, height) (default: 3x3)
    pub open_kernel: (u32, u32),

    /// Opening iterations (default: 1)
    pub open_iterations: u32,

    /// Rows above this fraction of the height are not searched (default: 0.4)
    pub search_top_fraction: f64,

    // === Candidate filters ===
    /// Minimum bounding box width in processing pixels (default: 30)
    pub min_width: u32,

    /// Minimum bounding box height in processing pixels (default: 12)
    pub min_height: u32,

    /// Accepted width/height ratio (default: 1.8..=6.5)
    pub aspect_range: (f64, f64),

    /// Accepted contour fill ratio (default: 0.45..=1.0)
    pub fill_range: (f64, f64),

    /// Minimum fraction of gradient pixels in the box (default: 0.10)
    pub min_edge_density: f64,

    // === Output ===
    /// Horizontal padding as a fraction of box width (default: 0.06)
    pub pad_x_fraction: f64,

    /// Vertical padding as a fraction of box height (default: 0.25)
    pub pad_y_fraction: f64,

    /// Added to edge density when ranking by area (default: 0.5)
    pub rank_edge_bias: f64,

    /// Maximum number of regions returned (default: 2)
    pub max_candidates: usize,
}

impl Default for PlateDetectorConfig {
    fn default() -> Self {
        Self {
            processing_width: 640,
            bilateral_diameter: 7,
            bilateral_sigma_color: 50.0,
            bilateral_sigma_space: 50.0,
            close_kernel: (17, 3),
            close_iterations: 2,
            open_kernel: (3, 3),
            open_iterations: 1,
            search_top_fraction: 0.4,
            min_width: 30,
            min_height: 12,
            aspect_range: (1.8, 6.5),
            fill_range: (0.45, 1.0),
            min_edge_density: 0.10,
            pad_x_fraction: 0.06,
            pad_y_fraction: 0.25,
            rank_edge_bias: 0.5,
            max_candidates: 2,
        }
    }
}

impl PlateDetectorConfig {
    /// Builder-style setter for the result cap.
    pub fn with_max_candidates(mut self, max: usize) -> Self {
        self.max_candidates = max;
        self
    }

    /// Builder-style setter for the searched band.
    pub fn with_search_top_fraction(mut self, fraction: f64) -> Self {
        self.search_top_fraction = fraction.clamp(0.0, 1.0);
        self
    }

    /// Shape and texture cascade built from these settings.
    pub fn cascade(&self) -> FilterCascade {
        let (aspect_lo, aspect_hi) = self.aspect_range;
        let (fill_lo, fill_hi) = self.fill_range;
        FilterCascade::new()
            .stage("min_size", min_size(self.min_width, self.min_height))
            .stage("aspect", aspect_within(aspect_lo..=aspect_hi))
            .stage("fill", fill_within(fill_lo..=fill_hi))
            .stage("edge_density", edge_density_at_least(self.min_edge_density))
    }
}

/// Finds plate-like rectangles in vehicle crops.
#[derive(Debug)]
pub struct PlateDetector {
    config: PlateDetectorConfig,
    cascade: FilterCascade,
}

impl Default for PlateDetector {
    fn default() -> Self {
        Self::new(PlateDetectorConfig::default())
    }
}

impl PlateDetector {
    pub fn new(config: PlateDetectorConfig) -> Self {
        let cascade = config.cascade();
        Self { config, cascade }
    }

    pub fn config(&self) -> &PlateDetectorConfig {
        &self.config
    }

    /// Detect up to `max_candidates` plate regions in `crop`.
    ///
    /// Returned rectangles are in the crop's pixel space, padded, and ordered
    /// by descending rank.
    pub fn detect(&self, crop: &RgbImage) -> Vec<PlateCandidate> {
        let (w0, h0) = crop.dimensions();
        if w0 == 0 || h0 == 0 {
            return Vec::new();
        }

        match self.search(crop) {
            Ok(candidates) => candidates,
            Err(e) => {
                #[cfg(feature = "opencv")]
                warn!(width = w0, height = h0, error = %e, "Plate search failed");
                #[cfg(not(feature = "opencv"))]
                debug!(width = w0, height = h0, error = %e, "Plate search unavailable");
                Vec::new()
            }
        }
    }

    #[cfg(feature = "opencv")]
    fn search(&self, crop: &RgbImage) -> MediaResult<Vec<PlateCandidate>> {
        let (w0, h0) = crop.dimensions();
        let scale = self.config.processing_width as f64 / w0.max(1) as f64;
        let pw = ((w0 as f64 * scale) as i32).max(1);
        let ph = ((h0 as f64 * scale) as i32).max(1);

        let (gradient, focused, level) = self
            .binarize(crop, Size::new(pw, ph))
            .map_err(|e| cv_error("plate binarize", e))?;

        let mut contours: Vector<Vector<Point>> = Vector::new();
        imgproc::find_contours(
            &focused,
            &mut contours,
            imgproc::RETR_EXTERNAL,
            imgproc::CHAIN_APPROX_SIMPLE,
            Point::new(0, 0),
        )
        .map_err(|e| cv_error("plate contours", e))?;

        debug!(
            width = w0,
            height = h0,
            otsu = level,
            contours = contours.len(),
            "Plate search"
        );

        let mut candidates: Vec<PlateCandidate> = Vec::new();
        for contour in contours.iter() {
            let measure = measure_region(&contour, &gradient)
                .map_err(|e| cv_error("plate measure", e))?;
            let rect = measure.rect;
            if rect.is_empty() {
                continue;
            }

            if let Some(stage) = self.cascade.first_rejection(&measure) {
                debug!(
                    x = rect.x1,
                    y = rect.y1,
                    w = rect.width(),
                    h = rect.height(),
                    stage,
                    "Region rejected"
                );
                continue;
            }

            candidates.push(PlateCandidate {
                rect: self.pad(&rect, pw as u32, ph as u32),
                area: rect.area() as f64,
                aspect_ratio: measure.aspect_ratio(),
                edge_density: measure.edge_density,
            });
        }

        let bias = self.config.rank_edge_bias;
        candidates.sort_by(|a, b| b.rank_score(bias).total_cmp(&a.rank_score(bias)));
        candidates.truncate(self.config.max_candidates);

        let inv = 1.0 / scale.max(1e-6);
        Ok(candidates
            .into_iter()
            .filter_map(|c| {
                let rect = scale_back(&c.rect, inv, w0, h0)?;
                Some(PlateCandidate { rect, ..c })
            })
            .collect())
    }

    /// Normalized gradient, searchable binary mask and Otsu level.
    #[cfg(feature = "opencv")]
    fn binarize(&self, crop: &RgbImage, size: Size) -> opencv::Result<(Mat, Mat, f64)> {
        let cfg = &self.config;

        let src = rgb_to_mat(crop)?;
        let mut proc = Mat::default();
        imgproc::resize(&src, &mut proc, size, 0.0, 0.0, imgproc::INTER_LINEAR)?;

        let mut gray = Mat::default();
        imgproc::cvt_color_def(&proc, &mut gray, imgproc::COLOR_RGB2GRAY)?;
        let mut smooth = Mat::default();
        imgproc::bilateral_filter(
            &gray,
            &mut smooth,
            cfg.bilateral_diameter as i32,
            cfg.bilateral_sigma_color,
            cfg.bilateral_sigma_space,
            core::BORDER_DEFAULT,
        )?;

        let mut grad_x = Mat::default();
        imgproc::sobel(
            &smooth,
            &mut grad_x,
            core::CV_16S,
            1,
            0,
            3,
            1.0,
            0.0,
            core::BORDER_DEFAULT,
        )?;
        let mut grad_abs = Mat::default();
        core::convert_scale_abs(&grad_x, &mut grad_abs, 1.0, 0.0)?;
        let mut gradient = Mat::default();
        core::normalize(
            &grad_abs,
            &mut gradient,
            0.0,
            255.0,
            core::NORM_MINMAX,
            -1,
            &Mat::default(),
        )?;

        let mut binary = Mat::default();
        let level = imgproc::threshold(
            &gradient,
            &mut binary,
            0.0,
            255.0,
            imgproc::THRESH_BINARY | imgproc::THRESH_OTSU,
        )?;

        let closed = morphology(&binary, imgproc::MORPH_CLOSE, cfg.close_kernel, cfg.close_iterations)?;
        let mut focused = morphology(&closed, imgproc::MORPH_OPEN, cfg.open_kernel, cfg.open_iterations)?;

        let y_focus = ((size.height as f64 * cfg.search_top_fraction) as i32).min(size.height);
        if y_focus > 0 {
            imgproc::rectangle(
                &mut focused,
                Rect::new(0, 0, size.width, y_focus),
                Scalar::all(0.0),
                imgproc::FILLED,
                imgproc::LINE_8,
                0,
            )?;
        }

        Ok((gradient, focused, level))
    }

    #[cfg(not(feature = "opencv"))]
    fn search(&self, _crop: &RgbImage) -> MediaResult<Vec<PlateCandidate>> {
        Err(crate::error::MediaError::detection_failed(
            "plate search requires the opencv feature",
        ))
    }

    /// Rectangles only, in crop coordinates.
    pub fn detect_regions(&self, crop: &RgbImage) -> Vec<PixelRect> {
        self.detect(crop).into_iter().map(|c| c.rect).collect()
    }

    fn pad(&self, rect: &PixelRect, pw: u32, ph: u32) -> PixelRect {
        let pad_x = (rect.width() as f64 * self.config.pad_x_fraction) as u32;
        let pad_y = (rect.height() as f64 * self.config.pad_y_fraction) as u32;
        PixelRect::new(
            rect.x1.saturating_sub(pad_x),
            rect.y1.saturating_sub(pad_y),
            (rect.x2 + pad_x).min(pw),
            (rect.y2 + pad_y).min(ph),
        )
    }
}

/// Map a processing-space rectangle back to the original crop.
fn scale_back(rect: &PixelRect, inv: f64, w0: u32, h0: u32) -> Option<PixelRect> {
    let x1 = ((rect.x1 as f64 * inv) as u32).min(w0.saturating_sub(1));
    let y1 = ((rect.y1 as f64 * inv) as u32).min(h0.saturating_sub(1));
    let x2 = ((rect.x2 as f64 * inv) as u32).min(w0);
    let y2 = ((rect.y2 as f64 * inv) as u32).min(h0);
    (x2 > x1 && y2 > y1).then(|| PixelRect::new(x1, y1, x2, y2))
}

/// Rectangular morphology with the border ignored.
#[cfg(feature = "opencv")]
fn morphology(src: &Mat, op: i32, kernel: (u32, u32), iterations: u32) -> opencv::Result<Mat> {
    let element = imgproc::get_structuring_element(
        imgproc::MORPH_RECT,
        Size::new(kernel.0 as i32, kernel.1 as i32),
        Point::new(-1, -1),
    )?;
    let mut dst = Mat::default();
    imgproc::morphology_ex(
        src,
        &mut dst,
        op,
        &element,
        Point::new(-1, -1),
        iterations as i32,
        core::BORDER_CONSTANT,
        imgproc::morphology_default_border_value()?,
    )?;
    Ok(dst)
}

/// Bounding box, contour area and gradient density of one contour.
#[cfg(feature = "opencv")]
fn measure_region(contour: &Vector<Point>, gradient: &Mat) -> opencv::Result<RegionMeasure> {
    let bounds = imgproc::bounding_rect(contour)?;
    let contour_area = imgproc::contour_area(contour, false)?;
    let rect = PixelRect::from_xywh(
        bounds.x.max(0) as u32,
        bounds.y.max(0) as u32,
        bounds.width.max(0) as u32,
        bounds.height.max(0) as u32,
    );
    if rect.is_empty() {
        return Ok(RegionMeasure {
            rect,
            contour_area,
            edge_density: 0.0,
        });
    }

    let roi = Mat::roi(gradient, bounds)?;
    let edges = core::count_non_zero(&roi)?;
    Ok(RegionMeasure {
        rect,
        contour_area,
        edge_density: edges as f64 / rect.area() as f64,
    })
}

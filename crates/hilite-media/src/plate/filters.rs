//! Geometric and texture filters over candidate regions.
//!
//! Each stage is a named predicate; a [`FilterCascade`] runs them in order
//! and stops at the first rejection.

use std::ops::RangeInclusive;

use hilite_models::PixelRect;

/// Measurements of one contour at processing resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionMeasure {
    /// Unpadded bounding box
    pub rect: PixelRect,
    /// Enclosed contour area
    pub contour_area: f64,
    /// Fraction of non-zero gradient pixels inside `rect`
    pub edge_density: f64,
}

impl RegionMeasure {
    pub fn width(&self) -> f64 {
        self.rect.width() as f64
    }

    pub fn height(&self) -> f64 {
        self.rect.height() as f64
    }

    /// Width over height; infinite for a zero-height box.
    pub fn aspect_ratio(&self) -> f64 {
        self.width() / self.height()
    }

    /// Contour area relative to its bounding box.
    pub fn fill_ratio(&self) -> f64 {
        self.contour_area / (self.width() * self.height() + 1e-6)
    }
}

type Predicate = Box<dyn Fn(&RegionMeasure) -> bool + Send + Sync>;

/// Ordered, short-circuiting set of named predicates.
#[derive(Default)]
pub struct FilterCascade {
    stages: Vec<(&'static str, Predicate)>,
}

impl std::fmt::Debug for FilterCascade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.stages.iter().map(|(name, _)| name))
            .finish()
    }
}

impl FilterCascade {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage.
    pub fn stage<F>(mut self, name: &'static str, predicate: F) -> Self
    where
        F: Fn(&RegionMeasure) -> bool + Send + Sync + 'static,
    {
        self.stages.push((name, Box::new(predicate)));
        self
    }

    /// Name of the first stage rejecting `region`, or `None` if all pass.
    pub fn first_rejection(&self, region: &RegionMeasure) -> Option<&'static str> {
        self.stages
            .iter()
            .find(|(_, predicate)| !predicate(region))
            .map(|(name, _)| *name)
    }

    pub fn passes(&self, region: &RegionMeasure) -> bool {
        self.first_rejection(region).is_none()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

/// Reject regions narrower or shorter than the given size.
pub fn min_size(min_width: u32, min_height: u32) -> impl Fn(&RegionMeasure) -> bool + Send + Sync {
    move |r| r.rect.width() >= min_width && r.rect.height() >= min_height
}

/// Keep regions whose width/height ratio lies in `range`.
pub fn aspect_within(range: RangeInclusive<f64>) -> impl Fn(&RegionMeasure) -> bool + Send + Sync {
    move |r| range.contains(&r.aspect_ratio())
}

/// Keep regions whose fill ratio lies in `range`.
pub fn fill_within(range: RangeInclusive<f64>) -> impl Fn(&RegionMeasure) -> bool + Send + Sync {
    move |r| range.contains(&r.fill_ratio())
}

/// Keep regions with at least this much edge texture.
pub fn edge_density_at_least(min: f64) -> impl Fn(&RegionMeasure) -> bool + Send + Sync {
    move |r| r.edge_density >= min
}

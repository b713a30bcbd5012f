//! Signal extraction for highlight scoring.
//!
//! Turns raw audio and raw video into two independent 1-D signals with the
//! same semantics (higher = more intense):
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐
//! │ Audio (mono) │───►│ RMS energy   │──┐
//! └──────────────┘    └──────────────┘  │   ┌───────────────┐
//!                                       ├──►│ normalize     │──► scorer
//! ┌──────────────┐    ┌──────────────┐  │   │ (min-max)     │
//! │ Gray frames  │───►│ frame diff   │──┘   └───────────────┘
//! └──────────────┘    └──────────────┘
//! ```
//!
//! Extraction never fails: an unreadable input yields a single-sample
//! neutral signal so scoring can proceed.

mod audio;
mod config;
mod motion;

pub use audio::{extract_audio_signal, rms_energy};
pub use config::SignalConfig;
pub use motion::extract_motion_signal;
#[cfg(feature = "opencv")]
pub use motion::{mean_abs_diff, MotionAccumulator};

/// Epsilon added to the min-max range so constant signals stay finite.
pub const NORMALIZE_EPSILON: f64 = 1e-9;

/// An ordered sequence of per-window samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    /// One value per analysis window
    pub values: Vec<f64>,
    /// Duration each sample represents (seconds)
    pub hop_seconds: f64,
}

impl Signal {
    pub fn new(values: Vec<f64>, hop_seconds: f64) -> Self {
        Self {
            values,
            hop_seconds,
        }
    }

    /// Single-sample neutral signal used when nothing can be extracted.
    pub fn neutral(value: f64, hop_seconds: f64) -> Self {
        Self::new(vec![value], hop_seconds)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Copy of this signal min-max normalized to [0, 1].
    pub fn normalized(&self) -> Signal {
        Signal::new(normalize(&self.values), self.hop_seconds)
    }
}

/// Min-max normalize: `(v - min) / (max - min + ε)`.
///
/// Non-finite inputs are treated as zero. A constant signal maps to all
/// zeros rather than NaN.
pub fn normalize(values: &[f64]) -> Vec<f64> {
    let clean: Vec<f64> = values
        .iter()
        .map(|v| if v.is_finite() { *v } else { 0.0 })
        .collect();

    let Some(min) = clean.iter().copied().reduce(f64::min) else {
        return Vec::new();
    };
    let max = clean.iter().copied().fold(min, f64::max);
    let range = max - min + NORMALIZE_EPSILON;

    clean
        .into_iter()
        .map(|v| ((v - min) / range).clamp(0.0, 1.0))
        .collect()
}

/// Linearly resample `values` onto `len` evenly spaced positions spanning
/// the signal's own index range.
///
/// A single-sample signal is broadcast to every position.
pub fn resample(values: &[f64], len: usize) -> Vec<f64> {
    if values.is_empty() || len == 0 {
        return Vec::new();
    }
    if values.len() == 1 {
        return vec![values[0]; len];
    }
    if len == 1 {
        return vec![values[0]];
    }

    let last = (values.len() - 1) as f64;
    let step = last / (len - 1) as f64;

    (0..len)
        .map(|i| {
            let pos = (i as f64 * step).min(last);
            let lo = pos.floor() as usize;
            let hi = (lo + 1).min(values.len() - 1);
            let frac = pos - lo as f64;
            values[lo] + (values[hi] - values[lo]) * frac
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_bounds() {
        let out = normalize(&[3.0, -2.0, 10.0, 4.5]);
        assert!(out.iter().all(|v| (0.0..=1.0).contains(v)));
        assert_eq!(out[1], 0.0);
        assert!((out[2] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_constant_is_zero_not_nan() {
        let out = normalize(&[0.7; 5]);
        assert_eq!(out, vec![0.0; 5]);
    }

    #[test]
    fn test_normalize_non_finite() {
        let out = normalize(&[f64::NAN, 1.0, f64::INFINITY, 2.0]);
        assert!(out.iter().all(|v| v.is_finite() && (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_normalize_empty() {
        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn test_resample_upsamples_linearly() {
        let out = resample(&[0.0, 1.0], 5);
        let expected = [0.0, 0.25, 0.5, 0.75, 1.0];
        for (a, b) in out.iter().zip(expected.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_resample_keeps_endpoints() {
        let values = [0.2, 0.9, 0.4, 0.1];
        let out = resample(&values, 10);
        assert_eq!(out.len(), 10);
        assert!((out[0] - 0.2).abs() < 1e-9);
        assert!((out[9] - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_resample_identity_and_broadcast() {
        let values = [0.1, 0.5, 0.3];
        assert_eq!(resample(&values, 3), values.to_vec());
        assert_eq!(resample(&[0.5], 4), vec![0.5; 4]);
        assert!(resample(&[], 4).is_empty());
    }

    #[test]
    fn test_signal_normalized_keeps_hop() {
        let s = Signal::new(vec![1.0, 2.0], 0.25).normalized();
        assert_eq!(s.hop_seconds, 0.25);
        assert_eq!(s.len(), 2);
    }
}

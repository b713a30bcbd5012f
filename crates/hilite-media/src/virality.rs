//! Virality scoring.
//!
//! Locates the most intense fixed-length window of a recording by fusing
//! the audio-energy and motion signals:
//!
//! 1. Resample both normalized signals to the longer length `L`
//! 2. Fuse: `combined = w_audio * audio + w_motion * motion`
//! 3. Slide a `target_duration` window over `combined` and keep the best one
//!
//! Scoring is deterministic; identical inputs give identical candidates.

use std::path::Path;

use hilite_models::{HighlightCandidate, Mood};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{MediaError, MediaResult};
use crate::signals::{extract_audio_signal, extract_motion_signal, resample, Signal, SignalConfig};
use crate::transform::{FfmpegTransform, MediaTransform};
use crate::window::best_window;

/// Smallest hop used when converting durations to sample counts.
const MIN_HOP_SECONDS: f64 = 1e-3;

/// Configuration for the virality scorer.
///
/// The fusion weights are hand-tuned defaults favoring audio energy
/// (speech and laughter intensity) over raw visual motion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViralityConfig {
    /// Weight of the audio-energy signal.
    pub audio_weight: f64,
    /// Weight of the motion signal.
    pub motion_weight: f64,
    /// Length of the highlight window (seconds).
    pub target_duration: f64,
    /// Minimum viable clip length (seconds).
    pub min_clip_seconds: f64,
    /// Mood tag attached to detected highlights.
    pub mood: Mood,
    /// Signal extraction parameters.
    pub signals: SignalConfig,
}

impl Default for ViralityConfig {
    fn default() -> Self {
        Self {
            audio_weight: 0.6,
            motion_weight: 0.4,
            target_duration: 30.0,
            min_clip_seconds: 0.3,
            mood: Mood::Energetic,
            signals: SignalConfig::default(),
        }
    }
}

impl ViralityConfig {
    /// Builder-style setter for the highlight window length.
    pub fn with_target_duration(mut self, seconds: f64) -> Self {
        self.target_duration = seconds;
        self
    }

    /// Builder-style setter for the fusion weights.
    pub fn with_weights(mut self, audio: f64, motion: f64) -> Self {
        self.audio_weight = audio;
        self.motion_weight = motion;
        self
    }

    /// Builder-style setter for signal extraction parameters.
    pub fn with_signals(mut self, signals: SignalConfig) -> Self {
        self.signals = signals;
        self
    }

    /// Check invariants that would make scoring meaningless.
    pub fn validate(&self) -> MediaResult<()> {
        if !(self.target_duration.is_finite() && self.target_duration > 0.0) {
            return Err(MediaError::invalid_config(format!(
                "target_duration must be positive, got {}",
                self.target_duration
            )));
        }
        if !(self.min_clip_seconds.is_finite() && self.min_clip_seconds >= 0.0) {
            return Err(MediaError::invalid_config(format!(
                "min_clip_seconds must be non-negative, got {}",
                self.min_clip_seconds
            )));
        }
        for (name, w) in [("audio_weight", self.audio_weight), ("motion_weight", self.motion_weight)] {
            if !(w.is_finite() && w >= 0.0) {
                return Err(MediaError::invalid_config(format!(
                    "{name} must be non-negative, got {w}"
                )));
            }
        }
        Ok(())
    }
}

/// Fixed-window virality scorer.
#[derive(Debug, Clone, Default)]
pub struct ViralityScorer {
    config: ViralityConfig,
}

impl ViralityScorer {
    pub fn new(config: ViralityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ViralityConfig {
        &self.config
    }

    /// Fuse the two signals into one of length `max(len(audio), len(motion))`.
    pub fn fuse(&self, audio: &[f64], motion: &[f64]) -> Vec<f64> {
        let len = audio.len().max(motion.len());
        let audio = resample(audio, len);
        let motion = resample(motion, len);

        audio
            .iter()
            .zip(motion.iter())
            .map(|(a, m)| self.config.audio_weight * a + self.config.motion_weight * m)
            .collect()
    }

    /// Score already-extracted signals.
    ///
    /// Timing comes from the audio signal's hop. Returns an empty list when
    /// the signal is not longer than one window; the caller decides what to
    /// substitute.
    pub fn score_signals(&self, audio: &Signal, motion: &Signal) -> MediaResult<Vec<HighlightCandidate>> {
        self.config.validate()?;
        if !(audio.hop_seconds.is_finite() && audio.hop_seconds > 0.0) {
            return Err(MediaError::invalid_config(format!(
                "hop_seconds must be positive, got {}",
                audio.hop_seconds
            )));
        }

        let combined = self.fuse(&audio.values, &motion.values);
        let hop = audio.hop_seconds.max(MIN_HOP_SECONDS);
        let win = window_len(self.config.target_duration, hop);

        let Some(best) = best_window(&combined, win) else {
            debug!(
                samples = combined.len(),
                window = win,
                "Signal not longer than one window, no highlight"
            );
            return Ok(Vec::new());
        };

        let start = (best.offset as f64 * hop).max(0.0);
        let end = (start + self.config.target_duration).max(start + self.config.min_clip_seconds);
        let candidate = HighlightCandidate::new(start, end, best.mean().max(0.0), self.config.mood)?;

        info!(
            start = format!("{:.2}", candidate.start),
            end = format!("{:.2}", candidate.end),
            score = format!("{:.3}", candidate.score),
            "Selected highlight window"
        );

        Ok(vec![candidate])
    }

    /// Extract signals from the media and score them.
    ///
    /// `transcript_path` is accepted for interface stability but does not
    /// influence the score.
    pub async fn detect(
        &self,
        transform: &dyn MediaTransform,
        video_path: &Path,
        transcript_path: Option<&Path>,
        audio_path: &Path,
    ) -> MediaResult<Vec<HighlightCandidate>> {
        self.config.validate()?;

        debug!(
            video = %video_path.display(),
            audio = %audio_path.display(),
            transcript = ?transcript_path.map(|p| p.display().to_string()),
            target_duration = self.config.target_duration,
            "Scoring virality"
        );

        let audio = extract_audio_signal(transform, audio_path, &self.config.signals).await;
        let motion = extract_motion_signal(transform, video_path, &self.config.signals).await;

        debug!(
            audio_samples = audio.len(),
            motion_samples = motion.len(),
            hop_seconds = audio.hop_seconds,
            "Signals extracted"
        );

        self.score_signals(&audio, &motion)
    }
}

/// Window length in samples: `max(1, round(duration / hop))`.
pub fn window_len(duration: f64, hop_seconds: f64) -> usize {
    let samples = (duration / hop_seconds.max(MIN_HOP_SECONDS)).round();
    if samples.is_finite() && samples >= 1.0 {
        samples as usize
    } else {
        1
    }
}

/// Detect highlights with the FFmpeg media transform.
pub async fn detect_highlights(
    video_path: &Path,
    transcript_path: Option<&Path>,
    audio_path: &Path,
    config: ViralityConfig,
) -> MediaResult<Vec<HighlightCandidate>> {
    ViralityScorer::new(config)
        .detect(&FfmpegTransform::new(), video_path, transcript_path, audio_path)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer(target: f64) -> ViralityScorer {
        ViralityScorer::new(ViralityConfig::default().with_target_duration(target))
    }

    /// A 1.0 spike of `width` samples at `at`, zeros elsewhere.
    fn spike(len: usize, at: usize, width: usize) -> Vec<f64> {
        (0..len)
            .map(|i| if i >= at && i < at + width { 1.0 } else { 0.0 })
            .collect()
    }

    #[test]
    fn test_window_len_rounds() {
        assert_eq!(window_len(30.0, 1.0), 30);
        assert_eq!(window_len(1.25, 0.5), 3); // 2.5 rounds away from zero
        assert_eq!(window_len(0.1, 1.0), 1);
        assert_eq!(window_len(30.0, 0.0), 30_000);
    }

    #[test]
    fn test_spike_is_contained() {
        let values = spike(100, 40, 10);
        let audio = Signal::new(values.clone(), 1.0);
        let motion = Signal::new(values, 1.0);

        for target in [1.0, 4.0, 10.0] {
            let result = scorer(target).score_signals(&audio, &motion).unwrap();
            assert_eq!(result.len(), 1);
            let h = result[0];
            assert!(h.start >= 40.0, "target {target}: start {}", h.start);
            assert!(h.end <= 50.0 + 1e-9, "target {target}: end {}", h.end);
            assert!((h.score - 1.0).abs() < 1e-9);
            assert_eq!(h.mood, Mood::Energetic);
        }
    }

    #[test]
    fn test_fusion_weights_favor_audio() {
        // Audio peaks early, motion peaks late; audio wins with default weights.
        let audio = Signal::new(spike(60, 5, 5), 1.0);
        let motion = Signal::new(spike(60, 40, 5), 1.0);
        let h = scorer(5.0).score_signals(&audio, &motion).unwrap()[0];
        assert_eq!(h.start, 5.0);
        assert!((h.score - 0.6).abs() < 1e-9);

        let motion_first = ViralityScorer::new(
            ViralityConfig::default()
                .with_target_duration(5.0)
                .with_weights(0.2, 0.8),
        );
        let h = motion_first.score_signals(&audio, &motion).unwrap()[0];
        assert_eq!(h.start, 40.0);
    }

    #[test]
    fn test_motion_resampled_to_audio_length() {
        // Motion has 5 samples, audio 50; the motion peak lands near the middle.
        let audio = Signal::new(vec![0.0; 50], 1.0);
        let motion = Signal::new(vec![0.0, 0.0, 1.0, 0.0, 0.0], 1.0);
        let h = scorer(3.0).score_signals(&audio, &motion).unwrap()[0];
        assert!(h.start >= 20.0 && h.start <= 27.0, "start {}", h.start);
    }

    #[test]
    fn test_short_signal_yields_empty() {
        let audio = Signal::new(vec![0.5; 30], 1.0);
        let motion = Signal::neutral(0.5, 1.0);
        assert!(scorer(30.0).score_signals(&audio, &motion).unwrap().is_empty());
        assert!(scorer(45.0).score_signals(&audio, &motion).unwrap().is_empty());
    }

    #[test]
    fn test_fallback_signals_yield_empty() {
        // Both extractors failed: single-sample signals, hop 1.0.
        let audio = Signal::neutral(0.5, 1.0);
        let motion = Signal::neutral(0.5, 1.0);
        assert!(scorer(30.0).score_signals(&audio, &motion).unwrap().is_empty());
    }

    #[test]
    fn test_end_respects_min_clip() {
        let audio = Signal::new(spike(10, 2, 1), 0.01);
        let motion = Signal::neutral(0.0, 1.0);
        let scorer = ViralityScorer::new(ViralityConfig {
            target_duration: 0.01,
            ..Default::default()
        });
        let h = scorer.score_signals(&audio, &motion).unwrap()[0];
        assert!((h.start - 0.02).abs() < 1e-9);
        assert!((h.duration() - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_deterministic() {
        let values: Vec<f64> = (0..500).map(|i| ((i * 37) % 101) as f64 / 100.0).collect();
        let audio = Signal::new(values.clone(), 0.5);
        let motion = Signal::new(values.iter().rev().copied().collect(), 0.5);
        let a = scorer(10.0).score_signals(&audio, &motion).unwrap();
        let b = scorer(10.0).score_signals(&audio, &motion).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_config_is_error() {
        let audio = Signal::new(vec![0.5; 100], 1.0);
        let motion = Signal::neutral(0.5, 1.0);
        assert!(scorer(0.0).score_signals(&audio, &motion).is_err());
        assert!(scorer(-5.0).score_signals(&audio, &motion).is_err());

        let negative = ViralityScorer::new(ViralityConfig::default().with_weights(-0.1, 0.4));
        assert!(matches!(
            negative.score_signals(&audio, &motion),
            Err(MediaError::InvalidConfig(_))
        ));

        let bad_hop = Signal::new(vec![0.5; 100], 0.0);
        assert!(scorer(10.0).score_signals(&bad_hop, &motion).is_err());
    }
}

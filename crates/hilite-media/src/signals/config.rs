//! Configuration for signal extraction.

use serde::{Deserialize, Serialize};

/// Parameters for the audio-energy and motion extractors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// RMS analysis frame length in samples.
    pub frame_length: usize,

    /// Hop between RMS frames in samples.
    ///
    /// Together with the sample rate this sets the time resolution of the
    /// scorer: 512 samples at 44.1kHz is ~11.6ms per sample.
    pub hop_length: usize,

    /// Decode audio at this rate instead of the native one.
    pub sample_rate: Option<u32>,

    /// Analyze every Nth video frame.
    pub motion_step: usize,

    /// Value of the single-sample signal used when extraction fails.
    pub fallback_value: f64,

    /// Hop duration reported with the fallback signal (seconds).
    pub fallback_hop_seconds: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            frame_length: 2048,
            hop_length: 512,
            sample_rate: None,
            motion_step: 10,
            fallback_value: 0.5,
            fallback_hop_seconds: 1.0,
        }
    }
}

impl SignalConfig {
    /// Builder-style setter for the RMS hop length.
    pub fn with_hop_length(mut self, hop_length: usize) -> Self {
        self.hop_length = hop_length.max(1);
        self
    }

    /// Builder-style setter for the RMS frame length.
    pub fn with_frame_length(mut self, frame_length: usize) -> Self {
        self.frame_length = frame_length.max(1);
        self
    }

    /// Builder-style setter for the motion subsampling step.
    pub fn with_motion_step(mut self, step: usize) -> Self {
        self.motion_step = step.max(1);
        self
    }

    /// Builder-style setter for a fixed decode sample rate.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = Some(sample_rate);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SignalConfig::default();
        assert_eq!(config.hop_length, 512);
        assert_eq!(config.frame_length, 2048);
        assert_eq!(config.motion_step, 10);
        assert!(config.sample_rate.is_none());
    }

    #[test]
    fn test_builder_clamps_zero() {
        let config = SignalConfig::default()
            .with_hop_length(0)
            .with_motion_step(0);
        assert_eq!(config.hop_length, 1);
        assert_eq!(config.motion_step, 1);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SignalConfig = serde_json::from_str(r#"{"motion_step": 5}"#).unwrap();
        assert_eq!(config.motion_step, 5);
        assert_eq!(config.hop_length, 512);
    }
}

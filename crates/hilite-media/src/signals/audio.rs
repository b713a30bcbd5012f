//! Audio energy signal.

use std::path::Path;

use tracing::{debug, warn};

use super::config::SignalConfig;
use super::Signal;
use crate::transform::MediaTransform;

/// Short-time root-mean-square energy.
///
/// Frames start every `hop_length` samples and are centered on their start
/// position, with zero padding of `frame_length / 2` on both ends, giving
/// `1 + len / hop_length` frames.
pub fn rms_energy(samples: &[f32], frame_length: usize, hop_length: usize) -> Vec<f64> {
    if samples.is_empty() || frame_length == 0 || hop_length == 0 {
        return Vec::new();
    }

    let pad = frame_length / 2;
    let n_frames = 1 + samples.len() / hop_length;

    (0..n_frames)
        .map(|t| {
            // Padded window [t*hop, t*hop + frame_length) maps to
            // [t*hop - pad, t*hop - pad + frame_length) in the source.
            let start = (t * hop_length) as isize - pad as isize;
            let lo = start.max(0) as usize;
            let hi = ((start + frame_length as isize).max(0) as usize).min(samples.len());

            let energy: f64 = samples
                .get(lo..hi)
                .unwrap_or(&[])
                .iter()
                .map(|s| {
                    let s = *s as f64;
                    s * s
                })
                .sum();

            (energy / frame_length as f64).sqrt()
        })
        .collect()
}

/// Extract the normalized audio-energy signal of `path`.
///
/// Any decode or analysis failure yields the neutral fallback signal.
pub async fn extract_audio_signal(
    transform: &dyn MediaTransform,
    path: &Path,
    config: &SignalConfig,
) -> Signal {
    let fallback = Signal::neutral(config.fallback_value, config.fallback_hop_seconds);

    let waveform = match transform.decode_waveform(path, config.sample_rate).await {
        Ok(w) => w,
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "Audio decode failed, using neutral energy signal"
            );
            return fallback;
        }
    };

    if waveform.samples.is_empty() || waveform.sample_rate == 0 {
        warn!(
            path = %path.display(),
            samples = waveform.samples.len(),
            sample_rate = waveform.sample_rate,
            "No usable audio, using neutral energy signal"
        );
        return fallback;
    }

    let energy = rms_energy(&waveform.samples, config.frame_length, config.hop_length);
    let hop_seconds = config.hop_length as f64 / waveform.sample_rate as f64;

    debug!(
        frames = energy.len(),
        hop_seconds = format!("{:.4}", hop_seconds),
        "Computed audio energy"
    );

    Signal::new(energy, hop_seconds).normalized()
}

//! Worker configuration.

use std::path::{Path, PathBuf};

use hilite_media::{StoryConfig, ViralityConfig};
use hilite_models::Mood;
use serde::{Deserialize, Serialize};

use crate::error::{WorkerError, WorkerResult};

/// Scoring and composition settings.
///
/// This is the section a `HILITE_CONFIG` JSON file replaces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionSettings {
    pub virality: ViralityConfig,
    pub story: StoryConfig,
    /// Mood of the default candidate used when no highlight is found
    pub fallback_mood: Mood,
}

/// Worker configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerConfig {
    pub detection: DetectionSettings,
    /// Directory receiving `highlights.json` and `story_sequence.json`
    pub output_dir: PathBuf,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            detection: DetectionSettings::default(),
            output_dir: PathBuf::from("outputs"),
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    ///
    /// Unparsable values keep their defaults. A `HILITE_CONFIG` file that
    /// cannot be read or parsed is an error.
    pub fn from_env() -> WorkerResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> WorkerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parsed = |key: &str| lookup(key).and_then(|s| s.trim().parse::<f64>().ok());
        let defaults = Self::default();

        let mut detection = match lookup("HILITE_CONFIG") {
            Some(path) => load_detection_settings(Path::new(&path))?,
            None => defaults.detection,
        };

        let virality = &mut detection.virality;
        if let Some(v) = parsed("HILITE_TARGET_DURATION") {
            virality.target_duration = v;
        }
        if let Some(v) = parsed("HILITE_AUDIO_WEIGHT") {
            virality.audio_weight = v;
        }
        if let Some(v) = parsed("HILITE_MOTION_WEIGHT") {
            virality.motion_weight = v;
        }
        if let Some(v) = lookup("HILITE_MOTION_STEP").and_then(|s| s.trim().parse::<usize>().ok()) {
            virality.signals.motion_step = v.max(1);
        }
        if let Some(v) = lookup("HILITE_HOP_LENGTH").and_then(|s| s.trim().parse::<usize>().ok()) {
            virality.signals.hop_length = v.max(1);
        }
        if let Some(v) = parsed("HILITE_STORY_BUDGET") {
            detection.story.max_total_seconds = v;
        }
        if let Some(tag) = lookup("HILITE_FALLBACK_MOOD") {
            detection.fallback_mood = Mood::from_tag(&tag);
        }

        let config = Self {
            detection,
            output_dir: lookup("HILITE_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
        };
        config.detection.virality.validate()?;
        Ok(config)
    }
}

/// Read detection settings from a JSON file; missing fields keep defaults.
pub fn load_detection_settings(path: &Path) -> WorkerResult<DetectionSettings> {
    let bytes = std::fs::read(path).map_err(|e| {
        WorkerError::config_error(format!("cannot read {}: {}", path.display(), e))
    })?;
    Ok(serde_json::from_slice(&bytes)?)
}
